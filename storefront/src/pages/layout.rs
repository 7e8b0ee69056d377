pub const SITE_TITLE: &str = "Demo Shop - eCommerce Store";
const SITE_DESCRIPTION: &str = "A demo eCommerce application with feature flags";

/// Escapes text for use in HTML bodies and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps page markup in the shared document shell. Every page loads the
/// flags toolbar.
pub fn render_document(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="antialiased">
{body}
<div id="flags-toolbar"></div>
<script src="/_toolbar.js" defer></script>
</body>
</html>
"#,
        title = escape_html(SITE_TITLE),
        description = escape_html(SITE_DESCRIPTION),
        body = body,
    )
}

pub fn back_to_shop_header() -> &'static str {
    r#"<header class="bg-white shadow">
<div class="mx-auto max-w-7xl px-4 py-6 sm:px-6 lg:px-8">
<a href="/" class="text-blue-600 hover:text-blue-700">&larr; Back to Shop</a>
</div>
</header>"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_document_includes_toolbar_and_title() {
        let html = render_document("<main>hi</main>");
        assert!(html.contains("<title>Demo Shop - eCommerce Store</title>"));
        assert!(html.contains(r#"<script src="/_toolbar.js" defer></script>"#));
        assert!(html.contains("<main>hi</main>"));
    }
}
