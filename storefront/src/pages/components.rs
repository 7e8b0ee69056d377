use chrono::{DateTime, SecondsFormat, Utc};

use crate::catalog::Product;
use crate::pages::layout::escape_html;

pub const PROMO_BANNER_TEXT: &str = "🎉 Special Offer: Get 20% off your first order!";

pub fn render_timestamp_badge(label: &str, rendered_at: DateTime<Utc>) -> String {
    format!(
        r#"<p class="inline-flex items-center rounded-full bg-gray-100 px-3 py-1 text-xs font-medium text-gray-700">{label}: <span class="ml-1 font-mono" data-rendered-at>{timestamp}</span></p>"#,
        label = escape_html(label),
        timestamp = rendered_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

pub fn render_promo_banner() -> String {
    format!(
        r#"<div class="mb-8 rounded-lg bg-blue-600 p-4 text-center text-white" data-promo-banner>
<p class="text-lg font-semibold">{PROMO_BANNER_TEXT}</p>
</div>"#
    )
}

pub fn render_product_card(product: &Product) -> String {
    format!(
        r#"<a href="/products/{id}">
<div class="group cursor-pointer rounded-lg border border-gray-200 bg-white p-4 transition-shadow hover:shadow-lg">
<div class="relative mb-4 aspect-square overflow-hidden rounded-md bg-gray-100">
<img src="{image}" alt="{name}" class="h-full w-full object-cover transition-transform group-hover:scale-105">
</div>
<div class="space-y-2">
<h3 class="font-semibold text-gray-900 line-clamp-1">{name}</h3>
<p class="text-sm text-gray-600 line-clamp-2">{description}</p>
<div class="flex items-center justify-between">
<span class="text-lg font-bold text-gray-900">${price:.2}</span>
<span class="text-xs text-gray-500">{category}</span>
</div>
</div>
</div>
</a>"#,
        id = escape_html(&product.id),
        image = escape_html(&product.image),
        name = escape_html(&product.name),
        description = escape_html(&product.description),
        price = product.price,
        category = escape_html(&product.category),
    )
}
