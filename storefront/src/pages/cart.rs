use axum::{
    extract::{Query, State},
    response::Html,
};
use tracing::instrument;

use crate::api::errors::StoreError;
use crate::cart::{Cart, CartItem};
use crate::pages::layout::{back_to_shop_header, escape_html, render_document};
use crate::router;

/// The first `items` value of the query string. Query pairs are taken as a
/// list so a repeated key cannot fail extraction.
fn items_param(pairs: Vec<(String, String)>) -> Option<String> {
    pairs
        .into_iter()
        .find(|(key, _)| key == "items")
        .map(|(_, value)| value)
}

fn quantity_link(cart: &Cart, product_id: &str, delta: i64) -> String {
    let query = cart.with_quantity_change(product_id, delta).to_query();
    format!("/cart?items={}", escape_html(&query))
}

fn render_item(cart: &Cart, item: &CartItem) -> String {
    format!(
        r#"<div class="flex items-center gap-4 border-b pb-4 last:border-b-0" data-product-id="{id}">
<div class="flex-1">
<h3 class="font-semibold text-gray-900">{name}</h3>
<p class="text-sm text-gray-600">${price:.2}</p>
</div>
<div class="flex items-center gap-2">
<a href="{decrease}" class="rounded bg-gray-200 px-3 py-1 hover:bg-gray-300" aria-label="Decrease quantity">-</a>
<span class="w-8 text-center">{quantity}</span>
<a href="{increase}" class="rounded bg-gray-200 px-3 py-1 hover:bg-gray-300" aria-label="Increase quantity">+</a>
</div>
<div class="w-20 text-right font-semibold">${line_total:.2}</div>
</div>"#,
        id = escape_html(&item.product.id),
        name = escape_html(&item.product.name),
        price = item.product.price,
        decrease = quantity_link(cart, &item.product.id, -1),
        quantity = item.quantity,
        increase = quantity_link(cart, &item.product.id, 1),
        line_total = item.line_total(),
    )
}

pub fn render_cart(cart: &Cart) -> String {
    let contents = if cart.is_empty() {
        r#"<p class="text-gray-600">Your cart is empty</p>"#.to_string()
    } else {
        let items: String = cart
            .items()
            .iter()
            .map(|item| render_item(cart, item))
            .collect();
        format!(
            r#"<div class="space-y-4">
{items}
<div class="flex items-center justify-between border-t pt-4 text-xl font-bold">
<span>Total:</span>
<span data-cart-total>${total:.2}</span>
</div>
<button class="w-full rounded-lg bg-blue-600 py-3 text-white font-semibold hover:bg-blue-700 transition-colors">Checkout</button>
</div>"#,
            total = cart.total(),
        )
    };

    render_document(&format!(
        r#"<div class="min-h-screen bg-gray-50">
{header}
<main class="mx-auto max-w-3xl px-4 py-8 sm:px-6 lg:px-8">
<div class="rounded-lg border border-gray-200 bg-white p-6">
<h2 class="mb-4 text-2xl font-bold text-gray-900">Shopping Cart</h2>
{contents}
</div>
</main>
</div>"#,
        header = back_to_shop_header(),
    ))
}

/// The cart page. Without an `items` query the demo cart is shown.
#[instrument(skip_all)]
pub async fn cart_page(
    State(state): State<router::State>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, StoreError> {
    let cart = match items_param(pairs) {
        Some(items) => Cart::from_query(&state.catalog, &items).await?,
        None => Cart::mock(&state.catalog).await?,
    };
    Ok(Html(render_cart(&cart)))
}
