use std::sync::Arc;

use rust_decimal::Decimal;

use crate::catalog::{CatalogError, CatalogStore, Product};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// A cart held entirely in the page URL (`/cart?items=1:2,3:1`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Items with a zero quantity are dropped; repeated products are merged.
    pub fn new(items: Vec<CartItem>) -> Self {
        let mut cart = Cart::default();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart
                .items
                .iter_mut()
                .find(|existing| existing.product.id == item.product.id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity)
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Adds `delta` to the quantity of `product_id`. An item whose quantity
    /// drops to zero or below leaves the cart.
    pub fn update_quantity(&mut self, product_id: &str, delta: i64) {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.product.id == product_id)
        else {
            return;
        };

        let quantity = i64::from(self.items[index].quantity).saturating_add(delta);
        if quantity <= 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// A copy of this cart after `update_quantity`.
    pub fn with_quantity_change(&self, product_id: &str, delta: i64) -> Cart {
        let mut cart = self.clone();
        cart.update_quantity(product_id, delta);
        cart
    }

    /// The `items` query value describing this cart.
    pub fn to_query(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{}:{}", item.product.id, item.quantity))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Builds the cart described by an `items` query value. Malformed entries
    /// and unknown products are skipped.
    pub async fn from_query(
        catalog: &CatalogStore,
        query: &str,
    ) -> Result<Cart, Arc<CatalogError>> {
        let mut items = Vec::new();
        for (id, quantity) in parse_entries(query) {
            match catalog.get_by_id(&id).await? {
                Some(product) => items.push(CartItem { product, quantity }),
                None => tracing::debug!(product_id = %id, "skipping unknown product in cart"),
            }
        }
        Ok(Cart::new(items))
    }

    /// The demo cart shown when no cart is given: one of product 1 and two of product 2.
    pub async fn mock(catalog: &CatalogStore) -> Result<Cart, Arc<CatalogError>> {
        Cart::from_query(catalog, "1:1,2:2").await
    }
}

/// Splits `id:quantity` pairs separated by commas.
pub fn parse_entries(query: &str) -> Vec<(String, u32)> {
    query
        .split(',')
        .filter_map(|entry| {
            let (id, quantity) = entry.trim().split_once(':')?;
            let id = id.trim();
            if id.is_empty() {
                return None;
            }
            let quantity = quantity.trim().parse::<u32>().ok()?;
            Some((id.to_string(), quantity))
        })
        .collect()
}
