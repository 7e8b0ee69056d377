use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
}

impl Product {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        price: Decimal,
        image: &str,
        category: &str,
    ) -> Self {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            image: image.to_string(),
            category: category.to_string(),
        }
    }
}

/// The fixed product list served by the shop.
pub fn default_products() -> Vec<Product> {
    vec![
        Product::new(
            "1",
            "Premium Wireless Headphones",
            "High-quality wireless headphones with noise cancellation and 30-hour battery life.",
            Decimal::new(29999, 2),
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=500&h=500&fit=crop",
            "Electronics",
        ),
        Product::new(
            "2",
            "Smart Watch Pro",
            "Advanced fitness tracking, heart rate monitoring, and smartphone notifications.",
            Decimal::new(39999, 2),
            "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=500&h=500&fit=crop",
            "Electronics",
        ),
        Product::new(
            "3",
            "Designer Laptop Bag",
            "Stylish and durable laptop bag with multiple compartments for all your essentials.",
            Decimal::new(8999, 2),
            "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?w=500&h=500&fit=crop",
            "Accessories",
        ),
        Product::new(
            "4",
            "Ergonomic Office Chair",
            "Comfortable office chair with lumbar support and adjustable height.",
            Decimal::new(44999, 2),
            "https://images.unsplash.com/photo-1580480055273-228ff5388ef8?w=500&h=500&fit=crop",
            "Furniture",
        ),
        Product::new(
            "5",
            "Portable Bluetooth Speaker",
            "Waterproof speaker with 360\u{b0} sound and 12-hour playtime.",
            Decimal::new(7999, 2),
            "https://images.unsplash.com/photo-1608043152269-423dbba4e7e1?w=500&h=500&fit=crop",
            "Electronics",
        ),
        Product::new(
            "6",
            "Minimalist Desk Lamp",
            "LED desk lamp with adjustable brightness and color temperature.",
            Decimal::new(5999, 2),
            "https://images.unsplash.com/photo-1507473885765-e6ed057f782c?w=500&h=500&fit=crop",
            "Home",
        ),
    ]
}
