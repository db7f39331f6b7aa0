//! Sample catalog and request builders.

use rust_decimal::Decimal;
use stockroom_core::catalog::{NewProduct, ProductId};
use stockroom_core::order::{NewOrder, OrderLineInput};

/// The demo catalog served by the in-memory backend.
#[must_use]
pub fn sample_products() -> Vec<NewProduct> {
    vec![
        sample(
            "Laptop Pro 15\"",
            "High-performance laptop with 16GB RAM",
            "Electronics",
            "LP-001",
            (129_999, 89_999),
            (25, 5),
            "Warehouse A",
        ),
        sample(
            "Wireless Mouse",
            "Ergonomic wireless mouse with Bluetooth",
            "Electronics",
            "WM-001",
            (2_999, 1_599),
            (150, 20),
            "Warehouse A",
        ),
        sample(
            "Office Chair",
            "Comfortable ergonomic office chair",
            "Furniture",
            "OC-001",
            (24_999, 14_999),
            (30, 10),
            "Warehouse B",
        ),
        sample(
            "Standing Desk",
            "Adjustable height standing desk",
            "Furniture",
            "SD-001",
            (59_999, 39_999),
            (12, 5),
            "Warehouse B",
        ),
        sample(
            "Monitor 27\"",
            "4K Ultra HD 27-inch monitor",
            "Electronics",
            "MN-001",
            (39_999, 24_999),
            (45, 10),
            "Warehouse A",
        ),
    ]
}

fn sample(
    name: &str,
    description: &str,
    category: &str,
    sku: &str,
    (price_cents, cost_cents): (i64, i64),
    (quantity, min_stock_level): (i32, i32),
    location: &str,
) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: Some(description.to_string()),
        category: Some(category.to_string()),
        sku: sku.to_string(),
        price: Decimal::new(price_cents, 2),
        cost: Decimal::new(cost_cents, 2),
        quantity,
        min_stock_level,
        location: location.to_string(),
    }
}

/// A product priced 10.00 with `quantity` units on hand.
#[must_use]
pub fn product(sku: &str, quantity: i32) -> NewProduct {
    NewProduct {
        name: format!("Product {sku}"),
        description: None,
        category: None,
        sku: sku.to_string(),
        price: Decimal::new(1000, 2),
        cost: Decimal::new(500, 2),
        quantity,
        min_stock_level: 5,
        location: "Warehouse A".to_string(),
    }
}

/// One order line.
#[must_use]
pub fn line(product_id: ProductId, quantity: i64, price: Decimal) -> OrderLineInput {
    OrderLineInput {
        product_id: Some(product_id.get()),
        quantity: Some(quantity),
        price: Some(price),
    }
}

/// An order request from a fixed customer.
#[must_use]
pub fn order(items: Vec<OrderLineInput>) -> NewOrder {
    NewOrder {
        customer_name: Some("Jane Doe".to_string()),
        customer_email: Some("jane@example.com".to_string()),
        customer_phone: Some("555-0100".to_string()),
        items,
    }
}
