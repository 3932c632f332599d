//! Cart line items and the catalog input they are built from.

use serde::{Deserialize, Serialize};

use crate::id::ProductId;

/// Catalog product details handed to the cart by the consumer.
///
/// Carries no quantity: how many units are in the cart is owned by the cart
/// itself, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
}

/// One product's cart entry: catalog details plus unit count.
///
/// `quantity` is signed; decrements carry no floor, so a committed entry can
/// reach zero (and below) without being removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub quantity: i64,
}

impl LineItem {
    /// Cart entry for the first unit of a product.
    pub fn new(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }

    /// Line total in smallest currency unit.
    ///
    /// Computed in `i128`: any `u64` price times any `i64` quantity fits,
    /// so the result is exact for the full persisted value ranges.
    pub fn line_total(&self) -> i128 {
        self.quantity as i128 * self.price as i128
    }
}
