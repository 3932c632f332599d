//! The cart collection and its transition rules.

use serde::{Deserialize, Serialize};

use crate::error::{CartError, CartResult};
use crate::id::ProductId;
use crate::item::{LineItem, Product};

/// Ordered collection of cart line items.
///
/// Insertion order is preserved: new products append, existing entries keep
/// their position through every mutation. At most one entry exists per
/// product id under normal operation. Serializes transparently as a JSON
/// array of line items, which is also the persisted representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from already-materialized line items (rehydration).
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// Add one unit of a product.
    ///
    /// An entry with the same id gains one unit in place; otherwise a new
    /// entry with quantity 1 is appended.
    pub fn add(&mut self, product: Product) {
        match self.items.iter().position(|item| item.id == product.id) {
            Some(index) => self.items[index].quantity += 1,
            None => self.items.push(LineItem::new(product)),
        }
    }

    /// Add one unit to every entry matching `id`.
    ///
    /// Returns the number of entries touched; 0 is a legal no-op.
    pub fn increment(&mut self, id: &ProductId) -> usize {
        self.adjust(id, 1)
    }

    /// Remove one unit from every entry matching `id`.
    ///
    /// No floor and no removal: an entry stays in the cart when its quantity
    /// reaches zero or goes negative. Returns the number of entries touched.
    pub fn decrement(&mut self, id: &ProductId) -> usize {
        self.adjust(id, -1)
    }

    fn adjust(&mut self, id: &ProductId, delta: i64) -> usize {
        let mut touched = 0;
        for item in self.items.iter_mut().filter(|item| &item.id == id) {
            item.quantity += delta;
            touched += 1;
        }
        touched
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Units across all entries, summed in `i128` so extreme persisted
    /// quantities cannot wrap.
    pub fn total_quantity(&self) -> i128 {
        self.items.iter().map(|item| item.quantity as i128).sum()
    }

    /// Sum of line totals in smallest currency unit.
    ///
    /// The accumulation is checked; a sum outside the `i128` range reports
    /// an invariant violation instead of wrapping.
    pub fn subtotal(&self) -> CartResult<i128> {
        let mut total: i128 = 0;
        for item in &self.items {
            total = total
                .checked_add(item.line_total())
                .ok_or_else(|| CartError::invariant("cart subtotal overflow"))?;
        }
        Ok(total)
    }
}
