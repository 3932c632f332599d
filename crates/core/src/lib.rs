//! `trolley-core` — cart domain building blocks.
//!
//! This crate contains **pure domain** types and transition rules (no I/O,
//! no async). Persistence and command sequencing live in `trolley-storage`
//! and `trolley-store`.

pub mod cart;
pub mod error;
pub mod id;
pub mod item;

pub use cart::Cart;
pub use error::{CartError, CartResult};
pub use id::ProductId;
pub use item::{LineItem, Product};
