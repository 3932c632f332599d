//! `trolley-store` — the cart store, its worker task, and the consumer handle.
//!
//! Construction mirrors application startup: open a storage backend,
//! rehydrate a [`CartStore`], wrap it in a [`CartWorker`], and inject the
//! returned [`CartHandle`] into consuming components.
//!
//! ```no_run
//! # async fn demo() -> Result<(), trolley_store::StoreError> {
//! use trolley_core::{Product, ProductId};
//! use trolley_storage::MemoryStorage;
//! use trolley_store::{CartStore, CartWorker};
//!
//! let store = CartStore::open(MemoryStorage::new()).await?;
//! let (worker, cart) = CartWorker::new(store);
//! let task = worker.start();
//!
//! cart.add_to_cart(Product {
//!     id: ProductId::new("sku-1"),
//!     title: "Shirt".into(),
//!     image_url: "https://cdn.example/shirt.png".into(),
//!     price: 1099,
//! })
//! .await?;
//!
//! cart.shutdown();
//! # let _ = task;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod store;
pub mod worker;

pub use error::StoreError;
pub use store::{CartStore, STORAGE_KEY};
pub use worker::{CartChanged, CartHandle, CartWorker};
