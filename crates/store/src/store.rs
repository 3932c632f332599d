//! The cart store: rehydration and mutate-persist-commit sequencing.

use trolley_core::{Cart, LineItem, Product, ProductId};
use trolley_storage::StorageBackend;

use crate::error::StoreError;

/// Storage key holding the serialized cart.
pub const STORAGE_KEY: &str = "products";

/// Cart store bound to a storage backend.
///
/// Owns the committed cart. Every mutation builds a working copy, persists
/// it, and commits it only when the write succeeds: `Ok` means the in-memory
/// cart and the durable copy are equal, `Err` means the committed cart did
/// not change.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
}

impl<S: StorageBackend> CartStore<S> {
    /// Open a store, rehydrating the previously persisted cart.
    ///
    /// An absent value starts an empty cart. A malformed value surfaces as
    /// [`StoreError::Corrupt`]; callers that want a fresh cart anyway can
    /// overwrite the key and reopen.
    pub async fn open(storage: S) -> Result<Self, StoreError> {
        let cart = match storage.get(STORAGE_KEY).await? {
            Some(raw) => {
                let items: Vec<LineItem> =
                    serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;
                tracing::debug!("rehydrated cart with {} line item(s)", items.len());
                Cart::from_items(items)
            }
            None => {
                tracing::debug!("no persisted cart, starting empty");
                Cart::new()
            }
        };

        Ok(Self { storage, cart })
    }

    /// The committed cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Committed line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    /// Add one unit of a product, merging with any existing entry by id.
    pub async fn add_to_cart(&mut self, product: Product) -> Result<(), StoreError> {
        let id = product.id.clone();
        let mut next = self.cart.clone();
        next.add(product);
        self.commit(next).await?;
        tracing::debug!("added {id} to cart");
        Ok(())
    }

    /// Add one unit to every entry matching `id`.
    ///
    /// A matched-nothing call still re-persists the unchanged collection.
    pub async fn increment(&mut self, id: &ProductId) -> Result<(), StoreError> {
        let mut next = self.cart.clone();
        let touched = next.increment(id);
        self.commit(next).await?;
        tracing::debug!("increment {id} touched {touched} line(s)");
        Ok(())
    }

    /// Remove one unit from every entry matching `id`.
    ///
    /// No floor and no removal; see [`Cart::decrement`].
    pub async fn decrement(&mut self, id: &ProductId) -> Result<(), StoreError> {
        let mut next = self.cart.clone();
        let touched = next.decrement(id);
        self.commit(next).await?;
        tracing::debug!("decrement {id} touched {touched} line(s)");
        Ok(())
    }

    /// Persist `next` under [`STORAGE_KEY`] and make it the committed cart.
    async fn commit(&mut self, next: Cart) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&next).map_err(StoreError::Encode)?;
        self.storage.set(STORAGE_KEY, &payload).await?;
        self.cart = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use trolley_storage::{MemoryStorage, StorageError};

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://cdn.example/{id}.png"),
            price: 2500,
        }
    }

    /// Backend whose writes always fail.
    struct FailingStorage;

    #[async_trait]
    impl StorageBackend for FailingStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::write("disk full"))
        }
    }

    /// Backend whose reads always fail.
    #[derive(Debug)]
    struct UnreadableStorage;

    #[async_trait]
    impl StorageBackend for UnreadableStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::read("disk error"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Backend counting writes, for asserting the re-persist contract.
    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl StorageBackend for CountingStorage {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }
    }

    /// Backend that accepts a fixed number of writes, then fails.
    struct FlakyStorage {
        inner: MemoryStorage,
        writes_left: AtomicUsize,
    }

    impl FlakyStorage {
        fn failing_after(successes: usize) -> Self {
            Self {
                inner: MemoryStorage::new(),
                writes_left: AtomicUsize::new(successes),
            }
        }
    }

    #[async_trait]
    impl StorageBackend for FlakyStorage {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.writes_left.load(Ordering::SeqCst) == 0 {
                return Err(StorageError::write("disk full"));
            }
            self.writes_left.fetch_sub(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn open_starts_empty_when_nothing_persisted() {
        let store = CartStore::open(MemoryStorage::new()).await.unwrap();
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn open_rehydrates_persisted_items() {
        let storage = MemoryStorage::new();
        storage
            .set(
                STORAGE_KEY,
                r#"[{"id":"a","title":"Shirt","image_url":"u","price":10,"quantity":2}]"#,
            )
            .await
            .unwrap();

        let store = CartStore::open(storage).await.unwrap();

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].id, ProductId::new("a"));
        assert_eq!(store.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn open_surfaces_corrupt_payload() {
        let storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "not json").await.unwrap();

        let err = CartStore::open(storage).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn open_surfaces_storage_read_failure() {
        let err = CartStore::open(UnreadableStorage).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[tokio::test]
    async fn every_mutation_rewrites_the_persisted_value() {
        let storage = Arc::new(CountingStorage::default());
        let mut store = CartStore::open(Arc::clone(&storage)).await.unwrap();

        store.add_to_cart(product("a")).await.unwrap();
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);

        // Matched-nothing operations still re-persist.
        store.increment(&ProductId::new("missing")).await.unwrap();
        assert_eq!(storage.writes.load(Ordering::SeqCst), 2);

        store.decrement(&ProductId::new("a")).await.unwrap();
        assert_eq!(storage.writes.load(Ordering::SeqCst), 3);

        let persisted = storage.inner.value_of(STORAGE_KEY).unwrap();
        let items: Vec<LineItem> = serde_json::from_str(&persisted).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 0);
    }

    #[tokio::test]
    async fn failed_write_leaves_the_cart_unchanged() {
        let mut store = CartStore::open(FailingStorage).await.unwrap();

        let err = store.add_to_cart(product("a")).await.unwrap_err();

        assert!(matches!(err, StoreError::Storage(_)));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn failed_write_preserves_the_last_persisted_state() {
        let storage = Arc::new(FlakyStorage::failing_after(1));
        let mut store = CartStore::open(Arc::clone(&storage)).await.unwrap();

        store.add_to_cart(product("a")).await.unwrap();
        let committed = store.cart().clone();

        let err = store.add_to_cart(product("b")).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert_eq!(store.cart(), &committed);

        let reopened = CartStore::open(Arc::clone(&storage)).await.unwrap();
        assert_eq!(reopened.cart(), &committed);
    }

    #[tokio::test]
    async fn add_add_decrement_decrement_keeps_entry_at_zero() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::open(Arc::clone(&storage)).await.unwrap();
        let shirt = Product {
            id: ProductId::new("a"),
            title: "Shirt".into(),
            image_url: "u".into(),
            price: 10,
        };
        let id = ProductId::new("a");

        store.add_to_cart(shirt.clone()).await.unwrap();
        assert_eq!(store.cart().get(&id).unwrap().quantity, 1);
        store.add_to_cart(shirt).await.unwrap();
        assert_eq!(store.cart().get(&id).unwrap().quantity, 2);
        store.decrement(&id).await.unwrap();
        assert_eq!(store.cart().get(&id).unwrap().quantity, 1);
        store.decrement(&id).await.unwrap();

        assert_eq!(store.cart().get(&id).unwrap().quantity, 0);
        assert_eq!(store.items().len(), 1);

        // The durable copy agrees with the committed cart.
        let persisted = storage.value_of(STORAGE_KEY).unwrap();
        let items: Vec<LineItem> = serde_json::from_str(&persisted).unwrap();
        assert_eq!(items, store.items());
    }

    #[tokio::test]
    async fn rehydration_round_trips_through_the_same_backend() {
        let storage = Arc::new(MemoryStorage::new());

        let mut store = CartStore::open(Arc::clone(&storage)).await.unwrap();
        store.add_to_cart(product("a")).await.unwrap();
        store.add_to_cart(product("b")).await.unwrap();
        store.add_to_cart(product("a")).await.unwrap();
        let committed = store.cart().clone();
        drop(store);

        let reopened = CartStore::open(Arc::clone(&storage)).await.unwrap();
        assert_eq!(reopened.cart(), &committed);
    }
}
