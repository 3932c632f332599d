//! Walks a cart session end to end: open durable storage, rehydrate, mutate
//! through the worker, observe the change feed, and shut down cleanly.
//!
//! Run with `cargo run -p trolley-store --example cart_session`. Set
//! `TROLLEY_DB` to control where the cart database lives.

use anyhow::Context;

use trolley_core::{Product, ProductId};
use trolley_storage::SqliteStorage;
use trolley_store::{CartStore, CartWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trolley_observability::init();

    let storage = SqliteStorage::open_default()
        .await
        .context("failed to open cart storage")?;
    let store = CartStore::open(storage)
        .await
        .context("failed to rehydrate cart")?;
    let (worker, cart) = CartWorker::new(store);
    let task = worker.start();

    let mut changes = cart.subscribe();

    let shirt = Product {
        id: ProductId::new("sku-shirt"),
        title: "Linen Shirt".into(),
        image_url: "https://cdn.example/shirt.png".into(),
        price: 3499,
    };
    let mug = Product {
        id: ProductId::new("sku-mug"),
        title: "Enamel Mug".into(),
        image_url: "https://cdn.example/mug.png".into(),
        price: 1250,
    };

    cart.add_to_cart(shirt.clone()).await?;
    cart.add_to_cart(mug).await?;
    cart.add_to_cart(shirt).await?;
    cart.decrement(ProductId::new("sku-mug")).await?;

    while let Ok(change) = changes.try_recv() {
        println!("revision {}: {} line(s)", change.revision, change.items.len());
    }

    let snapshot = cart.cart().await;
    for item in snapshot.items() {
        println!(
            "{} x{} @ {}c = {}c",
            item.title,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    println!(
        "subtotal: {}c across {} unit(s)",
        snapshot.subtotal().context("cart subtotal overflowed")?,
        snapshot.total_quantity()
    );

    cart.shutdown();
    task.await.context("cart worker panicked")?;
    Ok(())
}
