//! Single-writer worker and the cloneable cart handle.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Notify, RwLock, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use trolley_core::{Cart, LineItem, Product, ProductId};
use trolley_storage::StorageBackend;

use crate::error::StoreError;
use crate::store::CartStore;

/// Capacity of the command queue between handles and the worker.
const COMMAND_BUFFER: usize = 64;

/// Capacity of the change-notification feed.
const CHANGE_BUFFER: usize = 256;

/// Committed-change notification delivered to subscribers.
///
/// `revision` counts committed mutations from 1; a failed mutation produces
/// neither a revision nor a notification. The feed is lossy for slow
/// subscribers, and every message carries the full committed state, so the
/// latest message is always enough to catch up from.
#[derive(Debug, Clone, Serialize)]
pub struct CartChanged {
    pub revision: u64,
    pub items: Vec<LineItem>,
}

enum Command {
    Add {
        product: Product,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    Increment {
        id: ProductId,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    Decrement {
        id: ProductId,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
}

/// Worker task owning the cart store.
///
/// Commands are applied strictly in arrival order, each to completion before
/// the next is received, so two rapid mutations can never observe the same
/// cart snapshot and persist calls can never complete out of order.
pub struct CartWorker<S> {
    store: CartStore<S>,
    commands: mpsc::Receiver<Command>,
    view: Arc<RwLock<Cart>>,
    changes: broadcast::Sender<CartChanged>,
    shutdown: Arc<Notify>,
    revision: u64,
}

impl<S> CartWorker<S>
where
    S: StorageBackend + 'static,
{
    /// Wrap a store, returning the worker and the first handle.
    pub fn new(store: CartStore<S>) -> (Self, CartHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (changes_tx, _) = broadcast::channel(CHANGE_BUFFER);
        let view = Arc::new(RwLock::new(store.cart().clone()));
        let shutdown = Arc::new(Notify::new());

        let handle = CartHandle {
            commands: commands_tx,
            view: Arc::clone(&view),
            changes: changes_tx.clone(),
            shutdown: Arc::clone(&shutdown),
        };

        let worker = Self {
            store,
            commands: commands_rx,
            view,
            changes: changes_tx,
            shutdown,
            revision: 0,
        };

        (worker, handle)
    }

    /// Spawn the run loop, returning its join handle.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        tracing::info!("cart worker started");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    tracing::info!("cart worker received shutdown signal");
                    break;
                }
                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.apply(command).await,
                        None => {
                            tracing::debug!("all cart handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("cart worker stopped");
    }

    async fn apply(&mut self, command: Command) {
        let command_id = Uuid::now_v7();

        let (result, reply) = match command {
            Command::Add { product, reply } => {
                tracing::debug!("command {command_id}: add {}", product.id);
                (self.store.add_to_cart(product).await, reply)
            }
            Command::Increment { id, reply } => {
                tracing::debug!("command {command_id}: increment {id}");
                (self.store.increment(&id).await, reply)
            }
            Command::Decrement { id, reply } => {
                tracing::debug!("command {command_id}: decrement {id}");
                (self.store.decrement(&id).await, reply)
            }
        };

        match &result {
            Ok(()) => {
                self.revision += 1;
                let committed = self.store.cart().clone();
                *self.view.write().await = committed.clone();
                let _ = self.changes.send(CartChanged {
                    revision: self.revision,
                    items: committed.into_items(),
                });
            }
            Err(e) => {
                tracing::warn!("command {command_id} failed: {e}");
            }
        }

        // The caller may have stopped waiting; that is its choice.
        let _ = reply.send(result);
    }
}

/// Cloneable handle to a running cart worker.
///
/// Construct the worker once at application start and inject clones of this
/// handle into consuming components. Every operation answers
/// [`StoreError::Closed`] once the worker is gone.
#[derive(Debug, Clone)]
pub struct CartHandle {
    commands: mpsc::Sender<Command>,
    view: Arc<RwLock<Cart>>,
    changes: broadcast::Sender<CartChanged>,
    shutdown: Arc<Notify>,
}

impl CartHandle {
    /// Add one unit of a product to the cart.
    pub async fn add_to_cart(&self, product: Product) -> Result<(), StoreError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Add { product, reply })
            .await
            .map_err(|_| StoreError::Closed)?;
        outcome.await.map_err(|_| StoreError::Closed)?
    }

    /// Add one unit to every cart entry matching `id`.
    pub async fn increment(&self, id: ProductId) -> Result<(), StoreError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Increment { id, reply })
            .await
            .map_err(|_| StoreError::Closed)?;
        outcome.await.map_err(|_| StoreError::Closed)?
    }

    /// Remove one unit from every cart entry matching `id` (no floor).
    pub async fn decrement(&self, id: ProductId) -> Result<(), StoreError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Decrement { id, reply })
            .await
            .map_err(|_| StoreError::Closed)?;
        outcome.await.map_err(|_| StoreError::Closed)?
    }

    /// Current committed line items in insertion order.
    ///
    /// Reads a shared view the worker refreshes after every commit; never
    /// waits behind queued mutations.
    pub async fn products(&self) -> Vec<LineItem> {
        self.view.read().await.items().to_vec()
    }

    /// Snapshot of the committed cart.
    pub async fn cart(&self) -> Cart {
        self.view.read().await.clone()
    }

    /// Subscribe to committed-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CartChanged> {
        self.changes.subscribe()
    }

    /// Request graceful shutdown of the worker.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}
