//! Paged product loading.
//!
//! [`ProductListWorker`] owns the accumulated products, the page cursor, the
//! pagination state and the registry of image tasks. Presentation code drives
//! it through the [`ProductListWorking`] trait:
//!
//! - [`fetch_next_page`](ProductListWorking::fetch_next_page) issues at most
//!   one page fetch at a time and appends the results
//! - [`trigger_if_at_boundary`](ProductListWorking::trigger_if_at_boundary)
//!   is the infinite-scroll trigger
//! - [`clear`](ProductListWorking::clear) resets everything for pull-to-refresh
//!
//! Image tasks are created but never started here; the view layer starts and
//! cancels them as cells appear and disappear.

use crate::error::Result;
use crate::network::NetworkService;
use crate::pagination::{LoadState, PageCursor, PageOutcome};
use crate::task::ManagedAsyncTask;
use crate::types::{Event, Product, ProductId};
use crate::utils::lock;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};


/// Image bytes shared between every awaiting caller
pub type ImageData = Arc<[u8]>;

/// Managed task that fetches one image URL
pub type ImageTask = ManagedAsyncTask<ImageData>;

/// Image URL → managed task fetching it
pub type ImageTaskRegistry = HashMap<String, ImageTask>;

/// Capability surface of a product list worker
///
/// Implemented by [`ProductListWorker`]; the presentation model depends only
/// on this trait so it can be driven by a test double.
#[async_trait]
pub trait ProductListWorking: Send + Sync {
    /// Fetch and append the next page
    ///
    /// A no-op while a fetch is in flight or after the list is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the fetch fails; accumulated products
    /// are left untouched.
    async fn fetch_next_page(&self) -> Result<()>;

    /// Fetch the next page if `product_id` is the last accumulated product
    ///
    /// # Errors
    ///
    /// Same as [`fetch_next_page`](Self::fetch_next_page).
    async fn trigger_if_at_boundary(&self, product_id: ProductId) -> Result<()>;

    /// Reset products, cursor, registry and state
    fn clear(&self);

    /// Snapshot of the accumulated products, in arrival order
    fn products(&self) -> Arc<Vec<Product>>;

    /// Snapshot of the image task registry
    fn image_tasks(&self) -> ImageTaskRegistry;

    /// Current pagination state
    fn state(&self) -> LoadState;

    /// Task registered for `url`, if any
    fn image_task(&self, url: &str) -> Option<ImageTask> {
        self.image_tasks().remove(url)
    }
}

/// Mutable worker state, guarded by one lock
struct WorkerState {
    state: LoadState,
    cursor: PageCursor,
    /// Copy-on-write so snapshots handed out stay immutable
    products: Arc<Vec<Product>>,
    image_tasks: ImageTaskRegistry,
    /// Bumped by `clear()`; page results from an older generation are discarded
    generation: u64,
}

/// Paged product loader
///
/// Cloneable: clones share the same state (all fields are Arc-wrapped).
#[derive(Clone)]
pub struct ProductListWorker {
    /// Transport collaborator, also captured by every image task
    network: Arc<dyn NetworkService>,
    /// Pagination, products and registry
    inner: Arc<Mutex<WorkerState>>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl ProductListWorker {
    /// Create a worker fetching `page_size` products per page through `network`
    pub fn new(network: Arc<dyn NetworkService>, page_size: u32) -> Self {
        let (event_tx, _rx) = tokio::sync::broadcast::channel(256);

        debug!(network = network.name(), page_size, "Product list worker created");

        Self {
            network,
            inner: Arc::new(Mutex::new(WorkerState {
                state: LoadState::Initial,
                cursor: PageCursor::new(page_size),
                products: Arc::new(Vec::new()),
                image_tasks: HashMap::new(),
                generation: 0,
            })),
            event_tx,
        }
    }

    /// Subscribe to worker events
    ///
    /// Each subscriber receives every event. A subscriber that falls more than
    /// 256 events behind gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Snapshot of the page cursor
    pub fn cursor(&self) -> PageCursor {
        lock(&self.inner).cursor
    }

    fn emit_event(&self, event: Event) {
        // send() fails only when nobody is subscribed
        self.event_tx.send(event).ok();
    }

    /// Build the (unstarted) task that fetches `url` through the collaborator
    ///
    /// The task captures only the collaborator and the URL, never the worker.
    fn image_task_for(&self, url: &str) -> ImageTask {
        let network = Arc::clone(&self.network);
        let target: Arc<str> = Arc::from(url);

        ManagedAsyncTask::new(move || {
            let network = Arc::clone(&network);
            let target = Arc::clone(&target);
            async move {
                let bytes = network.fetch_bytes(&target).await?;
                Ok(ImageData::from(bytes))
            }
        })
        .named(url)
    }

    /// Apply a fetched page to the state (lock held by caller)
    fn apply_page(&self, inner: &mut WorkerState, page: u32, products: Vec<Product>) -> Event {
        let added = products.len();
        let outcome = PageOutcome::from_count(added);
        inner.state = inner.state.on_page_outcome(outcome);
        if outcome == PageOutcome::Empty {
            info!(page, total = inner.products.len(), "Product list exhausted");
            return Event::Exhausted {
                total: inner.products.len(),
            };
        }

        for product in &products {
            if let Some(url) = product.primary_image() {
                if !inner.image_tasks.contains_key(url) {
                    inner
                        .image_tasks
                        .insert(url.to_string(), self.image_task_for(url));
                }
            }
        }

        Arc::make_mut(&mut inner.products).extend(products);
        inner.cursor.advance_to(page);

        info!(
            page,
            added,
            total = inner.products.len(),
            image_tasks = inner.image_tasks.len(),
            "Products page loaded"
        );

        Event::PageLoaded {
            page,
            added,
            total: inner.products.len(),
        }
    }
}

/// Restores the previous state if a page fetch future is dropped mid-flight
///
/// Without this a caller that abandons `fetch_next_page()` (timeout, select)
/// would leave the worker stuck in `Loading`.
struct LoadingGuard<'a> {
    inner: &'a Mutex<WorkerState>,
    generation: u64,
    previous: LoadState,
    armed: bool,
}

impl LoadingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock(self.inner);
        if inner.generation == self.generation && inner.state.is_loading() {
            debug!(restored = %self.previous, "Page fetch abandoned, restoring state");
            inner.state = self.previous;
        }
    }
}

#[async_trait]
impl ProductListWorking for ProductListWorker {
    async fn fetch_next_page(&self) -> Result<()> {
        let (page, request, generation, previous) = {
            let mut inner = lock(&self.inner);

            if inner.state.is_exhausted() {
                debug!("All products loaded, ignoring fetch request");
                return Ok(());
            }

            let previous = inner.state;
            let Some(next) = previous.on_fetch_requested() else {
                debug!("Page fetch already in flight, ignoring fetch request");
                return Ok(());
            };
            inner.state = next;

            let (page, request) = inner.cursor.next_request();
            (page, request, inner.generation, previous)
        };

        let mut guard = LoadingGuard {
            inner: &self.inner,
            generation,
            previous,
            armed: true,
        };

        debug!(page, skip = request.skip, limit = request.limit, "Requesting products page");
        self.emit_event(Event::PageRequested {
            page,
            skip: request.skip,
        });

        let reply = self.network.fetch_products_page(request).await;
        guard.disarm();

        let event = {
            let mut inner = lock(&self.inner);

            if inner.generation != generation {
                debug!(page, "Discarding page fetched before clear()");
                return Ok(());
            }

            match reply {
                Ok(reply) => {
                    let products: Vec<Product> =
                        reply.products.into_iter().map(Product::from).collect();
                    Ok(self.apply_page(&mut inner, page, products))
                }
                Err(e) => {
                    inner.state = inner.state.on_page_outcome(PageOutcome::Failed);
                    Err(e)
                }
            }
        };

        match event {
            Ok(event) => {
                self.emit_event(event);
                Ok(())
            }
            Err(e) => {
                warn!(page, error = %e, "Products page fetch failed");
                self.emit_event(Event::PageFailed {
                    page,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn trigger_if_at_boundary(&self, product_id: ProductId) -> Result<()> {
        let at_boundary = lock(&self.inner)
            .products
            .last()
            .is_some_and(|last| last.id == product_id);

        if !at_boundary {
            return Ok(());
        }

        debug!(%product_id, "Reached last product, requesting next page");
        self.fetch_next_page().await
    }

    fn clear(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.generation += 1;
            inner.state = inner.state.on_clear();
            inner.cursor.reset();
            inner.products = Arc::new(Vec::new());
            inner.image_tasks.clear();
        }

        info!("Product list cleared");
        self.emit_event(Event::Cleared);
    }

    fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&lock(&self.inner).products)
    }

    fn image_tasks(&self) -> ImageTaskRegistry {
        lock(&self.inner).image_tasks.clone()
    }

    fn state(&self) -> LoadState {
        lock(&self.inner).state
    }

    fn image_task(&self, url: &str) -> Option<ImageTask> {
        lock(&self.inner).image_tasks.get(url).cloned()
    }
}
