//! Shared test doubles and fixtures.

use crate::error::{Error, Result};
use crate::network::NetworkService;
use crate::pagination::LoadState;
use crate::types::{PageReply, PageRequest, Product, ProductId, RawProduct};
use crate::utils::lock;
use crate::worker::{ImageData, ImageTask, ImageTaskRegistry, ProductListWorking};
use crate::task::ManagedAsyncTask;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Image URL used by the fixture product with this id
pub(crate) fn image_url(id: i64) -> String {
    format!("https://cdn.example.com/products/{}/1.png", id)
}

/// Wire product with one image
pub(crate) fn raw_product(id: i64) -> RawProduct {
    RawProduct {
        id,
        title: format!("Product {}", id),
        description: format!("Description of product {}", id),
        price: 10.0 + id as f64,
        stock: id,
        images: vec![image_url(id)],
        thumbnail: format!("https://cdn.example.com/products/{}/thumbnail.png", id),
        category: Some("test".to_string()),
        brand: None,
        rating: None,
        discount_percentage: None,
    }
}

/// Page containing one product per id in `ids`
pub(crate) fn page_of(ids: Range<i64>) -> PageReply {
    let products: Vec<RawProduct> = ids.map(raw_product).collect();
    PageReply {
        limit: products.len() as u32,
        products,
        total: 0,
        skip: 0,
    }
}

/// Page with no products
pub(crate) fn empty_page() -> PageReply {
    PageReply::default()
}

/// Domain products for ids in `ids`
pub(crate) fn products(ids: Range<i64>) -> Vec<Product> {
    ids.map(|id| Product::from(raw_product(id))).collect()
}

/// Transport failure used across tests
pub(crate) fn network_error() -> Error {
    Error::Network {
        url: Some("https://dummyjson.com/products".to_string()),
        message: "connection reset by peer".to_string(),
        timeout: false,
    }
}

/// Scripted network collaborator
///
/// Page replies are served in the order they were pushed; when the script
/// runs out an empty page is returned. Byte fetches return the URL's own bytes
/// unless a failure is scripted for that URL. Either kind of fetch can be
/// gated so it stays in flight until the test releases it.
#[derive(Default)]
pub(crate) struct MockNetworkService {
    pages: Mutex<VecDeque<Result<PageReply>>>,
    page_requests: Mutex<Vec<PageRequest>>,
    page_gate: Mutex<Option<Arc<Notify>>>,
    byte_failures: Mutex<HashMap<String, VecDeque<Error>>>,
    byte_calls: AtomicUsize,
    byte_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockNetworkService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_pages(pages: Vec<Result<PageReply>>) -> Self {
        let mock = Self::new();
        *lock(&mock.pages) = pages.into();
        mock
    }

    pub(crate) fn push_page(&self, page: Result<PageReply>) {
        lock(&self.pages).push_back(page);
    }

    /// Make every later page fetch wait for one `notify_one()` on the returned gate
    pub(crate) fn gate_pages(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.page_gate) = Some(gate.clone());
        gate
    }

    /// Make every later byte fetch wait for one `notify_one()` on the returned gate
    pub(crate) fn gate_bytes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.byte_gate) = Some(gate.clone());
        gate
    }

    /// Fail the next byte fetch of `url` with `error`
    pub(crate) fn fail_bytes_once(&self, url: &str, error: Error) {
        lock(&self.byte_failures)
            .entry(url.to_string())
            .or_default()
            .push_back(error);
    }

    pub(crate) fn page_requests(&self) -> Vec<PageRequest> {
        lock(&self.page_requests).clone()
    }

    pub(crate) fn page_calls(&self) -> usize {
        lock(&self.page_requests).len()
    }

    pub(crate) fn byte_calls(&self) -> usize {
        self.byte_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkService for MockNetworkService {
    async fn fetch_products_page(&self, request: PageRequest) -> Result<PageReply> {
        lock(&self.page_requests).push(request);

        let gate = lock(&self.page_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        lock(&self.pages)
            .pop_front()
            .unwrap_or_else(|| Ok(empty_page()))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.byte_calls.fetch_add(1, Ordering::SeqCst);

        let gate = lock(&self.byte_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = lock(&self.byte_failures)
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(e) => Err(e),
            None => Ok(url.as_bytes().to_vec()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Scripted stand-in for the product list worker
///
/// Each `fetch_next_page()` consumes one scripted outcome: `Ok(products)`
/// appends them (empty marks exhaustion), `Err(e)` fails. With no script left
/// the call does nothing.
#[derive(Default)]
pub(crate) struct StubWorker {
    script: Mutex<VecDeque<Result<Vec<Product>>>>,
    products: Mutex<Arc<Vec<Product>>>,
    image_tasks: Mutex<ImageTaskRegistry>,
    state: Mutex<LoadState>,
    fetch_calls: AtomicUsize,
    clear_calls: AtomicUsize,
}

impl StubWorker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(&self, outcome: Result<Vec<Product>>) {
        lock(&self.script).push_back(outcome);
    }

    pub(crate) fn register_image(&self, url: &str, task: ImageTask) {
        lock(&self.image_tasks).insert(url.to_string(), task);
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

/// Image task resolving immediately to the URL's bytes
pub(crate) fn ready_image(url: &str) -> ImageTask {
    ManagedAsyncTask::ready(ImageData::from(url.as_bytes()))
}

#[async_trait]
impl ProductListWorking for StubWorker {
    async fn fetch_next_page(&self) -> Result<()> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let next = lock(&self.script).pop_front();
        match next {
            None => Ok(()),
            Some(Ok(items)) if items.is_empty() => {
                *lock(&self.state) = LoadState::AllDataLoaded;
                Ok(())
            }
            Some(Ok(items)) => {
                let mut products = lock(&self.products);
                Arc::make_mut(&mut products).extend(items);
                *lock(&self.state) = LoadState::DataLoaded;
                Ok(())
            }
            Some(Err(e)) => {
                *lock(&self.state) = LoadState::Error;
                Err(e)
            }
        }
    }

    async fn trigger_if_at_boundary(&self, product_id: ProductId) -> Result<()> {
        let at_boundary = lock(&self.products)
            .last()
            .is_some_and(|p| p.id == product_id);
        if at_boundary {
            self.fetch_next_page().await
        } else {
            Ok(())
        }
    }

    fn clear(&self) {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.products) = Arc::new(Vec::new());
        lock(&self.image_tasks).clear();
        *lock(&self.state) = LoadState::Initial;
    }

    fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&lock(&self.products))
    }

    fn image_tasks(&self) -> ImageTaskRegistry {
        lock(&self.image_tasks).clone()
    }

    fn state(&self) -> LoadState {
        *lock(&self.state)
    }
}
