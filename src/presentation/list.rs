//! Product list screen model

use super::ProductCellModel;
use crate::config::PaginationConfig;
use crate::error::Result;
use crate::types::ProductId;
use crate::utils::lock;
use crate::worker::ProductListWorking;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Message shown when a page fails to load
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load products. Please try again later.";

#[derive(Default)]
struct ViewState {
    cells: Vec<ProductCellModel>,
    error_message: Option<String>,
}

/// Screen model backing the product list
///
/// Mirrors the worker's products as [`ProductCellModel`]s. The worker is
/// injected so the model can be driven by any [`ProductListWorking`].
pub struct ProductListModel<W: ProductListWorking> {
    worker: Arc<W>,
    refresh_delay: Duration,
    view: Mutex<ViewState>,
}

impl<W: ProductListWorking> ProductListModel<W> {
    /// Create a model over `worker`, pacing refreshes per `pagination`
    pub fn new(worker: Arc<W>, pagination: &PaginationConfig) -> Self {
        Self {
            worker,
            refresh_delay: pagination.refresh_delay,
            view: Mutex::new(ViewState::default()),
        }
    }

    /// The underlying worker
    pub fn worker(&self) -> &Arc<W> {
        &self.worker
    }

    /// Cells in display order
    pub fn cells(&self) -> Vec<ProductCellModel> {
        lock(&self.view).cells.clone()
    }

    /// Error message to show, if the last load failed
    pub fn error_message(&self) -> Option<String> {
        lock(&self.view).error_message.clone()
    }

    /// Load the next page and rebuild the cells
    ///
    /// # Errors
    ///
    /// Returns the worker's error after setting [`error_message`](Self::error_message).
    pub async fn load_products(&self) -> Result<()> {
        let result = self.worker.fetch_next_page().await;
        self.settle(result)
    }

    /// Load more when the cell for `product_id` is the last one
    ///
    /// # Errors
    ///
    /// Same as [`load_products`](Self::load_products).
    pub async fn load_more_if_needed(&self, product_id: ProductId) -> Result<()> {
        let result = self.worker.trigger_if_at_boundary(product_id).await;
        self.settle(result)
    }

    /// Pull-to-refresh: reset everything, wait the refresh delay, load page one
    ///
    /// # Errors
    ///
    /// Same as [`load_products`](Self::load_products).
    pub async fn refresh_products(&self) -> Result<()> {
        self.worker.clear();
        *lock(&self.view) = ViewState::default();

        debug!(delay_ms = self.refresh_delay.as_millis() as u64, "Refreshing product list");
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }

        self.load_products().await
    }

    fn settle(&self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.rebuild_cells();
                lock(&self.view).error_message = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load products");
                lock(&self.view).error_message = Some(LOAD_ERROR_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Rebuild cells from the worker snapshot, keeping existing cells by id
    fn rebuild_cells(&self) {
        let products = self.worker.products();
        let mut view = lock(&self.view);

        let mut existing: HashMap<ProductId, ProductCellModel> = view
            .cells
            .drain(..)
            .map(|cell| (cell.id(), cell))
            .collect();

        view.cells = products
            .iter()
            .map(|product| {
                existing.remove(&product.id).unwrap_or_else(|| {
                    let task = product
                        .primary_image()
                        .and_then(|url| self.worker.image_task(url));
                    ProductCellModel::new(product, task)
                })
            })
            .collect();
    }
}
