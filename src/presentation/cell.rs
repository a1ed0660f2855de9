//! Per-product cell model

use crate::error::Error;
use crate::task::ManagedAsyncTask;
use crate::types::{Product, ProductId};
use crate::utils::{format_price, lock};
use crate::worker::{ImageData, ImageTask};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Image loading state of one cell
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ImageState {
    /// Not loading (never started, or the load was cancelled)
    #[default]
    Idle,
    /// Load in flight
    Loading,
    /// Image bytes available
    Loaded(ImageData),
    /// Load failed with this message
    Failed(String),
}

/// Image state plus the task run that last wrote it
#[derive(Debug, Default)]
struct CellImage {
    state: ImageState,
    /// Generation of the most recently started load
    generation: u64,
}

/// Display model for one product row
///
/// Owns nothing but formatted text and a clone of the product's image task;
/// starting and cancelling the task is driven by cell visibility. Clones share
/// the image state. Equality is by product id.
#[derive(Clone, Debug)]
pub struct ProductCellModel {
    id: ProductId,
    title: String,
    description: String,
    price_label: String,
    quantity_label: String,
    image_url: Option<String>,
    image_task: ImageTask,
    image: Arc<Mutex<CellImage>>,
}

impl ProductCellModel {
    /// Build a cell for `product`
    ///
    /// Without a task the cell gets one resolving to no bytes, which shows as
    /// a failed image.
    pub fn new(product: &Product, image_task: Option<ImageTask>) -> Self {
        let image_task = image_task
            .unwrap_or_else(|| ManagedAsyncTask::ready(ImageData::from(Vec::new())).named("no-image"));

        Self {
            id: product.id,
            title: product.title.clone(),
            description: product.description.clone(),
            price_label: format!("Price: {}", format_price(product.price)),
            quantity_label: format!("Quantity: {}", product.stock),
            image_url: product.primary_image().map(str::to_string),
            image_task,
            image: Arc::new(Mutex::new(CellImage::default())),
        }
    }

    /// Product id
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Product title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Product description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// "Price: 9.99"
    pub fn price_label(&self) -> &str {
        &self.price_label
    }

    /// "Quantity: 5"
    pub fn quantity_label(&self) -> &str {
        &self.quantity_label
    }

    /// URL of the image shown in this cell, if any
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Current image state
    pub fn image_state(&self) -> ImageState {
        lock(&self.image).state.clone()
    }

    /// Returns true while the image is loading
    pub fn is_loading(&self) -> bool {
        matches!(lock(&self.image).state, ImageState::Loading)
    }

    /// Returns true if the last image load failed
    pub fn has_error(&self) -> bool {
        matches!(lock(&self.image).state, ImageState::Failed(_))
    }

    /// Start (or attach to) the image task and wait for it
    ///
    /// A cancelled load returns the cell to [`ImageState::Idle`] and is not
    /// reported as an error. The returned state is this load's outcome; it is
    /// only stored on the cell if no newer load has started meanwhile.
    pub async fn load_image(&self) -> ImageState {
        let handle = {
            let mut image = lock(&self.image);
            let handle = self.image_task.start();
            image.state = ImageState::Loading;
            image.generation = handle.generation();
            handle
        };
        let next = match handle.await_result().await {
            Ok(bytes) if bytes.is_empty() => ImageState::Failed("empty image data".to_string()),
            Ok(bytes) => ImageState::Loaded(bytes),
            Err(Error::Cancelled) => {
                debug!(product_id = %self.id, "Image load cancelled");
                ImageState::Idle
            }
            Err(e) => {
                warn!(product_id = %self.id, task = self.image_task.name(), error = %e, "Image load failed");
                ImageState::Failed(e.to_string())
            }
        };

        let mut image = lock(&self.image);
        if image.generation == handle.generation() {
            image.state = next.clone();
        } else {
            debug!(
                product_id = %self.id,
                generation = handle.generation(),
                current = image.generation,
                "Superseded image load finished, state left to the newer load"
            );
        }
        next
    }

    /// Cancel the in-flight image load (cell scrolled out of view)
    pub fn cancel_image_loading(&self) {
        self.image_task.cancel();
    }
}

impl PartialEq for ProductCellModel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ProductCellModel {}
