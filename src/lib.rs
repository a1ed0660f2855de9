//! # productlist-core
//!
//! Loading core of a paginated product browser.
//!
//! ## Design Philosophy
//!
//! productlist-core is designed to be:
//! - **UI-agnostic** - No rendering, only the state a product list screen needs
//! - **Cancellable** - Every image load is a restartable, cancellable task
//! - **Injectable** - The network is a trait; the worker is a trait
//! - **Event-driven** - Consumers can subscribe to pagination events
//!
//! ## Building blocks
//!
//! - [`ManagedAsyncTask`]: start / await / cancel / restart around one async producer
//! - [`LoadState`] and [`PageCursor`]: pagination state machine and offsets
//! - [`ProductListWorker`]: accumulates pages and registers one image task per URL
//! - [`ProductListModel`] and [`ProductCellModel`]: view-facing models
//! - [`HttpNetworkService`]: `reqwest` client for a dummyjson-style products API
//!
//! ## Quick Start
//!
//! ```no_run
//! use productlist_core::{Config, HttpNetworkService, ProductListWorker, ProductListWorking};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let network = Arc::new(HttpNetworkService::new(&config)?);
//!     let worker = ProductListWorker::new(network, config.pagination.page_size);
//!
//!     // Subscribe to events
//!     let mut events = worker.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     worker.fetch_next_page().await?;
//!     for product in worker.products().iter() {
//!         println!("{} {}", product.id, product.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Network collaborator and its HTTP implementation
pub mod network;
/// Pagination state machine
pub mod pagination;
/// View-facing models
pub mod presentation;
/// Managed asynchronous tasks
pub mod task;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;
/// Paged product loading
pub mod worker;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{ApiConfig, CacheConfig, Config, PaginationConfig};
pub use error::{Error, Result};
pub use network::{HttpNetworkService, NetworkService, ResponseCache};
pub use pagination::{LoadState, PageCursor, PageOutcome};
pub use presentation::{ImageState, ProductCellModel, ProductListModel};
pub use task::{ManagedAsyncTask, TaskHandle, TaskStatus};
pub use types::{Event, PageReply, PageRequest, Product, ProductId, RawProduct};
pub use worker::{ImageData, ImageTask, ImageTaskRegistry, ProductListWorker, ProductListWorking};
