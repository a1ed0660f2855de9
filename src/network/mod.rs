//! Network collaborator used by the loading core
//!
//! The core only depends on the [`NetworkService`] trait: fetch one page of
//! products, fetch the raw bytes behind a URL. Implementations:
//!
//! - [`HttpNetworkService`]: `reqwest` client against a dummyjson-style API,
//!   with an in-memory [`ResponseCache`] for image bytes
//! - test doubles in the crate's test helpers
//!
//! ## Usage
//!
//! ```no_run
//! use productlist_core::network::{HttpNetworkService, NetworkService};
//! use productlist_core::{Config, PageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let network = HttpNetworkService::new(&Config::default())?;
//!     let page = network
//!         .fetch_products_page(PageRequest { limit: 20, skip: 0 })
//!         .await?;
//!     println!("{} of {} products", page.products.len(), page.total);
//!     Ok(())
//! }
//! ```

mod cache;
mod http;

pub use cache::ResponseCache;
pub use http::HttpNetworkService;

use crate::error::Result;
use crate::types::{PageReply, PageRequest};
use async_trait::async_trait;

/// Transport contract of the product API
///
/// Implementations must be thread-safe: one instance is shared by the worker
/// and every image task it creates.
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// Fetch one page of products
    ///
    /// # Errors
    ///
    /// Returns a transport error ([`Error::is_transport`](crate::Error::is_transport))
    /// on connection failure, non-success status, or an undecodable body.
    async fn fetch_products_page(&self, request: PageRequest) -> Result<PageReply>;

    /// Fetch the raw bytes behind `url`
    ///
    /// # Errors
    ///
    /// Returns a transport error on any failure.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str {
        "network"
    }
}
