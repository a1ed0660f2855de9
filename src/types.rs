//! Core types for productlist-core

use serde::{Deserialize, Serialize};

/// Unique identifier for a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Create a new ProductId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for ProductId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// Domain product
///
/// Immutable once built from a [`RawProduct`]. Identity is `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    /// Stable identifier, unique across pages
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Unit price, never negative
    pub price: f64,
    /// Units in stock
    pub stock: u32,
    /// Image URLs in display order (may be empty)
    pub images: Vec<String>,
    /// Thumbnail URL
    pub thumbnail: String,
}

impl Product {
    /// The image shown in list cells, if the product has any
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Self {
            id: ProductId(raw.id),
            title: raw.title,
            description: raw.description,
            price: if raw.price.is_finite() {
                raw.price.max(0.0)
            } else {
                0.0
            },
            stock: u32::try_from(raw.stock.max(0)).unwrap_or(u32::MAX),
            images: raw.images,
            thumbnail: raw.thumbnail,
        }
    }
}

/// Product as returned by the products endpoint
///
/// Only the fields the domain needs are required. Extra catalog fields are
/// optional, and anything else in the payload is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    /// Product identifier
    pub id: i64,
    /// Title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Price
    #[serde(default)]
    pub price: f64,
    /// Stock count (the API may send negative values for back-orders)
    #[serde(default)]
    pub stock: i64,
    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail: String,
    /// Catalog category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Brand name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Average rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Discount percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
}

/// Parameters of one page fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of products to return (always positive)
    pub limit: u32,
    /// Number of products to skip from the start of the catalog
    pub skip: u32,
}

/// One page of the products endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageReply {
    /// Products on this page, in catalog order
    pub products: Vec<RawProduct>,
    /// Total number of products in the catalog
    #[serde(default)]
    pub total: u32,
    /// Offset echoed back by the server
    #[serde(default)]
    pub skip: u32,
    /// Limit echoed back by the server
    #[serde(default)]
    pub limit: u32,
}

/// Events emitted by the product list worker
///
/// Subscribe via [`ProductListWorker::subscribe`](crate::ProductListWorker::subscribe).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A page fetch was issued
    PageRequested {
        /// Zero-based page number
        page: u32,
        /// Offset sent to the server
        skip: u32,
    },

    /// A page returned products which were appended
    PageLoaded {
        /// Zero-based page number
        page: u32,
        /// Number of products appended
        added: usize,
        /// Accumulated product count after appending
        total: usize,
    },

    /// A page returned no products; pagination is finished
    Exhausted {
        /// Accumulated product count
        total: usize,
    },

    /// A page fetch failed; accumulated products are untouched
    PageFailed {
        /// Zero-based page number
        page: u32,
        /// Error message
        error: String,
    },

    /// The worker was reset
    Cleared,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REPLY: &str = r#"{
        "products": [
            {
                "id": 1,
                "title": "Essence Mascara Lash Princess",
                "description": "Popular mascara",
                "category": "beauty",
                "price": 9.99,
                "discountPercentage": 7.17,
                "rating": 4.94,
                "stock": 5,
                "tags": ["beauty", "mascara"],
                "brand": "Essence",
                "dimensions": { "width": 23.17, "height": 14.43, "depth": 28.01 },
                "images": ["https://cdn.dummyjson.com/products/images/1/1.png"],
                "thumbnail": "https://cdn.dummyjson.com/products/images/1/thumbnail.png"
            },
            {
                "id": 2,
                "title": "Bare product",
                "price": 1.5
            }
        ],
        "total": 194,
        "skip": 0,
        "limit": 2
    }"#;

    #[test]
    fn test_page_reply_decodes_and_ignores_unknown_fields() {
        let reply: PageReply = serde_json::from_str(SAMPLE_REPLY).unwrap();
        assert_eq!(reply.products.len(), 2);
        assert_eq!(reply.total, 194);
        assert_eq!(reply.limit, 2);

        let first = &reply.products[0];
        assert_eq!(first.brand.as_deref(), Some("Essence"));
        assert_eq!(first.discount_percentage, Some(7.17));

        let second = &reply.products[1];
        assert!(second.images.is_empty());
        assert_eq!(second.description, "");
    }

    #[test]
    fn test_product_mapping_copies_fields() {
        let reply: PageReply = serde_json::from_str(SAMPLE_REPLY).unwrap();
        let product = Product::from(reply.products[0].clone());

        assert_eq!(product.id, ProductId(1));
        assert_eq!(product.title, "Essence Mascara Lash Princess");
        assert_eq!(product.stock, 5);
        assert_eq!(
            product.primary_image(),
            Some("https://cdn.dummyjson.com/products/images/1/1.png")
        );
    }

    #[test]
    fn test_product_mapping_clamps_negatives() {
        let raw = RawProduct {
            id: 7,
            title: "Back-ordered".into(),
            description: String::new(),
            price: -3.0,
            stock: -2,
            images: vec![],
            thumbnail: String::new(),
            category: None,
            brand: None,
            rating: None,
            discount_percentage: None,
        };
        let product = Product::from(raw);
        assert_eq!(product.price, 0.0);
        assert_eq!(product.stock, 0);
        assert_eq!(product.primary_image(), None);
    }

    #[test]
    fn test_product_id_parse_and_display() {
        let id: ProductId = "42".parse().unwrap();
        assert_eq!(id, 42);
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(Event::Exhausted { total: 25 }).unwrap();
        assert_eq!(json["type"], "exhausted");
        assert_eq!(json["total"], 25);
    }
}
