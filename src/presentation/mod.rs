//! View-facing models over the product list worker
//!
//! - [`ProductListModel`]: screen-level model (cells, error message, refresh)
//! - [`ProductCellModel`]: one row, drives its image task on appear/disappear
//!
//! Neither touches the network directly; everything goes through
//! [`ProductListWorking`](crate::ProductListWorking) and the image tasks it
//! registers.

mod cell;
mod list;

pub use cell::{ImageState, ProductCellModel};
pub use list::{LOAD_ERROR_MESSAGE, ProductListModel};
