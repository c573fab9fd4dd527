pub mod list;
pub mod status;

pub use list::{
    classify_stock, compute_total_value, derive_visible_list, ProductListViewModel, ViewState,
};
pub use status::{StatusKind, StatusMessage};
