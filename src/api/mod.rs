pub mod format;

pub use format::{format_currency, format_total_value, product_to_row_value, products_to_row_values, render_detail, render_table};
