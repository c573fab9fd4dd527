use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid sort column: {0} (expected name, price or quantity)")]
    InvalidColumn(String),

    #[error("Invalid sort direction: {0} (expected asc or desc)")]
    InvalidDirection(String),

    #[error("Empty sort expression")]
    EmptyOrder,
}
