use crate::models::Product;

pub struct FilterWhere;

impl FilterWhere {
    /// Case-insensitive substring match on the product name. The term is
    /// used verbatim, so surrounding whitespace is part of the match.
    pub fn matches(product: &Product, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        product.name.to_lowercase().contains(&term.to_lowercase())
    }
}
