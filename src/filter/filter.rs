use crate::models::Product;

use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::SortDirective;

pub struct Filter;

impl Filter {
    /// Products to display: the search term narrows the collection, then the
    /// directive (if any) orders what is left.
    ///
    /// Ties keep their incoming relative order in both directions; with no
    /// directive the incoming order is returned unchanged.
    pub fn derive_visible_list(
        raw: &[Product],
        search_term: &str,
        sort: Option<&SortDirective>,
    ) -> Vec<Product> {
        let mut visible: Vec<Product> = raw
            .iter()
            .filter(|p| FilterWhere::matches(p, search_term))
            .cloned()
            .collect();

        if let Some(directive) = sort {
            visible.sort_by(|a, b| FilterOrder::compare(a, b, directive));
        }

        visible
    }
}
