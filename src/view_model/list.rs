use rust_decimal::Decimal;

use crate::filter::{Filter, FilterOrder, SortDirective, SortKey};
use crate::models::{DraftField, FormError, Product, ProductDraft, ProductId, StockStatus};

use super::status::StatusMessage;

/// Interaction state of the product list. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search_term: String,
    pub sort: Option<SortDirective>,
    pub edit_target: Option<ProductId>,
    pub draft: ProductDraft,
    pub loading: bool,
    pub status: Option<StatusMessage>,
}

/// Raw product collection plus the user's search/sort/edit choices.
///
/// Performs no I/O. The page layer feeds it fresh collections and outcome
/// messages; everything shown is derived from here.
#[derive(Debug, Clone, Default)]
pub struct ProductListViewModel {
    products: Vec<Product>,
    state: ViewState,
}

impl ProductListViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            state: ViewState::default(),
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn total_products(&self) -> usize {
        self.products.len()
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// The backend answered with a fresh full collection.
    pub fn replace_collection(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
    }

    pub fn clear_search(&mut self) {
        self.state.search_term.clear();
    }

    pub fn search_term(&self) -> &str {
        &self.state.search_term
    }

    pub fn request_sort(&mut self, key: SortKey) -> SortDirective {
        let next = FilterOrder::toggle(self.state.sort, key);
        self.state.sort = Some(next);
        next
    }

    /// Apply an explicit directive, e.g. one parsed from `--sort price desc`.
    pub fn set_sort(&mut self, directive: SortDirective) {
        self.state.sort = Some(directive);
    }

    pub fn sort_directive(&self) -> Option<SortDirective> {
        self.state.sort
    }

    pub fn visible(&self) -> Vec<Product> {
        derive_visible_list(&self.products, &self.state.search_term, self.state.sort.as_ref())
    }

    pub fn empty_message(&self) -> &'static str {
        if self.state.search_term.is_empty() {
            "No products available"
        } else {
            "No matching products found"
        }
    }

    pub fn begin_edit(&mut self, product: &Product) {
        self.state.draft = ProductDraft::from_product(product);
        self.state.edit_target = Some(product.id.clone());
    }

    pub fn cancel_edit(&mut self) {
        self.state.draft = ProductDraft::default();
        self.state.edit_target = None;
    }

    pub fn is_editing(&self) -> bool {
        self.state.edit_target.is_some()
    }

    pub fn edit_target(&self) -> Option<&ProductId> {
        self.state.edit_target.as_ref()
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.state.draft
    }

    pub fn set_draft_field(&mut self, field: DraftField, value: &str) -> Result<(), FormError> {
        self.state.draft.set_field(field, value)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.state.status = Some(status);
    }

    pub fn clear_status(&mut self) {
        self.state.status = None;
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.state.status.as_ref()
    }
}

pub fn derive_visible_list(
    raw: &[Product],
    search_term: &str,
    sort: Option<&SortDirective>,
) -> Vec<Product> {
    Filter::derive_visible_list(raw, search_term, sort)
}

pub fn compute_total_value(product: &Product) -> Option<Decimal> {
    product.total_value()
}

pub fn classify_stock(quantity: u32) -> StockStatus {
    StockStatus::classify(quantity)
}
