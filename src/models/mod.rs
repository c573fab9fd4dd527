pub mod forms;
pub mod product;
pub mod user;
pub mod wire;

pub use forms::{FieldErrors, FormError, LoginForm, RegisterForm, RegisterRequest};
pub use product::{
    DraftField, Product, ProductDraft, ProductId, ProductPayload, StockStatus, LOW_STOCK_THRESHOLD,
};
pub use user::{AuthResponse, Session, UserProfile};
