use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{LoginForm, Product, ProductId, ProductPayload, RegisterRequest, Session};

/// Product endpoints of the inventory backend.
///
/// Mutations take the session explicitly; reads are public.
#[async_trait]
pub trait ProductBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, ClientError>;

    async fn get_product(&self, id: &ProductId) -> Result<Product, ClientError>;

    async fn create_product(
        &self,
        session: &Session,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError>;

    async fn update_product(
        &self,
        session: &Session,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError>;

    async fn delete_product(&self, session: &Session, id: &ProductId) -> Result<(), ClientError>;
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, form: &LoginForm) -> Result<Session, ClientError>;

    /// Some backends answer a registration with a ready session, others only
    /// with the created profile; `None` means the user still has to log in.
    async fn register(&self, request: &RegisterRequest) -> Result<Option<Session>, ClientError>;
}
