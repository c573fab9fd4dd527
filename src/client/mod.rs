//! # Backend client
//!
//! reqwest transport for the inventory REST contract.

pub mod backend;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::models::{
    AuthResponse, LoginForm, Product, ProductId, ProductPayload, RegisterRequest, Session,
};

pub use backend::{AuthBackend, ProductBackend};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("inventory-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL. Segments are percent-encoded, so
    /// an identifier can never escape its position in the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, session: Option<&Session>) -> RequestBuilder {
        tracing::debug!(%method, %url, authenticated = session.is_some(), "backend request");
        let builder = self.http.request(method, url);
        match session {
            Some(s) => builder.bearer_auth(&s.token),
            None => builder,
        }
    }

    /// Send and turn non-2xx responses into a classified error.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let error = ClientError::from_status(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), code = error.error_code(), "backend rejected request: {}", error);
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProductBackend for ApiClient {
    async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let url = self.endpoint(&["products", "all"])?;
        let response = self.execute(self.request(Method::GET, url, None)).await?;
        let products: Vec<Product> = Self::decode(response).await?;
        tracing::debug!(count = products.len(), "fetched products");
        Ok(products)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, ClientError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        let response = self.execute(self.request(Method::GET, url, None)).await?;
        Self::decode(response).await
    }

    async fn create_product(
        &self,
        session: &Session,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError> {
        let url = self.endpoint(&["products"])?;
        let builder = self.request(Method::POST, url, Some(session)).json(payload);
        let response = self.execute(builder).await?;
        let product: Product = Self::decode(response).await?;
        tracing::info!(id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    async fn update_product(
        &self,
        session: &Session,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        let builder = self.request(Method::PUT, url, Some(session)).json(payload);
        let response = self.execute(builder).await?;
        let product: Product = Self::decode(response).await?;
        tracing::info!(id = %product.id, "product updated");
        Ok(product)
    }

    async fn delete_product(&self, session: &Session, id: &ProductId) -> Result<(), ClientError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        self.execute(self.request(Method::DELETE, url, Some(session)))
            .await?;
        tracing::info!(%id, "product deleted");
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, form: &LoginForm) -> Result<Session, ClientError> {
        let url = self.endpoint(&["auth", "login"])?;
        let response = self
            .execute(self.request(Method::POST, url, None).json(form))
            .await?;
        let auth: AuthResponse = Self::decode(response).await?;
        let session = Session::from(auth);
        tracing::info!(username = %session.user.username, "logged in");
        Ok(session)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Option<Session>, ClientError> {
        let url = self.endpoint(&["auth", "register"])?;
        let response = self
            .execute(self.request(Method::POST, url, None).json(request))
            .await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        let session = serde_json::from_value::<AuthResponse>(value)
            .ok()
            .map(Session::from);
        tracing::info!(username = %request.username, with_session = session.is_some(), "registered");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        let c = client("http://localhost:8000/api");
        assert_eq!(
            c.endpoint(&["products", "all"]).unwrap().as_str(),
            "http://localhost:8000/api/products/all"
        );
        let c = client("http://localhost:8000/api/");
        assert_eq!(
            c.endpoint(&["auth", "login"]).unwrap().as_str(),
            "http://localhost:8000/api/auth/login"
        );
    }

    #[test]
    fn identifiers_are_encoded_as_one_segment() {
        let c = client("http://localhost:8000/api");
        let url = c.endpoint(&["products", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/products/a%2Fb%20c");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
