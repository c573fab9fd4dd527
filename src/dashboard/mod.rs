//! # Dashboard
//!
//! Page layer around [`ProductListViewModel`]: runs the backend calls the
//! user's actions imply and feeds the results back into the view-model.
//! Every successful mutation is followed by a full re-fetch of the
//! collection; the local copy is never patched in place.

use crate::client::ProductBackend;
use crate::error::ClientError;
use crate::models::{FormError, ProductId, Session};
use crate::view_model::{ProductListViewModel, StatusMessage};

/// What came of a user action, for the caller to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    /// Another request is still in flight.
    Busy,
    /// Missing, expired or insufficient credentials.
    NeedsLogin,
    /// Input rejected, either locally or by the backend.
    Invalid(FormError),
    Failed(String),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

pub struct Dashboard<B> {
    backend: B,
    session: Option<Session>,
    view: ProductListViewModel,
}

impl<B: ProductBackend> Dashboard<B> {
    pub fn new(backend: B, session: Option<Session>) -> Self {
        Self {
            backend,
            session,
            view: ProductListViewModel::new(),
        }
    }

    pub fn view(&self) -> &ProductListViewModel {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ProductListViewModel {
        &mut self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Initial load when the dashboard opens.
    pub async fn mount(&mut self) -> Outcome {
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> Outcome {
        if self.view.is_loading() {
            return Outcome::Busy;
        }
        self.view.set_loading(true);
        let outcome = self.reload().await;
        self.view.set_loading(false);
        outcome
    }

    async fn reload(&mut self) -> Outcome {
        match self.backend.list_products().await {
            Ok(products) => {
                self.view.replace_collection(products);
                Outcome::Completed
            }
            Err(e) => self.fail(e, "Error fetching products"),
        }
    }

    /// Load `id` into the draft, preferring the copy already on screen.
    pub async fn begin_edit(&mut self, id: &ProductId) -> Outcome {
        if let Some(product) = self.view.find(id).cloned() {
            self.view.begin_edit(&product);
            return Outcome::Completed;
        }
        match self.backend.get_product(id).await {
            Ok(product) => {
                self.view.begin_edit(&product);
                Outcome::Completed
            }
            Err(e) => self.fail(e, "Product not found"),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.view.cancel_edit();
    }

    /// Create or update from the draft, depending on whether an edit is active.
    pub async fn submit(&mut self) -> Outcome {
        if self.view.is_loading() {
            return Outcome::Busy;
        }
        let Some(session) = self.session.clone() else {
            return self.needs_login();
        };
        let payload = match self.view.draft().to_payload() {
            Ok(payload) => payload,
            Err(form) => {
                self.view.set_status(StatusMessage::danger(form.message.clone()));
                return Outcome::Invalid(form);
            }
        };

        self.view.set_loading(true);
        let result = match self.view.edit_target().cloned() {
            Some(id) => self
                .backend
                .update_product(&session, &id, &payload)
                .await
                .map(|_| "Product updated successfully!"),
            None => self
                .backend
                .create_product(&session, &payload)
                .await
                .map(|_| "Product added successfully!"),
        };

        let outcome = match result {
            Ok(message) => {
                self.view.set_status(StatusMessage::success(message));
                self.view.cancel_edit();
                self.reload().await;
                Outcome::Completed
            }
            Err(e) => self.fail(e, "Error saving product"),
        };
        self.view.set_loading(false);
        outcome
    }

    pub async fn delete(&mut self, id: &ProductId) -> Outcome {
        if self.view.is_loading() {
            return Outcome::Busy;
        }
        let Some(session) = self.session.clone() else {
            return self.needs_login();
        };

        self.view.set_loading(true);
        let outcome = match self.backend.delete_product(&session, id).await {
            Ok(()) => {
                self.view.set_status(StatusMessage::success("Product deleted successfully!"));
                if self.view.edit_target() == Some(id) {
                    self.view.cancel_edit();
                }
                self.reload().await;
                Outcome::Completed
            }
            Err(e) => self.fail(e, "Error deleting product"),
        };
        self.view.set_loading(false);
        outcome
    }

    fn needs_login(&mut self) -> Outcome {
        self.view
            .set_status(StatusMessage::danger("Please log in to manage products"));
        Outcome::NeedsLogin
    }

    fn fail(&mut self, error: ClientError, fallback: &str) -> Outcome {
        tracing::warn!(code = error.error_code(), "{}: {}", fallback, error);

        if error.is_auth_failure() {
            let text = error.user_message("Your session has expired, please log in again");
            self.view.set_status(StatusMessage::danger(text));
            return Outcome::NeedsLogin;
        }

        match error {
            ClientError::Validation {
                message,
                field_errors,
            } => {
                self.view.set_status(StatusMessage::danger(message.clone()));
                Outcome::Invalid(FormError {
                    message,
                    field_errors,
                })
            }
            other => {
                let text = other.user_message(fallback);
                self.view.set_status(StatusMessage::danger(text.clone()));
                Outcome::Failed(text)
            }
        }
    }
}
