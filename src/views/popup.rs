//! Detail popup state
//!
//! Loading flag, error message and loaded record for a read-only popup.

use std::future::Future;

use crate::transport::ApiResult;

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPopup<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<T>,
    pub open: bool,
}

impl<T> Default for DetailPopup<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            data: None,
            open: false,
        }
    }
}

impl<T> DetailPopup<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and load; failures store the error's user-facing message
    pub async fn load<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = ApiResult<T>>,
    {
        self.begin();
        match fetch.await {
            Ok(data) => self.finish(data),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load details");
                self.fail(e.user_message())
            }
        }
    }

    /// Open and load; failures store `message` instead of the error text
    pub async fn load_or<F>(&mut self, fetch: F, message: &str) -> bool
    where
        F: Future<Output = ApiResult<T>>,
    {
        self.begin();
        match fetch.await {
            Ok(data) => self.finish(data),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load details");
                self.fail(message.to_string())
            }
        }
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    fn begin(&mut self) {
        self.open = true;
        self.loading = true;
        self.error = None;
        self.data = None;
    }

    fn finish(&mut self, data: T) -> bool {
        self.data = Some(data);
        self.loading = false;
        true
    }

    fn fail(&mut self, message: String) -> bool {
        self.error = Some(message);
        self.loading = false;
        false
    }
}
