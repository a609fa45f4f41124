//! Remote resource state shared by list pages and the dashboard.
//!
//! A failed refresh keeps the last good value so pages can keep showing it
//! (marked stale) next to the error.

use std::future::Future;

use podium_core::types::Timestamp;

use crate::error::FetchError;

/// What a page should render for a resource.
#[derive(Debug, PartialEq)]
pub enum RemoteState<'a, T> {
    Idle,
    Loading,
    Ready(&'a T),
    Failed(&'a FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Remote<T> {
    data: Option<T>,
    error: Option<FetchError>,
    loading: bool,
    fetched_at: Option<Timestamp>,
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            fetched_at: None,
        }
    }
}

impl<T> Remote<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    /// Apply a fetch result. Success replaces the value and clears the
    /// error; failure records the error and keeps the previous value.
    pub fn resolve(&mut self, result: Result<T, FetchError>) {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.fetched_at = Some(chrono::Utc::now());
            }
            Err(error) => {
                self.error = Some(error);
            }
        }
    }

    /// Run `fetch` and apply its result.
    pub async fn refresh<F>(&mut self, fetch: F)
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        self.start_loading();
        let result = fetch.await;
        self.resolve(result);
    }

    /// Loading and error take precedence over data, matching what a page
    /// shows first.
    pub fn state(&self) -> RemoteState<'_, T> {
        if self.loading {
            return RemoteState::Loading;
        }
        match (&self.error, &self.data) {
            (Some(error), _) => RemoteState::Failed(error),
            (None, Some(data)) => RemoteState::Ready(data),
            (None, None) => RemoteState::Idle,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A value is shown but the latest refresh failed.
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }

    pub fn fetched_at(&self) -> Option<Timestamp> {
        self.fetched_at
    }
}
