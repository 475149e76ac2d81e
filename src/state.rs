//! Shared application state for all routes.

use crate::store::Storage;
use crate::upload::UploadStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Backend chosen at startup; handlers only see the trait.
    pub store: Arc<dyn Storage>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, uploads: UploadStore) -> Self {
        AppState {
            store,
            uploads: Arc::new(uploads),
        }
    }
}
