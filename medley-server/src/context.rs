use std::sync::Arc;

use axum::extract::FromRef;
use medley_library::{JsonFileStore, Library};

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub library: Arc<Library<JsonFileStore>>,
}
