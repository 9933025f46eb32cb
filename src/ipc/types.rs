use std::path::PathBuf;

use crate::store::GradeStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the daemon owns. Requests are handled one at a time.
#[derive(Debug, Default)]
pub struct AppState {
    pub dataset: Option<PathBuf>,
    pub store: GradeStore,
}
