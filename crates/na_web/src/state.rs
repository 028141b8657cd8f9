use std::sync::Arc;

use na_inference::batch::BatchProcessor;

/// Largest accepted upload body.
pub const DEFAULT_UPLOAD_LIMIT: usize = 64 * 1024 * 1024;

pub struct AppState {
    pub processor: Arc<BatchProcessor>,
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(processor: BatchProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }

    pub fn with_upload_limit(mut self, bytes: usize) -> Self {
        self.upload_limit = bytes;
        self
    }
}
