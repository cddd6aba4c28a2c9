use market_data::{ConfigError, FeedError};
use persistence::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Central error type for the application shell
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Flag store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid engine config: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Toast not found: {0}")]
    ToastNotFound(Uuid),

    #[error("Toast {id} has no action at index {index}")]
    ToastActionNotFound { id: Uuid, index: usize },

    #[error("Application context already disposed")]
    Disposed,
}
