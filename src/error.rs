use thiserror::Error;

use crate::classifier::ClassifierError;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("a score update is already in flight")]
    UpdatePending,

    #[error("no factor at row {0}")]
    UnknownFactor(usize),

    #[error("text is required")]
    EmptyText,

    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("score update task failed: {0}")]
    UpdateTask(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
