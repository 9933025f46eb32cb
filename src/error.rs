use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradebookError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid dataset: {message}")]
    Dataset { message: String },
}

impl GradebookError {
    pub fn validation(message: impl Into<String>) -> Self {
        GradebookError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        GradebookError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable error code reported over IPC.
    pub fn code(&self) -> &'static str {
        match self {
            GradebookError::Validation { .. } => "validation_error",
            GradebookError::NotFound { .. } => "not_found",
            GradebookError::Dataset { .. } => "dataset_invalid",
        }
    }
}

pub type GradebookResult<T> = Result<T, GradebookError>;
