use std::time::Duration;

use thiserror::Error;

use crate::analysis_client::ApiError;
use crate::models::results::ArtifactKind;
use crate::wizard::stage::Stage;

/// A single form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected field errors from one validation pass. Never reaches a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render_fields(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for `field`, if that field failed.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn render_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of one task inside a batch.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("task timed out after {0:?}")]
    TimedOut(Duration),

    #[error("task aborted: {0}")]
    Aborted(String),
}

/// Error surface of the orchestration controller.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Operation not allowed in stage {actual:?} (expected {expected:?})")]
    OutOfOrder { expected: Stage, actual: Stage },

    #[error("{kind} task failed: {source}")]
    Task {
        kind: ArtifactKind,
        #[source]
        source: TaskError,
    },

    #[error("Batch was superseded by a restart")]
    Superseded,

    #[error("Text extraction failed: {0}")]
    Extraction(#[source] ApiError),

    #[error("Cover letter export failed: {0}")]
    Export(#[source] ApiError),

    #[error("No cover letter has been generated yet")]
    NoCoverLetter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_validation_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("job_description", "Job description is required");
        errors.push("resume", "Please enter your resume or upload a file");

        let rendered = errors.to_string();
        assert!(rendered.contains("job_description: Job description is required"));
        assert!(rendered.contains("resume: Please enter"));
        assert_eq!(
            errors.message_for("resume"),
            Some("Please enter your resume or upload a file")
        );
        assert_eq!(errors.message_for("full_name"), None);
    }

    #[test]
    fn test_task_error_names_the_artifact() {
        let err = WizardError::Task {
            kind: ArtifactKind::Similarity,
            source: TaskError::TimedOut(Duration::from_secs(5)),
        };
        assert_eq!(err.to_string(), "similarity task failed: task timed out after 5s");
    }
}
