//! Raw form inputs collected by the presentation layer.
//!
//! The controller reads these and keeps the latest submitted copy for the session;
//! it never edits user-typed fields on its own, except when a file upload fills in
//! the extracted résumé text.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

use crate::errors::ValidationErrors;

/// Largest résumé upload accepted, in bytes (5 MiB).
pub const MAX_RESUME_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Lower-case file extensions the extraction service understands.
pub const ACCEPTED_RESUME_EXTENSIONS: &[&str] = &["pdf", "txt", "docx"];

pub const JOB_DESCRIPTION_REQUIRED: &str = "Job description is required";
pub const RESUME_REQUIRED: &str = "Please enter your resume or upload a file";
pub const FULL_NAME_REQUIRED: &str = "Your full name is required";
pub const COMPANY_NAME_REQUIRED: &str = "Company name is required";

/// A résumé document selected by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, keeping only its file name.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Lower-cased extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/octet-stream",
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let accepted = self
            .extension()
            .is_some_and(|ext| ACCEPTED_RESUME_EXTENSIONS.contains(&ext.as_str()));
        if !accepted {
            errors.push(
                "resume",
                format!(
                    "Unsupported file type '{}'. Upload a PDF, TXT or DOCX file",
                    self.file_name
                ),
            );
        }

        if self.bytes.len() > MAX_RESUME_FILE_BYTES {
            errors.push("resume", "File is larger than 5 MB");
        }

        errors.into_result()
    }
}

/// Job description plus résumé, as entered on the first wizard stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBundle {
    pub job_description: String,
    pub resume_text: String,
    pub resume_file: Option<ResumeFile>,
}

impl InputBundle {
    pub fn new(job_description: impl Into<String>, resume_text: impl Into<String>) -> Self {
        Self {
            job_description: job_description.into(),
            resume_text: resume_text.into(),
            resume_file: None,
        }
    }

    pub fn with_resume_file(mut self, file: ResumeFile) -> Self {
        self.resume_file = Some(file);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.job_description.trim().is_empty() {
            errors.push("job_description", JOB_DESCRIPTION_REQUIRED);
        }

        match &self.resume_file {
            Some(file) => {
                if let Err(file_errors) = file.validate() {
                    errors.merge(file_errors);
                }
            }
            None if self.resume_text.trim().is_empty() => {
                errors.push("resume", RESUME_REQUIRED);
            }
            None => {}
        }

        errors.into_result()
    }

    /// The résumé as sent to the analysis service.
    pub fn resume(&self) -> ResumeContent {
        let text = self.resume_text.trim();
        ResumeContent {
            text: (!text.is_empty()).then(|| self.resume_text.clone()),
            file: self.resume_file.clone(),
        }
    }
}

/// Résumé payload for a remote call: pasted text, an uploaded file, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeContent {
    pub text: Option<String>,
    pub file: Option<ResumeFile>,
}

impl ResumeContent {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.file.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicantProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl ApplicantProfile {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub hiring_manager: String,
    pub company_address: String,
}

impl CompanyProfile {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Self::default()
        }
    }
}

/// Required-field check for the second wizard stage.
pub fn validate_profile(
    applicant: &ApplicantProfile,
    company: &CompanyProfile,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if applicant.full_name.trim().is_empty() {
        errors.push("full_name", FULL_NAME_REQUIRED);
    }
    if company.company_name.trim().is_empty() {
        errors.push("company_name", COMPANY_NAME_REQUIRED);
    }
    errors.into_result()
}

/// `None` for blank optional fields so they are left out of requests.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
