/// Analysis client: the single point of entry for calls to the remote analysis service.
///
/// The controller depends only on the `AnalysisApi` trait; `HttpAnalysisClient`
/// is the production backend. There is no retry here: a failed call fails the
/// task, and the user resubmits.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::export::{cover_letter_file_name, file_name_from_disposition, CoverLetterFile};
use crate::models::inputs::{non_blank, ApplicantProfile, CompanyProfile, ResumeContent, ResumeFile};
use crate::models::results::{KeywordReport, Similarity};

pub mod wire;

use wire::{
    CoverLetterResponse, ErrorBody, KeywordsResponse, SimilarityResponse, SummaryResponse,
    UploadResponse,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No resume provided")]
    MissingResume,
}

/// Everything the cover-letter endpoint needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterRequest {
    pub job_description: String,
    pub resume: ResumeContent,
    pub applicant: ApplicantProfile,
    pub company: CompanyProfile,
}

/// Remote operations the wizard delegates to. Swap implementations without
/// touching the controller; tests use an in-process fake.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn summarize(&self, resume: &ResumeContent) -> Result<String, ApiError>;

    async fn score_similarity(
        &self,
        job_description: &str,
        resume: &ResumeContent,
    ) -> Result<Similarity, ApiError>;

    async fn extract_keywords(
        &self,
        job_description: &str,
        resume: &ResumeContent,
    ) -> Result<KeywordReport, ApiError>;

    async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<String, ApiError>;

    async fn extract_text(&self, file: &ResumeFile) -> Result<String, ApiError>;

    async fn export_cover_letter(
        &self,
        cover_letter: &str,
        full_name: &str,
    ) -> Result<CoverLetterFile, ApiError>;
}

/// `reqwest` backend speaking multipart forms to the analysis service.
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.analysis_api_url.clone(), config.request_timeout)
    }

    pub fn into_shared(self) -> Arc<dyn AnalysisApi> {
        Arc::new(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, form: Form) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Analysis API returned {status} for {path}: {body}");
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message())
            .unwrap_or(body);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let response = self.post(path, form).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiError::Parse)
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn summarize(&self, resume: &ResumeContent) -> Result<String, ApiError> {
        let form = resume_form(Form::new(), resume)?;
        let response: SummaryResponse = self.post_json("/analysis/summary", form).await?;
        Ok(response.summary)
    }

    async fn score_similarity(
        &self,
        job_description: &str,
        resume: &ResumeContent,
    ) -> Result<Similarity, ApiError> {
        let form = Form::new().text("job_description", job_description.to_string());
        let form = resume_form(form, resume)?;
        let response: SimilarityResponse = self.post_json("/analysis/similarity", form).await?;
        Ok(response.into())
    }

    async fn extract_keywords(
        &self,
        job_description: &str,
        resume: &ResumeContent,
    ) -> Result<KeywordReport, ApiError> {
        let form = Form::new().text("job_description", job_description.to_string());
        let form = resume_form(form, resume)?;
        let response: KeywordsResponse = self.post_json("/analysis/keywords", form).await?;
        Ok(response.into())
    }

    async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<String, ApiError> {
        let mut form = Form::new()
            .text("job_description", request.job_description.clone())
            .text("company_name", request.company.company_name.trim().to_string())
            .text("full_name", request.applicant.full_name.trim().to_string());
        form = resume_form(form, &request.resume)?;

        let optional = [
            ("hiring_manager", request.company.hiring_manager.as_str()),
            ("company_address", request.company.company_address.as_str()),
            ("email", request.applicant.email.as_str()),
            ("phone", request.applicant.phone.as_str()),
            ("address", request.applicant.address.as_str()),
        ];
        for (field, value) in optional {
            if let Some(value) = non_blank(value) {
                form = form.text(field, value.to_string());
            }
        }

        let response: CoverLetterResponse = self.post_json("/generate/cover-letter", form).await?;
        Ok(response.cover_letter)
    }

    async fn extract_text(&self, file: &ResumeFile) -> Result<String, ApiError> {
        let form = Form::new().part("file", file_part(file)?);
        let response: UploadResponse = self.post_json("/documents/upload", form).await?;
        Ok(response.content)
    }

    async fn export_cover_letter(
        &self,
        cover_letter: &str,
        full_name: &str,
    ) -> Result<CoverLetterFile, ApiError> {
        let form = Form::new()
            .text("cover_letter", cover_letter.to_string())
            .text("full_name", full_name.to_string());
        let response = self.post("/generate/download-cover-letter", form).await?;

        let headers = response.headers();
        let file_name = headers
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| cover_letter_file_name(full_name));
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/plain")
            .to_string();
        let bytes = response.bytes().await?;

        Ok(CoverLetterFile {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn resume_form(mut form: Form, resume: &ResumeContent) -> Result<Form, ApiError> {
    if resume.is_empty() {
        return Err(ApiError::MissingResume);
    }
    if let Some(text) = &resume.text {
        form = form.text("resume", text.clone());
    }
    if let Some(file) = &resume.file {
        form = form.part("resume_file", file_part(file)?);
    }
    Ok(form)
}

fn file_part(file: &ResumeFile) -> Result<Part, ApiError> {
    Ok(Part::bytes(file.bytes.to_vec())
        .file_name(file.file_name.clone())
        .mime_str(file.mime_type())?)
}
