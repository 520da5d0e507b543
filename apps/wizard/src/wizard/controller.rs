//! Orchestration controller. Owns one wizard session.
//!
//! Flow: submit_inputs (3-task analysis batch) → PersonalDetails →
//!       submit_profile (1-task cover letter batch) → ViewResults.
//!
//! Stage and results change only after a batch settles successfully, in one
//! step. A failed batch leaves both untouched. Callers must not start a second
//! submit while `is_busy()`; the `&mut self` receivers make that a compile-time
//! rule for a single owner.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::analysis_client::{AnalysisApi, ApiError, CoverLetterRequest, HttpAnalysisClient};
use crate::config::Config;
use crate::errors::{TaskError, WizardError};
use crate::export::CoverLetterFile;
use crate::models::inputs::{
    validate_profile, ApplicantProfile, CompanyProfile, InputBundle, ResumeContent, ResumeFile,
};
use crate::models::results::{Artifact, ArtifactKind, ResultSet};
use crate::wizard::batch::{BatchError, TaskBatch};
use crate::wizard::notify::{Notification, Notifier};
use crate::wizard::session::{Activity, SessionHandle};
use crate::wizard::stage::{Direction, Stage, StageMachine};

pub struct OrchestrationController {
    session_id: Uuid,
    api: Arc<dyn AnalysisApi>,
    notifier: Arc<dyn Notifier>,
    task_timeout: Option<Duration>,
    handle: SessionHandle,
    stages: StageMachine,
    results: ResultSet,
    inputs: InputBundle,
    applicant: ApplicantProfile,
    company: CompanyProfile,
}

impl OrchestrationController {
    pub fn new(api: Arc<dyn AnalysisApi>, notifier: Arc<dyn Notifier>) -> Self {
        let session_id = Uuid::new_v4();
        info!("Starting wizard session {session_id}");
        Self {
            session_id,
            api,
            notifier,
            task_timeout: None,
            handle: SessionHandle::new(),
            stages: StageMachine::new(),
            results: ResultSet::new(),
            inputs: InputBundle::default(),
            applicant: ApplicantProfile::default(),
            company: CompanyProfile::default(),
        }
    }

    /// Controller backed by the HTTP analysis client described by `config`.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let api = HttpAnalysisClient::from_config(config)?.into_shared();
        Ok(Self::new(api, notifier).with_task_timeout(config.task_timeout))
    }

    pub fn with_task_timeout(mut self, limit: Option<Duration>) -> Self {
        self.task_timeout = limit;
        self
    }

    // ────────────────────────────────────────────────────────────────────────
    // Read accessors
    // ────────────────────────────────────────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> Stage {
        self.stages.current_stage()
    }

    pub fn direction(&self) -> Direction {
        self.stages.direction()
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn inputs(&self) -> &InputBundle {
        &self.inputs
    }

    pub fn applicant(&self) -> &ApplicantProfile {
        &self.applicant
    }

    pub fn company(&self) -> &CompanyProfile {
        &self.company
    }

    /// Form state for in-place edits by the presentation layer.
    pub fn inputs_mut(&mut self) -> &mut InputBundle {
        &mut self.inputs
    }

    pub fn applicant_mut(&mut self) -> &mut ApplicantProfile {
        &mut self.applicant
    }

    pub fn company_mut(&mut self) -> &mut CompanyProfile {
        &mut self.company
    }

    /// Handle for observing the busy signal (and interrupting) from elsewhere.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.handle.is_busy()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Workflows
    // ────────────────────────────────────────────────────────────────────────

    /// Validates the inputs, then runs summary, similarity and keyword analysis
    /// together. All three must succeed to advance to `PersonalDetails`.
    #[instrument(skip_all, fields(session = %self.session_id))]
    pub async fn submit_inputs(&mut self, bundle: InputBundle) -> Result<(), WizardError> {
        self.expect_stage(Stage::UploadInputs)?;
        bundle.validate()?;
        self.inputs = bundle;

        let job_description = self.inputs.job_description.clone();
        let resume = self.inputs.resume();

        let batch = TaskBatch::new()
            .with_task_timeout(self.task_timeout)
            .push(
                ArtifactKind::Summary,
                summarize_task(Arc::clone(&self.api), resume.clone()),
            )
            .push(
                ArtifactKind::Similarity,
                similarity_task(Arc::clone(&self.api), job_description.clone(), resume.clone()),
            )
            .push(
                ArtifactKind::Keywords,
                keywords_task(Arc::clone(&self.api), job_description, resume),
            );

        let artifacts = self.run_batch(batch, Activity::Analyzing).await?;
        self.results.merge(artifacts);
        self.stages.advance_to(Stage::PersonalDetails, Direction::Forward);
        info!("Analysis complete; moved to {:?}", self.stage());
        self.notifier.notify(Notification::analysis_complete());
        Ok(())
    }

    /// Generates the cover letter from the stored inputs plus the given profiles
    /// and advances to `ViewResults` on success.
    #[instrument(skip_all, fields(session = %self.session_id))]
    pub async fn submit_profile(
        &mut self,
        applicant: ApplicantProfile,
        company: CompanyProfile,
    ) -> Result<(), WizardError> {
        self.expect_stage(Stage::PersonalDetails)?;
        validate_profile(&applicant, &company)?;
        self.applicant = applicant;
        self.company = company;

        let request = CoverLetterRequest {
            job_description: self.inputs.job_description.clone(),
            resume: self.inputs.resume(),
            applicant: self.applicant.clone(),
            company: self.company.clone(),
        };

        let batch = TaskBatch::new()
            .with_task_timeout(self.task_timeout)
            .push(
                ArtifactKind::CoverLetter,
                cover_letter_task(Arc::clone(&self.api), request),
            );

        let artifacts = self.run_batch(batch, Activity::GeneratingCoverLetter).await?;
        self.results.merge(artifacts);
        self.stages.advance_to(Stage::ViewResults, Direction::Forward);
        info!("Cover letter generated; moved to {:?}", self.stage());
        self.notifier.notify(Notification::cover_letter_ready());
        Ok(())
    }

    /// One stage back. Results are kept. Returns whether the stage changed.
    pub fn go_back(&mut self) -> bool {
        let moved = self.stages.back();
        if moved {
            info!(session = %self.session_id, "Back to {:?}", self.stage());
        }
        moved
    }

    /// Clears every form and result and returns to the first stage.
    pub fn restart(&mut self) {
        self.inputs = InputBundle::default();
        self.applicant = ApplicantProfile::default();
        self.company = CompanyProfile::default();
        self.results.clear();
        self.stages.reset_to_start();
        info!(session = %self.session_id, "Session restarted");
    }

    // ────────────────────────────────────────────────────────────────────────
    // File handling
    // ────────────────────────────────────────────────────────────────────────

    /// Uploads a résumé file for text extraction. On success the file is attached
    /// to the inputs and the extracted text replaces the pasted résumé.
    #[instrument(skip_all, fields(session = %self.session_id, file = %file.file_name))]
    pub async fn attach_resume_file(&mut self, file: ResumeFile) -> Result<String, WizardError> {
        self.expect_stage(Stage::UploadInputs)?;
        file.validate()?;

        match self.api.extract_text(&file).await {
            Ok(text) => {
                info!("Extracted {} characters", text.len());
                self.inputs.resume_file = Some(file);
                self.inputs.resume_text = text.clone();
                self.notifier.notify(Notification::resume_uploaded());
                Ok(text)
            }
            Err(e) => {
                warn!("Text extraction failed: {e}");
                self.notifier.notify(Notification::resume_unreadable());
                Err(WizardError::Extraction(e))
            }
        }
    }

    pub fn detach_resume_file(&mut self) {
        self.inputs.resume_file = None;
        self.inputs.resume_text.clear();
    }

    /// Downloadable copy of the generated cover letter.
    #[instrument(skip_all, fields(session = %self.session_id))]
    pub async fn export_cover_letter(&self) -> Result<CoverLetterFile, WizardError> {
        let cover_letter = self
            .results
            .cover_letter()
            .ok_or(WizardError::NoCoverLetter)?;

        match self
            .api
            .export_cover_letter(cover_letter, self.applicant.full_name.trim())
            .await
        {
            Ok(file) => {
                self.notifier.notify(Notification::download_succeeded());
                Ok(file)
            }
            Err(e) => {
                warn!("Cover letter export failed: {e}");
                self.notifier.notify(Notification::download_failed());
                Err(WizardError::Export(e))
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Internals
    // ────────────────────────────────────────────────────────────────────────

    fn expect_stage(&self, expected: Stage) -> Result<(), WizardError> {
        let actual = self.stage();
        if actual == expected {
            Ok(())
        } else {
            Err(WizardError::OutOfOrder { expected, actual })
        }
    }

    /// Runs a batch with the busy signal raised. Emits the failure notification;
    /// success notifications are left to the caller. An interrupted batch restarts
    /// the session.
    async fn run_batch(
        &mut self,
        batch: TaskBatch<ArtifactKind, Artifact>,
        activity: Activity,
    ) -> Result<Vec<Artifact>, WizardError> {
        let interrupted = self.handle.interrupted();
        let outcome = {
            let _busy = self.handle.begin(activity);
            info!("Launching {} task(s)", batch.len());
            batch.run_until(interrupted).await
        };

        match outcome {
            Ok(values) => Ok(values.into_iter().map(|(_, artifact)| artifact).collect()),
            Err(BatchError::TaskFailed { tag, source }) => {
                self.notifier.notify(Notification::task_failed(tag));
                Err(WizardError::Task { kind: tag, source })
            }
            Err(BatchError::Interrupted) => {
                info!("Batch superseded; discarding results");
                self.restart();
                Err(WizardError::Superseded)
            }
        }
    }
}

async fn summarize_task(
    api: Arc<dyn AnalysisApi>,
    resume: ResumeContent,
) -> Result<Artifact, TaskError> {
    Ok(Artifact::Summary(api.summarize(&resume).await?))
}

async fn similarity_task(
    api: Arc<dyn AnalysisApi>,
    job_description: String,
    resume: ResumeContent,
) -> Result<Artifact, TaskError> {
    let similarity = api.score_similarity(&job_description, &resume).await?;
    Ok(Artifact::Similarity(similarity))
}

async fn keywords_task(
    api: Arc<dyn AnalysisApi>,
    job_description: String,
    resume: ResumeContent,
) -> Result<Artifact, TaskError> {
    let keywords = api.extract_keywords(&job_description, &resume).await?;
    Ok(Artifact::Keywords(keywords))
}

async fn cover_letter_task(
    api: Arc<dyn AnalysisApi>,
    request: CoverLetterRequest,
) -> Result<Artifact, TaskError> {
    Ok(Artifact::CoverLetter(api.generate_cover_letter(&request).await?))
}
