#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};

use wizard::analysis_client::{AnalysisApi, ApiError, CoverLetterRequest};
use wizard::export::CoverLetterFile;
use wizard::models::inputs::{ResumeContent, ResumeFile};
use wizard::models::results::{ArtifactKind, KeywordReport, Similarity, SimilarityScore};
use wizard::wizard::RecordingNotifier;
use wizard::{InputBundle, OrchestrationController};

pub const JOB_DESCRIPTION: &str = "Senior Engineer role...";
pub const RESUME_TEXT: &str = "10 years experience...";

pub fn scenario_bundle() -> InputBundle {
    InputBundle::new(JOB_DESCRIPTION, RESUME_TEXT)
}

pub fn scenario_similarity() -> Similarity {
    Similarity {
        score: SimilarityScore::from_text("82%"),
        explanation: "Strong match".to_string(),
    }
}

pub fn scenario_keywords() -> KeywordReport {
    KeywordReport {
        missing: vec!["Kubernetes".to_string()],
        suggestions: "Add Kubernetes experience".to_string(),
    }
}

fn network_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 503,
        message: message.to_string(),
    }
}

/// In-process stand-in for the analysis service. Every operation answers from a
/// script that tests can change between calls. Optionally holds calls until
/// `release` is called.
pub struct ScriptedApi {
    summary: Mutex<Result<String, String>>,
    similarity: Mutex<Result<Similarity, String>>,
    keywords: Mutex<Result<KeywordReport, String>>,
    cover_letter: Mutex<Result<String, String>>,
    extracted_text: Mutex<Result<String, String>>,
    export_fails: Mutex<bool>,
    panics_on: Mutex<Option<ArtifactKind>>,
    calls: Mutex<Vec<ArtifactKind>>,
    cover_letter_requests: Mutex<Vec<CoverLetterRequest>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    started: Mutex<Option<mpsc::UnboundedSender<ArtifactKind>>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self {
            summary: Mutex::new(Ok("Experienced engineer...".to_string())),
            similarity: Mutex::new(Ok(scenario_similarity())),
            keywords: Mutex::new(Ok(scenario_keywords())),
            cover_letter: Mutex::new(Ok("Dear Hiring Manager...".to_string())),
            extracted_text: Mutex::new(Ok("Extracted resume text".to_string())),
            export_fails: Mutex::new(false),
            panics_on: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            cover_letter_requests: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
            started: Mutex::new(None),
        }
    }
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, kind: ArtifactKind, message: &str) {
        let err = message.to_string();
        match kind {
            ArtifactKind::Summary => *self.summary.lock().unwrap() = Err(err),
            ArtifactKind::Similarity => *self.similarity.lock().unwrap() = Err(err),
            ArtifactKind::Keywords => *self.keywords.lock().unwrap() = Err(err),
            ArtifactKind::CoverLetter => *self.cover_letter.lock().unwrap() = Err(err),
        }
    }

    pub fn succeed_summary(&self, summary: &str) {
        *self.summary.lock().unwrap() = Ok(summary.to_string());
    }

    pub fn fail_extraction(&self, message: &str) {
        *self.extracted_text.lock().unwrap() = Err(message.to_string());
    }

    /// Makes the `kind` call panic instead of answering. `None` stops it.
    pub fn panic_on(&self, kind: Option<ArtifactKind>) {
        *self.panics_on.lock().unwrap() = kind;
    }

    pub fn fail_export(&self) {
        *self.export_fails.lock().unwrap() = true;
    }

    /// Holds every call until `release`. Returns a receiver that yields the kind
    /// of each call as it starts.
    pub fn hold(&self) -> mpsc::UnboundedReceiver<ArtifactKind> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
        *self.started.lock().unwrap() = Some(tx);
        rx
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(1024);
        }
    }

    pub fn calls(&self) -> Vec<ArtifactKind> {
        self.calls.lock().unwrap().clone()
    }

    pub fn cover_letter_requests(&self) -> Vec<CoverLetterRequest> {
        self.cover_letter_requests.lock().unwrap().clone()
    }

    async fn enter(&self, kind: ArtifactKind) {
        self.calls.lock().unwrap().push(kind);
        if let Some(tx) = self.started.lock().unwrap().as_ref() {
            tx.send(kind).ok();
        }
        let panics = *self.panics_on.lock().unwrap() == Some(kind);
        if panics {
            panic!("{kind} call crashed");
        }
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
    }
}

#[async_trait]
impl AnalysisApi for ScriptedApi {
    async fn summarize(&self, resume: &ResumeContent) -> Result<String, ApiError> {
        assert!(!resume.is_empty());
        self.enter(ArtifactKind::Summary).await;
        self.summary.lock().unwrap().clone().map_err(|m| network_error(&m))
    }

    async fn score_similarity(
        &self,
        job_description: &str,
        _resume: &ResumeContent,
    ) -> Result<Similarity, ApiError> {
        assert!(!job_description.is_empty());
        self.enter(ArtifactKind::Similarity).await;
        self.similarity.lock().unwrap().clone().map_err(|m| network_error(&m))
    }

    async fn extract_keywords(
        &self,
        job_description: &str,
        _resume: &ResumeContent,
    ) -> Result<KeywordReport, ApiError> {
        assert!(!job_description.is_empty());
        self.enter(ArtifactKind::Keywords).await;
        self.keywords.lock().unwrap().clone().map_err(|m| network_error(&m))
    }

    async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<String, ApiError> {
        self.cover_letter_requests.lock().unwrap().push(request.clone());
        self.enter(ArtifactKind::CoverLetter).await;
        self.cover_letter.lock().unwrap().clone().map_err(|m| network_error(&m))
    }

    async fn extract_text(&self, _file: &ResumeFile) -> Result<String, ApiError> {
        self.extracted_text.lock().unwrap().clone().map_err(|m| network_error(&m))
    }

    async fn export_cover_letter(
        &self,
        cover_letter: &str,
        full_name: &str,
    ) -> Result<CoverLetterFile, ApiError> {
        if *self.export_fails.lock().unwrap() {
            return Err(network_error("export unavailable"));
        }
        Ok(CoverLetterFile::from_text(cover_letter, full_name))
    }
}

pub struct Harness {
    pub api: Arc<ScriptedApi>,
    pub notifier: RecordingNotifier,
    pub controller: OrchestrationController,
}

pub fn harness() -> Harness {
    let api = ScriptedApi::new();
    let notifier = RecordingNotifier::new();
    let controller = OrchestrationController::new(api.clone(), Arc::new(notifier.clone()));
    Harness {
        api,
        notifier,
        controller,
    }
}
