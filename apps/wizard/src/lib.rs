//! Guided résumé analysis wizard.
//!
//! Turns a résumé and a job description into a summary, a similarity score, a
//! missing-keyword report and a cover letter by delegating each artifact to the
//! remote analysis service. `OrchestrationController` drives the three wizard
//! stages and owns all session state.

pub mod analysis_client;
pub mod config;
pub mod errors;
pub mod export;
pub mod models;
pub mod telemetry;
pub mod wizard;

pub use analysis_client::{AnalysisApi, ApiError, CoverLetterRequest, HttpAnalysisClient};
pub use config::Config;
pub use errors::{TaskError, ValidationErrors, WizardError};
pub use export::CoverLetterFile;
pub use models::inputs::{ApplicantProfile, CompanyProfile, InputBundle, ResumeFile};
pub use models::results::{Artifact, ArtifactKind, KeywordReport, ResultSet, Similarity};
pub use wizard::{Activity, Direction, OrchestrationController, SessionHandle, Stage};
