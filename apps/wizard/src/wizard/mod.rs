// Analysis orchestration: stage machine, task batches, notifications and the
// controller that ties them to one user session.
// All remote calls go through analysis_client; nothing here talks HTTP.

pub mod batch;
pub mod controller;
pub mod notify;
pub mod session;
pub mod stage;

pub use batch::{BatchError, TaskBatch};
pub use controller::OrchestrationController;
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{Activity, SessionHandle};
pub use stage::{Direction, Stage, StageMachine};
