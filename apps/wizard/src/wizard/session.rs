//! Session-wide signals shared between the controller and the presentation layer.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

/// What the controller is waiting on. Anything but `Idle` means busy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Activity {
    #[default]
    Idle,
    Analyzing,
    GeneratingCoverLetter,
}

impl Activity {
    pub fn is_busy(self) -> bool {
        self != Activity::Idle
    }

    /// Loading-overlay text.
    pub fn message(self) -> Option<&'static str> {
        match self {
            Activity::Idle => None,
            Activity::Analyzing => Some("Analyzing your resume..."),
            Activity::GeneratingCoverLetter => Some("Generating your cover letter..."),
        }
    }
}

struct Signals {
    activity: watch::Sender<Activity>,
    epoch: watch::Sender<u64>,
}

/// Cheap, cloneable view of a running session. Readable while a submit is suspended.
#[derive(Clone)]
pub struct SessionHandle {
    signals: Arc<Signals>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        let (activity, _) = watch::channel(Activity::Idle);
        let (epoch, _) = watch::channel(0);
        Self {
            signals: Arc::new(Signals { activity, epoch }),
        }
    }

    pub fn activity(&self) -> Activity {
        *self.signals.activity.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.activity().is_busy()
    }

    /// Receiver that wakes on every busy/idle change.
    pub fn subscribe(&self) -> watch::Receiver<Activity> {
        self.signals.activity.subscribe()
    }

    /// Supersedes the in-flight batch, if any. Its results are discarded and the
    /// session is restarted when it settles. No effect on batches launched later.
    pub fn interrupt(&self) {
        self.signals.epoch.send_modify(|epoch| *epoch += 1);
    }

    /// Marks the session busy until the returned guard is dropped.
    pub(crate) fn begin(&self, activity: Activity) -> ActivityGuard {
        self.signals.activity.send_replace(activity);
        ActivityGuard {
            handle: self.clone(),
        }
    }

    /// Resolves on the next `interrupt` after this call.
    pub(crate) fn interrupted(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut epoch = self.signals.epoch.subscribe();
        async move {
            if epoch.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("activity", &self.activity())
            .finish()
    }
}

/// Returns the session to `Idle` when dropped, including when the submit future
/// itself is dropped mid-flight.
pub(crate) struct ActivityGuard {
    handle: SessionHandle,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.handle.signals.activity.send_replace(Activity::Idle);
    }
}
