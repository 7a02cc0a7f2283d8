use serde::Deserialize;
use serde::Serialize;

use crate::catalog::AppId;
use crate::catalog::ModuleId;

/// Side-channel notifications produced while applying actions. Drained by the
/// runtime with `take_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NavEvent {
    /// The session store now mirrors the in-memory credentials.
    Persisted,
    PersistFailed {
        message: String,
    },
    /// Persisted credentials could not be read at startup; the shell starts
    /// signed out.
    HydrateFailed {
        message: String,
    },
    LoginFailed {
        message: String,
    },
    /// The selection was repaired after an effective-role change.
    Reconciled {
        from: Option<AppId>,
        to: Option<AppId>,
    },
    /// The current pair is valid per the catalog but has no renderer.
    DispatchGap {
        app: AppId,
        module: ModuleId,
    },
}
