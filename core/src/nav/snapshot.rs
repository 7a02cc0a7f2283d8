use serde::Deserialize;
use serde::Serialize;

use crate::catalog::AppId;
use crate::catalog::ModuleId;
use crate::dispatch::ViewKind;
use crate::policy::Role;
use crate::session::Identity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTab {
    pub id: AppId,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTab {
    pub id: ModuleId,
    pub active: bool,
}

/// What the content area should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ViewState {
    SignedOut,
    NoApplications,
    Module {
        app: AppId,
        module: ModuleId,
        view: ViewKind,
    },
    ModuleUnavailable {
        app: AppId,
        module: ModuleId,
    },
}

/// Everything a renderer needs; renderers never see the session itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSnapshot {
    pub identity: Option<Identity>,
    pub effective_role: Option<Role>,
    pub impersonating: bool,
    pub apps: Vec<AppTab>,
    pub modules: Vec<ModuleTab>,
    pub menu_expanded: bool,
    pub view: ViewState,
}

impl NavSnapshot {
    pub fn signed_out(menu_expanded: bool) -> Self {
        Self {
            identity: None,
            effective_role: None,
            impersonating: false,
            apps: Vec::new(),
            modules: Vec::new(),
            menu_expanded,
            view: ViewState::SignedOut,
        }
    }

    pub fn active_app(&self) -> Option<&AppTab> {
        self.apps.iter().find(|tab| tab.active)
    }

    pub fn active_module(&self) -> Option<&ModuleTab> {
        self.modules.iter().find(|tab| tab.active)
    }
}
