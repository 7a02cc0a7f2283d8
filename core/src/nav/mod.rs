//! Role-gated navigation state machine.
//!
//! User intent is expressed as [`NavAction`] values, validated by
//! [`AccessGuard`] against the [`RolePolicy`](crate::policy::RolePolicy), and
//! applied to the session owned by [`NavigationController`]. Front-ends (TUI,
//! CLI) consume the resulting [`NavSnapshot`] to draw tabs, menus and the
//! module view.

mod action;
mod event;
mod guard;
mod snapshot;
mod state;

pub use action::NavAction;
pub use action::NavActionId;
pub use event::NavEvent;
pub use guard::AccessGuard;
pub use guard::GuardContext;
pub use guard::RejectReason;
pub use snapshot::AppTab;
pub use snapshot::ModuleTab;
pub use snapshot::NavSnapshot;
pub use snapshot::ViewState;
pub use state::ActionApplied;
pub use state::LoginOutcome;
pub use state::LoginTicket;
pub use state::NavigationController;
