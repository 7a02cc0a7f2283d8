//! Root of the `eoex-core` library.
//!
//! Holds the application catalog, role policy, navigation state machine and
//! session persistence shared by every eoex front-end.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the front-end crates.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod catalog;
pub mod config;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod nav;
pub mod policy;
pub mod session;
pub mod store;

pub use catalog::AppId;
pub use catalog::ApplicationEntry;
pub use catalog::Catalog;
pub use catalog::ModuleId;
pub use config::ShellConfig;
pub use config::find_eoex_home;
pub use directory::UserDirectory;
pub use dispatch::DispatchTable;
pub use dispatch::Resolution;
pub use dispatch::ViewKind;
pub use nav::ActionApplied;
pub use nav::NavAction;
pub use nav::NavEvent;
pub use nav::NavSnapshot;
pub use nav::NavigationController;
pub use policy::Role;
pub use policy::RolePolicy;
pub use policy::RoleScope;
pub use session::AuthToken;
pub use session::Identity;
pub use session::Session;
pub use store::FileSessionStore;
pub use store::MemorySessionStore;
pub use store::SessionStore;
