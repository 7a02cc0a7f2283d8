use std::sync::Arc;

use eoex_core::ActionApplied;
use eoex_core::AppId;
use eoex_core::AuthToken;
use eoex_core::DispatchTable;
use eoex_core::FileSessionStore;
use eoex_core::Identity;
use eoex_core::NavigationController;
use eoex_core::Role;
use eoex_core::SessionStore;
use eoex_core::ShellConfig;
use eoex_core::nav::ViewState;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn controller(home: &TempDir) -> NavigationController {
    let config = ShellConfig::load(home.path()).expect("default config");
    NavigationController::new(
        config.policy,
        DispatchTable::standard(),
        Arc::new(FileSessionStore::new(home.path())),
    )
}

#[test]
fn credentials_survive_restart_but_impersonation_does_not() {
    let home = TempDir::new().expect("tempdir");

    let mut first = controller(&home);
    first.login(
        Identity::new("System Admin", "system.admin@eoex.com", Role::from("system_admin")),
        AuthToken::new("jwt"),
    );
    assert_eq!(
        first.impersonate(Some(Role::from("erp_hr_manager"))),
        ActionApplied::StateChanged
    );
    assert_eq!(first.permitted_applications(), vec![AppId::from("ERP")]);

    let mut second = controller(&home);
    assert_eq!(second.hydrate(), ActionApplied::StateChanged);
    let snapshot = second.snapshot();
    assert!(!snapshot.impersonating);
    assert_eq!(snapshot.effective_role, Some(Role::from("system_admin")));
    assert_eq!(snapshot.apps.len(), second.policy().catalog().entries().len());
    assert!(matches!(snapshot.view, ViewState::Module { .. }));
}

#[test]
fn restored_scoped_role_lands_on_first_module() {
    let home = TempDir::new().expect("tempdir");
    controller(&home).login(
        Identity::new("Support L1", "support.l1@eoex.com", Role::from("service_level1")),
        AuthToken::new("jwt"),
    );

    let mut restored = controller(&home);
    restored.hydrate();
    assert_eq!(restored.session().current_app(), Some(&AppId::from("SERVICE")));
    let first_module = restored
        .policy()
        .catalog()
        .first_module(&AppId::from("SERVICE"))
        .cloned();
    assert_eq!(restored.session().current_module().cloned(), first_module);
    assert!(first_module.is_some());
}

#[test]
fn logout_removes_persisted_session() {
    let home = TempDir::new().expect("tempdir");
    let mut nav = controller(&home);
    nav.login(
        Identity::new("CEO", "ceo@eoex.com", Role::from("erp_ceo")),
        AuthToken::new("jwt"),
    );
    assert!(home.path().join("session.json").exists());

    assert_eq!(nav.logout(), ActionApplied::StateChanged);
    assert_eq!(
        FileSessionStore::new(home.path()).load().expect("load"),
        None
    );

    let mut restored = controller(&home);
    assert_eq!(restored.hydrate(), ActionApplied::NoChange);
    assert_eq!(restored.snapshot().view, ViewState::SignedOut);
}
