use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use eoex_core::DispatchTable;
use eoex_core::FileSessionStore;
use eoex_core::ModuleId;
use eoex_core::Role;
use eoex_core::RolePolicy;
use eoex_core::SessionStore;
use eoex_core::ShellConfig;

use crate::login::load_config;

pub const NO_APPS_MESSAGE: &str = "No apps available for this role.";

/// Inspect which applications a role can open.
#[derive(Debug, Parser)]
pub struct AppsCli {
    /// Role to evaluate. Defaults to the role of the signed-in user.
    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Report catalog modules that have no view registered.
    #[arg(long, default_value_t = false)]
    pub check: bool,
}

pub fn run_apps(cli: AppsCli) -> Result<()> {
    let config = load_config()?;
    let role = match cli.role {
        Some(role) => Some(Role::new(role)),
        None => FileSessionStore::new(&config.eoex_home)
            .load()?
            .map(|session| session.user.role),
    };

    match role {
        Some(role) => print!("{}", render_apps(&config.policy, &role)),
        None if !cli.check => bail!("Not logged in; pass --role to choose a role"),
        None => {}
    }

    if cli.check {
        check_dispatch(&config)?;
    }
    Ok(())
}

/// One line per permitted application, in catalog order.
pub fn render_apps(policy: &RolePolicy, role: &Role) -> String {
    let permitted = policy.permitted_applications(Some(role));
    if permitted.is_empty() {
        return format!("{role}: {NO_APPS_MESSAGE}\n");
    }

    let mut out = format!("{role} ({})\n", policy.scope_label(role));
    let catalog = policy.catalog();
    for app in permitted {
        let Some(entry) = catalog.get(&app) else {
            continue;
        };
        let modules: Vec<&str> = entry.modules.iter().map(ModuleId::as_str).collect();
        out.push_str(&format!(
            "  {:<8} {}: {}\n",
            entry.id.as_str(),
            entry.label,
            modules.join(", ")
        ));
    }
    out
}

fn check_dispatch(config: &ShellConfig) -> Result<()> {
    let gaps = DispatchTable::standard().gaps(config.policy.catalog());
    if gaps.is_empty() {
        println!("Every catalog module has a view.");
        return Ok(());
    }
    for (app, module) in &gaps {
        println!("  missing view: {app} / {module}");
    }
    bail!("{} catalog module(s) have no view", gaps.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scoped_role_lists_single_app() {
        let policy = RolePolicy::default();
        let out = render_apps(&policy, &Role::from("service_level1"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("service_level1"));
        assert!(lines[1].trim_start().starts_with("SERVICE"));
    }

    #[test]
    fn privileged_role_lists_whole_catalog() {
        let policy = RolePolicy::default();
        let out = render_apps(&policy, &Role::from("system_admin"));
        assert_eq!(out.lines().count(), 1 + policy.catalog().entries().len());
        assert!(out.starts_with("system_admin (All Apps)"));
    }

    #[test]
    fn unscoped_role_gets_notice() {
        let out = render_apps(&RolePolicy::default(), &Role::from("contractor"));
        assert_eq!(out, "contractor: No apps available for this role.\n");
    }
}
