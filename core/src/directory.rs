//! Demo account directory shown on the login screen, in the admin
//! "User Directory" module and in the impersonation picker.

use serde::Deserialize;
use serde::Serialize;

use crate::policy::Role;
use crate::policy::RolePolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub label: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryRow {
    pub label: String,
    pub email: String,
    pub role: Role,
    pub app: String,
}

#[derive(Debug, Clone)]
pub struct UserDirectory {
    entries: Vec<DirectoryEntry>,
}

const DEMO_ACCOUNTS: &[(&str, &str, &str)] = &[
    ("System Admin", "system.admin@eoex.com", "system_admin"),
    ("CRM Manager", "crm.manager@eoex.com", "crm_manager"),
    ("Studio Manager", "studio.manager@eoex.com", "studio_manager"),
    ("ERP Manager", "erp.manager@eoex.com", "erp_manager"),
    ("Service Manager", "service.manager@eoex.com", "service_manager"),
    ("Business Development", "bdr@eoex.com", "crm_bdr"),
    ("Sales Account Manager", "sales.manager@eoex.com", "crm_sales_manager"),
    ("Marketing Manager", "marketing.manager@eoex.com", "studio_marketing_manager"),
    ("Digital Marketing", "digital.marketing@eoex.com", "studio_digital_marketing"),
    ("Campaign Manager", "campaign.manager@eoex.com", "studio_campaign_manager"),
    ("HR Manager", "hr.manager@eoex.com", "erp_hr_manager"),
    ("Finance Manager", "finance.manager@eoex.com", "erp_finance_manager"),
    ("Resource Planner", "resource.planner@eoex.com", "erp_resource_planning_manager"),
    ("CEO", "ceo@eoex.com", "erp_ceo"),
    ("Support L1", "support.l1@eoex.com", "service_level1"),
    ("Support L2", "support.l2@eoex.com", "service_level2"),
    ("Support L3", "support.l3@eoex.com", "service_level3"),
];

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new(
            DEMO_ACCOUNTS
                .iter()
                .map(|(label, email, role)| DirectoryEntry {
                    label: (*label).to_string(),
                    email: (*email).to_string(),
                    role: Role::from(*role),
                })
                .collect(),
        )
    }
}

impl UserDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn find_by_email(&self, email: &str) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.email.eq_ignore_ascii_case(email))
    }

    /// Accounts an administrator may impersonate: everyone except holders of
    /// the privileged role.
    pub fn impersonation_options(&self, policy: &RolePolicy) -> Vec<&DirectoryEntry> {
        self.entries
            .iter()
            .filter(|entry| !policy.is_privileged(&entry.role))
            .collect()
    }

    pub fn rows(&self, policy: &RolePolicy) -> Vec<DirectoryRow> {
        self.entries
            .iter()
            .map(|entry| DirectoryRow {
                label: entry.label.clone(),
                email: entry.email.clone(),
                role: entry.role.clone(),
                app: policy.scope_label(&entry.role),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn impersonation_excludes_privileged_accounts() {
        let directory = UserDirectory::default();
        let policy = RolePolicy::default();
        let options = directory.impersonation_options(&policy);
        assert_eq!(options.len(), directory.entries().len() - 1);
        assert!(options.iter().all(|entry| entry.role.as_str() != "system_admin"));
    }

    #[test]
    fn rows_carry_application_labels() {
        let directory = UserDirectory::default();
        let rows = directory.rows(&RolePolicy::default());
        let ceo = rows.iter().find(|row| row.label == "CEO").unwrap();
        assert_eq!(ceo.app, "ERP");
        let admin = rows.iter().find(|row| row.label == "System Admin").unwrap();
        assert_eq!(admin.app, "All Apps");
    }

    #[test]
    fn lookup_by_email_ignores_case() {
        let directory = UserDirectory::default();
        let entry = directory.find_by_email("Support.L1@EOEX.com").unwrap();
        assert_eq!(entry.role, Role::from("service_level1"));
        assert!(directory.find_by_email("nobody@eoex.com").is_none());
    }
}
