//! Two-level dispatch table: application → module → render capability.
//!
//! The table may be sparse. Looking up a pair that was never registered is a
//! normal outcome reported as [`Resolution::NotFound`].

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::catalog::AppId;
use crate::catalog::Catalog;
use crate::catalog::ModuleId;

/// Kind of view a module is drawn with. Carries no data; renderers fetch
/// their own content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ViewKind {
    Dashboard,
    ListView { title: String },
    Cards { title: String },
    Reports,
    Calendar { title: String },
    AdminDashboard,
    UserDirectory,
}

impl ViewKind {
    fn list(title: &str) -> Self {
        ViewKind::ListView {
            title: title.to_string(),
        }
    }

    fn cards(title: &str) -> Self {
        ViewKind::Cards {
            title: title.to_string(),
        }
    }

    fn calendar(title: &str) -> Self {
        ViewKind::Calendar {
            title: title.to_string(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ViewKind::Dashboard => "Overview",
            ViewKind::ListView { title }
            | ViewKind::Cards { title }
            | ViewKind::Calendar { title } => title,
            ViewKind::Reports => "Reports",
            ViewKind::AdminDashboard => "Admin Command Center",
            ViewKind::UserDirectory => "User Directory",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a, R> {
    Found(&'a R),
    NotFound,
}

impl<'a, R> Resolution<'a, R> {
    pub fn found(self) -> Option<&'a R> {
        match self {
            Resolution::Found(capability) => Some(capability),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

#[derive(Debug, Clone)]
pub struct DispatchTable<R = ViewKind> {
    routes: HashMap<AppId, HashMap<ModuleId, R>>,
}

impl<R> DispatchTable<R> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Registers (or replaces) the capability for a pair.
    pub fn register(&mut self, app: AppId, module: ModuleId, capability: R) -> &mut Self {
        self.routes
            .entry(app)
            .or_default()
            .insert(module, capability);
        self
    }

    pub fn resolve(&self, app: &AppId, module: &ModuleId) -> Resolution<'_, R> {
        self.routes
            .get(app)
            .and_then(|modules| modules.get(module))
            .map_or(Resolution::NotFound, Resolution::Found)
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Catalog pairs with no registered capability, in catalog order.
    pub fn gaps(&self, catalog: &Catalog) -> Vec<(AppId, ModuleId)> {
        catalog
            .entries()
            .iter()
            .flat_map(|entry| {
                entry
                    .modules
                    .iter()
                    .map(move |module| (entry.id.clone(), module.clone()))
            })
            .filter(|(app, module)| !self.resolve(app, module).is_found())
            .collect()
    }
}

impl<R> Default for DispatchTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTable<ViewKind> {
    /// Renderer table for the default catalog.
    pub fn standard() -> Self {
        let mut table = Self::new();
        let routes: [(&str, &str, ViewKind); 31] = [
            ("CRM", "Dashboard", ViewKind::Dashboard),
            ("CRM", "Campaigns", ViewKind::list("Campaigns")),
            ("CRM", "Leads", ViewKind::list("Leads")),
            ("CRM", "Opportunities", ViewKind::list("Opportunities")),
            ("CRM", "Accounts", ViewKind::list("Accounts")),
            ("CRM", "Contacts", ViewKind::list("Contacts")),
            ("CRM", "Tasks", ViewKind::list("Tasks")),
            ("CRM", "Reports", ViewKind::Reports),
            ("CRM", "Calendar", ViewKind::calendar("Sales Forecast")),
            ("STUDIO", "Dashboard", ViewKind::Dashboard),
            ("STUDIO", "Campaigns", ViewKind::list("Campaigns")),
            ("STUDIO", "Leads", ViewKind::list("Leads")),
            ("STUDIO", "Calendar", ViewKind::calendar("Editorial Calendar")),
            ("STUDIO", "Message Editor", ViewKind::cards("Message Editor")),
            ("STUDIO", "Contents Scheduler", ViewKind::cards("Contents Scheduler")),
            ("ERP", "Dashboard", ViewKind::Dashboard),
            ("ERP", "Asset Manager", ViewKind::list("Assets")),
            ("ERP", "Finances", ViewKind::cards("Finances")),
            ("ERP", "HR", ViewKind::list("HR Team")),
            ("ERP", "Strategies", ViewKind::cards("Strategies")),
            ("ERP", "QA & Risk", ViewKind::cards("QA & Risk")),
            ("ERP", "Calendar", ViewKind::calendar("Operations Planner")),
            ("SERVICE", "Dashboard", ViewKind::Dashboard),
            ("SERVICE", "High SLA Tickets", ViewKind::list("High SLA")),
            ("SERVICE", "Mid SLA Tickets", ViewKind::list("Mid SLA")),
            ("SERVICE", "Low SLA Tickets", ViewKind::list("Low SLA")),
            ("SERVICE", "Calendar", ViewKind::calendar("Support Calendar")),
            ("ADMIN", "Dashboard", ViewKind::AdminDashboard),
            ("ADMIN", "User Directory", ViewKind::UserDirectory),
            ("ADMIN", "Audit", ViewKind::cards("Audit")),
            ("ADMIN", "Setup", ViewKind::cards("Setup")),
        ];
        for (app, module, view) in routes {
            table.register(AppId::from(app), ModuleId::from(module), view);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_table_covers_default_catalog() {
        let table = DispatchTable::standard();
        assert!(table.gaps(&Catalog::default()).is_empty());
        assert_eq!(table.len(), 31);
    }

    #[test]
    fn resolves_registered_pair() {
        let table = DispatchTable::standard();
        assert_matches!(
            table.resolve(&"ERP".into(), &"HR".into()),
            Resolution::Found(ViewKind::ListView { title }) if title == "HR Team"
        );
    }

    #[test]
    fn unknown_pairs_are_not_found() {
        let table = DispatchTable::standard();
        assert_eq!(
            table.resolve(&"CRM".into(), &"Message Editor".into()),
            Resolution::NotFound
        );
        assert_eq!(
            table.resolve(&"NOPE".into(), &"Dashboard".into()),
            Resolution::NotFound
        );
        assert_eq!(
            DispatchTable::<ViewKind>::new().resolve(&"CRM".into(), &"Dashboard".into()),
            Resolution::NotFound
        );
    }

    #[test]
    fn gaps_list_unregistered_catalog_pairs() {
        let mut table = DispatchTable::new();
        table.register("ADMIN".into(), "Dashboard".into(), ViewKind::AdminDashboard);
        let gaps = table.gaps(&Catalog::default());
        assert!(!gaps.contains(&(AppId::from("ADMIN"), ModuleId::from("Dashboard"))));
        assert_eq!(
            gaps.first(),
            Some(&(AppId::from("CRM"), ModuleId::from("Dashboard")))
        );
        assert_eq!(gaps.len(), 30);
    }

    #[test]
    fn register_replaces_existing_capability() {
        let mut table = DispatchTable::new();
        table
            .register("CRM".into(), "Reports".into(), ViewKind::Reports)
            .register("CRM".into(), "Reports".into(), ViewKind::cards("Custom"));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.resolve(&"CRM".into(), &"Reports".into()).found(),
            Some(&ViewKind::cards("Custom"))
        );
    }
}
