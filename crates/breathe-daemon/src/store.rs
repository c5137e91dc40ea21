use std::collections::HashMap;

use breathe_core::{fixture_meta, workspace_fixture, DashboardMeta, WorkspaceSnapshot};

#[derive(Debug, Clone)]
pub struct WorkspaceDashboard {
    pub data: WorkspaceSnapshot,
    pub meta: DashboardMeta,
}

/// In-memory dashboard store keyed by workspace id. Built once at startup
/// and passed into handlers; tests construct isolated instances.
#[derive(Debug, Default)]
pub struct DashboardStore {
    dashboards: HashMap<String, WorkspaceDashboard>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the demo fixture under the given workspace id.
    pub fn demo(workspace_id: &str) -> Self {
        let mut store = Self::new();
        store.insert(
            workspace_id,
            WorkspaceDashboard {
                data: workspace_fixture(),
                meta: fixture_meta(),
            },
        );
        store
    }

    pub fn insert(&mut self, workspace_id: &str, dashboard: WorkspaceDashboard) {
        self.dashboards.insert(workspace_id.to_string(), dashboard);
    }

    pub fn load(&self, workspace_id: &str) -> Option<&WorkspaceDashboard> {
        self.dashboards.get(workspace_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WorkspaceDashboard)> {
        self.dashboards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_store_serves_the_fixture() {
        let store = DashboardStore::demo("demo");
        let dashboard = store.load("demo").unwrap();
        assert_eq!(dashboard.data, workspace_fixture());
        assert!(store.load("missing").is_none());
    }
}
