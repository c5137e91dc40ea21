#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Listen address for the HTTP API, e.g. `127.0.0.1:8080`.
    pub listen: String,
    /// Workspace id the demo fixture is registered under.
    pub workspace_id: String,
}
