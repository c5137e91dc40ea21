use axum::http::HeaderMap;
use breathe_core::Session;

use crate::api::ApiError;

/// Pluggable session resolution. The placeholder implementation stands in
/// for a real identity provider; swap it by constructing `AppState` with a
/// different resolver.
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Grants access to a single workspace on every request.
pub struct PlaceholderResolver {
    session: Session,
}

impl PlaceholderResolver {
    pub fn new(workspace_id: &str) -> Self {
        Self {
            session: Session {
                user_id: "demo-user".to_string(),
                email: Some("demo@breathe.mail".to_string()),
                workspace_ids: vec![workspace_id.to_string()],
                active_workspace_id: Some(workspace_id.to_string()),
            },
        }
    }
}

impl SessionResolver for PlaceholderResolver {
    fn resolve(&self, _headers: &HeaderMap) -> Option<Session> {
        Some(self.session.clone())
    }
}

/// Resolves the session and checks workspace membership.
pub fn guard_workspace_access(
    resolver: &dyn SessionResolver,
    headers: &HeaderMap,
    workspace_id: &str,
) -> Result<Session, ApiError> {
    let session = resolver.resolve(headers).ok_or(ApiError::Unauthenticated)?;
    if !session.can_access(workspace_id) {
        return Err(ApiError::WorkspaceForbidden {
            workspace_id: workspace_id.to_string(),
        });
    }
    Ok(session)
}
