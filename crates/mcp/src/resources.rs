//! Resource read dispatch.
//!
//! Resolution and gating happen here, in one place; content rendering is
//! delegated to [`crate::format`].

use crate::{AppState, catalog::ResourceName, format};
use remilk_types::{AuthErrorKind, GatewayError, traits::Result};

/// Filter narrowing task reads to open tasks, in the backend's search
/// grammar.
const INCOMPLETE: &str = "status:incomplete";

/// Read a named resource, returning its content and MIME type.
///
/// # Errors
///
/// [`GatewayError::Resource`] for names outside the catalog,
/// [`GatewayError::Auth`] for gated resources while unauthenticated, and
/// whatever the backend returns for the read itself.
pub async fn read(state: &AppState, name: &str) -> Result<(String, &'static str)> {
    let Some(resource) = ResourceName::resolve(name) else {
        return Err(GatewayError::Resource(name.to_string()));
    };

    // The auth resource is the only way to become authenticated, so it is
    // the one entry that bypasses the gate.
    if !resource.bypasses_gate() && !state.auth.is_authenticated() {
        return Err(GatewayError::auth(
            AuthErrorKind::Required,
            format!("reading {name} requires authentication; read auth://rtm first"),
        ));
    }

    match resource {
        ResourceName::Auth => {
            if state.auth.is_authenticated() {
                Ok((
                    format::already_authenticated(state.auth.username().as_deref()),
                    format::MIME_PLAIN,
                ))
            } else {
                let flow = state.auth.start_flow().await?;
                Ok((format::auth_instructions(&flow), format::MIME_PLAIN))
            }
        }
        ResourceName::Lists => {
            let lists = state.backend.get_lists().await?;
            Ok((format::lists(&lists), format::MIME_MARKDOWN))
        }
        ResourceName::Tasks => {
            let buckets = state.backend.get_tasks(None, Some(INCOMPLETE)).await?;
            Ok((format::task_buckets(&buckets), format::MIME_MARKDOWN))
        }
        ResourceName::TasksForList(list_id) => {
            let buckets = state
                .backend
                .get_tasks(Some(&list_id), Some(INCOMPLETE))
                .await?;
            Ok((format::task_buckets(&buckets), format::MIME_MARKDOWN))
        }
        ResourceName::Tags => {
            let tags = state.backend.get_tags().await?;
            Ok((format::tags(&tags), format::MIME_MARKDOWN))
        }
        ResourceName::Settings => {
            let settings = state.backend.get_settings().await?;
            Ok((format::settings(&settings), format::MIME_PLAIN))
        }
    }
}
