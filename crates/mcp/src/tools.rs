//! Tool call dispatch and per-tool argument validation.
//!
//! Validation runs before any backend traffic: a missing required argument
//! never reaches the backend. Every mutating tool opens a fresh timeline
//! through the dispatcher before its one backend call.

use crate::{AppState, catalog::ToolName};
use remilk_auth::{AuthStatus, CompleteOutcome, LogoutOutcome};
use remilk_types::{AuthErrorKind, GatewayError, Priority, TaskRef, traits::Result};
use serde_json::{Map, Value};

/// Invoke a named tool with a named-argument map, returning a short human
/// confirmation string.
///
/// # Errors
///
/// [`GatewayError::MethodNotFound`] for names outside the catalog,
/// [`GatewayError::Auth`] for gated tools while unauthenticated,
/// [`GatewayError::InvalidParams`] for missing/blank required arguments, and
/// whatever the backend returns for the call itself.
pub async fn call(state: &AppState, name: &str, arguments: &Map<String, Value>) -> Result<String> {
    let Some(tool) = ToolName::resolve(name) else {
        return Err(GatewayError::MethodNotFound(name.to_string()));
    };

    // `authenticate` is the one tool that bypasses the gate.
    if !tool.bypasses_gate() && !state.auth.is_authenticated() {
        return Err(GatewayError::auth(
            AuthErrorKind::Required,
            format!("tool {name} requires authentication; read auth://rtm first"),
        ));
    }

    let args = Args(arguments);
    match tool {
        ToolName::Authenticate => authenticate(state, &args).await,
        ToolName::AuthStatus => Ok(auth_status(state)),
        ToolName::Logout => logout(state, &args).await,
        ToolName::AddTask => add_task(state, &args).await,
        ToolName::CompleteTask => {
            let task = args.task_ref()?;
            let timeline = state.timeline.begin().await?;
            state.backend.complete_task(&timeline, &task).await?;
            Ok(format!("Marked task {} complete.", task.task_id))
        }
        ToolName::UncompleteTask => {
            let task = args.task_ref()?;
            let timeline = state.timeline.begin().await?;
            state.backend.uncomplete_task(&timeline, &task).await?;
            Ok(format!("Marked task {} incomplete again.", task.task_id))
        }
        ToolName::DeleteTask => {
            let task = args.task_ref()?;
            let timeline = state.timeline.begin().await?;
            state.backend.delete_task(&timeline, &task).await?;
            Ok(format!("Deleted task {}.", task.task_id))
        }
        ToolName::SetDueDate => set_due_date(state, &args).await,
        ToolName::SetPriority => set_priority(state, &args).await,
        ToolName::AddTags => {
            let task = args.task_ref()?;
            let tags = args.required("tags")?;
            let timeline = state.timeline.begin().await?;
            state.backend.add_tags(&timeline, &task, &tags).await?;
            Ok(format!("Tagged task {} with {tags}.", task.task_id))
        }
        ToolName::RemoveTags => {
            let task = args.task_ref()?;
            let tags = args.required("tags")?;
            let timeline = state.timeline.begin().await?;
            state.backend.remove_tags(&timeline, &task, &tags).await?;
            Ok(format!("Removed {tags} from task {}.", task.task_id))
        }
        ToolName::AddNote => {
            let task = args.task_ref()?;
            let title = args.required("title")?;
            let body = args.required("body")?;
            let timeline = state.timeline.begin().await?;
            state
                .backend
                .add_note(&timeline, &task, &title, &body)
                .await?;
            Ok(format!("Added note '{title}' to task {}.", task.task_id))
        }
    }
}

async fn authenticate(state: &AppState, args: &Args<'_>) -> Result<String> {
    let frob = args.required("frob")?;
    match state.auth.complete_flow(Some(&frob)).await? {
        CompleteOutcome::AlreadyAuthenticated => {
            Ok("Already authenticated; nothing to do.".to_string())
        }
        CompleteOutcome::Authenticated { username } => Ok(format!(
            "Authenticated as {username}. The full resource and tool set is now available."
        )),
    }
}

fn auth_status(state: &AppState) -> String {
    let status = state.auth.status();
    let flows = state.auth.active_flow_count();
    match status {
        AuthStatus::Authenticated => match state.auth.username() {
            Some(username) => format!("Authenticated as {username}."),
            None => "Authenticated.".to_string(),
        },
        AuthStatus::FlowStarted => format!(
            "Not authenticated; {flows} authorization flow in progress. \
             Complete it with the `authenticate` tool."
        ),
        AuthStatus::Unauthenticated => {
            "Not authenticated. Read auth://rtm to begin.".to_string()
        }
    }
}

async fn logout(state: &AppState, args: &Args<'_>) -> Result<String> {
    match state.auth.logout(args.flag("confirm")).await? {
        LogoutOutcome::NotConfirmed => Ok(
            "Logout not confirmed; nothing changed. Call `logout` with confirm=true \
             to disconnect and delete the stored token."
                .to_string(),
        ),
        LogoutOutcome::LoggedOut => Ok("Logged out; the stored token was deleted.".to_string()),
    }
}

async fn add_task(state: &AppState, args: &Args<'_>) -> Result<String> {
    let name = args.required("name")?;
    let list_id = args.optional("list_id");
    let timeline = state.timeline.begin().await?;
    let added = state
        .backend
        .add_task(&timeline, &name, list_id.as_deref())
        .await?;
    Ok(format!(
        "Added task '{name}' (task {} in list {}).",
        added.task_id, added.list_id
    ))
}

async fn set_due_date(state: &AppState, args: &Args<'_>) -> Result<String> {
    let task = args.task_ref()?;
    let due = args.optional("due");
    let timeline = state.timeline.begin().await?;
    state
        .backend
        .set_due_date(&timeline, &task, due.as_deref())
        .await?;
    Ok(match due {
        Some(due) => format!("Due date of task {} set to {due}.", task.task_id),
        None => format!("Due date of task {} cleared.", task.task_id),
    })
}

async fn set_priority(state: &AppState, args: &Args<'_>) -> Result<String> {
    let task = args.task_ref()?;
    let raw = args.required("priority")?;
    let priority = raw
        .parse::<Priority>()
        .map_err(GatewayError::Validation)?;
    let timeline = state.timeline.begin().await?;
    state
        .backend
        .set_priority(&timeline, &task, priority)
        .await?;
    Ok(format!(
        "Priority of task {} set to {}.",
        task.task_id,
        priority.as_param()
    ))
}

/// Named-argument accessor with the gateway's validation rules.
struct Args<'a>(&'a Map<String, Value>);

impl Args<'_> {
    /// A required string argument; missing, null or blank → `InvalidParams`
    /// naming the field.
    fn required(&self, field: &str) -> Result<String> {
        match self.0.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            None | Some(Value::Null | Value::String(_)) => Err(GatewayError::missing_arg(field)),
            Some(_) => Err(GatewayError::InvalidParams {
                message: format!("argument {field} must be a string"),
                field: Some(field.to_string()),
            }),
        }
    }

    /// An optional string argument; absent or blank → `None`.
    fn optional(&self, field: &str) -> Option<String> {
        match self.0.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// A boolean flag; accepts `true` or `"true"`, anything else is `false`.
    fn flag(&self, field: &str) -> bool {
        match self.0.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    /// The id triple every task mutation addresses, validated in catalog
    /// argument order so the first missing field is the one named.
    fn task_ref(&self) -> Result<TaskRef> {
        Ok(TaskRef {
            list_id: self.required("list_id")?,
            taskseries_id: self.required("taskseries_id")?,
            task_id: self.required("task_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_required_rejects_missing_blank_and_null() {
        let map = args(json!({"blank": "  ", "null": null}));
        let a = Args(&map);
        for field in ["missing", "blank", "null"] {
            let err = a.required(field).unwrap_err();
            let GatewayError::InvalidParams { field: named, .. } = err else {
                panic!("wrong variant for {field}");
            };
            assert_eq!(named.as_deref(), Some(field));
        }
    }

    #[test]
    fn test_required_rejects_non_string() {
        let map = args(json!({"n": 7}));
        let err = Args(&map).required("n").unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_task_ref_names_list_id_first() {
        let map = args(json!({}));
        let err = Args(&map).task_ref().unwrap_err();
        let GatewayError::InvalidParams { field, .. } = err else {
            panic!("wrong variant");
        };
        assert_eq!(field.as_deref(), Some("list_id"));
    }

    #[test]
    fn test_flag_accepts_bool_and_string() {
        let map = args(json!({"a": true, "b": "true", "c": "yes", "d": false}));
        let a = Args(&map);
        assert!(a.flag("a"));
        assert!(a.flag("b"));
        assert!(!a.flag("c"));
        assert!(!a.flag("d"));
        assert!(!a.flag("absent"));
    }

    #[test]
    fn test_optional_blank_is_none() {
        let map = args(json!({"due": "   "}));
        assert!(Args(&map).optional("due").is_none());
    }
}
