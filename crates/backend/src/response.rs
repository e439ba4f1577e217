//! Parsing of the backend's `rsp` response envelope into the typed model.
//!
//! The wire format has two quirks this module absorbs: every scalar is a
//! string (including numbers and booleans), and any repeated element may
//! arrive as a single object instead of an array when there is exactly one.

use remilk_types::{
    AuthToken, GatewayError, Note, Priority, Settings, Task, TaskBucket, TaskList, TaskRef,
    TaskSeries, Timeline, traits::Result,
};
use serde_json::Value;

/// Unwrap the outer `{"rsp": {...}}` envelope, mapping `stat=fail` to a
/// typed backend error.
///
/// # Errors
///
/// Returns [`GatewayError::Backend`] when the envelope is missing, malformed,
/// or carries a failure status.
pub fn unwrap_envelope(value: Value) -> Result<Value> {
    let rsp = value
        .get("rsp")
        .cloned()
        .ok_or_else(|| backend_malformed("missing rsp envelope"))?;

    match rsp.get("stat").and_then(Value::as_str) {
        Some("ok") => Ok(rsp),
        Some("fail") => {
            let err = rsp.get("err").cloned().unwrap_or(Value::Null);
            let code = str_field(&err, "code")
                .and_then(|c| c.parse::<i32>().ok())
                .unwrap_or(0);
            let msg = str_field(&err, "msg").unwrap_or_else(|| "unknown backend failure".into());
            Err(GatewayError::Backend { code, msg })
        }
        _ => Err(backend_malformed("missing stat in rsp envelope")),
    }
}

pub use remilk_types::error::backend_codes::{INVALID_FROB, LOGIN_FAILED};

pub fn parse_frob(rsp: &Value) -> Result<String> {
    str_field(rsp, "frob").ok_or_else(|| backend_malformed("missing frob"))
}

pub fn parse_timeline(rsp: &Value) -> Result<Timeline> {
    str_field(rsp, "timeline")
        .map(Timeline)
        .ok_or_else(|| backend_malformed("missing timeline"))
}

/// Parse the `auth` block returned by the token exchange and validation calls.
pub fn parse_auth_token(rsp: &Value) -> Result<AuthToken> {
    let auth = rsp
        .get("auth")
        .ok_or_else(|| backend_malformed("missing auth block"))?;
    let token = str_field(auth, "token").ok_or_else(|| backend_malformed("missing auth token"))?;
    let perms = str_field(auth, "perms").unwrap_or_else(|| "read".into());
    let user = auth.get("user").cloned().unwrap_or(Value::Null);
    let user_id = str_field(&user, "id").unwrap_or_default();
    let username = str_field(&user, "username").unwrap_or_default();
    Ok(AuthToken::new(token, perms, user_id, username))
}

pub fn parse_lists(rsp: &Value) -> Result<Vec<TaskList>> {
    let lists = one_or_many(rsp.pointer("/lists/list"));
    lists
        .into_iter()
        .map(|l| {
            Ok(TaskList {
                id: str_field(l, "id").ok_or_else(|| backend_malformed("list without id"))?,
                name: str_field(l, "name").unwrap_or_default(),
                smart: flag(l, "smart"),
                archived: flag(l, "archived"),
            })
        })
        .collect()
}

pub fn parse_task_buckets(rsp: &Value) -> Result<Vec<TaskBucket>> {
    let buckets = one_or_many(rsp.pointer("/tasks/list"));
    buckets
        .into_iter()
        .map(|bucket| {
            let list_id =
                str_field(bucket, "id").ok_or_else(|| backend_malformed("task list without id"))?;
            let series = one_or_many(bucket.get("taskseries"))
                .into_iter()
                .map(parse_series)
                .collect::<Result<Vec<_>>>()?;
            Ok(TaskBucket { list_id, series })
        })
        .collect()
}

fn parse_series(series: &Value) -> Result<TaskSeries> {
    let tags = one_or_many(series.pointer("/tags/tag"))
        .into_iter()
        .filter_map(|t| match t {
            Value::String(s) => Some(s.clone()),
            // rtm.tags.getList-style objects carry the name in a field
            other => str_field(other, "name"),
        })
        .collect();

    let notes = one_or_many(series.pointer("/notes/note"))
        .into_iter()
        .map(|n| Note {
            id: str_field(n, "id").unwrap_or_default(),
            title: str_field(n, "title").unwrap_or_default(),
            // the note text rides in the "$t" member of the JSON format
            body: str_field(n, "$t").unwrap_or_default(),
        })
        .collect();

    let tasks = one_or_many(series.get("task"))
        .into_iter()
        .map(|t| {
            Ok(Task {
                id: str_field(t, "id").ok_or_else(|| backend_malformed("task without id"))?,
                due: str_field(t, "due").unwrap_or_default(),
                completed: str_field(t, "completed").unwrap_or_default(),
                priority: str_field(t, "priority")
                    .unwrap_or_default()
                    .parse::<Priority>()
                    .unwrap_or(Priority::None),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TaskSeries {
        id: str_field(series, "id").ok_or_else(|| backend_malformed("taskseries without id"))?,
        name: str_field(series, "name").unwrap_or_default(),
        tags,
        notes,
        tasks,
    })
}

pub fn parse_tags(rsp: &Value) -> Result<Vec<String>> {
    Ok(one_or_many(rsp.pointer("/tags/tag"))
        .into_iter()
        .filter_map(|t| match t {
            Value::String(s) => Some(s.clone()),
            other => str_field(other, "name"),
        })
        .collect())
}

pub fn parse_settings(rsp: &Value) -> Result<Settings> {
    let settings = rsp
        .get("settings")
        .ok_or_else(|| backend_malformed("missing settings block"))?;
    Ok(Settings {
        timezone: str_field(settings, "timezone").unwrap_or_default(),
        date_format: str_field(settings, "dateformat")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        default_list_id: str_field(settings, "defaultlist").unwrap_or_default(),
    })
}

/// Extract the id triple the backend assigned to a freshly added task.
pub fn parse_added_task(rsp: &Value) -> Result<TaskRef> {
    let list = rsp
        .get("list")
        .ok_or_else(|| backend_malformed("missing list in add response"))?;
    let list_id = str_field(list, "id").ok_or_else(|| backend_malformed("add without list id"))?;
    let series = one_or_many(list.get("taskseries"));
    let series = series
        .first()
        .ok_or_else(|| backend_malformed("add without taskseries"))?;
    let taskseries_id =
        str_field(series, "id").ok_or_else(|| backend_malformed("add without taskseries id"))?;
    let task = one_or_many(series.get("task"));
    let task = task
        .first()
        .ok_or_else(|| backend_malformed("add without task"))?;
    let task_id = str_field(task, "id").ok_or_else(|| backend_malformed("add without task id"))?;
    Ok(TaskRef {
        list_id,
        taskseries_id,
        task_id,
    })
}

// ── Wire-quirk helpers ────────────────────────────────────────────────────────

/// A repeated element: absent/null → empty, single object → one, array → all.
fn one_or_many(v: Option<&Value>) -> Vec<&Value> {
    match v {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

/// A scalar field that may arrive as a string or a bare number.
fn str_field(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The backend encodes booleans as "0"/"1" strings.
fn flag(v: &Value, key: &str) -> bool {
    str_field(v, key).is_some_and(|s| s == "1")
}

fn backend_malformed(what: &str) -> GatewayError {
    GatewayError::Backend {
        code: 0,
        msg: format!("malformed response: {what}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_ok() {
        let rsp = unwrap_envelope(json!({"rsp": {"stat": "ok", "frob": "f1"}})).unwrap();
        assert_eq!(parse_frob(&rsp).unwrap(), "f1");
    }

    #[test]
    fn test_unwrap_fail_carries_code_and_msg() {
        let err = unwrap_envelope(json!({
            "rsp": {"stat": "fail", "err": {"code": "101", "msg": "Invalid frob - did you authenticate?"}}
        }))
        .unwrap_err();
        let GatewayError::Backend { code, msg } = err else {
            panic!("wrong variant");
        };
        assert_eq!(code, INVALID_FROB);
        assert!(msg.contains("Invalid frob"));
    }

    #[test]
    fn test_unwrap_missing_envelope() {
        assert!(unwrap_envelope(json!({"stat": "ok"})).is_err());
        assert!(unwrap_envelope(json!({"rsp": {"frob": "f"}})).is_err());
    }

    #[test]
    fn test_parse_auth_token() {
        let rsp = json!({
            "stat": "ok",
            "auth": {
                "token": "410c57262293e9d937ee5be75eb7b0128fd61b61",
                "perms": "delete",
                "user": {"id": "1", "username": "bob", "fullname": "Bob T. Monkey"}
            }
        });
        let token = parse_auth_token(&rsp).unwrap();
        assert_eq!(token.token, "410c57262293e9d937ee5be75eb7b0128fd61b61");
        assert_eq!(token.perms, "delete");
        assert_eq!(token.user_id, "1");
        assert_eq!(token.username, "bob");
    }

    #[test]
    fn test_parse_lists_array() {
        let rsp = json!({
            "lists": {"list": [
                {"id": "100", "name": "Inbox", "smart": "0", "archived": "0"},
                {"id": "101", "name": "Someday", "smart": "1", "archived": "0"}
            ]}
        });
        let lists = parse_lists(&rsp).unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Inbox");
        assert!(!lists[0].smart);
        assert!(lists[1].smart);
    }

    #[test]
    fn test_parse_lists_single_object() {
        let rsp = json!({
            "lists": {"list": {"id": "100", "name": "Inbox", "smart": "0", "archived": "0"}}
        });
        let lists = parse_lists(&rsp).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, "100");
    }

    #[test]
    fn test_parse_task_buckets() {
        let rsp = json!({
            "tasks": {"list": [{
                "id": "100",
                "taskseries": [{
                    "id": "ts1",
                    "name": "Buy milk",
                    "tags": {"tag": ["errand", "grocery"]},
                    "notes": {"note": {"id": "n1", "title": "brand", "$t": "the good one"}},
                    "task": {"id": "t1", "due": "", "completed": "", "priority": "2"}
                }]
            }]}
        });
        let buckets = parse_task_buckets(&rsp).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].list_id, "100");
        let series = &buckets[0].series[0];
        assert_eq!(series.name, "Buy milk");
        assert_eq!(series.tags, vec!["errand", "grocery"]);
        assert_eq!(series.notes[0].body, "the good one");
        assert_eq!(series.tasks[0].priority, Priority::Medium);
        assert!(!series.tasks[0].is_completed());
    }

    #[test]
    fn test_parse_task_buckets_empty_tags() {
        let rsp = json!({
            "tasks": {"list": [{
                "id": "100",
                "taskseries": [{
                    "id": "ts1",
                    "name": "x",
                    "tags": [],
                    "notes": [],
                    "task": [{"id": "t1", "due": "", "completed": "", "priority": "N"}]
                }]
            }]}
        });
        let buckets = parse_task_buckets(&rsp).unwrap();
        assert!(buckets[0].series[0].tags.is_empty());
        assert!(buckets[0].series[0].notes.is_empty());
    }

    #[test]
    fn test_parse_tags_object_form() {
        let rsp = json!({"tags": {"tag": [{"name": "errand"}, {"name": "work"}]}});
        assert_eq!(parse_tags(&rsp).unwrap(), vec!["errand", "work"]);
    }

    #[test]
    fn test_parse_settings() {
        let rsp = json!({
            "settings": {"timezone": "Australia/Sydney", "dateformat": "0",
                         "timeformat": "0", "defaultlist": "100"}
        });
        let s = parse_settings(&rsp).unwrap();
        assert_eq!(s.timezone, "Australia/Sydney");
        assert_eq!(s.date_format, 0);
        assert_eq!(s.default_list_id, "100");
    }

    #[test]
    fn test_parse_added_task() {
        let rsp = json!({
            "transaction": {"id": "123", "undoable": "1"},
            "list": {
                "id": "100",
                "taskseries": {"id": "ts9", "name": "New task",
                               "task": {"id": "t9", "due": "", "completed": "", "priority": "N"}}
            }
        });
        let added = parse_added_task(&rsp).unwrap();
        assert_eq!(added.list_id, "100");
        assert_eq!(added.taskseries_id, "ts9");
        assert_eq!(added.task_id, "t9");
    }

    #[test]
    fn test_parse_timeline() {
        let rsp = json!({"timeline": "12741021"});
        assert_eq!(parse_timeline(&rsp).unwrap(), Timeline("12741021".into()));
    }
}
