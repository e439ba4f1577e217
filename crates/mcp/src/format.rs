//! The one place resource content and tool confirmations are rendered.
//!
//! Handlers never format backend payloads themselves; they parse, call here,
//! and return the text. Keeps the output stable across call sites.

use remilk_auth::AuthFlow;
use remilk_types::{Priority, Settings, TaskBucket, TaskList};

pub const MIME_MARKDOWN: &str = "text/markdown";
pub const MIME_PLAIN: &str = "text/plain";

pub fn auth_instructions(flow: &AuthFlow) -> String {
    format!(
        "To connect your Remember The Milk account:\n\
         \n\
         1. Open this URL in a browser and click \"OK, I'll allow it\":\n\
         {}\n\
         \n\
         2. Then call the `authenticate` tool with this frob:\n\
         {}\n\
         \n\
         The frob is short-lived; if the backend rejects it, read this\n\
         resource again for a fresh one.",
        flow.auth_url, flow.frob
    )
}

pub fn already_authenticated(username: Option<&str>) -> String {
    match username {
        Some(name) => format!("Already connected as {name}. Use `logout` to disconnect."),
        None => "Already connected. Use `logout` to disconnect.".to_string(),
    }
}

pub fn lists(lists: &[TaskList]) -> String {
    if lists.is_empty() {
        return "No lists.".to_string();
    }
    let mut out = String::from("# Lists\n");
    for list in lists {
        let mut line = format!("- {} (id {})", list.name, list.id);
        if list.smart {
            line.push_str(" [smart]");
        }
        if list.archived {
            line.push_str(" [archived]");
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn task_buckets(buckets: &[TaskBucket]) -> String {
    let total: usize = buckets.iter().map(|b| b.series.len()).sum();
    if total == 0 {
        return "No tasks.".to_string();
    }
    let mut out = String::new();
    for bucket in buckets {
        if bucket.series.is_empty() {
            continue;
        }
        out.push_str(&format!("# List {}\n", bucket.list_id));
        for series in &bucket.series {
            let mut line = format!("- {}", series.name);
            if let Some(task) = series.tasks.first() {
                if task.priority != Priority::None {
                    line.push_str(&format!(" !{}", task.priority.as_param()));
                }
                if !task.due.is_empty() {
                    line.push_str(&format!(" (due {})", task.due));
                }
                line.push_str(&format!(
                    " [ids: list={} series={} task={}]",
                    bucket.list_id, series.id, task.id
                ));
            }
            if !series.tags.is_empty() {
                line.push_str(&format!(" #{}", series.tags.join(" #")));
            }
            out.push_str(&line);
            out.push('\n');
            for note in &series.notes {
                out.push_str(&format!("  - note: {}: {}\n", note.title, note.body));
            }
        }
    }
    out
}

pub fn tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return "No tags.".to_string();
    }
    let mut out = String::from("# Tags\n");
    for tag in tags {
        out.push_str(&format!("- {tag}\n"));
    }
    out
}

pub fn settings(settings: &Settings) -> String {
    let date_format = if settings.date_format == 0 {
        "european"
    } else {
        "american"
    };
    let default_list = if settings.default_list_id.is_empty() {
        "none".to_string()
    } else {
        format!("id {}", settings.default_list_id)
    };
    format!(
        "Timezone: {}\nDate format: {date_format}\nDefault list: {default_list}",
        settings.timezone
    )
}
