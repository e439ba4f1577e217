//! The capability catalog: every resource and tool this gateway can expose.
//!
//! Definitions are static and declared once; visibility is partitioned by
//! authentication status. Name resolution goes through closed enums so an
//! unknown name is an exhaustive-match default, not a map miss.

use serde::Serialize;

/// One named argument of a tool or resource.
#[derive(Debug, Clone, Serialize)]
pub struct ArgDef {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A readable resource exposed by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDef {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgDef],
}

/// An invocable tool exposed by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgDef],
}

const TASK_REF_ARGS: [ArgDef; 3] = [
    ArgDef {
        name: "list_id",
        description: "Id of the list holding the task",
        required: true,
    },
    ArgDef {
        name: "taskseries_id",
        description: "Id of the task series",
        required: true,
    },
    ArgDef {
        name: "task_id",
        description: "Id of the task instance",
        required: true,
    },
];

/// Resource catalog, in declaration order. The first entry is the only one
/// visible while unauthenticated.
pub static RESOURCES: &[ResourceDef] = &[
    ResourceDef {
        name: "auth://rtm",
        description: "Authorization URL and instructions for connecting an account",
        args: &[],
    },
    ResourceDef {
        name: "lists://rtm",
        description: "All task lists",
        args: &[],
    },
    ResourceDef {
        name: "tasks://rtm",
        description: "Incomplete tasks across all lists",
        args: &[],
    },
    ResourceDef {
        name: "tasks://rtm/{list_id}",
        description: "Incomplete tasks in one list",
        args: &[ArgDef {
            name: "list_id",
            description: "Id of the list, as the URI suffix",
            required: true,
        }],
    },
    ResourceDef {
        name: "tags://rtm",
        description: "All tags in use",
        args: &[],
    },
    ResourceDef {
        name: "settings://rtm",
        description: "Account settings (timezone, date format, default list)",
        args: &[],
    },
];

/// Tool catalog, in declaration order. The first entry is the only one
/// visible while unauthenticated.
pub static TOOLS: &[ToolDef] = &[
    ToolDef {
        name: "authenticate",
        description: "Exchange an authorized frob for an account token",
        args: &[ArgDef {
            name: "frob",
            description: "The frob from the auth resource, after authorizing in the browser",
            required: true,
        }],
    },
    ToolDef {
        name: "auth_status",
        description: "Report the gateway's authentication status",
        args: &[],
    },
    ToolDef {
        name: "logout",
        description: "Disconnect the account and delete the stored token",
        args: &[ArgDef {
            name: "confirm",
            description: "Must be true to actually log out",
            required: false,
        }],
    },
    ToolDef {
        name: "add_task",
        description: "Add a task; the name may carry Smart Add syntax (due dates, priority)",
        args: &[
            ArgDef {
                name: "name",
                description: "Task name",
                required: true,
            },
            ArgDef {
                name: "list_id",
                description: "Target list; the default list when omitted",
                required: false,
            },
        ],
    },
    ToolDef {
        name: "complete_task",
        description: "Mark a task complete",
        args: &TASK_REF_ARGS,
    },
    ToolDef {
        name: "uncomplete_task",
        description: "Mark a completed task incomplete again",
        args: &TASK_REF_ARGS,
    },
    ToolDef {
        name: "delete_task",
        description: "Delete a task",
        args: &TASK_REF_ARGS,
    },
    ToolDef {
        name: "set_due_date",
        description: "Set or clear a task's due date",
        args: &[
            ArgDef {
                name: "list_id",
                description: "Id of the list holding the task",
                required: true,
            },
            ArgDef {
                name: "taskseries_id",
                description: "Id of the task series",
                required: true,
            },
            ArgDef {
                name: "task_id",
                description: "Id of the task instance",
                required: true,
            },
            ArgDef {
                name: "due",
                description: "Due date (natural language accepted); blank clears it",
                required: false,
            },
        ],
    },
    ToolDef {
        name: "set_priority",
        description: "Set a task's priority (1, 2, 3 or N)",
        args: &[
            ArgDef {
                name: "list_id",
                description: "Id of the list holding the task",
                required: true,
            },
            ArgDef {
                name: "taskseries_id",
                description: "Id of the task series",
                required: true,
            },
            ArgDef {
                name: "task_id",
                description: "Id of the task instance",
                required: true,
            },
            ArgDef {
                name: "priority",
                description: "1 (highest), 2, 3 or N (none)",
                required: true,
            },
        ],
    },
    ToolDef {
        name: "add_tags",
        description: "Add comma-separated tags to a task",
        args: &[
            ArgDef {
                name: "list_id",
                description: "Id of the list holding the task",
                required: true,
            },
            ArgDef {
                name: "taskseries_id",
                description: "Id of the task series",
                required: true,
            },
            ArgDef {
                name: "task_id",
                description: "Id of the task instance",
                required: true,
            },
            ArgDef {
                name: "tags",
                description: "Comma-separated tag names",
                required: true,
            },
        ],
    },
    ToolDef {
        name: "remove_tags",
        description: "Remove comma-separated tags from a task",
        args: &[
            ArgDef {
                name: "list_id",
                description: "Id of the list holding the task",
                required: true,
            },
            ArgDef {
                name: "taskseries_id",
                description: "Id of the task series",
                required: true,
            },
            ArgDef {
                name: "task_id",
                description: "Id of the task instance",
                required: true,
            },
            ArgDef {
                name: "tags",
                description: "Comma-separated tag names",
                required: true,
            },
        ],
    },
    ToolDef {
        name: "add_note",
        description: "Attach a note to a task",
        args: &[
            ArgDef {
                name: "list_id",
                description: "Id of the list holding the task",
                required: true,
            },
            ArgDef {
                name: "taskseries_id",
                description: "Id of the task series",
                required: true,
            },
            ArgDef {
                name: "task_id",
                description: "Id of the task instance",
                required: true,
            },
            ArgDef {
                name: "title",
                description: "Note title",
                required: true,
            },
            ArgDef {
                name: "body",
                description: "Note text",
                required: true,
            },
        ],
    },
];

/// Catalog subset visible for the given authentication status, in
/// declaration order.
#[must_use]
pub fn visible_resources(authenticated: bool) -> Vec<&'static ResourceDef> {
    if authenticated {
        RESOURCES.iter().collect()
    } else {
        RESOURCES.iter().take(1).collect()
    }
}

/// Catalog subset visible for the given authentication status, in
/// declaration order.
#[must_use]
pub fn visible_tools(authenticated: bool) -> Vec<&'static ToolDef> {
    if authenticated {
        TOOLS.iter().collect()
    } else {
        TOOLS.iter().take(1).collect()
    }
}

/// Resolved resource name.
///
/// `tasks://rtm/{list_id}` is the one pattern entry: matched by prefix, the
/// suffix is the list id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceName {
    Auth,
    Lists,
    Tasks,
    TasksForList(String),
    Tags,
    Settings,
}

impl ResourceName {
    /// Resolve a request name against the catalog. `None` means the name is
    /// not in the catalog at all.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "auth://rtm" => Some(Self::Auth),
            "lists://rtm" => Some(Self::Lists),
            "tasks://rtm" => Some(Self::Tasks),
            "tags://rtm" => Some(Self::Tags),
            "settings://rtm" => Some(Self::Settings),
            other => {
                let list_id = other.strip_prefix("tasks://rtm/")?;
                if list_id.is_empty() {
                    None
                } else {
                    Some(Self::TasksForList(list_id.to_string()))
                }
            }
        }
    }

    /// Whether this resource is readable without authentication.
    #[must_use]
    pub fn bypasses_gate(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

/// Resolved tool name. One variant per catalog entry; dispatch is an
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    Authenticate,
    AuthStatus,
    Logout,
    AddTask,
    CompleteTask,
    UncompleteTask,
    DeleteTask,
    SetDueDate,
    SetPriority,
    AddTags,
    RemoveTags,
    AddNote,
}

impl ToolName {
    /// Resolve a request name against the catalog.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "authenticate" => Some(Self::Authenticate),
            "auth_status" => Some(Self::AuthStatus),
            "logout" => Some(Self::Logout),
            "add_task" => Some(Self::AddTask),
            "complete_task" => Some(Self::CompleteTask),
            "uncomplete_task" => Some(Self::UncompleteTask),
            "delete_task" => Some(Self::DeleteTask),
            "set_due_date" => Some(Self::SetDueDate),
            "set_priority" => Some(Self::SetPriority),
            "add_tags" => Some(Self::AddTags),
            "remove_tags" => Some(Self::RemoveTags),
            "add_note" => Some(Self::AddNote),
            _ => None,
        }
    }

    /// Whether this tool is invocable without authentication.
    #[must_use]
    pub fn bypasses_gate(self) -> bool {
        matches!(self, Self::Authenticate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_sees_exactly_the_auth_entries() {
        let resources = visible_resources(false);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "auth://rtm");

        let tools = visible_tools(false);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "authenticate");
    }

    #[test]
    fn test_authenticated_sees_full_catalog_in_order() {
        let resources = visible_resources(true);
        assert_eq!(resources.len(), RESOURCES.len());
        assert_eq!(resources[0].name, "auth://rtm");
        assert_eq!(resources[1].name, "lists://rtm");

        let tools = visible_tools(true);
        assert_eq!(tools.len(), TOOLS.len());
        assert_eq!(tools[0].name, "authenticate");
    }

    #[test]
    fn test_resource_resolution_exact() {
        assert_eq!(ResourceName::resolve("auth://rtm"), Some(ResourceName::Auth));
        assert_eq!(
            ResourceName::resolve("settings://rtm"),
            Some(ResourceName::Settings)
        );
        assert_eq!(ResourceName::resolve("bogus://rtm"), None);
    }

    #[test]
    fn test_resource_resolution_list_scoped() {
        assert_eq!(
            ResourceName::resolve("tasks://rtm/100"),
            Some(ResourceName::TasksForList("100".into()))
        );
        // A bare trailing slash is not a list id.
        assert_eq!(ResourceName::resolve("tasks://rtm/"), None);
    }

    #[test]
    fn test_tool_resolution_covers_catalog() {
        for def in TOOLS {
            assert!(
                ToolName::resolve(def.name).is_some(),
                "catalog entry {} must resolve",
                def.name
            );
        }
        assert_eq!(ToolName::resolve("rm_rf"), None);
    }

    #[test]
    fn test_only_the_auth_entries_bypass_the_gate() {
        assert!(ResourceName::Auth.bypasses_gate());
        assert!(!ResourceName::Lists.bypasses_gate());
        assert!(ToolName::Authenticate.bypasses_gate());
        assert!(!ToolName::Logout.bypasses_gate());
        assert!(!ToolName::CompleteTask.bypasses_gate());
    }

    #[test]
    fn test_complete_task_args_name_list_id_first() {
        let def = TOOLS.iter().find(|t| t.name == "complete_task").unwrap();
        assert_eq!(def.args[0].name, "list_id");
        assert!(def.args.iter().all(|a| a.required));
    }
}
