//! Scripted backend double for router-level tests.
//!
//! Records every call in program order so tests can assert ordering (most
//! importantly: timeline before mutation), and serves small canned payloads
//! for the read side.

use async_trait::async_trait;
use remilk_types::{
    AuthToken, GatewayError, Note, Priority, RtmApi, Settings, Task, TaskBucket, TaskList,
    TaskRef, TaskSeries, Timeline, traits::Result,
};
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

pub struct ScriptedBackend {
    calls: Mutex<Vec<&'static str>>,
    frob_counter: AtomicUsize,
    timeline_counter: AtomicUsize,
    issued_frobs: Mutex<Vec<String>>,
    fail_timelines: AtomicBool,
    fail_reads: AtomicBool,
    last_task_query: Mutex<Option<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            frob_counter: AtomicUsize::new(0),
            timeline_counter: AtomicUsize::new(0),
            issued_frobs: Mutex::new(Vec::new()),
            fail_timelines: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            last_task_query: Mutex::new(None),
        }
    }

    /// Backend call names in program order (auth reads excluded).
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn timelines_issued(&self) -> usize {
        self.timeline_counter.load(Ordering::SeqCst)
    }

    pub fn fail_timelines(&self) {
        self.fail_timelines.store(true, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// `(list_id, filter)` of the most recent task query.
    pub fn last_task_query(&self) -> Option<(String, String)> {
        self.last_task_query.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn read_failure(&self) -> Option<GatewayError> {
        self.fail_reads.load(Ordering::SeqCst).then(|| GatewayError::Backend {
            code: 105,
            msg: "service currently unavailable".into(),
        })
    }
}

#[async_trait]
impl RtmApi for ScriptedBackend {
    async fn get_frob(&self) -> Result<String> {
        let n = self.frob_counter.fetch_add(1, Ordering::SeqCst);
        let frob = format!("frob-{n}");
        self.issued_frobs.lock().unwrap().push(frob.clone());
        Ok(frob)
    }

    fn auth_url(&self, frob: &str) -> String {
        format!("https://backend.example/auth/?frob={frob}")
    }

    async fn get_token(&self, frob: &str) -> Result<AuthToken> {
        if self.issued_frobs.lock().unwrap().iter().any(|f| f == frob) {
            Ok(AuthToken::new("tok-1", "delete", "u1", "alice"))
        } else {
            Err(GatewayError::Backend {
                code: 101,
                msg: "Invalid frob - did you authenticate?".into(),
            })
        }
    }

    async fn check_token(&self, _token: &str) -> Result<bool> {
        Ok(true)
    }

    fn set_auth_token(&self, _token: Option<String>) {}

    async fn create_timeline(&self) -> Result<Timeline> {
        self.record("create_timeline");
        if self.fail_timelines.load(Ordering::SeqCst) {
            return Err(GatewayError::Backend {
                code: 105,
                msg: "service currently unavailable".into(),
            });
        }
        let n = self.timeline_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Timeline(format!("timeline-{n}")))
    }

    async fn get_lists(&self) -> Result<Vec<TaskList>> {
        self.record("get_lists");
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        Ok(vec![
            TaskList {
                id: "100".into(),
                name: "Inbox".into(),
                smart: false,
                archived: false,
            },
            TaskList {
                id: "101".into(),
                name: "Work".into(),
                smart: false,
                archived: false,
            },
        ])
    }

    async fn get_tasks(
        &self,
        list_id: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<TaskBucket>> {
        self.record("get_tasks");
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        *self.last_task_query.lock().unwrap() = Some((
            list_id.unwrap_or_default().to_string(),
            filter.unwrap_or_default().to_string(),
        ));
        Ok(vec![TaskBucket {
            list_id: "100".into(),
            series: vec![TaskSeries {
                id: "ts1".into(),
                name: "Buy milk".into(),
                tags: vec!["errand".into()],
                notes: vec![Note {
                    id: "n1".into(),
                    title: "brand".into(),
                    body: "the good one".into(),
                }],
                tasks: vec![Task {
                    id: "t1".into(),
                    due: String::new(),
                    completed: String::new(),
                    priority: Priority::None,
                }],
            }],
        }])
    }

    async fn get_tags(&self) -> Result<Vec<String>> {
        self.record("get_tags");
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        Ok(vec!["errand".into(), "work".into()])
    }

    async fn get_settings(&self) -> Result<Settings> {
        self.record("get_settings");
        if let Some(err) = self.read_failure() {
            return Err(err);
        }
        Ok(Settings {
            timezone: "Australia/Sydney".into(),
            date_format: 0,
            default_list_id: "100".into(),
        })
    }

    async fn add_task(
        &self,
        _timeline: &Timeline,
        _name: &str,
        list_id: Option<&str>,
    ) -> Result<TaskRef> {
        self.record("add_task");
        Ok(TaskRef {
            list_id: list_id.unwrap_or("100").to_string(),
            taskseries_id: "ts9".into(),
            task_id: "t9".into(),
        })
    }

    async fn complete_task(&self, _timeline: &Timeline, _task: &TaskRef) -> Result<()> {
        self.record("complete_task");
        Ok(())
    }

    async fn uncomplete_task(&self, _timeline: &Timeline, _task: &TaskRef) -> Result<()> {
        self.record("uncomplete_task");
        Ok(())
    }

    async fn delete_task(&self, _timeline: &Timeline, _task: &TaskRef) -> Result<()> {
        self.record("delete_task");
        Ok(())
    }

    async fn set_due_date(
        &self,
        _timeline: &Timeline,
        _task: &TaskRef,
        _due: Option<&str>,
    ) -> Result<()> {
        self.record("set_due_date");
        Ok(())
    }

    async fn set_priority(
        &self,
        _timeline: &Timeline,
        _task: &TaskRef,
        _priority: Priority,
    ) -> Result<()> {
        self.record("set_priority");
        Ok(())
    }

    async fn add_tags(&self, _timeline: &Timeline, _task: &TaskRef, _tags: &str) -> Result<()> {
        self.record("add_tags");
        Ok(())
    }

    async fn remove_tags(&self, _timeline: &Timeline, _task: &TaskRef, _tags: &str) -> Result<()> {
        self.record("remove_tags");
        Ok(())
    }

    async fn add_note(
        &self,
        _timeline: &Timeline,
        _task: &TaskRef,
        _title: &str,
        _body: &str,
    ) -> Result<()> {
        self.record("add_note");
        Ok(())
    }
}
