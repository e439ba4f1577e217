//! The production backend client: signed REST calls over HTTP.

use crate::{response, sign};
use async_trait::async_trait;
use remilk_types::{
    AuthErrorKind, AuthToken, GatewayError, Priority, RtmApi, Settings, TaskBucket, TaskList,
    TaskRef, Timeline, traits::Result,
};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;

/// REST endpoint all API methods go through.
pub const REST_URL: &str = "https://api.rememberthemilk.com/services/rest/";

/// Human-facing authorization page the frob URL points at.
pub const AUTH_URL: &str = "https://www.rememberthemilk.com/services/auth/";

/// Signed HTTP client for the backend API.
///
/// Holds the transient signing token; the persisted copy is owned by the
/// credential store. All outbound calls share one bounded timeout; a slow
/// backend fails the call instead of hanging the caller.
pub struct RtmClient {
    http: reqwest::Client,
    api_key: String,
    shared_secret: String,
    perms: String,
    rest_url: String,
    auth_base_url: String,
    auth_token: RwLock<Option<String>>,
}

impl RtmClient {
    /// Build a client with the given application credentials and request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(
        api_key: impl Into<String>,
        shared_secret: impl Into<String>,
        perms: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            shared_secret: shared_secret.into(),
            perms: perms.into(),
            rest_url: REST_URL.to_string(),
            auth_base_url: AUTH_URL.to_string(),
            auth_token: RwLock::new(None),
        })
    }

    /// Point the client at different endpoints. Test seam.
    #[must_use]
    pub fn with_urls(mut self, rest_url: impl Into<String>, auth_url: impl Into<String>) -> Self {
        self.rest_url = rest_url.into();
        self.auth_base_url = auth_url.into();
        self
    }

    /// Sign and send one API call, returning the unwrapped `rsp` payload.
    async fn invoke(&self, method: &str, mut params: Vec<(String, String)>) -> Result<Value> {
        params.push(("method".into(), method.into()));
        params.push(("api_key".into(), self.api_key.clone()));
        params.push(("format".into(), "json".into()));
        let sig = sign::api_sig(&self.shared_secret, &params);
        params.push(("api_sig".into(), sig));

        tracing::debug!(method, "backend call");
        let resp = self
            .http
            .get(&self.rest_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| transport_err(method, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Backend {
                code: 0,
                msg: format!("{method}: http status {status}"),
            });
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| transport_err(method, &e))?;
        response::unwrap_envelope(value)
    }

    /// Append the installed signing token, or fail if none is present.
    fn with_auth(&self, mut params: Vec<(String, String)>) -> Result<Vec<(String, String)>> {
        let token = self
            .auth_token
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| {
                GatewayError::auth(AuthErrorKind::Required, "no signing token installed")
            })?;
        params.push(("auth_token".into(), token));
        Ok(params)
    }
}

fn transport_err(method: &str, e: &reqwest::Error) -> GatewayError {
    let msg = if e.is_timeout() {
        format!("{method}: request timed out")
    } else {
        format!("{method}: {e}")
    };
    GatewayError::Backend { code: 0, msg }
}

fn task_params(timeline: &Timeline, task: &TaskRef) -> Vec<(String, String)> {
    vec![
        ("timeline".into(), timeline.0.clone()),
        ("list_id".into(), task.list_id.clone()),
        ("taskseries_id".into(), task.taskseries_id.clone()),
        ("task_id".into(), task.task_id.clone()),
    ]
}

#[async_trait]
impl RtmApi for RtmClient {
    async fn get_frob(&self) -> Result<String> {
        let rsp = self.invoke("rtm.auth.getFrob", Vec::new()).await?;
        response::parse_frob(&rsp)
    }

    fn auth_url(&self, frob: &str) -> String {
        let params = vec![
            ("api_key".to_string(), self.api_key.clone()),
            ("perms".to_string(), self.perms.clone()),
            ("frob".to_string(), frob.to_string()),
        ];
        let sig = sign::api_sig(&self.shared_secret, &params);
        let mut query = params;
        query.push(("api_sig".to_string(), sig));
        let encoded = serde_urlencoded::to_string(&query).unwrap_or_default();
        format!("{}?{}", self.auth_base_url, encoded)
    }

    async fn get_token(&self, frob: &str) -> Result<AuthToken> {
        let rsp = self
            .invoke(
                "rtm.auth.getToken",
                vec![("frob".into(), frob.to_string())],
            )
            .await?;
        response::parse_auth_token(&rsp)
    }

    async fn check_token(&self, token: &str) -> Result<bool> {
        let result = self
            .invoke(
                "rtm.auth.checkToken",
                vec![("auth_token".into(), token.to_string())],
            )
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(GatewayError::Backend { code, .. }) if code == response::LOGIN_FAILED => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write().unwrap() = token;
    }

    async fn create_timeline(&self) -> Result<Timeline> {
        let params = self.with_auth(Vec::new())?;
        let rsp = self.invoke("rtm.timelines.create", params).await?;
        response::parse_timeline(&rsp)
    }

    async fn get_lists(&self) -> Result<Vec<TaskList>> {
        let params = self.with_auth(Vec::new())?;
        let rsp = self.invoke("rtm.lists.getList", params).await?;
        response::parse_lists(&rsp)
    }

    async fn get_tasks(
        &self,
        list_id: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<TaskBucket>> {
        let mut params = Vec::new();
        if let Some(id) = list_id {
            params.push(("list_id".into(), id.to_string()));
        }
        if let Some(f) = filter {
            params.push(("filter".into(), f.to_string()));
        }
        let params = self.with_auth(params)?;
        let rsp = self.invoke("rtm.tasks.getList", params).await?;
        response::parse_task_buckets(&rsp)
    }

    async fn get_tags(&self) -> Result<Vec<String>> {
        let params = self.with_auth(Vec::new())?;
        let rsp = self.invoke("rtm.tags.getList", params).await?;
        response::parse_tags(&rsp)
    }

    async fn get_settings(&self) -> Result<Settings> {
        let params = self.with_auth(Vec::new())?;
        let rsp = self.invoke("rtm.settings.getList", params).await?;
        response::parse_settings(&rsp)
    }

    async fn add_task(
        &self,
        timeline: &Timeline,
        name: &str,
        list_id: Option<&str>,
    ) -> Result<TaskRef> {
        let mut params = vec![
            ("timeline".into(), timeline.0.clone()),
            ("name".into(), name.to_string()),
            // Smart Add: let the backend parse dates and priorities in the name
            ("parse".into(), "1".into()),
        ];
        if let Some(id) = list_id {
            params.push(("list_id".into(), id.to_string()));
        }
        let params = self.with_auth(params)?;
        let rsp = self.invoke("rtm.tasks.add", params).await?;
        response::parse_added_task(&rsp)
    }

    async fn complete_task(&self, timeline: &Timeline, task: &TaskRef) -> Result<()> {
        let params = self.with_auth(task_params(timeline, task))?;
        self.invoke("rtm.tasks.complete", params).await.map(|_| ())
    }

    async fn uncomplete_task(&self, timeline: &Timeline, task: &TaskRef) -> Result<()> {
        let params = self.with_auth(task_params(timeline, task))?;
        self.invoke("rtm.tasks.uncomplete", params).await.map(|_| ())
    }

    async fn delete_task(&self, timeline: &Timeline, task: &TaskRef) -> Result<()> {
        let params = self.with_auth(task_params(timeline, task))?;
        self.invoke("rtm.tasks.delete", params).await.map(|_| ())
    }

    async fn set_due_date(
        &self,
        timeline: &Timeline,
        task: &TaskRef,
        due: Option<&str>,
    ) -> Result<()> {
        let mut params = task_params(timeline, task);
        if let Some(due) = due {
            params.push(("due".into(), due.to_string()));
            params.push(("parse".into(), "1".into()));
        }
        let params = self.with_auth(params)?;
        self.invoke("rtm.tasks.setDueDate", params).await.map(|_| ())
    }

    async fn set_priority(
        &self,
        timeline: &Timeline,
        task: &TaskRef,
        priority: Priority,
    ) -> Result<()> {
        let mut params = task_params(timeline, task);
        params.push(("priority".into(), priority.as_param().to_string()));
        let params = self.with_auth(params)?;
        self.invoke("rtm.tasks.setPriority", params).await.map(|_| ())
    }

    async fn add_tags(&self, timeline: &Timeline, task: &TaskRef, tags: &str) -> Result<()> {
        let mut params = task_params(timeline, task);
        params.push(("tags".into(), tags.to_string()));
        let params = self.with_auth(params)?;
        self.invoke("rtm.tasks.addTags", params).await.map(|_| ())
    }

    async fn remove_tags(&self, timeline: &Timeline, task: &TaskRef, tags: &str) -> Result<()> {
        let mut params = task_params(timeline, task);
        params.push(("tags".into(), tags.to_string()));
        let params = self.with_auth(params)?;
        self.invoke("rtm.tasks.removeTags", params).await.map(|_| ())
    }

    async fn add_note(
        &self,
        timeline: &Timeline,
        task: &TaskRef,
        title: &str,
        body: &str,
    ) -> Result<()> {
        let mut params = task_params(timeline, task);
        params.push(("note_title".into(), title.to_string()));
        params.push(("note_text".into(), body.to_string()));
        let params = self.with_auth(params)?;
        self.invoke("rtm.tasks.notes.add", params).await.map(|_| ())
    }
}
