//! Async traits shared across all remilk crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `remilk-types`, not on each other. Both traits take `&self` and are
//! object-safe; the gateway holds them as `Arc<dyn ...>` so tests can inject
//! scripted fakes.

use crate::{AuthToken, Priority, Settings, TaskBucket, TaskList, TaskRef, Timeline, TokenInfo};
use async_trait::async_trait;

pub use crate::error::Result;

/// Persistent storage for the single long-lived credential record.
///
/// Implementations must serialize reads against writes so a concurrent `load`
/// never observes a half-written record.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored record; `None` when nothing is persisted.
    async fn load(&self) -> Result<Option<AuthToken>>;
    /// Persist the record, atomically replacing any previous one.
    async fn save(&self, token: &AuthToken) -> Result<()>;
    /// Remove the record. Removing a missing record is not an error.
    async fn delete(&self) -> Result<()>;
    /// Metadata of the stored record, without the secret itself.
    async fn inspect(&self) -> Result<Option<TokenInfo>> {
        Ok(self.load().await?.map(|t| t.info()))
    }
}

/// The backend's API surface as the gateway consumes it.
///
/// Exactly the four auth/transaction operations plus the domain reads and
/// timeline-threaded writes. The production implementation signs each call
/// and parses the response envelope; tests substitute a recording fake.
#[async_trait]
pub trait RtmApi: Send + Sync {
    // ── Auth and transaction operations ───────────────────────────────────

    /// Request a short-lived frob to start the three-legged exchange.
    async fn get_frob(&self) -> Result<String>;
    /// Build the human-facing authorization URL embedding `frob`.
    fn auth_url(&self, frob: &str) -> String;
    /// Exchange an authorized frob for a long-lived token.
    async fn get_token(&self, frob: &str) -> Result<AuthToken>;
    /// Ask the backend whether `token` is still valid.
    ///
    /// `Ok(false)` means the backend rejected the token; an `Err` is a
    /// transport or envelope failure and says nothing about validity.
    async fn check_token(&self, token: &str) -> Result<bool>;
    /// Install (or clear) the signing token used for authenticated calls.
    fn set_auth_token(&self, token: Option<String>);
    /// Obtain a fresh per-mutation transaction handle.
    async fn create_timeline(&self) -> Result<Timeline>;

    // ── Domain reads ──────────────────────────────────────────────────────

    async fn get_lists(&self) -> Result<Vec<TaskList>>;
    /// Tasks grouped by list; `list_id` narrows to one list, `filter` is the
    /// backend's search grammar (e.g. `status:incomplete`).
    async fn get_tasks(
        &self,
        list_id: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<TaskBucket>>;
    async fn get_tags(&self) -> Result<Vec<String>>;
    async fn get_settings(&self) -> Result<Settings>;

    // ── Domain writes (timeline-threaded) ─────────────────────────────────

    /// Add a task by name; returns the id triple the backend assigned.
    async fn add_task(
        &self,
        timeline: &Timeline,
        name: &str,
        list_id: Option<&str>,
    ) -> Result<TaskRef>;
    async fn complete_task(&self, timeline: &Timeline, task: &TaskRef) -> Result<()>;
    async fn uncomplete_task(&self, timeline: &Timeline, task: &TaskRef) -> Result<()>;
    async fn delete_task(&self, timeline: &Timeline, task: &TaskRef) -> Result<()>;
    /// `due = None` clears the due date; the backend parses natural language.
    async fn set_due_date(
        &self,
        timeline: &Timeline,
        task: &TaskRef,
        due: Option<&str>,
    ) -> Result<()>;
    async fn set_priority(
        &self,
        timeline: &Timeline,
        task: &TaskRef,
        priority: Priority,
    ) -> Result<()>;
    /// `tags` is a comma-separated list, as the backend expects.
    async fn add_tags(&self, timeline: &Timeline, task: &TaskRef, tags: &str) -> Result<()>;
    async fn remove_tags(&self, timeline: &Timeline, task: &TaskRef, tags: &str) -> Result<()>;
    async fn add_note(
        &self,
        timeline: &Timeline,
        task: &TaskRef,
        title: &str,
        body: &str,
    ) -> Result<()>;
}
