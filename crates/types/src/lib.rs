//! Core types and traits for the remilk workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! remilk gateway, including the error taxonomy, the persisted auth token
//! record, the task domain model, and the async traits that each layer
//! implements.

pub mod error;
pub mod model;
pub mod token;
pub mod traits;

pub use error::{AuthErrorKind, GatewayError};
pub use model::{Note, Priority, Settings, Task, TaskBucket, TaskList, TaskRef, TaskSeries, Timeline};
pub use token::{AuthToken, TokenInfo};
pub use traits::{RtmApi, TokenStore};
