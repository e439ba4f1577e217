//! HTTP client for the Remember The Milk REST API.
//!
//! Every call is signed with the application's shared secret, requests the
//! JSON response format, and is parsed out of the `rsp` envelope into the
//! typed domain model. The [`RtmClient`] implements the [`remilk_types::RtmApi`]
//! trait that the rest of the gateway consumes.

pub mod client;
pub mod response;
pub mod sign;

pub use client::RtmClient;
