//! Configuration loading for the remilk gateway.
//!
//! Uses figment to merge serialized defaults, an optional YAML file, and
//! `REMILK_`-prefixed environment variables, in that order.

pub mod schema;

pub use schema::Config;
