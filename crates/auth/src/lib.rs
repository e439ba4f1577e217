//! Backend authentication state machine.
//!
//! Owns the three-legged frob exchange and the derived authentication status.
//! The [`AuthController`] is the only component that mutates auth state; the
//! protocol layer consumes it through read accessors and the three
//! transitions (start flow, complete flow, logout).

pub mod controller;

pub use controller::{
    AuthController, AuthFlow, AuthStatus, CompleteOutcome, LogoutOutcome, RestoreOutcome,
};
