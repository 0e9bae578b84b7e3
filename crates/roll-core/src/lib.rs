//! Core types and trait definitions for the Roll attendance check-in flow.
//!
//! This crate is deliberately free of HTTP and database dependencies. The QR
//! payload codec is pure; the validator and recorder reach storage only
//! through the collaborator traits in [`store`].

// Native `async fn` in traits; the `Send` bounds are spelled out on the trait
// signatures themselves.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod checkin;
pub mod context;
pub mod error;
pub mod outcome;
pub mod payload;
pub mod recorder;
pub mod scan;
pub mod store;
pub mod subject;
pub mod validator;

#[cfg(test)]
mod fake;

pub use checkin::{CheckIn, CheckinPolicy};
pub use error::{Error, MalformedPayload, Result};
pub use outcome::CheckinResult;
