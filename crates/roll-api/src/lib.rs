//! JSON REST API for Roll.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! check-in collaborators and the [`Registry`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roll_api::api_router(store.clone(), policy))
//! ```

pub mod attendance;
pub mod checkin;
pub mod contexts;
pub mod error;
pub mod payloads;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use roll_core::{
  CheckinPolicy,
  store::{AttendanceStore, ContextDirectory, Registry, SubjectDirectory},
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Source of the current time in Unix milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub policy: Arc<CheckinPolicy>,
  /// Scan and issuance time. Never taken from the request.
  pub clock:  Clock,
}

impl<S> ApiState<S> {
  pub(crate) fn now_millis(&self) -> i64 { (self.clock)() }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, policy: CheckinPolicy) -> Router<()>
where
  S: Registry + SubjectDirectory + ContextDirectory + AttendanceStore + Clone + 'static,
{
  api_router_with_clock(store, policy, Arc::new(system_clock))
}

/// Like [`api_router`], reading the time from `clock` instead of the system.
pub fn api_router_with_clock<S>(store: Arc<S>, policy: CheckinPolicy, clock: Clock) -> Router<()>
where
  S: Registry + SubjectDirectory + ContextDirectory + AttendanceStore + Clone + 'static,
{
  let state = ApiState { store, policy: Arc::new(policy), clock };

  Router::new()
    // Check-in
    .route("/checkin", post(checkin::handler::<S>))
    // Payloads
    .route("/payloads/attendance", post(payloads::attendance::<S>))
    .route("/payloads/badge", post(payloads::badge::<S>))
    // Attendance
    .route("/attendance", get(attendance::list::<S>))
    // Subjects
    .route("/subjects", post(subjects::create::<S>))
    .route("/subjects/{code}", get(subjects::get_one::<S>))
    .route("/subjects/{code}/active", put(subjects::set_active::<S>))
    // Contexts
    .route("/contexts", post(contexts::create::<S>))
    .route("/contexts/{code}", get(contexts::get_one::<S>))
    .route("/contexts/{code}/active", put(contexts::set_active::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn system_clock() -> i64 { chrono::Utc::now().timestamp_millis() }

#[cfg(test)]
mod tests;
