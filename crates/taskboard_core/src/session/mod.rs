//! Session gate: login/signup flows and the persisted session marker.
//!
//! # Responsibility
//! - Drive the login and signup forms against an `IdentityClient`.
//! - Persist the session-expiry marker that guards the task board route.
//!
//! # Invariants
//! - Login failures surface one fixed message regardless of cause.
//! - Signup failures surface the identity provider's message verbatim.
//! - The loading flag is cleared when the identity call returns.

pub mod gate;
pub mod marker;

pub use gate::{GateForm, SessionGate, LOGIN_FAILED_MESSAGE};
pub use marker::{SessionMarkerStore, SESSION_TTL_MS};
