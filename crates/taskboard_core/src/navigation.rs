//! Logical destinations and the task board route guard.
//!
//! # Invariants
//! - `TaskBoard` is reachable only with an unexpired session marker.
//! - `Login` and `Signup` are always reachable.

use crate::db::DbResult;
use crate::session::marker::SessionMarkerStore;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    TaskBoard,
    Login,
    Signup,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::TaskBoard => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim().trim_end_matches('/') {
            "" => Some(Self::TaskBoard),
            "/login" => Some(Self::Login),
            "/signup" => Some(Self::Signup),
            _ => None,
        }
    }
}

/// Resolves the route actually shown for `requested` at `now_ms`.
pub fn guard(requested: Route, markers: &SessionMarkerStore, now_ms: i64) -> DbResult<Route> {
    let resolved = match requested {
        Route::TaskBoard if !markers.is_valid(now_ms)? => Route::Login,
        other => other,
    };
    if resolved != requested {
        debug!(
            "event=route_guard module=navigation status=redirect from={} to={}",
            requested.path(),
            resolved.path()
        );
    }
    Ok(resolved)
}
