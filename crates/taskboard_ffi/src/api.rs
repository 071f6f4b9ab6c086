//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose login/signup and task board actions to Dart via FRB.
//! - Flatten core results into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Board actions are refused without a valid session marker.

use log::{error, warn};
use std::sync::OnceLock;
use taskboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, new_user_fields,
    ping as ping_inner, AppConfig, AppContext, ConfigError, BoardNotice, BoardResult, DocumentStore, GateForm,
    ListItem, Route, SqliteDocumentStore, TaskBoard, TaskStatus, USERS_COLLECTION,
};

static FFI_CONFIG: OnceLock<Result<AppConfig, String>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result of a login or signup submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResponse {
    pub ok: bool,
    /// Path to navigate to on success (`/` or `/login`).
    pub route: Option<String>,
    /// Error text to show under the form; empty on success.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Alert text: success notice or failure description.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardItem {
    pub record_id: String,
    pub primary: String,
    pub secondary: String,
    pub actionable: bool,
}

/// One user selector entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardUser {
    pub id: String,
    pub label: String,
}

/// Board snapshot for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardListResponse {
    pub ok: bool,
    pub items: Vec<BoardItem>,
    pub users: Vec<BoardUser>,
    pub message: String,
}

/// Signs in and stores a 14-day session marker.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_login(email: String, password: String) -> GateResponse {
    with_context(|context| {
        let mut gate = context.session_gate();
        *gate.login_form_mut() = GateForm::new(email, password);
        let route = gate.login();
        gate_response(route, gate.login_form().error())
    })
    .unwrap_or_else(|err| GateResponse {
        ok: false,
        route: None,
        message: err,
    })
}

/// Creates an account; success routes to the login screen.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_signup(email: String, password: String) -> GateResponse {
    with_context(|context| {
        let mut gate = context.session_gate();
        *gate.signup_form_mut() = GateForm::new(email, password);
        let route = gate.signup();
        gate_response(route, gate.signup_form().error())
    })
    .unwrap_or_else(|err| GateResponse {
        ok: false,
        route: None,
        message: err,
    })
}

/// Clears the stored session marker.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_logout() -> ActionResponse {
    match with_context(|context| context.session_gate().logout().map_err(|e| e.to_string())) {
        Ok(Ok(())) => ActionResponse::success("Logged out."),
        Ok(Err(err)) | Err(err) => ActionResponse::failure(format!("auth_logout failed: {err}")),
    }
}

/// Applies the route guard to `path`; unknown paths resolve to `/`.
#[flutter_rust_bridge::frb(sync)]
pub fn route_resolve(path: String) -> String {
    let requested = Route::from_path(&path).unwrap_or(Route::TaskBoard);
    with_context(|context| context.resolve_route(requested).map_err(|e| e.to_string()))
        .and_then(|resolved| resolved)
        .unwrap_or(Route::Login)
        .path()
        .to_string()
}

/// Lists active (or history) rows plus the user selector entries.
#[flutter_rust_bridge::frb(sync)]
pub fn board_list(search: Option<String>, history: bool) -> BoardListResponse {
    let outcome = with_board(|board| {
        if let Some(term) = search.as_deref() {
            board.search(term);
        }
        let items = if history {
            board.history_items()
        } else {
            board.active_items()
        };
        (items, board.user_options())
    });
    match outcome {
        Ok((items, users)) => BoardListResponse {
            ok: true,
            message: format!("{} item(s).", items.len()),
            items: items.into_iter().map(to_board_item).collect(),
            users: users
                .into_iter()
                .map(|user| BoardUser {
                    id: user.id,
                    label: user.label,
                })
                .collect(),
        },
        Err(err) => BoardListResponse {
            ok: false,
            items: Vec::new(),
            users: Vec::new(),
            message: format!("board_list failed: {err}"),
        },
    }
}

/// Adds a user record; returns its ID in `message` on success.
#[flutter_rust_bridge::frb(sync)]
pub fn board_seed_user(name: String) -> ActionResponse {
    let outcome = with_context(|context| {
        require_session(context)?;
        context
            .store()
            .create_document(USERS_COLLECTION, new_user_fields(name.trim()))
            .map_err(|err| err.to_string())
    })
    .and_then(|created| created);
    match outcome {
        Ok(id) => ActionResponse::success(id),
        Err(err) => ActionResponse::failure(format!("board_seed_user failed: {err}")),
    }
}

/// Assigns `task` with `status` (wire label, e.g. `In Progress`).
#[flutter_rust_bridge::frb(sync)]
pub fn board_assign(user_id: String, task: String, status: String) -> ActionResponse {
    board_action(|board| board.assign_task(&user_id, &task, TaskStatus::parse(&status)))
}

/// Rewrites the task of a record opened for editing.
#[flutter_rust_bridge::frb(sync)]
pub fn board_update(user_id: String, task: String, status: String) -> ActionResponse {
    board_action(|board| {
        if let Some(record) = board.record(&user_id) {
            board.edit_task(&record);
        }
        board.update_task(&user_id, &task, TaskStatus::parse(&status))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_complete(user_id: String) -> ActionResponse {
    board_action(|board| board.complete_task(&user_id))
}

/// Soft-deletes; the Dart side passes the user's answer to the prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete(user_id: String, confirmed: bool) -> ActionResponse {
    match with_board(|board| board.delete_task(&user_id, |_| confirmed)) {
        Ok(Ok(Some(notice))) => ActionResponse::success(notice.message()),
        Ok(Ok(None)) => ActionResponse::success(""),
        Ok(Err(err)) => ActionResponse::failure(err.to_string()),
        Err(err) => ActionResponse::failure(err),
    }
}

fn board_action(
    action: impl FnOnce(&mut TaskBoard<SqliteDocumentStore>) -> BoardResult<BoardNotice>,
) -> ActionResponse {
    match with_board(action) {
        Ok(Ok(notice)) => ActionResponse::success(notice.message()),
        Ok(Err(err)) => {
            warn!("event=ffi_board_action module=ffi status=rejected error={}", err);
            ActionResponse::failure(err.to_string())
        }
        Err(err) => {
            warn!("event=ffi_board_action module=ffi status=error error={}", err);
            ActionResponse::failure(err)
        }
    }
}

fn gate_response(route: Option<Route>, error: Option<&str>) -> GateResponse {
    match route {
        Some(route) => GateResponse {
            ok: true,
            route: Some(route.path().to_string()),
            message: String::new(),
        },
        None => GateResponse {
            ok: false,
            route: None,
            message: error.unwrap_or_default().to_string(),
        },
    }
}

fn to_board_item(item: ListItem) -> BoardItem {
    BoardItem {
        record_id: item.record_id,
        primary: item.primary,
        secondary: item.secondary,
        actionable: item.actionable,
    }
}

/// Process-wide config resolved once from `TASKBOARD_*` variables.
///
/// When `TASKBOARD_LOG_DIR` is set, file logging starts on first use.
fn ffi_config() -> Result<AppConfig, String> {
    FFI_CONFIG.get_or_init(load_config).clone()
}

fn load_config() -> Result<AppConfig, String> {
    prepare_config(AppConfig::from_env())
}

fn prepare_config(parsed: Result<AppConfig, ConfigError>) -> Result<AppConfig, String> {
    let config = parsed.map_err(|err| format!("invalid configuration: {err}"))?;
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging_inner(&config.log_level, &log_dir.to_string_lossy()) {
            return Err(format!("logging init failed: {err}"));
        }
    }
    Ok(config)
}

fn with_context<T>(f: impl FnOnce(&AppContext) -> T) -> Result<T, String> {
    let config = ffi_config()?;
    let context = AppContext::init(config).map_err(|err| {
        error!("event=ffi_context module=ffi status=error error={}", err);
        format!("DB open failed: {err}")
    })?;
    let value = f(&context);
    context.shutdown();
    Ok(value)
}

fn with_board<T>(f: impl FnOnce(&mut TaskBoard<SqliteDocumentStore>) -> T) -> Result<T, String> {
    with_context(|context| {
        require_session(context)?;
        let mut board = context.task_board();
        board.load_users();
        Ok(f(&mut board))
    })
    .and_then(|inner| inner)
}

fn require_session(context: &AppContext) -> Result<(), String> {
    match context.resolve_route(Route::TaskBoard) {
        Ok(Route::TaskBoard) => Ok(()),
        Ok(_) => Err("not logged in or session expired".to_string()),
        Err(err) => Err(err.to_string()),
    }
}
