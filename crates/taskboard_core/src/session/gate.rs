//! Login and signup form state machines.

use crate::db::now_epoch_ms;
use crate::identity::IdentityClient;
use crate::navigation::Route;
use crate::session::marker::SessionMarkerStore;
use log::{error, info, warn};

/// Fixed message shown for every login failure.
pub const LOGIN_FAILED_MESSAGE: &str = "Failed to log in";

/// Email/password form with error and loading indicators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateForm {
    pub email: String,
    pub password: String,
    error: Option<String>,
    loading: bool,
}

impl GateForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Message to display under the form title, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The submit control is disabled while a request is in flight.
    pub fn can_submit(&self) -> bool {
        !self.loading
    }
}

/// Login/signup controller over an identity client.
pub struct SessionGate<I: IdentityClient> {
    identity: I,
    markers: SessionMarkerStore,
    login: GateForm,
    signup: GateForm,
}

impl<I: IdentityClient> SessionGate<I> {
    pub fn new(identity: I, markers: SessionMarkerStore) -> Self {
        Self {
            identity,
            markers,
            login: GateForm::default(),
            signup: GateForm::default(),
        }
    }

    pub fn login_form(&self) -> &GateForm {
        &self.login
    }

    pub fn login_form_mut(&mut self) -> &mut GateForm {
        &mut self.login
    }

    pub fn signup_form(&self) -> &GateForm {
        &self.signup
    }

    pub fn signup_form_mut(&mut self) -> &mut GateForm {
        &mut self.signup
    }

    /// Submits the login form.
    ///
    /// Returns the route to navigate to on success, `None` on failure with
    /// `LOGIN_FAILED_MESSAGE` set on the form.
    pub fn login(&mut self) -> Option<Route> {
        self.login_at(now_epoch_ms())
    }

    /// Same as `login` with an explicit clock for the session marker.
    pub fn login_at(&mut self, now_ms: i64) -> Option<Route> {
        if !self.login.can_submit() {
            return None;
        }
        self.login.loading = true;
        self.login.error = None;
        let outcome = self
            .identity
            .sign_in_with_password(&self.login.email, &self.login.password);
        let route = match outcome {
            Ok(_session) => match self.markers.write_expiry(now_ms) {
                Ok(_) => {
                    info!("event=login module=session status=ok");
                    Some(Route::TaskBoard)
                }
                Err(err) => {
                    error!(
                        "event=login module=session status=error error_code=marker_write_failed error={err}"
                    );
                    None
                }
            },
            Err(err) => {
                warn!("event=login module=session status=error error={err}");
                None
            }
        };
        self.login.loading = false;
        if route.is_none() {
            self.login.error = Some(LOGIN_FAILED_MESSAGE.to_string());
        }
        route
    }

    /// Submits the signup form.
    ///
    /// On success the user is sent to the login screen; on failure the
    /// provider's message is shown as-is.
    pub fn signup(&mut self) -> Option<Route> {
        if !self.signup.can_submit() {
            return None;
        }
        self.signup.loading = true;
        self.signup.error = None;
        let outcome = self
            .identity
            .create_account(&self.signup.email, &self.signup.password);
        self.signup.loading = false;
        match outcome {
            Ok(_session) => {
                info!("event=signup module=session status=ok");
                Some(Route::Login)
            }
            Err(err) => {
                error!("event=signup module=session status=error error={err}");
                self.signup.error = Some(err.to_string());
                None
            }
        }
    }

    /// Drops the persisted session marker.
    pub fn logout(&self) -> crate::db::DbResult<()> {
        self.markers.clear()
    }

    pub fn markers(&self) -> &SessionMarkerStore {
        &self.markers
    }
}
