//! Authentication session
use ::log::{debug, warn};
use serde_json::{Map, Value};
use tt_api::{ApiError, Params};
use uuid::Uuid;

use crate::{
    actions::Action,
    app::{App, field},
    error::Result,
    preferences::{DEVICE_ID, TOKEN},
};

pub(crate) const LOGIN_API_PATH: &str = "authentication/login";
pub(crate) const WHO_AM_I_PATH: &str = "user/whoAmI";

impl App {
    /// Log in and load the user profile
    ///
    /// The outcome is also recorded on the auth state: `error` carries the
    /// failure message, `loading` is cleared either way. Once the backend has
    /// issued a token the login stands; a failing profile fetch is only
    /// logged and leaves `user` unset.
    pub async fn login(&self, login: &str, password: &str, remember_me: Option<bool>) -> Result<()> {
        let did = self.with_state(|state| state.auth.did.clone());
        self.dispatch(Action::LoginStarted).await;

        let mut body = Map::new();
        body.insert("login".to_string(), Value::from(login));
        body.insert("password".to_string(), Value::from(password));
        if let Some(remember_me) = remember_me {
            body.insert("rememberMe".to_string(), Value::from(remember_me));
        }
        body.insert("did".to_string(), did.map(Value::from).unwrap_or(Value::Null));

        let result = self.authenticate(Value::Object(body)).await;
        match &result {
            Ok(()) => {
                if let Err(e) = self.load_user().await {
                    warn!("Failed to load user after login: {}", e);
                }
            }
            Err(e) => self.dispatch(Action::LoginFailed(e.to_string())).await,
        }
        self.dispatch(Action::SetAuthLoading(false)).await;
        result
    }

    async fn authenticate(&self, body: Value) -> Result<()> {
        let response = self.api().post(LOGIN_API_PATH, Some(body)).await?;
        let token = response
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("login response carries no token".into()))?;

        self.dispatch(Action::LoginSucceeded { token }).await;
        Ok(())
    }

    async fn load_user(&self) -> Result<()> {
        let response = self.api().get(WHO_AM_I_PATH, &Params::new()).await?;
        let user: Value = field(response, "user")?;
        self.dispatch(Action::UserLoaded(user)).await;
        Ok(())
    }

    /// Drop the session and go back to the login screen
    pub async fn logout(&self) {
        debug!("Logging out");
        self.dispatch(Action::LoggedOut).await;
    }

    /// Restore the session persisted by a previous run
    ///
    /// Generates and persists a device id on first start. A stored token
    /// that the backend no longer accepts logs the user out.
    pub async fn initialize(&self) -> Result<()> {
        let token = self.preferences().get(TOKEN).await?;
        let did = self.preferences().get(DEVICE_ID).await?;

        match did.filter(|did| !did.is_empty()) {
            Some(did) => self.dispatch(Action::DeviceIdRestored(did)).await,
            None => {
                let did = Uuid::new_v4().to_string();
                debug!("Generated device id {}", did);
                self.dispatch(Action::DeviceIdGenerated(did)).await;
            }
        }

        if let Some(token) = token.filter(|token| !token.is_empty()) {
            self.dispatch(Action::TokenRestored(token)).await;
            if let Err(e) = self.load_user().await {
                warn!("Stored session rejected: {}", e);
                self.logout().await;
            }
            self.dispatch(Action::SetAuthLoading(false)).await;
        }

        Ok(())
    }
}
