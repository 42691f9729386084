pub mod analyze;
pub mod auth;
pub mod calendar;
pub mod children;
pub mod events;

use anyhow::{Context as _, Result};
use famcal_client::{ApiClient, ApiError, ApiResult, Session, SessionStore};
use famcal_core::config::FamcalConfig;
use famcal_core::validation::ValidationErrors;
use owo_colors::OwoColorize;

/// Config and session, loaded once per invocation.
pub struct Context {
    pub config: FamcalConfig,
    store: SessionStore,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = FamcalConfig::load().context("Failed to load config")?;
        let store = SessionStore::new(config.session_path());
        Ok(Context::new(config, store))
    }

    pub fn new(config: FamcalConfig, store: SessionStore) -> Self {
        Context { config, store }
    }

    pub fn session(&self) -> Result<Option<Session>> {
        self.store.load().context("Failed to read session")
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.store
            .save(session)
            .with_context(|| format!("Failed to save session to {}", self.store.path().display()))
    }

    pub fn clear_session(&self) -> Result<bool> {
        self.store.clear().context("Failed to remove session")
    }

    /// Client without credentials, for login and registration.
    pub fn anonymous_client(&self) -> Result<ApiClient> {
        Ok(ApiClient::from_config(&self.config)?)
    }

    /// Client carrying the stored session's token.
    pub fn client(&self) -> Result<ApiClient> {
        let session = self.session()?.ok_or(ApiError::NotLoggedIn)?;
        Ok(self.anonymous_client()?.with_session(&session))
    }
}

/// Unwrap an API result, printing field errors one per line.
pub fn submit<T>(result: ApiResult<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ApiError::Validation(errors)) => {
            print_validation_errors(&errors);
            anyhow::bail!("Nothing was saved")
        }
        Err(e) => Err(e.into()),
    }
}

pub fn print_validation_errors(errors: &ValidationErrors) {
    for (field, messages) in errors.iter() {
        for message in messages {
            eprintln!("  {} {}", format!("{field}:").red(), message);
        }
    }
}

/// "1 event", "3 events"
pub fn pluralize(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}
