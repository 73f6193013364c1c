//! Profile switching flow.
//!
//! `SelectProfile → SelectAction → {End | ExchangeSession} → End`. Files are
//! written exactly once, when `End` runs; an error anywhere before that
//! leaves both files untouched.

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::{
    aws::{SessionCredentials, SessionExchange},
    constants::{DEFAULT_PROFILE, DEFAULT_SESSION_DURATION_SECONDS},
    profile::{Config, Credential, Model, ProfileStore},
    prompt::{Action, Prompt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SelectProfile,
    SelectAction,
    ExchangeSession,
    End,
}

impl From<Action> for Mode {
    fn from(action: Action) -> Self {
        match action {
            Action::Commit => Mode::End,
            Action::ExchangeSession => Mode::ExchangeSession,
        }
    }
}

/// What a completed run wrote
#[derive(Debug, Clone)]
pub struct Outcome {
    pub profile: String,
    pub session: Option<SessionCredentials>,
}

/// Drives one run. `connect` builds the session exchange from the default
/// slot's keys and config once a profile has been copied there.
pub struct Switcher<'a, P, C> {
    store: &'a ProfileStore,
    model: Model,
    prompt: P,
    connect: C,
    duration_seconds: i32,
    profile: Option<String>,
    session: Option<SessionCredentials>,
}

impl<'a, P, C, X> Switcher<'a, P, C>
where
    P: Prompt,
    C: Fn(&Credential, &Config) -> X,
    X: SessionExchange,
{
    pub fn new(store: &'a ProfileStore, model: Model, prompt: P, connect: C) -> Self {
        Self {
            store,
            model,
            prompt,
            connect,
            duration_seconds: DEFAULT_SESSION_DURATION_SECONDS,
            profile: None,
            session: None,
        }
    }

    pub fn duration_seconds(mut self, duration_seconds: i32) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    pub async fn run(mut self) -> Result<Outcome> {
        let mut mode = Mode::SelectProfile;

        loop {
            debug!(?mode, "Entering mode");
            mode = match mode {
                Mode::SelectProfile => self.select_profile()?,
                Mode::SelectAction => self.prompt.select_action()?.into(),
                Mode::ExchangeSession => self.exchange_session().await?,
                Mode::End => break,
            };
        }

        self.store
            .set_default(&self.model)
            .context("Failed to write the default profile")?;

        Ok(Outcome {
            profile: self.profile.unwrap_or_default(),
            session: self.session,
        })
    }

    fn select_profile(&mut self) -> Result<Mode> {
        let names = self.model.profile_names();
        let profile = self
            .prompt
            .select_profile(&names)?
            .filter(|profile| !profile.is_empty())
            .context("No profile selected")?;

        self.model
            .select(&profile)
            .with_context(|| format!("Failed to select profile '{profile}'"))?;

        info!("Selected profile: {}", profile);
        self.profile = Some(profile);
        Ok(Mode::SelectAction)
    }

    async fn exchange_session(&mut self) -> Result<Mode> {
        let exchange = {
            let credential = self.model.credential(DEFAULT_PROFILE)?;
            let config = self.model.config(DEFAULT_PROFILE)?;
            (self.connect)(credential, config)
        };

        let identity = exchange
            .account()
            .await
            .context("Failed to get the caller identity")?;
        if identity.account.is_empty() || identity.user_name.is_empty() {
            bail!(
                "Cannot derive an MFA serial number from caller identity '{}'",
                identity.arn
            );
        }

        let serial_number = identity.mfa_serial_number();
        let mfa_code = self.prompt.mfa_code(&serial_number)?;

        let session = exchange
            .session_token(
                self.duration_seconds,
                &identity.account,
                &identity.user_name,
                &mfa_code,
            )
            .await
            .context("Failed to get a session token")?;

        self.model.apply_session(&session)?;
        self.session = Some(session);
        Ok(Mode::End)
    }
}
