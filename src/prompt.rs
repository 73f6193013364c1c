use anyhow::{Context, Result};
use dialoguer::{Input, Select, theme::ColorfulTheme};

use crate::constants::MFA_CODE_LENGTH;

/// What to do with the profile once it is in the default slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write the chosen profile as is
    Commit,
    /// Exchange its keys for an MFA session first
    ExchangeSession,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Commit, Action::ExchangeSession];

    pub fn label(self) -> &'static str {
        match self {
            Action::Commit => "Set chosen profile as default",
            Action::ExchangeSession => "Set chosen profile with an STS session token",
        }
    }
}

/// Interactive choices needed while switching profiles.
pub trait Prompt {
    /// `None` when the user backs out without choosing.
    fn select_profile(&mut self, profiles: &[&str]) -> Result<Option<String>>;

    fn select_action(&mut self) -> Result<Action>;

    fn mfa_code(&mut self, serial_number: &str) -> Result<String>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn select_profile(&mut self, profiles: &[&str]) -> Result<Option<String>> {
        (**self).select_profile(profiles)
    }

    fn select_action(&mut self) -> Result<Action> {
        (**self).select_action()
    }

    fn mfa_code(&mut self, serial_number: &str) -> Result<String> {
        (**self).mfa_code(serial_number)
    }
}

/// Terminal menus; a profile given up front skips the profile menu.
pub struct TerminalPrompt {
    theme: ColorfulTheme,
    profile: Option<String>,
}

impl TerminalPrompt {
    pub fn new(profile: Option<String>) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            profile,
        }
    }
}

impl Prompt for TerminalPrompt {
    fn select_profile(&mut self, profiles: &[&str]) -> Result<Option<String>> {
        if let Some(profile) = self.profile.take() {
            return Ok(Some(profile));
        }

        let items: Vec<String> = profiles
            .iter()
            .enumerate()
            .map(|(idx, name)| format!("[{idx}] {name}"))
            .collect();

        let selection = Select::with_theme(&self.theme)
            .with_prompt("Credentials")
            .items(&items)
            .default(0)
            .interact_opt()
            .context("Failed to read profile selection")?;

        Ok(selection.and_then(|idx| profiles.get(idx)).map(|name| name.to_string()))
    }

    fn select_action(&mut self) -> Result<Action> {
        let labels: Vec<&str> = Action::ALL.iter().map(|action| action.label()).collect();

        let idx = Select::with_theme(&self.theme)
            .with_prompt("Select Action")
            .items(&labels)
            .default(0)
            .interact()
            .context("Failed to read action selection")?;

        Action::ALL
            .get(idx)
            .copied()
            .context("Action selection out of range")
    }

    fn mfa_code(&mut self, serial_number: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("MFA code for {serial_number}"))
            .validate_with(|input: &String| validate_mfa_code(input))
            .interact_text()
            .context("Failed to read MFA code")
    }
}

pub fn validate_mfa_code(input: &str) -> std::result::Result<(), &'static str> {
    if input.len() != MFA_CODE_LENGTH {
        Err("MFA code must be 6 digits")
    } else if !input.chars().all(|c| c.is_ascii_digit()) {
        Err("MFA code must contain digits only")
    } else {
        Ok(())
    }
}
