use anyhow::{Context, Result};
use aws_smithy_types::date_time::Format;
use clap::Args;
use tracing::info;

use crate::{
    aws::StsSessionExchange,
    constants::{
        DEFAULT_SESSION_DURATION_SECONDS, MAX_SESSION_DURATION_SECONDS,
        MIN_SESSION_DURATION_SECONDS,
    },
    profile::{Config, Credential, ProfilePaths, ProfileStore},
    prompt::TerminalPrompt,
    switch::Switcher,
};

#[derive(Debug, Clone, Args)]
pub struct SwitchCommand {
    #[arg(short = 'p', long, help = "Profile to make the default, skipping the menu")]
    pub profile: Option<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_SESSION_DURATION_SECONDS,
        value_parser = clap::value_parser!(i32).range(
            i64::from(MIN_SESSION_DURATION_SECONDS)..=i64::from(MAX_SESSION_DURATION_SECONDS)
        ),
        help = "Lifetime of an STS session token in seconds"
    )]
    pub duration_seconds: i32,
}

impl Default for SwitchCommand {
    fn default() -> Self {
        Self {
            profile: None,
            duration_seconds: DEFAULT_SESSION_DURATION_SECONDS,
        }
    }
}

impl SwitchCommand {
    pub async fn execute(self, paths: &ProfilePaths) -> Result<()> {
        info!(
            "Loading profiles from {} and {}",
            paths.credentials.display(),
            paths.config.display()
        );

        let store = ProfileStore::new(paths.clone());
        let model = store.load().context("Failed to load AWS profiles")?;

        let outcome = Switcher::new(
            &store,
            model,
            TerminalPrompt::new(self.profile),
            |credential: &Credential, config: &Config| {
                StsSessionExchange::new(
                    &credential.access_key,
                    &credential.secret_key,
                    &config.region,
                )
            },
        )
        .duration_seconds(self.duration_seconds)
        .run()
        .await?;

        println!("\nProfile '{}' set as default.", outcome.profile);
        if let Some(session) = &outcome.session {
            println!(
                "Session token will expire at: {}",
                session
                    .expiration
                    .fmt(Format::DateTime)
                    .unwrap_or_else(|_| "unknown".to_string())
            );
        }

        Ok(())
    }
}
