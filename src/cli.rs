use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use crate::{
    commands::{ListCommand, SwitchCommand},
    constants,
    profile::ProfilePaths,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "actool", version, about = "Switch the default AWS profile, optionally through an MFA session token", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "AWS credentials file [default: $AWS_SHARED_CREDENTIALS_FILE or ~/.aws/credentials]"
    )]
    pub credentials_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "AWS config file [default: $AWS_CONFIG_FILE or ~/.aws/config]"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Choose a profile and write it to the default slot")]
    Switch(SwitchCommand),
    #[command(about = "List the profiles found in the credentials file")]
    List(ListCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let paths = self.profile_paths()?;
        let command = self
            .command
            .unwrap_or_else(|| Commands::Switch(SwitchCommand::default()));

        match command {
            Commands::Switch(cmd) => cmd.execute(&paths).await,
            Commands::List(cmd) => cmd.execute(&paths),
        }
    }

    /// Flags first, then the AWS environment variables, then `~/.aws`.
    pub fn profile_paths(&self) -> Result<ProfilePaths> {
        let credentials = self
            .credentials_file
            .clone()
            .or_else(constants::get_aws_credentials_path)
            .context("Failed to determine AWS credentials path")?;
        let config = self
            .config_file
            .clone()
            .or_else(constants::get_aws_config_path)
            .context("Failed to determine AWS config path")?;

        Ok(ProfilePaths::new(credentials, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_SESSION_DURATION_SECONDS;
    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn test_no_command_defaults_to_switch() {
        let cli = Cli::try_parse_from(["actool"]).unwrap();
        assert!(cli.command.is_none());

        match cli
            .command
            .unwrap_or_else(|| Commands::Switch(SwitchCommand::default()))
        {
            Commands::Switch(cmd) => {
                assert_eq!(cmd.profile, None);
                assert_eq!(cmd.duration_seconds, DEFAULT_SESSION_DURATION_SECONDS);
            }
            _ => panic!("Expected Switch command as default"),
        }
    }

    #[test]
    fn test_switch_with_profile() {
        let cli = Cli::try_parse_from(["actool", "switch", "--profile", "alice"]).unwrap();
        match cli.command {
            Some(Commands::Switch(cmd)) => assert_eq!(cmd.profile.as_deref(), Some("alice")),
            _ => panic!("Expected Switch command"),
        }
    }

    #[test]
    fn test_switch_with_profile_short_flag() {
        let cli = Cli::try_parse_from(["actool", "switch", "-p", "dev"]).unwrap();
        match cli.command {
            Some(Commands::Switch(cmd)) => assert_eq!(cmd.profile.as_deref(), Some("dev")),
            _ => panic!("Expected Switch command"),
        }
    }

    #[test]
    fn test_switch_duration_seconds() {
        let cli =
            Cli::try_parse_from(["actool", "switch", "--duration-seconds", "3600"]).unwrap();
        match cli.command {
            Some(Commands::Switch(cmd)) => assert_eq!(cmd.duration_seconds, 3600),
            _ => panic!("Expected Switch command"),
        }
    }

    #[test]
    fn test_switch_duration_out_of_range() {
        assert!(Cli::try_parse_from(["actool", "switch", "--duration-seconds", "60"]).is_err());
        assert!(
            Cli::try_parse_from(["actool", "switch", "--duration-seconds", "200000"]).is_err()
        );
    }

    #[test]
    fn test_list_command_parsing() {
        let cli = Cli::try_parse_from(["actool", "list"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List(_))));
    }

    #[test]
    fn test_file_flags_override_paths() {
        let cli = Cli::try_parse_from([
            "actool",
            "list",
            "--credentials-file",
            "/tmp/aws/credentials",
            "--config-file",
            "/tmp/aws/config",
        ])
        .unwrap();

        let paths = cli.profile_paths().unwrap();
        assert_eq!(paths.credentials, PathBuf::from("/tmp/aws/credentials"));
        assert_eq!(paths.config, PathBuf::from("/tmp/aws/config"));
    }

    #[test]
    fn test_command_structure_validation() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        assert!(Cli::try_parse_from(["actool", "invalid"]).is_err());
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["actool", "--version"]);
        assert!(matches!(result, Err(e) if e.kind() == ErrorKind::DisplayVersion));
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = Cli::try_parse_from(["actool", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["actool", "list"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
