use std::{env, path::PathBuf};

use dirs;

/// Name of the slot AWS tooling reads when no profile is given
pub const DEFAULT_PROFILE: &str = "default";

/// Prefix of named sections in the AWS config file
pub const CONFIG_PROFILE_PREFIX: &str = "profile ";

pub const AWS_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const AWS_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const AWS_SESSION_TOKEN: &str = "aws_session_token";
pub const ORIGINAL_AWS_ACCESS_KEY_ID: &str = "original_aws_access_key_id";
pub const ORIGINAL_AWS_SECRET_ACCESS_KEY: &str = "original_aws_secret_access_key";
pub const REGION: &str = "region";
pub const OUTPUT: &str = "output";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// Default AWS region for STS operations when the profile has none
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// GetSessionToken limits for IAM users, in seconds
pub const MIN_SESSION_DURATION_SECONDS: i32 = 900;
pub const MAX_SESSION_DURATION_SECONDS: i32 = 129_600;
pub const DEFAULT_SESSION_DURATION_SECONDS: i32 = 900;

/// Number of digits in a virtual MFA code
pub const MFA_CODE_LENGTH: usize = 6;

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_env<T>(key: &str, value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let original = env::var(key).ok();

        unsafe {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
        let result = f();

        unsafe {
            match original {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
        result
    }

    #[test]
    #[serial]
    fn test_get_aws_config_path_with_env() {
        let path = with_env("AWS_CONFIG_FILE", Some("/custom/aws/config"), get_aws_config_path);
        assert_eq!(path, Some(PathBuf::from("/custom/aws/config")));
    }

    #[test]
    #[serial]
    fn test_get_aws_config_path_default() {
        let path = with_env("AWS_CONFIG_FILE", None, get_aws_config_path);

        if let Some(p) = path {
            assert!(p.ends_with(PathBuf::from(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME)));
        }
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_with_env() {
        let path = with_env(
            "AWS_SHARED_CREDENTIALS_FILE",
            Some("/custom/path/credentials"),
            get_aws_credentials_path,
        );
        assert_eq!(path, Some(PathBuf::from("/custom/path/credentials")));
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_default() {
        let path = with_env("AWS_SHARED_CREDENTIALS_FILE", None, get_aws_credentials_path);

        if let Some(p) = path {
            assert!(p.ends_with(
                PathBuf::from(AWS_CONFIG_DIR_NAME).join(AWS_CREDENTIALS_FILE_NAME)
            ));
        }
    }
}
