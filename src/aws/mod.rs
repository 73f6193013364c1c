use aws_smithy_types::DateTime;

pub mod sts;

/// Temporary credentials returned by STS GetSessionToken
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

/// Result of STS GetCallerIdentity for an IAM user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
    pub user_name: String,
}

impl CallerIdentity {
    /// Build from the raw response fields; the user name is the last path
    /// segment of the ARN (`arn:aws:iam::123456789012:user/ops/alice` → `alice`).
    pub fn new(account: &str, arn: &str, user_id: &str) -> Self {
        let user_name = arn
            .split_once('/')
            .and_then(|(_, path)| path.rsplit('/').next())
            .unwrap_or_default();

        Self {
            account: account.to_string(),
            arn: arn.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        }
    }

    /// Serial number of the user's virtual MFA device
    pub fn mfa_serial_number(&self) -> String {
        mfa_serial_number(&self.account, &self.user_name)
    }
}

pub fn mfa_serial_number(account: &str, user_name: &str) -> String {
    format!("arn:aws:iam::{account}:mfa/{user_name}")
}

pub use sts::{SessionExchange, StsSessionExchange};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_identity_user_name() {
        let identity = CallerIdentity::new(
            "123456789012",
            "arn:aws:iam::123456789012:user/alice",
            "AIDAEXAMPLE",
        );
        assert_eq!(identity.user_name, "alice");
        assert_eq!(
            identity.mfa_serial_number(),
            "arn:aws:iam::123456789012:mfa/alice"
        );
    }

    #[test]
    fn test_caller_identity_user_with_path() {
        let identity = CallerIdentity::new(
            "123456789012",
            "arn:aws:iam::123456789012:user/division/ops/bob",
            "AIDAEXAMPLE",
        );
        assert_eq!(identity.user_name, "bob");
    }

    #[test]
    fn test_caller_identity_root_has_no_user_name() {
        let identity = CallerIdentity::new("123456789012", "arn:aws:iam::123456789012:root", "123");
        assert_eq!(identity.user_name, "");
    }
}
