use aws_sdk_sts::{
    Client as StsClient,
    config::{BehaviorVersion, Config as StsConfig, Credentials, Region},
};
use tracing::{debug, info};

use super::{CallerIdentity, SessionCredentials, mfa_serial_number};
use crate::{
    constants::DEFAULT_AWS_REGION,
    error::{Error, Result},
};

/// Exchange of long-lived IAM user keys for a temporary session.
#[allow(async_fn_in_trait)]
pub trait SessionExchange {
    /// Call GetSessionToken with the MFA device of `user_name` in `account`.
    async fn session_token(
        &self,
        duration_seconds: i32,
        account: &str,
        user_name: &str,
        mfa_code: &str,
    ) -> Result<SessionCredentials>;

    /// Identify the IAM user owning the long-lived keys.
    async fn account(&self) -> Result<CallerIdentity>;
}

/// STS client signed with static long-lived keys
#[derive(Debug, Clone)]
pub struct StsSessionExchange {
    client: StsClient,
}

impl StsSessionExchange {
    /// An empty `region` falls back to DEFAULT_AWS_REGION.
    pub fn new(access_key: &str, secret_key: &str, region: &str) -> Self {
        let region = match region.is_empty() {
            true => DEFAULT_AWS_REGION,
            false => region,
        };
        info!("Using region {} for STS", region);

        let credentials = Credentials::new(access_key, secret_key, None, None, "actool");
        let config = StsConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: StsClient::from_conf(config),
        }
    }

    #[cfg(test)]
    fn region(&self) -> Option<&str> {
        self.client.config().region().map(|r| r.as_ref())
    }
}

impl SessionExchange for StsSessionExchange {
    async fn session_token(
        &self,
        duration_seconds: i32,
        account: &str,
        user_name: &str,
        mfa_code: &str,
    ) -> Result<SessionCredentials> {
        let serial_number = mfa_serial_number(account, user_name);
        info!("Calling AWS STS GetSessionToken");
        debug!("Serial number: {}", serial_number);
        debug!("Duration: {} seconds", duration_seconds);

        let response = self
            .client
            .get_session_token()
            .duration_seconds(duration_seconds)
            .serial_number(serial_number)
            .token_code(mfa_code)
            .send()
            .await
            .map_err(|e| Error::external("GetSessionToken", e))?;

        let sts_creds = response
            .credentials()
            .ok_or_else(|| Error::external("GetSessionToken", "AWS STS returned no credentials"))?;

        info!("Successfully obtained session credentials");
        Ok(SessionCredentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: *sts_creds.expiration(),
        })
    }

    async fn account(&self) -> Result<CallerIdentity> {
        info!("Calling AWS STS GetCallerIdentity");

        let response = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| Error::external("GetCallerIdentity", e))?;

        let identity = CallerIdentity::new(
            response.account().unwrap_or_default(),
            response.arn().unwrap_or_default(),
            response.user_id().unwrap_or_default(),
        );
        debug!("Caller ARN: {}", identity.arn);
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_region_falls_back_to_default() {
        let exchange = StsSessionExchange::new("AKIAEXAMPLE", "secret", "");
        assert_eq!(exchange.region(), Some(DEFAULT_AWS_REGION));
    }

    #[tokio::test]
    async fn test_region_from_profile() {
        let exchange = StsSessionExchange::new("AKIAEXAMPLE", "secret", "eu-west-1");
        assert_eq!(exchange.region(), Some("eu-west-1"));
    }

    #[test]
    fn test_external_error_names_operation() {
        let err = Error::external("GetSessionToken", "AWS STS returned no credentials");
        assert_eq!(
            err.to_string(),
            "sts GetSessionToken failed: AWS STS returned no credentials"
        );
    }
}
