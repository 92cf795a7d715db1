//! AWS session setup and caller identity lookup.
//!
//! Credentials follow the standard AWS provider chain (environment, shared
//! config/credentials files, SSO, instance metadata), optionally pinned to a
//! named profile.

use crate::audit::identity::PrincipalArn;
use anyhow::{anyhow, Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::error::DisplayErrorContext;

/// Loaded AWS configuration shared by the S3 and STS clients
#[derive(Debug, Clone)]
pub struct AwsSession {
    config: SdkConfig,
    endpoint_url: Option<String>,
}

impl AwsSession {
    /// Load configuration with optional profile, region, and S3 endpoint
    /// override (for LocalStack or other S3-compatible services).
    pub async fn from_options(
        profile: Option<&str>,
        region: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }

        Self {
            config: loader.load().await,
            endpoint_url: endpoint_url.map(normalize_endpoint),
        }
    }

    /// Region resolved by the provider chain, if any
    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }

    /// Get the S3 endpoint override
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Build an S3 client. Custom endpoints use path-style addressing,
    /// which is what S3-compatible services generally expect.
    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        let mut builder = aws_sdk_s3::config::Builder::from(&self.config);
        if let Some(endpoint) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        aws_sdk_s3::Client::from_conf(builder.build())
    }

    /// Resolve the canonical identity of the loaded credentials via STS
    /// `GetCallerIdentity`.
    pub async fn caller_identity(&self) -> Result<PrincipalArn> {
        let client = aws_sdk_sts::Client::new(&self.config);
        let output = client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(e)))
            .context("Failed to retrieve caller identity")?;

        let arn = output
            .arn()
            .ok_or_else(|| anyhow!("GetCallerIdentity returned no ARN"))?;
        Ok(PrincipalArn::new(arn))
    }
}

fn normalize_endpoint(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
