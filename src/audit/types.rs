//! Data structures representing AWS CloudTrail log files and records.
//!
//! These types mirror the subset of the CloudTrail record schema needed to
//! attribute actions to principals. Unknown fields are ignored so that schema
//! additions never cause a record to be skipped.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Top-level CloudTrail log file.
///
/// Records are kept as raw JSON values so each one can be decoded on its
/// own. A single malformed record then costs only itself, not the file.
/// Digest files carry no `Records` field and decode as an empty file, as
/// does an explicit `"Records": null`.
#[derive(Debug, Default, Deserialize)]
pub struct TrailFile {
    #[serde(rename = "Records", default, deserialize_with = "null_as_empty")]
    pub records: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single CloudTrail event.
///
/// # Fields
///
/// - `event_time`: ISO 8601 timestamp, lexically ordered
/// - `event_source`: service endpoint, e.g. `ec2.amazonaws.com`
/// - `event_name`: API operation, e.g. `DescribeInstances`
/// - `error_code`: set when the call failed
/// - `user_identity`: the acting principal
/// - `request_parameters`: free-form request arguments
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailRecord {
    #[serde(default)]
    pub event_time: String,
    #[serde(default)]
    pub event_source: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub user_identity: Option<UserIdentity>,
    #[serde(default)]
    pub request_parameters: Option<RequestParameters>,
}

/// Identity block of a CloudTrail record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(rename = "type", default)]
    pub identity_type: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
}

/// Schema-less request arguments with typed, non-failing accessors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RequestParameters(Map<String, Value>);

impl RequestParameters {
    /// String value stored under `key`; `None` when missing or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// String entries of the array stored under `key`.
    ///
    /// Non-string entries are skipped; a missing key or non-array value
    /// yields an empty list.
    pub fn get_str_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl TrailRecord {
    /// Raw ARN of the acting principal (empty when absent)
    pub fn principal_arn(&self) -> &str {
        self.user_identity
            .as_ref()
            .and_then(|u| u.arn.as_deref())
            .unwrap_or("")
    }

    /// Whether the call failed
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }

    /// Short service name: the first dot-delimited segment of the event source
    pub fn service(&self) -> &str {
        self.event_source
            .split('.')
            .next()
            .unwrap_or(&self.event_source)
    }

    /// Aggregation key, `<service>:<eventName>`
    pub fn operation_key(&self) -> String {
        format!("{}:{}", self.service(), self.event_name)
    }

    /// Secret identifiers retrieved by this call, if it is a Secrets Manager
    /// read (`GetSecretValue` or `BatchGetSecretValue`).
    pub fn retrieved_secret_ids(&self) -> Vec<&str> {
        if self.service() != "secretsmanager" {
            return Vec::new();
        }
        let Some(params) = &self.request_parameters else {
            return Vec::new();
        };

        match self.event_name.as_str() {
            "GetSecretValue" => params.get_str("secretId").into_iter().collect(),
            "BatchGetSecretValue" => params.get_str_list("secretIdList"),
            _ => Vec::new(),
        }
    }
}
