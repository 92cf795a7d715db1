//! Principal identity canonicalization.
//!
//! CloudTrail records the acting principal as it appeared on the wire, which
//! for role sessions is an STS `assumed-role` ARN carrying the session name.
//! Matching a principal across many sessions requires collapsing those
//! variants to the long-lived IAM identity:
//!
//! ```
//! use cloudtrail_audit_tools::audit::identity::normalize_arn;
//!
//! assert_eq!(
//!     normalize_arn("arn:aws:sts::123456789012:assumed-role/Deployer/ci-run-42"),
//!     "arn:aws:iam::123456789012:role/Deployer"
//! );
//! ```

use std::fmt;

/// Canonical principal identifier.
///
/// Always holds the output of [`normalize_arn`], so two values compare equal
/// exactly when they refer to the same principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalArn(String);

impl PrincipalArn {
    /// Canonicalize `raw` into a principal identifier.
    pub fn new(raw: &str) -> Self {
        Self(normalize_arn(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `raw` canonicalizes to this principal.
    ///
    /// A record without an ARN never matches, whatever the target.
    pub fn matches(&self, raw: &str) -> bool {
        !raw.trim().is_empty() && normalize_arn(raw) == self.0
    }
}

impl fmt::Display for PrincipalArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize a principal ARN.
///
/// Rules, applied in order:
///
/// 1. The `sts` service segment becomes `iam`.
/// 2. An `assumed-role` resource becomes `role`.
/// 3. The resource is cut down to `type/name`, dropping session names
///    (`assumed-role/Name/session`) and IAM paths (`role/path/Name`).
///
/// Input that is not a well-formed ARN is rewritten textually and truncated
/// at the first `/`. The function never fails and is idempotent.
pub fn normalize_arn(raw: &str) -> String {
    let parts: Vec<&str> = raw.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" {
        return normalize_loose(raw);
    }

    let service = if parts[2] == "sts" { "iam" } else { parts[2] };
    let resource = canonical_resource(parts[5]);

    format!(
        "arn:{}:{}:{}:{}:{}",
        parts[1], service, parts[3], parts[4], resource
    )
}

fn canonical_resource(resource: &str) -> String {
    let mut segments = resource.split('/').filter(|s| !s.is_empty());
    let Some(kind) = segments.next() else {
        return String::new();
    };
    let rest: Vec<&str> = segments.collect();

    match (kind, rest.as_slice()) {
        ("assumed-role", []) => "role".to_string(),
        ("assumed-role", [role, ..]) => format!("role/{role}"),
        (kind, []) => kind.to_string(),
        (kind, [.., name]) => format!("{kind}/{name}"),
    }
}

fn normalize_loose(raw: &str) -> String {
    let rewritten = raw
        .replacen(":sts::", ":iam::", 1)
        .replacen(":assumed-role/", ":role/", 1);
    match rewritten.find('/') {
        Some(idx) => rewritten[..idx].to_string(),
        None => rewritten,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assumed_role_collapses_to_role() {
        assert_eq!(
            normalize_arn("arn:aws:sts::111122223333:assumed-role/Admin/alice@example.com"),
            "arn:aws:iam::111122223333:role/Admin"
        );
    }

    #[test]
    fn test_sessions_of_same_role_are_equal() {
        let a = PrincipalArn::new("arn:aws:sts::111122223333:assumed-role/Admin/session-one");
        let b = PrincipalArn::new("arn:aws:sts::111122223333:assumed-role/Admin/session-two");
        assert_eq!(a, b);
        assert!(a.matches("arn:aws:sts::111122223333:assumed-role/Admin/i-0abc123"));
    }

    #[test]
    fn test_different_roles_stay_distinct() {
        let a = PrincipalArn::new("arn:aws:sts::111122223333:assumed-role/Admin/s");
        let b = PrincipalArn::new("arn:aws:sts::111122223333:assumed-role/ReadOnly/s");
        assert_ne!(a, b);
    }

    #[test]
    fn test_iam_user_unchanged() {
        let arn = "arn:aws:iam::111122223333:user/bob";
        assert_eq!(normalize_arn(arn), arn);
    }

    #[test]
    fn test_iam_path_is_dropped() {
        assert_eq!(
            normalize_arn("arn:aws:iam::111122223333:role/service-role/LambdaExec"),
            "arn:aws:iam::111122223333:role/LambdaExec"
        );
        assert_eq!(
            normalize_arn("arn:aws:iam::111122223333:user/engineering/bob"),
            "arn:aws:iam::111122223333:user/bob"
        );
    }

    #[test]
    fn test_partition_preserved() {
        assert_eq!(
            normalize_arn("arn:aws-us-gov:sts::111122223333:assumed-role/Ops/x"),
            "arn:aws-us-gov:iam::111122223333:role/Ops"
        );
    }

    #[test]
    fn test_root_identity() {
        let arn = "arn:aws:iam::111122223333:root";
        assert_eq!(normalize_arn(arn), arn);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "arn:aws:sts::111122223333:assumed-role/Admin/session",
            "arn:aws:iam::111122223333:role/service-role/LambdaExec",
            "arn:aws:iam::111122223333:user/bob",
            "arn:aws:sts::111122223333:federated-user/carol",
            "arn:aws:iam::111122223333:root",
            "not-an-arn/with/slashes",
            "",
        ];
        for input in inputs {
            let once = normalize_arn(input);
            assert_eq!(normalize_arn(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_malformed_input_best_effort() {
        assert_eq!(normalize_arn(""), "");
        assert_eq!(normalize_arn("something/else"), "something");
        assert_eq!(
            normalize_arn("prefix:sts::123:assumed-role/X/y"),
            "prefix:iam::123:role"
        );
    }

    #[test]
    fn test_display() {
        let arn = PrincipalArn::new("arn:aws:sts::1:assumed-role/R/s");
        assert_eq!(arn.to_string(), "arn:aws:iam::1:role/R");
        assert_eq!(arn.as_str(), "arn:aws:iam::1:role/R");
    }

    #[test]
    fn test_missing_arn_never_matches() {
        assert!(!PrincipalArn::new("").matches(""));
        assert!(!PrincipalArn::new("  ").matches("  "));
        assert!(!PrincipalArn::new("arn:aws:iam::1:role/R").matches(""));
    }
}
