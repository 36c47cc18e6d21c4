//! Tests for registration and access rules

use super::*;

fn user(email: &str) -> UserIdentity {
    UserIdentity {
        uid: "uid-1".to_string(),
        email: email.to_string(),
    }
}

#[test]
fn test_default_policy_accepts_any_domain() {
    let policy = RegistrationPolicy::default();
    assert!(policy.validate("a@anywhere.io", "secret1", "secret1").is_ok());
}

#[test]
fn test_password_mismatch_rejected() {
    let policy = RegistrationPolicy::default();
    let err = policy
        .validate("a@example.com", "secret1", "secret2")
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation failed: Passwords do not match");
}

#[test]
fn test_short_password_rejected() {
    let policy = RegistrationPolicy::default();
    let err = policy.validate("a@example.com", "abc", "abc").unwrap_err();
    assert!(err.to_string().contains("at least 6 characters"));
}

#[test]
fn test_domain_allow_list() {
    let policy = RegistrationPolicy::default().with_allowed_domains(["example.com"]);
    assert!(policy.validate("a@Example.COM", "secret1", "secret1").is_ok());

    let err = policy
        .validate("a@other.com", "secret1", "secret1")
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("example.com"));
}

#[test]
fn test_malformed_email_rejected() {
    let policy = RegistrationPolicy::default();
    assert!(policy.validate("no-at-sign", "secret1", "secret1").is_err());
    assert!(policy.validate("@example.com", "secret1", "secret1").is_err());
    assert!(policy.validate("a@localhost", "secret1", "secret1").is_err());
}

#[test]
fn test_admin_check_is_case_insensitive() {
    let policy = AccessPolicy::new(["boss@example.com"]);
    assert!(policy.is_admin(&user("Boss@Example.com")));
    assert!(!policy.is_admin(&user("jane@example.com")));
    assert!(!AccessPolicy::default().is_admin(&user("boss@example.com")));
}

#[test]
fn test_normalize_email() {
    assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
}

#[test]
fn test_policy_deserializes_with_defaults() {
    let policy: RegistrationPolicy = serde_json::from_str("{}").unwrap();
    assert_eq!(policy, RegistrationPolicy::default());
}
