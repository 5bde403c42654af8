#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use depotguard_engine::config::{self, AuditBackendKind};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
sessions:
  ttl_sec: 600 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_INPUT");
}

#[test]
fn ok_minimal_config_uses_defaults() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.sessions.ttl_secs, 3600);
    assert_eq!(cfg.lockout.threshold, 3);
    assert_eq!(cfg.lockout.duration_secs, 1800);
    assert_eq!(cfg.rate_limit.default_limit, 2);
    assert_eq!(cfg.rate_limit.actions.get("LOGIN"), Some(&5));
    assert_eq!(cfg.mfa.code_ttl_secs, 300);
    assert_eq!(
        cfg.audit.backends,
        vec![AuditBackendKind::Memory, AuditBackendKind::Tracing]
    );
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
sessions:
  ttl_secs: 900
lockout:
  threshold: 5
  duration_secs: 600
rate_limit:
  default_limit: 30
  actions:
    LOGIN: 3
    REGISTER: 5
audit:
  backends: [memory, tracing]
  memory_capacity: 500
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.sessions.ttl_secs, 900);
    assert_eq!(cfg.lockout.threshold, 5);
    assert_eq!(cfg.rate_limit.actions.get("REGISTER"), Some(&5));
    assert_eq!(
        cfg.audit.backends,
        vec![AuditBackendKind::Memory, AuditBackendKind::Tracing]
    );
}

#[test]
fn rejects_wrong_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_INPUT");
}

#[test]
fn rejects_out_of_range_values() {
    for bad in [
        "version: 1\nsessions: { ttl_secs: 0 }\n",
        "version: 1\nlockout: { threshold: 0 }\n",
        "version: 1\nlockout: { duration_secs: 0 }\n",
        "version: 1\nrate_limit: { default_limit: 0 }\n",
        "version: 1\nrate_limit: { actions: { LOGIN: 0 } }\n",
        "version: 1\nmfa: { code_ttl_secs: 5 }\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "accepted: {bad}");
    }
}

#[test]
fn file_backend_requires_path() {
    let err = config::load_from_str("version: 1\naudit: { backends: [file] }\n")
        .expect_err("must fail");
    assert!(err.to_string().contains("file_path"));
}

#[test]
fn env_overrides_session_ttl() {
    let mut cfg = config::load_from_str("version: 1\n").unwrap();
    cfg.apply_env(|k| (k == config::SESSION_TTL_ENV).then(|| "120".to_string()))
        .unwrap();
    assert_eq!(cfg.sessions.ttl_secs, 120);

    let err = cfg
        .apply_env(|_| Some("soon".to_string()))
        .expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_INPUT");

    cfg.apply_env(|_| None).unwrap();
    assert_eq!(cfg.sessions.ttl_secs, 120);
}
