use std::path::PathBuf;

use super::*;

#[test]
fn error_display_config() {
    let err = RuleCheckError::Config("no check functions".to_string());
    assert_eq!(err.to_string(), "Configuration error: no check functions");
}

#[test]
fn error_display_duplicate_ruids_names_every_id() {
    let err = RuleCheckError::DuplicateRuids {
        scope: "module".to_string(),
        ruids: vec!["suid12".to_string(), "suid22".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "Duplicate RUIDs found in module: suid12, suid22"
    );
}

#[test]
fn error_display_missing_parameter() {
    let err = RuleCheckError::MissingParameter {
        function: "check_path".to_string(),
        parameter: "root".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("check_path"));
    assert!(msg.contains("'root'"));
}

#[test]
fn error_display_file_read() {
    let err = RuleCheckError::FileRead {
        path: PathBuf::from("rules.toml"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
    };
    assert!(err.to_string().contains("rules.toml"));
}

#[test]
fn error_type_returns_category() {
    assert_eq!(RuleCheckError::Config("x".into()).error_type(), "Config");
    assert_eq!(RuleCheckError::RuidIssues("x".into()).error_type(), "Ruid");
    assert_eq!(
        RuleCheckError::UnknownStrategy("x".into()).error_type(),
        "Lookup"
    );
    assert_eq!(
        RuleCheckError::Io(std::io::Error::other("x")).error_type(),
        "IO"
    );
    assert_eq!(
        RuleCheckError::RuleControlSource {
            path: PathBuf::from("rc.ini"),
            reason: "missing section".into(),
        }
        .error_type(),
        "RuleControl"
    );
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: RuleCheckError = io_err.into();
    assert!(matches!(err, RuleCheckError::Io(_)));
}
