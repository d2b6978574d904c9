use confrec_core::errors::{ConfigError, ExError, ExErrorKind};

#[test]
fn test_malformed_input_verifiable_by_kind() {
    let err = ConfigError::MalformedInput {
        reason: "property 'x' declares more than one body".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::MalformedDocument);
    assert_eq!(ex_err.code(), "ERR_MALFORMED_DOCUMENT");
    assert!(ex_err.message().contains("more than one body"));
}

#[test]
fn test_malformed_placeholder_keeps_template() {
    let err = ConfigError::MalformedPlaceholder {
        template: "${a".to_string(),
        reason: "unterminated placeholder".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::MalformedPlaceholder);
    assert!(ex_err.message().contains("${a"));
    assert_ne!(ex_err.kind(), ExErrorKind::MalformedDocument);
}

#[test]
fn test_setter_failure_structured_fields() {
    let err = ConfigError::SetterFailed {
        handler: "site".to_string(),
        setter: "title".to_string(),
        target: "home".to_string(),
        reason: "read-only".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::SetterFailed);
    assert_eq!(ex_err.handler(), Some("site"));
    assert_eq!(ex_err.target(), Some("home"));
    assert_eq!(ex_err.op(), Some("invoke_setter"));
}

#[test]
fn test_unsupported_type_names_handler() {
    let err = ConfigError::UnsupportedObjectType {
        handler: "pages".to_string(),
        object_type: "page".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.code(), "ERR_UNSUPPORTED_OBJECT_TYPE");
    assert_eq!(ex_err.handler(), Some("pages"));
    assert!(ex_err.message().contains("page"));
}

#[test]
fn test_storage_error_is_persistence() {
    let ex_err: ExError = ConfigError::storage("insert_status", "disk full").into();

    assert_eq!(ex_err.kind(), ExErrorKind::Persistence);
    assert_eq!(ex_err.op(), Some("insert_status"));
    assert_eq!(ex_err.message(), "disk full");
    assert!(!ex_err.kind().is_pre_apply());
}

#[test]
fn test_error_kind_code_mapping() {
    // Each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::UnresolvedPlaceholder, "ERR_UNRESOLVED_PLACEHOLDER"),
        (ExErrorKind::ValidationConflict, "ERR_VALIDATION_CONFLICT"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}
