use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StitchError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(StitchError::image("x").to_string().contains("image error:"));
    assert!(
        StitchError::internal("x")
            .to_string()
            .contains("internal error:")
    );
}

#[test]
fn internal_preserves_the_cause_chain() {
    let io = std::io::Error::other("disk on fire");
    let err = StitchError::internal_with("encode failed", io);
    let cause = std::error::Error::source(&err).expect("cause is kept");
    assert!(cause.to_string().contains("disk on fire"));
}

#[test]
fn internal_without_cause_has_no_source() {
    let err = StitchError::internal("state missing");
    assert!(std::error::Error::source(&err).is_none());
}

#[test]
fn anyhow_errors_become_internal() {
    let err: StitchError = anyhow::anyhow!("decoder blew up").into();
    match &err {
        StitchError::Internal { message, cause } => {
            assert_eq!(message, "an internal error has occurred");
            assert!(
                cause
                    .as_ref()
                    .unwrap()
                    .to_string()
                    .contains("decoder blew up")
            );
        }
        other => panic!("expected internal error, got {other:?}"),
    }
}

#[test]
fn validation_keeps_the_caller_facing_message() {
    let err = StitchError::validation("columns must be greater than 0");
    assert_eq!(
        err.to_string(),
        "validation error: columns must be greater than 0"
    );
}
