use rex_core::errors::{ErrorInfo, RexError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("rung", "3")
        .with_context("replica", "1")
}

#[test]
fn ladder_error_surface() {
    let err = RexError::InvalidLadder(sample_info("L001", "not strictly monotonic"));
    assert_eq!(err.info().code, "L001");
    assert!(err.info().context.contains_key("rung"));
    assert!(!err.is_divergence());
}

#[test]
fn exchange_error_surface() {
    let err = RexError::NonAdjacentExchange(sample_info("X001", "rungs differ by 2"));
    assert_eq!(err.info().code, "X001");
    assert!(err.info().context.contains_key("replica"));
}

#[test]
fn divergence_error_surface() {
    let err = RexError::IntegratorDivergence(sample_info("I001", "non-finite energy"));
    assert_eq!(err.info().code, "I001");
    assert!(err.is_divergence());
}

#[test]
fn config_error_surface() {
    let err = RexError::Config(sample_info("C001", "replica count mismatch"));
    assert_eq!(err.info().code, "C001");
}

#[test]
fn serde_error_surface() {
    let err = RexError::Serde(sample_info("S001", "schema mismatch"));
    assert_eq!(err.info().code, "S001");
}

#[test]
fn error_display_includes_hint() {
    let err = RexError::InvalidLadder(
        ErrorInfo::new("L002", "ladder too short").with_hint("provide at least two rungs"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("L002"));
    assert!(rendered.contains("at least two rungs"));
}
