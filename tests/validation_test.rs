//! Unit tests for validation.rs module

use plateforme_ia::error::PlatformError;
use plateforme_ia::models::FileHandle;
use plateforme_ia::validation::{InputValidator, ACCEPTED_MIME_TYPES};
use proptest::prelude::*;

const LIMIT: u64 = 10 * 1024 * 1024;

#[test]
fn test_required_field() {
    assert!(InputValidator::validate_required("author", "Awa").is_ok());
    assert!(InputValidator::validate_required("author", "").is_err());
    assert!(InputValidator::validate_required("author", " \n\t ").is_err());
}

#[test]
fn test_every_accepted_type_passes() {
    for mime in ACCEPTED_MIME_TYPES {
        let file = FileHandle::new("doc", mime, vec![1, 2, 3]);
        assert!(InputValidator::validate_file(&file, LIMIT).is_ok(), "{mime}");
    }
}

#[test]
fn test_unsupported_type() {
    let file = FileHandle::new("photo.png", "image/png", vec![0]);
    match InputValidator::validate_file(&file, LIMIT) {
        Err(PlatformError::UnsupportedFileType { name, mime_type }) => {
            assert_eq!(name, "photo.png");
            assert_eq!(mime_type, "image/png");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_size_ceiling_is_inclusive() {
    let at_limit = FileHandle::declared("big.pdf", "application/pdf", LIMIT);
    assert!(InputValidator::validate_file(&at_limit, LIMIT).is_ok());

    let over = FileHandle::declared("big.pdf", "application/pdf", LIMIT + 1);
    assert!(matches!(
        InputValidator::validate_file(&over, LIMIT),
        Err(PlatformError::FileTooLarge { size, limit, .. }) if size == LIMIT + 1 && limit == LIMIT
    ));
}

#[test]
fn test_type_checked_before_size() {
    let file = FileHandle::declared("movie.mp4", "video/mp4", LIMIT * 2);
    assert!(matches!(
        InputValidator::validate_file(&file, LIMIT),
        Err(PlatformError::UnsupportedFileType { .. })
    ));
}

#[test]
fn test_query() {
    assert!(InputValidator::validate_query("SELECT 1").is_ok());
    assert!(InputValidator::validate_query("   ").is_err());
}

#[test]
fn test_rating_bounds() {
    assert!(InputValidator::validate_rating(0).is_err());
    for rating in 1..=5 {
        assert!(InputValidator::validate_rating(rating).is_ok());
    }
    assert!(InputValidator::validate_rating(6).is_err());
}

#[test]
fn test_port() {
    assert!(InputValidator::validate_port("").is_ok());
    assert!(InputValidator::validate_port("5432").is_ok());
    assert!(InputValidator::validate_port("0").is_err());
    assert!(InputValidator::validate_port("70000").is_err());
    assert!(InputValidator::validate_port("abc").is_err());
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  bonjour\u{0} "), "bonjour");
    assert_eq!(InputValidator::sanitize_text("a\nb\tc"), "a\nb\tc");
    // decomposed é becomes the composed form
    assert_eq!(InputValidator::sanitize_text("e\u{301}"), "\u{e9}");
}

proptest! {
    #[test]
    fn sanitize_has_no_outer_whitespace(text in "\\PC*") {
        let clean = InputValidator::sanitize_text(&text);
        prop_assert_eq!(clean.trim(), clean.as_str());
        prop_assert!(!clean.chars().any(|c| c.is_control() && c != '\n' && c != '\t'));
    }

    #[test]
    fn validation_errors_are_flagged(field in "[a-z]{1,8}") {
        let err = InputValidator::validate_required(&field, "").unwrap_err();
        prop_assert!(err.is_validation());
    }
}
