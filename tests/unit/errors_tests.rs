/*!
 * Tests for error types and conversions
 */

use asstosrt::errors::{AppError, ConversionError, DictError, ErrorKind, ErrorPayload, ParseError};
use asstosrt::subtitle_processor::Field;

#[test]
fn test_conversionError_kind_shouldMapEveryVariant() {
    let cases = [
        (ConversionError::SizeLimit { size: 2, limit: 1 }, ErrorKind::SizeLimitError),
        (ConversionError::Config("x".to_string()), ErrorKind::ConfigError),
        (
            ConversionError::Decode {
                charset: "UTF-8".to_string(),
                offset: 0,
            },
            ErrorKind::DecodeError,
        ),
        (ConversionError::Parse(ParseError::NoCues), ErrorKind::ParseError),
        (ConversionError::Archive("x".to_string()), ErrorKind::ArchiveError),
    ];
    for (error, kind) in cases {
        assert_eq!(error.kind(), kind);
    }
}

#[test]
fn test_sizeLimit_display_shouldMentionBothSizes() {
    let error = ConversionError::SizeLimit {
        size: 104_857_601,
        limit: 104_857_600,
    };
    let display = error.to_string();
    assert!(display.contains("104857601"));
    assert!(display.contains("104857600"));
}

#[test]
fn test_parseError_display_shouldNameMissingField() {
    let error = ConversionError::from(ParseError::NoFormatLineField(Field::Start));
    assert!(error.to_string().contains("`start`"));
}

#[test]
fn test_dictError_intoConversionError_shouldBeConfigError() {
    let error: ConversionError = DictError::Malformed { line: 3 }.into();
    assert_eq!(error.kind(), ErrorKind::ConfigError);
    assert!(error.to_string().contains("line 3"));
}

#[test]
fn test_errorPayload_serialize_shouldUseCamelCaseKeys() {
    let payload = ConversionError::Parse(ParseError::NoCues).to_payload();
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["errorKind"], "ParseError");
    assert_eq!(json["message"], "failed to parse subtitle: no cues found");

    let back: ErrorPayload = serde_json::from_value(json).unwrap();
    assert_eq!(back, payload);
}

#[test]
fn test_appError_fromConversionError_shouldWrapCorrectly() {
    let app_error: AppError = ConversionError::Config("bad".to_string()).into();
    assert!(matches!(app_error, AppError::Conversion(_)));
    assert!(app_error.to_string().contains("invalid configuration: bad"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.ass");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(ref msg) if msg.contains("missing.ass")));
}
