//! Test utilities for Phototag
//!
//! Builders for backend responses and small assertion helpers shared by
//! the unit tests.

use base64::Engine as _;

use crate::backend::ImageResponse;
use crate::config::LabelingConfig;
use crate::stats::StatsEntry;

/// Base64-encode bytes the way the backend does
pub fn encoded(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Build a stats payload from `(category, amount)` pairs
pub fn stats(pairs: &[(&str, u64)]) -> Vec<StatsEntry> {
    pairs.iter().map(|(c, a)| StatsEntry::new(*c, *a)).collect()
}

/// Successful image response carrying `filename` with bytes derived from it
pub fn image_response(filename: &str) -> ImageResponse {
    ImageResponse {
        success: Some(true),
        filename: Some(filename.to_string()),
        image: Some(encoded(filename.as_bytes())),
        ..ImageResponse::default()
    }
}

/// `success: false` response with the given message and stats
pub fn rejection(info: &str, pairs: Option<&[(&str, u64)]>) -> ImageResponse {
    ImageResponse {
        success: Some(false),
        info: Some(info.to_string()),
        stats: pairs.map(stats),
        ..ImageResponse::default()
    }
}

/// Labeling config with the four classic categories
pub fn labeling() -> LabelingConfig {
    LabelingConfig {
        categories: vec![
            "keep".to_string(),
            "work".to_string(),
            "screenshot".to_string(),
            "meme".to_string(),
        ],
        ..LabelingConfig::default()
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected),
                "Error message '{}' does not contain '{}'",
                message,
                expected
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_response_is_success() {
        let response = image_response("a.png");
        assert!(response.is_success());
        assert_eq!(response.filename.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_rejection_is_not_success() {
        let response = rejection("No more images", Some(&[("", 0)][..]));
        assert!(!response.is_success());
        assert_eq!(response.stats.unwrap().len(), 1);
    }

    #[test]
    fn test_assert_error_contains_passes() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("invalid thing"));
        assert_error_contains(result, "invalid");
    }
}
