//! CLI output formatting.
//!
//! One line per verified path, in input order:
//!
//! ```text
//! File not found: public/company_logo.png
//! Image public/logo.png is valid. Format: PNG, Size: (100, 50), Mode: RGB
//! Image public/broken.png is invalid. Error: <decoder message>
//! ```
//!
//! [`format_result`] is pure (no I/O) for testability; [`print_results`]
//! writes to stdout.

use crate::verify::VerificationResult;

/// Render one result as its report line.
pub fn format_result(result: &VerificationResult) -> String {
    match result {
        VerificationResult::NotFound { path } => {
            format!("File not found: {}", path.display())
        }
        VerificationResult::Valid {
            path,
            format,
            dimensions,
            color_mode,
        } => format!(
            "Image {} is valid. Format: {}, Size: {}, Mode: {}",
            path.display(),
            format,
            dimensions,
            color_mode
        ),
        VerificationResult::Invalid { path, error } => {
            format!("Image {} is invalid. Error: {}", path.display(), error)
        }
    }
}

/// Report lines for a batch, in the order given.
pub fn format_results(results: &[VerificationResult]) -> Vec<String> {
    results.iter().map(format_result).collect()
}

pub fn print_results(results: &[VerificationResult]) {
    for line in format_results(results) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{ColorMode, Dimensions};

    #[test]
    fn not_found_line() {
        let result = VerificationResult::NotFound {
            path: "missing.png".into(),
        };
        assert_eq!(format_result(&result), "File not found: missing.png");
    }

    #[test]
    fn valid_line() {
        let result = VerificationResult::Valid {
            path: "logo.png".into(),
            format: "PNG".into(),
            dimensions: Dimensions {
                width: 100,
                height: 50,
            },
            color_mode: ColorMode::Rgb,
        };
        assert_eq!(
            format_result(&result),
            "Image logo.png is valid. Format: PNG, Size: (100, 50), Mode: RGB"
        );
    }

    #[test]
    fn invalid_line() {
        let result = VerificationResult::Invalid {
            path: "broken.png".into(),
            error: "unexpected end of file".into(),
        };
        assert_eq!(
            format_result(&result),
            "Image broken.png is invalid. Error: unexpected end of file"
        );
    }

    #[test]
    fn batch_keeps_order() {
        let results = vec![
            VerificationResult::NotFound { path: "b.png".into() },
            VerificationResult::NotFound { path: "a.png".into() },
        ];
        assert_eq!(
            format_results(&results),
            vec!["File not found: b.png", "File not found: a.png"]
        );
    }
}
