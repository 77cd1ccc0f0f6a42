//! Request body limits.
//!
//! JSON routes share the global limit from `security.max_body_size`; the
//! upload route raises it above the upload ceiling so oversized images reach
//! the handler and get a JSON 413.

use axum::extract::DefaultBodyLimit;

use crate::config::{SecurityConfig, UploadConfig};

/// Slack for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn json_body_limit(config: &SecurityConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.max_body_size)
}

pub fn upload_body_limit(config: &UploadConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(upload_ceiling(config))
}

pub fn upload_ceiling(config: &UploadConfig) -> usize {
    config.max_bytes.saturating_mul(2).saturating_add(MULTIPART_OVERHEAD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_ceiling_exceeds_file_limit() {
        let config = UploadConfig::default();
        assert!(upload_ceiling(&config) > config.max_bytes);

        let huge = UploadConfig {
            max_bytes: usize::MAX,
            ..UploadConfig::default()
        };
        assert_eq!(upload_ceiling(&huge), usize::MAX);
    }
}
