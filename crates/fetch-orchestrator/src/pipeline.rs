//! Inline pipeline support
//!
//! Deployments may hand the pipeline definition over as a base64 string
//! (`INLINE_PIPELINE`) instead of a file. It is materialized at the config
//! file path before the metadata stage reads it.

use crate::error::ConfigError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

/// Environment variable carrying a base64 encoded pipeline
pub const INLINE_PIPELINE_ENV: &str = "INLINE_PIPELINE";

/// Pick the inline pipeline to apply
///
/// A non-blank `flag` value wins over `env`; blank values count as unset.
#[must_use]
pub fn resolve_inline_pipeline(flag: Option<&str>, env: Option<String>) -> Option<String> {
    let present = |value: &str| !value.trim().is_empty();
    flag.filter(|value| present(value))
        .map(str::to_owned)
        .or_else(|| env.filter(|value| present(value)))
}

/// Decode a base64 pipeline definition
///
/// Surrounding whitespace is ignored.
///
/// # Errors
/// - `ConfigError::InvalidInlinePipeline` for bad base64
/// - `ConfigError::InlinePipelineEncoding` for non UTF-8 content
pub fn decode_inline_pipeline(encoded: &str) -> Result<String, ConfigError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode `encoded` and write it to `config_file`
///
/// Parent directories are created as needed; an existing file is replaced.
///
/// # Errors
/// Decode errors as in [`decode_inline_pipeline`], or `ConfigError::Io`.
pub fn write_inline_pipeline(encoded: &str, config_file: &Path) -> Result<(), ConfigError> {
    let pipeline = decode_inline_pipeline(encoded)?;
    let io_err = |source| ConfigError::Io {
        path: config_file.to_path_buf(),
        source,
    };

    if let Some(parent) = config_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(config_file, pipeline).map_err(io_err)?;

    tracing::info!(path = %config_file.display(), "Wrote inline pipeline");
    Ok(())
}
