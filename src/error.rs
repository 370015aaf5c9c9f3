//! Error types for ripps.
//!
//! Per-frame painting never fails: degraded host data is skipped or replaced
//! by defaults. Errors only surface while loading configuration, validating
//! parameters, or building an effect from the registry.

use thiserror::Error;

/// Errors that can occur while configuring or constructing an effect.
#[derive(Error, Debug)]
pub enum RippError {
    /// Failed to read or write a configuration file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration JSON could not be parsed or serialized.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No catalog entry exists for the requested id.
    #[error("unknown effect id `{0}`")]
    UnknownEffect(String),

    /// A palette was built with no colors.
    #[error("palette `{0}` has no colors")]
    EmptyPalette(&'static str),

    /// A parameter is outside the range an effect can work with.
    #[error("invalid config for {effect}: {reason}")]
    InvalidConfig {
        /// Effect kind whose config failed validation.
        effect: &'static str,
        /// Human readable reason.
        reason: String,
    },
}

impl RippError {
    pub(crate) fn invalid(effect: &'static str, reason: impl Into<String>) -> Self {
        RippError::InvalidConfig {
            effect,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RippError>;

/// Validation helper: `value` must be finite and strictly positive.
pub(crate) fn ensure_positive(effect: &'static str, name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RippError::invalid(
            effect,
            format!("`{name}` must be positive, got {value}"),
        ))
    }
}

/// Validation helper: `min <= max`, both finite and non-negative.
pub(crate) fn ensure_range(effect: &'static str, name: &str, min: f32, max: f32) -> Result<()> {
    if min.is_finite() && max.is_finite() && min >= 0.0 && min <= max {
        Ok(())
    } else {
        Err(RippError::invalid(
            effect,
            format!("`{name}` must satisfy 0 <= min <= max, got [{min}, {max}]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = RippError::invalid("orbit_bands", "max_live must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config for orbit_bands: max_live must be at least 1"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("{not json");
        let err: RippError = parse.unwrap_err().into();
        assert!(matches!(err, RippError::Json(_)));
    }

    #[test]
    fn test_ensure_helpers() {
        assert!(ensure_positive("x", "period", 1.0).is_ok());
        assert!(ensure_positive("x", "period", 0.0).is_err());
        assert!(ensure_positive("x", "period", f32::NAN).is_err());
        assert!(ensure_range("x", "spawn", 0.5, 0.5).is_ok());
        assert!(ensure_range("x", "spawn", 1.0, 0.5).is_err());
    }
}
