//! Per-request sampling parameters.

use crate::error_handler::{Result, validate_range_f32};

/// Sampling configuration sent with every completion request.
///
/// Defaults favour diverse samples (`temperature = 1.0`) with a small
/// minimum-probability cutoff, which is what independent verification votes
/// rely on.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f32,
    /// Minimum-probability nucleus threshold relative to the top token.
    pub min_p: f32,
    /// Optional classic nucleus cutoff.
    pub top_p: Option<f32>,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            min_p: 0.01,
            top_p: None,
            max_tokens: 32_768,
        }
    }
}

impl SamplingConfig {
    /// Checks every knob against the range providers accept.
    ///
    /// # Errors
    /// Returns [`ConfigError::OutOfRange`](crate::error_handler::ConfigError::OutOfRange)
    /// for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_range_f32("temperature", self.temperature, 0.0, 2.0)?;
        validate_range_f32("min_p", self.min_p, 0.0, 1.0)?;
        if let Some(top_p) = self.top_p {
            validate_range_f32("top_p", top_p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::{AiLlmError, ConfigError};

    #[test]
    fn defaults_are_valid() {
        let s = SamplingConfig::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.max_tokens, 32_768);
    }

    #[test]
    fn rejects_out_of_range_min_p() {
        let s = SamplingConfig {
            min_p: 1.5,
            ..Default::default()
        };
        let err = s.validate().unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::OutOfRange { field: "min_p", .. })
        ));
    }

    #[test]
    fn rejects_nan_temperature() {
        let s = SamplingConfig {
            temperature: f32::NAN,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }
}
