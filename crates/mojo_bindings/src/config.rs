//! Encoder configuration presets.

use serde::{Deserialize, Serialize};

/// Buffer size used when no hint is given.
pub const INITIAL_BUFFER_SIZE: usize = 1024;

/// Configuration for an encoding pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Initial buffer capacity in bytes. Rounded up to 8; zero means
    /// [`INITIAL_BUFFER_SIZE`].
    pub initial_buffer_size: usize,
    /// Fail on associated interfaces instead of writing nothing.
    pub strict_associated_interfaces: bool,
    /// Upper bound on the finished message size.
    pub max_message_size: Option<usize>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EncoderConfig {
    /// Default configuration with a 1KB initial buffer and no size cap.
    pub fn standard() -> Self {
        Self {
            initial_buffer_size: INITIAL_BUFFER_SIZE,
            strict_associated_interfaces: false,
            max_message_size: None,
        }
    }

    /// Strict configuration: unsupported paths fail loudly and messages are
    /// capped at 128 MiB.
    pub fn strict() -> Self {
        Self {
            initial_buffer_size: INITIAL_BUFFER_SIZE,
            strict_associated_interfaces: true,
            max_message_size: Some(128 * 1024 * 1024),
        }
    }

    /// Builder: set the initial buffer size.
    pub fn with_initial_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = size;
        self
    }

    /// Builder: set the message size cap.
    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = Some(max);
        self
    }

    /// The buffer capacity an encoder starts with.
    pub fn effective_buffer_size(&self) -> usize {
        match self.initial_buffer_size {
            0 => INITIAL_BUFFER_SIZE,
            size => crate::helper::align(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_buffer_size() {
        assert_eq!(EncoderConfig::standard().effective_buffer_size(), 1024);
        assert_eq!(
            EncoderConfig::standard().with_initial_buffer_size(0).effective_buffer_size(),
            1024
        );
        assert_eq!(
            EncoderConfig::standard().with_initial_buffer_size(20).effective_buffer_size(),
            24
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EncoderConfig =
            serde_json::from_str(r#"{ "strict_associated_interfaces": true }"#).unwrap();
        assert!(config.strict_associated_interfaces);
        assert_eq!(config.initial_buffer_size, INITIAL_BUFFER_SIZE);
        assert_eq!(config.max_message_size, None);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = EncoderConfig::strict().with_initial_buffer_size(64);
        let json = serde_json::to_string(&config).unwrap();
        let back: EncoderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
