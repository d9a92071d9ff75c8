//! Configuration for Coldstream adapters.
//!
//! The only configurable surface is the async stream bridge, see
//! [`Observable::into_stream_with`](crate::Observable::into_stream_with).

use crate::error::{ObservableError, ObservableResult};

/// Base trait for configuration types.
///
/// # Example
///
/// ```rust
/// use coldstream::Config;
///
/// #[derive(Debug, Clone)]
/// struct PollConfig {
///     interval_ms: u64,
/// }
///
/// impl Config for PollConfig {
///     fn name(&self) -> &str {
///         "poll"
///     }
///
///     fn validate(&self) -> Result<(), String> {
///         if self.interval_ms == 0 {
///             return Err("interval_ms must be greater than 0".to_string());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Config: Send + Sync {
    /// Returns the configuration name/identifier.
    fn name(&self) -> &str {
        "default"
    }

    /// Validates the configuration.
    ///
    /// Returns Ok(()) if valid, or an error message describing the issue.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Validates the configuration, mapping failures into [`ObservableError`].
    fn validated(&self) -> ObservableResult<&Self>
    where
        Self: Sized,
    {
        self.validate().map_err(ObservableError::InvalidConfig)?;
        Ok(self)
    }
}

/// Settings for turning an observable into an async stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    /// Name used in log events
    pub name: String,
    /// Channel capacity; `None` means unbounded
    pub buffer_size: Option<usize>,
}

impl StreamConfig {
    /// Create an unbounded configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Bound the channel to `size` buffered items.
    ///
    /// Observables have no backpressure, so values arriving while the buffer
    /// is full are dropped.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Remove any bound on the channel.
    pub fn unbounded(mut self) -> Self {
        self.buffer_size = None;
        self
    }
}

impl Config for StreamConfig {
    fn name(&self) -> &str {
        if self.name.is_empty() {
            "stream"
        } else {
            &self.name
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self.buffer_size {
            Some(0) => Err("buffer_size must be greater than 0".to_string()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let config = StreamConfig::new();
        assert_eq!(config.name(), "stream");
        assert_eq!(config.buffer_size, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stream_config_builder() {
        let config = StreamConfig::new().with_name("ticks").with_buffer_size(8);
        assert_eq!(config.name(), "ticks");
        assert_eq!(config.buffer_size, Some(8));
        assert_eq!(config.unbounded().buffer_size, None);
    }

    #[test]
    fn test_zero_buffer_is_invalid() {
        let config = StreamConfig::new().with_buffer_size(0);
        assert!(config.validate().is_err());
        assert!(matches!(
            config.validated(),
            Err(ObservableError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validated_passes_stream_settings_through() {
        let config = StreamConfig::new().with_name("clicks").with_buffer_size(16);
        let validated = config.validated().unwrap();
        assert_eq!(validated.name(), "clicks");
        assert_eq!(validated.buffer_size, Some(16));
    }

    #[test]
    fn test_unbounded_repairs_zero_buffer() {
        let config = StreamConfig::new().with_buffer_size(0).unbounded();
        assert!(config.validated().is_ok());
        assert_eq!(config.buffer_size, None);
    }
}
