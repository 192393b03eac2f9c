//! Decoder configuration.

/// Default limit on multipart and `message/rfc822` nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Body structure decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum nesting of multiparts and embedded messages.
    ///
    /// Anything nested deeper is dropped from the decoded tree.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderConfig {
    /// Creates a configuration with the default nesting limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub const fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::new()
    }
}

/// Builder for decoder configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderConfigBuilder {
    max_depth: Option<usize>,
}

impl DecoderConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_depth: None }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> DecoderConfig {
        DecoderConfig {
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DecoderConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config, DecoderConfig::new());
    }

    #[test]
    fn test_config_builder() {
        let config = DecoderConfig::builder().max_depth(4).build();
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_config_builder_default_depth() {
        let config = DecoderConfig::builder().build();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }
}
