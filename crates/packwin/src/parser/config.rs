/// Configuration options for the packrat parser.
///
/// # Example
///
/// ```rust
/// use packwin::parser::PegConfig;
///
/// // Use default configuration
/// let config = PegConfig::default();
///
/// // Or customize it
/// let config = PegConfig {
///     enable_memoization: true, // Use the elastic cache
///     window_width: 128,        // Slots per rule id
///     max_depth: 64,            // Nested rule invocations
///     track_failures: false,    // Skip furthest-failure bookkeeping
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct PegConfig {
    /// Memoize rule results in an [`ElasticCache`](crate::cache::ElasticCache).
    ///
    /// Outcomes are identical with memoization off; only the amount of
    /// re-derivation changes.
    pub enable_memoization: bool,

    /// Cache width; the height is the grammar's rule count.
    pub window_width: usize,

    /// Maximum number of nested rule invocations before the parse aborts.
    ///
    /// Every rule invocation costs several native frames, one per nested
    /// operator of its body. The default fits a 2 MiB thread stack in an
    /// unoptimized build; raise it only on threads with a larger stack.
    pub max_depth: usize,

    /// Record the furthest position where a terminal failed to match.
    pub track_failures: bool,
}

impl Default for PegConfig {
    fn default() -> Self {
        Self {
            enable_memoization: true,
            window_width: 64,
            max_depth: 128,
            track_failures: true,
        }
    }
}

#[cfg(all(test, feature = "serialize"))]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: PegConfig = serde_json::from_str(r#"{"window_width":16}"#).unwrap();
        assert_eq!(config.window_width, 16);
        assert_eq!(config.max_depth, PegConfig::default().max_depth);
        assert!(config.enable_memoization);
    }
}
