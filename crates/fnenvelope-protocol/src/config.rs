/// Default maximum request body size: 16 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Controls how request envelopes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Maximum request body size in bytes. Default: 16 MiB.
    pub max_body_size: usize,
    /// Terminate each outbound envelope with `\n`. Default: true.
    pub newline_delimited: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            newline_delimited: true,
        }
    }
}
