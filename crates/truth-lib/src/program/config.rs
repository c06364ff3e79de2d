use crate::pattern::DEFAULT_SIZE_LIMIT;

/// Default depth at which construction gives up on a type.
pub const DEFAULT_RECURSION_LIMIT: usize = 256;

/// Limits and switches for a [`Program`](super::Program).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Maximum compiled size of a single pattern, in bytes.
    pub pattern_size_limit: usize,
    /// Maximum nesting of drills and descents while constructing one type.
    pub recursion_limit: usize,
    /// Whether declare/undeclare events are recorded.
    pub emit_events: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            pattern_size_limit: DEFAULT_SIZE_LIMIT,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            emit_events: true,
        }
    }
}

impl ProgramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern_size_limit(mut self, limit: usize) -> Self {
        self.pattern_size_limit = limit;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_events(mut self, enabled: bool) -> Self {
        self.emit_events = enabled;
        self
    }
}
