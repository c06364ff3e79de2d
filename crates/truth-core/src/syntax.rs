//! Reserved tokens of the Truth language.

/// Separates subjects within one side of a statement.
pub const COMBINATOR: char = ',';

/// Separates the declaration side from the annotation side.
pub const JOINT: char = ':';

/// Suffix that turns a term into a list term.
pub const LIST: &str = "...";

/// Opens (and, for total patterns, closes) a pattern declaration.
pub const PATTERN_DELIMITER: char = '/';

/// File extension that marks a subject as a URI to another document.
pub const TRUTH_EXTENSION: &str = ".truth";

/// Prefix of a comment line.
pub const COMMENT: &str = "//";

/// Separates path segments in debug output and type paths.
pub const TERMINAL: char = '/';

/// Stand-in for the anonymous subject in debug output.
pub const ANONYMOUS: &str = "•";
