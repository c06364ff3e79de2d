use super::FaultSite;

/// Fault kinds, errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FaultKind {
    // The text of a statement could not be understood
    InvalidPattern,

    // Inheritance could not be established
    UnresolvedAnnotation,
    CircularReference,
    ContractViolation,

    // List shape disagreements
    ListFragmentConflict,
    ListDimensionalConflict,

    // Suspicious, but the program still resolves
    UnresolvedDependency,
    HomographAmbiguity,
    RecursionLimit,
}

impl FaultKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnresolvedDependency | Self::HomographAmbiguity | Self::RecursionLimit => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Base message for this kind, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::InvalidPattern => "invalid pattern",
            Self::UnresolvedAnnotation => "annotation does not resolve to a type",
            Self::CircularReference => "circular reference",
            Self::ContractViolation => "annotation breaks the contract of an overridden type",
            Self::ListFragmentConflict => "fragments disagree about list-ness",
            Self::ListDimensionalConflict => "conflicting list dimensionality",
            Self::UnresolvedDependency => "dependency is not loaded",
            Self::HomographAmbiguity => "path is ambiguous between homographs",
            Self::RecursionLimit => "type is nested too deeply to resolve",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnresolvedAnnotation => "`{}` does not resolve to a type".to_string(),
            Self::CircularReference => "`{}` refers back to this type".to_string(),
            Self::ContractViolation => "`{}` does not satisfy the overridden type".to_string(),
            Self::UnresolvedDependency => "`{}` is not loaded".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelatedInfo {
    pub(crate) site: FaultSite,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub(crate) fn new(site: FaultSite, message: impl Into<String>) -> Self {
        Self {
            site,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub(crate) kind: FaultKind,
    pub(crate) site: FaultSite,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl Fault {
    pub(crate) fn with_default_message(kind: FaultKind, site: FaultSite) -> Self {
        Self {
            kind,
            site,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn site(&self) -> &FaultSite {
        &self.site
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            self.site.range.start,
            self.site.range.end,
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message, related.site.range.start, related.site.range.end
            )?;
        }
        Ok(())
    }
}
