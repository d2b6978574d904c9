use thiserror::Error;

/// Result type alias using ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and status-record messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Malformed input
    InvalidInput,
    MalformedDocument,
    MalformedPlaceholder,

    // Resolution
    UnresolvedPlaceholder,

    // Validation
    ValidationConflict,
    UnsupportedObjectType,

    // Application
    SetterFailed,

    // Integration/IO
    Io,
    Persistence,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MalformedDocument => "ERR_MALFORMED_DOCUMENT",
            ExErrorKind::MalformedPlaceholder => "ERR_MALFORMED_PLACEHOLDER",
            ExErrorKind::UnresolvedPlaceholder => "ERR_UNRESOLVED_PLACEHOLDER",
            ExErrorKind::ValidationConflict => "ERR_VALIDATION_CONFLICT",
            ExErrorKind::UnsupportedObjectType => "ERR_UNSUPPORTED_OBJECT_TYPE",
            ExErrorKind::SetterFailed => "ERR_SETTER_FAILED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }

    /// Whether this kind aborts a whole apply before any setter runs
    pub fn is_pre_apply(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidInput
                | ExErrorKind::MalformedDocument
                | ExErrorKind::MalformedPlaceholder
                | ExErrorKind::ValidationConflict
                | ExErrorKind::UnsupportedObjectType
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling and optional
/// context (operation, package, handler, target) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    package: Option<String>,
    handler: Option<String>,
    target: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            package: None,
            handler: None,
            target: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add package context
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Add handler context
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Add target object context
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the package context, if any
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Get the handler context, if any
    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    /// Get the target object context, if any
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(package) = &self.package {
            write!(f, " (package: {})", package)?;
        }
        if let Some(handler) = &self.handler {
            write!(f, " (handler: {})", handler)?;
        }
        if let Some(target) = &self.target {
            write!(f, " (target: {})", target)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for normalization, resolution and apply operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    // ===== Malformed Input =====
    /// Unparsable or schema-invalid document
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// Placeholder syntax error inside a template value
    #[error("Malformed placeholder in '{template}': {reason}")]
    MalformedPlaceholder { template: String, reason: String },

    // ===== Resolution Errors =====
    /// A required property references a name with no current value
    #[error("Unresolved placeholder '{name}' in setter {setter}")]
    UnresolvedPlaceholder { name: String, setter: String },

    // ===== Validation Errors =====
    /// Target object already claimed by another package
    #[error("Target {target} requested by package {package} is already owned by package {owner}")]
    ValidationConflict {
        target: String,
        package: String,
        owner: String,
    },

    /// No applier registered for a handler's object type
    #[error("Handler {handler} uses unsupported object type: {object_type}")]
    UnsupportedObjectType { handler: String, object_type: String },

    // ===== Application Errors =====
    /// External setter capability reported a failure
    #[error("Setter {setter} of handler {handler} failed on target {target}: {reason}")]
    SetterFailed {
        handler: String,
        setter: String,
        target: String,
        reason: String,
    },

    // ===== Storage Errors =====
    /// Status or claims persistence failed
    #[error("Storage error in {op}: {message}")]
    Storage { op: String, message: String },
}

impl ConfigError {
    /// Create a storage error for the given operation
    pub fn storage(op: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Storage {
            op: op.into(),
            message: message.into(),
        }
    }

    /// Get the canonical kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            ConfigError::MalformedInput { .. } => ExErrorKind::MalformedDocument,
            ConfigError::MalformedPlaceholder { .. } => ExErrorKind::MalformedPlaceholder,
            ConfigError::UnresolvedPlaceholder { .. } => ExErrorKind::UnresolvedPlaceholder,
            ConfigError::ValidationConflict { .. } => ExErrorKind::ValidationConflict,
            ConfigError::UnsupportedObjectType { .. } => ExErrorKind::UnsupportedObjectType,
            ConfigError::SetterFailed { .. } => ExErrorKind::SetterFailed,
            ConfigError::Storage { .. } => ExErrorKind::Persistence,
        }
    }
}

/// Conversion from ConfigError to ExError
impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let kind = err.kind();
        match err {
            ConfigError::MalformedInput { reason } => ExError::new(kind).with_message(reason),
            ConfigError::MalformedPlaceholder { template, reason } => ExError::new(kind)
                .with_op("scan_placeholders")
                .with_message(format!("{} (template: {})", reason, template)),
            ConfigError::UnresolvedPlaceholder { name, setter } => ExError::new(kind)
                .with_op("resolve_handlers")
                .with_message(format!("No value for '{}' in setter {}", name, setter)),
            ConfigError::ValidationConflict {
                target,
                package,
                owner,
            } => ExError::new(kind)
                .with_op("validate_claims")
                .with_package(package)
                .with_target(target)
                .with_message(format!("Target already owned by package {}", owner)),
            ConfigError::UnsupportedObjectType {
                handler,
                object_type,
            } => ExError::new(kind)
                .with_op("validate_appliers")
                .with_handler(handler)
                .with_message(format!("No applier registered for '{}'", object_type)),
            ConfigError::SetterFailed {
                handler,
                setter,
                target,
                reason,
            } => ExError::new(kind)
                .with_op("invoke_setter")
                .with_handler(handler)
                .with_target(target)
                .with_message(format!("Setter {}: {}", setter, reason)),
            ConfigError::Storage { op, message } => {
                ExError::new(kind).with_op(op).with_message(message)
            }
        }
    }
}
