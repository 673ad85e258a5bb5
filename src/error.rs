use thiserror::Error;

/// Produced when dotted path text cannot be parsed into segments.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid path '{path}': {reason}")]
pub struct PathSyntaxError {
    pub path: String,
    pub reason: String,
}

/// Structural mismatch while writing into a snapshot.
///
/// Missing data is never an error on read; these only arise when a write
/// cannot be applied without changing the shape of existing data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidPathError {
    #[error(transparent)]
    Syntax(#[from] PathSyntaxError),

    /// A non-terminal segment addresses a scalar.
    #[error("'{path}' holds a scalar and cannot contain '{segment}'")]
    NotAContainer { path: String, segment: String },

    /// A field name was used to index into a sequence.
    #[error("'{path}' is a sequence; field '{segment}' is not an index")]
    FieldOnSequence { path: String, segment: String },

    /// A write would leave a hole in a sequence.
    #[error("index {index} at '{path}' is past the end (length {len})")]
    Sparse {
        path: String,
        index: usize,
        len: usize,
    },

    /// Wildcards only make sense in schemas.
    #[error("cannot write through wildcard path '{path}'")]
    Wildcard { path: String },

    /// A list or set operation targeted something other than a sequence.
    #[error("'{path}' holds a {found}, not a sequence")]
    NotASequence { path: String, found: &'static str },
}

/// Programmer errors in a rule schema.
///
/// Detected at expansion time and abort the whole pass; they are never folded
/// into the error index.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema path: {0}")]
    InvalidPath(#[from] PathSyntaxError),

    #[error("unknown rule '{rule}' at '{path}'")]
    UnknownRule { path: String, rule: String },

    #[error("rule '{rule}' at '{path}' expects {expected} parameter(s), got {got}")]
    Arity {
        path: String,
        rule: String,
        expected: String,
        got: usize,
    },

    #[error("rule '{rule}' at '{path}': invalid parameter '{param}': {reason}")]
    InvalidParameter {
        path: String,
        rule: String,
        param: String,
        reason: String,
    },

    /// A cross-field reference uses more wildcards than its owning path binds.
    #[error("rule '{rule}' at '{path}' references '{reference}' with unbound wildcards")]
    WildcardMismatch {
        path: String,
        rule: String,
        reference: String,
    },

    #[error("schema shape: {0}")]
    Shape(String),
}

/// Rejected controller event. The controller keeps its prior state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<PathSyntaxError> for FormError {
    fn from(e: PathSyntaxError) -> Self {
        FormError::InvalidPath(InvalidPathError::Syntax(e))
    }
}

/// Error kind for form-definition loading failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadErrorKind {
    Syntax,
    TypeMismatch,
    UnknownField,
}

/// Produced by [`load`](crate::load) when a form definition is unusable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("{message}")]
    Parse {
        kind: LoadErrorKind,
        message: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
