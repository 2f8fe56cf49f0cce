use crate::field::FieldKind;

/// Failure reported by a [`ParameterStore`](crate::store::ParameterStore).
///
/// Every variant carries the full key that was requested so the message is
/// useful on its own once it reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("parameter '{key}' not found")]
    NotFound { key: String },

    #[error("access denied to parameter '{key}': {message}")]
    AccessDenied { key: String, message: String },

    #[error("parameter '{key}' has no value")]
    MissingValue { key: String },

    #[error("store rejected request for '{key}': {message}")]
    Service { key: String, message: String },

    #[error("transport error fetching '{key}': {message}")]
    Transport { key: String, message: String },

    #[error("client error: {0}")]
    Client(String),

    #[error("config error: {0}")]
    Config(String),
}

impl StoreError {
    /// Key the failed request was made for, if the failure is tied to one.
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreError::NotFound { key }
            | StoreError::AccessDenied { key, .. }
            | StoreError::MissingValue { key }
            | StoreError::Service { key, .. }
            | StoreError::Transport { key, .. } => Some(key),
            StoreError::Client(_) | StoreError::Config(_) => None,
        }
    }
}

/// Error returned by [`Populator::populate`](crate::Populator::populate).
///
/// The first failure aborts the traversal. Fields assigned before it keep
/// their new values.
#[derive(Debug, thiserror::Error)]
pub enum PopulateError {
    #[error("type '{type_name}' is not a record")]
    NotARecord { type_name: &'static str },

    #[error(transparent)]
    Fetch(#[from] StoreError),

    #[error("field '{field}': malformed {kind} value {value:?} from '{key}': {reason}")]
    MalformedValue {
        field: &'static str,
        key: String,
        value: String,
        kind: FieldKind,
        reason: String,
    },

    #[error("field '{field}' has unsupported type '{type_name}'")]
    UnsupportedFieldType {
        field: &'static str,
        type_name: &'static str,
    },
}

impl PopulateError {
    /// Error for a hand-written [`Populate`](crate::Populate) impl on a type
    /// that has no fields to walk.
    pub fn not_a_record<T: ?Sized>() -> Self {
        PopulateError::NotARecord {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Name of the field the error is attributed to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PopulateError::MalformedValue { field, .. }
            | PopulateError::UnsupportedFieldType { field, .. } => Some(field),
            PopulateError::NotARecord { .. } | PopulateError::Fetch(_) => None,
        }
    }
}
