//! Error types for kubedash store and resource operations
//!
//! Errors carry the resource kind and name where known so that the API
//! layer can produce precise messages. Store-level conditions (absent,
//! duplicate) are recognized both from the Kubernetes API and from
//! in-process stores through the same predicates.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for kubedash store operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Object does not exist in the store
    #[error("{kind} \"{name}\" not found")]
    NotFound {
        /// Resource kind (e.g., "Backup")
        kind: String,
        /// Object name
        name: String,
    },

    /// The user cluster addressed by a request has no admin kubeconfig
    #[error("cluster \"{cluster}\" not found")]
    ClusterNotFound {
        /// Cluster id
        cluster: String,
    },

    /// An object with the same identity already exists
    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists {
        /// Resource kind (e.g., "Backup")
        kind: String,
        /// Object name
        name: String,
    },

    /// Write rejected because the object changed since it was read
    #[error("{kind} \"{name}\" was modified concurrently")]
    Conflict {
        /// Resource kind (e.g., "Schedule")
        kind: String,
        /// Object name
        name: String,
    },

    /// Validation error for resource contents
    #[error("validation error: {message}")]
    Validation {
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.schedule")
        field: Option<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "kubeconfig", "store")
        context: String,
    },
}

impl Error {
    /// Create a not-found error for the given kind and name
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a not-found error for a user cluster
    pub fn cluster_not_found(cluster: impl Into<String>) -> Self {
        Self::ClusterNotFound {
            cluster: cluster.into(),
        }
    }

    /// Create an already-exists error for the given kind and name
    pub fn already_exists(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a stale-write conflict error for the given kind and name
    pub fn conflict(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Conflict {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error for a specific field path
    pub fn validation_for_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: UNKNOWN_CONTEXT.to_string(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(msg: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// HTTP-style status code reported by the store, if any
    ///
    /// Kubernetes API errors carry their own code; in-process store
    /// conditions map to the code the API server would have used.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Kube {
                source: kube::Error::Api(response),
            } => Some(response.code),
            Error::NotFound { .. } | Error::ClusterNotFound { .. } => Some(404),
            Error::AlreadyExists { .. } | Error::Conflict { .. } => Some(409),
            _ => None,
        }
    }

    /// Whether the store reported the object as absent
    ///
    /// A missing cluster is not an absent object: the request addressed a
    /// location that does not exist.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Error::ClusterNotFound { .. }) && self.status_code() == Some(404)
    }

    /// Whether the store rejected the write as a duplicate or stale update
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }
}
