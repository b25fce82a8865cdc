//! Error types for darn.
//!
//! Assembly itself never fails: defects in the input are repaired and
//! reported through [`ImportReport`](crate::import::ImportReport). The errors
//! below come from the outer surfaces of the crate (typed attribute access,
//! checked imports, integrity verification and file I/O).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur around map construction.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The input contains no usable faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references a vertex outside the vertex container.
    #[error("face {face} references vertex index {vertex} but only {nb_vertices} vertices exist")]
    InvalidVertexIndex {
        /// The face record index.
        face: usize,
        /// The out-of-range vertex index.
        vertex: usize,
        /// Number of rows in the vertex container.
        nb_vertices: usize,
    },

    /// An attribute column does not have the expected number of rows.
    #[error("attribute `{name}` has {found} values, expected {expected}")]
    AttributeLength {
        /// The attribute name.
        name: String,
        /// Expected number of values.
        expected: usize,
        /// Number of values provided.
        found: usize,
    },

    /// An attribute with this name already exists in the container.
    #[error("attribute `{0}` already exists")]
    DuplicateAttribute(String),

    /// No attribute with this name exists in the container.
    #[error("attribute `{0}` does not exist")]
    MissingAttribute(String),

    /// An attribute was accessed with the wrong value type.
    #[error("attribute `{name}` holds {found}, not {expected}")]
    AttributeTypeMismatch {
        /// The attribute name.
        name: String,
        /// The requested value type.
        expected: &'static str,
        /// The stored value type.
        found: &'static str,
    },

    /// The map violates one of its structural invariants.
    #[error("invalid map state: {0}")]
    InvalidState(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = MeshError::InvalidVertexIndex {
            face: 2,
            vertex: 9,
            nb_vertices: 4,
        };
        assert_eq!(
            e.to_string(),
            "face 2 references vertex index 9 but only 4 vertices exist"
        );

        let e = MeshError::invalid_param("format", "obj", "only ply and stl are supported");
        assert!(e.to_string().contains("format = obj"));
    }
}
