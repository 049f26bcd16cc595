/// Errors raised while loading meshes
use thiserror::Error;

/// Result type alias for mesh loading
pub type MeshResult<T> = Result<T, MeshError>;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record that could not be parsed
    #[error("line {line}: malformed {record} record: {text:?}")]
    Malformed {
        line: usize,
        record: &'static str,
        text: String,
    },

    /// A face referenced a vertex that does not exist (OBJ indices are 1-based)
    #[error("line {line}: vertex index {index} out of range (have {count} vertices)")]
    IndexOutOfRange { line: usize, index: i64, count: usize },

    /// A face with fewer than three corners
    #[error("line {line}: face needs at least 3 vertices, found {found}")]
    DegenerateFace { line: usize, found: usize },

    #[error("mesh has no faces")]
    Empty,
}
