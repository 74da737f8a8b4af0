/// The error returned by [`file()`](crate::file) and [`buffer()`](crate::buffer).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{target} has no revision named HEAD, or HEAD does not resolve to a commit")]
    UnresolvedHead { target: String },
    #[error("the path '{path}' does not exist in the tree of the starting commit")]
    PathNotFound { path: String },
    #[error("the line range {min_line}..={max_line} is invalid for a file of {num_lines} lines")]
    InvalidLineRange {
        min_line: u32,
        max_line: u32,
        num_lines: u32,
    },
    #[error("blame_buffer() requires a non-empty buffer")]
    EmptyBuffer,
    #[error("could not load object {id}")]
    ObjectAccess {
        id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("the diff engine failed to compare two blobs")]
    Diff {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
