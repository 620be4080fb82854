use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid Newick: {0}")]
    Newick(String),

    #[error("invalid NEXUS at line {line}: {message}")]
    Nexus { line: usize, message: String },
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
