use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("empty language code string: {raw:?}")]
    EmptyCodes { raw: String },

    #[error("node {node}: missing or empty {field}")]
    MissingField { node: String, field: &'static str },

    #[error("unknown node type: {0:?}")]
    UnknownNodeType(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
