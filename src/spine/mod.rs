pub mod auto_builder;
pub mod resolver;
pub mod silver;
pub mod types;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpineError {
    #[error("no structural artifact and no raw text available for document: {0}")]
    Resolution(String),

    #[error("malformed artifact: {0}")]
    Schema(String),

    #[error("document produced zero spine nodes")]
    EmptyDocument,

    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),
}
