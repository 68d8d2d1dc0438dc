pub mod executor;
pub mod template;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template schema error: {0}")]
    Schema(String),

    #[error("template dependency cycle involving: {0}")]
    Cycle(String),

    #[error("unknown DAG step: {0}")]
    UnknownStep(String),

    #[error("template io error: {0}")]
    Io(#[from] std::io::Error),
}
