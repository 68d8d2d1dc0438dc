pub mod decision;
pub mod rules;
pub mod types;

use thiserror::Error;

use crate::dag::TemplateError;
use crate::spine::SpineError;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error(transparent)]
    Spine(#[from] SpineError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}
