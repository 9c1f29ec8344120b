use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContextError {
    #[error("a bean named '{0}' or of the same type is already registered")]
    DuplicateBean(String),
}
