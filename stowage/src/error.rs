use std::error::Error;

use thiserror::Error;

/// Error type that will be returned from all fallible methods of stowage.
///
/// Medium implementers should generally use Custom variant for their own errors.
#[derive(Debug, Error)]
pub enum StowageError {
    /// States that the retrieved value can't be converted to the requested type
    #[error("StowageError: Invalid type requested from storage")]
    TypeConversion,
    /// An error from the underlying medium
    #[error("StowageError: {:?}", self)]
    Custom(Box<dyn Error + Send>),
}

impl StowageError {
    /// Shortcut method to construct Custom variant
    pub fn custom<E>(err: E) -> Self
    where
        E: 'static + Error + Send,
    {
        Self::Custom(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StowageError>;
