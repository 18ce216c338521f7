mod builder;
mod error;
mod expiry;
mod provider;
mod stowage;
mod value;

pub use error::{Result, StowageError};
pub use stowage::{Stowage, DEFAULT_PREFIX, EXPIRY_KEY};
pub use value::{Value, ValueKind};

/// Set of traits and structs used for medium backend development
pub mod dev {
    pub use crate::builder::StowageBuilder;
    pub use crate::expiry::{ExpiryIndex, ExpiryRecord};
    pub use crate::provider::Medium;
}

#[doc(hidden)]
#[cfg(feature = "test_utils")]
pub mod test_utils;
