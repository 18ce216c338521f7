use crate::error::Result;

/// Set of methods a string-only storage medium should provide.
///
/// The medium is the system of record: a flat, synchronous map from string
/// keys to string values with no expiry of its own. Everything above it,
/// prefixing, value encoding and expiry bookkeeping, lives in
/// [`Stowage`](../struct.Stowage.html).
///
/// Methods take `&self`, implementations are expected to rely on interior
/// mutability as the medium is shared between facade instances.
pub trait Medium: Send + Sync {
    /// Get the value stored under key, None if the key does not exist
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Set a key-value pair, if the key already exists, the value should be overwritten
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the key from the medium, if the key doesn't exist, it shouldn't return an error
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every entry from the medium, whatever namespace it belongs to
    fn clear(&self) -> Result<()>;

    /// Number of entries currently held by the medium
    fn len(&self) -> Result<usize>;
}
