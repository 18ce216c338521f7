use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use stowage::dev::Medium;
use stowage::Result;

/// An implementation of [`Medium`](stowage::dev::Medium) based on
/// Arc-Mutex-Hashmap.
///
/// Clones share the underlying map, the way separate handles to a browser's
/// localStorage share one area, so a facade and a raw handle can observe the
/// same entries.
///
/// ## Example
/// ```rust
/// use stowage::Stowage;
/// use stowage_memory::MemoryMedium;
///
/// let medium = MemoryMedium::new();
/// let store = Stowage::build().medium(medium).finish();
/// ```
#[derive(Clone, Default)]
pub struct MemoryMedium {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Medium for MemoryMedium {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.map.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.map.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.map.lock().clear();
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.map.lock().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage::test_utils::*;

    #[test]
    fn test_memory_medium() {
        test_medium(MemoryMedium::new());
    }

    #[test]
    fn test_memory_store() {
        test_store(MemoryMedium::new());
    }

    #[test]
    fn test_memory_store_values() {
        test_store_values(MemoryMedium::new());
    }

    #[test]
    fn test_memory_namespacing() {
        test_namespacing(MemoryMedium::new());
    }

    #[test]
    fn test_memory_expiry() {
        test_expiry(MemoryMedium::new());
    }

    #[test]
    fn test_memory_expiry_ordering() {
        test_expiry_ordering(MemoryMedium::new());
    }

    #[test]
    fn test_memory_lazy_sweep() {
        test_lazy_sweep(MemoryMedium::new());
    }

    #[test]
    fn test_memory_clear() {
        test_clear(MemoryMedium::new());
    }
}
