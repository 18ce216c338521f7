use std::convert::TryFrom;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::builder::StowageBuilder;
use crate::error::Result;
use crate::expiry::{ExpiryIndex, ExpiryRecord};
use crate::provider::Medium;
use crate::value::Value;
use crate::StowageError;

/// Namespace prefix prepended to every logical key before it touches the
/// medium, unless overwritten on the builder.
pub const DEFAULT_PREFIX: &str = "localstorage:";

/// Reserved logical key the expiry index is persisted under. Application data
/// stored under this key will be overwritten by expiry bookkeeping.
pub const EXPIRY_KEY: &str = "expiries";

/// Takes the underlying medium and provides prefixed, typed access with
/// per-key expiry on top of it.
///
/// The medium itself knows nothing about expiry. Expirations are kept in a
/// timestamp-sorted index persisted in the medium under [`EXPIRY_KEY`], and
/// eviction is lazy: every read access first sweeps all past-due keys, so an
/// expired key disappears on the next `get` or `has` of *any* key, not at the
/// moment its timestamp passes.
///
/// Cloning is cheap and clones share the same medium and prefix. Independent
/// namespaces over one medium are made by building with different prefixes.
///
/// ## Example
///
/// ```rust
/// use stowage::{Stowage, Result};
///
/// fn index(store: Stowage) -> Result<String> {
///     store.set("key", "value")?;
///     let val = store.get::<String>("key")?;
///     Ok(val.unwrap_or_default())
/// }
/// ```
#[derive(Clone)]
pub struct Stowage {
    pub(crate) prefix: Arc<str>,
    pub(crate) medium: Arc<dyn Medium>,
}

impl Stowage {
    /// Returns the stowage builder struct
    pub fn build() -> StowageBuilder {
        StowageBuilder::default()
    }

    /// Stores a value under the prefixed key, encoded through the value codec.
    ///
    /// Unconditional: it overwrites silently and leaves any pending expiry
    /// for the key in place.
    ///
    /// ## Example
    /// ```rust
    /// # use stowage::{Stowage, Result};
    /// #
    /// # fn index(store: Stowage) -> Result<()> {
    /// store.set("age", 60)?;
    /// store.set("name", "Violet")?;
    /// #     Ok(())
    /// # }
    /// ```
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.medium
            .set_item(&self.prefixed(key), &value.into().encode())
    }

    /// Gets a value for the specified key, converted to the requested type.
    ///
    /// Sweeps expired keys before reading, so a past-due key results in None.
    ///
    /// ## Example
    /// ```rust
    /// # use stowage::{Stowage, Result};
    /// #
    /// # fn index(store: Stowage) -> Result<String> {
    /// let val = store.get::<String>("key")?;
    /// #     Ok(val.unwrap_or_default())
    /// # }
    /// ```
    pub fn get<T: TryFrom<Value, Error = StowageError>>(&self, key: &str) -> Result<Option<T>> {
        self.get_value(key)?.map(T::try_from).transpose()
    }

    /// Same as `get` but returns the untyped [`Value`].
    pub fn get_value(&self, key: &str) -> Result<Option<Value>> {
        self.sweep()?;
        Ok(self.read(key)?.map(Value::decode))
    }

    /// Checks if the key is present, sweeping expired keys first.
    ///
    /// ## Example
    /// ```rust
    /// # use stowage::{Stowage, Result};
    /// #
    /// # fn index(store: Stowage) -> Result<bool> {
    /// let exists = store.has("key")?;
    /// #     Ok(exists)
    /// # }
    /// ```
    pub fn has(&self, key: &str) -> Result<bool> {
        self.sweep()?;
        Ok(self.read(key)?.is_some())
    }

    /// Deletes the key from the medium.
    ///
    /// A pending expiry record for the key is left behind, it is harmless:
    /// the sweep's removal of an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.medium.remove_item(&self.prefixed(key))
    }

    /// Wipes the whole medium, deliberately ignoring the prefix.
    ///
    /// Everything goes, the expiry index and entries of other namespaces
    /// sharing the medium included.
    pub fn clear(&self) -> Result<()> {
        self.medium.clear()
    }

    /// Checks if the medium holds no entries at all.
    ///
    /// Like [`clear`](Self::clear) this ignores the prefix, an entry of any
    /// namespace makes it false.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.medium.len()? == 0)
    }

    /// Sets the key to expire after the given duration from now.
    ///
    /// It won't result in error if the key doesn't exist, and a later set on
    /// the key doesn't cancel it. Calling it twice leaves both records in the
    /// index and the earlier one wins.
    ///
    /// ## Example
    /// ```rust
    /// # use std::time::Duration;
    /// # use stowage::{Stowage, Result};
    /// #
    /// # fn index(store: Stowage) -> Result<()> {
    /// store.expire("key", Duration::from_secs(10))?;
    /// #     Ok(())
    /// # }
    /// ```
    pub fn expire(&self, key: &str, expire_in: Duration) -> Result<()> {
        self.expire_at(key, now_millis() + expire_in.as_millis() as u64)
    }

    /// Sets the key to expire at an absolute timestamp in epoch milliseconds.
    ///
    /// The record lands at its sorted position in the expiry index, which is
    /// read and written back whole. Writing the index does not trigger a
    /// sweep, a past timestamp takes effect on the next read access.
    pub fn expire_at(&self, key: &str, timestamp: u64) -> Result<()> {
        let mut index = self.load_index()?;
        index.insert(ExpiryRecord {
            key: key.to_owned(),
            timestamp,
        });
        self.store_index(&index)
    }

    /// Evict every key whose expiry timestamp has passed.
    ///
    /// Runs at the top of every read access. Records are sorted by
    /// timestamp, so the due ones are a prefix of the index and everything
    /// after the split point stays untouched.
    fn sweep(&self) -> Result<()> {
        let raw = match self.read(EXPIRY_KEY)? {
            Some(raw) => raw,
            None => return Ok(()),
        };

        let mut index = decode_index(raw);
        let expired = index.take_expired(now_millis());
        if expired.is_empty() {
            return Ok(());
        }

        for record in &expired {
            // Removing an already removed key is a no-op by the medium's
            // contract, dangling records don't need special handling
            self.medium.remove_item(&self.prefixed(&record.key))?;
        }
        log::debug!("swept {} expired key(s)", expired.len());

        // The kept suffix goes back even when it's empty, the index entry
        // itself is never deleted by the sweep
        self.store_index(&index)
    }

    fn load_index(&self) -> Result<ExpiryIndex> {
        Ok(self.read(EXPIRY_KEY)?.map(decode_index).unwrap_or_default())
    }

    fn store_index(&self, index: &ExpiryIndex) -> Result<()> {
        let value = serde_json::to_value(index).map_err(StowageError::custom)?;
        self.set(EXPIRY_KEY, value)
    }

    /// Read straight from the medium, without sweeping
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.medium.get_item(&self.prefixed(key))
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

fn decode_index(raw: String) -> ExpiryIndex {
    match Value::decode(raw) {
        Value::Structured(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            log::warn!("Failed to decode stored expiry index: {}", err);
            ExpiryIndex::default()
        }),
        _ => {
            log::warn!("Stored expiry index is not a structured value");
            ExpiryIndex::default()
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
