// Durable key-value storage backends

mod file;
mod memory;
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::error::Result;

/// The two primitives the store needs from its host environment.
///
/// `get` returns `Ok(None)` when the key has never been written, and
/// [`crate::Error::Corrupt`] when a value is present but is not valid text.
/// Other backend failures are [`crate::Error::Persistence`].
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
