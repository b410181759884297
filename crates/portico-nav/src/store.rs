//! Small durable key-value store for client-side UI state.
//!
//! The router uses it to remember the last nested tab a user opened, the way
//! a browser page would use `localStorage`.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Store errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
	/// Reads a value.
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Writes a value.
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

	/// Deletes a value. Missing keys are not an error.
	fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Values are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
	values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.values.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.values.lock().insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.values.lock().remove(key);
		Ok(())
	}
}

/// Store persisted as a JSON object on disk.
///
/// Every write rewrites the whole file; the store is meant for a handful of
/// UI preferences, not bulk data.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	lock: Mutex<()>,
}

impl FileStore {
	/// Opens a store at `path`. The file is created on first write.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
		match fs::read_to_string(&self.path) {
			Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
			Ok(raw) => Ok(serde_json::from_str(&raw)?),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
			Err(e) => Err(e.into()),
		}
	}

	fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}
		fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
		Ok(())
	}
}

impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		let _guard = self.lock.lock();
		Ok(self.read_all()?.remove(key))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let _guard = self.lock.lock();
		let mut values = self.read_all()?;
		values.insert(key.to_string(), value.to_string());
		self.write_all(&values)
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		let _guard = self.lock.lock();
		let mut values = self.read_all()?;
		if values.remove(key).is_some() {
			self.write_all(&values)?;
		}
		Ok(())
	}
}
