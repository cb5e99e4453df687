//! Device-local key-value storage and the progress keys kept in it.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::qbank::Answer;

pub const KEY_PREFIX: &str = "@geniusfactory:";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`/`remove` calls seen so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.set(self.writes.get() + 1);
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.writes.set(self.writes.get() + 1);
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// All keys in one JSON object on disk. The file is read on every access and
/// rewritten on every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

fn position_key(block_id: &str) -> String {
    format!("{}bloco:{}:pagina", KEY_PREFIX, block_id)
}

fn flags_key(block_id: &str) -> String {
    format!("{}bloco:{}:concluidas", KEY_PREFIX, block_id)
}

fn answered_key(block_id: &str, question_id: &str) -> String {
    format!(
        "{}bloco:{}:questao:{}:respondida",
        KEY_PREFIX, block_id, question_id
    )
}

fn draft_key(question_id: &str) -> String {
    format!("{}rascunho:{}", KEY_PREFIX, question_id)
}

/// Typed access to the progress keys.
///
/// Reads that fail or find garbage come back as `None`; writes that fail are
/// logged and dropped. Progress is advisory and can always be rebuilt by
/// visiting the pages again.
pub struct ProgressStore<'a> {
    inner: &'a dyn KeyValueStore,
}

impl<'a> ProgressStore<'a> {
    pub fn new(inner: &'a dyn KeyValueStore) -> Self {
        Self { inner }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.inner.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("could not read '{}': {}", key, e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.inner.set(key, value) {
            log::warn!("could not write '{}': {}", key, e);
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.inner.remove(key) {
            log::warn!("could not remove '{}': {}", key, e);
        }
    }

    pub fn position(&self, block_id: &str) -> Option<usize> {
        let raw = self.read(&position_key(block_id))?;
        match raw.trim().parse::<usize>() {
            Ok(index) => Some(index),
            Err(_) => {
                log::warn!("ignoring saved page '{}' for block {}", raw, block_id);
                None
            }
        }
    }

    pub fn save_position(&self, block_id: &str, index: usize) {
        self.write(&position_key(block_id), &index.to_string());
    }

    pub fn flags(&self, block_id: &str) -> Option<Vec<bool>> {
        let raw = self.read(&flags_key(block_id))?;
        match serde_json::from_str(&raw) {
            Ok(flags) => Some(flags),
            Err(e) => {
                log::warn!("ignoring saved flags for block {}: {}", block_id, e);
                None
            }
        }
    }

    pub fn save_flags(&self, block_id: &str, flags: &[bool]) {
        match serde_json::to_string(flags) {
            Ok(raw) => self.write(&flags_key(block_id), &raw),
            Err(e) => log::warn!("could not encode flags for block {}: {}", block_id, e),
        }
    }

    pub fn is_answered(&self, block_id: &str, question_id: &str) -> bool {
        self.read(&answered_key(block_id, question_id)).is_some()
    }

    pub fn mark_answered(&self, block_id: &str, question_id: &str) {
        self.write(&answered_key(block_id, question_id), "1");
    }

    pub fn draft(&self, question_id: &str) -> Option<Answer> {
        let raw = self.read(&draft_key(question_id))?;
        match serde_json::from_str(&raw) {
            Ok(answer) => Some(answer),
            Err(e) => {
                log::warn!("ignoring draft for question {}: {}", question_id, e);
                None
            }
        }
    }

    pub fn save_draft(&self, question_id: &str, answer: &Answer) {
        match serde_json::to_string(answer) {
            Ok(raw) => self.write(&draft_key(question_id), &raw),
            Err(e) => log::warn!("could not encode draft for question {}: {}", question_id, e),
        }
    }

    pub fn clear_draft(&self, question_id: &str) {
        self.delete(&draft_key(question_id));
    }

    /// Forgets position, flags and answered markers of a block.
    pub fn clear_block(&self, block_id: &str, question_ids: &[&str]) {
        self.delete(&position_key(block_id));
        self.delete(&flags_key(block_id));
        for question_id in question_ids {
            self.delete(&answered_key(block_id, question_id));
        }
    }
}
