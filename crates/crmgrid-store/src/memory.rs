// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::SettingsStore;

/// Process-local store for tests and demo sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::SettingsStore;
    use anyhow::Result;

    #[test]
    fn update_sees_previous_value() -> Result<()> {
        let store = MemoryStore::with_entry("doc", "1");
        store.update("doc", &mut |current| {
            Ok(format!("{}+1", current.unwrap_or("0")))
        })?;
        assert_eq!(store.read("doc")?.as_deref(), Some("1+1"));
        Ok(())
    }

    #[test]
    fn failed_update_leaves_value_untouched() -> Result<()> {
        let store = MemoryStore::with_entry("doc", "keep");
        let result = store.update("doc", &mut |_| anyhow::bail!("refuse"));
        assert!(result.is_err());
        assert_eq!(store.read("doc")?.as_deref(), Some("keep"));
        Ok(())
    }

    #[test]
    fn remove_reports_presence() -> Result<()> {
        let store = MemoryStore::with_entry("doc", "{}");
        assert!(store.remove("doc")?);
        assert!(!store.remove("doc")?);
        assert!(store.is_empty());
        Ok(())
    }
}
