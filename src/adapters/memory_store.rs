//! In-memory storage adapter.
//!
//! Implements [`StoragePort`] over a `HashMap` keyed by `namespace::key`.
//! Stands in for EEPROM on the host; contents vanish with the process.

use std::collections::HashMap;

use log::debug;

use crate::app::ports::StoragePort;
use crate::error::StorageError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    store: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }
}

impl StoragePort for MemoryStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&Self::composite_key(namespace, key)) {
            Some(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        debug!("MemoryStore: {}::{} <- {} bytes", namespace, key, data.len());
        self.store
            .insert(Self::composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&Self::composite_key(namespace, key))
    }
}
