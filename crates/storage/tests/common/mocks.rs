use async_trait::async_trait;
use bytes::Bytes;
use leadline_storage::error::{StorageError, StorageResult};
use leadline_storage::traits::ObjectStore;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory backend that counts writes and can be switched into a failing
/// state to exercise error paths of callers.
#[derive(Default)]
pub struct InMemoryBackend {
    objects: Mutex<BTreeMap<String, Bytes>>,
    pub puts: AtomicUsize,
    pub deletes: AtomicUsize,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with an I/O error.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other(
                "in-memory backend failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryBackend {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.check()?;
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.check()?;
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.check()?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.check()
    }
}
