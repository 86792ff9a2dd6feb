#![allow(dead_code)]

//! Bounded LRU cache of job-description embeddings.
//!
//! Search queries are job descriptions in miniature; embedding the same one
//! repeatedly is pure waste, and an unbounded cache of 768-float vectors is
//! a memory leak. Capacity comes from configuration; eviction is strictly
//! least-recently-used and `get` promotes.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct JobEntry {
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}

pub struct JobCache {
    inner: Mutex<LruCache<String, JobEntry>>,
}

impl JobCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn store(&self, job_id: &str, entry: JobEntry) {
        let mut cache = self.inner.lock().expect("job cache poisoned");
        if let Some((evicted, _)) = cache.push(job_id.to_string(), entry) {
            if evicted != job_id {
                debug!(evicted_job_id = %evicted, "job cache full, evicted LRU entry");
            }
        }
    }

    /// Retrieves an entry, promoting it to most-recently-used.
    pub fn get(&self, job_id: &str) -> Option<JobEntry> {
        self.inner
            .lock()
            .expect("job cache poisoned")
            .get(job_id)
            .cloned()
    }

    pub fn delete(&self, job_id: &str) {
        self.inner.lock().expect("job cache poisoned").pop(job_id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("job cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
