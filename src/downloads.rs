use crate::types::generated::GeneratedEpw;
use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long a generated file stays available for download.
pub const DEFAULT_DOWNLOAD_TTL: Duration = Duration::from_secs(30 * 60);
/// Most generated files held at once; the oldest is dropped first.
pub const DEFAULT_DOWNLOAD_CAPACITY: usize = 32;

struct Shelved {
    token: String,
    stored_at: Instant,
    epw: Arc<GeneratedEpw>,
}

/// Recently generated EPW files, keyed by an unguessable token.
///
/// Entries are kept in insertion order, so expiry and the capacity bound both
/// drop from the front. A file can be fetched any number of times until it
/// expires or is pushed out.
pub struct DownloadShelf {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<VecDeque<Shelved>>,
}

impl DownloadShelf {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `epw` and returns the token it can be fetched with.
    pub fn put(&self, epw: Arc<GeneratedEpw>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_expired(&mut entries);
        while entries.len() >= self.capacity {
            if let Some(dropped) = entries.pop_front() {
                debug!("Download shelf full, dropping {}", dropped.epw.file_name);
            }
        }
        entries.push_back(Shelved {
            token: token.clone(),
            stored_at: Instant::now(),
            epw,
        });
        token
    }

    pub fn get(&self, token: &str) -> Option<Arc<GeneratedEpw>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_expired(&mut entries);
        entries
            .iter()
            .find(|e| e.token == token)
            .map(|e| Arc::clone(&e.epw))
    }

    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_expired(&mut entries);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_expired(&self, entries: &mut VecDeque<Shelved>) {
        while entries
            .front()
            .is_some_and(|e| e.stored_at.elapsed() >= self.ttl)
        {
            entries.pop_front();
        }
    }
}

impl Default for DownloadShelf {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOAD_CAPACITY, DEFAULT_DOWNLOAD_TTL)
    }
}
