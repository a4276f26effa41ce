use crate::session::file::VideoFile;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Hands out preview resources and tracks which ones are still alive.
///
/// Every [`PreviewHandle`] checked out of the pool is released exactly once,
/// when the handle is dropped.
#[derive(Clone, Default)]
pub struct PreviewPool {
    ledger: Arc<Mutex<PreviewLedger>>,
}

#[derive(Default)]
struct PreviewLedger {
    next_id: u64,
    live: Vec<u64>,
    acquired: usize,
    released: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewCounts {
    pub acquired: usize,
    pub released: usize,
    pub live: usize,
}

impl PreviewPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PreviewLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds a fresh preview resource to `file`.
    pub fn checkout(&self, file: &VideoFile) -> PreviewHandle {
        let id = {
            let mut ledger = self.lock();
            ledger.next_id += 1;
            let id = ledger.next_id;
            ledger.live.push(id);
            ledger.acquired += 1;
            id
        };
        PreviewHandle {
            id,
            uri: format!("preview://{}/{}", id, file.name()),
            pool: self.clone(),
        }
    }

    fn release(&self, id: u64) {
        let mut ledger = self.lock();
        if let Some(pos) = ledger.live.iter().position(|&live| live == id) {
            ledger.live.swap_remove(pos);
            ledger.released += 1;
        }
    }

    pub fn is_live(&self, id: u64) -> bool {
        self.lock().live.contains(&id)
    }

    pub fn counts(&self) -> PreviewCounts {
        let ledger = self.lock();
        PreviewCounts {
            acquired: ledger.acquired,
            released: ledger.released,
            live: ledger.live.len(),
        }
    }
}

/// Scoped preview resource for the currently selected video.
pub struct PreviewHandle {
    id: u64,
    uri: String,
    pool: PreviewPool,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("id", &self.id)
            .field("uri", &self.uri)
            .finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}
