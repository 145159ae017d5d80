//! Portfolio session state
//!
//! The session is the only owner of the displayed portfolio. Loads go
//! through a [`LoadGuard`]: at most one load is in flight, and the entry
//! vector is swapped in whole when the load commits.
//!
//! ```text
//! Empty ──begin_load──> Loading ──commit──> Loaded
//!   ^                      │                  │
//!   └───── clear ──────────┼──────────────────┘
//!          (guard dropped: back to previous state)
//! ```

use crate::error::{AppError, Result};
use crate::portfolio::types::PortfolioEntry;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Empty,
    Loading,
    Loaded,
}

/// Immutable view of the session
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub batch_id: Option<Uuid>,
    pub entries: Arc<Vec<PortfolioEntry>>,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }
}

#[derive(Debug)]
struct SessionInner {
    status: SessionStatus,
    batch_id: Option<Uuid>,
    entries: Arc<Vec<PortfolioEntry>>,
    last_error: Option<String>,
}

/// Portfolio session shared by the pipeline operations
#[derive(Debug)]
pub struct PortfolioSession {
    inner: RwLock<SessionInner>,
}

impl Default for PortfolioSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PortfolioSession {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionInner {
                status: SessionStatus::Empty,
                batch_id: None,
                entries: Arc::new(Vec::new()),
                last_error: None,
            }),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.read().status
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read();
        SessionSnapshot {
            status: inner.status,
            batch_id: inner.batch_id,
            entries: inner.entries.clone(),
            last_error: inner.last_error.clone(),
        }
    }

    /// Enter `Loading`. Fails with [`AppError::Busy`] if a load is in flight.
    pub fn begin_load(&self) -> Result<LoadGuard<'_>> {
        let mut inner = self.inner.write();
        if inner.status == SessionStatus::Loading {
            return Err(AppError::Busy);
        }

        let previous = inner.status;
        inner.status = SessionStatus::Loading;
        tracing::debug!("Session {:?} -> Loading", previous);

        Ok(LoadGuard {
            session: self,
            previous,
            entries: inner.entries.clone(),
            committed: false,
        })
    }

    /// Record an upload-level error without changing state
    pub fn record_error(&self, message: impl Into<String>) {
        self.inner.write().last_error = Some(message.into());
    }

    /// Discard the portfolio. Fails with [`AppError::Busy`] while loading.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.status == SessionStatus::Loading {
            return Err(AppError::Busy);
        }

        inner.status = SessionStatus::Empty;
        inner.batch_id = None;
        inner.entries = Arc::new(Vec::new());
        inner.last_error = None;
        tracing::info!("Portfolio cleared");
        Ok(())
    }
}

/// Exclusive right to replace the session's entries
#[derive(Debug)]
pub struct LoadGuard<'a> {
    session: &'a PortfolioSession,
    previous: SessionStatus,
    entries: Arc<Vec<PortfolioEntry>>,
    committed: bool,
}

impl<'a> LoadGuard<'a> {
    /// Entries as they were when the load began
    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    pub fn previous_status(&self) -> SessionStatus {
        self.previous
    }

    /// Replace all entries and enter `Loaded`
    pub fn commit(mut self, entries: Vec<PortfolioEntry>) -> SessionSnapshot {
        {
            let mut inner = self.session.inner.write();
            let batch_id = entries.first().map(|e| e.batch_id).or(inner.batch_id);
            inner.batch_id = batch_id;
            inner.entries = Arc::new(entries);
            inner.status = SessionStatus::Loaded;
            inner.last_error = None;
        }
        self.committed = true;
        self.session.snapshot()
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            let mut inner = self.session.inner.write();
            inner.status = self.previous;
            tracing::debug!("Load abandoned, session back to {:?}", self.previous);
        }
    }
}
