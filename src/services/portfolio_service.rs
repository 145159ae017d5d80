//! Portfolio Service
//!
//! Runs the upload pipeline (parse, extract, fetch, merge) and refreshes
//! against a [`PortfolioSession`]. The pipeline steps themselves are pure;
//! this service owns the state transitions.

use crate::error::Result;
use crate::portfolio::types::RawRecord;
use crate::portfolio::{csv, merge, symbols};
use crate::services::quotes_service::{QuoteSource, QuotesService};
use crate::state::{PortfolioSession, SessionSnapshot};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Portfolio service for business logic
pub struct PortfolioService;

impl PortfolioService {
    /// Load a new portfolio from CSV text, replacing any current one.
    ///
    /// `MalformedInput` and `NoSymbolColumn` abort before the session
    /// enters `Loading`; the message is recorded as the session's last
    /// error. Per-symbol fetch failures never abort the upload.
    pub async fn upload(
        session: &PortfolioSession,
        source: &dyn QuoteSource,
        text: &str,
    ) -> Result<SessionSnapshot> {
        Self::upload_parsed(session, source, csv::parse(text)).await
    }

    /// Same as [`upload`](Self::upload), reading the CSV from disk.
    /// A read failure is treated like any other upload-level error.
    pub async fn upload_file(
        session: &PortfolioSession,
        source: &dyn QuoteSource,
        path: &Path,
    ) -> Result<SessionSnapshot> {
        info!("Loading portfolio from {}", path.display());
        Self::upload_parsed(session, source, csv::load_csv_file(path)).await
    }

    async fn upload_parsed(
        session: &PortfolioSession,
        source: &dyn QuoteSource,
        parsed: Result<Vec<RawRecord>>,
    ) -> Result<SessionSnapshot> {
        let prepared = parsed.and_then(|records| {
            let symbols = symbols::extract_symbols(&records)?;
            Ok((records, symbols))
        });

        let (records, symbols) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("Upload rejected: {}", e);
                session.record_error(e.to_string());
                return Err(e);
            }
        };

        let guard = session.begin_load()?;
        info!("PortfolioService::upload - {} rows, {} symbols", records.len(), symbols.len());

        let results = QuotesService::fetch_quotes(source, &symbols).await;
        let batch_id = Uuid::new_v4();
        let entries = merge::merge(&records, &symbols, &results, batch_id);

        let failed = entries.iter().filter(|e| e.error.is_some()).count();
        info!("Loaded batch {}: {} entries, {} failed", batch_id, entries.len(), failed);

        Ok(guard.commit(entries))
    }

    /// Re-fetch quotes for the current portfolio.
    ///
    /// A symbol whose refresh fails keeps its previous values. An empty
    /// session is returned unchanged.
    pub async fn refresh(
        session: &PortfolioSession,
        source: &dyn QuoteSource,
    ) -> Result<SessionSnapshot> {
        let guard = session.begin_load()?;
        if guard.entries().is_empty() {
            drop(guard);
            return Ok(session.snapshot());
        }

        let symbols: Vec<_> = guard.entries().iter().map(|e| e.symbol.clone()).collect();
        let results = QuotesService::fetch_quotes(source, &symbols).await;

        let skipped = results.iter().filter(|r| !r.is_success()).count();
        if skipped > 0 {
            warn!("Refresh kept previous values for {} symbols", skipped);
        }

        // Load-time errors survive a successful refresh; the table shows
        // those rows as StaleError
        let entries = merge::refresh_entries(guard.entries(), &results);
        Ok(guard.commit(entries))
    }

    pub fn clear(session: &PortfolioSession) -> Result<()> {
        session.clear()
    }
}
