/// Movers → filter → option chain correlation pipeline
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::data::{extract_rows, filter_open_at_extreme, MoverRow};
use crate::error::{Result, ScanError};
use crate::nse::{NseClient, Session};
use crate::options::{select_expiry, OptionChainCorrelator};
use crate::pipeline::report::MoversReport;
use crate::time::{is_market_open, now_ist};
use crate::types::{Config, MoverCategory, OptionSide};

pub struct MoversPipeline {
    config: Config,
    client: Arc<NseClient>,
    correlator: OptionChainCorrelator,
}

impl MoversPipeline {
    pub fn new(config: Config) -> Self {
        let client = Arc::new(NseClient::new(&config));
        Self::with_client(config, client)
    }

    pub fn with_client(config: Config, client: Arc<NseClient>) -> Self {
        let correlator = OptionChainCorrelator::new(Arc::clone(&client));
        MoversPipeline {
            config,
            client,
            correlator,
        }
    }

    /// Full run on a fresh session, disposed on every exit path.
    ///
    /// Only a failed gainers or losers fetch aborts the run; everything after
    /// that degrades per row.
    pub async fn run(&self, expiry_override: Option<&str>) -> Result<MoversReport> {
        let session = Session::create(&self.config).await?;
        let result = self.run_with_session(&session, expiry_override).await;
        session.dispose();
        result
    }

    pub async fn run_with_session(
        &self,
        session: &Session,
        expiry_override: Option<&str>,
    ) -> Result<MoversReport> {
        let now = Utc::now();
        let market_open = is_market_open(now);
        if !market_open {
            warn!("Market is closed - movers reflect the last session");
        }

        // Step 1: movers lists (fatal on failure)
        info!("📥 Step 1/3: Fetching gainers and losers...");
        let gainers_payload = self.fetch_movers(session, MoverCategory::Gainers).await?;
        let losers_payload = self.fetch_movers(session, MoverCategory::Losers).await?;

        let mut gainers = filter_open_at_extreme(
            extract_rows(&gainers_payload),
            MoverCategory::Gainers.extreme(),
        );
        let mut losers = filter_open_at_extreme(
            extract_rows(&losers_payload),
            MoverCategory::Losers.extreme(),
        );
        info!(
            "✅ {} gainers with open = low, {} losers with open = high",
            gainers.len(),
            losers.len()
        );

        // Step 2: shared expiry list
        info!("🎯 Step 2/3: Resolving expiries...");
        let available_expiries = self.resolve_shared_expiries(session, &gainers, &losers).await;
        let selected_expiry = select_expiry(&available_expiries, expiry_override);
        if let (Some(wanted), Some(selected)) = (expiry_override, selected_expiry.as_deref()) {
            if wanted != selected {
                warn!("Requested expiry {} not listed, using {}", wanted, selected);
            }
        }

        // Step 3: per-row option chains
        info!(
            "📥 Step 3/3: Correlating option chains for {} symbols (expiry: {})...",
            gainers.len() + losers.len(),
            selected_expiry.as_deref().unwrap_or("per-symbol nearest")
        );
        let expiry = selected_expiry.as_deref();
        self.correlate_rows(session, &mut gainers, expiry, MoverCategory::Gainers.option_side())
            .await;
        self.correlate_rows(session, &mut losers, expiry, MoverCategory::Losers.option_side())
            .await;

        let report = MoversReport {
            gainers,
            losers,
            available_expiries,
            selected_expiry,
            fetched_at: now_ist(now),
            market_open,
        };

        info!(
            "✅ Scan complete: {} option chains resolved, {} failed",
            report.resolved_count(),
            report.failed_count()
        );
        Ok(report)
    }

    async fn fetch_movers(&self, session: &Session, category: MoverCategory) -> Result<Value> {
        self.client
            .fetch_movers(session, category)
            .await
            .map_err(|e| ScanError::MoversUnavailable {
                category,
                source: Box::new(e),
            })
    }

    /// F&O stocks share expiries, so one lookup on the first filtered symbol
    /// serves the whole report. Failure leaves the list empty.
    async fn resolve_shared_expiries(
        &self,
        session: &Session,
        gainers: &[MoverRow],
        losers: &[MoverRow],
    ) -> Vec<String> {
        let Some(symbol) = gainers
            .iter()
            .chain(losers.iter())
            .find_map(|row| row.symbol.as_deref())
        else {
            info!("No filtered symbols - skipping expiry lookup");
            return Vec::new();
        };

        match self.correlator.resolve_expiries(session, symbol).await {
            Ok(expiries) => {
                info!("✅ {} expiries via {} (nearest: {})", expiries.len(), symbol, expiries[0]);
                expiries
            }
            Err(e) => {
                warn!("⚠️  Shared expiry lookup via {} failed: {}", symbol, e);
                Vec::new()
            }
        }
    }

    /// Correlate rows on a bounded pool; the shared rate limiter paces the
    /// requests and results are attached in row order.
    async fn correlate_rows(
        &self,
        session: &Session,
        rows: &mut [MoverRow],
        expiry: Option<&str>,
        side: OptionSide,
    ) {
        let symbols: Vec<Option<String>> = rows.iter().map(|row| row.symbol.clone()).collect();

        let results: Vec<_> = stream::iter(symbols)
            .map(move |symbol| async move {
                self.correlator
                    .correlate(session, symbol.as_deref(), expiry, side)
                    .await
            })
            .buffered(self.config.max_concurrent_symbols.max(1))
            .collect()
            .await;

        for (row, result) in rows.iter_mut().zip(results) {
            row.attach_option_chain(result);
        }
    }
}
