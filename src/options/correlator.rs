/// Per-instrument option chain correlation
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, ScanError};
use crate::nse::{NseClient, Session};
use crate::options::chain::{OptionChainResult, OptionChainSnapshot};
use crate::options::ranking::nearest_opened_at_extreme_strikes;
use crate::types::OptionSide;

/// Override if it is one of the listed expiries, otherwise the nearest one.
///
/// A stale or mistyped override falls back silently instead of failing the row.
pub fn select_expiry(all_expiries: &[String], expiry_override: Option<&str>) -> Option<String> {
    expiry_override
        .filter(|wanted| all_expiries.iter().any(|e| e == wanted))
        .map(str::to_string)
        .or_else(|| all_expiries.first().cloned())
}

/// Chains contract metadata → expiry selection → option chain for one symbol.
///
/// Every failure ends in `OptionChainResult::Failed` on that row only.
pub struct OptionChainCorrelator {
    client: Arc<NseClient>,
}

impl OptionChainCorrelator {
    pub fn new(client: Arc<NseClient>) -> Self {
        Self { client }
    }

    /// Expiry list for a symbol; an empty list is `NoExpiryDates`
    pub async fn resolve_expiries(&self, session: &Session, symbol: &str) -> Result<Vec<String>> {
        let expiries = self.client.fetch_expiry_dates(session, symbol).await?;
        if expiries.is_empty() {
            return Err(ScanError::NoExpiryDates(symbol.to_string()));
        }
        Ok(expiries)
    }

    pub async fn correlate(
        &self,
        session: &Session,
        symbol: Option<&str>,
        expiry_override: Option<&str>,
        side: OptionSide,
    ) -> OptionChainResult {
        let Some(symbol) = symbol else {
            return OptionChainResult::failed(&ScanError::NoSymbol, None);
        };

        let all_expiries = match self.resolve_expiries(session, symbol).await {
            Ok(expiries) => expiries,
            Err(e) => {
                warn!("⚠️  {} expiries unavailable: {} ({})", symbol, e, e.error_code());
                return OptionChainResult::failed(&e, None);
            }
        };

        let Some(expiry) = select_expiry(&all_expiries, expiry_override) else {
            return OptionChainResult::failed(
                &ScanError::EmptyExpirySelection(symbol.to_string()),
                None,
            );
        };

        let payload = match self.client.fetch_option_chain(session, symbol, &expiry).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("⚠️  {} option chain for {} failed: {} ({})", symbol, expiry, e, e.error_code());
                return OptionChainResult::failed(&e, Some(expiry));
            }
        };

        let chain = OptionChainSnapshot::from_payload(&payload, expiry, all_expiries);
        let nearest_strikes = nearest_opened_at_extreme_strikes(&chain, side);

        debug!(
            "{} {} @ {}: {} strikes, {} opened at low",
            symbol,
            side.as_str(),
            chain.expiry,
            chain.records.len(),
            nearest_strikes.len()
        );

        OptionChainResult::Resolved {
            chain,
            side,
            nearest_strikes,
        }
    }
}
