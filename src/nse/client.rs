/// NSE market-data REST client
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{truncate_body, Result, ScanError};
use crate::nse::Session;
use crate::types::{Config, MoverCategory};
use crate::utils::RateLimiter;

const MOVERS_PATH: &str = "/api/live-analysis-variations";
const CONTRACT_INFO_PATH: &str = "/api/option-chain-contract-info";
const OPTION_CHAIN_PATH: &str = "/api/option-chain-v3";

/// Session-bound, rate-limited fetcher for the three NSE endpoints.
///
/// Every call takes one limiter permit, so concurrent callers share a single
/// request budget. Calls are never retried.
pub struct NseClient {
    api_root: String,
    timeout: Duration,
    limiter: Arc<RateLimiter>,
}

impl NseClient {
    pub fn new(config: &Config) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_interval(),
        ));
        Self::with_limiter(config, limiter)
    }

    pub fn with_limiter(config: &Config, limiter: Arc<RateLimiter>) -> Self {
        NseClient {
            api_root: config.api_root().to_string(),
            timeout: config.request_timeout(),
            limiter,
        }
    }

    /// GET `path` with `query` and decode the body as JSON
    pub async fn fetch_json(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.api_root, path);
        debug!(session = %session.id(), "GET {} {:?}", url, query);

        let response = session
            .http()
            .get(&url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            debug!("{} returned {}", url, status);
            return Err(ScanError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ScanError::Decode {
            message: e.to_string(),
            body: truncate_body(&body),
        })
    }

    /// Gainers or losers snapshot
    pub async fn fetch_movers(&self, session: &Session, category: MoverCategory) -> Result<Value> {
        self.fetch_json(session, MOVERS_PATH, &[("index", category.index_param())])
            .await
    }

    /// Expiry dates for a symbol, nearest first. Missing `expiryDates` yields an
    /// empty list; the caller decides whether that is a failure.
    pub async fn fetch_expiry_dates(&self, session: &Session, symbol: &str) -> Result<Vec<String>> {
        let payload = self
            .fetch_json(session, CONTRACT_INFO_PATH, &[("symbol", symbol)])
            .await?;
        Ok(expiry_dates(&payload))
    }

    /// Option chain snapshot for one symbol and expiry
    pub async fn fetch_option_chain(
        &self,
        session: &Session,
        symbol: &str,
        expiry: &str,
    ) -> Result<Value> {
        self.fetch_json(
            session,
            OPTION_CHAIN_PATH,
            &[("type", "Equity"), ("symbol", symbol), ("expiry", expiry)],
        )
        .await
    }
}

/// `expiryDates` of a contract-info payload; non-string entries are skipped
pub fn expiry_dates(payload: &Value) -> Vec<String> {
    payload
        .get("expiryDates")
        .and_then(Value::as_array)
        .map(|dates| {
            dates
                .iter()
                .filter_map(Value::as_str)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
