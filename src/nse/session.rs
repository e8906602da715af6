/// Anonymous NSE session: cookie jar plus browser-like default headers
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, ScanError};
use crate::types::Config;

/// Shared, read-only handle used by every fetch of one pipeline run
pub struct Session {
    id: Uuid,
    http: Client,
    jar: Arc<Jar>,
    root: Url,
    created_at: Instant,
}

impl Session {
    /// Build the cookie-backed client and warm it up with a GET of the site root.
    ///
    /// A failed warm-up still yields a usable session; later calls then go out
    /// as guest requests and any rejection surfaces through the fetcher.
    pub async fn create(config: &Config) -> Result<Self> {
        let session = Self::new(config)?;

        match session.http.get(session.root.clone()).send().await {
            Ok(response) => {
                info!(
                    session = %session.id,
                    status = response.status().as_u16(),
                    cookies = session.has_cookies(),
                    "🔑 NSE session warmed up"
                );
            }
            Err(e) => {
                warn!(session = %session.id, "Session warm-up failed, continuing as guest: {}", e);
            }
        }

        Ok(session)
    }

    /// Build the session without touching the network
    pub fn new(config: &Config) -> Result<Self> {
        let root = Url::parse(config.api_root())
            .map_err(|e| ScanError::ConfigError(format!("Invalid base_url {}: {}", config.base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .default_headers(default_headers(config)?)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Session {
            id: Uuid::new_v4(),
            http,
            jar,
            root,
            created_at: Instant::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Whether the upstream has set any cookie for the site root
    pub fn has_cookies(&self) -> bool {
        self.jar.cookies(&self.root).is_some()
    }

    /// Release the client and its cookie jar. Never fails.
    pub fn dispose(self) {
        let has_cookies = self.has_cookies();
        let age = self.created_at.elapsed();
        drop(self.http);
        drop(self.jar);
        info!(
            session = %self.id,
            cookies = has_cookies,
            "Session disposed after {:.1}s",
            age.as_secs_f64()
        );
    }
}

fn default_headers(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in [
        (USER_AGENT, &config.user_agent),
        (ACCEPT, &config.accept),
        (ACCEPT_LANGUAGE, &config.accept_language),
        (REFERER, &config.referer),
    ] {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ScanError::ConfigError(format!("Invalid {} header: {}", name, e)))?;
        headers.insert(name, value);
    }
    debug!("Default headers: {:?}", headers.keys().collect::<Vec<_>>());
    Ok(headers)
}
