//! Alma payment provider implementation
//!
//! HTTP client for the Alma REST API. Requests are authenticated with the
//! merchant API key; test mode talks to the sandbox environment and prefers
//! the test key stored in the module configuration over `ALMA_API_KEY`.

use crate::database::repository::ConfigurationStore;
use crate::error::{AppError, ExternalError, ProviderResult};
use crate::payments::settings;
use crate::payments::traits::AlmaApi;
use crate::payments::types::{Eligibility, PaymentPayload, PaymentSession};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const PROVIDER: &str = "Alma";

/// API environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlmaMode {
    Test,
    Live,
}

impl AlmaMode {
    pub fn base_url(&self) -> &'static str {
        match self {
            AlmaMode::Test => "https://api.sandbox.getalma.eu",
            AlmaMode::Live => "https://api.getalma.eu",
        }
    }
}

impl fmt::Display for AlmaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlmaMode::Test => write!(f, "test"),
            AlmaMode::Live => write!(f, "live"),
        }
    }
}

impl FromStr for AlmaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "sandbox" => Ok(AlmaMode::Test),
            "live" | "production" => Ok(AlmaMode::Live),
            other => Err(format!("unknown Alma mode '{}'", other)),
        }
    }
}

/// Alma provider configuration
#[derive(Debug, Clone)]
pub struct AlmaConfig {
    /// Merchant API key. May be blank in test mode when the key is stored
    /// in the module configuration instead.
    pub api_key: String,
    pub mode: AlmaMode,
    /// Overrides the base URL derived from `mode`
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AlmaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            mode: AlmaMode::Test,
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl AlmaConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let mode = match std::env::var("ALMA_MODE") {
            Ok(value) => value.parse().map_err(AppError::configuration)?,
            Err(_) => AlmaMode::Test,
        };

        let api_key = match (std::env::var("ALMA_API_KEY"), mode) {
            (Ok(key), _) => key,
            (Err(_), AlmaMode::Test) => String::new(),
            (Err(_), AlmaMode::Live) => {
                return Err(AppError::configuration(
                    "ALMA_API_KEY environment variable is required in live mode",
                ))
            }
        };

        let base_url = std::env::var("ALMA_BASE_URL").ok().filter(|s| !s.trim().is_empty());

        let timeout_secs = std::env::var("ALMA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            api_key,
            mode,
            base_url,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.mode.base_url())
            .trim_end_matches('/')
    }
}

/// Alma payment provider
pub struct AlmaProvider {
    config: AlmaConfig,
    client: Client,
    key_store: Option<Arc<dyn ConfigurationStore>>,
}

impl AlmaProvider {
    /// Create a new Alma provider instance. No request is sent until one of
    /// the [`AlmaApi`] methods is called.
    pub fn new(config: AlmaConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("alma-checkout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExternalError::Network {
                service: PROVIDER.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        info!(
            "Alma client initialized in {} mode with URL: {}",
            config.mode,
            config.base_url()
        );

        Ok(Self {
            config,
            client,
            key_store: None,
        })
    }

    /// Look up the administrator's test key in `store` before each request
    /// made in test mode
    pub fn with_key_store(mut self, store: Arc<dyn ConfigurationStore>) -> Self {
        self.key_store = Some(store);
        self
    }

    pub fn mode(&self) -> AlmaMode {
        self.config.mode
    }

    async fn api_key(&self) -> ProviderResult<String> {
        if let (AlmaMode::Test, Some(store)) = (self.config.mode, &self.key_store) {
            let stored = settings::stored_test_key(store.as_ref())
                .await
                .map_err(|e| ExternalError::Credentials {
                    service: PROVIDER.to_string(),
                    message: format!("failed to read the stored test key: {}", e),
                })?;

            if let Some(key) = stored {
                return Ok(key);
            }
        }

        if self.config.api_key.trim().is_empty() {
            return Err(ExternalError::Credentials {
                service: PROVIDER.to_string(),
                message: format!("no API key configured for {} mode", self.config.mode),
            });
        }

        Ok(self.config.api_key.clone())
    }

    /// Make an authenticated request to the Alma API. Single attempt.
    async fn make_request<T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&PaymentPayload>,
    ) -> ProviderResult<T>
    where
        T: DeserializeOwned,
    {
        let api_key = self.api_key().await?;
        let url = format!("{}{}", self.config.base_url(), endpoint);
        debug!("Alma request: {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Alma-Auth {}", api_key));

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ExternalError::Timeout {
                    service: PROVIDER.to_string(),
                    seconds: self.config.timeout_secs,
                }
            } else {
                ExternalError::Network {
                    service: PROVIDER.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| ExternalError::Network {
            service: PROVIDER.to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            let err = parse_error_body(status.as_u16(), &response_text);
            error!("Alma API error on {}: {}", endpoint, err);
            return Err(err);
        }

        serde_json::from_str::<T>(&response_text).map_err(|e| {
            error!("Failed to parse Alma response: {}", e);
            ExternalError::InvalidResponse {
                service: PROVIDER.to_string(),
                message: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl AlmaApi for AlmaProvider {
    async fn eligibility(&self, payload: &PaymentPayload) -> ProviderResult<Eligibility> {
        info!(
            "Checking Alma eligibility: purchase_amount={}",
            payload.payment.purchase_amount
        );

        let eligibility: Eligibility = self
            .make_request(Method::POST, "/v1/payments/eligibility", Some(payload))
            .await?;

        info!("Alma eligibility result: eligible={}", eligibility.eligible);
        Ok(eligibility)
    }

    async fn create_payment(&self, payload: &PaymentPayload) -> ProviderResult<PaymentSession> {
        info!(
            "Creating Alma payment: purchase_amount={}",
            payload.payment.purchase_amount
        );

        let session: PaymentSession = self
            .make_request(Method::POST, "/v1/payments", Some(payload))
            .await?;

        info!("Alma payment created: id={}", session.id);
        Ok(session)
    }

    async fn fetch_payment(&self, id: &str) -> ProviderResult<PaymentSession> {
        validate_payment_id(id)?;
        info!("Fetching Alma payment: id={}", id);

        let session: PaymentSession = self
            .make_request(Method::GET, &format!("/v1/payments/{}", id), None)
            .await?;

        info!("Alma payment fetched: id={}, state={:?}", session.id, session.state);
        Ok(session)
    }
}

/// Payment ids are placed in the request path, so only plain identifiers
/// (`payment_11ugKd...`) are accepted.
fn validate_payment_id(id: &str) -> ProviderResult<()> {
    let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        warn!("Rejected malformed Alma payment id: {:?}", id);
        return Err(ExternalError::InvalidRequest {
            service: PROVIDER.to_string(),
            message: "malformed payment id".to_string(),
        });
    }

    Ok(())
}

// Alma error body: either a list of errors or a single message
#[derive(Debug, Default, Deserialize)]
struct AlmaErrorBody {
    #[serde(default)]
    errors: Vec<AlmaErrorEntry>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AlmaErrorEntry {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl AlmaErrorEntry {
    fn describe(&self) -> Option<String> {
        let text = self.message.clone().or_else(|| self.error_code.clone())?;
        Some(match &self.field {
            Some(field) => format!("{}: {}", field, text),
            None => text,
        })
    }
}

fn parse_error_body(status: u16, body: &str) -> ExternalError {
    let parsed: AlmaErrorBody = serde_json::from_str(body).unwrap_or_default();
    let details: Vec<String> = parsed.errors.iter().filter_map(AlmaErrorEntry::describe).collect();

    let message = parsed
        .message
        .or_else(|| details.first().cloned())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.to_string()
            }
        });

    ExternalError::PaymentProvider {
        provider: PROVIDER.to_string(),
        status,
        message,
        details,
    }
}
