use crate::payments::providers::{AlmaConfig, AlmaMode};
use crate::payments::session::RedirectUrls;
use anyhow::{anyhow, Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub alma: AlmaConfig,
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    /// Order status recorded after a confirmed payment
    pub order_status_id: i32,
}

impl CheckoutConfig {
    pub fn redirect_urls(&self) -> RedirectUrls {
        RedirectUrls {
            return_url: self.return_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
        };

        let alma = AlmaConfig::from_env().map_err(|e| anyhow!("{}", e))?;

        let checkout = CheckoutConfig {
            return_url: optional_var("ALMA_RETURN_URL"),
            cancel_url: optional_var("ALMA_CANCEL_URL"),
            order_status_id: env::var("ALMA_ORDER_STATUS_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("ALMA_ORDER_STATUS_ID must be a valid number")?,
        };

        let config = Config {
            server,
            database,
            alma,
            checkout,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port < 1024 {
            return Err(anyhow!(
                "Port must be at least 1024, got {}",
                self.server.port
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.server.environment.as_str()) {
            return Err(anyhow!(
                "Environment must be one of: {:?}, got {}",
                valid_environments,
                self.server.environment
            ));
        }

        if self.database.url.trim().is_empty() {
            return Err(anyhow!("DATABASE_URL cannot be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow!("DATABASE_MAX_CONNECTIONS must be greater than 0"));
        }

        // Test mode may rely on the key stored in the module configuration
        if self.alma.mode == AlmaMode::Live && self.alma.api_key.trim().is_empty() {
            return Err(anyhow!("ALMA_API_KEY cannot be empty in live mode"));
        }

        if self.alma.timeout_secs == 0 {
            return Err(anyhow!("ALMA_TIMEOUT_SECS must be greater than 0"));
        }

        for (name, url) in [
            ("ALMA_RETURN_URL", &self.checkout.return_url),
            ("ALMA_CANCEL_URL", &self.checkout.cancel_url),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(anyhow!("{} must be an http(s) URL, got {}", name, url));
                }
            }
        }

        Ok(())
    }
}
