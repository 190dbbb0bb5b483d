use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::api_connection::endpoints::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::api_connection::Provider;
use crate::gateway::{AiGateway, GeminiGateway, ScriptedGateway};
use crate::media::{ImageSize, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH};

pub const DEFAULT_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name of the variable holding the key. The key itself is read per request.
    pub api_key_env_var: String,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub image_size: ImageSize,
    /// Serve canned answers instead of calling the API.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key_env_var: DEFAULT_API_KEY_ENV_VAR.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            image_size: ImageSize::default(),
            offline: false,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: '{}'", name, raw)),
        _ => Ok(default),
    }
}

impl Config {
    /// Loads `.env` if present, then reads `SHEFI_*` settings.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let config = Config {
            api_key_env_var: env_or("SHEFI_API_KEY_VAR", DEFAULT_API_KEY_ENV_VAR),
            model: env_or("SHEFI_MODEL", DEFAULT_MODEL),
            api_base: env_or("SHEFI_API_BASE", DEFAULT_API_BASE),
            timeout_secs: env_parsed("SHEFI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            image_size: ImageSize {
                width: env_parsed("SHEFI_IMAGE_WIDTH", DEFAULT_IMAGE_WIDTH)?,
                height: env_parsed("SHEFI_IMAGE_HEIGHT", DEFAULT_IMAGE_HEIGHT)?,
            },
            offline: false,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }

        if self.api_key_env_var.trim().is_empty() {
            return Err(anyhow!("API key variable name must not be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(anyhow!("Request timeout must be at least one second"));
        }

        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(anyhow!(
                "Image size must be non-zero, got {}x{}",
                self.image_size.width,
                self.image_size.height
            ));
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(anyhow!("API base must be an http(s) URL, got '{}'", self.api_base));
        }

        Ok(())
    }

    pub fn provider(&self) -> Result<Provider> {
        Provider::gemini_with(
            &self.api_key_env_var,
            &self.model,
            &self.api_base,
            Duration::from_secs(self.timeout_secs),
        )
        .context("Failed to build the HTTP client")
    }

    /// The gateway a session should use: canned answers offline, Gemini otherwise.
    pub fn gateway(&self) -> Result<Arc<dyn AiGateway>> {
        if self.offline {
            Ok(Arc::new(ScriptedGateway::offline()))
        } else {
            Ok(Arc::new(GeminiGateway::new(self.provider()?)))
        }
    }
}
