use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

use crate::YearMonth;

const ENV_PREFIX: &str = "DCARD_";

/// The optional env vars that tweak where scraped data and cookies go.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapingEnv {
    csv_dir: Option<PathBuf>,
    cookie_path: Option<PathBuf>,
    request_delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub csv_dir: PathBuf,
    pub cookie_path: PathBuf,
    pub request_delay: Duration,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("./csv"),
            cookie_path: PathBuf::from("cookie.txt"),
            request_delay: Duration::from_secs(1),
        }
    }
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_env = ScrapingEnv::load_from_env()?;
        Ok(Self::from_env(scraping_env))
    }

    fn from_env(env: ScrapingEnv) -> Self {
        let defaults = Self::default();
        Self {
            csv_dir: env.csv_dir.unwrap_or(defaults.csv_dir),
            cookie_path: env.cookie_path.unwrap_or(defaults.cookie_path),
            request_delay: env
                .request_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
        }
    }
}

/// Where the portal lives. The hostnames are fixed; only tests swap them out.
#[derive(Debug, Clone)]
pub struct PortalEndpoints {
    pub initial_url: String,
    pub auth_url: String,
    pub statement_url: String,
}

impl Default for PortalEndpoints {
    fn default() -> Self {
        Self {
            initial_url: "https://d-card.smt.docomo.ne.jp/".to_string(),
            auth_url: "https://cfg.smt.docomo.ne.jp/auth/cgi/idauth".to_string(),
            statement_url: "https://www5.dcmx.jp/dcmx/meisai".to_string(),
        }
    }
}

impl PortalEndpoints {
    pub fn get_statement_url_for(&self, year_month: YearMonth) -> String {
        format!(
            "{}?processCode=03Meisai&ym={}",
            self.statement_url,
            year_month.key()
        )
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_env_falls_back_to_defaults() {
        let config = ScrapingConfig::from_env(ScrapingEnv::default());
        assert_eq!(config.csv_dir, PathBuf::from("./csv"));
        assert_eq!(config.cookie_path, PathBuf::from("cookie.txt"));
        assert_eq!(config.request_delay, Duration::from_secs(1));
    }

    #[test]
    fn env_overrides_individual_fields() {
        let config = ScrapingConfig::from_env(ScrapingEnv {
            csv_dir: Some(PathBuf::from("/tmp/out")),
            cookie_path: None,
            request_delay_ms: Some(0),
        });
        assert_eq!(config.csv_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.cookie_path, PathBuf::from("cookie.txt"));
        assert_eq!(config.request_delay, Duration::ZERO);
    }

    #[test]
    fn statement_url_carries_the_year_month_key() {
        let endpoints = PortalEndpoints::default();
        let ym = YearMonth::new(2024, 3).unwrap();
        assert_eq!(
            endpoints.get_statement_url_for(ym),
            "https://www5.dcmx.jp/dcmx/meisai?processCode=03Meisai&ym=202403"
        );
    }
}
