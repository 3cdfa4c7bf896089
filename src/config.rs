use crate::application::forecast_engine::{DEFAULT_HORIZON_DAYS, DEFAULT_LOOKBACK_DAYS};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Yahoo,
    Mock,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(Provider::Yahoo),
            "mock" => Ok(Provider::Mock),
            _ => anyhow::bail!("Invalid PROVIDER: {}. Must be 'yahoo' or 'mock'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider: Provider,
    pub benchmark_symbol: String,
    pub yahoo_base_url: String,
    pub lookback_days: usize,
    pub horizon_days: usize,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let provider_str = env::var("PROVIDER").unwrap_or_else(|_| "yahoo".to_string());
        let provider = Provider::from_str(&provider_str)?;

        let benchmark_symbol =
            env::var("BENCHMARK_SYMBOL").unwrap_or_else(|_| "^GSPC".to_string());
        let yahoo_base_url = env::var("YAHOO_BASE_URL")
            .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string());

        let lookback_days = env::var("LOOKBACK_DAYS")
            .unwrap_or_else(|_| DEFAULT_LOOKBACK_DAYS.to_string())
            .parse::<usize>()
            .context("LOOKBACK_DAYS must be a non-negative integer")?;
        if lookback_days == 0 {
            anyhow::bail!("LOOKBACK_DAYS must be >= 1");
        }

        let horizon_days = env::var("HORIZON_DAYS")
            .unwrap_or_else(|_| DEFAULT_HORIZON_DAYS.to_string())
            .parse::<usize>()
            .context("HORIZON_DAYS must be a non-negative integer")?;
        if horizon_days == 0 {
            anyhow::bail!("HORIZON_DAYS must be >= 1");
        }

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("HTTP_TIMEOUT_SECS must be a positive integer")?;

        Ok(Config {
            host,
            port,
            provider,
            benchmark_symbol,
            yahoo_base_url,
            lookback_days,
            horizon_days,
            http_timeout_secs,
        })
    }
}
