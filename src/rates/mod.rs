//! Exchange rates against the reference currency.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::Database;
use crate::models::{is_usable_rate, parse_day, CurrencyRates};

pub(crate) const ECB_DAILY_URL: &str =
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";

const RATE_PATTERN: &str =
    r#"currency=['"]([A-Za-z]{3})['"][ \t\r\n]+rate=['"]([0-9]+(?:\.[0-9]+)?)['"]"#;
const TIME_PATTERN: &str = r#"time=['"]([0-9]{4}-[0-9]{2}-[0-9]{2})['"]"#;

/// Anything that can tell the current rate of every known currency.
pub(crate) trait RateProvider {
    fn current_rates(&self) -> Result<CurrencyRates>;
}

impl RateProvider for Database {
    fn current_rates(&self) -> Result<CurrencyRates> {
        self.load_rates()
    }
}

/// Client for the ECB daily reference rate feed.
#[derive(Debug, Clone)]
pub(crate) struct EcbClient {
    http: Client,
    url: String,
}

impl EcbClient {
    pub(crate) fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("moneyflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

impl RateProvider for EcbClient {
    fn current_rates(&self) -> Result<CurrencyRates> {
        tracing::info!(url = %self.url, "fetching exchange rates");
        let body = self
            .http
            .get(&self.url)
            .send()
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned non-success status", self.url))?
            .text()
            .with_context(|| format!("Failed to read response from {}", self.url))?;
        let rates = parse_ecb_feed(&body)?;
        tracing::info!(currencies = rates.foreign_count(), "fetched exchange rates");
        Ok(rates)
    }
}

/// Extract rates from an ECB `eurofxref` XML document.
///
/// The reference currency is always present. A feed without any rate is
/// an error so a broken download never wipes the stored rates.
pub(crate) fn parse_ecb_feed(xml: &str) -> Result<CurrencyRates> {
    let rate_re = regex::Regex::new(RATE_PATTERN)?;
    let time_re = regex::Regex::new(TIME_PATTERN)?;

    let mut rates = CurrencyRates::new();
    for caps in rate_re.captures_iter(xml) {
        let code = &caps[1];
        let rate = Decimal::from_str(&caps[2])
            .with_context(|| format!("Invalid rate for {code}: {}", &caps[2]))?;
        if !is_usable_rate(rate) {
            tracing::warn!(currency = code, %rate, "skipping rate below the minimum");
            continue;
        }
        rates.insert(code, rate);
    }

    if rates.foreign_count() == 0 {
        bail!("No exchange rates found in feed");
    }

    if let Some(caps) = time_re.captures(xml) {
        rates.set_published(parse_day(&caps[1])?);
    }
    Ok(rates)
}

/// Read a saved ECB feed from disk.
pub(crate) fn import_ecb_file(path: &str) -> Result<CurrencyRates> {
    let xml = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    parse_ecb_feed(&xml).with_context(|| format!("Failed to parse {path}"))
}

#[cfg(test)]
mod tests;
