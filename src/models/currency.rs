use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// All cross-account totals are expressed in this currency.
pub const REFERENCE_CURRENCY: &str = "EUR";

/// Smallest accepted rate (0.0001 units per EUR). Below it, dividing a
/// balance by the rate can leave the decimal range.
pub const MIN_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Exchange rates against the reference currency.
///
/// A rate is the amount of a currency worth one unit of the reference
/// currency, so `x` units of `C` are `x / rate(C)` in EUR. The reference
/// currency itself is always present with a rate of one.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRates {
    rates: BTreeMap<String, Decimal>,
    published: Option<NaiveDate>,
}

impl Default for CurrencyRates {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrencyRates {
    pub fn new() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(REFERENCE_CURRENCY.to_string(), Decimal::ONE);
        Self {
            rates,
            published: None,
        }
    }

    pub fn insert(&mut self, code: &str, rate: Decimal) {
        let code = code.trim().to_uppercase();
        if code == REFERENCE_CURRENCY {
            return;
        }
        self.rates.insert(code, rate);
    }

    #[cfg(test)]
    pub fn with_rate(mut self, code: &str, rate: Decimal) -> Self {
        self.insert(code, rate);
        self
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Iterate `(code, rate)` pairs in code order, reference currency included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    /// Number of currencies besides the reference one.
    pub fn foreign_count(&self) -> usize {
        self.rates.len() - 1
    }

    pub fn published(&self) -> Option<NaiveDate> {
        self.published
    }

    pub fn set_published(&mut self, day: NaiveDate) {
        self.published = Some(day);
    }
}

pub fn is_usable_rate(rate: Decimal) -> bool {
    rate >= MIN_RATE
}

/// ISO 4217 codes are three uppercase ASCII letters.
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}
