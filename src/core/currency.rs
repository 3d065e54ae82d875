use crate::core::state::{CURRENCY_KEY, DEFAULT_CURRENCY, RATES_KEY};
use crate::core::{Clock, Result, RvcApi, StateStore};
use crate::utils::error::RvcError;
use crate::utils::format::json_number;
use crate::utils::validation::is_currency_code;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Rates younger than this are served from the cache.
pub const RATE_TTL_MILLIS: i64 = 6 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct CachedRate {
    rate: f64,
    #[serde(default)]
    ts: i64,
}

/// Upper-cases user input and rejects anything that is not a 3-letter code.
pub fn parse_currency_code(raw: &str) -> Result<String> {
    let code = raw.trim().to_uppercase();
    if !is_currency_code(&code) {
        return Err(RvcError::validation(format!(
            "'{}' is not a 3-letter currency code",
            code
        )));
    }
    Ok(code)
}

/// Display currency selection plus a persisted USD→X rate cache.
pub struct CurrencyManager<'a> {
    api: &'a dyn RvcApi,
    store: &'a dyn StateStore,
    clock: &'a dyn Clock,
    current: String,
    rates: BTreeMap<String, CachedRate>,
}

pub fn display_symbol(currency: &str) -> &str {
    match currency {
        "USD" => "US$",
        "EUR" => "€",
        other => other,
    }
}

/// The display currency and its known USD rate, detached from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyDisplay {
    pub currency: String,
    pub rate: Option<f64>,
}

impl Default for CurrencyDisplay {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            rate: Some(1.0),
        }
    }
}

impl CurrencyDisplay {
    pub fn symbol(&self) -> &str {
        display_symbol(&self.currency)
    }

    /// Expresses `amount` (quoted in `base`) in the display currency.
    ///
    /// A server-side conversion wins, then the USD rate. When neither applies
    /// the amount stays in `base` and the returned symbol says so.
    pub fn convert(
        &self,
        amount: f64,
        base: &str,
        conversions: Option<&Map<String, Value>>,
    ) -> (f64, String) {
        let base = base.trim().to_uppercase();
        if base == self.currency {
            return (amount, self.symbol().to_string());
        }
        if let Some(converted) = conversions
            .and_then(|m| m.get(&self.currency))
            .and_then(json_number)
        {
            return (converted, self.symbol().to_string());
        }
        match self.rate {
            Some(rate) if base == "USD" => (amount * rate, self.symbol().to_string()),
            _ => (amount, display_symbol(&base).to_string()),
        }
    }
}

impl<'a> CurrencyManager<'a> {
    pub fn new(api: &'a dyn RvcApi, store: &'a dyn StateStore, clock: &'a dyn Clock) -> Self {
        let current = store
            .get(CURRENCY_KEY)
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let rates = load_rates(store);

        Self {
            api,
            store,
            clock,
            current,
            rates,
        }
    }

    pub fn currency(&self) -> &str {
        &self.current
    }

    pub fn symbol(&self) -> &str {
        display_symbol(&self.current)
    }

    pub fn cached_rate(&self, target: &str) -> Option<f64> {
        self.rates.get(&target.to_uppercase()).map(|c| c.rate)
    }

    /// Switches the display currency and makes sure a rate is available for it.
    pub async fn set_currency(&mut self, code: &str) -> Result<f64> {
        let code = if code.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            parse_currency_code(code)?
        };

        self.store.set(CURRENCY_KEY, &code)?;
        self.current = code.clone();
        Ok(self.ensure_rate(&code).await)
    }

    /// Returns the USD→`target` rate. Never fails: a failed fetch falls back to
    /// the previous rate, or 1.0 when there is none.
    pub async fn ensure_rate(&mut self, target: &str) -> f64 {
        let target = target.trim().to_uppercase();
        if target == "USD" {
            return 1.0;
        }

        let now = self.clock.now_millis();
        if let Some(cached) = self.rates.get(&target) {
            if now - cached.ts < RATE_TTL_MILLIS {
                tracing::debug!("Using cached USD/{} rate {}", target, cached.rate);
                return cached.rate;
            }
        }

        match self.api.exchange_rate("USD", &target).await {
            Ok(response) => match response.rate.filter(|r| r.is_finite()) {
                Some(rate) => {
                    self.rates
                        .insert(target.clone(), CachedRate { rate, ts: now });
                    self.persist_rates();
                    return rate;
                }
                None => tracing::warn!("Exchange rate response for {} had no rate", target),
            },
            Err(e) => tracing::warn!("Exchange rate fetch for {} failed: {}", target, e),
        }

        let fallback = self.cached_rate(&target).unwrap_or(1.0);
        tracing::warn!("Falling back to USD/{} rate {}", target, fallback);
        fallback
    }

    pub fn convert_from_usd(&self, amount: f64) -> f64 {
        if self.current == "USD" {
            return amount;
        }
        match self.cached_rate(&self.current) {
            Some(rate) => amount * rate,
            None => amount,
        }
    }

    /// Snapshot of the selection for renderers.
    pub fn display(&self) -> CurrencyDisplay {
        let rate = if self.current == "USD" {
            Some(1.0)
        } else {
            self.cached_rate(&self.current)
        };
        CurrencyDisplay {
            currency: self.current.clone(),
            rate,
        }
    }

    fn persist_rates(&self) {
        let result = serde_json::to_string(&self.rates)
            .map_err(RvcError::from)
            .and_then(|json| self.store.set(RATES_KEY, &json));
        if let Err(e) = result {
            tracing::warn!("Could not persist exchange rates: {}", e);
        }
    }
}

fn load_rates(store: &dyn StateStore) -> BTreeMap<String, CachedRate> {
    let Some(raw) = store.get(RATES_KEY) else {
        return BTreeMap::new();
    };
    let saved: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(saved) => saved,
        Err(e) => {
            tracing::warn!("Ignoring unreadable rate cache: {}", e);
            return BTreeMap::new();
        }
    };
    // Entries without a numeric rate are skipped individually.
    saved
        .into_iter()
        .filter_map(|(k, v)| {
            serde_json::from_value::<CachedRate>(v)
                .ok()
                .map(|c| (k.to_uppercase(), c))
        })
        .collect()
}
