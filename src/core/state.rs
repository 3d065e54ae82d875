use crate::core::{Result, Scenario, StateStore};

pub const LICENSE_KEY: &str = "rvc_license_key";
pub const CURRENCY_KEY: &str = "rvc_currency";
pub const RATES_KEY: &str = "rvc_rates_v1";
pub const SPLASH_KEY: &str = "rvc_splash_shown";
pub const LAST_TICKER_KEY: &str = "rvc_last_ticker";
pub const SCENARIO_KEY: &str = "rvc_scenario";

pub const DEFAULT_CURRENCY: &str = "USD";

/// Session state carried between commands.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub current_ticker: Option<String>,
    pub selected_scenario: Scenario,
    pub license_key: Option<String>,
    pub currency: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_ticker: None,
            selected_scenario: Scenario::default(),
            license_key: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppState {
    pub fn load(store: &dyn StateStore) -> Self {
        let selected_scenario = store
            .get(SCENARIO_KEY)
            .and_then(|s| Scenario::parse(&s))
            .unwrap_or_default();
        let currency = non_empty(store.get(CURRENCY_KEY))
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Self {
            current_ticker: non_empty(store.get(LAST_TICKER_KEY)),
            selected_scenario,
            license_key: non_empty(store.get(LICENSE_KEY)),
            currency,
        }
    }

    pub fn save(&self, store: &dyn StateStore) -> Result<()> {
        match &self.current_ticker {
            Some(ticker) => store.set(LAST_TICKER_KEY, ticker)?,
            None => store.remove(LAST_TICKER_KEY)?,
        }
        match &self.license_key {
            Some(key) => store.set(LICENSE_KEY, key)?,
            None => store.remove(LICENSE_KEY)?,
        }
        store.set(SCENARIO_KEY, self.selected_scenario.as_str())?;
        store.set(CURRENCY_KEY, &self.currency)?;
        Ok(())
    }

    pub fn license_key(&self) -> Option<&str> {
        self.license_key.as_deref()
    }
}
