use crate::core::state::SPLASH_KEY;
use crate::core::{Clock, Result, StateStore};

pub const SPLASH_COOLDOWN_MILLIS: i64 = 24 * 60 * 60 * 1000;

pub const BANNER: &str = "RVC Analyzer · valuation, quality, health and growth in one score";

/// Decides whether the startup banner is due.
pub struct SplashGate<'a> {
    store: &'a dyn StateStore,
    clock: &'a dyn Clock,
}

impl<'a> SplashGate<'a> {
    pub fn new(store: &'a dyn StateStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    pub fn should_show(&self) -> bool {
        let last_shown = self
            .store
            .get(SPLASH_KEY)
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        match last_shown {
            Some(ts) => self.clock.now_millis() - ts > SPLASH_COOLDOWN_MILLIS,
            None => true,
        }
    }

    pub fn mark_shown(&self) -> Result<()> {
        self.store
            .set(SPLASH_KEY, &self.clock.now_millis().to_string())
    }

    pub fn reset(&self) -> Result<()> {
        self.store.remove(SPLASH_KEY)
    }

    /// Returns the banner once per cooldown window and records that it was shown.
    pub fn take_banner(&self) -> Option<&'static str> {
        if !self.should_show() {
            return None;
        }
        if let Err(e) = self.mark_shown() {
            tracing::warn!("Could not record splash timestamp: {}", e);
        }
        Some(BANNER)
    }
}
