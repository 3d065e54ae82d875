//! Usage quota checks and PRO license activation.
//!
//! The quota itself is enforced by the server; the client only asks before
//! metered actions, warns when few queries are left, and explains a refusal.

use crate::core::state::LICENSE_KEY;
use crate::core::{LimitStatus, Plan, Result, RvcApi, StateStore};
use crate::utils::error::RvcError;

const FREE_WARNING_THRESHOLD: u32 = 3;
const PRO_WARNING_THRESHOLD: u32 = 20;
const PRO_DAILY_LIMIT: u32 = 200;
const BADGE_DAYS_THRESHOLD: i64 = 7;

/// Result of asking the server before a metered action.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Proceed { warning: Option<String> },
    Blocked {
        modal: LimitModal,
        status: LimitStatus,
    },
}

impl Gate {
    /// The low-quota warning to print, or the refusal as an error.
    pub fn into_result(self) -> Result<Option<String>> {
        match self {
            Gate::Proceed { warning } => Ok(warning),
            Gate::Blocked { modal, status } => Err(RvcError::LimitReached {
                message: modal.headline,
                limit: Some(status),
            }),
        }
    }
}

/// What the "limit reached" notice shows.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitModal {
    pub plan: Plan,
    pub headline: String,
    pub detail: String,
    pub used: Option<u32>,
    pub remaining: Option<u32>,
    pub reset: Option<String>,
}

impl LimitModal {
    pub fn from_status(status: &LimitStatus) -> Self {
        let used = match (status.limit, status.remaining) {
            (Some(limit), Some(remaining)) => Some(limit.saturating_sub(remaining)),
            _ => None,
        };
        let reset = status.reset_in.as_ref().map(|reset_in| match &status.reset_date {
            Some(date) => format!("Resets in {} ({})", reset_in, date),
            None => format!("Resets in {}", reset_in),
        });

        let mut headline = "Usage limit reached".to_string();
        let mut detail = "You have used all of your free queries for this period".to_string();

        if status.plan() == Plan::Pro {
            if status.remaining == Some(0) {
                headline = "PRO daily limit reached".to_string();
                detail = format!(
                    "You have used your {} daily queries. The limit resets in {}.",
                    status.limit.unwrap_or(PRO_DAILY_LIMIT),
                    status.reset_in.as_deref().unwrap_or("a few hours")
                );
            } else if let Some(days) = status.license_days_left {
                headline = "PRO license active".to_string();
                detail = format!(
                    "{} day{} of PRO access left ({} queries today)",
                    days,
                    if days == 1 { "" } else { "s" },
                    status
                        .remaining
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "?".to_string())
                );
            }
        }

        Self {
            plan: status.plan(),
            headline,
            detail,
            used,
            remaining: status.remaining,
            reset,
        }
    }
}

/// Low-quota warning, if one is due.
pub fn low_quota_warning(status: &LimitStatus) -> Option<String> {
    let remaining = status.remaining.filter(|r| *r > 0)?;
    match status.plan() {
        Plan::Free if remaining <= FREE_WARNING_THRESHOLD => {
            Some(format!("{} free queries left today", remaining))
        }
        Plan::Pro if remaining <= PRO_WARNING_THRESHOLD => Some(format!(
            "PRO: {} queries left today (of {})",
            remaining,
            status.limit.unwrap_or(PRO_DAILY_LIMIT)
        )),
        _ => None,
    }
}

/// `PRO (5d)` when a PRO license is about to run out, otherwise just the plan.
pub fn plan_badge(plan: Plan, days_left: Option<i64>) -> String {
    match (plan, days_left) {
        (Plan::Pro, Some(days)) if days <= BADGE_DAYS_THRESHOLD => {
            format!("{} ({}d)", plan.as_str(), days)
        }
        _ => plan.as_str().to_string(),
    }
}

pub struct UsageLimitManager<'a> {
    api: &'a dyn RvcApi,
    store: &'a dyn StateStore,
}

impl<'a> UsageLimitManager<'a> {
    pub fn new(api: &'a dyn RvcApi, store: &'a dyn StateStore) -> Self {
        Self { api, store }
    }

    /// Never fails: an unreachable limit service lets the action through.
    pub async fn check(&self, license_key: Option<&str>) -> LimitStatus {
        match self.api.check_limit(license_key).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Usage limit check failed, allowing request: {}", e);
                LimitStatus::fail_open()
            }
        }
    }

    pub async fn gate(&self, license_key: Option<&str>) -> Gate {
        let status = self.check(license_key).await;
        if !status.allowed {
            return Gate::Blocked {
                modal: LimitModal::from_status(&status),
                status,
            };
        }
        Gate::Proceed {
            warning: low_quota_warning(&status),
        }
    }

    /// Validates a PRO key with the server and stores it when accepted.
    pub async fn activate_license(&self, license_key: &str) -> Result<()> {
        let key = license_key.trim();
        if key.is_empty() {
            return Err(RvcError::validation("Enter a license key"));
        }

        let validation = self.api.validate_license(key).await?;
        if !validation.valid {
            return Err(RvcError::validation(format!(
                "Invalid license: {}",
                validation
                    .reason
                    .as_deref()
                    .unwrap_or("key not recognised")
            )));
        }

        self.store.set(LICENSE_KEY, key)?;
        tracing::info!("PRO license activated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(plan: &str, remaining: u32, limit: u32) -> LimitStatus {
        LimitStatus {
            allowed: remaining > 0,
            remaining: Some(remaining),
            limit: Some(limit),
            plan: Some(plan.to_string()),
            ..LimitStatus::default()
        }
    }

    #[test]
    fn test_modal_counts() {
        let modal = LimitModal::from_status(&status("FREE", 0, 20));
        assert_eq!(modal.used, Some(20));
        assert_eq!(modal.remaining, Some(0));
        assert_eq!(modal.headline, "Usage limit reached");
        assert_eq!(modal.reset, None);
    }

    #[test]
    fn test_modal_used_saturates() {
        let modal = LimitModal::from_status(&status("FREE", 25, 20));
        assert_eq!(modal.used, Some(0));
    }

    #[test]
    fn test_pro_headlines() {
        let mut exhausted = status("PRO", 0, 200);
        exhausted.reset_in = Some("5h 12m".into());
        exhausted.reset_date = Some("2026-10-19 00:00".into());
        let modal = LimitModal::from_status(&exhausted);
        assert_eq!(modal.headline, "PRO daily limit reached");
        assert!(modal.detail.contains("200 daily queries"));
        assert_eq!(modal.reset.as_deref(), Some("Resets in 5h 12m (2026-10-19 00:00)"));

        let mut active = status("PRO", 50, 200);
        active.license_days_left = Some(1);
        let modal = LimitModal::from_status(&active);
        assert_eq!(modal.headline, "PRO license active");
        assert_eq!(modal.detail, "1 day of PRO access left (50 queries today)");
    }

    #[test]
    fn test_low_quota_warnings() {
        assert_eq!(
            low_quota_warning(&status("FREE", 3, 20)).as_deref(),
            Some("3 free queries left today")
        );
        assert_eq!(low_quota_warning(&status("FREE", 4, 20)), None);
        assert_eq!(low_quota_warning(&status("FREE", 0, 20)), None);
        assert_eq!(
            low_quota_warning(&status("PRO", 20, 200)).as_deref(),
            Some("PRO: 20 queries left today (of 200)")
        );
        assert_eq!(low_quota_warning(&status("PRO", 21, 200)), None);
        assert_eq!(low_quota_warning(&LimitStatus::fail_open()), None);
    }

    #[test]
    fn test_gate_into_result() {
        let refused = status("FREE", 0, 20);
        let blocked = Gate::Blocked {
            modal: LimitModal::from_status(&refused),
            status: refused,
        };
        match blocked.into_result() {
            Err(RvcError::LimitReached { message, limit }) => {
                assert_eq!(message, "Usage limit reached");
                assert_eq!(limit.and_then(|l| l.limit), Some(20));
            }
            other => panic!("expected a limit error, got {:?}", other),
        }

        let proceed = Gate::Proceed {
            warning: Some("2 free queries left today".to_string()),
        };
        assert_eq!(
            proceed.into_result().unwrap().as_deref(),
            Some("2 free queries left today")
        );
    }

    #[test]
    fn test_plan_badge() {
        assert_eq!(plan_badge(Plan::Pro, Some(5)), "PRO (5d)");
        assert_eq!(plan_badge(Plan::Pro, Some(7)), "PRO (7d)");
        assert_eq!(plan_badge(Plan::Pro, Some(8)), "PRO");
        assert_eq!(plan_badge(Plan::Pro, None), "PRO");
        assert_eq!(plan_badge(Plan::Free, Some(2)), "FREE");
    }
}
