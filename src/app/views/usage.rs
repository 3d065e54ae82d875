use crate::core::usage_limit::{low_quota_warning, plan_badge, LimitModal};
use crate::core::{LimitStatus, Plan};
use crate::utils::format::NOT_AVAILABLE;

fn count(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn render_modal(modal: &LimitModal) -> String {
    let mut lines = vec![
        format!("⛔ {}", modal.headline),
        format!("   {}", modal.detail),
        format!(
            "   Used: {} · Remaining: {}",
            count(modal.used),
            count(modal.remaining)
        ),
    ];
    if let Some(reset) = &modal.reset {
        lines.push(format!("   {}", reset));
    }
    if modal.plan == Plan::Free {
        lines.push("   Activate a PRO license with `rvc license activate <KEY>`".to_string());
    }
    lines.join("\n")
}

/// Notice for a request the server refused with 429.
pub fn render_refusal(message: &str, status: Option<&LimitStatus>) -> String {
    let fallback = LimitStatus {
        allowed: false,
        ..LimitStatus::default()
    };
    let mut modal = LimitModal::from_status(status.unwrap_or(&fallback));
    if status.is_none() && !message.trim().is_empty() {
        modal.detail = message.trim().to_string();
    }
    render_modal(&modal)
}

/// Output of `rvc limit`.
pub fn render_status(status: &LimitStatus) -> String {
    let mut lines = vec![format!(
        "Plan: {} · {} of {} queries left",
        plan_badge(status.plan(), status.license_days_left),
        count(status.remaining),
        count(status.limit)
    )];
    if let Some(reset_in) = &status.reset_in {
        lines.push(format!("Resets in {}", reset_in));
    }
    if !status.allowed {
        lines.push(render_modal(&LimitModal::from_status(status)));
    } else if let Some(warning) = low_quota_warning(status) {
        lines.push(format!("⚠ {}", warning));
    }
    lines.join("\n")
}
