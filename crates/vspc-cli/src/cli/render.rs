//! Plain-text renderings of the dashboard views. Each returns the full block,
//! newline terminated, so callers only print.

use super::session_cmd::SessionInfo;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use vspc_api::dashboard::{
    AlarmCenter, BillingDashboard, CompanyDashboard, CompanyUsageView, ThreatCenter,
};
use vspc_core::alarms::AlarmStatus;
use vspc_core::config::AppConfig;
use vspc_core::jobs::JobStatusRow;

const BAR_WIDTH: usize = 20;

pub(super) fn render_bar(part: f64, whole: f64, width: usize) -> String {
    if whole <= 0.0 || width == 0 {
        return format!("[{}]", "-".repeat(width));
    }
    let filled = ((part / whole) * width as f64).round().max(0.0) as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub(super) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Counters are floats on the wire; whole numbers print without decimals.
pub(super) fn format_counter(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn local_time(at: OffsetDateTime, offset: UtcOffset) -> String {
    at.to_offset(offset)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

pub(super) fn render_session(info: &SessionInfo) -> String {
    let expires = OffsetDateTime::from_unix_timestamp_nanos(
        i128::from(info.expires_at_epoch_ms) * 1_000_000,
    )
    .map(|at| local_time(at, UtcOffset::UTC) + " UTC")
    .unwrap_or_else(|_| info.expires_at_epoch_ms.to_string());
    let state = if info.expired {
        "expired, refreshed on next request"
    } else {
        "valid"
    };
    format!(
        "Portal:  {}\nToken:   {state}\nExpires: {expires}\n",
        info.base_url
    )
}

pub(super) fn render_company_dashboard(view: &CompanyDashboard) -> String {
    let mut out = String::new();
    let total = f64::from(view.counts.total());
    out.push_str(&format!(
        "Jobs: {} ({} ran in the last {}h)\n",
        view.jobs_total,
        view.counts.total(),
        view.window_hours
    ));
    for (label, count) in [
        ("Success", view.counts.success),
        ("Warning", view.counts.warning),
        ("Failed", view.counts.failed),
    ] {
        out.push_str(&format!(
            "  {label:<8} {} {count}\n",
            render_bar(f64::from(count), total, BAR_WIDTH)
        ));
    }
    out.push_str(&format!("SLA: {}%\n", view.sla));
    if !view.trend.is_empty() {
        out.push_str("Daily:\n");
        for day in &view.trend {
            out.push_str(&format!(
                "  {}  ok {:>3}  warn {:>3}  fail {:>3}\n",
                day.date, day.counts.success, day.counts.warning, day.counts.failed
            ));
        }
    }
    out
}

pub(super) fn render_job_rows(rows: &[JobStatusRow], offset: UtcOffset) -> String {
    if rows.is_empty() {
        return "No jobs\n".to_string();
    }
    let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let last_run = row
            .last_run
            .map(|at| local_time(at, offset))
            .unwrap_or_else(|| "never".to_string());
        let marker = if row.recent { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<width$}  {:<13} {:<8} {last_run}\n",
            row.name,
            row.kind.as_label(),
            row.status.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub(super) fn render_usage(views: &[CompanyUsageView]) -> String {
    if views.is_empty() {
        return "No companies\n".to_string();
    }
    let mut out = String::new();
    for view in views {
        out.push_str(&format!(
            "Company {}\n",
            view.company_uid.as_deref().unwrap_or("(unknown)")
        ));
        let mut current = None;
        for (bucket, value) in view.usage.iter() {
            let group = bucket.group();
            if current != Some(group) {
                out.push_str(&format!("  {}\n", group.title()));
                current = Some(group);
            }
            out.push_str(&format!("    {:<32} {}\n", bucket.tag(), format_counter(value)));
        }
    }
    out
}

pub(super) fn render_billing(view: &BillingDashboard) -> String {
    let quota = &view.quota;
    let mut out = String::new();
    out.push_str(&format!(
        "Storage: {} of {} {} {:.2}%\n",
        format_bytes(quota.used_bytes),
        format_bytes(quota.quota_bytes),
        render_bar(quota.used_bytes as f64, quota.quota_bytes as f64, BAR_WIDTH),
        quota.percent_used
    ));
    out.push_str(&format!("Resources: {}\n", quota.resources));
    out
}

pub(super) fn render_threats(view: &ThreatCenter) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Critical: {}  High: {}\n",
        view.counts.critical, view.counts.high
    ));
    for threat in &view.threats {
        let addresses = if threat.ip_addresses.is_empty() {
            "-".to_string()
        } else {
            threat.ip_addresses.join(", ")
        };
        out.push_str(&format!(
            "  {:<8} {}  {}  {addresses}\n",
            threat.severity.as_str(),
            threat.name,
            threat.date.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub(super) fn render_alarms(view: &AlarmCenter) -> String {
    let mut out = String::new();
    let summary: Vec<String> = [
        AlarmStatus::Error,
        AlarmStatus::Warning,
        AlarmStatus::Info,
        AlarmStatus::Resolved,
        AlarmStatus::Unknown,
    ]
    .iter()
    .map(|status| format!("{}: {}", status.as_str(), view.stats.get(*status)))
    .collect();
    out.push_str(&format!("{}\n", summary.join("  ")));
    for alarm in &view.alarms {
        out.push_str(&format!(
            "  {:<8} {}  {}\n",
            alarm.status.as_str(),
            alarm.object,
            alarm.message
        ));
    }
    out
}

pub(super) fn render_config(config: &AppConfig) -> String {
    let session = match &config.session_path {
        Some(path) => path.display().to_string(),
        None => "(default)".to_string(),
    };
    format!(
        "store: {:?}\nsession_path: {session}\nrequest_timeout_secs: {}\naccept_invalid_certs: {}\nsla_window_hours: {}\ntrend_days: {}\n",
        config.store,
        config.request_timeout_secs,
        config.accept_invalid_certs,
        config.sla_window_hours,
        config.trend_days
    )
}
