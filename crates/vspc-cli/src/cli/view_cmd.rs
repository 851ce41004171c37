use super::app::{AppContext, Output};
use super::*;
use vspc_core::jobs::{MAX_TREND_DAYS, MAX_WINDOW_HOURS};

/// Window and trend length for `dashboard`, flags first, then config.
pub(super) fn dashboard_range(
    args: &DashboardArgs,
    config: &AppConfig,
) -> anyhow::Result<(i64, u32)> {
    let window_hours = args.window_hours.unwrap_or(config.sla_window_hours);
    let days = args.days.unwrap_or(config.trend_days);
    if !(1..=MAX_WINDOW_HOURS).contains(&window_hours) {
        anyhow::bail!("window must be between 1 and {MAX_WINDOW_HOURS} hours, got {window_hours}");
    }
    if !(1..=MAX_TREND_DAYS).contains(&days) {
        anyhow::bail!("trend must be between 1 and {MAX_TREND_DAYS} days, got {days}");
    }
    Ok((window_hours, days))
}

pub(super) async fn handle_dashboard(
    args: DashboardArgs,
    context: &AppContext,
    output: Output,
) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let (window_hours, days) = dashboard_range(&args, &config)?;
    let view = context
        .portal_client(&config)?
        .company_dashboard(window_hours, days, context.clock())
        .await
        .context("load company dashboard")?;
    output.emit(&view, render::render_company_dashboard)
}

pub(super) async fn handle_jobs(context: &AppContext, output: Output) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let rows = context
        .portal_client(&config)?
        .job_details(context.clock())
        .await
        .context("load jobs")?;
    let offset = context.local_offset;
    output.emit(&rows, |rows| render::render_job_rows(rows, offset))
}

pub(super) async fn handle_usage(context: &AppContext, output: Output) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let views = context
        .portal_client(&config)?
        .provider_dashboard()
        .await
        .context("load company usage")?;
    output.emit(&views, |views| render::render_usage(views))
}

pub(super) async fn handle_billing(context: &AppContext, output: Output) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let view = context
        .portal_client(&config)?
        .billing_dashboard()
        .await
        .context("load backup resource usage")?;
    output.emit(&view, render::render_billing)
}

pub(super) async fn handle_threats(context: &AppContext, output: Output) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let view = context
        .portal_client(&config)?
        .threat_center()
        .await
        .context("load threats")?;
    output.emit(&view, render::render_threats)
}

pub(super) async fn handle_alarms(context: &AppContext, output: Output) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let view = context
        .portal_client(&config)?
        .alarm_center()
        .await
        .context("load alarms")?;
    output.emit(&view, render::render_alarms)
}
