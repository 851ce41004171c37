//! One loader per dashboard view: fetch, then reshape into view aggregates.

use crate::client::PortalClient;
use crate::error::ApiError;
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};
use vspc_core::alarms::{AlarmRow, AlarmStats, alarm_rows, extract_alarm_stats};
use vspc_core::billing::{QuotaSummary, summarize_quota};
use vspc_core::jobs::{
    DailyJobCounts, JobCounts, JobStatusRow, Sla, compute_sla, count_jobs, count_jobs_by_day,
    job_status_rows,
};
use vspc_core::model::BackupResourceUsage;
use vspc_core::threats::{Threat, ThreatCounts, count_threats, extract_threats};
use vspc_core::usage::{UsageSummary, aggregate};

#[derive(Clone, Copy, Debug)]
pub struct ViewClock {
    pub now: OffsetDateTime,
    pub local_offset: UtcOffset,
}

impl ViewClock {
    pub fn now(local_offset: UtcOffset) -> Self {
        Self {
            now: OffsetDateTime::now_utc(),
            local_offset,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CompanyDashboard {
    pub window_hours: i64,
    pub jobs_total: usize,
    pub counts: JobCounts,
    pub sla: Sla,
    pub trend: Vec<DailyJobCounts>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompanyUsageView {
    pub company_uid: Option<String>,
    pub usage: UsageSummary,
}

#[derive(Clone, Debug, Serialize)]
pub struct ThreatCenter {
    pub counts: ThreatCounts,
    pub threats: Vec<Threat>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AlarmCenter {
    pub stats: AlarmStats,
    pub alarms: Vec<AlarmRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BillingDashboard {
    pub quota: QuotaSummary,
    pub resources: Vec<BackupResourceUsage>,
}

impl PortalClient {
    pub async fn company_dashboard(
        &self,
        window_hours: i64,
        trend_days: u32,
        clock: ViewClock,
    ) -> Result<CompanyDashboard, ApiError> {
        let jobs = self.fetch_jobs().await?;
        let counts = count_jobs(&jobs, window_hours, clock.now);
        Ok(CompanyDashboard {
            window_hours,
            jobs_total: jobs.len(),
            sla: compute_sla(&counts),
            counts,
            trend: count_jobs_by_day(&jobs, trend_days, clock.now, clock.local_offset),
        })
    }

    pub async fn job_details(&self, clock: ViewClock) -> Result<Vec<JobStatusRow>, ApiError> {
        let jobs = self.fetch_jobs().await?;
        Ok(job_status_rows(&jobs, clock.now))
    }

    pub async fn provider_dashboard(&self) -> Result<Vec<CompanyUsageView>, ApiError> {
        let companies = self.fetch_company_usage().await?;
        Ok(companies
            .into_iter()
            .map(|company| CompanyUsageView {
                usage: aggregate(&company.counters),
                company_uid: company.company_uid,
            })
            .collect())
    }

    pub async fn threat_center(&self) -> Result<ThreatCenter, ApiError> {
        let vms = self.fetch_virtual_machines().await?;
        let threats = extract_threats(&vms);
        Ok(ThreatCenter {
            counts: count_threats(&threats),
            threats,
        })
    }

    pub async fn alarm_center(&self) -> Result<AlarmCenter, ApiError> {
        let alarms = self.fetch_active_alarms().await?;
        Ok(AlarmCenter {
            stats: extract_alarm_stats(&alarms),
            alarms: alarm_rows(&alarms),
        })
    }

    pub async fn billing_dashboard(&self) -> Result<BillingDashboard, ApiError> {
        let resources = self.fetch_backup_resources_usage().await?;
        Ok(BillingDashboard {
            quota: summarize_quota(&resources),
            resources,
        })
    }
}
