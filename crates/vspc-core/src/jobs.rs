use crate::model::{Job, JobKind};
use serde::{Serialize, Serializer};
use std::fmt;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

pub const DEFAULT_WINDOW_HOURS: i64 = 24;
pub const DEFAULT_TREND_DAYS: u32 = 7;
pub const MAX_WINDOW_HOURS: i64 = 8_760;
pub const MAX_TREND_DAYS: u32 = 366;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Warning,
    Failed,
}

impl JobOutcome {
    /// Case-sensitive match against the portal's status literals.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "Success" => Some(JobOutcome::Success),
            "Warning" => Some(JobOutcome::Warning),
            "Failed" => Some(JobOutcome::Failed),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub success: u32,
    pub warning: u32,
    pub failed: u32,
}

impl JobCounts {
    pub fn new(success: u32, warning: u32, failed: u32) -> Self {
        Self {
            success,
            warning,
            failed,
        }
    }

    pub fn total(&self) -> u32 {
        self.success + self.warning + self.failed
    }

    fn record(&mut self, job: &Job) {
        match job.effective_status().and_then(JobOutcome::from_status) {
            Some(JobOutcome::Success) => self.success += 1,
            Some(JobOutcome::Warning) => self.warning += 1,
            Some(JobOutcome::Failed) => self.failed += 1,
            None => {}
        }
    }
}

/// Start of the `window_hours` window ending at `now`. `None` when the start
/// is not representable, which reads as an unbounded window.
fn window_start(window_hours: i64, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let seconds = window_hours.checked_mul(3_600)?;
    now.checked_sub(Duration::seconds(seconds))
}

fn ran_within(job: &Job, start: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    match job.last_run {
        Some(last_run) => last_run <= now && start.is_none_or(|start| last_run > start),
        None => false,
    }
}

/// Tallies jobs whose last run falls in `(now - window_hours, now]`.
pub fn count_jobs(jobs: &[Job], window_hours: i64, now: OffsetDateTime) -> JobCounts {
    let start = window_start(window_hours, now);
    let mut counts = JobCounts::default();
    for job in jobs.iter().filter(|job| ran_within(job, start, now)) {
        counts.record(job);
    }
    counts
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sla {
    /// Nothing succeeded, warned or failed in the window.
    NoRuns,
    Percent(f64),
}

impl Sla {
    pub fn value(&self) -> f64 {
        match self {
            Sla::NoRuns => 0.0,
            Sla::Percent(value) => *value,
        }
    }
}

impl fmt::Display for Sla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sla::NoRuns => f.write_str("0"),
            Sla::Percent(value) => write!(f, "{value:.2}"),
        }
    }
}

impl Serialize for Sla {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

pub fn compute_sla(counts: &JobCounts) -> Sla {
    let total = counts.total();
    if total == 0 {
        return Sla::NoRuns;
    }
    let ratio = f64::from(counts.success + counts.warning) / f64::from(total) * 100.0;
    Sla::Percent(round2(ratio))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyJobCounts {
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: Date,
    #[serde(flatten)]
    pub counts: JobCounts,
}

fn serialize_iso_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

/// Per-day tallies for the `days` calendar days ending today, oldest first.
/// Days are taken in `offset`, normally the local offset of the viewer.
/// At most [`MAX_TREND_DAYS`] days are produced.
pub fn count_jobs_by_day(
    jobs: &[Job],
    days: u32,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> Vec<DailyJobCounts> {
    if days == 0 {
        return Vec::new();
    }
    let today = now.to_offset(offset).date();
    let mut buckets: Vec<DailyJobCounts> = (0..days.min(MAX_TREND_DAYS))
        .rev()
        .filter_map(|back| today.checked_sub(Duration::days(i64::from(back))))
        .map(|date| DailyJobCounts {
            date,
            counts: JobCounts::default(),
        })
        .collect();
    let Some(first) = buckets.first().map(|bucket| bucket.date) else {
        return buckets;
    };
    for job in jobs {
        let Some(last_run) = job.last_run else {
            continue;
        };
        if last_run > now {
            continue;
        }
        let day = last_run.to_offset(offset).date();
        if day < first || day > today {
            continue;
        }
        let index = (day - first).whole_days() as usize;
        buckets[index].counts.record(job);
    }
    buckets
}

pub fn is_recent(job: &Job, now: OffsetDateTime) -> bool {
    ran_within(job, window_start(DEFAULT_WINDOW_HOURS, now), now)
}

#[derive(Clone, Debug, Serialize)]
pub struct JobStatusRow {
    pub name: String,
    pub kind: JobKind,
    pub status: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_run: Option<OffsetDateTime>,
    pub recent: bool,
}

/// Job details listing, most recent run first; never-run jobs last.
pub fn job_status_rows(jobs: &[Job], now: OffsetDateTime) -> Vec<JobStatusRow> {
    let mut rows: Vec<JobStatusRow> = jobs
        .iter()
        .map(|job| JobStatusRow {
            name: job.name.clone(),
            kind: job.kind,
            status: job.effective_status().map(str::to_string),
            last_run: job.last_run,
            recent: is_recent(job, now),
        })
        .collect();
    rows.sort_by(|a, b| b.last_run.cmp(&a.last_run).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    fn job(status: Option<&str>, last_status: Option<&str>, last_run: Option<OffsetDateTime>) -> Job {
        Job {
            instance_uid: None,
            name: "job".to_string(),
            status: status.map(str::to_string),
            last_status: last_status.map(str::to_string),
            last_run,
            kind: JobKind::BackupServer,
        }
    }

    const NOW: OffsetDateTime = datetime!(2024-05-10 12:00 UTC);

    #[test]
    fn sla_matches_dashboard_numbers() {
        let sla = compute_sla(&JobCounts::new(45, 0, 5));
        assert_eq!(sla, Sla::Percent(90.0));
        assert_eq!(sla.to_string(), "90.00");
    }

    #[test]
    fn sla_without_runs_is_zero() {
        let sla = compute_sla(&JobCounts::default());
        assert_eq!(sla, Sla::NoRuns);
        assert_eq!(sla.to_string(), "0");
        assert_eq!(sla.value(), 0.0);
    }

    #[test]
    fn sla_rounds_to_two_places() {
        let sla = compute_sla(&JobCounts::new(2, 0, 1));
        assert_eq!(sla, Sla::Percent(66.67));
        assert_eq!(compute_sla(&JobCounts::new(1, 1, 1)).to_string(), "66.67");
    }

    #[test]
    fn window_excludes_lower_edge_and_includes_now() {
        let jobs = vec![
            job(Some("Success"), None, Some(NOW - Duration::hours(24))),
            job(Some("Success"), None, Some(NOW)),
            job(Some("Warning"), None, Some(NOW - Duration::hours(23))),
            job(Some("Failed"), None, Some(NOW + Duration::minutes(1))),
        ];
        assert_eq!(count_jobs(&jobs, 24, NOW), JobCounts::new(1, 1, 0));
    }

    #[test]
    fn oversized_window_counts_every_past_run() {
        let jobs = vec![
            job(Some("Success"), None, Some(datetime!(1990-01-01 00:00 UTC))),
            job(Some("Failed"), None, Some(NOW - Duration::hours(1))),
            job(Some("Failed"), None, Some(NOW + Duration::hours(1))),
        ];
        assert_eq!(count_jobs(&jobs, 1_000_000_000, NOW), JobCounts::new(1, 0, 1));
        assert_eq!(count_jobs(&jobs, i64::MAX, NOW), JobCounts::new(1, 0, 1));
    }

    #[test]
    fn trend_is_capped_at_max_days() {
        let days = count_jobs_by_day(&[], 5_000_000, NOW, UtcOffset::UTC);
        assert_eq!(days.len(), MAX_TREND_DAYS as usize);
        assert_eq!(days[days.len() - 1].date, date!(2024-05-10));
    }

    #[test]
    fn falls_back_to_last_status() {
        let jobs = vec![job(None, Some("Failed"), Some(NOW - Duration::hours(1)))];
        assert_eq!(count_jobs(&jobs, 24, NOW), JobCounts::new(0, 0, 1));
    }

    #[test]
    fn unknown_or_missing_status_counts_nowhere() {
        let recent = Some(NOW - Duration::hours(1));
        let jobs = vec![
            job(None, None, recent),
            job(Some("success"), None, recent),
            job(Some("Running"), None, recent),
            job(Some("Success"), None, None),
        ];
        assert_eq!(count_jobs(&jobs, 24, NOW), JobCounts::default());
    }

    #[test]
    fn daily_buckets_cover_trailing_week() {
        let jobs = vec![
            job(Some("Success"), None, Some(datetime!(2024-05-10 08:00 UTC))),
            job(Some("Failed"), None, Some(datetime!(2024-05-04 23:00 UTC))),
            job(Some("Warning"), None, Some(datetime!(2024-05-03 10:00 UTC))),
        ];
        let days = count_jobs_by_day(&jobs, 7, NOW, UtcOffset::UTC);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, date!(2024-05-04));
        assert_eq!(days[6].date, date!(2024-05-10));
        assert_eq!(days[0].counts, JobCounts::new(0, 0, 1));
        assert_eq!(days[6].counts, JobCounts::new(1, 0, 0));
        let total: u32 = days.iter().map(|day| day.counts.total()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn daily_buckets_use_local_date() {
        let jobs = vec![job(Some("Failed"), None, Some(datetime!(2024-05-04 23:00 UTC)))];
        let days = count_jobs_by_day(&jobs, 7, NOW, offset!(+2));
        assert_eq!(days[0].date, date!(2024-05-04));
        assert_eq!(days[0].counts.total(), 0);
        assert_eq!(days[1].date, date!(2024-05-05));
        assert_eq!(days[1].counts, JobCounts::new(0, 0, 1));
    }

    #[test]
    fn daily_bucket_serializes_iso_date() {
        let day = DailyJobCounts {
            date: date!(2024-05-04),
            counts: JobCounts::new(1, 2, 3),
        };
        let value = serde_json::to_value(&day).unwrap();
        assert_eq!(value["date"], "2024-05-04");
        assert_eq!(value["warning"], 2);
    }

    #[test]
    fn rows_sort_by_recency() {
        let mut old = job(Some("Success"), None, Some(NOW - Duration::days(3)));
        old.name = "old".to_string();
        let mut fresh = job(Some("Failed"), None, Some(NOW - Duration::hours(2)));
        fresh.name = "fresh".to_string();
        let mut never = job(None, None, None);
        never.name = "never".to_string();
        let rows = job_status_rows(&[old, never, fresh], NOW);
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["fresh", "old", "never"]);
        assert!(rows[0].recent);
        assert!(!rows[1].recent);
    }
}
