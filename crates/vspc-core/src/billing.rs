use crate::jobs::round2;
use crate::model::BackupResourceUsage;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct QuotaSummary {
    pub used_bytes: u64,
    pub quota_bytes: u64,
    pub percent_used: f64,
    pub resources: usize,
}

/// Sums storage quota and usage over every site resource. The percentage is
/// zero when no quota is assigned.
pub fn summarize_quota(resources: &[BackupResourceUsage]) -> QuotaSummary {
    let used_bytes: u64 = resources
        .iter()
        .filter_map(|resource| resource.used_storage_quota)
        .fold(0, u64::saturating_add);
    let quota_bytes: u64 = resources
        .iter()
        .filter_map(|resource| resource.storage_quota)
        .fold(0, u64::saturating_add);
    let percent_used = if quota_bytes == 0 {
        0.0
    } else {
        round2(used_bytes as f64 / quota_bytes as f64 * 100.0)
    };
    QuotaSummary {
        used_bytes,
        quota_bytes,
        percent_used,
        resources: resources.len(),
    }
}
