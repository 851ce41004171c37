use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub base_url: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at_epoch_ms: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TokenState {
    Valid,
    Expired,
}

impl Session {
    pub fn token_state_at(&self, now_ms: i64) -> TokenState {
        if now_ms < self.expires_at_epoch_ms {
            TokenState::Valid
        } else {
            TokenState::Expired
        }
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at_epoch_ms", &self.expires_at_epoch_ms)
            .finish()
    }
}

pub fn now_epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as i64
}

/// Expiry instant for a token issued now with a lifetime of `expires_in` seconds.
pub fn expiry_from(now_ms: i64, expires_in_secs: i64) -> i64 {
    now_ms.saturating_add(expires_in_secs.saturating_mul(1000))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsageCounter {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUsage {
    #[serde(default)]
    pub company_uid: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub counters: Vec<UsageCounter>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum JobKind {
    #[default]
    BackupServer,
    BackupAgent,
    Vb365,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::BackupServer, JobKind::BackupAgent, JobKind::Vb365];

    pub fn path(&self) -> &'static str {
        match self {
            JobKind::BackupServer => "/infrastructure/backupServers/jobs",
            JobKind::BackupAgent => "/infrastructure/backupAgents/jobs",
            JobKind::Vb365 => "/infrastructure/vb365Servers/organizations/jobs",
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            JobKind::BackupServer => "backup-server",
            JobKind::BackupAgent => "backup-agent",
            JobKind::Vb365 => "vb365",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub instance_uid: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_status: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_run: Option<OffsetDateTime>,
    #[serde(skip_deserializing)]
    pub kind: JobKind,
}

impl Job {
    /// `status` when present, otherwise `lastStatus`.
    pub fn effective_status(&self) -> Option<&str> {
        self.status.as_deref().or(self.last_status.as_deref())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    #[serde(default)]
    pub instance_uid: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub malware_state: Option<String>,
    #[serde(default)]
    pub latest_restore_point_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_addresses: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    #[serde(default)]
    pub instance_uid: Option<String>,
    #[serde(default)]
    pub object: Option<AlarmObject>,
    #[serde(default)]
    pub last_activation: Option<AlarmActivation>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmObject {
    #[serde(default)]
    pub object_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmActivation {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResourceUsage {
    #[serde(default)]
    pub company_uid: Option<String>,
    #[serde(default)]
    pub site_uid: Option<String>,
    #[serde(default)]
    pub resource_uid: Option<String>,
    #[serde(default)]
    pub storage_quota: Option<u64>,
    #[serde(default)]
    pub used_storage_quota: Option<u64>,
    #[serde(default)]
    pub performance_tier_usage: Option<u64>,
    #[serde(default)]
    pub capacity_tier_usage: Option<u64>,
    #[serde(default)]
    pub archive_tier_usage: Option<u64>,
    #[serde(default)]
    pub vms_backups: Option<u64>,
    #[serde(default)]
    pub server_backups: Option<u64>,
    #[serde(default)]
    pub workstation_backups: Option<u64>,
}

/// Treats an explicit JSON `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn session(expires_at_epoch_ms: i64) -> Session {
        Session {
            base_url: "https://portal.example.com:1280/api/v3".to_string(),
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_at_epoch_ms,
        }
    }

    #[test]
    fn token_state_switches_at_expiry() {
        let session = session(1_000);
        assert_eq!(session.token_state_at(999), TokenState::Valid);
        assert_eq!(session.token_state_at(1_000), TokenState::Expired);
        assert_eq!(session.token_state_at(5_000), TokenState::Expired);
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let rendered = format!("{:?}", session(1));
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("portal.example.com"));
    }

    #[test]
    fn expiry_from_converts_seconds() {
        assert_eq!(expiry_from(1_000, 3600), 3_601_000);
    }

    #[test]
    fn job_deserializes_camel_case_fields() {
        let value = json!({
            "instanceUid": "a1",
            "name": "Nightly",
            "lastStatus": "Failed",
            "lastRun": "2024-05-01T10:00:00.1234567+02:00"
        });
        let job: Job = serde_json::from_value(value).unwrap();
        assert_eq!(job.name, "Nightly");
        assert_eq!(job.status, None);
        assert_eq!(job.effective_status(), Some("Failed"));
        assert_eq!(job.last_run.unwrap().unix_timestamp(), datetime!(2024-05-01 08:00 UTC).unix_timestamp());
        assert_eq!(job.kind, JobKind::BackupServer);
    }

    #[test]
    fn job_prefers_status_over_last_status() {
        let value = json!({ "name": "x", "status": "Success", "lastStatus": "Failed", "lastRun": null });
        let job: Job = serde_json::from_value(value).unwrap();
        assert_eq!(job.effective_status(), Some("Success"));
        assert!(job.last_run.is_none());
    }

    #[test]
    fn nulls_fall_back_to_defaults() {
        let value = json!({ "name": null, "malwareState": "Infected", "ipAddresses": null });
        let vm: VirtualMachine = serde_json::from_value(value).unwrap();
        assert_eq!(vm.name, "");
        assert!(vm.ip_addresses.is_empty());

        let counter: UsageCounter = serde_json::from_value(json!({ "type": "VmCloudBackups", "value": null })).unwrap();
        assert_eq!(counter.value, 0.0);
    }
}
