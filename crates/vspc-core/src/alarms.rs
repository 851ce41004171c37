use crate::model::Alarm;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AlarmStatus {
    Error,
    Warning,
    Info,
    Resolved,
    Unknown,
}

impl AlarmStatus {
    /// Total mapping: anything unrecognised, including a missing status, is `Unknown`.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some("Error") => AlarmStatus::Error,
            Some("Warning") => AlarmStatus::Warning,
            Some("Info") => AlarmStatus::Info,
            Some("Resolved") => AlarmStatus::Resolved,
            _ => AlarmStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmStatus::Error => "Error",
            AlarmStatus::Warning => "Warning",
            AlarmStatus::Info => "Info",
            AlarmStatus::Resolved => "Resolved",
            AlarmStatus::Unknown => "Unknown",
        }
    }
}

fn alarm_status(alarm: &Alarm) -> AlarmStatus {
    AlarmStatus::from_status(
        alarm
            .last_activation
            .as_ref()
            .and_then(|activation| activation.status.as_deref()),
    )
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlarmStats {
    pub error: u32,
    pub warning: u32,
    pub info: u32,
    pub resolved: u32,
    pub unknown: u32,
}

impl AlarmStats {
    pub fn get(&self, status: AlarmStatus) -> u32 {
        match status {
            AlarmStatus::Error => self.error,
            AlarmStatus::Warning => self.warning,
            AlarmStatus::Info => self.info,
            AlarmStatus::Resolved => self.resolved,
            AlarmStatus::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> u32 {
        self.error + self.warning + self.info + self.resolved + self.unknown
    }

    fn slot(&mut self, status: AlarmStatus) -> &mut u32 {
        match status {
            AlarmStatus::Error => &mut self.error,
            AlarmStatus::Warning => &mut self.warning,
            AlarmStatus::Info => &mut self.info,
            AlarmStatus::Resolved => &mut self.resolved,
            AlarmStatus::Unknown => &mut self.unknown,
        }
    }
}

pub fn extract_alarm_stats(alarms: &[Alarm]) -> AlarmStats {
    let mut stats = AlarmStats::default();
    for alarm in alarms {
        *stats.slot(alarm_status(alarm)) += 1;
    }
    stats
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlarmRow {
    pub object: String,
    pub status: AlarmStatus,
    pub message: String,
}

pub fn alarm_rows(alarms: &[Alarm]) -> Vec<AlarmRow> {
    alarms
        .iter()
        .map(|alarm| AlarmRow {
            object: alarm
                .object
                .as_ref()
                .and_then(|object| object.object_name.clone())
                .unwrap_or_else(|| "Unknown Object".to_string()),
            status: alarm_status(alarm),
            message: alarm
                .last_activation
                .as_ref()
                .and_then(|activation| activation.message.clone())
                .unwrap_or_else(|| "No message".to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlarmActivation, AlarmObject};

    fn alarm(status: Option<&str>) -> Alarm {
        Alarm {
            instance_uid: None,
            object: Some(AlarmObject {
                object_name: Some("repo01".to_string()),
            }),
            last_activation: Some(AlarmActivation {
                status: status.map(str::to_string),
                message: Some("Repository is low on space".to_string()),
            }),
        }
    }

    #[test]
    fn tallies_known_statuses() {
        let alarms = vec![
            alarm(Some("Error")),
            alarm(Some("Error")),
            alarm(Some("Warning")),
            alarm(Some("Info")),
            alarm(Some("Resolved")),
        ];
        let stats = extract_alarm_stats(&alarms);
        assert_eq!(stats.error, 2);
        assert_eq!(stats.warning, 1);
        assert_eq!(stats.info, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.unknown, 0);
        assert_eq!(stats.total(), 5);
    }

    #[test]
    fn unrecognised_statuses_land_in_unknown() {
        let alarms = vec![alarm(Some("Critical")), alarm(None), Alarm::default()];
        let stats = extract_alarm_stats(&alarms);
        assert_eq!(stats.get(AlarmStatus::Unknown), 3);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn rows_use_placeholders() {
        let rows = alarm_rows(&[Alarm::default(), alarm(Some("Warning"))]);
        assert_eq!(rows[0].object, "Unknown Object");
        assert_eq!(rows[0].message, "No message");
        assert_eq!(rows[0].status, AlarmStatus::Unknown);
        assert_eq!(rows[1].object, "repo01");
        assert_eq!(rows[1].status.as_str(), "Warning");
    }
}
