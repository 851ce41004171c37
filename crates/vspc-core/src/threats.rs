use crate::model::VirtualMachine;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Critical,
    High,
}

impl Severity {
    pub fn from_malware_state(state: &str) -> Option<Self> {
        match state {
            "Infected" => Some(Severity::Critical),
            "Suspicious" => Some(Severity::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub severity: Severity,
    pub name: String,
    pub date: Option<String>,
    pub ip_addresses: Vec<String>,
}

pub fn extract_threats(vms: &[VirtualMachine]) -> Vec<Threat> {
    vms.iter()
        .filter_map(|vm| {
            let severity = Severity::from_malware_state(vm.malware_state.as_deref()?)?;
            Some(Threat {
                severity,
                name: vm.name.clone(),
                date: vm.latest_restore_point_date.clone(),
                ip_addresses: vm.ip_addresses.clone(),
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThreatCounts {
    pub critical: u32,
    pub high: u32,
}

pub fn count_threats(threats: &[Threat]) -> ThreatCounts {
    threats
        .iter()
        .fold(ThreatCounts::default(), |mut counts, threat| {
            match threat.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
            }
            counts
        })
}
