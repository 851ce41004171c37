use crate::model::UsageCounter;
use serde::Serialize;
use std::collections::BTreeMap;

/// Named slots a company usage counter can land in. The variant name is the
/// counter `type` tag the portal reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum UsageBucket {
    VmCloudBackups,
    ServerCloudBackups,
    WorkstationCloudBackups,
    ApplicationCloudBackups,
    CloudDataTransferIn,
    CloudDataTransferOut,
    VmCloudReplicas,
    CloudReplicaComputeTime,
    CloudReplicaStorageUsage,
    ManagedVms,
    ManagedCloudVms,
    ManagedServerAgents,
    ManagedWorkstationAgents,
    FileShareBackupSize,
    FileShareArchiveSize,
    FileShareSourceSize,
    ObjectStorageBackupSize,
    ObjectStorageArchiveSize,
    ObjectStorageSourceSize,
    Vb365ProtectedUsers,
    Vb365ProtectedGroups,
    Vb365ProtectedSites,
    Vb365ProtectedTeams,
    Vb365BackupSize,
    CloudTotalUsage,
    CloudStorageUsage,
    CloudPerformanceTierUsage,
    CloudCapacityTierUsage,
    CloudArchiveTierUsage,
    CloudInsiderProtectionUsage,
}

impl UsageBucket {
    pub const ALL: [UsageBucket; 30] = [
        UsageBucket::VmCloudBackups,
        UsageBucket::ServerCloudBackups,
        UsageBucket::WorkstationCloudBackups,
        UsageBucket::ApplicationCloudBackups,
        UsageBucket::CloudDataTransferIn,
        UsageBucket::CloudDataTransferOut,
        UsageBucket::VmCloudReplicas,
        UsageBucket::CloudReplicaComputeTime,
        UsageBucket::CloudReplicaStorageUsage,
        UsageBucket::ManagedVms,
        UsageBucket::ManagedCloudVms,
        UsageBucket::ManagedServerAgents,
        UsageBucket::ManagedWorkstationAgents,
        UsageBucket::FileShareBackupSize,
        UsageBucket::FileShareArchiveSize,
        UsageBucket::FileShareSourceSize,
        UsageBucket::ObjectStorageBackupSize,
        UsageBucket::ObjectStorageArchiveSize,
        UsageBucket::ObjectStorageSourceSize,
        UsageBucket::Vb365ProtectedUsers,
        UsageBucket::Vb365ProtectedGroups,
        UsageBucket::Vb365ProtectedSites,
        UsageBucket::Vb365ProtectedTeams,
        UsageBucket::Vb365BackupSize,
        UsageBucket::CloudTotalUsage,
        UsageBucket::CloudStorageUsage,
        UsageBucket::CloudPerformanceTierUsage,
        UsageBucket::CloudCapacityTierUsage,
        UsageBucket::CloudArchiveTierUsage,
        UsageBucket::CloudInsiderProtectionUsage,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            UsageBucket::VmCloudBackups => "VmCloudBackups",
            UsageBucket::ServerCloudBackups => "ServerCloudBackups",
            UsageBucket::WorkstationCloudBackups => "WorkstationCloudBackups",
            UsageBucket::ApplicationCloudBackups => "ApplicationCloudBackups",
            UsageBucket::CloudDataTransferIn => "CloudDataTransferIn",
            UsageBucket::CloudDataTransferOut => "CloudDataTransferOut",
            UsageBucket::VmCloudReplicas => "VmCloudReplicas",
            UsageBucket::CloudReplicaComputeTime => "CloudReplicaComputeTime",
            UsageBucket::CloudReplicaStorageUsage => "CloudReplicaStorageUsage",
            UsageBucket::ManagedVms => "ManagedVms",
            UsageBucket::ManagedCloudVms => "ManagedCloudVms",
            UsageBucket::ManagedServerAgents => "ManagedServerAgents",
            UsageBucket::ManagedWorkstationAgents => "ManagedWorkstationAgents",
            UsageBucket::FileShareBackupSize => "FileShareBackupSize",
            UsageBucket::FileShareArchiveSize => "FileShareArchiveSize",
            UsageBucket::FileShareSourceSize => "FileShareSourceSize",
            UsageBucket::ObjectStorageBackupSize => "ObjectStorageBackupSize",
            UsageBucket::ObjectStorageArchiveSize => "ObjectStorageArchiveSize",
            UsageBucket::ObjectStorageSourceSize => "ObjectStorageSourceSize",
            UsageBucket::Vb365ProtectedUsers => "Vb365ProtectedUsers",
            UsageBucket::Vb365ProtectedGroups => "Vb365ProtectedGroups",
            UsageBucket::Vb365ProtectedSites => "Vb365ProtectedSites",
            UsageBucket::Vb365ProtectedTeams => "Vb365ProtectedTeams",
            UsageBucket::Vb365BackupSize => "Vb365BackupSize",
            UsageBucket::CloudTotalUsage => "CloudTotalUsage",
            UsageBucket::CloudStorageUsage => "CloudStorageUsage",
            UsageBucket::CloudPerformanceTierUsage => "CloudPerformanceTierUsage",
            UsageBucket::CloudCapacityTierUsage => "CloudCapacityTierUsage",
            UsageBucket::CloudArchiveTierUsage => "CloudArchiveTierUsage",
            UsageBucket::CloudInsiderProtectionUsage => "CloudInsiderProtectionUsage",
        }
    }

    pub fn group(&self) -> UsageGroup {
        use UsageBucket::*;
        match self {
            VmCloudBackups | ServerCloudBackups | WorkstationCloudBackups
            | ApplicationCloudBackups => UsageGroup::Backups,
            CloudDataTransferIn | CloudDataTransferOut => UsageGroup::DataTransfer,
            VmCloudReplicas | CloudReplicaComputeTime | CloudReplicaStorageUsage => {
                UsageGroup::Replicas
            }
            ManagedVms | ManagedCloudVms | ManagedServerAgents | ManagedWorkstationAgents => {
                UsageGroup::Managed
            }
            FileShareBackupSize | FileShareArchiveSize | FileShareSourceSize => {
                UsageGroup::FileShares
            }
            ObjectStorageBackupSize | ObjectStorageArchiveSize | ObjectStorageSourceSize => {
                UsageGroup::ObjectStorage
            }
            Vb365ProtectedUsers | Vb365ProtectedGroups | Vb365ProtectedSites
            | Vb365ProtectedTeams | Vb365BackupSize => UsageGroup::Microsoft365,
            CloudTotalUsage | CloudStorageUsage | CloudPerformanceTierUsage
            | CloudCapacityTierUsage | CloudArchiveTierUsage | CloudInsiderProtectionUsage => {
                UsageGroup::CloudStorage
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum UsageGroup {
    Backups,
    DataTransfer,
    Replicas,
    Managed,
    FileShares,
    ObjectStorage,
    Microsoft365,
    CloudStorage,
}

impl UsageGroup {
    pub fn title(&self) -> &'static str {
        match self {
            UsageGroup::Backups => "Cloud backups",
            UsageGroup::DataTransfer => "Data transfer",
            UsageGroup::Replicas => "Cloud replicas",
            UsageGroup::Managed => "Managed resources",
            UsageGroup::FileShares => "File shares",
            UsageGroup::ObjectStorage => "Object storage",
            UsageGroup::Microsoft365 => "Microsoft 365",
            UsageGroup::CloudStorage => "Cloud storage",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UsageSummary {
    values: BTreeMap<UsageBucket, f64>,
}

impl UsageSummary {
    pub fn get(&self, bucket: UsageBucket) -> f64 {
        self.values.get(&bucket).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UsageBucket, f64)> + '_ {
        self.values.iter().map(|(bucket, value)| (*bucket, *value))
    }
}

/// Maps each bucket to the first counter carrying its tag. Missing tags read
/// as zero and unknown tags are ignored.
pub fn aggregate(counters: &[UsageCounter]) -> UsageSummary {
    let values = UsageBucket::ALL
        .iter()
        .map(|bucket| {
            let value = counters
                .iter()
                .find(|counter| counter.kind == bucket.tag())
                .map(|counter| counter.value)
                .unwrap_or(0.0);
            (*bucket, value)
        })
        .collect();
    UsageSummary { values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(kind: &str, value: f64) -> UsageCounter {
        UsageCounter {
            kind: kind.to_string(),
            value,
        }
    }

    #[test]
    fn looks_up_by_exact_tag() {
        let counters = vec![
            counter("VmCloudBackups", 12.0),
            counter("CloudTotalUsage", 4096.0),
            counter("vmcloudbackups", 99.0),
        ];
        let summary = aggregate(&counters);
        assert_eq!(summary.get(UsageBucket::VmCloudBackups), 12.0);
        assert_eq!(summary.get(UsageBucket::CloudTotalUsage), 4096.0);
    }

    #[test]
    fn missing_tags_read_as_zero() {
        let summary = aggregate(&[counter("SomethingNew", 7.0)]);
        for bucket in UsageBucket::ALL {
            assert_eq!(summary.get(bucket), 0.0, "{bucket:?}");
        }
        assert_eq!(summary.iter().count(), UsageBucket::ALL.len());
    }

    #[test]
    fn first_matching_counter_wins() {
        let counters = vec![counter("ManagedVms", 3.0), counter("ManagedVms", 5.0)];
        assert_eq!(aggregate(&counters).get(UsageBucket::ManagedVms), 3.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let counters = vec![
            counter("Vb365ProtectedUsers", 250.0),
            counter("CloudDataTransferOut", 1.5),
        ];
        assert_eq!(aggregate(&counters), aggregate(&counters));
    }

    #[test]
    fn tags_match_serialized_names() {
        for bucket in UsageBucket::ALL {
            let json = serde_json::to_value(bucket).unwrap();
            assert_eq!(json.as_str(), Some(bucket.tag()));
        }
    }
}
