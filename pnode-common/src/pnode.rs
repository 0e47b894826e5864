use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNodeIdentity {
    /// Base58 encoded public key
    pub pubkey: String,
    /// Gossip address (ip:port)
    pub gossip: String,
    pub prpc: Option<String>,
    pub version: String,
    #[serde(default)]
    pub shred_version: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PNodeStatus {
    Online,
    Offline,
    Degraded,
    Syncing,
    #[serde(other)]
    Unknown,
}

impl PNodeStatus {
    /// Health rank used when sorting by status. Lower is healthier.
    pub fn rank(&self) -> u8 {
        match self {
            PNodeStatus::Online => 0,
            PNodeStatus::Syncing => 1,
            PNodeStatus::Degraded => 2,
            PNodeStatus::Offline => 3,
            PNodeStatus::Unknown => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PNodeStatus::Online => "Online",
            PNodeStatus::Offline => "Offline",
            PNodeStatus::Degraded => "Degraded",
            PNodeStatus::Syncing => "Syncing",
            PNodeStatus::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<PNodeStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Some(PNodeStatus::Online),
            "offline" => Some(PNodeStatus::Offline),
            "degraded" => Some(PNodeStatus::Degraded),
            "syncing" => Some(PNodeStatus::Syncing),
            "unknown" => Some(PNodeStatus::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for PNodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNodeStorageMetrics {
    pub total_capacity: u64,
    pub used_capacity: u64,
    pub free_capacity: u64,
    pub page_count: u64,
    pub bucket_count: u64,
    pub redundancy_level: f64,
}

impl PNodeStorageMetrics {
    /// Used share of the total capacity in percent. Zero capacity reports 0.
    pub fn utilization(&self) -> f64 {
        if self.total_capacity == 0 {
            return 0.0;
        }

        self.used_capacity as f64 / self.total_capacity as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bandwidth {
    pub inbound: f64,
    pub outbound: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNodePerformanceMetrics {
    /// Uptime in seconds
    pub uptime: u64,
    /// 0-100
    pub uptime_percentage: f64,
    /// Average response time in ms
    pub response_time: f64,
    pub requests_per_second: f64,
    pub requests_total: u64,
    pub failed_requests: u64,
    pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rewards {
    pub epoch: u64,
    pub epoch_rewards: f64,
    pub total_rewards: f64,
    pub pending_rewards: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Era {
    DeepSouth,
    Munich,
    Herrenberg,
    Reinheim,
    #[serde(other)]
    Unknown,
}

impl Era {
    pub fn parse(s: &str) -> Option<Era> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deep-south" => Some(Era::DeepSouth),
            "munich" => Some(Era::Munich),
            "herrenberg" => Some(Era::Herrenberg),
            "reinheim" => Some(Era::Reinheim),
            "unknown" => Some(Era::Unknown),
            _ => None,
        }
    }
}

impl Default for Era {
    fn default() -> Self {
        Era::Unknown
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNodeStakingInfo {
    pub staked_xand: f64,
    pub delegated_xand: f64,
    /// 0-100
    pub commission: f64,
    pub rewards: Rewards,
    pub era: Era,
    pub boost_factor: f64,
}

impl PNodeStakingInfo {
    pub fn total_stake(&self) -> f64 {
        self.staked_xand + self.delegated_xand
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNodeGeoInfo {
    pub country: String,
    pub country_code: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PNodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNode {
    pub identity: PNodeIdentity,
    pub status: PNodeStatus,
    pub storage: PNodeStorageMetrics,
    pub performance: PNodePerformanceMetrics,
    pub staking: PNodeStakingInfo,
    #[serde(default)]
    pub geo: Option<PNodeGeoInfo>,
    pub last_seen: DateTime<Utc>,
    pub first_seen: DateTime<Utc>,
    #[serde(default)]
    pub metadata: PNodeMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageTotals {
    pub capacity: u64,
    pub used: u64,
    pub free: u64,
}

/// Cluster-wide statistics as reported by the pRPC endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
    #[serde(rename = "totalPNodes")]
    pub total_pnodes: u64,
    #[serde(rename = "onlinePNodes")]
    pub online_pnodes: u64,
    #[serde(rename = "offlinePNodes")]
    pub offline_pnodes: u64,
    pub total_storage: StorageTotals,
    pub total_staked: f64,
    pub average_uptime: f64,
    pub average_response_time: f64,
    pub network_version: String,
    pub current_epoch: u64,
    /// 0-100
    pub epoch_progress: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHealth {
    pub status: HealthLevel,
    pub online_percentage: f64,
    pub average_response_time: f64,
    pub storage_utilization: f64,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_node() {
        let raw = serde_json::json!({
            "identity": {
                "pubkey": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
                "gossip": "10.0.0.1:8001",
                "prpc": null,
                "version": "0.7.3",
                "shredVersion": 4021
            },
            "status": "syncing",
            "storage": {
                "totalCapacity": 1000,
                "usedCapacity": 400,
                "freeCapacity": 600,
                "pageCount": 12,
                "bucketCount": 3,
                "redundancyLevel": 2.5
            },
            "performance": {
                "uptime": 3600,
                "uptimePercentage": 99.5,
                "responseTime": 42.0,
                "requestsPerSecond": 10.0,
                "requestsTotal": 100,
                "failedRequests": 1,
                "bandwidth": { "inbound": 1.0, "outbound": 2.0 }
            },
            "staking": {
                "stakedXand": 100.0,
                "delegatedXand": 50.0,
                "commission": 5.0,
                "rewards": {
                    "epoch": 9,
                    "epochRewards": 1.0,
                    "totalRewards": 10.0,
                    "pendingRewards": 0.5
                },
                "era": "deep-south",
                "boostFactor": 16.0
            },
            "geo": null,
            "lastSeen": "2024-05-01T12:00:00Z",
            "firstSeen": "2024-01-01T00:00:00Z",
            "metadata": { "name": "alpha" }
        });

        let node: PNode = serde_json::from_value(raw).unwrap();

        assert_eq!(node.status, PNodeStatus::Syncing);
        assert_eq!(node.staking.era, Era::DeepSouth);
        assert_eq!(node.staking.total_stake(), 150.0);
        assert_eq!(node.identity.shred_version, Some(4021));
        assert_eq!(node.metadata.name.as_deref(), Some("alpha"));
        assert_eq!(node.storage.utilization(), 40.0);
    }

    #[test]
    fn unrecognised_status_and_era_decode_as_unknown() {
        let status: PNodeStatus = serde_json::from_str("\"rebooting\"").unwrap();
        let era: Era = serde_json::from_str("\"stuttgart\"").unwrap();

        assert_eq!(status, PNodeStatus::Unknown);
        assert_eq!(era, Era::Unknown);
    }

    #[test]
    fn status_rank_puts_healthiest_first() {
        let mut all = vec![
            PNodeStatus::Unknown,
            PNodeStatus::Offline,
            PNodeStatus::Degraded,
            PNodeStatus::Syncing,
            PNodeStatus::Online,
        ];
        all.sort_by_key(|s| s.rank());

        assert_eq!(
            all,
            vec![
                PNodeStatus::Online,
                PNodeStatus::Syncing,
                PNodeStatus::Degraded,
                PNodeStatus::Offline,
                PNodeStatus::Unknown,
            ]
        );
        assert_eq!(PNodeStatus::Degraded.to_string(), "Degraded");
    }

    #[test]
    fn cluster_stats_use_pnode_casing() {
        let stats = ClusterStats {
            total_pnodes: 3,
            online_pnodes: 2,
            offline_pnodes: 1,
            total_storage: StorageTotals::default(),
            total_staked: 0.0,
            average_uptime: 0.0,
            average_response_time: 0.0,
            network_version: "0.7.3".to_owned(),
            current_epoch: 1,
            epoch_progress: 50.0,
            last_updated: Utc::now(),
        };
        let value = serde_json::to_value(&stats).unwrap();

        assert_eq!(value["totalPNodes"], 3);
        assert_eq!(value["onlinePNodes"], 2);
        assert_eq!(value["totalStorage"]["capacity"], 0);
    }
}
