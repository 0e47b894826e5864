use crate::config::Thresholds;
use crate::pnode::{HealthLevel, NetworkHealth, PNode, PNodeStatus};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseClass {
    Fast,
    Acceptable,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    Normal,
    Warning,
    Critical,
}

pub fn classify_uptime(uptime_percentage: f64, t: &Thresholds) -> HealthLevel {
    if uptime_percentage >= t.uptime_healthy {
        HealthLevel::Healthy
    } else if uptime_percentage >= t.uptime_degraded {
        HealthLevel::Degraded
    } else {
        HealthLevel::Critical
    }
}

pub fn classify_response_time(response_ms: f64, t: &Thresholds) -> ResponseClass {
    if response_ms <= t.response_fast_ms {
        ResponseClass::Fast
    } else if response_ms <= t.response_acceptable_ms {
        ResponseClass::Acceptable
    } else {
        ResponseClass::Slow
    }
}

pub fn classify_storage(utilization: f64, t: &Thresholds) -> StorageClass {
    if utilization >= t.storage_critical {
        StorageClass::Critical
    } else if utilization >= t.storage_warning {
        StorageClass::Warning
    } else {
        StorageClass::Normal
    }
}

/// Summarises a node list into a network health snapshot. The share of
/// online nodes is graded with the uptime thresholds; slow responses or
/// storage pressure can only make the level worse.
pub fn network_health(nodes: &[PNode], t: &Thresholds) -> NetworkHealth {
    let count = nodes.len() as f64;

    let (online_percentage, average_response_time) = if nodes.is_empty() {
        (0.0, 0.0)
    } else {
        let online = nodes
            .iter()
            .filter(|n| n.status == PNodeStatus::Online)
            .count() as f64;
        let response: f64 = nodes.iter().map(|n| n.performance.response_time).sum();

        (online / count * 100.0, response / count)
    };

    let total: u64 = nodes.iter().map(|n| n.storage.total_capacity).sum();
    let used: u64 = nodes.iter().map(|n| n.storage.used_capacity).sum();
    let storage_utilization = if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    };

    let mut status = classify_uptime(online_percentage, t);

    if classify_response_time(average_response_time, t) == ResponseClass::Slow {
        status = worst(status, HealthLevel::Degraded);
    }

    match classify_storage(storage_utilization, t) {
        StorageClass::Critical => status = HealthLevel::Critical,
        StorageClass::Warning => status = worst(status, HealthLevel::Degraded),
        StorageClass::Normal => {}
    }

    NetworkHealth {
        status,
        online_percentage,
        average_response_time,
        storage_utilization,
        last_updated: Utc::now(),
    }
}

fn worst(a: HealthLevel, b: HealthLevel) -> HealthLevel {
    let rank = |l: HealthLevel| match l {
        HealthLevel::Healthy => 0,
        HealthLevel::Degraded => 1,
        HealthLevel::Critical => 2,
    };

    if rank(a) >= rank(b) {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::node;

    #[test]
    fn uptime_bands() {
        let t = Thresholds::default();

        assert_eq!(classify_uptime(99.0, &t), HealthLevel::Healthy);
        assert_eq!(classify_uptime(98.9, &t), HealthLevel::Degraded);
        assert_eq!(classify_uptime(95.0, &t), HealthLevel::Degraded);
        assert_eq!(classify_uptime(94.9, &t), HealthLevel::Critical);
    }

    #[test]
    fn response_and_storage_bands() {
        let t = Thresholds::default();

        assert_eq!(classify_response_time(100.0, &t), ResponseClass::Fast);
        assert_eq!(classify_response_time(500.0, &t), ResponseClass::Acceptable);
        assert_eq!(classify_response_time(500.1, &t), ResponseClass::Slow);

        assert_eq!(classify_storage(79.9, &t), StorageClass::Normal);
        assert_eq!(classify_storage(80.0, &t), StorageClass::Warning);
        assert_eq!(classify_storage(95.0, &t), StorageClass::Critical);
    }

    #[test]
    fn network_health_from_nodes() {
        let t = Thresholds::default();
        let mut nodes = vec![
            node("a", PNodeStatus::Online, 99.0),
            node("b", PNodeStatus::Online, 99.0),
            node("c", PNodeStatus::Offline, 10.0),
            node("d", PNodeStatus::Online, 99.0),
        ];
        for n in nodes.iter_mut() {
            n.performance.response_time = 50.0;
            n.storage.total_capacity = 100;
            n.storage.used_capacity = 50;
        }

        let health = network_health(&nodes, &t);
        assert_eq!(health.online_percentage, 75.0);
        assert_eq!(health.average_response_time, 50.0);
        assert_eq!(health.storage_utilization, 50.0);
        assert_eq!(health.status, HealthLevel::Critical);

        nodes[2].status = PNodeStatus::Online;
        assert_eq!(network_health(&nodes, &t).status, HealthLevel::Healthy);

        for n in nodes.iter_mut() {
            n.performance.response_time = 900.0;
        }
        assert_eq!(network_health(&nodes, &t).status, HealthLevel::Degraded);

        for n in nodes.iter_mut() {
            n.storage.used_capacity = 99;
        }
        assert_eq!(network_health(&nodes, &t).status, HealthLevel::Critical);
    }

    #[test]
    fn empty_network_is_critical() {
        let health = network_health(&[], &Thresholds::default());

        assert_eq!(health.online_percentage, 0.0);
        assert_eq!(health.status, HealthLevel::Critical);
    }
}
