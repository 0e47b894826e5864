use crate::config::Thresholds;
use crate::health;
use crate::pnode::{
    Bandwidth, ClusterStats, Era, NetworkHealth, PNode, PNodeGeoInfo, PNodeIdentity,
    PNodeMetadata, PNodePerformanceMetrics, PNodeStakingInfo, PNodeStatus, PNodeStorageMetrics,
    Rewards, StorageTotals,
};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const EPOCH_SECS: i64 = 2 * 24 * 60 * 60;
const VERSIONS: &[&str] = &["0.6.4", "0.7.0", "0.7.1", "0.7.3"];
const ERAS: &[Era] = &[Era::DeepSouth, Era::Munich, Era::Herrenberg, Era::Reinheim];
const NAMES: &[&str] = &[
    "atlas", "borealis", "cobalt", "driftwood", "ember", "fjord", "granite", "harbor",
];
const LOCATIONS: &[(&str, &str, &str, f64, f64)] = &[
    ("Germany", "DE", "Frankfurt", 50.11, 8.68),
    ("Germany", "DE", "Munich", 48.14, 11.58),
    ("United States", "US", "Ashburn", 39.04, -77.49),
    ("United States", "US", "Dallas", 32.78, -96.80),
    ("Netherlands", "NL", "Amsterdam", 52.37, 4.90),
    ("Singapore", "SG", "Singapore", 1.35, 103.82),
    ("Japan", "JP", "Tokyo", 35.68, 139.69),
    ("Brazil", "BR", "Sao Paulo", -23.55, -46.63),
];
const GIB: u64 = 1 << 30;

/// In-memory stand-in for a pRPC endpoint. Seeded, so the same seed always
/// produces the same network.
pub struct MockNetwork {
    rng: StdRng,
    nodes: Vec<PNode>,
    epoch: u64,
}

impl MockNetwork {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let epoch = rng.gen_range(100..400);
        let nodes = (0..count).map(|_| random_node(&mut rng, epoch)).collect();

        debug!("generated {} mock pnodes (seed={})", count, seed);

        MockNetwork { rng, nodes, epoch }
    }

    pub fn nodes(&self) -> &[PNode] {
        &self.nodes
    }

    /// Moves the network forward one observation: metrics drift, a few
    /// nodes change status, and online nodes are seen again.
    pub fn advance(&mut self) {
        let now = Utc::now();

        for node in self.nodes.iter_mut() {
            let perf = &mut node.performance;
            perf.response_time = (perf.response_time + self.rng.gen_range(-20.0..20.0)).max(5.0);
            perf.requests_per_second = (perf.requests_per_second + self.rng.gen_range(-5.0..5.0)).max(0.0);
            perf.requests_total += self.rng.gen_range(0..500);

            if self.rng.gen_bool(0.05) {
                node.status = random_status(&mut self.rng);
            }

            if node.status != PNodeStatus::Offline {
                perf.uptime += 30;
                node.last_seen = now;
            }
        }
    }

    pub fn cluster_stats(&self) -> ClusterStats {
        let count = self.nodes.len() as u64;
        let online = self
            .nodes
            .iter()
            .filter(|n| n.status == PNodeStatus::Online)
            .count() as u64;
        let offline = self
            .nodes
            .iter()
            .filter(|n| n.status == PNodeStatus::Offline)
            .count() as u64;

        let total_storage = self.nodes.iter().fold(StorageTotals::default(), |acc, n| {
            StorageTotals {
                capacity: acc.capacity + n.storage.total_capacity,
                used: acc.used + n.storage.used_capacity,
                free: acc.free + n.storage.free_capacity,
            }
        });

        let average = |f: fn(&PNode) -> f64| {
            if count == 0 {
                0.0
            } else {
                self.nodes.iter().map(f).sum::<f64>() / count as f64
            }
        };

        let network_version = self
            .nodes
            .iter()
            .filter_map(|n| semver::Version::parse(&n.identity.version).ok())
            .max()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_owned());

        let now = Utc::now();

        ClusterStats {
            total_pnodes: count,
            online_pnodes: online,
            offline_pnodes: offline,
            total_storage,
            total_staked: self.nodes.iter().map(|n| n.staking.total_stake()).sum(),
            average_uptime: average(|n| n.performance.uptime_percentage),
            average_response_time: average(|n| n.performance.response_time),
            network_version,
            current_epoch: self.epoch,
            epoch_progress: (now.timestamp().rem_euclid(EPOCH_SECS)) as f64 / EPOCH_SECS as f64
                * 100.0,
            last_updated: now,
        }
    }

    pub fn network_health(&self, thresholds: &Thresholds) -> NetworkHealth {
        health::network_health(&self.nodes, thresholds)
    }
}

fn random_status(rng: &mut StdRng) -> PNodeStatus {
    match rng.gen_range(0..100) {
        0..=74 => PNodeStatus::Online,
        75..=82 => PNodeStatus::Syncing,
        83..=89 => PNodeStatus::Degraded,
        90..=97 => PNodeStatus::Offline,
        _ => PNodeStatus::Unknown,
    }
}

fn random_pubkey(rng: &mut StdRng) -> String {
    (0..44)
        .map(|_| BASE58[rng.gen_range(0..BASE58.len())] as char)
        .collect()
}

fn random_node(rng: &mut StdRng, epoch: u64) -> PNode {
    let status = random_status(rng);
    let ip = format!(
        "{}.{}.{}.{}",
        rng.gen_range(11..223),
        rng.gen_range(0..256),
        rng.gen_range(0..256),
        rng.gen_range(1..255)
    );

    let total_capacity = rng.gen_range(1..=64) * 64 * GIB;
    let used_capacity = (total_capacity as f64 * rng.gen_range(0.05..0.99)) as u64;

    let uptime_percentage = match status {
        PNodeStatus::Online => rng.gen_range(97.0..100.0),
        PNodeStatus::Syncing | PNodeStatus::Degraded => rng.gen_range(85.0..99.0),
        PNodeStatus::Offline | PNodeStatus::Unknown => rng.gen_range(20.0..90.0),
    };
    let requests_total = rng.gen_range(10_000..5_000_000);

    let staked = rng.gen_range(1_000.0..500_000.0);
    let now = Utc::now();
    let first_seen = now - Duration::days(rng.gen_range(1..365));
    let last_seen = match status {
        PNodeStatus::Offline => now - Duration::minutes(rng.gen_range(10..600)),
        _ => now - Duration::seconds(rng.gen_range(0..60)),
    };

    let geo = if rng.gen_bool(0.9) {
        LOCATIONS
            .choose(rng)
            .map(|(country, code, city, lat, lon)| PNodeGeoInfo {
                country: country.to_string(),
                country_code: code.to_string(),
                city: city.to_string(),
                latitude: *lat,
                longitude: *lon,
            })
    } else {
        None
    };

    let name = if rng.gen_bool(0.6) {
        NAMES
            .choose(rng)
            .map(|n| format!("{}-{}", n, rng.gen_range(1..100)))
    } else {
        None
    };

    PNode {
        identity: PNodeIdentity {
            pubkey: random_pubkey(rng),
            gossip: format!("{}:9001", ip),
            prpc: Some(format!("http://{}:6000", ip)).filter(|_| rng.gen_bool(0.7)),
            version: VERSIONS.choose(rng).unwrap_or(&"0.7.3").to_string(),
            shred_version: Some(rng.gen_range(1_000..60_000)),
        },
        status,
        storage: PNodeStorageMetrics {
            total_capacity,
            used_capacity,
            free_capacity: total_capacity - used_capacity,
            page_count: used_capacity / (1 << 20),
            bucket_count: rng.gen_range(1..500),
            redundancy_level: rng.gen_range(1.0..4.0),
        },
        performance: PNodePerformanceMetrics {
            uptime: (now - first_seen).num_seconds().max(0) as u64,
            uptime_percentage,
            response_time: rng.gen_range(10.0..800.0),
            requests_per_second: rng.gen_range(0.0..250.0),
            requests_total,
            failed_requests: rng.gen_range(0..requests_total / 100),
            bandwidth: Bandwidth {
                inbound: rng.gen_range(1e5..5e7),
                outbound: rng.gen_range(1e5..5e7),
            },
        },
        staking: PNodeStakingInfo {
            staked_xand: staked,
            delegated_xand: if rng.gen_bool(0.5) {
                rng.gen_range(0.0..staked)
            } else {
                0.0
            },
            commission: rng.gen_range(0.0..20.0),
            rewards: Rewards {
                epoch,
                epoch_rewards: rng.gen_range(0.0..100.0),
                total_rewards: rng.gen_range(100.0..50_000.0),
                pending_rewards: rng.gen_range(0.0..500.0),
            },
            era: *ERAS.choose(rng).unwrap_or(&Era::Unknown),
            boost_factor: *[1.0, 2.0, 4.0, 16.0].choose(rng).unwrap_or(&1.0),
        },
        geo,
        last_seen,
        first_seen,
        metadata: PNodeMetadata {
            name,
            ..Default::default()
        },
    }
}
