#[macro_use]
extern crate log;

pub mod config;
pub mod filter;
pub mod health;
pub mod mock;
pub mod page;
pub mod pnode;
pub mod sort;
pub mod view;

pub use semver;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::pnode::*;
    use chrono::{TimeZone, Utc};

    pub fn node(pubkey: &str, status: PNodeStatus, uptime_percentage: f64) -> PNode {
        let seen = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        PNode {
            identity: PNodeIdentity {
                pubkey: pubkey.to_owned(),
                gossip: "127.0.0.1:9001".to_owned(),
                prpc: None,
                version: "0.7.3".to_owned(),
                shred_version: None,
            },
            status,
            storage: PNodeStorageMetrics::default(),
            performance: PNodePerformanceMetrics {
                uptime_percentage,
                ..Default::default()
            },
            staking: PNodeStakingInfo::default(),
            geo: None,
            last_seen: seen,
            first_seen: seen,
            metadata: PNodeMetadata::default(),
        }
    }

    pub fn with_geo(mut node: PNode, country: &str, code: &str, city: &str) -> PNode {
        node.geo = Some(PNodeGeoInfo {
            country: country.to_owned(),
            country_code: code.to_owned(),
            city: city.to_owned(),
            latitude: 0.0,
            longitude: 0.0,
        });
        node
    }
}
