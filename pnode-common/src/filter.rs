use crate::pnode::{Era, PNode, PNodeStatus};
use semver::Version;
use serde::{Deserialize, Serialize};

/// Declarative node filters. Every criterion is optional and criteria are
/// combined with AND. An empty set behaves like an absent criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNodeFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<PNodeStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_uptime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stake: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<Vec<Era>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<Version>,
}

impl PNodeFilters {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.status).is_none()
            && self.min_uptime.is_none()
            && self.min_stake.is_none()
            && non_empty(&self.era).is_none()
            && non_empty(&self.country).is_none()
            && self.search_term().is_none()
            && self.min_version.is_none()
    }

    pub fn matches(&self, node: &PNode) -> bool {
        if let Some(status) = non_empty(&self.status) {
            if !status.contains(&node.status) {
                return false;
            }
        }

        if let Some(min_uptime) = self.min_uptime {
            if node.performance.uptime_percentage < min_uptime {
                return false;
            }
        }

        if let Some(min_stake) = self.min_stake {
            if node.staking.total_stake() < min_stake {
                return false;
            }
        }

        if let Some(era) = non_empty(&self.era) {
            if !era.contains(&node.staking.era) {
                return false;
            }
        }

        if let Some(countries) = non_empty(&self.country) {
            let geo = match &node.geo {
                Some(geo) => geo,
                None => return false,
            };

            let found = countries.iter().any(|c| {
                c.eq_ignore_ascii_case(&geo.country) || c.eq_ignore_ascii_case(&geo.country_code)
            });

            if !found {
                return false;
            }
        }

        if let Some(term) = self.search_term() {
            if !search_matches(node, &term) {
                return false;
            }
        }

        if let Some(min_version) = &self.min_version {
            match Version::parse(node.identity.version.trim_start_matches('v')) {
                Ok(version) if &version >= min_version => {}
                _ => return false,
            }
        }

        true
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

fn non_empty<T>(set: &Option<Vec<T>>) -> Option<&Vec<T>> {
    set.as_ref().filter(|s| !s.is_empty())
}

// term is already lowercased
fn search_matches(node: &PNode, term: &str) -> bool {
    if node.identity.pubkey.to_lowercase().contains(term) {
        return true;
    }

    if let Some(name) = &node.metadata.name {
        if name.to_lowercase().contains(term) {
            return true;
        }
    }

    match &node.geo {
        Some(geo) => geo.city.to_lowercase().contains(term),
        None => false,
    }
}

/// Returns the nodes matching `filters`, keeping their original order.
pub fn filter_nodes(nodes: &[PNode], filters: Option<&PNodeFilters>) -> Vec<PNode> {
    match filters {
        Some(filters) if !filters.is_empty() => nodes
            .iter()
            .filter(|n| filters.matches(n))
            .cloned()
            .collect(),
        _ => nodes.to_vec(),
    }
}
