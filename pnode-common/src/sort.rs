use crate::pnode::PNode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Status,
    Uptime,
    Stake,
    ResponseTime,
    Storage,
    LastSeen,
    Name,
    /// Any field name we do not know. Compares everything as equal.
    #[serde(other)]
    Unknown,
}

impl SortField {
    pub fn parse(s: &str) -> SortField {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" => SortField::Status,
            "uptime" => SortField::Uptime,
            "stake" => SortField::Stake,
            "responsetime" | "response_time" => SortField::ResponseTime,
            "storage" => SortField::Storage,
            "lastseen" | "last_seen" => SortField::LastSeen,
            "name" => SortField::Name,
            _ => SortField::Unknown,
        }
    }

    fn compare(&self, a: &PNode, b: &PNode) -> Ordering {
        match self {
            SortField::Status => a.status.rank().cmp(&b.status.rank()),
            SortField::Uptime => a
                .performance
                .uptime_percentage
                .total_cmp(&b.performance.uptime_percentage),
            SortField::Stake => a
                .staking
                .total_stake()
                .total_cmp(&b.staking.total_stake()),
            SortField::ResponseTime => a
                .performance
                .response_time
                .total_cmp(&b.performance.response_time),
            SortField::Storage => a.storage.total_capacity.cmp(&b.storage.total_capacity),
            SortField::LastSeen => a.last_seen.cmp(&b.last_seen),
            SortField::Name => a.metadata.name.cmp(&b.metadata.name),
            SortField::Unknown => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

impl SortDirection {
    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PNodeSortOptions {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl PNodeSortOptions {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        PNodeSortOptions { field, direction }
    }

    /// Parses `field[:asc|desc]` pairs separated by commas, e.g.
    /// `status:asc,uptime:desc`. Missing or unrecognised directions are
    /// ascending.
    pub fn parse_list(s: &str) -> Vec<PNodeSortOptions> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut it = part.splitn(2, ':');
                let field = SortField::parse(it.next().unwrap_or_default());
                let direction = match it.next().map(|d| d.trim().to_ascii_lowercase()) {
                    Some(d) if d == "desc" => SortDirection::Desc,
                    _ => SortDirection::Asc,
                };

                PNodeSortOptions { field, direction }
            })
            .collect()
    }
}

/// Returns a sorted copy of `nodes`. Keys are applied in order; nodes that
/// compare equal on every key are ordered by public key. Without any
/// recognised key the input order is kept.
pub fn sort_nodes(nodes: &[PNode], sort: &[PNodeSortOptions]) -> Vec<PNode> {
    let mut sorted = nodes.to_vec();
    let keys: Vec<&PNodeSortOptions> = sort
        .iter()
        .filter(|s| s.field != SortField::Unknown)
        .collect();

    if keys.is_empty() {
        return sorted;
    }

    sorted.sort_by(|a, b| {
        keys.iter()
            .map(|s| s.direction.apply(s.field.compare(a, b)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| a.identity.pubkey.cmp(&b.identity.pubkey))
    });

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::node;
    use crate::pnode::PNodeStatus;

    fn keyed(nodes: &[PNode]) -> Vec<(PNodeStatus, f64)> {
        nodes
            .iter()
            .map(|n| (n.status, n.performance.uptime_percentage))
            .collect()
    }

    fn sample() -> Vec<PNode> {
        vec![
            node("a", PNodeStatus::Offline, 50.0),
            node("b", PNodeStatus::Online, 99.0),
            node("c", PNodeStatus::Online, 80.0),
        ]
    }

    #[test]
    fn no_sort_keeps_order() {
        let nodes = sample();
        assert_eq!(sort_nodes(&nodes, &[]), nodes);
    }

    #[test]
    fn status_then_uptime() {
        let nodes = sample();
        let sorted = sort_nodes(
            &nodes,
            &[
                PNodeSortOptions::new(SortField::Status, SortDirection::Asc),
                PNodeSortOptions::new(SortField::Uptime, SortDirection::Asc),
            ],
        );

        assert_eq!(
            keyed(&sorted),
            vec![
                (PNodeStatus::Online, 80.0),
                (PNodeStatus::Online, 99.0),
                (PNodeStatus::Offline, 50.0),
            ]
        );
        // input is untouched
        assert_eq!(nodes, sample());
    }

    #[test]
    fn uptime_directions_are_reversed() {
        let nodes = vec![
            node("a", PNodeStatus::Online, 70.0),
            node("b", PNodeStatus::Online, 99.0),
            node("c", PNodeStatus::Online, 80.0),
            node("d", PNodeStatus::Online, 12.5),
        ];

        let asc = sort_nodes(&nodes, &PNodeSortOptions::parse_list("uptime:asc"));
        let mut desc = sort_nodes(&nodes, &PNodeSortOptions::parse_list("uptime:desc"));
        desc.reverse();

        assert_eq!(asc, desc);
        assert_eq!(asc[0].identity.pubkey, "d");
    }

    #[test]
    fn stake_uses_staked_plus_delegated() {
        let mut nodes = sample();
        nodes[0].staking.staked_xand = 10.0;
        nodes[0].staking.delegated_xand = 100.0;
        nodes[1].staking.staked_xand = 50.0;
        nodes[2].staking.staked_xand = 75.0;

        let sorted = sort_nodes(
            &nodes,
            &[PNodeSortOptions::new(SortField::Stake, SortDirection::Desc)],
        );
        let order: Vec<&str> = sorted.iter().map(|n| n.identity.pubkey.as_str()).collect();

        assert_eq!(order, vec!["a", "c", "b"]);
    }

    #[test]
    fn ties_break_on_pubkey() {
        let nodes = vec![
            node("z", PNodeStatus::Online, 90.0),
            node("m", PNodeStatus::Online, 90.0),
            node("a", PNodeStatus::Online, 90.0),
        ];

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sorted = sort_nodes(&nodes, &[PNodeSortOptions::new(SortField::Uptime, direction)]);
            let order: Vec<&str> = sorted.iter().map(|n| n.identity.pubkey.as_str()).collect();
            assert_eq!(order, vec!["a", "m", "z"]);
        }
    }

    #[test]
    fn unknown_field_does_not_reorder() {
        let nodes = vec![
            node("z", PNodeStatus::Offline, 50.0),
            node("a", PNodeStatus::Online, 99.0),
        ];
        let sort = PNodeSortOptions::parse_list("colour:desc");

        assert_eq!(sort, vec![PNodeSortOptions::new(SortField::Unknown, SortDirection::Desc)]);
        assert_eq!(sort_nodes(&nodes, &sort), nodes);
    }

    #[test]
    fn parse_list_defaults_to_ascending() {
        assert_eq!(
            PNodeSortOptions::parse_list(" status , uptime:DESC,,stake:sideways"),
            vec![
                PNodeSortOptions::new(SortField::Status, SortDirection::Asc),
                PNodeSortOptions::new(SortField::Uptime, SortDirection::Desc),
                PNodeSortOptions::new(SortField::Stake, SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn unknown_field_decodes_from_json() {
        let opts: PNodeSortOptions =
            serde_json::from_str(r#"{"field":"geoDistance","direction":"desc"}"#).unwrap();
        assert_eq!(opts.field, SortField::Unknown);

        let opts: PNodeSortOptions = serde_json::from_str(r#"{"field":"responseTime"}"#).unwrap();
        assert_eq!(opts, PNodeSortOptions::new(SortField::ResponseTime, SortDirection::Asc));
    }
}
