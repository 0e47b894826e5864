use crate::filter::{filter_nodes, PNodeFilters};
use crate::page::{paginate, Paginated};
use crate::pnode::PNode;
use crate::sort::{sort_nodes, PNodeSortOptions};

/// One page of the node list as a client asked for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeQuery {
    pub filters: Option<PNodeFilters>,
    pub sort: Vec<PNodeSortOptions>,
    pub page: usize,
    pub page_size: usize,
}

impl NodeQuery {
    pub fn new(page: usize, page_size: usize) -> Self {
        NodeQuery {
            filters: None,
            sort: Vec::new(),
            page,
            page_size,
        }
    }

    /// Filter, then sort, then slice.
    pub fn apply(&self, nodes: &[PNode]) -> Paginated<PNode> {
        let filtered = filter_nodes(nodes, self.filters.as_ref());
        let sorted = sort_nodes(&filtered, &self.sort);

        paginate(sorted, self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::node;
    use crate::pnode::PNodeStatus;

    fn sample() -> Vec<PNode> {
        vec![
            node("a", PNodeStatus::Offline, 50.0),
            node("b", PNodeStatus::Online, 99.0),
            node("c", PNodeStatus::Online, 80.0),
        ]
    }

    #[test]
    fn filters_before_paginating() {
        let query = NodeQuery {
            filters: Some(PNodeFilters {
                min_uptime: Some(90.0),
                ..Default::default()
            }),
            ..NodeQuery::new(1, 20)
        };

        let page = query.apply(&sample());

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].identity.pubkey, "b");
        assert!(!page.has_more);
    }

    #[test]
    fn sorts_before_paginating() {
        let query = NodeQuery {
            sort: PNodeSortOptions::parse_list("status:asc,uptime:asc"),
            ..NodeQuery::new(2, 1)
        };

        let page = query.apply(&sample());

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].identity.pubkey, "b");
        assert_eq!(page.total, 3);
        assert!(page.has_more);
    }
}
