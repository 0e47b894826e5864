use anyhow::Result;
use pnode_common::config::{Config, Thresholds};
use pnode_common::mock::MockNetwork;
use pnode_common::pnode::{ClusterStats, NetworkHealth, PNode};
use pnode_prpc::PrpcClient;
use std::sync::Mutex;

/// Where the monitor gets its data from.
pub enum Source {
    Prpc(PrpcClient),
    Mock {
        network: Mutex<MockNetwork>,
        thresholds: Thresholds,
    },
}

impl Source {
    pub fn from_config(config: &Config, mock_nodes: usize, mock_seed: u64) -> Result<Source> {
        if config.features.mock_data {
            info!("mock data mode: serving {} generated pnodes", mock_nodes);

            return Ok(Source::Mock {
                network: Mutex::new(MockNetwork::new(mock_nodes, mock_seed)),
                thresholds: config.thresholds.clone(),
            });
        }

        info!("fetching pnode data from {}", config.api.prpc_url);

        Ok(Source::Prpc(PrpcClient::new(
            config.api.prpc_url.clone(),
            config.api.timeout(),
        )?))
    }

    pub async fn fetch_pnodes(&self) -> Result<Vec<PNode>> {
        match self {
            Source::Prpc(client) => Ok(client.get_pnodes().await?),
            Source::Mock { network, .. } => {
                let mut network = lock(network);
                network.advance();
                Ok(network.nodes().to_vec())
            }
        }
    }

    pub async fn fetch_cluster_stats(&self) -> Result<ClusterStats> {
        match self {
            Source::Prpc(client) => Ok(client.get_cluster_stats().await?),
            Source::Mock { network, .. } => Ok(lock(network).cluster_stats()),
        }
    }

    pub async fn fetch_network_health(&self) -> Result<NetworkHealth> {
        match self {
            Source::Prpc(client) => Ok(client.get_network_health().await?),
            Source::Mock {
                network,
                thresholds,
            } => Ok(lock(network).network_health(thresholds)),
        }
    }
}

fn lock(network: &Mutex<MockNetwork>) -> std::sync::MutexGuard<'_, MockNetwork> {
    network.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
