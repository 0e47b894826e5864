#[macro_use]
extern crate log;

mod api;
mod query;
mod source;

use crate::api::Context;
use crate::query::QueryClient;
use crate::source::Source;
use anyhow::{anyhow, Result};
use clap::Parser;
use pnode_common::config::{
    ApiConfig, CacheConfig, Config, Features, PaginationConfig, RefreshIntervals, Thresholds,
};
use std::net::ToSocketAddrs;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, value_parser, default_value = "0.0.0.0")]
    bind: String,
    #[clap(short, long, value_parser, default_value = "3040")]
    port: u16,

    #[clap(long, value_parser, env = "XANDEUM_RPC_URL", default_value = "https://rpc.xandeum.network")]
    rpc_url: String,
    #[clap(long, value_parser, env = "XANDEUM_PRPC_URL", default_value = "https://prpc.xandeum.network")]
    prpc_url: String,
    #[clap(long, value_parser, env = "PNODE_TIMEOUT_MS", default_value = "30000")]
    timeout_ms: u64,
    #[clap(long, value_parser, env = "PNODE_RETRIES", default_value = "3")]
    retries: u32,
    #[clap(long, value_parser, env = "PNODE_RETRY_DELAY_MS", default_value = "1000")]
    retry_delay_ms: u64,

    #[clap(long, value_parser, env = "PNODE_LIST_INTERVAL_MS", default_value = "30000")]
    pnode_list_interval_ms: u64,
    #[clap(long, value_parser, env = "PNODE_CLUSTER_STATS_INTERVAL_MS", default_value = "15000")]
    cluster_stats_interval_ms: u64,
    #[clap(long, value_parser, env = "PNODE_NETWORK_HEALTH_INTERVAL_MS", default_value = "10000")]
    network_health_interval_ms: u64,

    #[clap(long, value_parser, env = "PNODE_DEFAULT_PAGE_SIZE", default_value = "20")]
    default_page_size: usize,
    #[clap(long, value_parser, env = "PNODE_MAX_PAGE_SIZE", default_value = "100")]
    max_page_size: usize,

    #[clap(long, value_parser, env = "PNODE_STALE_TIME_MS", default_value = "10000")]
    stale_time_ms: u64,
    #[clap(long, value_parser, env = "PNODE_GC_TIME_MS", default_value = "300000")]
    gc_time_ms: u64,

    #[clap(long, env = "PNODE_NO_REAL_TIME_UPDATES", action)]
    no_real_time_updates: bool,
    #[clap(long, env = "PNODE_NO_GEO_MAPPING", action)]
    no_geo_mapping: bool,
    #[clap(long, env = "PNODE_NO_EXPORT", action)]
    no_export: bool,
    /// Serve generated data instead of querying the pRPC endpoint
    #[clap(long, env = "PNODE_MOCK_DATA", action)]
    mock_data: bool,
    #[clap(long, value_parser, default_value = "120")]
    mock_nodes: usize,
    #[clap(long, value_parser, default_value = "1")]
    mock_seed: u64,

    #[clap(long, value_parser, env = "PNODE_UPTIME_HEALTHY", default_value = "99")]
    uptime_healthy: f64,
    #[clap(long, value_parser, env = "PNODE_UPTIME_DEGRADED", default_value = "95")]
    uptime_degraded: f64,
    #[clap(long, value_parser, env = "PNODE_RESPONSE_FAST_MS", default_value = "100")]
    response_fast_ms: f64,
    #[clap(long, value_parser, env = "PNODE_RESPONSE_ACCEPTABLE_MS", default_value = "500")]
    response_acceptable_ms: f64,
    #[clap(long, value_parser, env = "PNODE_STORAGE_WARNING", default_value = "80")]
    storage_warning: f64,
    #[clap(long, value_parser, env = "PNODE_STORAGE_CRITICAL", default_value = "95")]
    storage_critical: f64,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            api: ApiConfig {
                rpc_url: self.rpc_url.clone(),
                prpc_url: self.prpc_url.clone(),
                timeout_ms: self.timeout_ms,
                retries: self.retries,
                retry_delay_ms: self.retry_delay_ms,
            },
            refresh_intervals: RefreshIntervals {
                pnode_list_ms: self.pnode_list_interval_ms,
                cluster_stats_ms: self.cluster_stats_interval_ms,
                network_health_ms: self.network_health_interval_ms,
            },
            pagination: PaginationConfig {
                default_page_size: self.default_page_size,
                max_page_size: self.max_page_size,
            },
            cache: CacheConfig {
                stale_time_ms: self.stale_time_ms,
                gc_time_ms: self.gc_time_ms,
            },
            features: Features {
                real_time_updates: !self.no_real_time_updates,
                geo_mapping: !self.no_geo_mapping,
                export: !self.no_export,
                mock_data: self.mock_data,
            },
            thresholds: Thresholds {
                uptime_healthy: self.uptime_healthy,
                uptime_degraded: self.uptime_degraded,
                response_fast_ms: self.response_fast_ms,
                response_acceptable_ms: self.response_acceptable_ms,
                storage_warning: self.storage_warning,
                storage_critical: self.storage_critical,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(_) = std::env::var("RUST_LOG") {
        std::env::set_var("RUST_LOG", "info");
    }

    pretty_env_logger::init();

    ctrlc::set_handler(move || {
        warn!("receive terminate signal... process will be exited.");
        std::process::exit(1);
    })?;

    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    let config = args.config();
    config.validate()?;
    debug!("{:?}", config);

    if config.features.mock_data {
        info!("serving {} generated pnodes (seed={})", args.mock_nodes, args.mock_seed);
    } else {
        info!("pRPC endpoint {}", config.api.prpc_url);
    }
    info!("RPC endpoint {}", config.api.rpc_url);

    let source = Arc::new(Source::from_config(&config, args.mock_nodes, args.mock_seed)?);
    let queries = Arc::new(QueryClient::new(&config));
    queries.spawn(source);

    let ctx = Context {
        queries,
        config: Arc::new(config),
    };

    let addr = bind_addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow!("failed to resolve {}", bind_addr))?;

    info!("start listening on {}", addr);

    warp::serve(api::routes(ctx)).run(addr).await;

    Ok(())
}
