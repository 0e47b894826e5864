#[macro_use]
extern crate log;

mod rpc;

use anyhow::{anyhow, Result};
use clap::Parser;
use pnode_common::config::Thresholds;
use pnode_common::mock::MockNetwork;
use std::net::ToSocketAddrs;
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, value_parser, default_value = "0.0.0.0")]
    bind: String,
    #[clap(short, long, value_parser, default_value = "6000")]
    port: u16,
    #[clap(short, long, value_parser, env = "PNODE_MOCK_NODES", default_value = "120")]
    nodes: usize,
    #[clap(short, long, value_parser, env = "PNODE_MOCK_SEED", default_value = "1")]
    seed: u64,
    /// Seconds between simulated network changes
    #[clap(short, long, value_parser, default_value = "10")]
    tick: u64,
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

    let network = Arc::new(RwLock::new(MockNetwork::new(args.nodes, args.seed)));
    info!("generated {} mock pnodes (seed={})", args.nodes, args.seed);

    tokio::spawn(rpc::advance_loop(
        network.clone(),
        Duration::from_secs(args.tick.max(1)),
    ));

    let addr = bind_addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow!("failed to resolve {}", bind_addr))?;

    info!("start listening on {}", addr);

    warp::serve(rpc::routes(network, Thresholds::default()))
        .run(addr)
        .await;

    Ok(())
}
