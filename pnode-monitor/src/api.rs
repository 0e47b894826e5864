use crate::query::QueryClient;
use pnode_common::config::Config;
use pnode_common::filter::PNodeFilters;
use pnode_common::pnode::{Era, PNode, PNodeStatus};
use pnode_common::sort::PNodeSortOptions;
use pnode_common::view::NodeQuery;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

#[derive(Clone)]
pub struct Context {
    pub queries: Arc<QueryClient>,
    pub config: Arc<Config>,
}

#[derive(Debug)]
struct InvalidParameters(String);

impl warp::reject::Reject for InvalidParameters {}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Query string of `GET /pnodes`. Lists are comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct NodeListParams {
    pub status: Option<String>,
    pub era: Option<String>,
    pub country: Option<String>,
    pub min_uptime: Option<f64>,
    pub min_stake: Option<f64>,
    pub search: Option<String>,
    pub min_version: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn split_list(s: &Option<String>) -> Vec<String> {
    s.as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_list<T>(
    s: &Option<String>,
    kind: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<Vec<T>>, InvalidParameters> {
    if s.is_none() {
        return Ok(None);
    }

    split_list(s)
        .iter()
        .map(|p| {
            parse(p).ok_or_else(|| InvalidParameters(format!("unknown {} '{}'", kind, p)))
        })
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}

impl NodeListParams {
    pub fn to_query(&self, config: &Config) -> Result<NodeQuery, warp::Rejection> {
        let status = parse_list(&self.status, "status", PNodeStatus::parse)
            .map_err(warp::reject::custom)?;
        let era = parse_list(&self.era, "era", Era::parse).map_err(warp::reject::custom)?;

        let min_version = match self.min_version.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Some(semver_parse(v)?),
            _ => None,
        };

        let country = if config.features.geo_mapping && self.country.is_some() {
            Some(split_list(&self.country))
        } else {
            None
        };

        let filters = PNodeFilters {
            status,
            min_uptime: self.min_uptime,
            min_stake: self.min_stake,
            era,
            country,
            search: self.search.clone(),
            min_version,
        };

        Ok(NodeQuery {
            filters: Some(filters),
            sort: self
                .sort
                .as_deref()
                .map(PNodeSortOptions::parse_list)
                .unwrap_or_default(),
            page: self.page.unwrap_or(1),
            page_size: config.pagination.clamp_page_size(self.page_size),
        })
    }
}

fn semver_parse(v: &str) -> Result<pnode_common::semver::Version, warp::Rejection> {
    pnode_common::semver::Version::parse(v.trim_start_matches('v')).map_err(|_| {
        warp::reject::custom(InvalidParameters(format!("invalid min_version '{}'", v)))
    })
}

fn strip_geo(nodes: &mut [PNode], config: &Config) {
    if !config.features.geo_mapping {
        for node in nodes.iter_mut() {
            node.geo = None;
        }
    }
}

fn not_loaded(error: Option<String>) -> warp::reply::WithStatus<warp::reply::Json> {
    let body = ErrorBody {
        error: error.unwrap_or_else(|| "pnode list has not been loaded yet".to_owned()),
    };

    warp::reply::with_status(warp::reply::json(&body), StatusCode::SERVICE_UNAVAILABLE)
}

async fn list(
    ctx: Context,
    params: NodeListParams,
) -> Result<impl warp::Reply, warp::Rejection> {
    let query = params.to_query(&ctx.config)?;
    let snapshot = ctx.queries.pnodes.snapshot();

    let nodes = match snapshot.data {
        Some(nodes) => nodes,
        None => return Ok(not_loaded(snapshot.error)),
    };

    let mut page = query.apply(&nodes);
    strip_geo(&mut page.items, &ctx.config);

    debug!(
        "listed page {} ({} of {} pnodes)",
        page.page,
        page.items.len(),
        page.total
    );

    Ok(warp::reply::with_status(
        warp::reply::json(&page),
        StatusCode::OK,
    ))
}

async fn export(
    ctx: Context,
    params: NodeListParams,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !ctx.config.features.export {
        return Err(warp::reject::not_found());
    }

    let query = params.to_query(&ctx.config)?;
    let snapshot = ctx.queries.pnodes.snapshot();

    let nodes = match snapshot.data {
        Some(nodes) => nodes,
        None => return Ok(not_loaded(snapshot.error)),
    };

    let filtered = pnode_common::filter::filter_nodes(&nodes, query.filters.as_ref());
    let mut sorted = pnode_common::sort::sort_nodes(&filtered, &query.sort);
    strip_geo(&mut sorted, &ctx.config);

    info!("exported {} pnodes", sorted.len());

    Ok(warp::reply::with_status(
        warp::reply::json(&sorted),
        StatusCode::OK,
    ))
}

async fn get(pubkey: String, ctx: Context) -> Result<impl warp::Reply, warp::Rejection> {
    let snapshot = ctx.queries.pnodes.snapshot();

    let nodes = match snapshot.data {
        Some(nodes) => nodes,
        None => return Ok(not_loaded(snapshot.error)),
    };

    let mut node = nodes
        .iter()
        .find(|n| n.identity.pubkey == pubkey)
        .cloned()
        .ok_or_else(warp::reject::not_found)?;
    strip_geo(std::slice::from_mut(&mut node), &ctx.config);

    Ok(warp::reply::with_status(
        warp::reply::json(&node),
        StatusCode::OK,
    ))
}

async fn cluster_stats(ctx: Context) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ctx.queries.cluster_stats.snapshot()))
}

async fn network_health(ctx: Context) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ctx.queries.network_health.snapshot()))
}

async fn refresh(ctx: Context) -> Result<impl warp::Reply, warp::Rejection> {
    ctx.queries.refresh_all();

    Ok(warp::reply::with_status("ok", StatusCode::ACCEPTED))
}

async fn pong() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::with_status("ok", StatusCode::OK))
}

async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, error) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_owned())
    } else if let Some(InvalidParameters(msg)) = err.find::<InvalidParameters>() {
        (StatusCode::BAD_REQUEST, msg.clone())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_owned())
    } else {
        warn!("unhandled rejection {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { error }),
        status,
    ))
}

pub fn routes(
    ctx: Context,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let ctx_filter = warp::any().map(move || ctx.clone());

    let export = warp::path!("pnodes" / "export")
        .and(warp::filters::method::get())
        .and(ctx_filter.clone())
        .and(warp::query::<NodeListParams>())
        .and_then(export);

    let list = warp::path!("pnodes")
        .and(warp::filters::method::get())
        .and(ctx_filter.clone())
        .and(warp::query::<NodeListParams>())
        .and_then(list);

    let get = warp::path!("pnodes" / String)
        .and(warp::filters::method::get())
        .and(ctx_filter.clone())
        .and_then(get);

    let cluster_stats = warp::path!("cluster-stats")
        .and(warp::filters::method::get())
        .and(ctx_filter.clone())
        .and_then(cluster_stats);

    let network_health = warp::path!("network-health")
        .and(warp::filters::method::get())
        .and(ctx_filter.clone())
        .and_then(network_health);

    let refresh = warp::path!("refresh")
        .and(warp::filters::method::post())
        .and(ctx_filter.clone())
        .and_then(refresh);

    let pong = warp::path!("ping")
        .and(warp::filters::method::get())
        .and_then(pong);

    export
        .or(list)
        .or(get)
        .or(cluster_stats)
        .or(network_health)
        .or(refresh)
        .or(pong)
        .recover(handle_rejection)
}
