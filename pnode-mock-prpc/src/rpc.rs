use pnode_common::config::Thresholds;
use pnode_common::mock::MockNetwork;
use pnode_prpc::envelope::{
    RpcRequest, RpcResponse, GET_CLUSTER_STATS, GET_NETWORK_HEALTH, GET_PNODES, INTERNAL_ERROR,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND,
};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use warp::Filter;

pub type SharedNetwork = Arc<RwLock<MockNetwork>>;

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

pub fn dispatch(network: &MockNetwork, thresholds: &Thresholds, req: &RpcRequest) -> RpcResponse {
    let id = Some(req.id);

    if req.jsonrpc != JSONRPC_VERSION {
        return RpcResponse::failure(id, INVALID_REQUEST, "unsupported jsonrpc version");
    }

    let result = match req.method.as_str() {
        GET_PNODES => to_value(network.nodes()),
        GET_CLUSTER_STATS => to_value(network.cluster_stats()),
        GET_NETWORK_HEALTH => to_value(network.network_health(thresholds)),
        other => {
            debug!("unknown method {}", other);
            return RpcResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("method not found: {}", other),
            );
        }
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(e) => {
            error!("failed to encode {} result: {}", req.method, e);
            RpcResponse::failure(id, INTERNAL_ERROR, e)
        }
    }
}

async fn handle(
    network: SharedNetwork,
    thresholds: Thresholds,
    req: RpcRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let res = dispatch(&network.read().unwrap(), &thresholds, &req);

    Ok(warp::reply::json(&res))
}

async fn pong() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::with_status("ok", warp::http::StatusCode::OK))
}

pub fn routes(
    network: SharedNetwork,
    thresholds: Thresholds,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let network_filter = warp::any().map(move || network.clone());
    let thresholds_filter = warp::any().map(move || thresholds.clone());

    let rpc = warp::path::end()
        .and(warp::filters::method::post())
        .and(network_filter)
        .and(thresholds_filter)
        .and(warp::filters::body::json::<RpcRequest>())
        .and_then(handle);

    let pong = warp::path!("ping")
        .and(warp::filters::method::get())
        .and_then(pong);

    rpc.or(pong)
}

pub async fn advance_loop(network: SharedNetwork, every: std::time::Duration) {
    loop {
        tokio::time::sleep(every).await;

        let mut network = network.write().unwrap();
        network.advance();
        debug!("advanced mock network ({} pnodes)", network.nodes().len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnode_prpc::{PrpcClient, RpcError};
    use serde_json::json;
    use std::time::Duration;

    fn shared(count: usize) -> SharedNetwork {
        Arc::new(RwLock::new(MockNetwork::new(count, 21)))
    }

    #[test]
    fn unknown_method_is_an_error_envelope() {
        let network = MockNetwork::new(3, 1);
        let req = RpcRequest::new(7, "getEpochInfo", vec![]);

        let res = dispatch(&network, &Thresholds::default(), &req);

        assert_eq!(res.id, Some(7));
        assert!(res.result.is_none());
        assert_eq!(res.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn rejects_other_protocol_versions() {
        let network = MockNetwork::new(3, 1);
        let mut req = RpcRequest::new(1, GET_PNODES, vec![]);
        req.jsonrpc = "1.0".to_owned();

        let res = dispatch(&network, &Thresholds::default(), &req);

        assert_eq!(res.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn answers_over_http() {
        let res = warp::test::request()
            .method("POST")
            .path("/")
            .json(&json!({"jsonrpc": "2.0", "id": 3, "method": "getClusterStats", "params": []}))
            .reply(&routes(shared(9), Thresholds::default()))
            .await;

        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["id"], 3);
        assert_eq!(body["result"]["totalPNodes"], 9);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn serves_the_prpc_client() {
        let (addr, server) = warp::serve(routes(shared(15), Thresholds::default()))
            .bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let client = PrpcClient::new(format!("http://{}", addr), Duration::from_secs(5)).unwrap();

        assert_eq!(client.get_pnodes().await.unwrap().len(), 15);
        assert_eq!(client.get_cluster_stats().await.unwrap().total_pnodes, 15);
        client.get_network_health().await.unwrap();

        let err = client.call("getEpochInfo", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Remote(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn advance_loop_moves_the_network() {
        let network = shared(4);
        let response_times = |network: &SharedNetwork| -> Vec<f64> {
            network
                .read()
                .unwrap()
                .nodes()
                .iter()
                .map(|n| n.performance.response_time)
                .collect()
        };
        let before = response_times(&network);

        tokio::spawn(advance_loop(network.clone(), Duration::from_secs(5)));
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(response_times(&network), before);

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_ne!(response_times(&network), before);
    }
}
