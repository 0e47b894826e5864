use crate::source::Source;
use anyhow::Result;
use chrono::{DateTime, Utc};
use pnode_common::config::Config;
use pnode_common::pnode::{ClusterStats, NetworkHealth, PNode};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub interval: Duration,
    pub stale_time: Duration,
    pub gc_time: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    /// When unset the query is fetched once and then only on invalidation.
    pub periodic: bool,
}

struct Entry<T> {
    data: Arc<T>,
    fetched_at: Instant,
    updated_at: DateTime<Utc>,
}

struct QueryState<T> {
    entry: Option<Entry<T>>,
    error: Option<String>,
    fetching: bool,
    invalidated: bool,
    observed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySnapshot<T> {
    pub key: &'static str,
    pub data: Option<Arc<T>>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
}

/// A cached value for one data category, kept fresh by its own refresh task.
pub struct Query<T> {
    key: &'static str,
    policy: RefreshPolicy,
    state: RwLock<QueryState<T>>,
    wake: Notify,
}

impl<T> Query<T> {
    pub fn new(key: &'static str, policy: RefreshPolicy) -> Self {
        Query {
            key,
            policy,
            state: RwLock::new(QueryState {
                entry: None,
                error: None,
                fetching: false,
                invalidated: false,
                observed: false,
            }),
            wake: Notify::new(),
        }
    }

    /// Reads the current state. Reading stale data wakes the refresh task.
    /// Data past the gc window is dropped only when no refresh task owns the
    /// query; an observed query keeps its last data through failed fetches.
    pub fn snapshot(&self) -> QuerySnapshot<T> {
        let now = Instant::now();

        {
            let mut state = self.state.write().unwrap();
            let expired = !state.observed
                && state
                    .entry
                    .as_ref()
                    .map_or(false, |e| now.duration_since(e.fetched_at) > self.policy.gc_time);

            if expired {
                debug!("{}: dropping data past gc window", self.key);
                state.entry = None;
            }
        }

        let state = self.state.read().unwrap();
        let is_stale = match &state.entry {
            Some(e) => state.invalidated || now.duration_since(e.fetched_at) > self.policy.stale_time,
            None => true,
        };

        if is_stale && !state.fetching {
            self.wake.notify_one();
        }

        QuerySnapshot {
            key: self.key,
            data: state.entry.as_ref().map(|e| e.data.clone()),
            error: state.error.clone(),
            updated_at: state.entry.as_ref().map(|e| e.updated_at),
            is_loading: state.fetching && state.entry.is_none(),
            is_fetching: state.fetching,
            is_stale,
        }
    }

    /// Marks the cached value stale and makes the refresh task fetch now.
    pub fn invalidate(&self) {
        self.state.write().unwrap().invalidated = true;
        self.wake.notify_one();
    }

    pub fn set_data(&self, data: T) {
        let mut state = self.state.write().unwrap();

        state.entry = Some(Entry {
            data: Arc::new(data),
            fetched_at: Instant::now(),
            updated_at: Utc::now(),
        });
        state.error = None;
        state.invalidated = false;
    }

    fn set_error(&self, error: String) {
        self.state.write().unwrap().error = Some(error);
    }

    fn set_fetching(&self, fetching: bool) {
        self.state.write().unwrap().fetching = fetching;
    }

    /// Fetches once, retrying failed attempts as configured. On failure the
    /// previous data is kept and the error recorded.
    pub async fn refresh<F, Fut>(&self, fetch: &F) -> Result<()>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.set_fetching(true);

        let mut attempt = 0;
        let result = loop {
            match fetch().await {
                Ok(data) => break Ok(data),
                Err(e) if attempt < self.policy.retries => {
                    attempt += 1;
                    debug!("{}: attempt {} failed: {:?}", self.key, attempt, e);
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(e) => break Err(e),
            }
        };

        self.set_fetching(false);

        match result {
            Ok(data) => {
                self.set_data(data);
                debug!("{}: refreshed", self.key);
                Ok(())
            }
            Err(e) => {
                warn!("{}: refresh failed, keeping previous data", self.key);
                warn!("{:?}", e);
                self.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Refresh loop. Never returns.
    pub async fn run<F, Fut>(self: Arc<Self>, fetch: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.state.write().unwrap().observed = true;

        loop {
            let _ = self.refresh(&fetch).await;

            if self.policy.periodic {
                tokio::select! {
                    _ = tokio::time::sleep(self.policy.interval) => {}
                    _ = self.wake.notified() => {
                        debug!("{}: woken before interval", self.key);
                    }
                }
            } else {
                self.wake.notified().await;
            }
        }
    }
}

/// The set of queries the monitor keeps warm.
pub struct QueryClient {
    pub pnodes: Arc<Query<Vec<PNode>>>,
    pub cluster_stats: Arc<Query<ClusterStats>>,
    pub network_health: Arc<Query<NetworkHealth>>,
}

impl QueryClient {
    pub fn new(config: &Config) -> Self {
        let policy = |interval_ms: u64| RefreshPolicy {
            interval: Duration::from_millis(interval_ms),
            stale_time: config.cache.stale_time(),
            gc_time: config.cache.gc_time(),
            retries: config.api.retries,
            retry_delay: config.api.retry_delay(),
            periodic: config.features.real_time_updates,
        };
        let intervals = &config.refresh_intervals;

        QueryClient {
            pnodes: Arc::new(Query::new("pnodes", policy(intervals.pnode_list_ms))),
            cluster_stats: Arc::new(Query::new(
                "clusterStats",
                policy(intervals.cluster_stats_ms),
            )),
            network_health: Arc::new(Query::new(
                "networkHealth",
                policy(intervals.network_health_ms),
            )),
        }
    }

    pub fn refresh_all(&self) {
        info!("invalidating all queries");

        self.pnodes.invalidate();
        self.cluster_stats.invalidate();
        self.network_health.invalidate();
    }

    /// Starts one refresh task per query.
    pub fn spawn(&self, source: Arc<Source>) {
        let s = source.clone();
        tokio::spawn(self.pnodes.clone().run(move || {
            let s = s.clone();
            async move { s.fetch_pnodes().await }
        }));

        let s = source.clone();
        tokio::spawn(self.cluster_stats.clone().run(move || {
            let s = s.clone();
            async move { s.fetch_cluster_stats().await }
        }));

        let s = source;
        tokio::spawn(self.network_health.clone().run(move || {
            let s = s.clone();
            async move { s.fetch_network_health().await }
        }));
    }
}
