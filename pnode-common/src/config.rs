use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://rpc.xandeum.network";
pub const DEFAULT_PRPC_URL: &str = "https://prpc.xandeum.network";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub rpc_url: String,
    pub prpc_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            prpc_url: DEFAULT_PRPC_URL.to_owned(),
            timeout_ms: 30_000,
            retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

/// Refresh interval per data category, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshIntervals {
    pub pnode_list_ms: u64,
    pub cluster_stats_ms: u64,
    pub network_health_ms: u64,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        RefreshIntervals {
            pnode_list_ms: 30_000,
            cluster_stats_ms: 15_000,
            network_health_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl PaginationConfig {
    /// Falls back to the default size and keeps the result within
    /// `1..=max_page_size`.
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub stale_time_ms: u64,
    pub gc_time_ms: u64,
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_millis(self.gc_time_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            stale_time_ms: 10_000,
            gc_time_ms: 300_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub real_time_updates: bool,
    pub geo_mapping: bool,
    pub export: bool,
    pub mock_data: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            real_time_updates: true,
            geo_mapping: true,
            export: true,
            mock_data: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// uptime >= healthy is healthy, >= degraded is degraded
    pub uptime_healthy: f64,
    pub uptime_degraded: f64,
    /// response time <= fast is fast, <= acceptable is acceptable (ms)
    pub response_fast_ms: f64,
    pub response_acceptable_ms: f64,
    /// storage utilisation in percent
    pub storage_warning: f64,
    pub storage_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            uptime_healthy: 99.0,
            uptime_degraded: 95.0,
            response_fast_ms: 100.0,
            response_acceptable_ms: 500.0,
            storage_warning: 80.0,
            storage_critical: 95.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub refresh_intervals: RefreshIntervals,
    pub pagination: PaginationConfig,
    pub cache: CacheConfig,
    pub features: Features,
    pub thresholds: Thresholds,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.pagination.default_page_size == 0 || self.pagination.max_page_size == 0 {
            bail!("page sizes must be positive")
        }

        if self.pagination.default_page_size > self.pagination.max_page_size {
            bail!(
                "default page size {} exceeds max page size {}",
                self.pagination.default_page_size,
                self.pagination.max_page_size
            )
        }

        let intervals = &self.refresh_intervals;
        if intervals.pnode_list_ms == 0
            || intervals.cluster_stats_ms == 0
            || intervals.network_health_ms == 0
        {
            bail!("refresh intervals must be positive")
        }

        let t = &self.thresholds;
        if t.uptime_degraded > t.uptime_healthy {
            bail!("uptime degraded threshold is above the healthy threshold")
        }

        if t.response_fast_ms > t.response_acceptable_ms {
            bail!("fast response threshold is above the acceptable threshold")
        }

        if t.storage_warning > t.storage_critical {
            bail!("storage warning threshold is above the critical threshold")
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.cache.gc_time(), Duration::from_secs(300));
    }

    #[test]
    fn generated_data_is_opt_in() {
        let features = Features::default();

        assert!(!features.mock_data);
        assert!(features.real_time_updates && features.geo_mapping && features.export);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.thresholds.storage_warning = 99.0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_default_page_size_above_max() {
        let mut config = Config::default();
        config.pagination.default_page_size = 500;

        assert!(config.validate().is_err());
    }

    #[test]
    fn clamps_page_size() {
        let pagination = PaginationConfig::default();

        assert_eq!(pagination.clamp_page_size(None), 20);
        assert_eq!(pagination.clamp_page_size(Some(0)), 1);
        assert_eq!(pagination.clamp_page_size(Some(50)), 50);
        assert_eq!(pagination.clamp_page_size(Some(1000)), 100);
    }
}
