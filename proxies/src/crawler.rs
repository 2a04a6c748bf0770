//! Crawler (seeder) service.

use serde_json::json;
use types::{service_names, PeerCounts};

use crate::Result;

crate::define_service_proxy!(
    /// Proxy for the crawler service.
    CrawlerProxy,
    service_names::CRAWLER
);

impl CrawlerProxy {
    /// Peer statistics gathered by the crawler.
    pub async fn get_peer_counts(&self) -> Result<PeerCounts> {
        self.proxy.send_for("get_peer_counts", json!({}), "peer_counts").await
    }

    /// Addresses of peers seen after `after` (seconds since epoch), paged.
    pub async fn get_ips_after_timestamp(
        &self,
        after: u64,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<String>> {
        let data = json!({ "after": after, "offset": offset, "limit": limit });
        self.proxy.send_for("get_ips_after_timestamp", data, "ips").await
    }
}
