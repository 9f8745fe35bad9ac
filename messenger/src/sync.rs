use std::collections::BTreeMap;

use votecap_api::{NodeStatus, Peer};
use votecap_client::NodeClient;

use crate::error::SyncError;

/// Number of peers seen at each height.
pub fn height_histogram(peers: &[Peer]) -> BTreeMap<u64, usize> {
    let mut histogram = BTreeMap::new();
    for peer in peers {
        *histogram.entry(peer.height).or_insert(0) += 1;
    }
    histogram
}

/// Most common peer height. Ties go to the highest height.
pub fn consensus_height(histogram: &BTreeMap<u64, usize>) -> Option<u64> {
    histogram
        .iter()
        .max_by_key(|(height, count)| (**count, **height))
        .map(|(height, _)| *height)
}

/// Checks `height` against the peers' consensus height.
///
/// Returns the verdict together with the histogram, ordered by frequency,
/// for reporting. No peers means the node cannot be confirmed as synced.
pub fn validate_peers_sync(height: u64, peers: &[Peer], threshold: u64) -> (bool, Vec<(u64, usize)>) {
    let histogram = height_histogram(peers);
    let mut by_frequency: Vec<(u64, usize)> = histogram.iter().map(|(h, c)| (*h, *c)).collect();
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    let Some(consensus) = consensus_height(&histogram) else {
        return (false, by_frequency);
    };

    (height.abs_diff(consensus) <= threshold, by_frequency)
}

/// Confirms the node reports itself synced and agrees with its peers.
pub async fn verify_node_sync(client: &NodeClient, threshold: u64) -> Result<NodeStatus, SyncError> {
    let status = client.get_node_status().await?;
    if !status.synced {
        return Err(SyncError::StatusUnsynced {
            height: status.now,
            blocks_count: status.blocks_count,
        });
    }

    let peers = client.get_peers().await?;
    if peers.is_empty() {
        return Err(SyncError::NoPeers {
            height: status.now,
            blocks_count: status.blocks_count,
        });
    }

    let (synced, peers_heights) = validate_peers_sync(status.now, &peers, threshold);
    if !synced {
        return Err(SyncError::PeersUnsynced {
            height: status.now,
            blocks_count: status.blocks_count,
            peers_heights,
        });
    }

    log::debug!("Node at height {} agrees with {} peer(s)", status.now, peers.len());
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn peers(heights: &[u64]) -> Vec<Peer> {
        heights
            .iter()
            .map(|height| Peer {
                ip: "10.0.0.1".to_string(),
                port: 6002,
                version: "4.1.0".to_string(),
                height: *height,
                latency_ms: 3,
            })
            .collect()
    }

    #[test]
    fn test_plurality_height_within_threshold() {
        let (synced, heights) = validate_peers_sync(102, &peers(&[100, 100, 100, 105]), 5);
        assert!(synced);
        assert_eq!(heights, vec![(100, 3), (105, 1)]);
    }

    #[test]
    fn test_outside_threshold() {
        let (synced, _) = validate_peers_sync(90, &peers(&[100, 100, 101]), 5);
        assert!(!synced);
        let (synced, _) = validate_peers_sync(95, &peers(&[100, 100, 101]), 5);
        assert!(synced);
    }

    #[test]
    fn test_tie_goes_to_highest_height() {
        let histogram = height_histogram(&peers(&[100, 100, 110, 110, 90]));
        assert_eq!(consensus_height(&histogram), Some(110));
    }

    #[test]
    fn test_no_peers_is_unsynced() {
        let (synced, heights) = validate_peers_sync(100, &[], 5);
        assert!(!synced);
        assert!(heights.is_empty());
        assert_eq!(consensus_height(&BTreeMap::new()), None);
    }

    async fn mock_node(server: &MockServer, synced: bool, height: u64, peer_heights: &[u64]) {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/node/status");
                then.status(200).json_body(json!({
                    "data": { "synced": synced, "now": height, "blocksCount": 0, "timestamp": 0 }
                }));
            })
            .await;

        let data: Vec<_> = peer_heights
            .iter()
            .map(|h| json!({ "ip": "10.0.0.2", "port": 6002, "version": "4.1.0", "height": h, "latency": 1 }))
            .collect();
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/peers");
                then.status(200).json_body(json!({ "data": data, "meta": { "next": null } }));
            })
            .await;
    }

    #[tokio::test]
    async fn test_verify_synced_node() {
        let server = MockServer::start_async().await;
        mock_node(&server, true, 102, &[100, 100, 100, 105]).await;

        let status = verify_node_sync(&NodeClient::new(server.url("/api")), 5).await.unwrap();
        assert_eq!(status.now, 102);
    }

    #[tokio::test]
    async fn test_verify_unsynced_status() {
        let server = MockServer::start_async().await;
        mock_node(&server, false, 102, &[102]).await;

        let result = verify_node_sync(&NodeClient::new(server.url("/api")), 5).await;
        assert!(matches!(result, Err(SyncError::StatusUnsynced { height: 102, .. })));
    }

    #[tokio::test]
    async fn test_verify_lagging_node() {
        let server = MockServer::start_async().await;
        mock_node(&server, true, 50, &[100, 100]).await;

        let result = verify_node_sync(&NodeClient::new(server.url("/api")), 5).await;
        match result {
            Err(SyncError::PeersUnsynced { peers_heights, .. }) => {
                assert_eq!(peers_heights, vec![(100, 2)]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_verify_without_peers() {
        let server = MockServer::start_async().await;
        mock_node(&server, true, 102, &[]).await;

        let result = verify_node_sync(&NodeClient::new(server.url("/api")), 5).await;
        assert!(matches!(result, Err(SyncError::NoPeers { height: 102, .. })));
    }
}
