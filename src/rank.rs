use serde::Serialize;

use crate::aggregate::BucketMap;

/// How many pages the top URLs report keeps.
pub const TOP_URL_LIMIT: usize = 100;

/// A bucket flattened into ranking order. Field names double as the CSV
/// header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    #[serde(rename = "URL")]
    pub key: String,
    #[serde(rename = "Count")]
    pub total_count: u64,
    #[serde(rename = "Last Visited")]
    pub last_visited: String,
}

/// Sort buckets by count, highest first. The sort is stable, so equal counts
/// keep the map's insertion order.
pub fn rank(buckets: BucketMap) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = buckets
        .into_iter()
        .map(|(key, bucket)| RankedEntry {
            key,
            total_count: bucket.total_count,
            last_visited: bucket.last_visited,
        })
        .collect();
    entries.sort_by(|a, b| b.total_count.cmp(&a.total_count));
    entries
}

pub fn top_n(buckets: BucketMap, n: usize) -> Vec<RankedEntry> {
    let mut entries = rank(buckets);
    entries.truncate(n);
    entries
}
