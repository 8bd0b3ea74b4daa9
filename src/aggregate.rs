//! Visit aggregation.
//!
//! Two independent passes share the same accumulation rule: add the record's
//! visit count to its bucket and overwrite the bucket's `last_visited` with
//! the record's timestamp. The second assignment is last-write-wins in
//! iteration order, not "latest timestamp".
//!
//! Keys are the literal substrings pulled out of the URL. Nothing is
//! lower-cased, trimmed or otherwise normalized.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::history::VisitRecord;

/// Accumulated visits for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    pub total_count: u64,
    pub last_visited: String,
}

impl Bucket {
    pub fn record(&mut self, visit: &VisitRecord) {
        self.total_count += visit.visit_count;
        self.last_visited.clone_from(&visit.timestamp);
    }
}

/// Buckets in first-seen order, which is what ranking ties fall back to.
pub type BucketMap = IndexMap<String, Bucket>;

fn accumulate(buckets: &mut BucketMap, key: &str, visit: &VisitRecord) {
    match buckets.get_mut(key) {
        Some(bucket) => bucket.record(visit),
        None => {
            let mut bucket = Bucket::default();
            bucket.record(visit);
            buckets.insert(key.to_string(), bucket);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlClass<'a> {
    /// `http`/`https` URL and its host.
    Domain(&'a str),
    /// `mailto:` URL and its recipient.
    Mail(&'a str),
    Other,
}

/// Classify a URL by scheme prefix.
///
/// The host is the third `/`-separated segment, so `https://a.com/x` gives
/// `a.com` and anything with fewer than three segments falls through to
/// `Other`. The recipient is everything after the first `:`.
pub fn classify(url: &str) -> UrlClass<'_> {
    if url.starts_with("http") {
        match url.split('/').nth(2) {
            Some(host) => UrlClass::Domain(host),
            None => UrlClass::Other,
        }
    } else if url.starts_with("mailto:") {
        match url.split_once(':') {
            Some((_, recipient)) => UrlClass::Mail(recipient),
            None => UrlClass::Other,
        }
    } else {
        UrlClass::Other
    }
}

/// Domain and mail-recipient buckets for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainAggregation {
    pub domains: BucketMap,
    pub mail: BucketMap,
    /// Visit count carried by records that matched neither scheme.
    pub dropped: u64,
}

impl DomainAggregation {
    pub fn add(&mut self, visit: &VisitRecord) {
        match classify(&visit.url) {
            UrlClass::Domain(host) => accumulate(&mut self.domains, host, visit),
            UrlClass::Mail(recipient) => accumulate(&mut self.mail, recipient, visit),
            UrlClass::Other => {
                debug!(action = "skip", component = "domain_aggregation", url = %visit.url, "Ignoring URL with unsupported scheme");
                self.dropped += visit.visit_count;
            }
        }
    }

    pub fn total_count(&self) -> u64 {
        let domains: u64 = self.domains.values().map(|b| b.total_count).sum();
        let mail: u64 = self.mail.values().map(|b| b.total_count).sum();
        domains + mail + self.dropped
    }
}

/// Per-URL buckets feeding the top pages ranking. Every record counts.
pub fn add_url(urls: &mut BucketMap, visit: &VisitRecord) {
    accumulate(urls, &visit.url, visit);
}

pub fn aggregate_domains<'a, I>(records: I) -> DomainAggregation
where
    I: IntoIterator<Item = &'a VisitRecord>,
{
    let mut aggregation = DomainAggregation::default();
    for visit in records {
        aggregation.add(visit);
    }
    info!(
        action = "complete",
        component = "domain_aggregation",
        domains = aggregation.domains.len(),
        recipients = aggregation.mail.len(),
        dropped = aggregation.dropped,
        "Domain aggregation completed"
    );
    aggregation
}

pub fn aggregate_urls<'a, I>(records: I) -> BucketMap
where
    I: IntoIterator<Item = &'a VisitRecord>,
{
    let mut urls = BucketMap::new();
    for visit in records {
        add_url(&mut urls, visit);
    }
    info!(action = "complete", component = "url_aggregation", urls = urls.len(), "URL aggregation completed");
    urls
}
