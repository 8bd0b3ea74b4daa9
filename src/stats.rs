use crate::history::DateWindow;
use crate::rank::RankedEntry;

/// Everything the reporters need from one extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub window: Option<DateWindow>,
    pub domains: Vec<RankedEntry>,
    pub mail: Vec<RankedEntry>,
    pub top_urls: Vec<RankedEntry>,
    pub rows_read: usize,
    pub total_visits: u64,
    pub visits_dropped: u64,
}
