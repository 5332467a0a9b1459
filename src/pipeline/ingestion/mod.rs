// Pipeline ingestion: feed clients and the per-modality pagination loop

pub mod pncp;

pub use pncp::PncpFeed;

use crate::types::{Modality, NoticeFeed, PageOutcome, RawNotice};
use metrics::counter;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a modality's pagination stopped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StopReason {
    /// An empty page was returned
    Exhausted,
    /// The feed answered with a non-success status
    Status(u16),
    /// Transport, timeout or decoding failure
    Failed(String),
    /// The configured page limit was reached
    PageLimit,
}

/// Everything fetched for one modality in a run
#[derive(Debug, Clone)]
pub struct Harvest {
    pub modality: Modality,
    pub notices: Vec<RawNotice>,
    /// Pages that returned notices
    pub pages: u32,
    pub stop: StopReason,
}

/// Paginates one modality until an empty page, a non-success status or a
/// failure. Pages are requested strictly in order; a failure only ends this
/// modality, and notices from earlier pages are kept.
pub async fn harvest_modality(
    feed: &dyn NoticeFeed,
    modality: &Modality,
    page_delay: Duration,
    max_pages: Option<u32>,
) -> Harvest {
    let mut notices = Vec::new();
    let mut page = 1u32;

    let stop = loop {
        if max_pages.is_some_and(|max| page > max) {
            break StopReason::PageLimit;
        }
        if page > 1 && !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }

        match feed.fetch_page(modality, page).await {
            Ok(PageOutcome::Notices(items)) => {
                debug!("Page {} of {} returned {} notices", page, modality.label, items.len());
                counter!("pncp_pages_fetched_total", "modality" => modality.label.clone()).increment(1);
                notices.extend(items);
                page += 1;
            }
            Ok(PageOutcome::Empty) => break StopReason::Exhausted,
            Ok(PageOutcome::Status(status)) => {
                warn!("{} page {} answered HTTP {}, stopping this modality", modality.label, page, status);
                break StopReason::Status(status);
            }
            Err(e) => {
                warn!("{} page {} failed: {}, stopping this modality", modality.label, page, e);
                counter!("pncp_page_failures_total", "modality" => modality.label.clone()).increment(1);
                break StopReason::Failed(e.to_string());
            }
        }
    };

    info!(
        "📡 {}: {} notices from {} pages ({:?})",
        modality.label,
        notices.len(),
        page - 1,
        stop
    );
    Harvest {
        modality: modality.clone(),
        notices,
        pages: page - 1,
        stop,
    }
}
