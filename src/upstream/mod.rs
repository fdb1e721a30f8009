//! Per-family upstream providers.
//!
//! Each API family gets one adapter implementing [`types::TimelineSource`].
//! Dispatch is an explicit match on the detected family, never a string
//! comparison at the call site.

pub mod mastodon;
pub mod misskey;
pub mod types;

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::detect::SoftwareFamily;
use self::types::TimelineSource;

/// Enum-keyed dispatch from family to provider.
pub fn adapter_for(family: SoftwareFamily, client: reqwest::Client) -> Box<dyn TimelineSource> {
    match family {
        SoftwareFamily::Mastodon => Box::new(mastodon::MastodonAdapter::new(client)),
        SoftwareFamily::Misskey => Box::new(misskey::MisskeyAdapter::new(client)),
    }
}

/// One-time metrics registration (so series show up if a recorder is wired).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "timeline_items_total",
            "Canonical items produced from upstream timelines."
        );
        describe_counter!(
            "timeline_fetch_errors_total",
            "Upstream refusals on calls with no fallback."
        );
        describe_counter!(
            "upstream_absorbed_errors_total",
            "Upstream failures degraded to a fallback value."
        );
        describe_counter!(
            "detect_fallbacks_total",
            "Detection probes that fell back to the Mastodon family."
        );
        describe_histogram!(
            "timeline_fetch_ms",
            "Timeline fetch + normalization time in milliseconds."
        );
    });
}
