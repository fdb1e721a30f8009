//! Canonical items and feed assembly.
//!
//! The last stop before encoding: canonical items are ordered and handed to
//! the `rss` crate. Mastodon-family timelines are re-sorted newest-first;
//! Misskey-family timelines are emitted exactly as retrieved. The upstream
//! APIs differ here and the difference is preserved.

use chrono::{DateTime, Utc};
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::detect::SoftwareFamily;
use crate::upstream::types::{Account, InstanceRef};

pub const GENERATOR: &str = "fedi-timeline-feed";
pub const COPYRIGHT: &str = "Powered by fedi-timeline-feed. All rights of the posts in this feed belong to the original authors.";

/// The family-agnostic representation of one post, ready for encoding.
/// Built once per upstream post, never mutated.
#[derive(Debug, Clone)]
pub struct CanonicalItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub author: String,
    pub body_html: String,
    pub published_at: DateTime<Utc>,
}

/// Per-request feed header fields.
#[derive(Debug, Clone)]
pub struct FeedMetadata {
    pub title: String,
    pub feed_id: String,
    pub home_link: String,
    pub updated_at: DateTime<Utc>,
}

impl FeedMetadata {
    pub fn new(instance: &InstanceRef, account: &Account, updated_at: DateTime<Utc>) -> Self {
        let local = account.handle.split('@').next().unwrap_or_default();
        Self {
            title: format!("{}'s Timeline", account.handle),
            feed_id: feed_id(&instance.host, &instance.credential),
            home_link: format!("https://{}/@{}", instance.host, local),
            updated_at,
        }
    }
}

/// `{host}-{last 4 characters of the access credential}`.
fn feed_id(host: &str, credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{host}-{tail}")
}

/// Order items per family policy and encode the channel.
pub fn assemble(
    meta: &FeedMetadata,
    mut items: Vec<CanonicalItem>,
    family: SoftwareFamily,
) -> Channel {
    if family == SoftwareFamily::Mastodon {
        // Stable sort: ties keep the order the adapter produced.
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }

    let items: Vec<Item> = items.iter().map(encode_item).collect();

    ChannelBuilder::default()
        .title(meta.title.clone())
        .link(meta.home_link.clone())
        .description(meta.title.clone())
        .generator(Some(GENERATOR.to_owned()))
        .copyright(Some(COPYRIGHT.to_owned()))
        .last_build_date(Some(meta.updated_at.to_rfc2822()))
        .items(items)
        .build()
}

fn encode_item(item: &CanonicalItem) -> Item {
    let guid = GuidBuilder::default()
        .value(item.id.clone())
        .permalink(false)
        .build();
    ItemBuilder::default()
        .guid(Some(guid))
        .title(Some(item.title.clone()))
        .link(Some(item.link.clone()))
        .author(Some(item.author.clone()))
        .description(Some(item.body_html.clone()))
        .pub_date(Some(item.published_at.to_rfc2822()))
        .build()
}
