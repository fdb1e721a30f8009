// Feed assembly: per-family ordering policy, metadata, and the encoded
// channel shape.

use chrono::{TimeZone, Utc};
use fedi_timeline_feed::feed::{self, CanonicalItem, FeedMetadata};
use fedi_timeline_feed::{Account, InstanceRef, SoftwareFamily};

fn item(id: &str, day: u32, hour: u32) -> CanonicalItem {
    CanonicalItem {
        id: id.to_owned(),
        title: format!("post {id}"),
        link: format!("https://example.social/@a/{id}"),
        author: "a".to_owned(),
        body_html: "<p>x</p>".to_owned(),
        published_at: Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(),
    }
}

fn metadata(family: SoftwareFamily) -> FeedMetadata {
    let instance = InstanceRef::new("example.social", "abcd1234WXYZ", family);
    let account = Account {
        handle: "alice@example.social".into(),
        instance_host: "example.social".into(),
    };
    FeedMetadata::new(
        &instance,
        &account,
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap(),
    )
}

fn guids(channel: &rss::Channel) -> Vec<String> {
    channel
        .items()
        .iter()
        .map(|i| i.guid().expect("guid").value().to_owned())
        .collect()
}

#[test]
fn mastodon_items_are_sorted_newest_first() {
    let items = vec![item("a", 1, 10), item("b", 3, 9), item("c", 2, 12)];
    let channel = feed::assemble(&metadata(SoftwareFamily::Mastodon), items, SoftwareFamily::Mastodon);
    assert_eq!(guids(&channel), ["b", "c", "a"]);
}

#[test]
fn mastodon_sort_is_stable_on_equal_timestamps() {
    let items = vec![item("first", 2, 12), item("second", 2, 12), item("newer", 3, 9)];
    let channel = feed::assemble(&metadata(SoftwareFamily::Mastodon), items, SoftwareFamily::Mastodon);
    assert_eq!(guids(&channel), ["newer", "first", "second"]);
}

#[test]
fn misskey_items_keep_retrieval_order() {
    let items = vec![item("a", 1, 10), item("b", 3, 9), item("c", 2, 12)];
    let channel = feed::assemble(&metadata(SoftwareFamily::Misskey), items, SoftwareFamily::Misskey);
    assert_eq!(guids(&channel), ["a", "b", "c"]);
}

#[test]
fn empty_timeline_still_encodes_a_valid_channel() {
    let channel = feed::assemble(&metadata(SoftwareFamily::Mastodon), Vec::new(), SoftwareFamily::Mastodon);
    assert!(channel.items().is_empty());

    let xml = channel.to_string();
    assert!(xml.contains("<rss"));
    assert!(xml.contains("s Timeline</title>"));
}

#[test]
fn channel_carries_the_fixed_header_fields() {
    let meta = metadata(SoftwareFamily::Mastodon);
    assert_eq!(meta.feed_id, "example.social-WXYZ");

    let channel = feed::assemble(&meta, vec![item("a", 1, 10)], SoftwareFamily::Mastodon);
    assert_eq!(channel.title(), "alice@example.social's Timeline");
    assert_eq!(channel.link(), "https://example.social/@alice");
    assert_eq!(channel.generator(), Some(feed::GENERATOR));
    assert_eq!(channel.copyright(), Some(feed::COPYRIGHT));

    let encoded = channel.items()[0].clone();
    assert_eq!(encoded.title(), Some("post a"));
    assert_eq!(encoded.description(), Some("<p>x</p>"));
    assert!(encoded.pub_date().is_some());
}
