// Misskey-family normalization against a static timeline fixture.
// Replies and renotes arrive embedded, so everything here is pure.

use fedi_timeline_feed::upstream::misskey::{MisskeyAdapter, Note};
use fedi_timeline_feed::{CanonicalItem, InstanceRef, SoftwareFamily};

const TIMELINE_JSON: &str = include_str!("fixtures/misskey_timeline.json");

fn fixture_notes() -> Vec<Note> {
    serde_json::from_str(TIMELINE_JSON).expect("fixture decodes")
}

fn instance() -> InstanceRef {
    InstanceRef::new("misskey.example", "abcd1234WXYZ", SoftwareFamily::Misskey)
}

fn normalize_all() -> Vec<CanonicalItem> {
    let instance = instance();
    fixture_notes()
        .iter()
        .map(|note| MisskeyAdapter::note_to_item(note, &instance))
        .collect()
}

#[test]
fn every_upstream_note_yields_one_item() {
    let items = normalize_all();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "n1");
    assert_eq!(items[1].id, "n2");
    assert_eq!(items[2].id, "n3");
}

#[test]
fn titles_combine_author_and_leading_text() {
    let items = normalize_all();
    assert_eq!(
        items[0].title,
        "Erin (erin@misskey.example): Long rambling note that easily exceeds fifty chara..."
    );
    assert_eq!(items[1].title, "frank (frank@misskey.example): Agreed!...");
    assert_eq!(items[2].title, "Heidi (heidi@misskey.example): No text...");
}

#[test]
fn content_warning_leads_the_body() {
    let items = normalize_all();
    assert!(items[0]
        .body_html
        .starts_with("<p><strong>CW: long post</strong></p>"));
}

#[test]
fn unknown_mime_types_degrade_to_a_file_link() {
    let items = normalize_all();
    let body = &items[0].body_html;
    assert!(body.contains(r#"<img src="https://drive.misskey.example/p.png" alt="Image Attachment">"#));
    assert!(body.contains(r#"<a href="https://drive.misskey.example/doc.pdf">File Attachment</a>"#));
}

#[test]
fn embedded_replies_render_under_an_attribution_block() {
    let items = normalize_all();
    let body = &items[1].body_html;
    let block_at = body
        .find("<p>Replying to Grace (grace@remote.example):</p>")
        .expect("reply block");
    let quoted_at = body.find("<p>Original question</p>").expect("reply body");
    let own_at = body.find("<p>Agreed!</p>").expect("own body");
    assert!(block_at < quoted_at);
    assert!(quoted_at < own_at);
    // The embedded reply brings its attachment along.
    assert!(body.contains("q.jpg"));
}

#[test]
fn renote_resolution_stops_after_one_level() {
    let items = normalize_all();
    let body = &items[2].body_html;
    assert!(body.contains("<p>Reposted from Ivan (ivan@misskey.example):</p>"));
    assert!(body.contains("<p>Check this out</p>"));
    assert!(!body.contains("Deep secret"));
    assert!(!body.contains("Reposted from Judy"));
}

#[test]
fn missing_note_url_falls_back_to_the_instance_permalink() {
    let items = normalize_all();
    assert_eq!(items[0].link, "https://misskey.example/notes/n1");
    assert_eq!(items[1].link, "https://misskey.example/notes/n2");
}
