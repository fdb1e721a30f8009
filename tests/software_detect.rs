// Software-family classification and the detection fallback.

use fedi_timeline_feed::detect::{classify_software, detect_family};
use fedi_timeline_feed::SoftwareFamily;

#[test]
fn declared_names_classify_case_insensitively() {
    assert_eq!(classify_software("Akkoma"), Some(SoftwareFamily::Mastodon));
    assert_eq!(classify_software("Sharkey"), Some(SoftwareFamily::Misskey));
    assert_eq!(classify_software("gotosocial"), Some(SoftwareFamily::Mastodon));
    assert_eq!(classify_software("Firefish"), Some(SoftwareFamily::Misskey));
    assert_eq!(classify_software("wordpress"), None);
}

#[tokio::test]
async fn unreachable_probe_falls_back_to_mastodon() {
    // The .invalid TLD never resolves; the probe failure must be absorbed
    // into the default family rather than surfaced.
    let client = reqwest::Client::new();
    let family = detect_family(&client, "down.invalid").await;
    assert_eq!(family, SoftwareFamily::Mastodon);
}
