//! Instance software detection.
//!
//! Federated servers self-describe through nodeinfo. One probe, one JSON
//! field, and the instance is classified into the API family it speaks.
//! Every probe failure resolves to the Mastodon family: a guess serves the
//! caller better than refusing the whole request, and Mastodon-compatible
//! servers are the common case.

use std::collections::HashSet;
use std::fmt;

use metrics::counter;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// API dialect an instance speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftwareFamily {
    Mastodon,
    Misskey,
}

impl fmt::Display for SoftwareFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoftwareFamily::Mastodon => f.write_str("mastodon"),
            SoftwareFamily::Misskey => f.write_str("misskey"),
        }
    }
}

/// Servers speaking the Mastodon client API.
static MASTODON_COMPATIBLE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["mastodon", "gotosocial", "pleroma", "akkoma", "hometown"]
        .into_iter()
        .collect()
});

/// Servers speaking the Misskey client API.
static MISSKEY_COMPATIBLE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "misskey", "firefish", "iceshrimp", "sharkey", "catodon", "foundkey",
    ]
    .into_iter()
    .collect()
});

/// Match a declared software name against the family sets, case-insensitively.
pub fn classify_software(name: &str) -> Option<SoftwareFamily> {
    let name = name.to_ascii_lowercase();
    if MASTODON_COMPATIBLE.contains(name.as_str()) {
        Some(SoftwareFamily::Mastodon)
    } else if MISSKEY_COMPATIBLE.contains(name.as_str()) {
        Some(SoftwareFamily::Misskey)
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    software: NodeInfoSoftware,
}

#[derive(Debug, Deserialize)]
struct NodeInfoSoftware {
    name: String,
}

/// Probe `https://{host}/nodeinfo/2.0` and classify the declared software.
///
/// Never fails: an unreachable host, a non-2xx response, an undecodable
/// body, and an unknown software name all fall back to the Mastodon family.
pub async fn detect_family(client: &reqwest::Client, host: &str) -> SoftwareFamily {
    let url = format!("https://{host}/nodeinfo/2.0");
    let declared = match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<NodeInfo>().await {
            Ok(info) => Some(info.software.name),
            Err(e) => {
                tracing::warn!(error = ?e, %host, "nodeinfo body undecodable");
                None
            }
        },
        Ok(resp) => {
            tracing::warn!(status = %resp.status(), %host, "nodeinfo probe refused");
            None
        }
        Err(e) => {
            tracing::warn!(error = ?e, %host, "nodeinfo probe failed");
            None
        }
    };

    match declared.as_deref().and_then(classify_software) {
        Some(family) => {
            tracing::debug!(%host, %family, "instance software detected");
            family
        }
        None => {
            counter!("detect_fallbacks_total").increment(1);
            SoftwareFamily::Mastodon
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_software("Akkoma"), Some(SoftwareFamily::Mastodon));
        assert_eq!(classify_software("Sharkey"), Some(SoftwareFamily::Misskey));
        assert_eq!(classify_software("MASTODON"), Some(SoftwareFamily::Mastodon));
    }

    #[test]
    fn every_member_of_both_sets_classifies() {
        for name in MASTODON_COMPATIBLE.iter() {
            assert_eq!(classify_software(name), Some(SoftwareFamily::Mastodon));
        }
        for name in MISSKEY_COMPATIBLE.iter() {
            assert_eq!(classify_software(name), Some(SoftwareFamily::Misskey));
        }
    }

    #[test]
    fn unknown_software_is_unclassified() {
        assert_eq!(classify_software("frontpage"), None);
        assert_eq!(classify_software(""), None);
    }
}
