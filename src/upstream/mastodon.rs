//! Mastodon-family provider.
//!
//! Speaks the Mastodon client API: bearer-authenticated GETs against the
//! credential-verification, home-timeline, and single-status endpoints.
//! Identity and reply lookups degrade silently; only the timeline fetch can
//! fail the request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::content::{self, BodyParts, ReplyRef, RepostRef, NEST_DEPTH_LIMIT};
use crate::error::FeedError;
use crate::feed::CanonicalItem;
use crate::media::{self, MediaRef};
use crate::upstream::types::{qualify_handle, Account, InstanceRef, TimelineSource};

/// One status as the home-timeline endpoint returns it. Reblogs nest a full
/// status one level down.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub spoiler_text: String,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
    #[serde(default)]
    pub media_attachments: Vec<MediaAttachment>,
    pub account: StatusAccount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusAccount {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub acct: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaAttachment {
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifiedAccount {
    acct: String,
}

pub struct MastodonAdapter {
    client: reqwest::Client,
}

impl MastodonAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn get(&self, instance: &InstanceRef, url: String) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&instance.credential)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Reply-author lookup. Every failure maps to `None`; the caller then
    /// renders the post without a reply block.
    async fn fetch_status(&self, instance: &InstanceRef, id: &str) -> Option<Status> {
        let url = format!("https://{}/api/v1/statuses/{id}", instance.host);
        let resp = match self.get(instance, url).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), id, "status lookup refused");
                counter!("upstream_absorbed_errors_total").increment(1);
                return None;
            }
            Err(e) => {
                tracing::warn!(error = ?e, id, "status lookup failed");
                counter!("upstream_absorbed_errors_total").increment(1);
                return None;
            }
        };
        match resp.json::<Status>().await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(error = ?e, id, "status lookup undecodable");
                counter!("upstream_absorbed_errors_total").increment(1);
                None
            }
        }
    }

    /// Body slots for one status. `depth` bounds repost recursion: a nested
    /// status contributes only its warning, body, and attachments.
    fn status_parts(status: &Status, depth: u8) -> BodyParts {
        let mut parts = BodyParts {
            warning: nonempty(&status.spoiler_text),
            body: status.content.clone(),
            attachments: attachments_of(status),
            ..BodyParts::default()
        };
        if depth < NEST_DEPTH_LIMIT {
            if let Some(reblog) = &status.reblog {
                parts.repost = Some(RepostRef {
                    author: status_author(reblog),
                    rendered: content::compose_body(&Self::status_parts(reblog, depth + 1)),
                });
            }
        }
        parts
    }

    /// Normalize one status, resolving the replied-to author when present.
    pub async fn status_to_item(&self, instance: &InstanceRef, status: &Status) -> CanonicalItem {
        let mut parts = Self::status_parts(status, 0);
        if let Some(reply_id) = &status.in_reply_to_id {
            if let Some(replied) = self.fetch_status(instance, reply_id).await {
                parts.reply = Some(ReplyRef {
                    author: status_author(&replied),
                    rendered: None,
                });
            }
        }

        let author = status_author(status);
        CanonicalItem {
            id: status.id.clone(),
            title: author.clone(),
            link: status
                .url
                .clone()
                .or_else(|| status.uri.clone())
                .unwrap_or_default(),
            author,
            body_html: content::compose_body(&parts),
            published_at: status.created_at,
        }
    }
}

fn status_author(status: &Status) -> String {
    content::display_name(
        Some(&status.account.display_name),
        Some(&status.account.acct),
    )
}

fn nonempty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

fn attachments_of(status: &Status) -> Vec<MediaRef> {
    status
        .media_attachments
        .iter()
        .filter_map(|m| {
            let kind = media::kind_from_mastodon_type(&m.media_type)?;
            let url = m.url.clone()?;
            Some(MediaRef { kind, url })
        })
        .collect()
}

#[async_trait]
impl TimelineSource for MastodonAdapter {
    async fn fetch_account(&self, instance: &InstanceRef) -> Result<Account, FeedError> {
        let url = format!(
            "https://{}/api/v1/accounts/verify_credentials",
            instance.host
        );
        let verified = match self.get(instance, url).send().await {
            Ok(resp) if resp.status().is_success() => resp.json::<VerifiedAccount>().await.ok(),
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), host = %instance.host, "credential verification refused");
                None
            }
            Err(e) => {
                tracing::warn!(error = ?e, host = %instance.host, "credential verification failed");
                None
            }
        };

        // Identity is cosmetic here; a failed lookup degrades to the bare
        // host instead of failing the request.
        Ok(match verified {
            Some(v) => Account {
                handle: qualify_handle(&v.acct, &instance.host),
                instance_host: instance.host.clone(),
            },
            None => {
                counter!("upstream_absorbed_errors_total").increment(1);
                Account {
                    handle: instance.host.clone(),
                    instance_host: instance.host.clone(),
                }
            }
        })
    }

    async fn fetch_timeline(
        &self,
        instance: &InstanceRef,
    ) -> Result<Vec<CanonicalItem>, FeedError> {
        let t0 = std::time::Instant::now();
        let url = format!("https://{}/api/v1/timelines/home", instance.host);
        let resp = self.get(instance, url).send().await?;
        if !resp.status().is_success() {
            counter!("timeline_fetch_errors_total").increment(1);
            return Err(FeedError::upstream(resp.status()));
        }
        let statuses = resp.json::<Vec<Status>>().await?;

        // Upstream order is the ordering contract for the pre-sort list, so
        // each item (and its reply sub-fetch) is awaited before the next.
        let mut items = Vec::with_capacity(statuses.len());
        for status in &statuses {
            items.push(self.status_to_item(instance, status).await);
        }

        histogram!("timeline_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("timeline_items_total").increment(items.len() as u64);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "mastodon"
    }
}
