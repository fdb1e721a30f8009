//! Misskey-family provider.
//!
//! Speaks the Misskey client API: bearer-authenticated POSTs with JSON
//! bodies. Unlike the Mastodon path, identity failure is fatal here — the
//! API gives nothing to fall back on — and replies and renotes arrive
//! embedded in the timeline payload, so no per-post lookups happen.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::json;

use crate::content::{self, BodyParts, ReplyRef, RepostRef, NEST_DEPTH_LIMIT};
use crate::error::FeedError;
use crate::feed::CanonicalItem;
use crate::media::{self, MediaRef};
use crate::upstream::types::{qualify_handle, Account, InstanceRef, TimelineSource};

/// One note as the timeline endpoint returns it. Replies and renotes nest a
/// full note one level down.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cw: Option<String>,
    pub user: NoteUser,
    #[serde(default)]
    pub files: Vec<NoteFile>,
    #[serde(default)]
    pub renote: Option<Box<Note>>,
    #[serde(default)]
    pub reply: Option<Box<Note>>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteUser {
    #[serde(default)]
    pub name: Option<String>,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteFile {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct Identity {
    username: String,
}

pub struct MisskeyAdapter {
    client: reqwest::Client,
}

impl MisskeyAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn post(
        &self,
        instance: &InstanceRef,
        path: &str,
        body: serde_json::Value,
    ) -> reqwest::RequestBuilder {
        self.client
            .post(format!("https://{}{path}", instance.host))
            .bearer_auth(&instance.credential)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
    }

    /// Body slots for one note. `depth` bounds reply/renote recursion: an
    /// embedded note contributes only its warning, text, and files.
    fn note_parts(note: &Note, instance: &InstanceRef, depth: u8) -> BodyParts {
        let mut parts = BodyParts {
            warning: note.cw.clone().filter(|cw| !cw.is_empty()),
            body: note_text_html(note),
            attachments: note
                .files
                .iter()
                .map(|f| MediaRef {
                    kind: media::kind_from_misskey_mime(&f.mime_type),
                    url: f.url.clone(),
                })
                .collect(),
            ..BodyParts::default()
        };
        if depth < NEST_DEPTH_LIMIT {
            if let Some(reply) = &note.reply {
                parts.reply = Some(ReplyRef {
                    author: note_author(reply, instance),
                    rendered: Some(content::compose_body(&Self::note_parts(
                        reply,
                        instance,
                        depth + 1,
                    ))),
                });
            }
            if let Some(renote) = &note.renote {
                parts.repost = Some(RepostRef {
                    author: note_author(renote, instance),
                    rendered: content::compose_body(&Self::note_parts(renote, instance, depth + 1)),
                });
            }
        }
        parts
    }

    /// Normalize one note. Everything needed is already in the payload.
    pub fn note_to_item(note: &Note, instance: &InstanceRef) -> CanonicalItem {
        let author = note_author(note, instance);
        let snippet = match &note.text {
            Some(text) if !text.is_empty() => content::truncate_chars(text, 50),
            _ => "No text".to_owned(),
        };
        CanonicalItem {
            id: note.id.clone(),
            title: format!("{author}: {snippet}..."),
            link: note
                .url
                .clone()
                .unwrap_or_else(|| format!("https://{}/notes/{}", instance.host, note.id)),
            author,
            body_html: content::compose_body(&Self::note_parts(note, instance, 0)),
            published_at: note.created_at,
        }
    }
}

/// `Name (user@host)`, with the display-name fallback rule applied.
fn note_author(note: &Note, instance: &InstanceRef) -> String {
    let name = content::display_name(note.user.name.as_deref(), Some(&note.user.username));
    let qualified = qualify_handle(&note.user.username, &instance.host);
    format!("{name} ({qualified})")
}

fn note_text_html(note: &Note) -> String {
    match &note.text {
        Some(text) if !text.is_empty() => format!("<p>{}</p>", encode_text(text)),
        _ => String::new(),
    }
}

#[async_trait]
impl TimelineSource for MisskeyAdapter {
    async fn fetch_account(&self, instance: &InstanceRef) -> Result<Account, FeedError> {
        let resp = self.post(instance, "/api/i", json!({})).send().await?;
        if !resp.status().is_success() {
            counter!("timeline_fetch_errors_total").increment(1);
            return Err(FeedError::upstream(resp.status()));
        }
        let identity = resp.json::<Identity>().await?;
        Ok(Account {
            handle: qualify_handle(&identity.username, &instance.host),
            instance_host: instance.host.clone(),
        })
    }

    async fn fetch_timeline(
        &self,
        instance: &InstanceRef,
    ) -> Result<Vec<CanonicalItem>, FeedError> {
        let t0 = std::time::Instant::now();
        let resp = self
            .post(
                instance,
                "/api/notes/timeline",
                json!({
                    "includeMyRenotes": true,
                    "includeRenotedMyNotes": true,
                    "includeLocalRenotes": true,
                    "withFiles": true,
                    "withRenotes": true,
                }),
            )
            .send()
            .await?;
        if !resp.status().is_success() {
            counter!("timeline_fetch_errors_total").increment(1);
            return Err(FeedError::upstream(resp.status()));
        }
        let notes = resp.json::<Vec<Note>>().await?;

        let items: Vec<CanonicalItem> = notes
            .iter()
            .map(|note| Self::note_to_item(note, instance))
            .collect();

        histogram!("timeline_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("timeline_items_total").increment(items.len() as u64);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "misskey"
    }
}
