//! Post body composition.
//!
//! Builds the HTML body of one canonical feed item out of the pieces the
//! two API families share: an optional content warning, an optional reply
//! reference, an optional repost reference, the post's own body, and its
//! attachments. The composition order is fixed here; the adapters only
//! decide what goes into each slot.

use html_escape::encode_text;

use crate::media::{self, MediaRef};

/// Upper bound on repost/reply nesting. A nested post is rendered without
/// its own reply/repost references, so resolution cannot run away even if
/// an upstream hands back a longer chain.
pub const NEST_DEPTH_LIMIT: u8 = 1;

/// The slots of one post body. `compose_body` owns the ordering.
#[derive(Debug, Default)]
pub struct BodyParts {
    /// Content-warning text, unescaped.
    pub warning: Option<String>,
    pub reply: Option<ReplyRef>,
    pub repost: Option<RepostRef>,
    /// The post's own body, already HTML.
    pub body: String,
    pub attachments: Vec<MediaRef>,
}

/// A replied-to post: its author plus, when the upstream embeds the post
/// itself, its already-rendered content.
#[derive(Debug)]
pub struct ReplyRef {
    pub author: String,
    pub rendered: Option<String>,
}

/// A reposted post: its author plus its already-rendered content.
#[derive(Debug)]
pub struct RepostRef {
    pub author: String,
    pub rendered: String,
}

/// Fixed composition: warning, reply, repost, own body, attachments.
pub fn compose_body(parts: &BodyParts) -> String {
    let mut html = String::new();
    if let Some(cw) = &parts.warning {
        html.push_str(&format!("<p><strong>CW: {}</strong></p>", encode_text(cw)));
    }
    if let Some(reply) = &parts.reply {
        html.push_str(&format!(
            "<p>Replying to {}:</p>",
            encode_text(&reply.author)
        ));
        if let Some(rendered) = &reply.rendered {
            html.push_str(rendered);
        }
    }
    if let Some(repost) = &parts.repost {
        html.push_str(&format!(
            "<p>Reposted from {}:</p>",
            encode_text(&repost.author)
        ));
        html.push_str(&repost.rendered);
    }
    html.push_str(&parts.body);
    for attachment in &parts.attachments {
        html.push_str("<br>");
        html.push_str(&media::render_fragment(attachment));
    }
    html
}

/// Author display rule used everywhere: display name, else handle, else a
/// placeholder. Upstreams routinely send empty strings, which count as
/// absent.
pub fn display_name(display: Option<&str>, handle: Option<&str>) -> String {
    pick_nonempty(display)
        .or_else(|| pick_nonempty(handle))
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn pick_nonempty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Character-based truncation for item titles.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
