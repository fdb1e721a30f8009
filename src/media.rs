//! Media attachment rendering.
//!
//! Maps upstream attachment descriptors to HTML embed fragments. The two
//! API families tag attachments differently: Mastodon with a coarse type
//! tag, Misskey with a raw MIME type. An unrecognized Mastodon tag produces
//! no attachment at all, while an unrecognized Misskey MIME type degrades to
//! a plain file link. The mismatch is upstream behavior and is kept as-is.

use html_escape::encode_double_quoted_attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    /// Silent looping clip, e.g. Mastodon's `gifv`.
    AnimatedVideo,
    Audio,
    GenericFile,
}

/// One media attachment, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
}

impl MediaRef {
    pub fn new(kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

/// Mastodon attachment type tag → kind. Unknown tags yield nothing.
pub fn kind_from_mastodon_type(tag: &str) -> Option<MediaKind> {
    match tag {
        "image" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        "gifv" => Some(MediaKind::AnimatedVideo),
        "audio" => Some(MediaKind::Audio),
        _ => None,
    }
}

/// Misskey file MIME type → kind. Unknown types degrade to a file link.
pub fn kind_from_misskey_mime(mime: &str) -> MediaKind {
    match mime {
        "image/jpeg" | "image/png" | "image/gif" => MediaKind::Image,
        "video/mp4" => MediaKind::Video,
        "audio/mpeg" | "audio/ogg" => MediaKind::Audio,
        _ => MediaKind::GenericFile,
    }
}

/// Render one attachment as an HTML fragment. Pure; no network access.
pub fn render_fragment(media: &MediaRef) -> String {
    let url = encode_double_quoted_attribute(&media.url);
    match media.kind {
        MediaKind::Image => format!(r#"<img src="{url}" alt="Image Attachment">"#),
        MediaKind::Video => {
            format!(r#"<video src="{url}" controls>Video Attachment</video>"#)
        }
        MediaKind::AnimatedVideo => {
            format!(r#"<video src="{url}" autoplay loop muted playsinline>Gif Attachment</video>"#)
        }
        MediaKind::Audio => {
            format!(r#"<audio src="{url}" controls>Audio Attachment</audio>"#)
        }
        MediaKind::GenericFile => format!(r#"<a href="{url}">File Attachment</a>"#),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastodon_mapping_drops_unknown_tags() {
        assert_eq!(kind_from_mastodon_type("image"), Some(MediaKind::Image));
        assert_eq!(
            kind_from_mastodon_type("gifv"),
            Some(MediaKind::AnimatedVideo)
        );
        assert_eq!(kind_from_mastodon_type("sticker"), None);
        assert_eq!(kind_from_mastodon_type("unknown"), None);
    }

    #[test]
    fn misskey_mapping_falls_back_to_file_link() {
        assert_eq!(kind_from_misskey_mime("image/png"), MediaKind::Image);
        assert_eq!(kind_from_misskey_mime("video/mp4"), MediaKind::Video);
        assert_eq!(
            kind_from_misskey_mime("application/pdf"),
            MediaKind::GenericFile
        );
    }

    #[test]
    fn fragments_embed_the_url() {
        let img = render_fragment(&MediaRef::new(MediaKind::Image, "https://files.example/a.png"));
        assert_eq!(
            img,
            r#"<img src="https://files.example/a.png" alt="Image Attachment">"#
        );

        let gif = render_fragment(&MediaRef::new(MediaKind::AnimatedVideo, "https://f/x.mp4"));
        assert!(gif.contains("autoplay loop muted playsinline"));

        let file = render_fragment(&MediaRef::new(MediaKind::GenericFile, "https://f/doc.pdf"));
        assert_eq!(file, r#"<a href="https://f/doc.pdf">File Attachment</a>"#);
    }

    #[test]
    fn attribute_urls_are_escaped() {
        let frag = render_fragment(&MediaRef::new(
            MediaKind::Image,
            r#"https://f/x.png"><script>"#,
        ));
        assert!(!frag.contains(r#""><script>"#));
    }
}
