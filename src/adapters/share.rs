//! Sharing an issue: native share sheet, fixed external links, clipboard.
//!
//! Every mechanism stands alone; a failing share sheet does not affect
//! link generation or clipboard copy.

use std::future::Future;

use crate::error::PlatformError;
use crate::model::Issue;

/// Hashtags appended to Twitter shares.
const TWITTER_HASHTAGS: &str = "CivicFix,Community";

/// What is being shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareContent {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl ShareContent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
        }
    }

    /// Share an issue's title and description with a link to it.
    pub fn for_issue(issue: &Issue, url: impl Into<String>) -> Self {
        Self::new(&issue.title, &issue.description, url)
    }

    /// `"<title> - <description>"`, the text used by the message links.
    fn headline(&self) -> String {
        format!("{} - {}", self.title, self.description)
    }
}

/// External services reachable by a plain link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareTarget {
    Twitter,
    Facebook,
    WhatsApp,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 3] = [ShareTarget::Twitter, ShareTarget::Facebook, ShareTarget::WhatsApp];

    pub fn label(&self) -> &'static str {
        match self {
            ShareTarget::Twitter => "Twitter",
            ShareTarget::Facebook => "Facebook",
            ShareTarget::WhatsApp => "WhatsApp",
        }
    }

    /// The share URL for `content`, with every parameter percent-encoded.
    ///
    /// Everything outside `A-Z a-z 0-9 - . _ ~` is escaped, including
    /// `! ' ( ) *`, which a browser's `encodeURIComponent` leaves as is.
    /// The links decode to the same text but are not byte-identical to
    /// browser-built ones.
    pub fn link(&self, content: &ShareContent) -> String {
        let url = urlencoding::encode(&content.url);
        match self {
            ShareTarget::Twitter => format!(
                "https://twitter.com/intent/tweet?text={}&url={url}&hashtags={TWITTER_HASHTAGS}",
                urlencoding::encode(&content.headline()),
            ),
            ShareTarget::Facebook => {
                format!("https://www.facebook.com/sharer/sharer.php?u={url}")
            }
            ShareTarget::WhatsApp => format!(
                "https://wa.me/?text={}",
                urlencoding::encode(&format!("{} {}", content.headline(), content.url)),
            ),
        }
    }
}

/// The platform's native share sheet.
pub trait ShareSheet: Send + Sync {
    fn is_available(&self) -> bool;

    fn share(&self, content: &ShareContent) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

/// The platform clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

/// Result of offering the native share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// No share sheet on this platform.
    Unavailable,
    /// The user closed the sheet.
    Cancelled,
    Failed(PlatformError),
}

/// Result of copying the link, for transient "Link Copied!" feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

/// The share panel's actions over injected platform capabilities.
pub struct SocialShare<S, C> {
    sheet: S,
    clipboard: C,
}

impl<S: ShareSheet, C: Clipboard> SocialShare<S, C> {
    pub fn new(sheet: S, clipboard: C) -> Self {
        Self { sheet, clipboard }
    }

    /// Whether the "Share via..." entry should be offered.
    pub fn native_available(&self) -> bool {
        self.sheet.is_available()
    }

    /// Open the native share sheet.
    pub async fn share_native(&self, content: &ShareContent) -> ShareOutcome {
        if !self.sheet.is_available() {
            return ShareOutcome::Unavailable;
        }
        match self.sheet.share(content).await {
            Ok(()) => ShareOutcome::Shared,
            Err(PlatformError::Aborted) => ShareOutcome::Cancelled,
            Err(PlatformError::Unsupported) => ShareOutcome::Unavailable,
            Err(e) => {
                tracing::warn!(error = %e, "native share failed");
                ShareOutcome::Failed(e)
            }
        }
    }

    /// Links for every external target, in display order.
    pub fn links(&self, content: &ShareContent) -> Vec<(ShareTarget, String)> {
        ShareTarget::ALL
            .into_iter()
            .map(|target| (target, target.link(content)))
            .collect()
    }

    /// Copy the content's URL to the clipboard.
    pub async fn copy_link(&self, content: &ShareContent) -> CopyOutcome {
        match self.clipboard.write_text(&content.url).await {
            Ok(()) => CopyOutcome::Copied,
            Err(e) => {
                tracing::warn!(error = %e, "copying share link failed");
                CopyOutcome::Failed
            }
        }
    }
}
