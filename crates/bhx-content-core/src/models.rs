//! Core data models shared by the index, the ranker, and the HTTP layer.
//!
//! A [`PostMeta`] is what the index keeps in memory for every post; a
//! [`Post`] adds the HTML body, which is read from disk on demand.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Listing-level metadata for one blog post. Never carries the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    /// URL-safe identifier, unique within the index.
    pub slug: String,
    pub title: String,
    /// Explicit `excerpt` field, or derived from the first paragraph.
    pub excerpt: String,
    /// Ordered tag list. Matching is case-sensitive for lookups and
    /// case-insensitive for related-post scoring.
    pub tags: Vec<String>,
    /// `None` when neither a parseable `date` field nor a file time exists.
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    /// Structured-data blob passed through to the page head untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl PostMeta {
    /// Minimal metadata with only a slug and title set.
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            excerpt: String::new(),
            tags: Vec::new(),
            published_at: None,
            featured_image: None,
            meta_title: None,
            meta_description: None,
            schema: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }
}

/// A post with its body populated.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    #[serde(flatten)]
    pub meta: PostMeta,
    /// Opaque markup, rendered as-is.
    pub html: String,
}

/// One row of the tag table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}
