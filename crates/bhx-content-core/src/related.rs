//! "Related posts" ranking by shared tags.
//!
//! # Algorithm
//!
//! 1. Score every other post by the number of its tags that also appear on
//!    the source post, compared case-insensitively.
//! 2. Stable sort by score (desc). The input is recency-ordered, so newer
//!    posts win ties.
//! 3. Keep posts with a score above zero, up to `count`.
//! 4. If that leaves fewer than `min(count, 3)` posts, pad with the next
//!    ranked posts (score zero included) until `count` is reached.
//!
//! Step 4 means an untagged post still gets a related panel, filled with
//! the most recent other posts.

use std::collections::HashSet;

use crate::models::PostMeta;

/// Minimum panel size below which filler posts are added.
pub const MIN_PANEL: usize = 3;

/// A candidate post with its shared-tag score.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub post: &'a PostMeta,
    pub score: usize,
}

/// Number of `candidate` tags present in `source_tags` (lowercased set).
pub fn shared_tag_score(source_tags: &HashSet<String>, candidate: &PostMeta) -> usize {
    candidate
        .tags
        .iter()
        .filter(|t| source_tags.contains(&t.to_lowercase()))
        .count()
}

/// Rank `posts` against the post identified by `slug`, returning at most
/// `count` posts, never including the source itself.
pub fn related_to<'a>(posts: &'a [PostMeta], slug: &str, count: usize) -> Vec<&'a PostMeta> {
    let Some(source) = posts.iter().find(|p| p.slug == slug) else {
        return posts.iter().filter(|p| p.slug != slug).take(count).collect();
    };

    let ranked = rank(posts, source);

    let primary: Vec<&PostMeta> = ranked
        .iter()
        .filter(|s| s.score > 0)
        .take(count)
        .map(|s| s.post)
        .collect();

    if primary.len() >= count.min(MIN_PANEL) {
        return primary;
    }

    let missing = count.saturating_sub(primary.len());
    let filler: Vec<&PostMeta> = ranked
        .iter()
        .map(|s| s.post)
        .filter(|p| !primary.iter().any(|x| x.slug == p.slug))
        .take(missing)
        .collect();

    primary.into_iter().chain(filler).collect()
}

/// Every post except `source`, scored and stably sorted by score descending.
pub fn rank<'a>(posts: &'a [PostMeta], source: &PostMeta) -> Vec<Scored<'a>> {
    let source_tags: HashSet<String> = source.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut scored: Vec<Scored<'a>> = posts
        .iter()
        .filter(|p| p.slug != source.slug)
        .map(|p| Scored {
            post: p,
            score: shared_tag_score(&source_tags, p),
        })
        .collect();

    // `sort_by` is stable; equal scores keep index order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}
