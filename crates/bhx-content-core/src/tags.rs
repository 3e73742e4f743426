//! Tag table and tag lookups.
//!
//! Both operations here compare tags exactly (case-sensitive): `"Pests"` and
//! `"pests"` are different tags. Related-post scoring in
//! [`related`](crate::related) is the one place that folds case.

use std::collections::{BTreeSet, HashMap};

use crate::models::{PostMeta, TagCount};
use crate::text::locale_cmp;

/// One entry per distinct tag, most used first, then alphabetical.
pub fn all_tags(posts: &[PostMeta]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        for tag in &post.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut table: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    table.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| locale_cmp(&a.tag, &b.tag)));
    table
}

/// Posts carrying exactly `tag`, in index order.
pub fn posts_by_tag<'a>(posts: &'a [PostMeta], tag: &str) -> Vec<&'a PostMeta> {
    posts
        .iter()
        .filter(|p| p.tags.iter().any(|t| t == tag))
        .collect()
}

/// Sorted distinct tags, for the tag bar on the listing page.
pub fn distinct_tags(posts: &[PostMeta]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
