//! The in-memory post index.
//!
//! [`ContentIndex`] scans the content root on first use, parses every post's
//! frontmatter, and keeps the result for the rest of the process lifetime.
//! There is no invalidation: new content shows up after a restart.
//!
//! # Build steps
//!
//! 1. Discover source files ([`connector_fs::scan_content`]).
//! 2. Read and parse each one into a [`PostMeta`].
//! 3. Assign unique slugs in discovery order (`base`, `base-2`, `base-3`, …).
//! 4. Sort newest first; undated posts go last; ties and undated posts are
//!    ordered by title.
//!
//! The build runs at most once at a time: concurrent first callers block on
//! the same initialization. A failed build is not cached and is retried by
//! the next caller.
//!
//! Bodies are not kept in the index. [`ContentIndex::get_by_slug`] re-reads
//! the source file.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use bhx_content_core::frontmatter::{self, Frontmatter};
use bhx_content_core::models::{Post, PostMeta, TagCount};
use bhx_content_core::paginate::{paginate, Page};
use bhx_content_core::text::{extract_cover, extract_excerpt, locale_cmp, parse_date, slugify};
use bhx_content_core::{related, tags};

use crate::config::{ContentConfig, Layout};
use crate::connector_fs::{self, Discovery, SourceFile};

/// Slug used when a flat-layout file name has no slug-safe characters.
const FALLBACK_SLUG: &str = "post";

/// Built index. `by_slug` maps into `posts`/`paths`, so the list and the
/// lookup always agree.
#[derive(Debug, Default)]
struct Snapshot {
    posts: Vec<PostMeta>,
    paths: Vec<PathBuf>,
    by_slug: HashMap<String, usize>,
}

pub struct ContentIndex {
    config: ContentConfig,
    snapshot: OnceCell<Snapshot>,
}

impl ContentIndex {
    pub fn new(config: ContentConfig) -> Self {
        Self {
            config,
            snapshot: OnceCell::new(),
        }
    }

    fn snapshot(&self) -> Result<&Snapshot> {
        self.snapshot.get_or_try_init(|| build_snapshot(&self.config))
    }

    /// Build the index now if it has not been built. Returns the post count.
    pub fn warm(&self) -> Result<usize> {
        Ok(self.snapshot()?.posts.len())
    }

    /// All posts in index order, without bodies.
    pub fn posts(&self) -> Result<&[PostMeta]> {
        Ok(&self.snapshot()?.posts)
    }

    pub fn list_all(&self) -> Result<Vec<PostMeta>> {
        Ok(self.posts()?.to_vec())
    }

    pub fn list_recent(&self, n: usize) -> Result<Vec<PostMeta>> {
        Ok(self.posts()?.iter().take(n).cloned().collect())
    }

    /// Posts tagged exactly `tag` (case-sensitive).
    pub fn list_by_tag(&self, tag: &str) -> Result<Vec<PostMeta>> {
        Ok(tags::posts_by_tag(self.posts()?, tag)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn related_to(&self, slug: &str, count: usize) -> Result<Vec<PostMeta>> {
        Ok(related::related_to(self.posts()?, slug, count)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn all_tags(&self) -> Result<Vec<TagCount>> {
        Ok(tags::all_tags(self.posts()?))
    }

    pub fn distinct_tags(&self) -> Result<Vec<String>> {
        Ok(tags::distinct_tags(self.posts()?))
    }

    /// One listing page, optionally restricted to a tag.
    pub fn page(&self, tag: Option<&str>, page: usize) -> Result<Page<PostMeta>> {
        let posts = self.posts()?;
        let page_size = self.config.page_size;
        Ok(match tag {
            Some(tag) => {
                let tagged: Vec<PostMeta> = tags::posts_by_tag(posts, tag)
                    .into_iter()
                    .cloned()
                    .collect();
                paginate(&tagged, page, page_size)
            }
            None => paginate(posts, page, page_size),
        })
    }

    /// Full post with body, read fresh from disk. `None` for unknown slugs.
    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let snapshot = self.snapshot()?;
        let Some(&idx) = snapshot.by_slug.get(slug) else {
            return Ok(None);
        };
        let path = &snapshot.paths[idx];
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read post: {}", path.display()))?;
        let html = match self.config.layout {
            Layout::Folders => frontmatter::parse(&raw).body,
            Layout::Flat => raw,
        };
        Ok(Some(Post {
            meta: snapshot.posts[idx].clone(),
            html,
        }))
    }
}

fn build_snapshot(config: &ContentConfig) -> Result<Snapshot> {
    let files = match connector_fs::scan_content(config)? {
        Discovery::RootMissing => {
            tracing::debug!(root = %config.root.display(), "content root missing; index is empty");
            return Ok(Snapshot::default());
        }
        Discovery::Found(files) => files,
    };

    let mut used: HashSet<String> = HashSet::new();
    let mut entries: Vec<(PostMeta, PathBuf)> = Vec::with_capacity(files.len());

    for file in files {
        let raw = std::fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read post: {}", file.path.display()))?;
        let mut meta = post_meta(&raw, &file, config);
        meta.slug = unique_slug(&meta.slug, &mut used);
        entries.push((meta, file.path));
    }

    entries.sort_by(|a, b| compare_posts(&a.0, &b.0));

    let (posts, paths): (Vec<PostMeta>, Vec<PathBuf>) = entries.into_iter().unzip();
    let by_slug = posts
        .iter()
        .enumerate()
        .map(|(i, p)| (p.slug.clone(), i))
        .collect();

    tracing::info!(
        root = %config.root.display(),
        posts = posts.len(),
        "content index built"
    );

    Ok(Snapshot {
        posts,
        paths,
        by_slug,
    })
}

/// Derive metadata for one source file. The slug returned here is the base
/// slug, before collision suffixes. Only the folders layout carries
/// frontmatter; flat files are plain markup from the first byte.
fn post_meta(raw: &str, file: &SourceFile, config: &ContentConfig) -> PostMeta {
    match config.layout {
        Layout::Folders => {
            let fm = frontmatter::parse(raw);
            for diag in &fm.diagnostics {
                tracing::warn!(path = %file.path.display(), "degraded frontmatter: {}", diag);
            }
            folder_post_meta(&fm, file, config.mtime_fallback)
        }
        Layout::Flat => flat_post_meta(raw, file),
    }
}

fn folder_post_meta(fm: &Frontmatter, file: &SourceFile, mtime_fallback: bool) -> PostMeta {
    let published_at = match fm.str_field("date") {
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                tracing::warn!(
                    path = %file.path.display(),
                    date = raw,
                    "unparseable date; post sorts as undated"
                );
            }
            parsed
        }
        None if mtime_fallback => file.modified,
        None => None,
    };

    PostMeta {
        slug: fm.string("slug").unwrap_or_else(|| file.unit_name.clone()),
        title: fm.string("title").unwrap_or_else(|| file.unit_name.clone()),
        excerpt: fm
            .string("excerpt")
            .unwrap_or_else(|| extract_excerpt(&fm.body)),
        tags: fm.string_list("tags"),
        published_at,
        featured_image: fm.string("featuredImage"),
        meta_title: fm.string("metaTitle"),
        meta_description: fm.string("metaDescription"),
        schema: fm.value("schema").cloned(),
    }
}

/// Flat files are titled by their file name and carry no tags or dates.
fn flat_post_meta(body: &str, file: &SourceFile) -> PostMeta {
    let title = file.unit_name.clone();
    let slug = match slugify(&title) {
        s if s.is_empty() => FALLBACK_SLUG.to_string(),
        s => s,
    };
    PostMeta {
        excerpt: extract_excerpt(body),
        featured_image: extract_cover(body),
        ..PostMeta::new(slug, title)
    }
}

/// First claim of `base` keeps it; later claims get `-2`, `-3`, … skipping
/// any that are already taken.
fn unique_slug(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 1;
    while used.contains(&candidate) {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }
    used.insert(candidate.clone());
    candidate
}

/// Newest first; dated before undated; otherwise by title.
fn compare_posts(a: &PostMeta, b: &PostMeta) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) if x != y => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => locale_cmp(&a.title, &b.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_unique_slug() {
        let mut used = HashSet::new();
        assert_eq!(unique_slug("heat", &mut used), "heat");
        assert_eq!(unique_slug("heat", &mut used), "heat-2");
        assert_eq!(unique_slug("heat", &mut used), "heat-3");
        assert_eq!(unique_slug("mold-2", &mut used), "mold-2");
        assert_eq!(unique_slug("mold", &mut used), "mold");
        assert_eq!(unique_slug("mold", &mut used), "mold-3");
    }

    #[test]
    fn test_compare_posts() {
        let jan = PostMeta::new("jan", "Zed")
            .with_published_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let jun = PostMeta::new("jun", "Yak")
            .with_published_at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let undated = PostMeta::new("aaa", "Aaa");
        let mut posts = vec![undated.clone(), jan.clone(), jun.clone()];
        posts.sort_by(compare_posts);
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["jun", "jan", "aaa"]);
    }

    #[test]
    fn test_same_date_orders_by_title() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let b = PostMeta::new("b", "Boilers").with_published_at(at);
        let a = PostMeta::new("a", "asbestos").with_published_at(at);
        assert_eq!(compare_posts(&a, &b), Ordering::Less);
    }
}
