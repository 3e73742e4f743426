//! CLI views over the content index (`bhx posts …`, `bhx tags`).

use anyhow::Result;
use bhx_content_core::models::PostMeta;

use crate::config::Config;
use crate::index::ContentIndex;

fn format_date(post: &PostMeta) -> String {
    post.published_at
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_rows(posts: &[PostMeta]) {
    println!("{:<12} {:<40} TAGS", "DATE", "SLUG");
    for post in posts {
        println!(
            "{:<12} {:<40} {}",
            format_date(post),
            post.slug,
            post.tags.join(", ")
        );
    }
}

pub fn run_list(config: &Config, tag: Option<&str>, page: usize) -> Result<()> {
    let index = ContentIndex::new(config.content.clone());
    let page = index.page(tag, page)?;
    print_rows(&page.items);
    println!();
    println!(
        "page {}/{} ({} posts)",
        page.page, page.total_pages, page.total_items
    );
    Ok(())
}

pub fn run_recent(config: &Config, count: usize) -> Result<()> {
    let index = ContentIndex::new(config.content.clone());
    print_rows(&index.list_recent(count)?);
    Ok(())
}

pub fn run_related(config: &Config, slug: &str, count: usize) -> Result<()> {
    let index = ContentIndex::new(config.content.clone());
    print_rows(&index.related_to(slug, count)?);
    Ok(())
}

pub fn run_tags(config: &Config, distinct: bool) -> Result<()> {
    let index = ContentIndex::new(config.content.clone());
    if distinct {
        for tag in index.distinct_tags()? {
            println!("{}", tag);
        }
        return Ok(());
    }
    println!("{:<32} POSTS", "TAG");
    for row in index.all_tags()? {
        println!("{:<32} {}", row.tag, row.count);
    }
    Ok(())
}

/// Prints one post with its body. Exits non-zero for unknown slugs.
pub fn run_get(config: &Config, slug: &str) -> Result<()> {
    let index = ContentIndex::new(config.content.clone());
    let post = match index.get_by_slug(slug)? {
        Some(p) => p,
        None => {
            eprintln!("Error: post not found: {}", slug);
            std::process::exit(1);
        }
    };

    let meta = &post.meta;
    println!("--- Post ---");
    println!("slug:      {}", meta.slug);
    println!("title:     {}", meta.title);
    println!("date:      {}", format_date(meta));
    println!("tags:      {}", meta.tags.join(", "));
    if let Some(ref image) = meta.featured_image {
        println!("image:     {}", image);
    }
    println!("excerpt:   {}", meta.excerpt);
    println!();

    println!("--- Body ---");
    println!("{}", post.html);

    Ok(())
}
