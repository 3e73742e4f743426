//! `sitemap.xml` and `robots.txt` generation.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;

use bhx_content_core::catalog;

use crate::config::SiteConfig;
use crate::index::ContentIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Home, blog index, every service landing page, then one entry per post
/// in index order.
pub fn entries(
    site: &SiteConfig,
    index: &ContentIndex,
    now: DateTime<Utc>,
) -> Result<Vec<SitemapEntry>> {
    let base = site.base_url();
    let entry = |path: String, change_frequency: ChangeFrequency, priority: f32| SitemapEntry {
        url: format!("{}{}", base, path),
        last_modified: now,
        change_frequency,
        priority,
    };

    let mut out = vec![
        entry("/".to_string(), ChangeFrequency::Weekly, 1.0),
        entry("/blog".to_string(), ChangeFrequency::Weekly, 0.7),
    ];
    for combo in catalog::all_combos() {
        out.push(entry(combo.path(), ChangeFrequency::Monthly, 0.65));
    }
    for post in index.posts()? {
        out.push(entry(
            format!("/blog/{}", post.slug),
            ChangeFrequency::Monthly,
            0.6,
        ));
    }
    Ok(out)
}

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub fn render_xml(entries: &[SitemapEntry]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for e in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &e.url)?;
        write_text_element(
            &mut writer,
            "lastmod",
            &e.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        write_text_element(&mut writer, "changefreq", e.change_frequency.as_str())?;
        write_text_element(&mut writer, "priority", &format!("{:.2}", e.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

/// `<name>text</name>`, with `text` escaped.
fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn robots_txt(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        site.base_url()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_entries_and_xml() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("heat")).unwrap();
        fs::write(
            tmp.path().join("heat/index.md"),
            "---\ntitle: Heat\ndate: 2024-01-01\n---\n<p>x</p>",
        )
        .unwrap();
        let mut cfg = Config::minimal(tmp.path());
        cfg.site.url = "https://bhx.example/".to_string();
        let index = ContentIndex::new(cfg.content.clone());

        let list = entries(&cfg.site, &index, Utc::now()).unwrap();
        let combos = catalog::SERVICES.len() * catalog::LOCATIONS.len();
        assert_eq!(list.len(), 3 + combos);
        assert_eq!(list[0].url, "https://bhx.example/");
        assert_eq!(list[1].url, "https://bhx.example/blog");
        assert_eq!(
            list[2].url,
            "https://bhx.example/services/moving-companies/upper-east-side"
        );
        assert_eq!(list[2].change_frequency, ChangeFrequency::Monthly);
        assert_eq!(list[2].priority, 0.65);
        assert_eq!(list[2 + combos].url, "https://bhx.example/blog/heat");

        let xml = render_xml(&list).unwrap();
        assert!(xml.contains("<loc>https://bhx.example/blog/heat</loc>"));
        assert!(xml.contains("<changefreq>monthly</changefreq>"));
        assert!(xml.contains("<priority>0.60</priority>"));
        assert!(xml.contains("<priority>0.65</priority>"));
    }

    #[test]
    fn test_robots() {
        let site = SiteConfig {
            url: "https://bhx.example".to_string(),
        };
        assert_eq!(
            robots_txt(&site),
            "User-agent: *\nAllow: /\n\nSitemap: https://bhx.example/sitemap.xml\n"
        );
    }

    #[test]
    fn test_urls_are_escaped() {
        let list = vec![SitemapEntry {
            url: "https://bhx.example/search?q=heat&page=2".to_string(),
            last_modified: Utc::now(),
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.5,
        }];
        let xml = render_xml(&list).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains("<loc>https://bhx.example/search?q=heat&amp;page=2</loc>"));
        assert!(!xml.contains("heat&page"));
    }
}
