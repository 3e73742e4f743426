//! Text helpers for post bodies: markup stripping, excerpts, cover images,
//! slugs, title ordering, and date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Maximum excerpt length in characters, before the ellipsis.
pub const EXCERPT_MAX_CHARS: usize = 220;
pub const ELLIPSIS: char = '…';

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").expect("static regex"));
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").expect("static regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static FIRST_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("static regex"));
static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).expect("static regex"));
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));
static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("static regex"));

/// Remove scripts, styles and tags, then collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let s = SCRIPT_BLOCK.replace_all(html, "");
    let s = STYLE_BLOCK.replace_all(&s, "");
    let s = TAG.replace_all(&s, " ");
    WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// Plain-text excerpt from the first `<p>` block, or the whole body when
/// there is none. Longer than [`EXCERPT_MAX_CHARS`] gets cut and suffixed
/// with an ellipsis.
pub fn extract_excerpt(html: &str) -> String {
    let base = match FIRST_PARAGRAPH.captures(html) {
        Some(caps) if !caps[1].is_empty() => strip_html(&caps[1]),
        _ => strip_html(html),
    };
    if base.chars().count() > EXCERPT_MAX_CHARS {
        let cut: String = base.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{}{}", cut.trim(), ELLIPSIS)
    } else {
        base
    }
}

/// `src` of the first `<img>` in the body.
pub fn extract_cover(html: &str) -> Option<String> {
    IMG_SRC.captures(html).map(|caps| caps[1].to_string())
}

/// Lowercase, dash-separated, `[a-z0-9-]` only.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase().replace('&', " and ");
    let dashed = NON_SLUG.replace_all(&lowered, "-");
    let trimmed = dashed.trim_matches('-');
    DASH_RUN.replace_all(trimmed, "-").into_owned()
}

/// Comparison key: diacritics removed, lowercased. "École" keys as "ecole".
fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Accent- and case-insensitive ordering, close to what a default locale
/// collator does for Latin titles. Ties go unaccented before accented, then
/// lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Parse a metadata date: RFC 3339, `YYYY-MM-DDTHH:MM:SS`, or `YYYY-MM-DD`.
/// Dates without an offset are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
