//! Building review intake and listing.
//!
//! Submissions are validated, rate limited per client (see
//! [`RateLimiter`](bhx_content_core::ratelimit::RateLimiter)), normalized, and
//! handed to a [`ReviewStore`]. Contact fields (`email`, `phone`) are stored
//! but never returned.
//!
//! [`InMemoryReviewStore`] keeps reviews for the life of the process only.

use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

pub const MIN_REVIEW_CHARS: usize = 10;
const ANONYMOUS: &str = "Anonymous";

/// Raw submission body as posted by the review form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSubmission {
    pub bbl: Option<String>,
    pub rating: Option<f64>,
    pub title: Option<String>,
    pub review: Option<String>,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub lived_here: Option<bool>,
    pub years_lived: Option<u32>,
    pub author_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Honeypot. Real users never see this field.
    pub website: Option<String>,
}

/// Why a submission was refused before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Honeypot,
    MissingRequired,
    MissingContact,
    RatingOutOfRange,
    ReviewTooShort,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rejection::Honeypot => "Invalid submission",
            Rejection::MissingRequired => "BBL, rating, and review are required",
            Rejection::MissingContact => "Email and phone are required (not shown publicly)",
            Rejection::RatingOutOfRange => "Rating must be between 1 and 5",
            Rejection::ReviewTooShort => "Review must be at least 10 characters",
        };
        f.write_str(msg)
    }
}

/// A validated, normalized review ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub bbl: String,
    pub rating: u8,
    pub title: Option<String>,
    pub review: String,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub lived_here: bool,
    pub years_lived: Option<u32>,
    pub author_name: String,
    pub email: String,
    pub phone: String,
}

/// The public shape of a stored review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicReview {
    pub id: u64,
    pub bbl: String,
    pub rating: u8,
    pub title: Option<String>,
    pub review: String,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub lived_here: bool,
    pub years_lived: Option<u32>,
    pub author_name: String,
    pub helpful_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Reviews for one building with aggregate numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub reviews: Vec<PublicReview>,
    pub count: usize,
    /// Mean rating rounded to one decimal, `0.0` with no reviews.
    pub average_rating: f64,
    /// Count per star rating, keys `1` through `5`.
    pub distribution: BTreeMap<u8, usize>,
}

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ReviewSubmission {
    /// Check the submission in form order and normalize it.
    pub fn validate(&self) -> Result<NewReview, Rejection> {
        if non_blank(&self.website).is_some() {
            return Err(Rejection::Honeypot);
        }

        let bbl = non_blank(&self.bbl);
        let review = non_blank(&self.review);
        let rating = self.rating.filter(|r| *r != 0.0 && r.is_finite());
        let (Some(bbl), Some(rating), Some(review)) = (bbl, rating, review) else {
            return Err(Rejection::MissingRequired);
        };

        let (Some(email), Some(phone)) = (non_blank(&self.email), non_blank(&self.phone)) else {
            return Err(Rejection::MissingContact);
        };

        if !(1.0..=5.0).contains(&rating) {
            return Err(Rejection::RatingOutOfRange);
        }
        if review.chars().count() < MIN_REVIEW_CHARS {
            return Err(Rejection::ReviewTooShort);
        }

        Ok(NewReview {
            bbl,
            rating: rating.round() as u8,
            title: non_blank(&self.title),
            review,
            pros: non_blank(&self.pros),
            cons: non_blank(&self.cons),
            lived_here: self.lived_here.unwrap_or(false),
            years_lived: self.years_lived.filter(|y| *y > 0),
            author_name: non_blank(&self.author_name).unwrap_or_else(|| ANONYMOUS.to_string()),
            email,
            phone,
        })
    }
}

/// Best-effort client identifier: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the socket peer. Blank headers count as absent.
/// `None` when nothing usable exists.
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let forwarded = header("x-forwarded-for").and_then(|xff| {
        xff.split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    });
    if let Some(ip) = forwarded.or_else(|| header("x-real-ip")) {
        return Some(ip.to_string());
    }
    peer.map(|addr| addr.ip().to_string())
}

pub fn summarize(reviews: Vec<PublicReview>) -> ReviewSummary {
    let mut distribution: BTreeMap<u8, usize> = (1..=5).map(|r| (r, 0)).collect();
    for r in &reviews {
        *distribution.entry(r.rating).or_insert(0) += 1;
    }
    let average_rating = if reviews.is_empty() {
        0.0
    } else {
        let sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
        (sum / reviews.len() as f64 * 10.0).round() / 10.0
    };
    ReviewSummary {
        count: reviews.len(),
        average_rating,
        distribution,
        reviews,
    }
}

/// Storage backend for reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persist a review and return its public form.
    async fn insert(&self, review: NewReview) -> Result<PublicReview>;

    /// Reviews for a building, newest first.
    async fn list_for_building(&self, bbl: &str) -> Result<Vec<PublicReview>>;
}

struct StoredReview {
    public: PublicReview,
    _email: String,
    _phone: String,
}

/// Process-local store. Contents are lost on restart.
pub struct InMemoryReviewStore {
    next_id: AtomicU64,
    by_building: RwLock<HashMap<String, Vec<StoredReview>>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            by_building: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn insert(&self, review: NewReview) -> Result<PublicReview> {
        let public = PublicReview {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            bbl: review.bbl.clone(),
            rating: review.rating,
            title: review.title,
            review: review.review,
            pros: review.pros,
            cons: review.cons,
            lived_here: review.lived_here,
            years_lived: review.years_lived,
            author_name: review.author_name,
            helpful_count: 0,
            created_at: Utc::now(),
        };
        let mut map = self
            .by_building
            .write()
            .map_err(|_| anyhow::anyhow!("review store lock poisoned"))?;
        map.entry(review.bbl).or_default().push(StoredReview {
            public: public.clone(),
            _email: review.email,
            _phone: review.phone,
        });
        Ok(public)
    }

    async fn list_for_building(&self, bbl: &str) -> Result<Vec<PublicReview>> {
        let map = self
            .by_building
            .read()
            .map_err(|_| anyhow::anyhow!("review store lock poisoned"))?;
        let mut reviews: Vec<PublicReview> = map
            .get(bbl)
            .map(|v| v.iter().map(|s| s.public.clone()).collect())
            .unwrap_or_default();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }
}
