//! # Building Health X Content Core
//!
//! Pure logic behind the renter blog and review intake: data models,
//! frontmatter parsing, text helpers, related-post ranking, tag
//! aggregation, pagination, the review rate limiter, and the service
//! landing-page catalog.
//!
//! This crate does no filesystem or network I/O. The `bhx-content` crate
//! discovers posts on disk, caches the index, and serves it over HTTP.

pub mod catalog;
pub mod frontmatter;
pub mod models;
pub mod paginate;
pub mod ratelimit;
pub mod related;
pub mod tags;
pub mod text;
