//! # Building Health X Content
//!
//! Content backend for the Building Health X renter site: a file-backed blog
//! index, review and lead intake, sitemap generation, and a JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ content/    │──▶│ ContentIndex │──▶│  CLI (bhx)   │
//! │ blog posts  │   │ (once/proc)  │   │  HTTP (axum) │
//! └─────────────┘   └──────────────┘   └──────┬───────┘
//!                                             │
//!                         ┌───────────────────┤
//!                         ▼                   ▼
//!                   ┌────────────┐     ┌─────────────┐
//!                   │ RateLimiter│────▶│ ReviewStore │
//!                   └────────────┘     └─────────────┘
//! ```
//!
//! Pure logic (frontmatter, ranking, tags, pagination, rate limiting) lives
//! in `bhx-content-core`; this crate adds disk access, config, and serving.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`connector_fs`] | Post discovery on disk |
//! | [`index`] | Cached post index and its views |
//! | [`leads`] | Service lead validation |
//! | [`posts`] | CLI listing commands |
//! | [`reviews`] | Review validation, storage, summaries |
//! | [`sitemap`] | `sitemap.xml` / `robots.txt` |
//! | [`server`] | HTTP server |

pub mod config;
pub mod connector_fs;
pub mod index;
pub mod leads;
pub mod posts;
pub mod reviews;
pub mod server;
pub mod sitemap;
