//! Service lead intake from the landing-page contact form.
//!
//! A lead is validated, trimmed, timestamped, and logged. Nothing is stored
//! or forwarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw form body. Field names match the form's JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub service_type: Option<String>,
    pub service_slug: Option<String>,
    pub location: Option<String>,
    pub location_slug: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub message: Option<String>,
    pub source_url: Option<String>,
}

/// A required field that was missing or blank. Displays as
/// `Missing field: <name>` with the form's field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing field: {}", self.0)
    }
}

/// Normalized lead. Optional fields become empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub timestamp: DateTime<Utc>,
    pub service_type: String,
    pub service_slug: String,
    pub location: String,
    pub location_slug: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub message: String,
    pub source_url: String,
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, MissingField> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(MissingField(field))
}

fn optional(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

impl LeadSubmission {
    /// Check required fields in form order and normalize at `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<Lead, MissingField> {
        let service_type = required(&self.service_type, "serviceType")?;
        let location = required(&self.location, "location")?;
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;
        let phone = required(&self.phone, "phone")?;
        let message = required(&self.message, "message")?;
        let source_url = required(&self.source_url, "sourceUrl")?;

        Ok(Lead {
            timestamp: now,
            service_type,
            service_slug: optional(&self.service_slug),
            location,
            location_slug: optional(&self.location_slug),
            name,
            email,
            phone,
            address: optional(&self.address),
            message,
            source_url,
        })
    }
}

/// Record an accepted lead in the server log.
pub fn log_lead(lead: &Lead) {
    tracing::info!(
        service = %lead.service_type,
        service_slug = %lead.service_slug,
        location = %lead.location,
        location_slug = %lead.location_slug,
        source_url = %lead.source_url,
        "lead received"
    );
}
