// src/records.rs
//! Normalized record shapes served to dashboard clients.
//!
//! Raw upstream rows are untyped JSON maps with inconsistent key names; the
//! normalizer in [`crate::normalize`] maps them into these structs. Unknown
//! upstream fields survive in `extra` so newer upstream columns pass through
//! without a schema change here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped record as received from the upstream webhook endpoints.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub current_role: String,
    pub applied_for: String,
    /// Years of experience rendered as "N/10", or "Not specified".
    pub experience: String,
    pub location: String,
    pub stage: String,
    pub status: String,
    pub applied_date: NaiveDate,
    pub skills: Vec<String>,
    /// Overall score on a 0-10 scale, defaulted to 0 on missing/garbage input.
    pub rating: f64,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    /// Upstream fields with no canonical counterpart, passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Applicant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub department: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: String,
    pub experience_level: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub salary: String,
    pub status: String,
    /// Lowercased urgency label (low/medium/high).
    pub urgency: String,
    pub applicants: i64,
    pub posted_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inbound payload for creating a job posting. The dashboard form submits
/// requirements as one newline-separated text block; the outbound upstream
/// mapping splits it (see [`crate::normalize`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub salary: String,
    pub status: Option<String>,
    pub urgency: Option<String>,
    #[serde(default)]
    pub requirements: String,
    pub expiration_date: Option<NaiveDate>,
}
