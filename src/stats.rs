// src/stats.rs
//! Dashboard counters derived from the normalized lists.

use chrono::NaiveDate;
use serde::Serialize;

use crate::records::{Applicant, Job};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_jobs: usize,
    pub open_jobs: usize,
    pub total_applicants: usize,
    pub active_applicants: usize,
    pub applicants_this_week: usize,
    pub average_rating: f64,
}

/// Counts are computed over whatever the gateway returned; `today` anchors
/// the this-week window so the computation stays deterministic.
pub fn dashboard_stats(jobs: &[Job], applicants: &[Applicant], today: NaiveDate) -> DashboardStats {
    let open_jobs = jobs
        .iter()
        .filter(|job| {
            job.status.eq_ignore_ascii_case("active") || job.status.eq_ignore_ascii_case("open")
        })
        .count();

    let active_applicants = applicants
        .iter()
        .filter(|applicant| applicant.status.eq_ignore_ascii_case("active"))
        .count();

    let applicants_this_week = applicants
        .iter()
        .filter(|applicant| {
            let age = today.signed_duration_since(applicant.applied_date).num_days();
            (0..7).contains(&age)
        })
        .count();

    let average_rating = if applicants.is_empty() {
        0.0
    } else {
        applicants.iter().map(|applicant| applicant.rating).sum::<f64>() / applicants.len() as f64
    };

    DashboardStats {
        total_jobs: jobs.len(),
        open_jobs,
        total_applicants: applicants.len(),
        active_applicants,
        applicants_this_week,
        average_rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalize;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
    }

    fn applicant(date: &str, rating: f64) -> Applicant {
        let row = json!({ "date": date, "Overall": rating })
            .as_object()
            .cloned()
            .unwrap();
        Applicant::normalize_at(&row, day(date))
    }

    fn job(status: &str) -> Job {
        let row = json!({ "Statut": status }).as_object().cloned().unwrap();
        Job::normalize_at(&row, day("2026-08-01"))
    }

    #[test]
    fn counts_open_jobs_and_recent_applicants() {
        let jobs = vec![job("Active"), job("Draft"), job("Open"), job("Closed")];
        let applicants = vec![
            applicant("2026-08-05", 8.0),
            applicant("2026-08-01", 6.0),
            applicant("2026-07-01", 4.0),
        ];

        let stats = dashboard_stats(&jobs, &applicants, day("2026-08-07"));
        assert_eq!(stats.total_jobs, 4);
        assert_eq!(stats.open_jobs, 2);
        assert_eq!(stats.total_applicants, 3);
        assert_eq!(stats.active_applicants, 3);
        assert_eq!(stats.applicants_this_week, 2);
        assert!((stats.average_rating - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_inputs_yield_zeroes() {
        let stats = dashboard_stats(&[], &[], day("2026-08-07"));
        assert_eq!(stats.total_jobs, 0);
        assert_eq!(stats.average_rating, 0.0);
    }
}
