// src/normalize.rs
//! Schema normalizer for upstream webhook rows.
//!
//! The upstream export is inconsistent: keys appear under alternate spellings
//! (including a misspelled "Curent Role" and a department column with a
//! trailing space), labels are bilingual, and whole columns may be absent.
//! Each canonical field declares its alias chain once in a mapping table;
//! resolution walks the chain and falls back to a field-specific default, so
//! normalization never fails and never leaves a field undefined.

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::records::{Applicant, Job, JobDraft, RawRecord};

/// Alias chain for one canonical field, highest priority first.
pub type Aliases = &'static [&'static str];

// Applicant field mapping.
const APPLICANT_ID: Aliases = &["row_number", "id", "ID"];
const APPLICANT_FIRST_NAME: Aliases = &["First Name", "firstName"];
const APPLICANT_LAST_NAME: Aliases = &["Last Name", "lastName"];
const APPLICANT_EMAIL: Aliases = &["Email", "email"];
const APPLICANT_PHONE: Aliases = &["phone", "Phone"];
const APPLICANT_ROLE: Aliases = &["Curent Role", "Current Role", "currentRole"];
const APPLICANT_JOB_TITLE: Aliases = &["Job Title", "appliedFor"];
const APPLICANT_EXPERIENCE: Aliases = &["Experience", "experience"];
const APPLICANT_LOCATION: Aliases = &["Location", "location"];
const APPLICANT_DATE: Aliases = &["date", "Date", "appliedDate"];
const APPLICANT_SKILLS: Aliases = &["Reasoning", "skills"];
const APPLICANT_SCORE: Aliases = &["Overall", "rating"];
const APPLICANT_CV: Aliases = &["CV", "cvUrl"];
const APPLICANT_TECH_SKILLS: Aliases = &["Technical Skills", "technicalSkills"];
const APPLICANT_ACHIEVEMENT: Aliases = &["Achievement", "achievement"];
const APPLICANT_EDUCATION: Aliases = &["Education", "education"];

const APPLICANT_CONSUMED: &[Aliases] = &[
    APPLICANT_ID,
    APPLICANT_FIRST_NAME,
    APPLICANT_LAST_NAME,
    APPLICANT_EMAIL,
    APPLICANT_PHONE,
    APPLICANT_ROLE,
    APPLICANT_JOB_TITLE,
    APPLICANT_EXPERIENCE,
    APPLICANT_LOCATION,
    APPLICANT_DATE,
    APPLICANT_SKILLS,
    APPLICANT_SCORE,
    APPLICANT_CV,
    APPLICANT_TECH_SKILLS,
    APPLICANT_ACHIEVEMENT,
    APPLICANT_EDUCATION,
];

const APPLICANT_CANONICAL: &[&str] = &[
    "id",
    "firstName",
    "lastName",
    "email",
    "phone",
    "currentRole",
    "appliedFor",
    "experience",
    "location",
    "stage",
    "status",
    "appliedDate",
    "skills",
    "rating",
    "source",
    "cvUrl",
    "overallScore",
    "technicalSkills",
    "achievement",
    "education",
];

// Job field mapping. The trailing-space variant of the department key is real
// upstream output, not a typo here.
const JOB_ID: Aliases = &["ID", "id"];
const JOB_TITLE: Aliases = &["Intitulé du Poste", "title"];
const JOB_DEPARTMENT: Aliases = &["Département", "Département ", "department"];
const JOB_DESCRIPTION: Aliases = &["Description du Poste", "description"];
const JOB_REQUIREMENTS: Aliases = &["Compétences Requises", "Exigences", "requirements"];
const JOB_RESPONSIBILITIES: Aliases = &["Responsabilités", "responsibilities"];
const JOB_EXPERIENCE_LEVEL: Aliases = &["Niveau d'Expérience", "experienceLevel"];
const JOB_LOCATION: Aliases = &["Localisation", "location"];
const JOB_TYPE: Aliases = &["Type de Poste", "Type d'Emploi", "type"];
const JOB_SALARY: Aliases = &["Fourchette de salaire", "Salaire", "salary"];
const JOB_STATUS: Aliases = &["Statut", "status"];
const JOB_URGENCY: Aliases = &["Urgence", "urgency"];
const JOB_APPLICANTS: Aliases = &["applicants", "candidats", "Candidats"];
const JOB_POSTED_DATE: Aliases = &["Date de publication", "postedDate"];
const JOB_EXPIRATION_DATE: Aliases = &["Date d'échéance", "expirationDate"];
const JOB_REMOTE: Aliases = &["Télétravail", "remote"];

const JOB_CONSUMED: &[Aliases] = &[
    JOB_ID,
    JOB_TITLE,
    JOB_DEPARTMENT,
    JOB_DESCRIPTION,
    JOB_REQUIREMENTS,
    JOB_RESPONSIBILITIES,
    JOB_EXPERIENCE_LEVEL,
    JOB_LOCATION,
    JOB_TYPE,
    JOB_SALARY,
    JOB_STATUS,
    JOB_URGENCY,
    JOB_APPLICANTS,
    JOB_POSTED_DATE,
    JOB_EXPIRATION_DATE,
    JOB_REMOTE,
];

const JOB_CANONICAL: &[&str] = &[
    "id",
    "title",
    "department",
    "description",
    "requirements",
    "responsibilities",
    "experienceLevel",
    "location",
    "type",
    "salary",
    "status",
    "urgency",
    "applicants",
    "postedDate",
    "expirationDate",
];

const NOT_SPECIFIED: &str = "Not specified";

/// Maps one raw upstream row into a normalized record. Pure; resolution gaps
/// are filled from defaults, never surfaced as errors.
pub trait Normalize: Sized {
    fn normalize_at(raw: &RawRecord, today: NaiveDate) -> Self;

    fn normalize(raw: &RawRecord) -> Self {
        Self::normalize_at(raw, Utc::now().date_naive())
    }
}

/// Read-only view over a raw row that resolves alias chains.
pub struct Resolver<'a> {
    raw: &'a RawRecord,
}

impl<'a> Resolver<'a> {
    pub fn new(raw: &'a RawRecord) -> Self {
        Self { raw }
    }

    /// First non-empty value in the alias chain. Null and "" count as absent.
    pub fn first(&self, aliases: Aliases) -> Option<&'a Value> {
        aliases
            .iter()
            .filter_map(|key| self.raw.get(*key))
            .find(|value| !is_empty(value))
    }

    pub fn text(&self, aliases: Aliases, default: &str) -> String {
        self.first(aliases)
            .map(value_to_text)
            .unwrap_or_else(|| default.to_string())
    }

    /// Like [`text`](Self::text) but trims surrounding whitespace; some
    /// upstream exports carry trailing spaces inside the value as well as in
    /// the key.
    pub fn trimmed(&self, aliases: Aliases, default: &str) -> String {
        let value = self.text(aliases, default);
        value.trim().to_string()
    }

    pub fn optional_text(&self, aliases: Aliases) -> Option<String> {
        self.first(aliases).map(value_to_text)
    }

    pub fn integer(&self, aliases: Aliases, default: i64) -> i64 {
        self.first(aliases)
            .and_then(|value| match value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            })
            .unwrap_or(default)
    }

    pub fn score(&self, aliases: Aliases) -> f64 {
        self.first(aliases).map(parse_score).unwrap_or(0.0)
    }

    pub fn string_list(&self, aliases: Aliases) -> Vec<String> {
        self.first(aliases).map(decode_string_list).unwrap_or_default()
    }

    pub fn date(&self, aliases: Aliases, default: NaiveDate) -> NaiveDate {
        self.optional_date(aliases).unwrap_or(default)
    }

    pub fn optional_date(&self, aliases: Aliases) -> Option<NaiveDate> {
        self.first(aliases).and_then(|value| match value {
            Value::String(s) => parse_date(s),
            _ => None,
        })
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Parses a 0-10 score that upstream encodes either as a bare number or as an
/// "N/10" string. Anything unparseable yields 0; the result is clamped to the
/// documented scale.
pub fn parse_score(value: &Value) -> f64 {
    let score = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f64>().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    };
    score.clamp(0.0, 10.0)
}

/// Decodes a skills/requirements column: either a real JSON array or a
/// JSON-encoded string. Decode failure yields the empty list.
pub fn decode_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|s| s.to_string())
            .collect(),
        Value::String(s) => serde_json::from_str::<Vec<String>>(s).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let head = s.trim();
    // Tolerate full ISO timestamps by taking the calendar-date prefix.
    let date_part = head.split('T').next().unwrap_or(head);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Raw keys that neither feed a canonical field nor collide with a canonical
/// output name pass through unchanged. Collisions are dropped so passthrough
/// can never shadow a normalized field.
fn passthrough(raw: &RawRecord, consumed: &[Aliases], canonical: &[&str]) -> Map<String, Value> {
    let mut extra = Map::new();
    for (key, value) in raw {
        let feeds_canonical = consumed
            .iter()
            .any(|aliases| aliases.contains(&key.as_str()));
        if feeds_canonical || canonical.contains(&key.as_str()) {
            continue;
        }
        extra.insert(key.clone(), value.clone());
    }
    extra
}

impl Normalize for Applicant {
    fn normalize_at(raw: &RawRecord, today: NaiveDate) -> Self {
        let fields = Resolver::new(raw);

        let skills = fields.string_list(APPLICANT_SKILLS);
        let experience = fields
            .optional_text(APPLICANT_EXPERIENCE)
            .map(|years| format!("{}/10", years.trim()))
            .unwrap_or_else(|| NOT_SPECIFIED.to_string());

        Self {
            id: fields.integer(APPLICANT_ID, 0),
            first_name: fields.text(APPLICANT_FIRST_NAME, "Unknown"),
            last_name: fields.text(APPLICANT_LAST_NAME, "Unknown"),
            email: fields.text(APPLICANT_EMAIL, "No email"),
            phone: fields.text(APPLICANT_PHONE, "No phone"),
            current_role: fields.text(APPLICANT_ROLE, NOT_SPECIFIED),
            applied_for: fields.text(APPLICANT_JOB_TITLE, NOT_SPECIFIED),
            experience,
            location: fields.text(APPLICANT_LOCATION, NOT_SPECIFIED),
            stage: "Applied".to_string(),
            status: "Active".to_string(),
            applied_date: fields.date(APPLICANT_DATE, today),
            skills,
            rating: fields.score(APPLICANT_SCORE),
            source: "Application".to_string(),
            cv_url: fields.optional_text(APPLICANT_CV),
            overall_score: fields.optional_text(APPLICANT_SCORE),
            technical_skills: fields.optional_text(APPLICANT_TECH_SKILLS),
            achievement: fields.optional_text(APPLICANT_ACHIEVEMENT),
            education: fields.optional_text(APPLICANT_EDUCATION),
            extra: passthrough(raw, APPLICANT_CONSUMED, APPLICANT_CANONICAL),
        }
    }
}

impl Normalize for Job {
    fn normalize_at(raw: &RawRecord, today: NaiveDate) -> Self {
        let fields = Resolver::new(raw);

        Self {
            id: fields.integer(JOB_ID, 0),
            title: fields.text(JOB_TITLE, "Untitled"),
            department: fields.trimmed(JOB_DEPARTMENT, NOT_SPECIFIED),
            description: fields.text(JOB_DESCRIPTION, ""),
            requirements: fields.string_list(JOB_REQUIREMENTS),
            responsibilities: fields.text(JOB_RESPONSIBILITIES, ""),
            experience_level: fields.text(JOB_EXPERIENCE_LEVEL, NOT_SPECIFIED),
            location: fields.text(JOB_LOCATION, NOT_SPECIFIED),
            job_type: fields.text(JOB_TYPE, NOT_SPECIFIED),
            salary: fields.text(JOB_SALARY, NOT_SPECIFIED),
            status: fields.text(JOB_STATUS, "Draft"),
            urgency: fields.text(JOB_URGENCY, "medium").to_lowercase(),
            applicants: fields.integer(JOB_APPLICANTS, 0),
            posted_date: fields.date(JOB_POSTED_DATE, today),
            expiration_date: fields.optional_date(JOB_EXPIRATION_DATE),
            extra: passthrough(raw, JOB_CONSUMED, JOB_CANONICAL),
        }
    }
}

impl JobDraft {
    /// Builds the create/update payload with upstream field names. Posted date
    /// defaults to today, expiration to thirty days out; the requirements text
    /// block splits on newlines.
    pub fn upstream_payload(&self, today: NaiveDate) -> Value {
        let requirements: Vec<String> = self
            .requirements
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect();

        let expiration = self
            .expiration_date
            .unwrap_or_else(|| today + chrono::Duration::days(30));

        serde_json::json!({
            "Intitulé du Poste": self.title,
            "Description du Poste": self.description,
            "Type d'Emploi": self.job_type,
            "Localisation": self.location,
            "Département": self.department,
            "Télétravail": self.remote,
            "Salaire": self.salary,
            "Statut": self.status.as_deref().unwrap_or("draft"),
            "Urgence": self.urgency.as_deref().unwrap_or("medium"),
            "Exigences": requirements,
            "Date de publication": today.format("%Y-%m-%d").to_string(),
            "Date d'échéance": expiration.format("%Y-%m-%d").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().expect("test fixture is an object")
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn score_parsing_tolerates_both_encodings() {
        assert_eq!(parse_score(&json!("7")), 7.0);
        assert_eq!(parse_score(&json!("7/10")), 7.0);
        assert_eq!(parse_score(&json!("")), 0.0);
        assert_eq!(parse_score(&json!("abc")), 0.0);
        assert_eq!(parse_score(&json!(8)), 8.0);
        assert_eq!(parse_score(&json!(8.5)), 8.5);
        assert_eq!(parse_score(&json!(null)), 0.0);
    }

    #[test]
    fn score_is_clamped_to_scale() {
        assert_eq!(parse_score(&json!("15/10")), 10.0);
        assert_eq!(parse_score(&json!(-3)), 0.0);
    }

    #[test]
    fn empty_row_normalizes_to_documented_defaults() {
        let today = day("2026-08-07");
        let applicant = Applicant::normalize_at(&RawRecord::new(), today);

        assert_eq!(applicant.id, 0);
        assert_eq!(applicant.first_name, "Unknown");
        assert_eq!(applicant.last_name, "Unknown");
        assert_eq!(applicant.email, "No email");
        assert_eq!(applicant.phone, "No phone");
        assert_eq!(applicant.current_role, "Not specified");
        assert_eq!(applicant.experience, "Not specified");
        assert_eq!(applicant.stage, "Applied");
        assert_eq!(applicant.status, "Active");
        assert_eq!(applicant.applied_date, today);
        assert!(applicant.skills.is_empty());
        assert_eq!(applicant.rating, 0.0);
        assert_eq!(applicant.source, "Application");
        assert!(applicant.cv_url.is_none());
    }

    #[test]
    fn applicant_resolves_misspelled_and_encoded_fields() {
        let row = raw(json!({
            "row_number": 12,
            "First Name": "Sarah",
            "Last Name": "Johnson",
            "Email": "sarah.johnson@email.com",
            "Curent Role": "Frontend Developer",
            "Job Title": "Senior Frontend Developer",
            "Experience": "5",
            "Overall": "9/10",
            "Reasoning": "[\"React\",\"TypeScript\"]",
            "date": "2024-01-15",
            "CV": "https://drive.example/cv.pdf"
        }));

        let applicant = Applicant::normalize_at(&row, day("2026-08-07"));
        assert_eq!(applicant.id, 12);
        assert_eq!(applicant.full_name(), "Sarah Johnson");
        assert_eq!(applicant.current_role, "Frontend Developer");
        assert_eq!(applicant.experience, "5/10");
        assert_eq!(applicant.rating, 9.0);
        assert_eq!(applicant.skills, vec!["React", "TypeScript"]);
        assert_eq!(applicant.applied_date, day("2024-01-15"));
        assert_eq!(applicant.cv_url.as_deref(), Some("https://drive.example/cv.pdf"));
        assert_eq!(applicant.overall_score.as_deref(), Some("9/10"));
    }

    #[test]
    fn malformed_skills_default_to_empty_list() {
        let row = raw(json!({ "Reasoning": "not json at all" }));
        let applicant = Applicant::normalize_at(&row, day("2026-08-07"));
        assert!(applicant.skills.is_empty());
    }

    #[test]
    fn job_resolves_bilingual_keys_and_trims_department() {
        let row = raw(json!({
            "ID": "42",
            "Intitulé du Poste": "Développeur Backend",
            "Département ": "Engineering ",
            "Localisation": "Paris",
            "Statut": "Active",
            "Urgence": "Haute",
            "Compétences Requises": ["Rust", "SQL"],
            "Date de publication": "2024-02-01",
            "candidats": "7"
        }));

        let job = Job::normalize_at(&row, day("2026-08-07"));
        assert_eq!(job.id, 42);
        assert_eq!(job.title, "Développeur Backend");
        assert_eq!(job.department, "Engineering");
        assert_eq!(job.location, "Paris");
        assert_eq!(job.status, "Active");
        assert_eq!(job.urgency, "haute");
        assert_eq!(job.requirements, vec!["Rust", "SQL"]);
        assert_eq!(job.applicants, 7);
        assert_eq!(job.posted_date, day("2024-02-01"));
        assert!(job.expiration_date.is_none());
    }

    #[test]
    fn job_missing_everything_gets_defaults() {
        let today = day("2026-08-07");
        let job = Job::normalize_at(&RawRecord::new(), today);
        assert_eq!(job.title, "Untitled");
        assert_eq!(job.department, "Not specified");
        assert_eq!(job.status, "Draft");
        assert_eq!(job.urgency, "medium");
        assert_eq!(job.posted_date, today);
        assert!(job.requirements.is_empty());
    }

    #[test]
    fn unknown_fields_pass_through_without_shadowing() {
        let row = raw(json!({
            "Intitulé du Poste": "Data Engineer",
            "Some Future Column": "kept",
            // Raw key that collides with a canonical output name must not
            // override the normalized value.
            "title": "shadow attempt"
        }));

        let job = Job::normalize_at(&row, day("2026-08-07"));
        assert_eq!(job.title, "Data Engineer");
        assert_eq!(
            job.extra.get("Some Future Column"),
            Some(&json!("kept"))
        );
        assert!(!job.extra.contains_key("title"));
    }

    #[test]
    fn alias_chain_prefers_primary_and_skips_empty() {
        let row = raw(json!({
            "Intitulé du Poste": "",
            "title": "Fallback Title"
        }));
        let job = Job::normalize_at(&row, day("2026-08-07"));
        assert_eq!(job.title, "Fallback Title");
    }

    #[test]
    fn draft_payload_uses_upstream_field_names() {
        let draft = JobDraft {
            title: "Platform Engineer".to_string(),
            description: "Build the platform".to_string(),
            job_type: "Full-time".to_string(),
            location: "Lyon".to_string(),
            department: "Engineering".to_string(),
            remote: true,
            salary: "60-70k".to_string(),
            status: None,
            urgency: Some("high".to_string()),
            requirements: "Rust\n\n  SQL  \n".to_string(),
            expiration_date: None,
        };

        let today = day("2026-08-07");
        let payload = draft.upstream_payload(today);
        assert_eq!(payload["Intitulé du Poste"], json!("Platform Engineer"));
        assert_eq!(payload["Statut"], json!("draft"));
        assert_eq!(payload["Urgence"], json!("high"));
        assert_eq!(payload["Télétravail"], json!(true));
        assert_eq!(payload["Exigences"], json!(["Rust", "SQL"]));
        assert_eq!(payload["Date de publication"], json!("2026-08-07"));
        assert_eq!(payload["Date d'échéance"], json!("2026-09-06"));
    }
}
