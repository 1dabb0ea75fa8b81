// src/listing.rs
//! Shared paginated-list query: one filter/sort/slice pipeline for every
//! list view, parameterized by record kind through [`Listable`].

use std::cmp::Ordering;

use serde::Serialize;

use crate::records::{Applicant, Job};

/// Fixed page size for every list view.
pub const PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Accepts the `dir` query parameter; anything but "desc" means ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(String),
}

impl StatusFilter {
    /// Accepts the `status` query parameter; absent or "all" disables the
    /// filter, any other label must match the record status exactly.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => StatusFilter::All,
            Some(s) if s.eq_ignore_ascii_case("all") => StatusFilter::All,
            Some(s) => StatusFilter::Only(s.to_string()),
        }
    }

    fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == wanted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Value a record exposes for a sort key. Records with no value for the
/// active key sort before everything ascending and after everything
/// descending.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
}

impl SortValue {
    fn as_text(&self) -> String {
        match self {
            SortValue::Text(s) => s.to_lowercase(),
            SortValue::Number(n) => n.to_string(),
        }
    }
}

/// A record kind that list views can search, status-filter, and sort.
pub trait Listable {
    fn search_fields(&self) -> Vec<&str>;
    fn status_label(&self) -> &str;
    fn sort_value(&self, key: &str) -> Option<SortValue>;
}

/// One derived page plus the totals the pager needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Filter, sort, and pagination state for one list view.
///
/// Changing the search text or status filter resets the page index; the page
/// index itself is never clamped here — out-of-range pages derive as empty
/// and bounds are the pager controls' concern.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: String,
    pub status: StatusFilter,
    pub sort: Option<SortSpec>,
    pub page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            sort: None,
            page: 0,
        }
    }
}

impl ListQuery {
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.status = status;
        self.page = 0;
    }

    /// Builds the query a list endpoint's parameters describe. Absent
    /// parameters keep the defaults; filters are applied before the page
    /// index so an explicit page survives the reset.
    pub fn from_params(
        search: Option<String>,
        status: Option<String>,
        sort: Option<String>,
        dir: Option<String>,
        page: Option<usize>,
    ) -> Self {
        let mut query = ListQuery::default();
        if let Some(search) = search {
            query.set_search(search);
        }
        query.set_status_filter(StatusFilter::parse(status.as_deref()));
        if let Some(key) = sort {
            query.sort = Some(SortSpec {
                key,
                direction: SortDirection::parse(dir.as_deref()),
            });
        }
        query.page = page.unwrap_or(0);
        query
    }

    /// Sorting on the active key toggles direction; a new key starts
    /// ascending.
    pub fn request_sort(&mut self, key: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.key == key => Some(SortSpec {
                key: spec.key,
                direction: spec.direction.toggled(),
            }),
            _ => Some(SortSpec {
                key: key.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
    }

    /// Derives the visible page: filter, stable sort, slice. Pure and
    /// infallible; identical state over identical input yields identical
    /// output.
    pub fn derive<T>(&self, records: &[T]) -> Page<T>
    where
        T: Listable + Clone,
    {
        let needle = self.search.trim().to_lowercase();

        let mut filtered: Vec<&T> = records
            .iter()
            .filter(|record| {
                let search_hit = needle.is_empty()
                    || record
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle));
                search_hit && self.status.matches(record.status_label())
            })
            .collect();

        if let Some(spec) = &self.sort {
            filtered.sort_by(|a, b| {
                let ordering = compare(a.sort_value(&spec.key), b.sort_value(&spec.key));
                match spec.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let total = filtered.len();
        let items: Vec<T> = filtered
            .into_iter()
            .skip(self.page.saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .cloned()
            .collect();

        Page {
            items,
            total,
            page: self.page,
            page_size: PAGE_SIZE,
            total_pages: total.div_ceil(PAGE_SIZE),
        }
    }
}

fn compare(a: Option<SortValue>, b: Option<SortValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(SortValue::Number(x)), Some(SortValue::Number(y))) => {
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => x.as_text().cmp(&y.as_text()),
    }
}

impl Listable for Applicant {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.current_role,
            &self.applied_for,
        ]
    }

    fn status_label(&self) -> &str {
        &self.status
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "id" => Some(SortValue::Number(self.id as f64)),
            "firstName" => Some(SortValue::Text(self.first_name.clone())),
            "lastName" => Some(SortValue::Text(self.last_name.clone())),
            "email" => Some(SortValue::Text(self.email.clone())),
            "currentRole" => Some(SortValue::Text(self.current_role.clone())),
            "appliedFor" => Some(SortValue::Text(self.applied_for.clone())),
            "location" => Some(SortValue::Text(self.location.clone())),
            "stage" => Some(SortValue::Text(self.stage.clone())),
            "status" => Some(SortValue::Text(self.status.clone())),
            "appliedDate" => Some(SortValue::Text(self.applied_date.to_string())),
            "rating" => Some(SortValue::Number(self.rating)),
            "source" => Some(SortValue::Text(self.source.clone())),
            _ => None,
        }
    }
}

impl Listable for Job {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.title,
            &self.department,
            &self.location,
            &self.description,
        ]
    }

    fn status_label(&self) -> &str {
        &self.status
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "id" => Some(SortValue::Number(self.id as f64)),
            "title" => Some(SortValue::Text(self.title.clone())),
            "department" => Some(SortValue::Text(self.department.clone())),
            "location" => Some(SortValue::Text(self.location.clone())),
            "type" => Some(SortValue::Text(self.job_type.clone())),
            "status" => Some(SortValue::Text(self.status.clone())),
            "urgency" => Some(SortValue::Text(self.urgency.clone())),
            "applicants" => Some(SortValue::Number(self.applicants as f64)),
            "postedDate" => Some(SortValue::Text(self.posted_date.to_string())),
            "expirationDate" => self
                .expiration_date
                .map(|date| SortValue::Text(date.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        email: String,
        role: String,
        status: String,
        score: Option<f64>,
    }

    impl Row {
        fn new(name: &str, status: &str, score: Option<f64>) -> Self {
            Self {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                role: "Engineer".to_string(),
                status: status.to_string(),
                score,
            }
        }
    }

    impl Listable for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![&self.name, &self.email, &self.role]
        }

        fn status_label(&self) -> &str {
            &self.status
        }

        fn sort_value(&self, key: &str) -> Option<SortValue> {
            match key {
                "name" => Some(SortValue::Text(self.name.clone())),
                "score" => self.score.map(SortValue::Number),
                _ => None,
            }
        }
    }

    fn names(page: &Page<Row>) -> Vec<String> {
        page.items.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn pagination_boundary_forty_five_records() {
        let records: Vec<Row> = (0..45)
            .map(|i| Row::new(&format!("person{i:02}"), "Active", None))
            .collect();

        let mut query = ListQuery::default();
        query.page = 2;
        let page = query.derive(&records);

        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].name, "person40");
        assert_eq!(page.items[4].name, "person44");
    }

    #[test]
    fn out_of_range_page_is_empty_not_an_error() {
        let records = vec![Row::new("solo", "Active", None)];
        let mut query = ListQuery::default();
        query.page = 9;
        let page = query.derive(&records);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn ascending_and_descending_are_exact_reverses() {
        let records = vec![
            Row::new("delta", "Active", Some(2.0)),
            Row::new("alpha", "Active", Some(9.0)),
            Row::new("charlie", "Active", Some(5.0)),
            Row::new("bravo", "Active", Some(7.0)),
        ];

        let mut query = ListQuery::default();
        query.request_sort("name");
        let ascending = names(&query.derive(&records));

        query.request_sort("name");
        let mut descending = names(&query.derive(&records));
        descending.reverse();

        assert_eq!(ascending, descending);
        assert_eq!(ascending, vec!["alpha", "bravo", "charlie", "delta"]);
    }

    #[test]
    fn derive_is_idempotent() {
        let records = vec![
            Row::new("zoe", "Active", Some(3.0)),
            Row::new("amy", "Rejected", Some(8.0)),
            Row::new("amy", "Active", None),
        ];
        let mut query = ListQuery::default();
        query.set_search("a");
        query.request_sort("score");

        let first = query.derive(&records);
        let second = query.derive(&records);
        assert_eq!(first.items, second.items);
        assert_eq!(first.total, second.total);
    }

    #[test]
    fn search_and_status_filters_combine() {
        let records = vec![
            Row::new("Sarah", "Active", None),
            Row::new("sarah-lee", "Rejected", None),
            Row::new("Mark", "Active", None),
            Row {
                name: "Nope".to_string(),
                email: "sarah.hidden@example.com".to_string(),
                role: "Engineer".to_string(),
                status: "Active".to_string(),
                score: None,
            },
        ];

        let mut query = ListQuery::default();
        query.set_search("sarah");
        query.set_status_filter(StatusFilter::Only("Active".to_string()));
        let page = query.derive(&records);

        // Case-insensitive substring over any searchable field, exact status.
        assert_eq!(names(&page), vec!["Sarah", "Nope"]);
    }

    #[test]
    fn status_filter_preserves_input_order() {
        let records = vec![
            Row::new("first", "Active", None),
            Row::new("second", "Rejected", None),
            Row::new("third", "Active", None),
        ];

        let mut query = ListQuery::default();
        query.set_status_filter(StatusFilter::Only("Active".to_string()));
        let page = query.derive(&records);
        assert_eq!(names(&page), vec!["first", "third"]);
    }

    #[test]
    fn missing_sort_value_goes_to_the_configured_end() {
        let records = vec![
            Row::new("scored-high", "Active", Some(9.0)),
            Row::new("unscored", "Active", None),
            Row::new("scored-low", "Active", Some(1.0)),
        ];

        let mut query = ListQuery::default();
        query.request_sort("score");
        assert_eq!(
            names(&query.derive(&records)),
            vec!["unscored", "scored-low", "scored-high"]
        );

        query.request_sort("score");
        assert_eq!(
            names(&query.derive(&records)),
            vec!["scored-high", "scored-low", "unscored"]
        );
    }

    #[test]
    fn filter_changes_reset_the_page() {
        let mut query = ListQuery::default();
        query.page = 4;
        query.set_search("x");
        assert_eq!(query.page, 0);

        query.page = 4;
        query.set_status_filter(StatusFilter::All);
        assert_eq!(query.page, 0);
    }

    #[test]
    fn request_sort_toggles_only_on_same_key() {
        let mut query = ListQuery::default();
        query.request_sort("name");
        assert_eq!(
            query.sort,
            Some(SortSpec {
                key: "name".to_string(),
                direction: SortDirection::Ascending
            })
        );

        query.request_sort("name");
        assert_eq!(
            query.sort.as_ref().map(|s| s.direction),
            Some(SortDirection::Descending)
        );

        query.request_sort("score");
        assert_eq!(
            query.sort,
            Some(SortSpec {
                key: "score".to_string(),
                direction: SortDirection::Ascending
            })
        );
    }
}
