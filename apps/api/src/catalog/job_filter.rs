//! Job list filtering: free-text search, industry filter and sort order, as the
//! job list page offers them. Pure functions over the backend's job list.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::models::job::JobPosting;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSort {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    /// Case-insensitive substring of the title, description or company.
    #[serde(default)]
    pub search: Option<String>,
    /// Case-insensitive exact industry.
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub sort: JobSort,
}

impl JobFilter {
    pub fn matches(&self, job: &JobPosting) -> bool {
        let term_ok = match self.search.as_deref() {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&job.title, &job.description, &job.company]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        };
        let industry_ok = match self.industry.as_deref() {
            None | Some("") => true,
            Some(industry) => job.industry.to_lowercase() == industry.to_lowercase(),
        };
        term_ok && industry_ok
    }
}

/// Keeps the jobs `filter` matches, in its sort order. Jobs without a creation
/// date sort last for both date orders.
pub fn filter_jobs(jobs: Vec<JobPosting>, filter: &JobFilter) -> Vec<JobPosting> {
    let mut kept: Vec<JobPosting> = jobs.into_iter().filter(|job| filter.matches(job)).collect();
    match filter.sort {
        JobSort::Newest => kept.sort_by(|a, b| by_date(a, b, Ordering::reverse)),
        JobSort::Oldest => kept.sort_by(|a, b| by_date(a, b, |o| o)),
        JobSort::Alphabetical => kept.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
        }),
    }
    kept
}

fn by_date(a: &JobPosting, b: &JobPosting, direction: fn(Ordering) -> Ordering) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => direction(x.cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Distinct non-blank industries in first-seen order, for the filter choices.
pub fn unique_industries(jobs: &[JobPosting]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for job in jobs {
        if !job.industry.trim().is_empty() && !seen.contains(&job.industry) {
            seen.push(job.industry.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn job(title: &str, company: &str, industry: &str, day: Option<u32>) -> JobPosting {
        JobPosting {
            id: Some(title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            company: company.to_string(),
            industry: industry.to_string(),
            location: String::new(),
            description: format!("{title} at {company}"),
            technical_skills: Vec::new(),
            user_id: None,
            created_at: day.map(|d| Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0).unwrap()),
            updated_at: None,
            applicants: 0,
        }
    }

    fn jobs() -> Vec<JobPosting> {
        vec![
            job("Frontend Developer", "TechCorp", "Technology", Some(10)),
            job("Risk Analyst", "First Bank", "Banking", Some(2)),
            job("data engineer", "TechCorp", "technology", Some(20)),
            job("Nurse Lead", "City Clinic", "Healthcare", None),
        ]
    }

    fn titles(jobs: &[JobPosting]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn test_filter_table() {
        let cases: [(Option<&str>, Option<&str>, JobSort, Vec<&str>); 7] = [
            (
                None,
                None,
                JobSort::Newest,
                vec!["data engineer", "Frontend Developer", "Risk Analyst", "Nurse Lead"],
            ),
            (
                None,
                None,
                JobSort::Oldest,
                vec!["Risk Analyst", "Frontend Developer", "data engineer", "Nurse Lead"],
            ),
            (
                None,
                None,
                JobSort::Alphabetical,
                vec!["data engineer", "Frontend Developer", "Nurse Lead", "Risk Analyst"],
            ),
            (
                Some("TECHCORP"),
                None,
                JobSort::Oldest,
                vec!["Frontend Developer", "data engineer"],
            ),
            (Some("analyst"), None, JobSort::Newest, vec!["Risk Analyst"]),
            (
                None,
                Some("Technology"),
                JobSort::Alphabetical,
                vec!["data engineer", "Frontend Developer"],
            ),
            (Some("nurse"), Some("banking"), JobSort::Newest, vec![]),
        ];

        for (search, industry, sort, expected) in cases {
            let filter = JobFilter {
                search: search.map(str::to_string),
                industry: industry.map(str::to_string),
                sort,
            };
            let kept = filter_jobs(jobs(), &filter);
            assert_eq!(titles(&kept), expected, "{search:?} / {industry:?} / {sort:?}");
        }
    }

    #[test]
    fn test_blank_criteria_keep_everything() {
        let filter = JobFilter {
            search: Some(String::new()),
            industry: Some(String::new()),
            sort: JobSort::Newest,
        };
        assert_eq!(filter_jobs(jobs(), &filter).len(), 4);
    }

    #[test]
    fn test_unique_industries_first_seen_order() {
        let mut all = jobs();
        all.push(job("Teller", "First Bank", "Banking", None));
        all.push(job("Intern", "Unknown", "  ", None));
        assert_eq!(
            unique_industries(&all),
            vec!["Technology", "Banking", "technology", "Healthcare"]
        );
    }

    #[test]
    fn test_sort_parses_from_query_value() {
        let filter: JobFilter =
            serde_json::from_str(r#"{"search": "dev", "sort": "alphabetical"}"#).unwrap();
        assert_eq!(filter.sort, JobSort::Alphabetical);
        assert_eq!(JobFilter::default().sort, JobSort::Newest);
    }
}
