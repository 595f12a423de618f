// src/jobs/mod.rs
//! Job extraction pipeline: provider chain, title normalization,
//! categorization, post-processing hooks, and the placeholder fallback.

pub mod providers;
pub mod types;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use tracing::warn;
use url::Url;

use crate::categories::CategoryHandle;
use self::types::{JobProvider, JobRecord, RawJob};

/// Post-processing hook applied to the final job list before rendering.
pub type JobsFilter = dyn Fn(Vec<JobRecord>) -> Vec<JobRecord> + Send + Sync;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("jobs_fetched_total", "Jobs returned by the winning provider.");
        describe_counter!("jobs_kept_total", "Jobs kept after normalization and hooks.");
        describe_counter!(
            "jobs_placeholder_total",
            "Requests served with placeholder records."
        );
        describe_counter!("jobs_provider_errors_total", "Provider fetch/parse errors.");
        describe_counter!("jobs_scraped_total", "Jobs parsed from the careers page.");
        describe_histogram!("jobs_parse_ms", "Careers page parse time in milliseconds.");
    });
}

/// Collapse runs of whitespace and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a scraped title. Widget titles often arrive as a middle-dot
/// compound ("Title · Location · Type"); split it and redistribute the parts.
/// The location part is only trusted when it mentions Office or Hybrid.
pub fn normalize_title(raw: &str) -> (String, Option<String>, Option<String>) {
    let cleaned = collapse_whitespace(raw);
    let parts: Vec<&str> = cleaned.split('·').map(str::trim).collect();
    if parts.len() < 2 {
        return (cleaned, None, None);
    }

    let title = parts[0].to_string();
    let location = parts
        .get(1)
        .filter(|p| p.contains("Office") || p.contains("Hybrid"))
        .map(|p| p.to_string());
    let job_type = parts
        .get(2)
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string());
    (title, location, job_type)
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Normalize and categorize raw provider records. Records without a title
/// are dropped; compound-title parts only fill fields the provider left
/// empty.
pub fn enrich(raw: Vec<RawJob>, categories: &CategoryHandle, base: &Url) -> Vec<JobRecord> {
    let mut out = Vec::with_capacity(raw.len());
    for job in raw {
        let (title, location_from_title, type_from_title) = normalize_title(&job.title);
        if title.is_empty() {
            continue;
        }
        let location = none_if_empty(job.location).or(location_from_title);
        let job_type = none_if_empty(job.job_type).or(type_from_title);
        let link = job
            .link
            .as_deref()
            .filter(|l| *l != "#")
            .and_then(|l| base.join(l).ok());
        let category = categories.categorize(&title);
        out.push(JobRecord {
            title,
            location,
            job_type,
            link,
            category,
        });
    }
    out
}

/// Run the provider chain once: first provider yielding a non-empty list
/// wins. Provider errors are logged and never propagate past this boundary.
pub async fn fetch_jobs(
    providers: &[Box<dyn JobProvider>],
    categories: &CategoryHandle,
    base: &Url,
    filters: &[Box<JobsFilter>],
) -> Vec<JobRecord> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for provider in providers {
        match provider.fetch_jobs().await {
            Ok(jobs) if !jobs.is_empty() => {
                counter!("jobs_fetched_total").increment(jobs.len() as u64);
                raw = jobs;
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = ?e, provider = provider.name(), "provider error");
                counter!("jobs_provider_errors_total").increment(1);
            }
        }
    }

    let mut jobs = enrich(raw, categories, base);
    for filter in filters {
        jobs = filter(jobs);
    }
    counter!("jobs_kept_total").increment(jobs.len() as u64);
    jobs
}

/// Fixed records shown when every provider comes back empty, so the board
/// stays visually inspectable.
pub fn placeholder_jobs() -> Vec<JobRecord> {
    [
        ("Senior Software Engineer", "Jerusalem", "Senior", "Engineering"),
        ("Data Scientist", "Jerusalem", "Senior", "Data & Analytics"),
        ("Product Manager", "Jerusalem", "Management", "Product & Design"),
    ]
    .into_iter()
    .map(|(title, location, job_type, category)| JobRecord {
        title: title.to_string(),
        location: Some(location.to_string()),
        job_type: Some(job_type.to_string()),
        link: None,
        category: category.to_string(),
    })
    .collect()
}

/// An empty extraction is not an error — substitute the placeholders.
pub fn jobs_or_placeholders(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    if jobs.is_empty() {
        warn!("no jobs found, using placeholder data");
        counter!("jobs_placeholder_total").increment(1);
        placeholder_jobs()
    } else {
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{CategoryEngine, CategoryHandle};
    use anyhow::Result;
    use async_trait::async_trait;

    fn handle() -> CategoryHandle {
        CategoryHandle::new(CategoryEngine::builtin())
    }

    fn base() -> Url {
        Url::parse("https://example.com").expect("base")
    }

    #[test]
    fn compound_title_redistributes_location_and_type() {
        let (title, location, job_type) =
            normalize_title("Senior Backend Engineer · Tel Aviv Office · Full-time");
        assert_eq!(title, "Senior Backend Engineer");
        assert_eq!(location.as_deref(), Some("Tel Aviv Office"));
        assert_eq!(job_type.as_deref(), Some("Full-time"));
    }

    #[test]
    fn location_part_without_office_or_hybrid_is_ignored() {
        let (title, location, job_type) = normalize_title("Analyst · Anywhere · Part-time");
        assert_eq!(title, "Analyst");
        assert_eq!(location, None);
        assert_eq!(job_type.as_deref(), Some("Part-time"));
    }

    #[test]
    fn plain_titles_only_get_whitespace_collapsed() {
        let (title, location, job_type) = normalize_title("  Office \n Manager ");
        assert_eq!(title, "Office Manager");
        assert_eq!(location, None);
        assert_eq!(job_type, None);
    }

    #[test]
    fn enrich_drops_titleless_records_and_fills_category() {
        let raw = vec![
            RawJob {
                title: "   ".into(),
                ..RawJob::default()
            },
            RawJob {
                title: "Growth Marketing Manager".into(),
                link: Some("/jobs/9".into()),
                ..RawJob::default()
            },
        ];
        let jobs = enrich(raw, &handle(), &base());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].category, "Business");
        assert_eq!(
            jobs[0].link.as_ref().map(|u| u.as_str()),
            Some("https://example.com/jobs/9")
        );
    }

    #[test]
    fn provider_fields_win_over_compound_title_parts() {
        let raw = vec![RawJob {
            title: "Data Engineer · Haifa Office · Full-time".into(),
            location: Some("Remote".into()),
            ..RawJob::default()
        }];
        let jobs = enrich(raw, &handle(), &base());
        assert_eq!(jobs[0].location.as_deref(), Some("Remote"));
        assert_eq!(jobs[0].job_type.as_deref(), Some("Full-time"));
    }

    struct FailingProvider;
    #[async_trait]
    impl JobProvider for FailingProvider {
        async fn fetch_jobs(&self) -> Result<Vec<RawJob>> {
            anyhow::bail!("boom")
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct FixedProvider(Vec<RawJob>);
    #[async_trait]
    impl JobProvider for FixedProvider {
        async fn fetch_jobs(&self) -> Result<Vec<RawJob>> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn first_non_empty_provider_wins_and_errors_are_swallowed() {
        let providers: Vec<Box<dyn JobProvider>> = vec![
            Box::new(FailingProvider),
            Box::new(FixedProvider(Vec::new())),
            Box::new(FixedProvider(vec![RawJob {
                title: "SRE".into(),
                ..RawJob::default()
            }])),
        ];
        let jobs = fetch_jobs(&providers, &handle(), &base(), &[]).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "SRE");
    }

    #[tokio::test]
    async fn post_filters_run_over_the_final_list() {
        let providers: Vec<Box<dyn JobProvider>> = vec![Box::new(FixedProvider(vec![
            RawJob {
                title: "Backend Engineer".into(),
                ..RawJob::default()
            },
            RawJob {
                title: "Recruiter".into(),
                ..RawJob::default()
            },
        ]))];
        let only_engineering: Box<JobsFilter> = Box::new(|jobs| {
            jobs.into_iter()
                .filter(|j| j.category == "Engineering")
                .collect()
        });
        let jobs = fetch_jobs(&providers, &handle(), &base(), &[only_engineering]).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Backend Engineer");
    }

    #[test]
    fn empty_extraction_falls_back_to_placeholders() {
        let jobs = jobs_or_placeholders(Vec::new());
        assert_eq!(jobs.len(), 3);
        assert!(jobs.iter().all(|j| !j.title.is_empty()));
        assert!(jobs.iter().all(|j| !j.category.is_empty()));
    }
}
