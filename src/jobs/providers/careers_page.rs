// src/jobs/providers/careers_page.rs
//! HTTP fallback: scrape the public careers page for postings.
//!
//! The page is server-rendered, so a plain fetch plus a class-selector ladder
//! is enough. Certificate validation is off on purpose — staging sites behind
//! self-signed certs still have to yield their listings.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::jobs::types::{JobProvider, RawJob};

pub const DEFAULT_CAREERS_PATH: &str = "/careers/";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Tried in order; the first selector with any matches is used exclusively.
static ITEM_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [".comeet-position", ".job-item", ".position"]
        .iter()
        .map(|s| Selector::parse(s).expect("job item selector"))
        .collect()
});

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[class*="title"]"#).expect("title selector"));

pub struct CareersPageProvider {
    url: Url,
    client: reqwest::Client,
}

impl CareersPageProvider {
    pub fn new(careers_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .user_agent(USER_AGENT)
            .http1_only()
            .build()
            .context("building careers page client")?;
        Ok(Self {
            url: careers_url,
            client,
        })
    }

    /// Provider for the conventional `/careers/` path under the site base.
    pub fn from_base(base: &Url) -> Result<Self> {
        let url = base
            .join(DEFAULT_CAREERS_PATH)
            .context("joining careers path onto site base")?;
        Self::new(url)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Pull raw jobs out of careers-page HTML. Pure so it can be tested against
/// fixtures without a server.
pub fn parse_jobs(html: &str, base: &Url) -> Vec<RawJob> {
    let doc = Html::parse_document(html);

    let items = ITEM_SELECTORS
        .iter()
        .map(|sel| doc.select(sel).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    let mut jobs = Vec::with_capacity(items.len());
    for element in items {
        let title = element
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| t.text().collect::<String>())
            .unwrap_or_else(|| element.text().collect::<String>());
        let title = title.trim().to_string();
        // Full whitespace normalization happens in the pipeline.
        if title.is_empty() {
            continue;
        }

        let link = (element.value().name() == "a")
            .then(|| element.value().attr("href"))
            .flatten()
            .and_then(|href| base.join(href).ok())
            .map(|url| url.to_string());

        jobs.push(RawJob {
            title,
            location: None,
            job_type: None,
            link,
        });
    }
    jobs
}

#[async_trait]
impl JobProvider for CareersPageProvider {
    async fn fetch_jobs(&self) -> Result<Vec<RawJob>> {
        let t0 = std::time::Instant::now();

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .context("fetching careers page")?;
        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("careers page returned {}", response.status());
        }
        let body = response.text().await.context("reading careers page body")?;

        let jobs = parse_jobs(&body, &self.url);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("jobs_parse_ms").record(ms);
        counter!("jobs_scraped_total").increment(jobs.len() as u64);

        Ok(jobs)
    }

    fn name(&self) -> &'static str {
        "careers-page"
    }
}
