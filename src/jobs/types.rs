// src/jobs/types.rs
use serde::{Deserialize, Serialize};
use url::Url;

/// A job posting as rendered: normalized title, optional meta fields, and an
/// always-populated category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Url>,
    pub category: String,
}

/// A posting as a provider saw it, before normalization and categorization.
/// Providers are lenient: empty titles are dropped later, links may still be
/// relative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawJob {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[async_trait::async_trait]
pub trait JobProvider: Send + Sync {
    async fn fetch_jobs(&self) -> anyhow::Result<Vec<RawJob>>;
    fn name(&self) -> &'static str;
}
