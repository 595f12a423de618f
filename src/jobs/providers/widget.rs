// src/jobs/providers/widget.rs
//! In-process widget data source, tried before the HTTP fallback.
//!
//! The embedded job widget exposes its data through whichever accessor its
//! version happens to have, so the provider walks them in a fixed order and
//! the first one yielding a non-empty collection wins.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::jobs::types::{JobProvider, RawJob};

/// Access methods the embedded widget may expose. Implementors override what
/// their widget version supports; everything defaults to "not available".
pub trait WidgetSource: Send + Sync {
    /// Direct, typed accessor.
    fn jobs(&self) -> Option<Vec<RawJob>> {
        None
    }
    /// Generic data accessor returning loosely-typed JSON.
    fn data(&self) -> Option<Value> {
        None
    }
    /// Content accessor, last resort.
    fn content(&self) -> Option<Value> {
        None
    }
}

pub struct WidgetProvider {
    source: Arc<dyn WidgetSource>,
}

impl WidgetProvider {
    pub fn new(source: Arc<dyn WidgetSource>) -> Self {
        Self { source }
    }
}

/// Job-shaped entries of a JSON array; anything else yields nothing.
fn jobs_from_value(value: Value) -> Vec<RawJob> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<RawJob>(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl JobProvider for WidgetProvider {
    async fn fetch_jobs(&self) -> Result<Vec<RawJob>> {
        if let Some(jobs) = self.source.jobs() {
            if !jobs.is_empty() {
                return Ok(jobs);
            }
        }
        if let Some(data) = self.source.data() {
            let jobs = jobs_from_value(data);
            if !jobs.is_empty() {
                return Ok(jobs);
            }
        }
        if let Some(content) = self.source.content() {
            let jobs = jobs_from_value(content);
            if !jobs.is_empty() {
                return Ok(jobs);
            }
        }
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "widget"
    }
}
