//! Markup renderer for the job board.
//!
//! One parameterized renderer covers the visual variants — the variants share
//! structure and differ only in their class prefix, so the style-specific CSS
//! can target each without markup forks.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use thiserror::Error;
use tracing::error;

use crate::categories::CategoryRule;
use crate::jobs::types::JobRecord;

/// Categories need at least this many jobs to earn a filter button.
pub const MIN_JOBS_PER_FILTER: usize = 3;
/// At most this many category buttons, besides "all".
pub const MAX_FILTER_CATEGORIES: usize = 5;

const FALLBACK_ICON: &str = "fas fa-tag";
const ALL_ICON: &str = "fas fa-briefcase";

const HEADING_LABEL: &str = "המשרות שלנו";
const ALL_LABEL: &str = "כל המשרות";
const CTA_LABEL: &str = "לפרטים והגשת מועמדות";
const ERROR_BANNER: &str = "שגיאה בטעינת המשרות. אנא נסה שוב מאוחר יותר.";

const META_TYPE_LABEL: &str = "סוג";
const META_LOCATION_LABEL: &str = "מיקום";
const META_CATEGORY_LABEL: &str = "קטגוריה";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleVariant {
    Fresh,
    Ultra,
}

impl StyleVariant {
    fn prefix(self) -> &'static str {
        match self {
            StyleVariant::Fresh => "fresh",
            StyleVariant::Ultra => "ultra",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fresh" => Some(StyleVariant::Fresh),
            "ultra" => Some(StyleVariant::Ultra),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub variant: StyleVariant,
    pub show_filters: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            variant: StyleVariant::Fresh,
            show_filters: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("formatting markup: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Categories eligible for filter buttons, in first-appearance order:
/// at least `MIN_JOBS_PER_FILTER` jobs each, capped at
/// `MAX_FILTER_CATEGORIES`.
fn filter_categories(jobs: &[JobRecord]) -> Vec<(String, usize)> {
    let mut ordered: Vec<(String, usize)> = Vec::new();
    for job in jobs {
        match ordered.iter_mut().find(|(name, _)| *name == job.category) {
            Some((_, count)) => *count += 1,
            None => ordered.push((job.category.clone(), 1)),
        }
    }
    ordered.retain(|(_, count)| *count >= MIN_JOBS_PER_FILTER);
    ordered.truncate(MAX_FILTER_CATEGORIES);
    ordered
}

fn icon_for<'a>(rules: &'a [CategoryRule], category: &str) -> &'a str {
    rules
        .iter()
        .find(|r| r.name == category)
        .and_then(|r| r.icon.as_deref())
        .unwrap_or(FALLBACK_ICON)
}

/// Render the board: heading, optional filter-button row, card grid.
pub fn render_board(
    jobs: &[JobRecord],
    rules: &[CategoryRule],
    opts: &RenderOptions,
) -> Result<String, RenderError> {
    let p = opts.variant.prefix();
    let mut out = String::new();

    write!(out, r#"<div class="{p}-jobs-wrapper">"#)?;
    write!(
        out,
        r#"<h2 class="{p}-jobs-title">{HEADING_LABEL} ({})</h2>"#,
        jobs.len()
    )?;

    if opts.show_filters {
        let categories = filter_categories(jobs);
        if !categories.is_empty() {
            write!(out, r#"<div class="{p}-filter-buttons">"#)?;
            write!(
                out,
                r#"<button class="{p}-filter-btn active" data-category="all"><i class="{ALL_ICON}"></i> {ALL_LABEL} ({})</button>"#,
                jobs.len()
            )?;
            for (category, count) in &categories {
                write!(
                    out,
                    r#"<button class="{p}-filter-btn" data-category="{}"><i class="{}"></i> {} ({count})</button>"#,
                    encode_double_quoted_attribute(category),
                    encode_double_quoted_attribute(icon_for(rules, category)),
                    encode_text(category),
                )?;
            }
            write!(out, "</div>")?;
        }
    }

    write!(out, r#"<div class="{p}-jobs-grid">"#)?;
    for job in jobs {
        write_card(&mut out, p, job)?;
    }
    write!(out, "</div>")?;
    write!(out, "</div>")?;

    Ok(out)
}

fn write_card(out: &mut String, p: &str, job: &JobRecord) -> Result<(), RenderError> {
    write!(
        out,
        r#"<div class="{p}-job-card" data-category="{}">"#,
        encode_double_quoted_attribute(&job.category)
    )?;
    write!(
        out,
        r#"<h3 class="{p}-job-title">{}</h3>"#,
        encode_text(&job.title)
    )?;

    let meta_lines = [
        (META_TYPE_LABEL, job.job_type.as_deref()),
        (META_LOCATION_LABEL, job.location.as_deref()),
        (META_CATEGORY_LABEL, Some(job.category.as_str())),
    ];
    for (label, value) in meta_lines {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            write!(
                out,
                r#"<div class="{p}-job-meta"><strong>{label}:</strong> {}</div>"#,
                encode_text(value)
            )?;
        }
    }

    let href = job.link.as_ref().map(|u| u.as_str()).unwrap_or("#");
    write!(
        out,
        r#"<a href="{}" class="{p}-job-link" target="_blank" rel="noopener">{CTA_LABEL}</a>"#,
        encode_double_quoted_attribute(href)
    )?;
    write!(out, "</div>")?;
    Ok(())
}

/// Outermost render boundary: any failure while building markup collapses to
/// a single inline error banner, never a broken page.
pub fn render_or_error(jobs: &[JobRecord], rules: &[CategoryRule], opts: &RenderOptions) -> String {
    match render_board(jobs, rules, opts) {
        Ok(markup) => markup,
        Err(e) => {
            error!(error = %e, "rendering job board failed");
            format!(r#"<div class="jobs-error">{ERROR_BANNER}</div>"#)
        }
    }
}
