//! Job-title categorization: ordered keyword rules from TOML config, then a
//! fixed regex fallback sequence, then "Other".
//!
//! Rule order is part of the contract — a compound title like "Data Engineer"
//! resolves to whichever rule is registered first, not the most specific one.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CATEGORIES_CONFIG_PATH: &str = "config/categories.toml";
pub const ENV_CATEGORIES_CONFIG_PATH: &str = "CATEGORIES_CONFIG_PATH";
pub const ENV_CATEGORIES_HOT_RELOAD: &str = "CATEGORIES_HOT_RELOAD";

/// Label used when no rule and no fallback pattern matches.
pub const FALLBACK_CATEGORY: &str = "Other";

static DEFAULT_RULES_TOML: &str = include_str!("default_categories.toml");

/// Fallback patterns, tested in this fixed order after the configured terms.
static FALLBACK_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"(?i)(front[- ]?end|react|angular|vue|javascript|js)",
            "Engineering",
        ),
        (
            r"(?i)(back[- ]?end|node|python|java|php|ruby|go|scala)",
            "Engineering",
        ),
        (
            r"(?i)(devops|sre|site reliability|cloud|aws|azure|gcp)",
            "Engineering",
        ),
        (
            r"(?i)(data|analytics|analyst|scientist|machine learning|ai|business intelligence)",
            "Data & Analytics",
        ),
    ]
    .into_iter()
    .map(|(pattern, name)| (Regex::new(pattern).expect("fallback pattern"), name))
    .collect()
});

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub terms: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoriesRoot {
    categories: Vec<CategoryRule>,
}

#[derive(Debug)]
pub struct CategoryEngine {
    rules: Vec<CategoryRule>,
}

impl CategoryEngine {
    /// Load from a TOML file. Uses CATEGORIES_CONFIG_PATH or defaults to
    /// "config/categories.toml".
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = config_path();
        let content = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("failed to read category config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let root: CategoriesRoot = toml::from_str(toml_str)?;
        for rule in &root.categories {
            if rule.name.trim().is_empty() {
                anyhow::bail!("category rule with empty name");
            }
        }
        Ok(Self {
            rules: root.categories,
        })
    }

    /// The embedded default rule table.
    pub fn builtin() -> Self {
        Self::from_toml_str(DEFAULT_RULES_TOML).expect("embedded category rules")
    }

    /// File config when present and valid, builtin table otherwise.
    pub fn load_or_builtin() -> Self {
        match Self::from_toml() {
            Ok(engine) => engine,
            Err(e) => {
                info!(error = %e, "category config unavailable, using builtin rules");
                Self::builtin()
            }
        }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Assign a category to a job title. Strict order: configured terms in
    /// registration order, then the fixed fallback patterns, then "Other".
    pub fn categorize(&self, title: &str) -> String {
        let lower = title.to_lowercase();
        for rule in &self.rules {
            for term in &rule.terms {
                if lower.contains(&term.to_lowercase()) {
                    return rule.name.clone();
                }
            }
        }
        for (pattern, name) in FALLBACK_PATTERNS.iter() {
            if pattern.is_match(title) {
                return (*name).to_string();
            }
        }
        FALLBACK_CATEGORY.to_string()
    }
}

pub fn config_path() -> PathBuf {
    std::env::var(ENV_CATEGORIES_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATEGORIES_CONFIG_PATH))
}

/// Thread-safe handle. The whole rule table can be swapped at runtime — this
/// is the extension point for replacing the category configuration wholesale.
#[derive(Clone)]
pub struct CategoryHandle {
    inner: Arc<RwLock<CategoryEngine>>,
}

impl CategoryHandle {
    pub fn new(engine: CategoryEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn categorize(&self, title: &str) -> String {
        if let Ok(engine) = self.inner.read() {
            engine.categorize(title)
        } else {
            FALLBACK_CATEGORY.to_string()
        }
    }

    /// Snapshot of the configured rules (for filter-button icons/colors).
    pub fn rules(&self) -> Vec<CategoryRule> {
        self.inner
            .read()
            .map(|engine| engine.rules().to_vec())
            .unwrap_or_default()
    }

    /// Replace the rule table wholesale.
    pub fn replace(&self, engine: CategoryEngine) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = engine;
        }
    }

    /// Re-read the TOML config and swap it in.
    pub fn reload_from_disk(&self) -> anyhow::Result<()> {
        let engine = CategoryEngine::from_toml()?;
        self.replace(engine);
        info!("category rules reloaded");
        Ok(())
    }
}

fn hot_reload_enabled() -> bool {
    std::env::var(ENV_CATEGORIES_HOT_RELOAD)
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Poll `path`'s mtime every 2s and swap the engine on change. Enabled with
/// CATEGORIES_HOT_RELOAD=1; uses only std, no extra deps.
pub fn start_hot_reload_thread(handle: CategoryHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(mtime) => {
                    let changed = match last_mtime {
                        None => {
                            last_mtime = Some(mtime);
                            false
                        }
                        Some(prev) => mtime > prev,
                    };
                    if changed {
                        if let Ok(content) = fs::read_to_string(&path) {
                            if let Ok(engine) = CategoryEngine::from_toml_str(&content) {
                                handle.replace(engine);
                                info!(path = %path.display(), "category rules hot-reloaded");
                            }
                        }
                        last_mtime = Some(mtime);
                    }
                }
                Err(_) => {
                    // File missing or unreadable; keep trying.
                }
            }
            thread::sleep(poll);
        }
    });
}
