//! Category filter controller for rendered job boards.
//!
//! One state variable — the selected category — drives button highlighting
//! and card visibility. Containers are registered in an explicit init
//! registry so re-running initialization (templates get re-injected) stays a
//! no-op.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::dom::{Dom, NodeId};
use super::selector::SelectorList;

pub const ALL_CATEGORY: &str = "all";
const ACTIVE_CLASS: &str = "active";

static BUTTON_SEL: Lazy<SelectorList> =
    Lazy::new(|| SelectorList::parse("button[data-category]").expect("button selector"));
static TAGGED_SEL: Lazy<SelectorList> =
    Lazy::new(|| SelectorList::parse("[data-category]").expect("tagged selector"));

#[derive(Debug)]
pub struct FilterController {
    selected: String,
    initialized: HashSet<String>,
}

impl FilterController {
    pub fn new() -> Self {
        Self {
            selected: ALL_CATEGORY.to_string(),
            initialized: HashSet::new(),
        }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Wire up a container once. Returns `false` (and does nothing) when this
    /// container was already initialized.
    pub fn init(&mut self, dom: &Dom, container: NodeId) -> bool {
        let key = container_key(dom, container);
        if !self.initialized.insert(key) {
            return false;
        }
        self.apply(dom, container);
        true
    }

    /// A filter button was clicked: remember the category and re-apply
    /// visibility. Synchronous and idempotent.
    pub fn select(&mut self, dom: &Dom, container: NodeId, category: &str) {
        self.selected = category.to_string();
        self.apply(dom, container);
    }

    fn apply(&self, dom: &Dom, container: NodeId) {
        let buttons = dom.query_all(&BUTTON_SEL, container);
        for &btn in &buttons {
            let is_selected =
                dom.attr(btn, "data-category").as_deref() == Some(self.selected.as_str());
            if is_selected {
                dom.add_class(btn, ACTIVE_CLASS);
            } else {
                dom.remove_class(btn, ACTIVE_CLASS);
            }
        }

        for card in dom.query_all(&TAGGED_SEL, container) {
            if buttons.contains(&card) {
                continue;
            }
            let visible = self.selected == ALL_CATEGORY
                || dom.attr(card, "data-category").as_deref() == Some(self.selected.as_str());
            dom.set_visible(card, visible);
        }
    }
}

impl Default for FilterController {
    fn default() -> Self {
        Self::new()
    }
}

fn container_key(dom: &Dom, container: NodeId) -> String {
    dom.attr(container, "id")
        .unwrap_or_else(|| format!("node-{container}"))
}
