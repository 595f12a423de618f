//! Headless element tree standing in for the host page's DOM.
//!
//! Supports the handful of operations the slider needs: querying, attribute and
//! visibility mutation, child insertion, and synthetic event dispatch. Every
//! mutation bumps a revision published on a `tokio::sync::watch` channel, so
//! the readiness watcher re-queries on change instead of polling.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use super::selector::{AttrTest, Compound, SelectorList, SelectorParseError, Step};

pub type NodeId = usize;

/// Synthetic interaction kinds, dispatched in browser order when a CTA has to
/// replay the original anchor's click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MouseDown,
    MouseUp,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub kind: EventKind,
}

#[derive(Debug)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    visible: bool,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Element>,
    events: Vec<DispatchedEvent>,
}

/// Shared, cloneable handle to one document tree.
#[derive(Clone)]
pub struct Dom {
    tree: Arc<RwLock<Tree>>,
    revision: Arc<watch::Sender<u64>>,
}

const ROOT: NodeId = 0;

impl Dom {
    /// Fresh document with a single `body` root.
    pub fn new() -> Self {
        let root = Element {
            tag: "body".to_string(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            visible: true,
        };
        let (tx, _rx) = watch::channel(0u64);
        Self {
            tree: Arc::new(RwLock::new(Tree {
                nodes: vec![root],
                events: Vec::new(),
            })),
            revision: Arc::new(tx),
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Subscribe to mutation notifications. Subscribe *before* the first query
    /// so no mutation between query and subscription is lost.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modified(|r| *r += 1);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a detached element. Not observable until attached.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut tree = self.write();
        tree.nodes.push(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            visible: true,
        });
        tree.nodes.len() - 1
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        {
            let mut tree = self.write();
            tree.nodes[child].parent = Some(parent);
            tree.nodes[parent].children.push(child);
        }
        self.bump();
    }

    /// Insert `child` under `parent` before `reference`; append when
    /// `reference` is `None` or not a child of `parent`.
    pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        {
            let mut tree = self.write();
            tree.nodes[child].parent = Some(parent);
            let at = reference
                .and_then(|r| tree.nodes[parent].children.iter().position(|&c| c == r))
                .unwrap_or(tree.nodes[parent].children.len());
            tree.nodes[parent].children.insert(at, child);
        }
        self.bump();
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.read().nodes[node].children.first().copied()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.read().nodes[node].children.clone()
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.read().nodes[node].tag.clone()
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.read().nodes[node].attrs.get(name).cloned()
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        self.write()
            .nodes[node]
            .attrs
            .insert(name.to_string(), value.to_string());
        self.bump();
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let current = self.attr(node, "class").unwrap_or_default();
        let joined = if current.is_empty() {
            class.to_string()
        } else {
            format!("{current} {class}")
        };
        self.set_attr(node, "class", &joined);
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        let Some(current) = self.attr(node, "class") else {
            return;
        };
        let remaining = current
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if remaining != current {
            self.set_attr(node, "class", &remaining);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.read().nodes[node]
            .attrs
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == class))
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        self.write().nodes[node].text = Some(text.to_string());
        self.bump();
    }

    /// Own text plus descendant text, space-joined in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.read();
        let mut parts = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(t) = &tree.nodes[n].text {
                parts.push(t.clone());
            }
            for &c in tree.nodes[n].children.iter().rev() {
                stack.push(c);
            }
        }
        parts.join(" ")
    }

    pub fn set_visible(&self, node: NodeId, visible: bool) {
        self.write().nodes[node].visible = visible;
        self.bump();
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.read().nodes[node].visible
    }

    /// Record a synthetic event. The log is the observable stand-in for
    /// whatever listeners the real widget registered.
    pub fn dispatch(&self, node: NodeId, kind: EventKind) {
        self.write().events.push(DispatchedEvent { target: node, kind });
    }

    pub fn events(&self) -> Vec<DispatchedEvent> {
        self.read().events.clone()
    }

    /// All descendants of `root` matching the selector, in document order.
    pub fn query_all(&self, selector: &SelectorList, root: NodeId) -> Vec<NodeId> {
        let tree = self.read();
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = tree.nodes[root].children.iter().rev().copied().collect();
        let mut ordered = Vec::new();
        while let Some(n) = stack.pop() {
            ordered.push(n);
            for &c in tree.nodes[n].children.iter().rev() {
                stack.push(c);
            }
        }
        for n in ordered {
            if selector
                .alternatives
                .iter()
                .any(|alt| matches_compound(&tree, n, alt))
            {
                found.push(n);
            }
        }
        found
    }

    pub fn query_first(&self, selector: &SelectorList, root: NodeId) -> Option<NodeId> {
        self.query_all(selector, root).into_iter().next()
    }

    /// Parse-and-query convenience. A malformed selector is an error here;
    /// the readiness watcher downgrades it to "no match".
    pub fn select(&self, selector: &str, root: NodeId) -> Result<Vec<NodeId>, SelectorParseError> {
        Ok(self.query_all(&SelectorList::parse(selector)?, root))
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_step(tree: &Tree, node: NodeId, step: &Step) -> bool {
    let el = &tree.nodes[node];
    if let Some(tag) = &step.tag {
        if el.tag != *tag {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if el.attrs.get("id") != Some(id) {
            return false;
        }
    }
    for class in &step.classes {
        let has = el
            .attrs
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == class));
        if !has {
            return false;
        }
    }
    for test in &step.attrs {
        let ok = match test {
            AttrTest::Present(name) => el.attrs.contains_key(name),
            AttrTest::Equals(name, value) => el.attrs.get(name) == Some(value),
            AttrTest::Contains(name, value) => {
                el.attrs.get(name).is_some_and(|v| v.contains(value.as_str()))
            }
        };
        if !ok {
            return false;
        }
    }
    true
}

/// Subject step must match `node`; earlier steps must match ancestors in
/// order. Ancestors may sit above the query root, as in the real DOM.
fn matches_compound(tree: &Tree, node: NodeId, compound: &Compound) -> bool {
    let Some((subject, ancestors)) = compound.steps.split_last() else {
        return false;
    };
    if !matches_step(tree, node, subject) {
        return false;
    }
    let mut cursor = tree.nodes[node].parent;
    for step in ancestors.iter().rev() {
        loop {
            let Some(n) = cursor else {
                return false;
            };
            cursor = tree.nodes[n].parent;
            if matches_step(tree, n, step) {
                break;
            }
        }
    }
    true
}
