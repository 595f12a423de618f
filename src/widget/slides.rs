//! Slide builder: turn discovered widget items into carousel slides.
//!
//! Each slide gets a title, an optional meta line, and a call-to-action. The
//! CTA carries a real absolute link when the original anchor has a usable
//! href; otherwise activating it replays the anchor's interaction sequence so
//! the widget's own click handler still fires.

use once_cell::sync::Lazy;
use tracing::warn;
use url::Url;

use super::dom::{Dom, EventKind, NodeId};
use super::selector::SelectorList;

/// Sub-selectors the external widget is expected to eventually populate
/// under the host container.
pub const CANDIDATE_ROOTS: &str =
    ".comeet-positions, .comeet-widget, .comeet-container, .comeet, ul, ol";

pub const ITEM_SELECTOR: &str =
    ".comeet-position, .comeet-position-item, .comeet-list-item, .position";
const ITEM_FALLBACK_SELECTOR: &str = "li";
const TITLE_SELECTOR: &str = "a, .title, [data-title], h3, h2";
const META_SELECTOR: &str = ".comeet-position-details, .details, .subtitle, .meta";
const ANCHOR_SELECTOR: &str = "a[href], [data-url], [data-href]";

pub const CTA_LABEL: &str = "לפרטים והגשת מועמדות";

static ITEM_SEL: Lazy<SelectorList> =
    Lazy::new(|| SelectorList::parse(ITEM_SELECTOR).expect("item selector"));
static ITEM_FALLBACK_SEL: Lazy<SelectorList> =
    Lazy::new(|| SelectorList::parse(ITEM_FALLBACK_SELECTOR).expect("item fallback selector"));
static TITLE_SEL: Lazy<SelectorList> =
    Lazy::new(|| SelectorList::parse(TITLE_SELECTOR).expect("title selector"));
static META_SEL: Lazy<SelectorList> =
    Lazy::new(|| SelectorList::parse(META_SELECTOR).expect("meta selector"));
static ANCHOR_SEL: Lazy<SelectorList> =
    Lazy::new(|| SelectorList::parse(ANCHOR_SELECTOR).expect("anchor selector"));

/// What activating a slide's CTA does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtaAction {
    /// Navigate to a resolved absolute URL (rendered as a plain link).
    Navigate(Url),
    /// Replay the interaction sequence on the original element.
    Replay(NodeId),
}

#[derive(Debug, Clone)]
pub struct Slide {
    /// The generated `.swiper-slide` element.
    pub node: NodeId,
    /// The widget item this slide was built from.
    pub source: NodeId,
    pub title: String,
    pub meta: Option<String>,
    pub action: CtaAction,
}

#[derive(Debug)]
pub struct Carousel {
    pub container: NodeId,
    pub slides: Vec<Slide>,
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An anchor is "good" only if one of href/data-url/data-href is non-empty,
/// not `#`, and not a script pseudo-protocol.
fn good_href(dom: &Dom, anchor: NodeId) -> Option<String> {
    let raw = ["href", "data-url", "data-href"]
        .iter()
        .find_map(|name| dom.attr(anchor, name).filter(|v| !v.trim().is_empty()))?;
    let raw = raw.trim().to_string();
    if raw == "#" || raw.starts_with("javascript") {
        return None;
    }
    Some(raw)
}

/// Resolve a raw href to an absolute URL against the page origin.
pub fn resolve_url(raw: &str, origin: &Url) -> Option<Url> {
    origin.join(raw).ok()
}

/// Dispatch the press/release/click sequence the widget's listeners expect.
pub fn trigger_sequence(dom: &Dom, target: NodeId) {
    for kind in [EventKind::MouseDown, EventKind::MouseUp, EventKind::Click] {
        dom.dispatch(target, kind);
    }
}

/// Build one self-contained card from a raw job item and its best-guess
/// anchor.
pub fn build_slide(dom: &Dom, item: NodeId, anchor: Option<NodeId>, origin: &Url) -> Slide {
    let title_node = dom.query_first(&TITLE_SEL, item).unwrap_or(item);
    let title = collapse_whitespace(&dom.text_content(title_node));

    let meta = dom
        .query_first(&META_SEL, item)
        .map(|n| dom.text_content(n).trim().to_string())
        .filter(|m| !m.is_empty());

    let href = anchor
        .and_then(|a| good_href(dom, a))
        .and_then(|raw| resolve_url(&raw, origin));

    let slide = dom.create_element("div");
    dom.set_attr(slide, "class", "swiper-slide");

    let card = dom.create_element("article");
    dom.set_attr(card, "class", "job-card");
    dom.append_child(slide, card);

    let title_el = dom.create_element("h3");
    dom.set_attr(title_el, "class", "job-title");
    dom.set_text(title_el, &title);
    dom.append_child(card, title_el);

    if let Some(meta_text) = &meta {
        let meta_el = dom.create_element("div");
        dom.set_attr(meta_el, "class", "job-meta");
        dom.set_text(meta_el, meta_text);
        dom.append_child(card, meta_el);
    }

    let cta_wrap = dom.create_element("div");
    dom.set_attr(cta_wrap, "class", "job-cta");
    dom.append_child(card, cta_wrap);

    let cta = dom.create_element("a");
    dom.set_text(cta, CTA_LABEL);
    match &href {
        Some(url) => {
            dom.set_attr(cta, "href", url.as_str());
            dom.set_attr(cta, "target", "_blank");
            dom.set_attr(cta, "rel", "noopener");
        }
        None => dom.set_attr(cta, "href", "#"),
    }
    dom.append_child(cta_wrap, cta);

    let action = match href {
        Some(url) => CtaAction::Navigate(url),
        None => CtaAction::Replay(anchor.unwrap_or(item)),
    };

    Slide {
        node: slide,
        source: item,
        title,
        meta,
        action,
    }
}

/// Activate a slide's CTA. Navigation is the link's own business; a replay
/// action re-fires the original element's interaction sequence.
pub fn activate(dom: &Dom, slide: &Slide) {
    if let CtaAction::Replay(target) = slide.action {
        trigger_sequence(dom, target);
    }
}

/// Build the carousel from the discovered roots: collect job items, turn each
/// into a slide, mount the carousel at the top of the host, and hide (not
/// remove) the originals so the widget's listeners stay attached.
///
/// Returns `None` — leaving the original content visible — when no job items
/// exist under any root.
pub fn init_slider(dom: &Dom, host: NodeId, roots: &[NodeId], origin: &Url) -> Option<Carousel> {
    let mut pairs = Vec::new();
    for &root in roots {
        let mut items = dom.query_all(&ITEM_SEL, root);
        if items.is_empty() {
            items = dom.query_all(&ITEM_FALLBACK_SEL, root);
        }
        for item in items {
            let anchor = dom.query_first(&ANCHOR_SEL, item);
            pairs.push((item, anchor));
        }
    }
    if pairs.is_empty() {
        warn!("no job items found under candidate roots; leaving widget markup as-is");
        return None;
    }

    let container = dom.create_element("div");
    dom.set_attr(container, "class", "swiper");
    let wrapper = dom.create_element("div");
    dom.set_attr(wrapper, "class", "swiper-wrapper");
    dom.append_child(container, wrapper);

    let slides: Vec<Slide> = pairs
        .into_iter()
        .map(|(item, anchor)| {
            let slide = build_slide(dom, item, anchor, origin);
            dom.append_child(wrapper, slide.node);
            slide
        })
        .collect();

    let nav = dom.create_element("div");
    dom.set_attr(nav, "class", "cr-jobs-nav");
    for class in ["cr-jobs-button prev", "cr-jobs-button next"] {
        let btn = dom.create_element("button");
        dom.set_attr(btn, "class", class);
        dom.set_attr(btn, "type", "button");
        dom.append_child(nav, btn);
    }

    dom.insert_before(host, container, dom.first_child(host));
    dom.append_child(host, nav);

    for &root in roots {
        dom.set_visible(root, false);
    }

    Some(Carousel { container, slides })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://example.com").expect("origin")
    }

    fn item_with_anchor(dom: &Dom, href: Option<&str>, title: &str) -> (NodeId, Option<NodeId>) {
        let item = dom.create_element("div");
        dom.set_attr(item, "class", "comeet-position");
        dom.append_child(dom.root(), item);
        let anchor = href.map(|h| {
            let a = dom.create_element("a");
            dom.set_attr(a, "href", h);
            dom.set_text(a, title);
            dom.append_child(item, a);
            a
        });
        if anchor.is_none() {
            dom.set_text(item, title);
        }
        (item, anchor)
    }

    #[test]
    fn good_href_resolves_to_absolute_navigation() {
        let dom = Dom::new();
        let (item, anchor) = item_with_anchor(&dom, Some("/jobs/42"), "Backend Engineer");
        let slide = build_slide(&dom, item, anchor, &origin());
        match &slide.action {
            CtaAction::Navigate(url) => {
                assert!(url.as_str().ends_with("/jobs/42"));
                assert_eq!(url.host_str(), Some("example.com"));
            }
            other => panic!("expected navigation, got {other:?}"),
        }
        // The rendered CTA opens in a new browsing context.
        let cta = dom.select(".job-cta a", slide.node).expect("cta");
        assert_eq!(dom.attr(cta[0], "target").as_deref(), Some("_blank"));
    }

    #[test]
    fn hash_href_falls_back_to_replay() {
        let dom = Dom::new();
        let (item, anchor) = item_with_anchor(&dom, Some("#"), "Frontend Engineer");
        let slide = build_slide(&dom, item, anchor, &origin());
        assert_eq!(slide.action, CtaAction::Replay(anchor.expect("anchor")));

        activate(&dom, &slide);
        let kinds: Vec<EventKind> = dom.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::MouseDown, EventKind::MouseUp, EventKind::Click]
        );
        assert!(dom.events().iter().all(|e| e.target == anchor.unwrap()));
    }

    #[test]
    fn javascript_pseudo_protocol_is_not_a_good_href() {
        let dom = Dom::new();
        let (item, anchor) =
            item_with_anchor(&dom, Some("javascript:void(0)"), "Data Scientist");
        let slide = build_slide(&dom, item, anchor, &origin());
        assert!(matches!(slide.action, CtaAction::Replay(_)));
    }

    #[test]
    fn data_url_attribute_counts_as_good() {
        let dom = Dom::new();
        let item = dom.create_element("div");
        dom.append_child(dom.root(), item);
        let a = dom.create_element("a");
        dom.set_attr(a, "data-url", "/jobs/7");
        dom.set_text(a, "DevOps Engineer");
        dom.append_child(item, a);

        let slide = build_slide(&dom, item, Some(a), &origin());
        assert!(matches!(slide.action, CtaAction::Navigate(_)));
    }

    #[test]
    fn title_falls_back_to_item_text_and_collapses_whitespace() {
        let dom = Dom::new();
        let item = dom.create_element("div");
        dom.set_text(item, "  Office \n  Manager ");
        dom.append_child(dom.root(), item);
        let slide = build_slide(&dom, item, None, &origin());
        assert_eq!(slide.title, "Office Manager");
    }

    #[test]
    fn init_slider_aborts_without_items() {
        let dom = Dom::new();
        let host = dom.create_element("div");
        dom.append_child(dom.root(), host);
        let empty_root = dom.create_element("ul");
        dom.append_child(host, empty_root);

        assert!(init_slider(&dom, host, &[empty_root], &origin()).is_none());
        // Originals stay visible when the build is aborted.
        assert!(dom.is_visible(empty_root));
    }
}
