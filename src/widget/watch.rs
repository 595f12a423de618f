//! Readiness watcher: wait until a selector matches inside a subtree.
//!
//! The external job widget renders asynchronously after its script loads, so a
//! one-shot query races the widget's own render. The watcher checks once, then
//! re-queries on every mutation notification until the deadline.

use std::time::Duration;

use thiserror::Error;

use super::dom::{Dom, NodeId};
use super::selector::SelectorList;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    Timeout { selector: String, timeout: Duration },
}

/// Resolve with the matching nodes as soon as any exist under `root`, or
/// reject with `Timeout`. Resolves or rejects exactly once; dropping the
/// future ends the subscription.
///
/// A malformed selector is swallowed and treated as "not yet found" rather
/// than crashing the watch loop, so it still ends in `Timeout`.
pub async fn wait_for_any(
    dom: &Dom,
    selector: &str,
    root: NodeId,
    timeout: Duration,
) -> Result<Vec<NodeId>, WatchError> {
    let deadline = tokio::time::Instant::now() + timeout;
    // Subscribe before the first query so a mutation in between still wakes us.
    let mut revisions = dom.subscribe();
    revisions.mark_unchanged();

    let check = |dom: &Dom| -> Vec<NodeId> {
        match SelectorList::parse(selector) {
            Ok(sel) => dom.query_all(&sel, root),
            Err(_) => Vec::new(),
        }
    };

    let found = check(dom);
    if !found.is_empty() {
        return Ok(found);
    }

    let timeout_err = || WatchError::Timeout {
        selector: selector.to_string(),
        timeout,
    };

    loop {
        match tokio::time::timeout_at(deadline, revisions.changed()).await {
            Err(_elapsed) => return Err(timeout_err()),
            Ok(Err(_closed)) => {
                // The document was dropped; nothing can match anymore, but the
                // contract is still resolve-or-timeout.
                tokio::time::sleep_until(deadline).await;
                return Err(timeout_err());
            }
            Ok(Ok(())) => {
                let found = check(dom);
                if !found.is_empty() {
                    return Ok(found);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom_with_list() -> Dom {
        let dom = Dom::new();
        let list = dom.create_element("ul");
        dom.set_attr(list, "class", "comeet-positions");
        dom.append_child(dom.root(), list);
        dom
    }

    #[tokio::test]
    async fn resolves_immediately_when_present() {
        let dom = dom_with_list();
        let found = wait_for_any(&dom, ".comeet-positions", dom.root(), Duration::from_secs(1))
            .await
            .expect("should resolve without waiting");
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn rejects_with_timeout_when_nothing_matches() {
        let dom = Dom::new();
        let err = wait_for_any(&dom, ".never", dom.root(), Duration::from_millis(50))
            .await
            .expect_err("empty dom must time out");
        assert!(matches!(err, WatchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn malformed_selector_times_out_instead_of_crashing() {
        let dom = dom_with_list();
        let err = wait_for_any(&dom, "[broken", dom.root(), Duration::from_millis(50))
            .await
            .expect_err("malformed selector must behave like no match");
        assert!(matches!(err, WatchError::Timeout { .. }));
    }
}
