//! Headless model of the client-side slider: element tree, readiness watcher,
//! slide builder, and filter controller.

pub mod dom;
pub mod filter;
pub mod selector;
pub mod slides;
pub mod watch;

use std::time::Duration;

use tracing::warn;
use url::Url;

use self::dom::{Dom, NodeId};
use self::slides::Carousel;

/// Fixed container identifier the host page provides.
pub const HOST_ID: &str = "careers";

/// Grace period after the widget's nodes appear, so its own render settles
/// before the originals are read.
const SETTLE_DELAY: Duration = Duration::from_millis(200);

fn find_host(d: &Dom) -> Option<NodeId> {
    let sel = format!("#{HOST_ID}");
    d.select(&sel, d.root()).ok()?.into_iter().next()
}

/// Boot sequence: locate the host, wait for the widget to populate one of the
/// candidate containers, then build the carousel over the discovered roots.
///
/// A watch timeout is logged and leaves the page untouched; so does an empty
/// widget. Either way the original markup stays visible.
pub async fn attach(d: &Dom, origin: &Url) -> Option<Carousel> {
    let host = find_host(d)?;
    let roots = match watch::wait_for_any(d, slides::CANDIDATE_ROOTS, host, watch::DEFAULT_TIMEOUT)
        .await
    {
        Ok(roots) => roots,
        Err(err) => {
            warn!(%err, "widget containers never appeared");
            return None;
        }
    };
    tokio::time::sleep(SETTLE_DELAY).await;
    slides::init_slider(d, host, &roots, origin)
}
