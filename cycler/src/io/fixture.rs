//! JSON page fixture standing in for the game page.
//!
//! A fixture lists the target links, which link is active, and the resource
//! counters each location displays. Dispatching toward a link rewrites the
//! fixture's active link on disk, which is how the CLI simulates navigation:
//! the next load reads the page the interaction led to.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::text::{extract_target_id, parse_quantity};
use crate::core::types::{ResourceSnapshot, TargetId};
use crate::io::page::{InteractionDispatcher, ResourceReader, TargetProvider};

/// Snapshot of a page as the host would render it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageFixture {
    /// Target list. `None` means the page has no target list at all.
    #[serde(default)]
    pub links: Option<Vec<FixtureLink>>,
    /// Address of the active link.
    #[serde(default)]
    pub active: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixtureLink {
    pub href: String,
    pub kind: LinkKind,
    /// Counters as displayed while this location is active.
    #[serde(default)]
    pub resources: DisplayedResources,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Planet,
    Moon,
    Other,
}

/// Raw counter text, e.g. `"1.234.567"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayedResources {
    pub metal: String,
    pub crystal: String,
    pub deuterium: String,
}

/// A located target link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureElement {
    pub id: TargetId,
    pub href: String,
}

impl PageFixture {
    fn target_links(&self) -> impl Iterator<Item = (TargetId, &FixtureLink)> {
        self.links
            .iter()
            .flatten()
            .filter(|link| matches!(link.kind, LinkKind::Planet | LinkKind::Moon))
            .filter_map(|link| extract_target_id(&link.href).map(|id| (id, link)))
    }

    fn active_link(&self) -> Option<&FixtureLink> {
        let active = self.active.as_deref()?;
        self.links.iter().flatten().find(|link| link.href == active)
    }

    /// Make `href` the active link, as a navigation would.
    pub fn navigate(&mut self, href: &str) {
        self.active = Some(href.to_string());
    }
}

impl TargetProvider for PageFixture {
    type Element = FixtureElement;

    fn has_target_list(&self) -> bool {
        self.links.is_some()
    }

    fn discover_targets(&self) -> Vec<TargetId> {
        self.target_links().map(|(id, _)| id).collect()
    }

    fn current_active_target(&self) -> Option<TargetId> {
        self.active.as_deref().and_then(extract_target_id)
    }

    fn locate_target(&self, id: &TargetId) -> Option<FixtureElement> {
        self.target_links()
            .find(|(candidate, _)| candidate == id)
            .map(|(id, link)| FixtureElement {
                id,
                href: link.href.clone(),
            })
    }
}

impl ResourceReader for PageFixture {
    fn read_current_snapshot(&self) -> ResourceSnapshot {
        match self.active_link() {
            Some(link) => ResourceSnapshot::new(
                parse_quantity(&link.resources.metal),
                parse_quantity(&link.resources.crystal),
                parse_quantity(&link.resources.deuterium),
            ),
            None => ResourceSnapshot::default(),
        }
    }
}

/// Load a page fixture from disk.
pub fn load_page(path: &Path) -> Result<PageFixture> {
    debug!(path = %path.display(), "loading page fixture");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read page {}", path.display()))?;
    let page: PageFixture =
        serde_json::from_str(&contents).with_context(|| format!("parse page {}", path.display()))?;
    Ok(page)
}

/// Atomically write a page fixture (temp file + rename).
pub fn write_page(path: &Path, page: &PageFixture) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(page)?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("page path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, buf).with_context(|| format!("write temp page {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace page {}", path.display()))?;
    Ok(())
}

/// Dispatcher that "navigates" by rewriting the fixture's active link on disk.
#[derive(Debug, Clone)]
pub struct FixtureNavigator {
    path: PathBuf,
}

impl FixtureNavigator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InteractionDispatcher<FixtureElement> for FixtureNavigator {
    fn dispatch(&mut self, element: &FixtureElement) -> Result<()> {
        let mut page = load_page(&self.path)?;
        page.navigate(&element.href);
        write_page(&self.path, &page)?;
        info!(target_id = %element.id, href = %element.href, "navigated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str, kind: LinkKind, metal: &str) -> FixtureLink {
        FixtureLink {
            href: href.to_string(),
            kind,
            resources: DisplayedResources {
                metal: metal.to_string(),
                crystal: "1.000".to_string(),
                deuterium: String::new(),
            },
        }
    }

    fn sample() -> PageFixture {
        PageFixture {
            links: Some(vec![
                link("index.php?cp=101", LinkKind::Planet, "12.345"),
                link("index.php?page=highscore", LinkKind::Other, "0"),
                link("index.php?cp=1010", LinkKind::Moon, "7"),
                link("index.php?cp=102", LinkKind::Other, "0"),
            ]),
            active: Some("index.php?cp=101".to_string()),
        }
    }

    #[test]
    fn discovers_planets_and_moons_in_page_order() {
        let ids = sample().discover_targets();
        assert_eq!(ids, vec![TargetId::from("101"), TargetId::from("1010")]);
    }

    #[test]
    fn locate_matches_whole_id() {
        let page = sample();
        let element = page
            .locate_target(&TargetId::from("101"))
            .expect("element");
        assert_eq!(element.href, "index.php?cp=101");
        assert!(page.locate_target(&TargetId::from("10")).is_none());
    }

    #[test]
    fn reads_active_counters() {
        let page = sample();
        assert_eq!(page.current_active_target(), Some(TargetId::from("101")));
        assert_eq!(
            page.read_current_snapshot(),
            ResourceSnapshot::new(12_345, 1_000, 0)
        );
    }

    #[test]
    fn missing_links_means_no_target_list() {
        let page: PageFixture = serde_json::from_str("{}").expect("parse");
        assert!(!page.has_target_list());
        assert!(page.discover_targets().is_empty());
        assert_eq!(page.read_current_snapshot(), ResourceSnapshot::default());
    }

    #[test]
    fn navigator_rewrites_active_link() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("page.json");
        write_page(&path, &sample()).expect("write");

        let page = load_page(&path).expect("load");
        let element = page
            .locate_target(&TargetId::from("1010"))
            .expect("element");
        FixtureNavigator::new(&path)
            .dispatch(&element)
            .expect("dispatch");

        let reloaded = load_page(&path).expect("reload");
        assert_eq!(reloaded.current_active_target(), Some(TargetId::from("1010")));
    }
}
