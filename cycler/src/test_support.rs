//! Test-only helpers: in-memory pages, recording dispatcher, fake clock, and
//! throwaway session directories.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use anyhow::Result;
use tempfile::TempDir;

use crate::core::types::{ResourceSnapshot, TargetId};
use crate::io::clock::Clock;
use crate::io::fixture::{DisplayedResources, FixtureLink, LinkKind, PageFixture, write_page};
use crate::io::page::InteractionDispatcher;
use crate::io::paths::SessionPaths;

/// Address of the planet link for `id`.
pub fn planet_href(id: &str) -> String {
    format!("index.php?page=ingame&component=overview&cp={id}")
}

/// Planet link whose counters display `snapshot`.
pub fn planet(id: &str, snapshot: ResourceSnapshot) -> FixtureLink {
    FixtureLink {
        href: planet_href(id),
        kind: LinkKind::Planet,
        resources: DisplayedResources {
            metal: snapshot.metal.to_string(),
            crystal: snapshot.crystal.to_string(),
            deuterium: snapshot.deuterium.to_string(),
        },
    }
}

/// Page with one planet per id (all counters zero) and no active link.
pub fn page_with_planets(ids: &[&str]) -> PageFixture {
    PageFixture {
        links: Some(
            ids.iter()
                .map(|id| planet(id, ResourceSnapshot::default()))
                .collect(),
        ),
        active: None,
    }
}

/// Same page with `id` active.
pub fn showing(mut page: PageFixture, id: &str) -> PageFixture {
    page.navigate(&planet_href(id));
    page
}

/// Dispatcher that only records what it was asked to dispatch.
#[derive(Debug)]
pub struct RecordingDispatcher<E> {
    pub dispatched: Vec<E>,
}

impl<E> Default for RecordingDispatcher<E> {
    fn default() -> Self {
        Self {
            dispatched: Vec::new(),
        }
    }
}

impl<E: Clone> InteractionDispatcher<E> for RecordingDispatcher<E> {
    fn dispatch(&mut self, element: &E) -> Result<()> {
        self.dispatched.push(element.clone());
        Ok(())
    }
}

/// Clock frozen at a settable instant; `sleep` advances it and is recorded.
#[derive(Debug, Default)]
pub struct FakeClock {
    now_ms: Cell<i64>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn at(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, by: Duration) {
        let millis = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now_ms.set(self.now_ms.get().saturating_add(millis));
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

/// Temporary session directory with a page fixture on disk.
pub struct TestSession {
    _temp: TempDir,
    pub paths: SessionPaths,
}

impl TestSession {
    pub fn new(page: &PageFixture) -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let paths = SessionPaths::new(temp.path().join(".cycler"));
        write_page(&paths.page_path, page)?;
        Ok(Self { _temp: temp, paths })
    }
}

/// Shorthand for building ids in assertions.
pub fn ids(raw: &[&str]) -> Vec<TargetId> {
    raw.iter().map(|id| TargetId::from(*id)).collect()
}
