//! Location-fragment navigation.
//!
//! The dashboard has one current page, derived from a location fragment such
//! as `#/jobs`. External fragment changes map onto pages, and programmatic
//! page switches write the matching fragment back so both stay in sync.
//! `Start` is never shown: it resolves to `Home` when nothing is configured
//! yet and to `Jobs` otherwise.

use std::fmt;

/// Fragment held before any page has been resolved.
pub const START_FRAGMENT: &str = "#/start";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Start,
    Home,
    Jobs,
    Profiles,
}

impl Page {
    /// Map a location fragment to a page. Unknown or absent fragments yield `Start`.
    pub fn from_fragment(fragment: Option<&str>) -> Page {
        match fragment {
            Some("#/home") => Page::Home,
            Some("#/jobs") => Page::Jobs,
            Some("#/profiles") => Page::Profiles,
            _ => Page::Start,
        }
    }

    /// Fragment written when this page is shown.
    pub fn fragment(self) -> &'static str {
        match self {
            Page::Start => START_FRAGMENT,
            Page::Home => "#/home",
            Page::Jobs => "#/jobs",
            Page::Profiles => "#/profiles",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Start => "Start",
            Page::Home => "Home",
            Page::Jobs => "Jobs",
            Page::Profiles => "Profiles",
        };
        f.write_str(name)
    }
}

/// How much the user has configured, used to pick the landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    pub jobs: usize,
    pub profiles: usize,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.jobs == 0 && self.profiles == 0
    }

    /// Resolve the transient `Start` page.
    pub fn landing_page(&self) -> Page {
        if self.is_empty() { Page::Home } else { Page::Jobs }
    }
}

/// Current page plus the fragment that addresses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    page: Page,
    fragment: String,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            page: Page::Start,
            fragment: START_FRAGMENT.to_string(),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Handle an external navigation event carrying `fragment`.
    pub fn navigate(&mut self, fragment: Option<&str>, inventory: Inventory) -> Page {
        self.switch_to(Page::from_fragment(fragment), inventory)
    }

    /// Programmatically show `page`, writing back its fragment.
    pub fn switch_to(&mut self, page: Page, inventory: Inventory) -> Page {
        let resolved = match page {
            Page::Start => inventory.landing_page(),
            other => other,
        };

        self.page = resolved;
        self.fragment = resolved.fragment().to_string();
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: Inventory = Inventory { jobs: 0, profiles: 0 };
    const ONE_JOB: Inventory = Inventory { jobs: 1, profiles: 0 };
    const ONE_PROFILE: Inventory = Inventory { jobs: 0, profiles: 1 };

    #[test]
    fn known_fragments_map_to_pages() {
        assert_eq!(Page::from_fragment(Some("#/home")), Page::Home);
        assert_eq!(Page::from_fragment(Some("#/jobs")), Page::Jobs);
        assert_eq!(Page::from_fragment(Some("#/profiles")), Page::Profiles);
        assert_eq!(Page::from_fragment(Some("#/JOBS")), Page::Start);
        assert_eq!(Page::from_fragment(None), Page::Start);
    }

    #[test]
    fn start_lands_on_home_when_nothing_configured() {
        let mut nav = Navigator::new();
        assert_eq!(nav.switch_to(Page::Start, EMPTY), Page::Home);
        assert_eq!(nav.fragment(), "#/home");
    }

    #[test]
    fn start_lands_on_jobs_when_anything_configured() {
        let mut nav = Navigator::new();
        assert_eq!(nav.switch_to(Page::Start, ONE_JOB), Page::Jobs);
        assert_eq!(nav.switch_to(Page::Start, ONE_PROFILE), Page::Jobs);
        assert_eq!(nav.fragment(), "#/jobs");
    }

    #[test]
    fn bogus_fragment_resolves_like_absent_fragment() {
        for inventory in [EMPTY, ONE_JOB] {
            let mut bogus = Navigator::new();
            let mut absent = Navigator::new();
            assert_eq!(
                bogus.navigate(Some("#/bogus"), inventory),
                absent.navigate(None, inventory)
            );
            assert_eq!(bogus, absent);
        }
    }

    #[test]
    fn programmatic_switch_writes_fragment() {
        let mut nav = Navigator::new();
        nav.switch_to(Page::Profiles, EMPTY);
        assert_eq!(nav.page(), Page::Profiles);
        assert_eq!(nav.fragment(), "#/profiles");

        // Explicit pages ignore the inventory.
        nav.navigate(Some("#/home"), ONE_JOB);
        assert_eq!(nav.page(), Page::Home);
        assert_eq!(nav.fragment(), "#/home");
    }

    #[test]
    fn never_rests_on_start() {
        let mut nav = Navigator::new();
        assert_eq!(nav.page(), Page::Start);
        nav.navigate(Some("#/start"), EMPTY);
        assert_ne!(nav.page(), Page::Start);
    }
}
