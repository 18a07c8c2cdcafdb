//! Page navigation with a single "previous page" slot and a fixed back table.
//!
//! `back` does not walk a history stack. The matching pages have hardcoded
//! targets in `BACK_TARGETS`; every other page returns to the one page most
//! recently left.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::models::SearchMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Home,
    Login,
    MatchCv,
    JobMatching,
    JobMatches,
    JobDetail,
    JobList,
    StatisticsPage,
    CvList,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::Home,
        Page::Login,
        Page::MatchCv,
        Page::JobMatching,
        Page::JobMatches,
        Page::JobDetail,
        Page::JobList,
        Page::StatisticsPage,
        Page::CvList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Login => "login",
            Page::MatchCv => "matchcv",
            Page::JobMatching => "jobmatching",
            Page::JobMatches => "jobmatches",
            Page::JobDetail => "jobdetail",
            Page::JobList => "joblist",
            Page::StatisticsPage => "statisticspage",
            Page::CvList => "cvlist",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown page '{0}'")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// Fixed back targets. Pages not listed fall back to the previous-page slot.
const BACK_TARGETS: &[(Page, Page)] = &[
    (Page::MatchCv, Page::Home),
    (Page::JobMatching, Page::MatchCv),
    (Page::JobMatches, Page::MatchCv),
];

/// Optional data sent along with a navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPayload {
    #[serde(default)]
    pub search_type: Option<SearchMode>,
    #[serde(default)]
    pub cv_id: Option<String>,
    #[serde(default)]
    pub cv_name: Option<String>,
}

/// Values carried across navigations until a later payload overwrites them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarriedState {
    pub search_type: SearchMode,
    pub cv_id: String,
    pub cv_name: String,
}

impl Default for CarriedState {
    fn default() -> Self {
        Self {
            search_type: SearchMode::JobsToCv,
            cv_id: String::new(),
            cv_name: String::new(),
        }
    }
}

impl CarriedState {
    /// Shallow, additive merge. Each field is replaced only when the payload
    /// carries a non-empty value for it; everything else persists.
    pub fn merge(&mut self, payload: &NavPayload) {
        if let Some(mode) = payload.search_type {
            self.search_type = mode;
        }
        if let Some(id) = payload.cv_id.as_deref().filter(|v| !v.is_empty()) {
            self.cv_id = id.to_string();
        }
        if let Some(name) = payload.cv_name.as_deref().filter(|v| !v.is_empty()) {
            self.cv_name = name.to_string();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationStateMachine {
    current: Page,
    previous: Page,
    carried: CarriedState,
}

impl NavigationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn previous(&self) -> Page {
        self.previous
    }

    pub fn carried(&self) -> &CarriedState {
        &self.carried
    }

    pub fn navigate(&mut self, page: Page, payload: &NavPayload) {
        self.previous = self.current;
        self.current = page;
        self.carried.merge(payload);
    }

    /// Where `back` from `from` leads, without moving.
    pub fn back_target(&self, from: Page) -> Page {
        BACK_TARGETS
            .iter()
            .find(|(page, _)| *page == from)
            .map(|(_, target)| *target)
            .unwrap_or(self.previous)
    }

    /// Leaves `from`. The previous-page slot is left untouched.
    pub fn back(&mut self, from: Page) -> Page {
        self.current = self.back_target(from);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn go(nav: &mut NavigationStateMachine, page: Page) {
        nav.navigate(page, &NavPayload::default());
    }

    #[test]
    fn test_page_names_round_trip() {
        for page in Page::ALL {
            assert_eq!(page.as_str().parse::<Page>().unwrap(), page);
            assert_eq!(
                serde_json::to_string(&page).unwrap(),
                format!("\"{}\"", page.as_str())
            );
        }
        assert!("settings".parse::<Page>().is_err());
    }

    #[test]
    fn test_fixed_back_targets_ignore_history() {
        let mut nav = NavigationStateMachine::new();
        go(&mut nav, Page::JobList);
        go(&mut nav, Page::StatisticsPage);
        go(&mut nav, Page::MatchCv);
        assert_eq!(nav.back(Page::MatchCv), Page::Home);

        go(&mut nav, Page::CvList);
        go(&mut nav, Page::JobMatching);
        assert_eq!(nav.back(Page::JobMatching), Page::MatchCv);

        go(&mut nav, Page::Login);
        go(&mut nav, Page::JobMatches);
        assert_eq!(nav.back(Page::JobMatches), Page::MatchCv);
    }

    #[test]
    fn test_other_pages_use_single_previous_slot() {
        let mut nav = NavigationStateMachine::new();
        go(&mut nav, Page::JobList);
        go(&mut nav, Page::JobDetail);
        go(&mut nav, Page::StatisticsPage);

        assert_eq!(nav.back(Page::StatisticsPage), Page::JobDetail);
        // The slot was not popped: a second back lands on the same page.
        assert_eq!(nav.back(Page::JobDetail), Page::JobDetail);
        assert_eq!(nav.current(), Page::JobDetail);
    }

    #[test]
    fn test_initial_back_goes_home() {
        let mut nav = NavigationStateMachine::new();
        go(&mut nav, Page::Login);
        assert_eq!(nav.back(Page::Login), Page::Home);
    }

    #[test]
    fn test_payload_merge_is_additive() {
        let mut nav = NavigationStateMachine::new();
        nav.navigate(
            Page::JobMatches,
            &NavPayload {
                search_type: Some(SearchMode::CvToJobs),
                cv_id: Some("cv-1".into()),
                cv_name: Some("Ana.pdf".into()),
            },
        );
        nav.navigate(
            Page::JobDetail,
            &NavPayload {
                cv_id: Some("cv-2".into()),
                ..Default::default()
            },
        );

        let carried = nav.carried();
        assert_eq!(carried.cv_id, "cv-2");
        assert_eq!(carried.cv_name, "Ana.pdf");
        assert_eq!(carried.search_type, SearchMode::CvToJobs);
    }

    #[test]
    fn test_empty_strings_do_not_overwrite() {
        let mut carried = CarriedState::default();
        carried.merge(&NavPayload {
            cv_name: Some("Your CV".into()),
            ..Default::default()
        });
        carried.merge(&NavPayload {
            cv_name: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(carried.cv_name, "Your CV");
        assert_eq!(carried.search_type, SearchMode::JobsToCv);
    }
}
