//! Presentation helpers for the "discover" section under the composer.
//!
//! The feed itself is fetched elsewhere; the landing page only needs the
//! readiness rule and the routes it links to.

use serde::Deserialize;
use serde::Serialize;

pub const DISCOVER_ROUTE: &str = "/discover";
pub const DASHBOARD_ROUTE: &str = "/apps";

/// The section is hidden until strictly more than this many apps are loaded.
pub const DISCOVER_MIN_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_count: u64,
}

/// Parameters the landing page uses when asking for the public feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub visibility: FeedVisibility,
    pub sort: FeedSort,
    pub period: FeedPeriod,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedVisibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    Popular,
    Recent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPeriod {
    Day,
    Week,
    Month,
    All,
}

impl FeedQuery {
    pub const LANDING: FeedQuery = FeedQuery {
        visibility: FeedVisibility::Public,
        sort: FeedSort::Popular,
        period: FeedPeriod::Week,
        limit: 6,
    };
}

/// Snapshot of the opaque feed data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryFeed {
    pub items: Vec<AppSummary>,
    pub loading: bool,
}

impl DiscoveryFeed {
    pub fn is_ready(&self) -> bool {
        !self.loading && self.items.len() > DISCOVER_MIN_ITEMS
    }
}

pub fn app_route(id: &str) -> String {
    format!("/app/{id}")
}
