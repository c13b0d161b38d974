//! Static table of the timelines the client can show.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewSelector {
    #[default]
    Home,
    Explore,
    Recommended,
    MastoRadar,
    Live,
}

impl ViewSelector {
    /// Where a fresh login lands.
    pub const fn default_authenticated() -> Self {
        ViewSelector::Home
    }

    /// Where logout lands.
    pub const fn default_anonymous() -> Self {
        ViewSelector::Explore
    }

    pub fn all() -> &'static [ViewSelector] {
        &[
            ViewSelector::Home,
            ViewSelector::Explore,
            ViewSelector::Recommended,
            ViewSelector::MastoRadar,
            ViewSelector::Live,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewSelector::Home => "home",
            ViewSelector::Explore => "explore",
            ViewSelector::Recommended => "recommended",
            ViewSelector::MastoRadar => "mastoradar",
            ViewSelector::Live => "live",
        }
    }
}

impl fmt::Display for ViewSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewSelector {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" | "following" => Ok(ViewSelector::Home),
            "explore" | "public" => Ok(ViewSelector::Explore),
            "recommended" => Ok(ViewSelector::Recommended),
            "mastoradar" | "recommended-ultra" | "ultra" => Ok(ViewSelector::MastoRadar),
            "live" | "local" => Ok(ViewSelector::Live),
            other => Err(ConfigurationError::UnknownName(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineDescriptor {
    pub view: ViewSelector,
    pub label: &'static str,
    pub endpoint: &'static str,
    /// Fetching is skipped unless the session is authenticated.
    pub requires_login: bool,
    /// The stored credential is sent as a bearer header.
    pub attach_credential: bool,
    pub route_path: &'static str,
}

/// A view or route with no catalog entry. Always a programming error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    Unregistered(ViewSelector),
    UnknownName(String),
    UnknownRoute(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::Unregistered(view) => {
                write!(f, "no timeline registered for view '{view}'")
            }
            ConfigurationError::UnknownName(name) => write!(
                f,
                "unknown view '{name}' (expected one of: home, explore, recommended, mastoradar, live)"
            ),
            ConfigurationError::UnknownRoute(route) => write!(f, "no timeline at route '{route}'"),
        }
    }
}

impl std::error::Error for ConfigurationError {}

const TIMELINES: &[TimelineDescriptor] = &[
    TimelineDescriptor {
        view: ViewSelector::Home,
        label: "Home",
        endpoint: "/getHomeTimeline",
        requires_login: true,
        attach_credential: true,
        route_path: "/",
    },
    TimelineDescriptor {
        view: ViewSelector::Explore,
        label: "Explore",
        endpoint: "/getExploreTimeline",
        requires_login: false,
        attach_credential: false,
        route_path: "/explore",
    },
    TimelineDescriptor {
        view: ViewSelector::Recommended,
        label: "Recommended",
        endpoint: "/getRecommendedTimeline",
        requires_login: true,
        attach_credential: true,
        route_path: "/recommended",
    },
    TimelineDescriptor {
        view: ViewSelector::MastoRadar,
        label: "MastoRadar",
        endpoint: "/getRecommendedUltraTimeline",
        requires_login: true,
        attach_credential: true,
        route_path: "/mastoradar",
    },
    TimelineDescriptor {
        view: ViewSelector::Live,
        label: "Live",
        endpoint: "/getLocalTimeline",
        requires_login: false,
        attach_credential: false,
        route_path: "/live",
    },
];

#[derive(Debug, Clone)]
pub struct TimelineCatalog {
    entries: &'static [TimelineDescriptor],
}

impl TimelineCatalog {
    pub const fn new() -> Self {
        Self { entries: TIMELINES }
    }

    #[cfg(test)]
    pub const fn with_entries(entries: &'static [TimelineDescriptor]) -> Self {
        Self { entries }
    }

    pub fn descriptor(&self, view: ViewSelector) -> Result<&'static TimelineDescriptor, ConfigurationError> {
        self.entries
            .iter()
            .find(|d| d.view == view)
            .ok_or(ConfigurationError::Unregistered(view))
    }

    pub fn find_by_route(&self, route: &str) -> Result<&'static TimelineDescriptor, ConfigurationError> {
        let route = route.split('?').next().unwrap_or(route);
        self.entries
            .iter()
            .find(|d| d.route_path == route)
            .ok_or_else(|| ConfigurationError::UnknownRoute(route.to_string()))
    }

    /// Accepts either a view name or a route path.
    pub fn resolve(&self, name_or_route: &str) -> Result<ViewSelector, ConfigurationError> {
        if name_or_route.starts_with('/') {
            self.find_by_route(name_or_route).map(|d| d.view)
        } else {
            name_or_route.parse()
        }
    }

    /// Label for tab bars; falls back to the selector name for unregistered views.
    pub fn label(&self, view: ViewSelector) -> &'static str {
        self.descriptor(view).map(|d| d.label).unwrap_or(view.name())
    }
}

impl Default for TimelineCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_view_is_registered() {
        let catalog = TimelineCatalog::new();
        for view in ViewSelector::all() {
            let descriptor = catalog.descriptor(*view).unwrap();
            assert_eq!(descriptor.view, *view);
        }
    }

    #[test]
    fn test_gating_flags() {
        let catalog = TimelineCatalog::new();
        assert!(catalog.descriptor(ViewSelector::Home).unwrap().requires_login);
        assert!(catalog.descriptor(ViewSelector::Recommended).unwrap().requires_login);
        assert!(catalog.descriptor(ViewSelector::MastoRadar).unwrap().requires_login);
        assert!(!catalog.descriptor(ViewSelector::Explore).unwrap().requires_login);
        assert!(!catalog.descriptor(ViewSelector::Live).unwrap().requires_login);
    }

    #[test]
    fn test_endpoints() {
        let catalog = TimelineCatalog::new();
        assert_eq!(
            catalog.descriptor(ViewSelector::MastoRadar).unwrap().endpoint,
            "/getRecommendedUltraTimeline"
        );
        assert_eq!(
            catalog.descriptor(ViewSelector::Live).unwrap().endpoint,
            "/getLocalTimeline"
        );
    }

    #[test]
    fn test_unregistered_view_is_configuration_error() {
        static ONLY_LIVE: &[TimelineDescriptor] = &[TimelineDescriptor {
            view: ViewSelector::Live,
            label: "Live",
            endpoint: "/getLocalTimeline",
            requires_login: false,
            attach_credential: false,
            route_path: "/live",
        }];
        let catalog = TimelineCatalog::with_entries(ONLY_LIVE);
        assert_eq!(
            catalog.descriptor(ViewSelector::Home),
            Err(ConfigurationError::Unregistered(ViewSelector::Home))
        );
        assert_eq!(catalog.label(ViewSelector::Home), "home");
    }

    #[test]
    fn test_find_by_route() {
        let catalog = TimelineCatalog::new();
        assert_eq!(catalog.find_by_route("/").unwrap().view, ViewSelector::Home);
        assert_eq!(
            catalog.find_by_route("/explore?x=1").unwrap().view,
            ViewSelector::Explore
        );
        assert!(matches!(
            catalog.find_by_route("/favorites"),
            Err(ConfigurationError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_parse_view_names() {
        assert_eq!("Live".parse::<ViewSelector>().unwrap(), ViewSelector::Live);
        assert_eq!(
            "recommended-ultra".parse::<ViewSelector>().unwrap(),
            ViewSelector::MastoRadar
        );
        assert!("settings".parse::<ViewSelector>().is_err());
    }

    #[test]
    fn test_resolve_name_or_route() {
        let catalog = TimelineCatalog::new();
        assert_eq!(catalog.resolve("live").unwrap(), ViewSelector::Live);
        assert_eq!(catalog.resolve("/mastoradar").unwrap(), ViewSelector::MastoRadar);
        assert_eq!(catalog.resolve("/").unwrap(), ViewSelector::Home);
        assert!(matches!(
            catalog.resolve("/nowhere"),
            Err(ConfigurationError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_routes_are_unique() {
        let mut routes: Vec<_> = TIMELINES.iter().map(|d| d.route_path).collect();
        routes.sort();
        routes.dedup();
        assert_eq!(routes.len(), TIMELINES.len());
    }
}
