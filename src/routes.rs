/// Pages reachable from the console sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Pipelines,
    Volumes,
    Buckets,
    Insights,
    AiAssistant,
    NotFound,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Pipelines => "Pipelines",
            Page::Volumes => "Volumes",
            Page::Buckets => "Buckets",
            Page::Insights => "Insights",
            Page::AiAssistant => "AI Assistant",
            Page::NotFound => "Not Found",
        }
    }

    /// Stack child name for the page.
    pub fn id(self) -> &'static str {
        match self {
            Page::Pipelines => "pipelines",
            Page::Volumes => "volumes",
            Page::Buckets => "buckets",
            Page::Insights => "insights",
            Page::AiAssistant => "ai-assistant",
            Page::NotFound => "not-found",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub page: Page,
    pub exact: bool,
}

pub const WILDCARD: &str = "*";
pub const HOME: &str = "/AI-Assistant";

pub const ROUTES: &[Route] = &[
    Route { path: "/pipelines", page: Page::Pipelines, exact: true },
    Route { path: "/volumes", page: Page::Volumes, exact: true },
    Route { path: "/buckets", page: Page::Buckets, exact: true },
    Route { path: "/insights", page: Page::Insights, exact: true },
    Route { path: "/AI-Assistant", page: Page::AiAssistant, exact: true },
    Route { path: WILDCARD, page: Page::NotFound, exact: false },
];

/// Routes shown in the sidebar, in table order.
pub fn navigable() -> impl Iterator<Item = &'static Route> {
    ROUTES.iter().filter(|r| r.path != WILDCARD)
}

/// First route whose path matches. Matching is case-sensitive and tolerates
/// one trailing slash.
pub fn resolve(path: &str) -> Page {
    let path = match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    };
    ROUTES
        .iter()
        .find(|r| r.path == WILDCARD || (r.exact && r.path == path))
        .map(|r| r.page)
        .unwrap_or(Page::NotFound)
}
