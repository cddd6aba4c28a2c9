//! Route table
//!
//! Patterns are matched in table order. `:name` captures one segment,
//! a trailing `*` captures the rest (including nothing).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Earn,
    Resources,
    MarketDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoPage {
    Buttons,
    Inputs,
    Checkboxes,
}

/// Which page a path renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Home,
    Premarket,
    UnderDevelopment { section: Section, slug: Option<String> },
    Demo { page: DemoPage },
    NotFound { path: String },
}

impl Route {
    /// Pages with live feeds behind them.
    pub fn has_feeds(&self) -> bool {
        matches!(self, Route::Home | Route::Premarket)
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Home,
    Premarket,
    MarketDetail,
    Section(Section),
    Demo(DemoPage),
}

const ROUTES: &[(&str, Target)] = &[
    ("/", Target::Home),
    ("/premarket", Target::Premarket),
    ("/premarket/:slug", Target::MarketDetail),
    ("/dashboard", Target::Section(Section::Dashboard)),
    ("/dashboard/*", Target::Section(Section::Dashboard)),
    ("/earn", Target::Section(Section::Earn)),
    ("/earn/*", Target::Section(Section::Earn)),
    ("/resources", Target::Section(Section::Resources)),
    ("/resources/*", Target::Section(Section::Resources)),
    ("/demo/buttons", Target::Demo(DemoPage::Buttons)),
    ("/demo/inputs", Target::Demo(DemoPage::Inputs)),
    ("/demo/checkboxes", Target::Demo(DemoPage::Checkboxes)),
];

/// Strip query, fragment and trailing slashes.
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match one pattern; returns the `:slug` capture if any.
fn match_pattern<'a>(pattern: &str, path: &[&'a str]) -> Option<Option<&'a str>> {
    let pattern = segments(pattern);
    let mut capture = None;
    for (i, seg) in pattern.iter().enumerate() {
        if *seg == "*" {
            return Some(capture);
        }
        let actual = path.get(i)?;
        if seg.starts_with(':') {
            capture = Some(*actual);
        } else if seg != actual {
            return None;
        }
    }
    (pattern.len() == path.len()).then_some(capture)
}

pub fn resolve(path: &str) -> Route {
    let normalized = normalize(path);
    let parts = segments(normalized);

    for (pattern, target) in ROUTES {
        let Some(capture) = match_pattern(pattern, &parts) else {
            continue;
        };
        return match target {
            Target::Home => Route::Home,
            Target::Premarket => Route::Premarket,
            Target::MarketDetail => Route::UnderDevelopment {
                section: Section::MarketDetail,
                slug: capture.map(str::to_string),
            },
            Target::Section(section) => Route::UnderDevelopment {
                section: *section,
                slug: None,
            },
            Target::Demo(page) => Route::Demo { page: *page },
        };
    }
    Route::NotFound {
        path: normalized.to_string(),
    }
}

/// Nav highlight: `/` only matches itself, everything else by prefix.
pub fn is_active(href: &str, pathname: &str) -> bool {
    if href == "/" {
        normalize(pathname) == "/"
    } else {
        pathname.starts_with(href)
    }
}
