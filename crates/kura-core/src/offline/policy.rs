use super::request::{Method, Request};

/// URL fragments marking calls to the generative-AI and search services.
pub const DEFAULT_EXCLUSIONS: [&str; 2] = ["googleapis", "googleSearch"];

/// Requests the worker must never intercept: anything but GET, and any URL
/// containing one of the configured fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    patterns: Vec<String>,
}

impl ExclusionRule {
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn excludes(&self, request: &Request) -> bool {
        request.method != Method::GET || self.patterns.iter().any(|p| request.url.contains(p.as_str()))
    }
}

impl Default for ExclusionRule {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_get_is_excluded() {
        let rule = ExclusionRule::default();
        assert!(rule.excludes(&Request::post("/index.html")));
        assert!(rule.excludes(&Request::new(Method::PUT, "/")));
        assert!(!rule.excludes(&Request::get("/index.html")));
    }

    #[test]
    fn test_ai_endpoints_are_excluded() {
        let rule = ExclusionRule::default();
        assert!(rule.excludes(&Request::get(
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        )));
        assert!(rule.excludes(&Request::get("https://example.org/?tool=googleSearch")));
        assert!(!rule.excludes(&Request::get("https://cdn.tailwindcss.com")));
    }
}
