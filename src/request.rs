//! Intercepted requests, response snapshots, and the routing policy that
//! picks a fetch strategy for each request.

use bytes::Bytes;
use url::{Position, Url};

/// How the page issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level or frame navigation.
    Navigate,
    /// Same-origin subresource.
    SameOrigin,
    /// Opaque cross-origin subresource.
    NoCors,
    /// CORS request.
    #[default]
    Cors,
}

/// What the requested resource will be used as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Destination {
    Document,
    Style,
    Script,
    Image,
    Font,
    Manifest,
    /// `fetch()`/XHR calls with no particular destination.
    #[default]
    Empty,
    Other(String),
}

impl Destination {
    /// Parses a destination keyword such as `"style"`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "document" => Self::Document,
            "style" => Self::Style,
            "script" => Self::Script,
            "image" => Self::Image,
            "font" => Self::Font,
            "manifest" => Self::Manifest,
            "" => Self::Empty,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A request intercepted from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub mode: RequestMode,
    pub destination: Destination,
}

impl FetchRequest {
    /// Creates a plain `GET` request with no headers.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            headers: Vec::new(),
            mode: RequestMode::default(),
            destination: Destination::default(),
        }
    }

    /// Creates a navigation request as a browser would issue it for a page load.
    #[must_use]
    pub fn navigate(url: Url) -> Self {
        Self::get(url)
            .with_mode(RequestMode::Navigate)
            .with_destination(Destination::Document)
            .with_header("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Returns the first header value with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The identity this request is stored under in a cache bucket.
    #[must_use]
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

/// Cache identity of a request: method plus URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    #[must_use]
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: method.to_ascii_uppercase(),
            url: url.into(),
        }
    }
}

/// Snapshot of a response. The body is reference counted, so cloning to both
/// store and return a response does not copy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Routing class of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Page navigations and anything asking for HTML.
    Navigation,
    /// CSS.
    Stylesheet,
    /// Scripts, images, fonts, API calls.
    Other,
}

/// Classifies a request. Rules are evaluated in order; the first match wins.
#[must_use]
pub fn classify(request: &FetchRequest) -> RequestClass {
    if request.mode == RequestMode::Navigate
        || request
            .header("accept")
            .is_some_and(|accept| accept.contains("text/html"))
    {
        return RequestClass::Navigation;
    }
    if request.destination == Destination::Style
        || request.url[..Position::AfterQuery].ends_with(".css")
    {
        return RequestClass::Stylesheet;
    }
    RequestClass::Other
}

/// Fetch/cache strategy applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Fetch from the network, storing a copy; fall back to the bucket offline.
    NetworkFirst,
    /// Serve from the bucket; on a miss fetch from the network and store a copy.
    CacheFirst,
}

impl Strategy {
    /// Pages and stylesheets go to the network first; everything else is
    /// served from the bucket when present.
    #[must_use]
    pub const fn for_class(class: RequestClass) -> Self {
        match class {
            RequestClass::Navigation | RequestClass::Stylesheet => Self::NetworkFirst,
            RequestClass::Other => Self::CacheFirst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn navigate_mode_is_navigation() {
        let req =
            FetchRequest::get(url("https://fit.example/workouts")).with_mode(RequestMode::Navigate);
        assert_eq!(classify(&req), RequestClass::Navigation);
    }

    #[test]
    fn accept_html_is_navigation() {
        let req = FetchRequest::get(url("https://fit.example/partial"))
            .with_header("ACCEPT", "text/html;q=0.9");
        assert_eq!(classify(&req), RequestClass::Navigation);
    }

    #[test]
    fn navigation_takes_priority_over_stylesheet() {
        let req = FetchRequest::get(url("https://fit.example/css/dashboard.css"))
            .with_header("Accept", "text/html");
        assert_eq!(classify(&req), RequestClass::Navigation);
    }

    #[test]
    fn style_destination_is_stylesheet() {
        let req = FetchRequest::get(url("https://fit.example/theme"))
            .with_destination(Destination::Style);
        assert_eq!(classify(&req), RequestClass::Stylesheet);
    }

    #[test]
    fn css_suffix_is_stylesheet() {
        let req = FetchRequest::get(url("https://fit.example/css/stats-weekly.css"));
        assert_eq!(classify(&req), RequestClass::Stylesheet);
    }

    #[test]
    fn css_suffix_applies_to_whole_url() {
        let query_css = FetchRequest::get(url("http://localhost:8080/page?file=x.css"));
        assert_eq!(classify(&query_css), RequestClass::Stylesheet);

        let versioned = FetchRequest::get(url("http://localhost:8080/css/a.css?v=2"));
        assert_eq!(classify(&versioned), RequestClass::Other);

        let fragment = FetchRequest::get(url("http://localhost:8080/css/a.css#top"));
        assert_eq!(classify(&fragment), RequestClass::Stylesheet);
    }

    #[test]
    fn everything_else_is_other() {
        for path in ["/js/app.js", "/icons/icon-192x192.png", "/api/schedule", "/manifest.json"] {
            let req = FetchRequest::get(url("https://fit.example").join(path).unwrap())
                .with_header("Accept", "*/*");
            assert_eq!(classify(&req), RequestClass::Other, "{path}");
        }
    }

    #[test]
    fn strategy_per_class() {
        assert_eq!(Strategy::for_class(RequestClass::Navigation), Strategy::NetworkFirst);
        assert_eq!(Strategy::for_class(RequestClass::Stylesheet), Strategy::NetworkFirst);
        assert_eq!(Strategy::for_class(RequestClass::Other), Strategy::CacheFirst);
    }

    #[test]
    fn key_ignores_fragment_and_normalizes_method() {
        let a = FetchRequest::get(url("https://fit.example/stats#weekly")).with_method("get");
        let b = FetchRequest::get(url("https://fit.example/stats"));
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().url, "https://fit.example/stats");
    }

    #[test]
    fn key_keeps_query() {
        let a = FetchRequest::get(url("https://fit.example/api/stats?week=1"));
        let b = FetchRequest::get(url("https://fit.example/api/stats?week=2"));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn destination_parse() {
        assert_eq!(Destination::parse("style"), Destination::Style);
        assert_eq!(Destination::parse(""), Destination::Empty);
        assert_eq!(Destination::parse("video"), Destination::Other("video".to_string()));
    }

    #[test]
    fn response_status_and_headers() {
        let resp = Response::new(204, "").with_header("Content-Type", "text/css");
        assert!(resp.is_ok());
        assert_eq!(resp.header("content-type"), Some("text/css"));
        assert!(!Response::new(404, "missing").is_ok());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn navigate_mode_always_wins(segment in "[a-z0-9]{1,12}", css in any::<bool>()) {
                let suffix = if css { ".css" } else { "" };
                let target = format!("https://fit.example/{segment}{suffix}");
                let req = FetchRequest::get(url(&target))
                    .with_mode(RequestMode::Navigate)
                    .with_destination(Destination::Style);
                prop_assert_eq!(classify(&req), RequestClass::Navigation);
            }

            #[test]
            fn css_urls_are_stylesheets(segment in "[a-z0-9-]{1,12}", query in "[a-z0-9=]{0,8}") {
                let plain = format!("https://fit.example/css/{segment}.css");
                let req = FetchRequest::get(url(&plain))
                    .with_header("Accept", "text/css,*/*;q=0.1");
                prop_assert_eq!(classify(&req), RequestClass::Stylesheet);

                let queried = format!("https://fit.example/{segment}?{query}.css");
                let req = FetchRequest::get(url(&queried));
                prop_assert_eq!(classify(&req), RequestClass::Stylesheet);
            }
        }
    }
}
