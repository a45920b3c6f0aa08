//! Following the redirect service to a documentation page.
//!
//! The search service answers with small HTML pages which redirect using
//! `<meta http-equiv="refresh" content="0;url=...">`.  Each hop fetches a
//! page, finds the refresh tag in the expected place and follows it.

use std::fmt;
use std::time::Duration;

use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use ureq::http::Uri;
use ureq::{Agent, ResponseExt};

use crate::markup::{parse_html, select_path};
use crate::{Error, Result};

/// The redirect service used unless another is given.
pub const DEFAULT_SERVICE: &str = "https://mdn.io";

/// Default timeout for each request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters escaped when the search terms become a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Scheme and authority of a URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    authority: String,
}

impl Origin {
    /// Create an origin from its parts, e.g. `("https", "mdn.io")`.
    pub fn new(scheme: &str, authority: &str) -> Origin {
        Origin {
            scheme: scheme.trim_end_matches(':').to_string(),
            authority: authority.to_string(),
        }
    }

    /// The origin of an absolute URI.
    pub fn from_uri(uri: &Uri) -> Option<Origin> {
        Some(Origin::new(uri.scheme_str()?, uri.authority()?.as_str()))
    }

    /// Resolve `target` against this origin.  Absolute URLs are returned
    /// unchanged; anything else is treated as a path on this origin.
    pub fn join(&self, target: &str) -> String {
        if target.contains("://") {
            target.to_string()
        } else if let Some(rest) = target.strip_prefix("//") {
            format!("{}://{}", self.scheme, rest)
        } else if target.starts_with('/') {
            format!("{}{}", self, target)
        } else {
            format!("{}/{}", self, target)
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// A fetched page.
#[derive(Clone, Debug)]
pub struct Page {
    /// The URL that was requested.
    pub url: String,
    /// Origin of the response, after any transport-level redirects.
    pub origin: Origin,
    /// The response body.
    pub body: String,
}

/// Something which can fetch pages.
pub trait Fetch {
    /// GET `url`, failing on a non-success status.
    fn fetch(&self, url: &str) -> Result<Page>;
}

/// Fetches pages over HTTP.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> HttpFetcher {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        HttpFetcher { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> HttpFetcher {
        HttpFetcher::new(DEFAULT_TIMEOUT)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Page> {
        debug!("GET {}", url);
        let http_error = |source| Error::Http {
            url: url.to_string(),
            source,
        };

        let response = self.agent.get(url).call().map_err(http_error)?;
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(Error::Fetch {
                url: url.to_string(),
                status,
            });
        }
        let origin = Origin::from_uri(response.get_uri()).ok_or_else(|| Error::UnexpectedPage {
            url: url.to_string(),
            expected: "an absolute response URL",
        })?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(http_error)?;

        Ok(Page {
            url: url.to_string(),
            origin,
            body,
        })
    }
}

/// Where the refresh tag lives on a redirect page.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefreshHop {
    /// `html > head > meta[http-equiv=refresh]`
    Head,
    /// `html > body > noscript > meta[http-equiv=refresh]`
    BodyNoscript,
}

impl RefreshHop {
    fn path(self) -> &'static [&'static str] {
        match self {
            RefreshHop::Head => &["html", "head", "meta"],
            RefreshHop::BodyNoscript => &["html", "body", "noscript", "meta"],
        }
    }

    fn describe(self) -> &'static str {
        match self {
            RefreshHop::Head => "a refresh meta tag in the head",
            RefreshHop::BodyNoscript => "a refresh meta tag in body > noscript",
        }
    }
}

/// Return the target of a refresh `content` value such as `0;url=/path`.
/// The `url=` marker is matched without regard to case.
pub fn refresh_content_target(content: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets, so the index applies to both.
    let at = content.to_ascii_lowercase().find("url=")?;
    let target = content[at + "url=".len()..]
        .trim()
        .trim_matches(|c| c == '\'' || c == '"');
    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

/// Find the URL a redirect page points at, resolved against the page's
/// origin.
pub fn refresh_target(page: &Page, hop: RefreshHop) -> Result<String> {
    let markup = parse_html(page.body.as_bytes())?;
    let content = select_path(&markup.document, hop.path())
        .into_iter()
        .find(|meta| {
            meta.attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("refresh"))
        })
        .and_then(|meta| meta.attr("content"));

    let target = content
        .as_deref()
        .and_then(refresh_content_target)
        .ok_or_else(|| Error::UnexpectedPage {
            url: page.url.clone(),
            expected: hop.describe(),
        })?;
    Ok(page.origin.join(target))
}

/// Resolves search terms to a documentation page.
pub struct Resolver<F: Fetch> {
    fetcher: F,
    service: String,
    hops: Vec<RefreshHop>,
}

impl<F: Fetch> Resolver<F> {
    /// A resolver using `fetcher`, the default service and the two hops
    /// it needs.
    pub fn new(fetcher: F) -> Resolver<F> {
        Resolver {
            fetcher,
            service: DEFAULT_SERVICE.to_string(),
            hops: vec![RefreshHop::Head, RefreshHop::BodyNoscript],
        }
    }

    /// Use another redirect service.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Replace the list of refresh hops to follow.  With no hops the
    /// search URL itself is the page.
    pub fn hops(mut self, hops: Vec<RefreshHop>) -> Self {
        self.hops = hops;
        self
    }

    /// The URL for a search.
    pub fn search_url(&self, terms: &str) -> String {
        format!(
            "{}/{}",
            self.service.trim_end_matches('/'),
            utf8_percent_encode(terms, PATH_SEGMENT)
        )
    }

    /// Fetch the search URL and follow each hop in turn, returning the
    /// final page.
    pub fn resolve(&self, terms: &str) -> Result<Page> {
        let mut page = self.fetcher.fetch(&self.search_url(terms))?;
        for &hop in &self.hops {
            let next = refresh_target(&page, hop)?;
            debug!("{:?} refresh: {} -> {}", hop, page.url, next);
            page = self.fetcher.fetch(&next)?;
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Serves canned pages in order and records what was requested.
    struct Canned {
        pages: RefCell<Vec<(Origin, String)>>,
        requested: RefCell<Vec<String>>,
    }

    impl Canned {
        fn new(pages: Vec<(Origin, &str)>) -> Canned {
            let mut pages: Vec<_> = pages.into_iter().map(|(o, b)| (o, b.to_string())).collect();
            pages.reverse();
            Canned {
                pages: RefCell::new(pages),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetch for &Canned {
        fn fetch(&self, url: &str) -> Result<Page> {
            self.requested.borrow_mut().push(url.to_string());
            match self.pages.borrow_mut().pop() {
                Some((origin, body)) => Ok(Page {
                    url: url.to_string(),
                    origin,
                    body,
                }),
                None => Err(Error::Fetch {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    const HEAD_REFRESH: &str = r#"<html><head><meta http-equiv="refresh" content="0;url=/path"></head><body></body></html>"#;
    const NOSCRIPT_REFRESH: &str = r#"<html><head></head><body><noscript><META http-equiv="refresh" content="0;URL=https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Array"></noscript></body></html>"#;

    #[test]
    fn test_relative_refresh_uses_response_origin() {
        let page = Page {
            url: "https://mdn.io/array".into(),
            origin: Origin::new("https:", "mdn.io"),
            body: HEAD_REFRESH.into(),
        };
        assert_eq!(
            refresh_target(&page, RefreshHop::Head).unwrap(),
            "https://mdn.io/path"
        );
    }

    #[test]
    fn test_full_chain() {
        let origin = Origin::new("https", "mdn.io");
        let canned = Canned::new(vec![
            (origin.clone(), HEAD_REFRESH),
            (Origin::new("https", "duckduckgo.com"), NOSCRIPT_REFRESH),
            (
                Origin::new("https", "developer.mozilla.org"),
                "<article><p>Array</p></article>",
            ),
        ]);
        let page = Resolver::new(&canned).resolve("array map").unwrap();
        assert_eq!(page.body, "<article><p>Array</p></article>");
        assert_eq!(
            *canned.requested.borrow(),
            vec![
                "https://mdn.io/array%20map".to_string(),
                "https://mdn.io/path".to_string(),
                "https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Array"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_refresh_is_an_error() {
        let canned = Canned::new(vec![(Origin::new("https", "mdn.io"), "<p>nothing</p>")]);
        match Resolver::new(&canned).resolve("x") {
            Err(Error::UnexpectedPage { url, .. }) => assert_eq!(url, "https://mdn.io/x"),
            other => panic!("unexpected result: {:?}", other.map(|p| p.url)),
        }
    }

    #[test]
    fn test_refresh_in_wrong_place_is_an_error() {
        let page = Page {
            url: "https://mdn.io/x".into(),
            origin: Origin::new("https", "mdn.io"),
            body: HEAD_REFRESH.into(),
        };
        assert!(matches!(
            refresh_target(&page, RefreshHop::BodyNoscript),
            Err(Error::UnexpectedPage { .. })
        ));
    }

    #[test]
    fn test_no_hops_fetches_once() {
        let canned = Canned::new(vec![(Origin::new("https", "mdn.io"), "<article></article>")]);
        let resolver = Resolver::new(&canned).service("https://mdn.io/").hops(vec![]);
        resolver.resolve("a/b").unwrap();
        assert_eq!(*canned.requested.borrow(), vec!["https://mdn.io/a%2Fb".to_string()]);
    }

    #[test]
    fn test_refresh_content_target() {
        assert_eq!(refresh_content_target("0;url=/path"), Some("/path"));
        assert_eq!(refresh_content_target("0; URL='https://x.test/a'"), Some("https://x.test/a"));
        assert_eq!(refresh_content_target("5"), None);
        assert_eq!(refresh_content_target("0;url="), None);
    }

    #[test]
    fn test_origin_join() {
        let origin = Origin::new("https:", "mdn.io");
        assert_eq!(origin.to_string(), "https://mdn.io");
        assert_eq!(origin.join("/a"), "https://mdn.io/a");
        assert_eq!(origin.join("a"), "https://mdn.io/a");
        assert_eq!(origin.join("//cdn.test/a"), "https://cdn.test/a");
        assert_eq!(origin.join("http://other.test/"), "http://other.test/");
    }

    #[test]
    fn test_origin_from_uri() {
        let uri: Uri = "https://developer.mozilla.org/en-US/".parse().unwrap();
        assert_eq!(
            Origin::from_uri(&uri),
            Some(Origin::new("https", "developer.mozilla.org"))
        );
        let relative: Uri = "/en-US/".parse().unwrap();
        assert_eq!(Origin::from_uri(&relative), None);
    }
}
