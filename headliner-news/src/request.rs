//! Building the requests sent to the news provider.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use url::Url;

use crate::NewsError;

/// The number of articles requested per search.
const PAGE_SIZE: &str = "10";

/// The country top headlines are requested for.
const HEADLINES_COUNTRY: &str = "us";

/// The language topic searches are restricted to.
const TOPIC_LANGUAGE: &str = "en";

/// The name of the proxy query parameter that selects the endpoint.
const ENDPOINT_PARAM: &str = "endpoint";

/// What kind of search the user asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// The current top headlines.
    TopHeadlines,
    /// Articles matching a free text topic.
    Topic,
}

/// A validated request for news.
///
/// A topic is present exactly when the mode is [`SearchMode::Topic`], and it is
/// never empty or surrounded by whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    /// The kind of search.
    mode: SearchMode,
    /// The trimmed topic, for topic searches.
    topic: Option<String>,
}

impl SearchRequest {
    /// Build a request, checking that `topic` fits `mode`.
    ///
    /// # Errors
    /// [`NewsError::Validation`] if a topic search has no usable topic, or if a
    /// topic is given for top headlines.
    pub fn new(mode: SearchMode, topic: Option<&str>) -> Result<Self, NewsError> {
        match (mode, topic) {
            (SearchMode::TopHeadlines, None) => Ok(Self::top_headlines()),
            (SearchMode::TopHeadlines, Some(_)) => Err(NewsError::Validation(
                "Top headlines cannot be filtered by topic.".to_string(),
            )),
            (SearchMode::Topic, Some(topic)) => Self::topic(topic),
            (SearchMode::Topic, None) => Self::topic(""),
        }
    }

    /// A request for the current top headlines.
    pub fn top_headlines() -> Self {
        Self {
            mode: SearchMode::TopHeadlines,
            topic: None,
        }
    }

    /// A request for articles about `topic`.
    ///
    /// # Errors
    /// [`NewsError::Validation`] if `topic` is empty after trimming.
    pub fn topic(topic: &str) -> Result<Self, NewsError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(NewsError::Validation(
                "Please enter a topic to search for.".to_string(),
            ));
        }
        Ok(Self {
            mode: SearchMode::Topic,
            topic: Some(topic.to_string()),
        })
    }

    /// The kind of search.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// The trimmed topic, if this is a topic search.
    pub fn topic_text(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// The logical upstream request for this search.
    pub fn upstream_query(&self) -> UpstreamQuery {
        match (&self.mode, &self.topic) {
            (SearchMode::Topic, Some(topic)) => UpstreamQuery::new(
                Endpoint::Everything,
                vec![
                    ("q".to_string(), topic.clone()),
                    ("pageSize".to_string(), PAGE_SIZE.to_string()),
                    ("sortBy".to_string(), "publishedAt".to_string()),
                    ("language".to_string(), TOPIC_LANGUAGE.to_string()),
                ],
            ),
            _ => UpstreamQuery::new(
                Endpoint::TopHeadlines,
                vec![
                    ("country".to_string(), HEADLINES_COUNTRY.to_string()),
                    ("pageSize".to_string(), PAGE_SIZE.to_string()),
                ],
            ),
        }
    }
}

/// The provider endpoints Headliner is allowed to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/v2/top-headlines`
    TopHeadlines,
    /// `/v2/everything`
    Everything,
}

impl Endpoint {
    /// The path segment of this endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopHeadlines => "top-headlines",
            Self::Everything => "everything",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-headlines" => Ok(Self::TopHeadlines),
            "everything" => Ok(Self::Everything),
            other => Err(NewsError::UnknownEndpoint(other.to_string())),
        }
    }
}

/// A request to the provider, independent of how it is delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamQuery {
    /// Which endpoint to call.
    pub endpoint: Endpoint,
    /// The URL-encoded query parameters, in the order they will be sent.
    query: String,
}

impl UpstreamQuery {
    /// Create a query for `endpoint` with `params`, which are form encoded.
    pub fn new(endpoint: Endpoint, params: Vec<(String, String)>) -> Self {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&params)
            .finish();
        Self { endpoint, query }
    }

    /// Create a query for `endpoint` from already encoded `name=value`
    /// segments. The segments are sent exactly as given.
    pub fn from_encoded<I, S>(endpoint: Endpoint, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut query = String::new();
        for segment in segments {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(segment.as_ref());
        }
        Self { endpoint, query }
    }

    /// The encoded query string, without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// The names of the parameters, which unlike the values are safe to log.
    pub fn param_names(&self) -> Vec<String> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .map(|(name, _)| name.into_owned())
            .collect()
    }

    /// The provider URL for this query: `${base}/v2/${endpoint}?${params}`.
    ///
    /// # Errors
    /// [`NewsError::Unknown`] if `base` cannot have a path, like `mailto:` URLs.
    pub fn upstream_url(&self, base: &Url) -> Result<Url, NewsError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| NewsError::Unknown(anyhow!("{} cannot be used as a base URL", base)))?
            .pop_if_empty()
            .extend(&["v2", self.endpoint.as_str()]);
        if self.query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.query));
        }
        Ok(url)
    }

    /// The proxy URL for this query: `${proxy}?endpoint=${endpoint}&${params}`.
    pub fn proxy_url(&self, proxy: &Url) -> Url {
        let mut query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(ENDPOINT_PARAM, self.endpoint.as_str())
            .finish();
        if !self.query.is_empty() {
            query.push('&');
            query.push_str(&self.query);
        }
        let mut url = proxy.clone();
        url.set_query(Some(&query));
        url
    }
}

/// A request received by the proxy, split into the endpoint to call and the
/// parameters to pass along unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyQuery {
    /// The validated endpoint.
    pub endpoint: Endpoint,
    /// Every other `name=value` segment, still encoded, in the order received.
    pub passthrough: Vec<String>,
}

impl ProxyQuery {
    /// Parse a raw, URL-encoded query string.
    ///
    /// The first `endpoint` parameter selects the endpoint. `endpoint` is
    /// never passed through to the provider. Only parameter names are
    /// decoded; every other segment is kept byte for byte.
    ///
    /// # Errors
    /// [`NewsError::UnknownEndpoint`] if `endpoint` is missing or is not one of
    /// the allowed endpoints.
    pub fn from_query_string(query: &str) -> Result<Self, NewsError> {
        let mut endpoint = None;
        let mut passthrough = Vec::new();

        for segment in query.split('&').filter(|segment| !segment.is_empty()) {
            let (name, value) = match url::form_urlencoded::parse(segment.as_bytes()).next() {
                Some(pair) => pair,
                None => continue,
            };
            if name == ENDPOINT_PARAM {
                if endpoint.is_none() {
                    endpoint = Some(value.into_owned());
                }
            } else {
                passthrough.push(segment.to_string());
            }
        }

        let endpoint = endpoint.unwrap_or_default().parse()?;
        Ok(Self {
            endpoint,
            passthrough,
        })
    }
}

impl From<ProxyQuery> for UpstreamQuery {
    fn from(query: ProxyQuery) -> Self {
        UpstreamQuery::from_encoded(query.endpoint, query.passthrough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn base() -> Url {
        "https://newsapi.example".parse().unwrap()
    }

    #[test]
    fn top_headlines_query() {
        let url = SearchRequest::top_headlines()
            .upstream_query()
            .upstream_url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.example/v2/top-headlines?country=us&pageSize=10"
        );
    }

    #[test]
    fn topic_query() {
        let url = SearchRequest::topic("rust")
            .unwrap()
            .upstream_query()
            .upstream_url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.example/v2/everything?q=rust&pageSize=10&sortBy=publishedAt&language=en"
        );
    }

    fn decoded_q(url: &Url) -> Vec<String> {
        url.query_pairs()
            .filter(|(name, _)| name == "q")
            .map(|(_, value)| value.into_owned())
            .collect()
    }

    #[test]
    fn topic_decodes_back_to_the_trimmed_topic() {
        for topic in ["C++ & Rust", "100% = yes?", "naïve café", "a/b#c", "  padded  "] {
            let url = SearchRequest::topic(topic)
                .unwrap()
                .upstream_query()
                .upstream_url(&base())
                .unwrap();
            assert_eq!(decoded_q(&url), vec![topic.trim().to_string()], "topic {:?}", topic);
        }
    }

    proptest! {
        /// Any usable topic survives encoding, whichever way it is delivered.
        #[test]
        fn any_topic_decodes_back_to_the_trimmed_topic(topic in any::<String>()) {
            prop_assume!(!topic.trim().is_empty());
            let query = SearchRequest::topic(&topic).unwrap().upstream_query();
            let proxy: Url = "https://app.example/api/news".parse().unwrap();
            let expected = vec![topic.trim().to_string()];

            prop_assert_eq!(decoded_q(&query.upstream_url(&base()).unwrap()), expected.clone());
            prop_assert_eq!(decoded_q(&query.proxy_url(&proxy)), expected);
        }
    }

    #[test]
    fn blank_topics_are_rejected() {
        for topic in ["", "   ", "\t\n"] {
            let error = SearchRequest::topic(topic).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Validation);
        }
        let error = SearchRequest::new(SearchMode::Topic, None).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn top_headlines_take_no_topic() {
        assert_eq!(
            SearchRequest::new(SearchMode::TopHeadlines, None).unwrap(),
            SearchRequest::top_headlines()
        );
        let error = SearchRequest::new(SearchMode::TopHeadlines, Some("rust")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn base_url_path_is_preserved() {
        let base: Url = "http://127.0.0.1:9999/news/".parse().unwrap();
        let url = SearchRequest::top_headlines()
            .upstream_query()
            .upstream_url(&base)
            .unwrap();
        assert_eq!(url.path(), "/news/v2/top-headlines");
    }

    #[test]
    fn proxy_url_leads_with_the_endpoint() {
        let proxy: Url = "https://app.example/api/news".parse().unwrap();
        let url = SearchRequest::topic("space x")
            .unwrap()
            .upstream_query()
            .proxy_url(&proxy);
        assert_eq!(
            url.as_str(),
            "https://app.example/api/news?endpoint=everything&q=space+x&pageSize=10&sortBy=publishedAt&language=en"
        );
    }

    #[test]
    fn proxy_query_splits_endpoint_from_passthrough() {
        let query =
            ProxyQuery::from_query_string("endpoint=everything&q=foo+bar&pageSize=10").unwrap();
        assert_eq!(query.endpoint, Endpoint::Everything);
        assert_eq!(query.passthrough, vec!["q=foo+bar", "pageSize=10"]);
    }

    #[test]
    fn proxy_query_forwards_parameters_byte_for_byte() {
        let upstream: UpstreamQuery =
            ProxyQuery::from_query_string("endpoint=everything&q=foo&flag&x=%zz&y=a%20b")
                .unwrap()
                .into();
        let url = upstream.upstream_url(&base()).unwrap();
        assert_eq!(url.path(), "/v2/everything");
        assert_eq!(url.query(), Some("q=foo&flag&x=%zz&y=a%20b"));
        assert_eq!(upstream.param_names(), vec!["q", "flag", "x", "y"]);
    }

    #[test]
    fn only_the_first_endpoint_counts_and_none_are_forwarded() {
        let query =
            ProxyQuery::from_query_string("q=a&endpoint=top-headlines&&endpoint=everything")
                .unwrap();
        assert_eq!(query.endpoint, Endpoint::TopHeadlines);
        assert_eq!(query.passthrough, vec!["q=a"]);
    }

    #[test]
    fn proxy_query_requires_a_known_endpoint() {
        for query in ["endpoint=unknown", "q=foo", "", "endpoint=sources"] {
            let error = ProxyQuery::from_query_string(query).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::UnknownEndpoint, "query {:?}", query);
        }
    }

    #[test]
    fn proxied_and_direct_queries_agree() {
        let original = SearchRequest::topic("open source").unwrap().upstream_query();
        let proxy: Url = "https://app.example/api/news".parse().unwrap();
        let through_proxy: UpstreamQuery =
            ProxyQuery::from_query_string(original.proxy_url(&proxy).query().unwrap())
                .unwrap()
                .into();
        assert_eq!(through_proxy, original);
        assert_eq!(
            through_proxy.upstream_url(&base()).unwrap(),
            original.upstream_url(&base()).unwrap()
        );
    }
}
