//! Articles, and turning provider responses into them.

use chrono::{DateTime, TimeZone, Utc};
use fake::{
    faker::{
        lorem::en::{Sentence, Words},
        name::en::Name,
    },
    Fake,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{NewsError, UpstreamResponse};

/// The message used when the provider reports an error without explaining it.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Failed to fetch news";

/// A single news item, ready to be shown to a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// The headline.
    pub title: String,

    /// A short summary, if the provider has one.
    pub description: Option<String>,

    /// Where the full article lives.
    pub url: String,

    /// A lead image, if the provider has one.
    pub image_url: Option<String>,

    /// The display name of the publication.
    pub source_name: String,

    /// When the article was published.
    pub published_at: DateTime<Utc>,

    /// The byline, if the provider has one.
    pub author: Option<String>,
}

impl<F> fake::Dummy<F> for Article {
    fn dummy_with_rng<R: rand::Rng + ?Sized>(_config: &F, rng: &mut R) -> Self {
        let slug = Words(2..5).fake_with_rng::<Vec<String>, R>(rng).join("-");
        Self {
            title: Sentence(3..8).fake_with_rng(rng),
            description: if rng.gen() {
                Some(Sentence(8..20).fake_with_rng(rng))
            } else {
                None
            },
            url: format!("https://news.example.com/{}", slug),
            image_url: if rng.gen() {
                Some(format!("https://news.example.com/images/{}.jpg", slug))
            } else {
                None
            },
            source_name: Words(1..3).fake_with_rng::<Vec<String>, R>(rng).join(" "),
            published_at: Utc
                .timestamp_opt(rng.gen_range(1_500_000_000..1_800_000_000), 0)
                .unwrap(),
            author: if rng.gen() {
                Some(Name().fake_with_rng(rng))
            } else {
                None
            },
        }
    }
}

/// The body the provider sends.
#[derive(Debug, Deserialize)]
struct UpstreamPayload {
    /// `"ok"` or `"error"`.
    status: Option<String>,
    /// Explanation accompanying an error status.
    message: Option<String>,
    /// The results, absent on errors.
    articles: Option<Vec<UpstreamArticle>>,
}

/// An article as the provider describes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::missing_docs_in_private_items)]
struct UpstreamArticle {
    source: UpstreamSource,
    author: Option<String>,
    title: String,
    description: Option<String>,
    url: String,
    url_to_image: Option<String>,
    published_at: DateTime<Utc>,
}

/// The publication an article came from.
#[derive(Debug, Deserialize)]
#[allow(clippy::missing_docs_in_private_items)]
struct UpstreamSource {
    name: String,
}

impl From<UpstreamArticle> for Article {
    fn from(article: UpstreamArticle) -> Self {
        Self {
            title: article.title,
            description: article.description,
            url: article.url,
            image_url: article.url_to_image,
            source_name: article.source.name,
            published_at: article.published_at,
            author: article.author,
        }
    }
}

/// Classify a raw provider response.
///
/// Status codes are checked before the body is looked at, so a 401 or 429 is
/// classified the same way no matter what it contains. A successful response
/// with no articles is an empty list, not an error. Articles keep the order
/// the provider gave them in.
///
/// # Errors
/// The [`NewsError`] that best describes a failed response. A successful
/// response whose body is not a well formed article list is
/// [`NewsError::Upstream`].
pub fn normalize(response: &UpstreamResponse) -> Result<Vec<Article>, NewsError> {
    match response.status {
        401 => return Err(NewsError::InvalidCredential),
        429 => return Err(NewsError::RateLimited),
        status if !response.is_success() => {
            return Err(NewsError::Upstream {
                status,
                message: response.status_text.clone(),
            })
        }
        _ => (),
    }

    let payload: UpstreamPayload =
        serde_json::from_slice(&response.body).map_err(|error| NewsError::Upstream {
            status: response.status,
            message: format!("Malformed response from the news service: {}", error),
        })?;

    if payload.status.as_deref() == Some("error") {
        return Err(NewsError::Upstream {
            status: response.status,
            message: payload
                .message
                .unwrap_or_else(|| UPSTREAM_FALLBACK_MESSAGE.to_string()),
        });
    }

    Ok(payload
        .articles
        .unwrap_or_default()
        .into_iter()
        .map(Article::from)
        .collect())
}

/// Render `articles` the way the provider would send them in a successful
/// response. Useful for mock servers.
pub fn upstream_body(articles: &[Article]) -> Value {
    let articles: Vec<Value> = articles
        .iter()
        .map(|article| {
            json!({
                "source": { "id": null, "name": article.source_name },
                "author": article.author,
                "title": article.title,
                "description": article.description,
                "url": article.url,
                "urlToImage": article.image_url,
                "publishedAt": article.published_at,
                "content": null,
            })
        })
        .collect();

    json!({
        "status": "ok",
        "totalResults": articles.len(),
        "articles": articles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use bytes::Bytes;
    use fake::{Fake, Faker};
    use pretty_assertions::assert_eq;

    fn response(status: u16, status_text: &str, body: impl Into<Bytes>) -> UpstreamResponse {
        UpstreamResponse {
            status,
            status_text: status_text.to_string(),
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    fn json_response(status: u16, body: &Value) -> UpstreamResponse {
        response(status, "", serde_json::to_vec(body).unwrap())
    }

    #[test]
    fn unauthorized_is_an_invalid_credential() {
        for body in [
            json!({"status": "error", "code": "apiKeyInvalid", "message": "bad key"}),
            json!({"status": "ok", "articles": []}),
            json!(null),
        ] {
            let error = normalize(&json_response(401, &body)).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidCredential);
        }
        let error = normalize(&response(401, "Unauthorized", "not json")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidCredential);
    }

    #[test]
    fn too_many_requests_is_rate_limited() {
        let body = json!({"status": "error", "code": "rateLimited", "message": "slow down"});
        let error = normalize(&json_response(429, &body)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RateLimited);
        let error = normalize(&response(429, "Too Many Requests", "")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RateLimited);
    }

    #[test]
    fn other_failures_carry_status_and_text() {
        let error = normalize(&response(503, "Service Unavailable", "down")).unwrap_err();
        match error {
            NewsError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn error_status_in_body_is_an_upstream_error() {
        let body = json!({"status": "error", "code": "parameterInvalid", "message": "q is too long"});
        match normalize(&json_response(200, &body)).unwrap_err() {
            NewsError::Upstream { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "q is too long");
            }
            other => panic!("unexpected error {:?}", other),
        }

        let body = json!({"status": "error"});
        let error = normalize(&json_response(200, &body)).unwrap_err();
        assert_eq!(error.to_string(), UPSTREAM_FALLBACK_MESSAGE);
    }

    #[test]
    fn no_articles_is_an_empty_list() {
        for body in [
            json!({"status": "ok", "totalResults": 0, "articles": []}),
            json!({"status": "ok", "totalResults": 0}),
            json!({"status": "ok", "articles": null}),
            json!({}),
        ] {
            assert_eq!(normalize(&json_response(200, &body)).unwrap(), Vec::<Article>::new());
        }
    }

    #[test]
    fn articles_keep_their_order() {
        let articles: Vec<Article> = (0..7).map(|_| Faker.fake()).collect();
        let normalized = normalize(&json_response(200, &upstream_body(&articles))).unwrap();
        assert_eq!(normalized, articles);
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let body = json!({
            "status": "ok",
            "articles": [{
                "source": {"name": "The Daily Example"},
                "title": "Something happened",
                "url": "https://example.com/something",
                "publishedAt": "2024-03-01T12:30:00Z",
            }],
        });
        let normalized = normalize(&json_response(200, &body)).unwrap();
        assert_eq!(
            normalized,
            vec![Article {
                title: "Something happened".to_string(),
                description: None,
                url: "https://example.com/something".to_string(),
                image_url: None,
                source_name: "The Daily Example".to_string(),
                published_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
                author: None,
            }]
        );
    }

    // The provider never sends these, so there is no obvious right answer.
    // Guessing an empty list would hide a broken integration, so these are
    // reported as upstream errors.
    #[test]
    fn malformed_payloads_are_upstream_errors() {
        for body in [
            json!({"status": "ok", "articles": "not a list"}),
            json!({"status": "ok", "articles": {"title": "an object"}}),
            json!({"status": "ok", "articles": [{"title": "missing everything else"}]}),
            json!([1, 2, 3]),
        ] {
            let error = normalize(&json_response(200, &body)).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Upstream, "body {}", body);
        }
        let error = normalize(&response(200, "OK", "<html>oops</html>")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn articles_serialize_in_camel_case() {
        let article: Article = Faker.fake();
        let value = serde_json::to_value(&article).unwrap();
        assert!(value.get("sourceName").is_some());
        assert!(value.get("publishedAt").is_some());
        assert!(value.get("imageUrl").is_some());
    }
}
