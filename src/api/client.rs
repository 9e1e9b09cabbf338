use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{NewWish, Notification, Settings, UserProfile, Wish, WishAction, WishStatus};
use crate::store::WishStore;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL {0:?}")]
    BaseUrl(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Blocking client for the wish cooler REST backend. One request per call,
/// no retries: a failed call leaves remote state as it was.
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|_| ApiError::BaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self { http, base })
    }

    /// `base/seg1/seg2/...`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn wishes_url(&self, nick: &str, status: Option<WishStatus>) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["wishes", nick])?;
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        Ok(url)
    }

    pub fn action_url(&self, nick: &str, id: &str, action: WishAction) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["wishes", nick, id])?;
        url.query_pairs_mut().append_pair("action", action.as_str());
        Ok(url)
    }

    fn execute(
        &self,
        method: Method,
        url: Url,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<String, ApiError> {
        log::debug!("{} {}", method, url);
        let url_str = url.to_string();
        let request = build(self.http.request(method.clone(), url));

        let response = request.send().map_err(|source| {
            log::error!("{} {} failed: {}", method, url_str, source);
            ApiError::Transport {
                url: url_str.clone(),
                source,
            }
        })?;

        let status = response.status();
        let body = response.text().map_err(|source| ApiError::Transport {
            url: url_str.clone(),
            source,
        })?;

        if !status.is_success() {
            log::error!("{} {} returned {}: {}", method, url_str, status, body.trim());
            return Err(ApiError::Status {
                method,
                url: url_str,
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(body)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let url_str = url.to_string();
        let body = self.execute(Method::GET, url, |r| r)?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url_str,
            source,
        })
    }

    fn send_json<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<String, ApiError> {
        self.execute(method, url, |r| r.json(body))
    }
}

impl WishStore for ApiClient {
    fn load_profile(&self, nick: &str) -> Result<UserProfile> {
        let mut profile: UserProfile = self.get_json(self.endpoint(&["user", nick])?)?;
        if profile.nick.is_empty() {
            profile.nick = nick.to_string();
        }
        Ok(profile)
    }

    fn save_profile(&self, nick: &str, profile: &UserProfile) -> Result<()> {
        self.send_json(Method::POST, self.endpoint(&["user", nick])?, profile)?;
        Ok(())
    }

    fn list_wishes(&self, nick: &str, status: Option<WishStatus>) -> Result<Vec<Wish>> {
        let wishes: Option<Vec<Wish>> = self.get_json(self.wishes_url(nick, status)?)?;
        Ok(wishes.unwrap_or_default())
    }

    fn add_wish(&self, nick: &str, wish: &NewWish) -> Result<Wish> {
        let url = self.endpoint(&["wishes", nick])?;
        let url_str = url.to_string();
        let body = self.send_json(Method::POST, url, wish)?;
        let created = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url_str,
            source,
        })?;
        Ok(created)
    }

    fn apply_action(&self, nick: &str, id: &str, action: WishAction) -> Result<()> {
        self.execute(Method::PUT, self.action_url(nick, id, action)?, |r| r)?;
        Ok(())
    }

    fn delete_wish(&self, nick: &str, id: &str) -> Result<()> {
        self.execute(Method::DELETE, self.endpoint(&["wishes", nick, id])?, |r| r)?;
        Ok(())
    }

    fn load_settings(&self, nick: &str) -> Result<Settings> {
        Ok(self.get_json(self.endpoint(&["settings", nick])?)?)
    }

    fn save_settings(&self, nick: &str, settings: &Settings) -> Result<()> {
        self.send_json(Method::POST, self.endpoint(&["settings", nick])?, settings)?;
        Ok(())
    }

    fn notify(&self, nick: &str, notification: &Notification) -> Result<()> {
        self.send_json(Method::POST, self.endpoint(&["notify", nick])?, notification)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{
        body_partial_json, header, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Run a call against the mock server off the async runtime; the blocking
    /// client must be built and dropped there too.
    async fn with_client<T, F>(server: &MockServer, call: F) -> T
    where
        T: Send + 'static,
        F: FnOnce(ApiClient) -> T + Send + 'static,
    {
        let base = format!("{}/api", server.uri());
        tokio::task::spawn_blocking(move || call(ApiClient::new(&base).unwrap()))
            .await
            .unwrap()
    }

    #[test]
    fn builds_documented_paths() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(
            client.endpoint(&["user", "meow"]).unwrap().as_str(),
            "http://localhost:8080/api/user/meow"
        );
        assert_eq!(
            client
                .wishes_url("meow", Some(WishStatus::Completed))
                .unwrap()
                .as_str(),
            "http://localhost:8080/api/wishes/meow?status=completed"
        );
        assert_eq!(
            client.action_url("meow", "abc", WishAction::Cancel).unwrap().as_str(),
            "http://localhost:8080/api/wishes/meow/abc?action=cancel"
        );
    }

    #[test]
    fn encodes_path_segments() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();
        let url = client.endpoint(&["user", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/user/a%20b%2Fc");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::BaseUrl(_))));
        assert!(matches!(ApiClient::new("mailto:x@y"), Err(ApiError::BaseUrl(_))));
    }

    #[tokio::test]
    async fn lists_wishes_with_status_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/wishes/meow"))
            .and(query_param("status", "completed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "1",
                "title": "Кофемашина",
                "price": 12000,
                "category": "кухня",
                "status": "completed"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let wishes = with_client(&server, |c| c.list_wishes("meow", Some(WishStatus::Completed)))
            .await
            .unwrap();
        assert_eq!(wishes.len(), 1);
        assert_eq!(wishes[0].title, "Кофемашина");
        assert_eq!(wishes[0].status, WishStatus::Completed);
    }

    #[tokio::test]
    async fn null_wish_list_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/wishes/meow"))
            .and(query_param_is_missing("status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;

        let wishes = with_client(&server, |c| c.list_wishes("meow", None)).await;
        assert!(wishes.unwrap().is_empty());
    }

    #[tokio::test]
    async fn action_uses_put_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/wishes/meow/w1"))
            .and(query_param("action", "complete"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        with_client(&server, |c| c.apply_action("meow", "w1", WishAction::Complete))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/wishes/meow/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found\n"))
            .expect(1)
            .mount(&server)
            .await;

        let err = with_client(&server, |c| c.delete_wish("meow", "missing"))
            .await
            .unwrap_err();
        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Status { status, body, .. }) => {
                assert_eq!(*status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn posts_settings_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/settings/meow"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({ "excludedProducts": "алкоголь" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let settings = Settings {
            excluded_products: "алкоголь".into(),
            ..Settings::default()
        };
        with_client(&server, move |c| c.save_settings("meow", &settings))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn notify_posts_type_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/notify/meow"))
            .and(body_partial_json(json!({ "title": "Тест", "type": "test" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let notification = Notification {
            title: "Тест".into(),
            message: "Проверка".into(),
            kind: "test".into(),
        };
        with_client(&server, move |c| c.notify("meow", &notification))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn profile_defaults_nick_from_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/meow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "salary": 1000 })))
            .mount(&server)
            .await;

        let profile = with_client(&server, |c| c.load_profile("meow"))
            .await
            .unwrap();
        assert_eq!(profile.nick, "meow");
        assert_eq!(profile.salary, 1000.0);
        assert!(profile.blocked_categories.is_empty());
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/settings/meow"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = with_client(&server, |c| c.load_settings("meow"))
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Decode { .. })));
    }
}
