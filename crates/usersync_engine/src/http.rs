//! HTTP user source.
//!
//! The actual HTTP client is abstracted via a trait so the engine does not
//! depend on any particular HTTP library. The CLI plugs in a `reqwest`
//! blocking client.

use crate::config::SyncConfig;
use crate::error::{FetchError, FetchResult};
use crate::source::{RemotePage, RemoteUserSource};
use parking_lot::RwLock;
use tracing::debug;
use usersync_protocol::{ProtocolError, UsersPage};

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. An `Err` means
/// no response was received at all (DNS, connect, timeout).
pub trait HttpClient: Send + Sync {
    /// Sends a GET request.
    fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// A [`RemoteUserSource`] that reads `GET <base>/users?page=<n>`.
pub struct HttpUserSource<C: HttpClient> {
    config: SyncConfig,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpUserSource<C> {
    /// Creates a source using the configured base URL.
    pub fn new(config: SyncConfig, client: C) -> Self {
        Self {
            config,
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the message of the last failed request.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn fail(&self, error: FetchError) -> FetchError {
        *self.last_error.write() = Some(error.to_string());
        error
    }
}

impl<C: HttpClient> RemoteUserSource for HttpUserSource<C> {
    fn fetch_page(&self, page: u32) -> FetchResult<RemotePage> {
        let url = self.config.page_url(page);
        debug!(%url, "requesting user page");

        let response = self
            .client
            .get(&url)
            .map_err(|message| self.fail(FetchError::Transport { page, message }))?;

        if !response.is_success() {
            return Err(self.fail(FetchError::Unsuccessful {
                page,
                status: response.status,
            }));
        }

        let decoded = match UsersPage::decode(&response.body) {
            Ok(decoded) => decoded,
            Err(ProtocolError::EmptyBody) => {
                return Err(self.fail(FetchError::Unsuccessful {
                    page,
                    status: response.status,
                }))
            }
            Err(e) => return Err(self.fail(FetchError::transport(page, e.to_string()))),
        };

        *self.last_error.write() = None;
        Ok(decoded.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use usersync_protocol::UserId;

    #[derive(Default)]
    struct ScriptedClient {
        responses: Mutex<Vec<Result<HttpResponse, String>>>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn respond(self, response: Result<HttpResponse, String>) -> Self {
            self.responses.lock().push(response);
            self
        }
    }

    impl HttpClient for ScriptedClient {
        fn get(&self, url: &str) -> Result<HttpResponse, String> {
            self.urls.lock().push(url.to_string());
            self.responses.lock().remove(0)
        }
    }

    const PAGE_1: &str = r#"{"page":1,"per_page":2,"total":3,"total_pages":2,"data":[
        {"id":1,"email":"george.bluth@reqres.in","first_name":"George","last_name":"Bluth","avatar":"https://reqres.in/img/faces/1-image.jpg"},
        {"id":2,"email":"janet.weaver@reqres.in","first_name":"Janet","last_name":"Weaver","avatar":"https://reqres.in/img/faces/2-image.jpg"}]}"#;

    fn source(client: ScriptedClient) -> HttpUserSource<ScriptedClient> {
        HttpUserSource::new(SyncConfig::new("https://users.test/api"), client)
    }

    #[test]
    fn fetches_and_decodes_page() {
        let source = source(ScriptedClient::default().respond(Ok(HttpResponse::new(200, PAGE_1))));

        let page = source.fetch_page(1).unwrap();
        assert_eq!(page.total_pages, Some(2));
        assert_eq!(page.users.len(), 2);
        assert_eq!(page.users[1].id, UserId::new(2));
        assert_eq!(page.users[1].full_name(), "Janet Weaver");
        assert_eq!(
            *source.client().urls.lock(),
            vec!["https://users.test/api/users?page=1".to_string()]
        );
        assert_eq!(source.last_error(), None);
    }

    #[test]
    fn non_success_status_is_unsuccessful() {
        let source = source(ScriptedClient::default().respond(Ok(HttpResponse::new(404, "{}"))));

        let err = source.fetch_page(3).unwrap_err();
        assert_eq!(err, FetchError::Unsuccessful { page: 3, status: 404 });
        assert!(source.last_error().is_some());
    }

    #[test]
    fn empty_body_is_unsuccessful() {
        let source = source(ScriptedClient::default().respond(Ok(HttpResponse::new(200, ""))));

        let err = source.fetch_page(1).unwrap_err();
        assert_eq!(err, FetchError::Unsuccessful { page: 1, status: 200 });
    }

    #[test]
    fn client_failure_is_transport() {
        let source =
            source(ScriptedClient::default().respond(Err("connection refused".to_string())));

        let err = source.fetch_page(2).unwrap_err();
        assert_eq!(err, FetchError::transport(2, "connection refused"));
        assert_eq!(source.last_error().unwrap(), err.to_string());
    }

    #[test]
    fn undecodable_body_is_transport() {
        let source = source(
            ScriptedClient::default().respond(Ok(HttpResponse::new(200, "<html>oops</html>"))),
        );

        assert!(matches!(
            source.fetch_page(1),
            Err(FetchError::Transport { page: 1, .. })
        ));
    }

    #[test]
    fn success_clears_last_error() {
        let source = source(
            ScriptedClient::default()
                .respond(Err("timeout".to_string()))
                .respond(Ok(HttpResponse::new(200, PAGE_1))),
        );

        assert!(source.fetch_page(1).is_err());
        assert!(source.last_error().is_some());
        assert!(source.fetch_page(1).is_ok());
        assert_eq!(source.last_error(), None);
    }
}
