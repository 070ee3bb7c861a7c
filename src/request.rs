use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::Result;

/// Produces the raw HTML of a page, or `None` if the page is unavailable for any reason.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    async fn fetch(&self, id: u32) -> Option<String>;
}

/// Fetches pages over HTTP, one GET per id, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    // Client uses Arc so we can clone cheaply
    client: Client,
    url_template: String,
}

impl HttpFetcher {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    #[inline]
    pub fn url_for(&self, id: u32) -> String {
        self.url_template.replace("{id}", &id.to_string())
    }

    async fn request_page_html(&self, url: &str) -> reqwest::Result<Option<String>> {
        let res = self.client.get(url).send().await?;
        if !res.status().is_success() {
            debug!(%url, status = %res.status(), "page unavailable");
            return Ok(None);
        }
        let html = res.text().await?;
        Ok(Some(html))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, id: u32) -> Option<String> {
        let url = self.url_for(id);
        match self.request_page_html(&url).await {
            Ok(html) => html,
            Err(err) => {
                debug!(%url, %err, "request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer, timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(format!("{}/story.php?story={{id}}", server.uri()), timeout).unwrap()
    }

    #[test]
    fn url_template_is_filled_in() {
        let fetcher =
            HttpFetcher::new("http://localhost/s?story={id}", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.url_for(42), "http://localhost/s?story=42");
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story.php"))
            .and(query_param("story", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>five</html>"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        assert_eq!(fetcher.fetch(5).await.as_deref(), Some("<html>five</html>"));
    }

    #[tokio::test]
    async fn non_success_status_is_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        assert_eq!(fetcher.fetch(9).await, None);
    }

    #[tokio::test]
    async fn timeout_is_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_millis(50));
        assert_eq!(fetcher.fetch(1).await, None);
    }

    #[tokio::test]
    async fn connection_error_is_no_content() {
        // Nothing listens on port 9 locally.
        let fetcher = HttpFetcher::new("http://127.0.0.1:9/{id}", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.fetch(1).await, None);
    }
}
