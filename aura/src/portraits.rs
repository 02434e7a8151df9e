//! Portrait fetching for the nebula.
//!
//! The engine only tracks which portraits it wants. This module fetches
//! them and reports each outcome to the render loop as
//! [`LoopCommand::ImageLoaded`]; until a portrait arrives, or when it
//! fails, the node keeps its gradient core.

use std::time::Duration;

use reqwest::{header, Client};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tracing::{debug, info};

use nebula::LoopCommand;

/// Concurrent HTTP fetcher for portrait URLs.
#[derive(Debug, Clone)]
pub struct PortraitLoader {
    client: Client,
}

impl PortraitLoader {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Whether `url` answers 2xx with a non-empty image body.
    pub async fn fetch(&self, url: &str) -> bool {
        let response = match self.client.get(url).send().await.and_then(|r| r.error_for_status()) {
            Ok(response) => response,
            Err(e) => {
                debug!(url, "Portrait request failed: {}", e);
                return false;
            }
        };
        let is_image = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("image/"));
        if !is_image {
            debug!(url, "Portrait response is not an image");
            return false;
        }
        match response.bytes().await {
            Ok(body) => !body.is_empty(),
            Err(e) => {
                debug!(url, "Portrait body failed: {}", e);
                false
            }
        }
    }

    /// Fetch every URL concurrently and send each result to `commands`.
    /// Returns how many loaded.
    pub async fn load_all(&self, urls: Vec<String>, commands: &UnboundedSender<LoopCommand>) -> usize {
        let requested = urls.len();
        let mut fetches = JoinSet::new();
        for url in urls {
            let loader = self.clone();
            fetches.spawn(async move {
                let ok = loader.fetch(&url).await;
                (url, ok)
            });
        }

        let mut loaded = 0;
        while let Some(joined) = fetches.join_next().await {
            let Ok((url, ok)) = joined else {
                continue;
            };
            loaded += usize::from(ok);
            if commands.send(LoopCommand::ImageLoaded { url, ok }).is_err() {
                debug!("Render loop stopped before every portrait arrived");
            }
        }
        info!(requested, loaded, "Portraits fetched");
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader() -> PortraitLoader {
        PortraitLoader::new(Duration::from_secs(5)).unwrap()
    }

    async fn server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zion.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html></html>"),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_fetch_accepts_only_images() {
        let server = server().await;
        let loader = loader();
        assert!(loader.fetch(&format!("{}/zion.png", server.uri())).await);
        assert!(!loader.fetch(&format!("{}/page", server.uri())).await);
        // Unmatched paths answer 404.
        assert!(!loader.fetch(&format!("{}/gone.png", server.uri())).await);
        assert!(!loader.fetch("not a url").await);
    }

    #[tokio::test]
    async fn test_load_all_reports_every_result() {
        let server = server().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let good = format!("{}/zion.png", server.uri());
        let bad = format!("{}/gone.png", server.uri());

        let loaded = loader().load_all(vec![good.clone(), bad.clone()], &tx).await;
        assert_eq!(loaded, 1);

        let mut results = Vec::new();
        while let Ok(LoopCommand::ImageLoaded { url, ok }) = rx.try_recv() {
            results.push((url, ok));
        }
        results.sort();
        let mut expected = vec![(good, true), (bad, false)];
        expected.sort();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn test_stopped_loop_is_not_an_error() {
        let server = server().await;
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let loaded = loader().load_all(vec![format!("{}/zion.png", server.uri())], &tx).await;
        assert_eq!(loaded, 1);
    }
}
