//! Reading the input document from a local file or an `http(s)` URL.

use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::error::{GenerateError, Result};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A local file.
    File(PathBuf),
    /// A remote document.
    Remote(Url),
}

impl InputSource {
    /// Classify an input argument. Only `http` and `https` URLs are fetched;
    /// everything else is a path.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => InputSource::Remote(url),
            _ => InputSource::File(PathBuf::from(input)),
        }
    }

    /// Read the raw text.
    pub async fn read(&self) -> Result<String> {
        match self {
            InputSource::File(path) => {
                debug!(path = %path.display(), "Reading specification file.");
                tokio::fs::read_to_string(path).await.map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        GenerateError::InputNotFound(path.clone())
                    } else {
                        GenerateError::ReadInput {
                            path: path.clone(),
                            source,
                        }
                    }
                })
            }
            InputSource::Remote(url) => {
                debug!(url = %url, "Fetching specification.");
                fetch(url).await.map_err(|source| GenerateError::FetchInput {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "{}", path.display()),
            InputSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

async fn fetch(url: &Url) -> std::result::Result<String, reqwest::Error> {
    reqwest::get(url.clone())
        .await?
        .error_for_status()?
        .text()
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_inputs() {
        assert!(matches!(
            InputSource::parse("https://example.com/swagger.json"),
            InputSource::Remote(_)
        ));
        assert!(matches!(
            InputSource::parse("http://localhost:8080/v2/api-docs"),
            InputSource::Remote(_)
        ));
        assert_eq!(
            InputSource::parse("specs/swagger.yml"),
            InputSource::File(PathBuf::from("specs/swagger.yml"))
        );
        assert_eq!(
            InputSource::parse("file:///tmp/swagger.json"),
            InputSource::File(PathBuf::from("file:///tmp/swagger.json"))
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = InputSource::File(path.clone()).read().await.unwrap_err();
        assert!(matches!(err, GenerateError::InputNotFound(p) if p == path));
    }

    #[tokio::test]
    async fn test_remote_error_status() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/swagger.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = InputSource::parse(&format!("{}/swagger.json", server.uri()));
        let err = source.read().await.unwrap_err();
        assert!(matches!(err, GenerateError::FetchInput { .. }));
    }
}
