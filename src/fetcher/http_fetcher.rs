use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::app::{CalibrError, Result};
use crate::fetcher::Fetcher;

pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Build a client sending `headers` on every request.
    ///
    /// `timeout` bounds each attempt; `None` waits as long as the server does.
    pub fn new(headers: &BTreeMap<String, String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .default_headers(build_headers(headers)?);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            timeout,
        })
    }
}

fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CalibrError::Config(format!("Invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| CalibrError::Config(format!("Invalid value for header {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            match self.timeout {
                Some(timeout) if e.is_timeout() => CalibrError::Timeout(timeout),
                _ => CalibrError::Http(e),
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CalibrError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(CalibrError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?.to_vec();
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Answer a single request with a canned response and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });

        (format!("http://{}", addr), rx)
    }

    fn user_agent() -> BTreeMap<String, String> {
        BTreeMap::from([("User-Agent".to_string(), "calibr-test/1.0".to_string())])
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_headers() {
        let (base, request) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let fetcher = HttpFetcher::new(&user_agent(), Some(Duration::from_secs(5))).unwrap();

        let body = fetcher
            .fetch(&format!("{}/day/2023-03-31", base))
            .await
            .unwrap();
        assert_eq!(body, br#"{"ok":true}"#);

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /day/2023-03-31 http/1.1"));
        assert!(request.contains("user-agent: calibr-test/1.0"));
    }

    #[tokio::test]
    async fn test_fetch_404_is_not_found() {
        let (base, _request) = serve_once("404 Not Found", "{}").await;
        let fetcher = HttpFetcher::new(&user_agent(), None).unwrap();

        let err = fetcher
            .fetch(&format!("{}/day/1999-01-01", base))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_status() {
        let (base, _request) = serve_once("503 Service Unavailable", "busy").await;
        let fetcher = HttpFetcher::new(&user_agent(), None).unwrap();

        let err = fetcher
            .fetch(&format!("{}/day/2023-03-18", base))
            .await
            .unwrap_err();
        match err {
            CalibrError::Status { status, .. } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_network() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let fetcher = HttpFetcher::new(&user_agent(), None).unwrap();

        let err = fetcher
            .fetch(&format!("http://{}/day/2023-03-18", addr))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let headers = BTreeMap::from([("Bad Header".to_string(), "x".to_string())]);
        assert!(matches!(
            HttpFetcher::new(&headers, None),
            Err(CalibrError::Config(_))
        ));
    }
}
