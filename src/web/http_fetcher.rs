use std::sync::Arc;

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::LOCATION;
use hyper::{Method, Request, Uri};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use rustls::RootCertStore;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::CertificateDer;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::web::{Error, Fetch};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "HttpConfig::default_max_redirect")]
    pub max_redirect: u8,
    pub server_ca_bundle: Option<String>,
}

impl HttpConfig {
    fn default_max_redirect() -> u8 {
        5
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            max_redirect: HttpConfig::default_max_redirect(),
            server_ca_bundle: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    max_redirect: u8,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, Error> {
        let tls_config = build_tls_config(config.server_ca_bundle.as_deref())?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            max_redirect: config.max_redirect,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Error> {
        let mut uri: Uri = url.parse()?;
        let mut redirects = 0;

        loop {
            let request = Request::builder()
                .method(Method::GET)
                .uri(uri.clone())
                .body(Empty::new())?;

            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| Error::Http(format!("HTTP request failed: {e}")))?;

            if response.status().is_redirection() {
                if redirects >= self.max_redirect {
                    return Err(Error::Http("Too many redirects".to_string()));
                }

                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| Error::Http("Missing Location header".to_string()))?;

                debug!("Following redirect from {uri} to {location}");
                uri = resolve_location(&uri, location)?;
                redirects += 1;
                continue;
            }

            if !response.status().is_success() {
                warn!("GET {uri} returned {}", response.status());
            }

            let body = response.into_body().collect().await?.to_bytes();
            return Ok(String::from_utf8_lossy(&body).into_owned());
        }
    }
}

/// Resolves a `Location` header against the request it answers, as RFC 3986 section 5.2 does.
fn resolve_location(base: &Uri, location: &str) -> Result<Uri, Error> {
    let base = Url::parse(&base.to_string())?;
    let mut target = base.join(location)?;
    target.set_fragment(None);

    Ok(target.as_str().parse()?)
}

fn build_tls_config(ca_bundle: Option<&str>) -> Result<rustls::ClientConfig, Error> {
    let mut root_store = RootCertStore::empty();

    let certs = if let Some(bundle) = ca_bundle {
        CertificateDer::pem_file_iter(bundle)?.collect::<Result<Vec<_>, _>>()?
    } else {
        rustls_native_certs::load_native_certs().certs
    };

    root_store.add_parsable_certificates(certs);

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    Ok(rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a few redirects (`/old`, `/dir/old`, `/dir/up`, `/loop`), a 404 at `/missing`
    /// and any other path as a page naming that path.
    async fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };

                let mut buffer = vec![0; 4096];
                let mut read = 0;
                while !buffer[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buffer[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                }

                let request = String::from_utf8_lossy(&buffer[..read]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let response = match path.as_str() {
                    "/old" => "HTTP/1.1 302 Found\r\nLocation: /new\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    "/dir/old" => "HTTP/1.1 301 Moved Permanently\r\nLocation: new?from=old\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    "/dir/up" => "HTTP/1.1 302 Found\r\nLocation: ../top\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    "/loop" => "HTTP/1.1 302 Found\r\nLocation: /loop\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    "/missing" => "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found".to_string(),
                    _ => {
                        let body = format!("page {path}");
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        )
                    }
                };

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{address}")
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch() {
        let base = serve().await;

        let body = fetcher().fetch(&format!("{base}/index")).await;

        assert_eq!(body, Ok("page /index".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let base = serve().await;

        let body = fetcher().fetch(&format!("{base}/old")).await;

        assert_eq!(body, Ok("page /new".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_follows_relative_redirect() {
        let base = serve().await;

        let body = fetcher().fetch(&format!("{base}/dir/old")).await;
        assert_eq!(body, Ok("page /dir/new?from=old".to_string()));

        let body = fetcher().fetch(&format!("{base}/dir/up")).await;
        assert_eq!(body, Ok("page /top".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_too_many_redirects() {
        let base = serve().await;

        let result = fetcher().fetch(&format!("{base}/loop")).await;

        assert_eq!(result, Err(Error::Http("Too many redirects".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_returns_error_page_body() {
        let base = serve().await;

        let body = fetcher().fetch(&format!("{base}/missing")).await;

        assert_eq!(body, Ok("not found".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let result = fetcher().fetch("http://exa mple.com").await;

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let result = fetcher().fetch("http://127.0.0.1:1/").await;

        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[test]
    fn test_resolve_location() {
        let base: Uri = "http://example.com/a/b?c=d".parse().unwrap();

        assert_eq!(
            resolve_location(&base, "/new?x=1").unwrap(),
            "http://example.com/new?x=1"
        );
        assert_eq!(
            resolve_location(&base, "https://other.org/page").unwrap(),
            "https://other.org/page"
        );
        assert_eq!(
            resolve_location(&base, "new").unwrap(),
            "http://example.com/a/new"
        );
        assert_eq!(
            resolve_location(&base, "../x").unwrap(),
            "http://example.com/x"
        );
        assert_eq!(
            resolve_location(&base, "./c/../d").unwrap(),
            "http://example.com/a/d"
        );
        assert_eq!(
            resolve_location(&base, "?page=2").unwrap(),
            "http://example.com/a/b?page=2"
        );
        assert_eq!(
            resolve_location(&base, "//other.org/p").unwrap(),
            "http://other.org/p"
        );
        assert_eq!(
            resolve_location(&base, "/next#section").unwrap(),
            "http://example.com/next"
        );
    }

    #[test]
    fn test_missing_ca_bundle() {
        let config = HttpConfig {
            max_redirect: 5,
            server_ca_bundle: Some("/nonexistent/ca.pem".to_string()),
        };

        assert!(matches!(HttpFetcher::new(&config), Err(Error::Tls(_))));
    }
}
