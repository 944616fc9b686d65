use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, ClientBuilder};

use crate::error::TransportError;

pub type BodyStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Fetch-by-URL capability. Everything above this trait is transport-agnostic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET for `url` and hands back the response body as a stream.
    async fn get(&self, url: &str) -> Result<BodyStream, TransportError>;
}

/// Drains the whole body of `url` into memory.
pub async fn get_bytes(transport: &dyn Transport, url: &str) -> Result<Vec<u8>, TransportError> {
    let mut body = transport.get(url).await?;
    let mut content = Vec::new();
    while let Some(chunk) = body.next().await {
        content.extend_from_slice(&chunk?);
    }
    Ok(content)
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<BodyStream, TransportError> {
        tracing::debug!(url, "sending request");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!(url, %status, "response received");
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.bytes_stream().map_err(TransportError::from).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn test_get_bytes_concatenates_chunks() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .withf(|url| url == "https://example.com/")
            .times(1)
            .returning(|_| {
                Ok(stream::iter(vec![
                    Ok(Bytes::from_static(b"<html>")),
                    Ok(Bytes::from_static(b"</html>")),
                ])
                .boxed())
            });

        let content = get_bytes(&transport, "https://example.com/").await.unwrap();
        assert_eq!(content, b"<html></html>");
    }

    #[tokio::test]
    async fn test_get_bytes_propagates_mid_body_failure() {
        let mut transport = MockTransport::new();
        transport.expect_get().returning(|_| {
            Ok(stream::iter(vec![
                Ok(Bytes::from_static(b"<html>")),
                Err(TransportError::Other("connection reset".to_string())),
            ])
            .boxed())
        });

        let result = get_bytes(&transport, "https://example.com/").await;
        assert!(matches!(result, Err(TransportError::Other(_))));
    }

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new("PageMirror/1.0", Duration::from_secs(5)).is_ok());
    }
}
