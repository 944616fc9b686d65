use std::fmt;
use std::io;

use chrono::{DateTime, Utc};
use select::document::Document;
use select::predicate::Name;
use serde::{Serialize, Serializer};

use crate::error::PageError;
use crate::transport::{self, Transport};

/// `Mon, 02 Jan 2006 15:04:05 UTC`
const RFC1123_UTC: &str = "%a, %d %b %Y %H:%M:%S UTC";

/// Summary of one fetched page. Emitted, never written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub site: String,
    pub num_links: usize,
    pub num_images: usize,
    #[serde(serialize_with = "serialize_rfc1123")]
    pub last_fetch: DateTime<Utc>,
}

impl PageMetadata {
    /// Counts `<a>` and `<img>` elements in `html`.
    pub fn from_html(site: &str, html: &[u8], fetched_at: DateTime<Utc>) -> io::Result<Self> {
        let document = Document::from_read(html)?;

        Ok(Self {
            site: site.to_string(),
            num_links: document.find(Name("a")).count(),
            num_images: document.find(Name("img")).count(),
            last_fetch: fetched_at,
        })
    }

    pub fn last_fetch_rfc1123(&self) -> String {
        self.last_fetch.format(RFC1123_UTC).to_string()
    }
}

impl fmt::Display for PageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "site: {}", self.site)?;
        writeln!(f, "num_links: {}", self.num_links)?;
        writeln!(f, "num_images: {}", self.num_images)?;
        write!(f, "last_fetch: {}", self.last_fetch_rfc1123())
    }
}

fn serialize_rfc1123<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(RFC1123_UTC))
}

/// Fetches `url` again, on its own, and summarises it.
pub async fn report(transport: &dyn Transport, url: &str) -> Result<PageMetadata, PageError> {
    let html = transport::get_bytes(transport, url)
        .await
        .map_err(|source| PageError::Network {
            url: url.to_string(),
            source,
        })?;

    PageMetadata::from_html(url, &html, Utc::now()).map_err(|source| PageError::Parse {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::MockTransport;
    use bytes::Bytes;
    use chrono::TimeZone;
    use futures::{stream, StreamExt};

    const PAGE: &str = r#"<html><body>
        <a href="/one">one</a>
        <a href="/two"><img src="/two.png"></a>
        <a>no href</a>
        <img src="">
        <link rel="stylesheet" href="/s.css">
        </body></html>"#;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()
    }

    #[test]
    fn test_counts_anchors_and_images() {
        let metadata = PageMetadata::from_html("https://example.com", PAGE.as_bytes(), fixed_time()).unwrap();

        assert_eq!(metadata.num_links, 3);
        assert_eq!(metadata.num_images, 2);
    }

    #[test]
    fn test_display_is_four_lines() {
        let metadata = PageMetadata::from_html("https://example.com", PAGE.as_bytes(), fixed_time()).unwrap();

        assert_eq!(
            metadata.to_string(),
            "site: https://example.com\nnum_links: 3\nnum_images: 2\nlast_fetch: Mon, 02 Jan 2006 15:04:05 UTC"
        );
    }

    #[test]
    fn test_json_uses_rfc1123() {
        let metadata = PageMetadata::from_html("https://example.com", b"<p>", fixed_time()).unwrap();
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["num_links"], 0);
        assert_eq!(json["last_fetch"], "Mon, 02 Jan 2006 15:04:05 UTC");
    }

    #[tokio::test]
    async fn test_report_fetches_page() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .withf(|url| url == "https://example.com")
            .times(1)
            .returning(|_| Ok(stream::iter(vec![Ok(Bytes::from_static(PAGE.as_bytes()))]).boxed()));

        let metadata = report(&transport, "https://example.com").await.unwrap();

        assert_eq!(metadata.site, "https://example.com");
        assert_eq!(metadata.num_links, 3);
        assert!(metadata.last_fetch <= Utc::now());
    }

    #[tokio::test]
    async fn test_report_surfaces_network_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Err(TransportError::Other("dns failure".to_string())));

        let err = report(&transport, "https://nowhere.invalid").await.unwrap_err();

        assert!(matches!(err, PageError::Network { .. }));
    }
}
