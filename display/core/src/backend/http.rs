//! HTTP Booking Source
//!
//! Polls the booking backend's display API:
//!
//! ```text
//! GET {address}/rooms/{room_id}/{timezone_id}
//! ```
//!
//! The timezone id has `/` replaced with `&` so it fits one path segment.
//! The backend uses it to pick the day boundaries for "upcoming".

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{BookingSource, FetchError};
use crate::config::{url_safe_timezone, DisplayConfig};
use crate::payload::BookingPayload;

/// HTTP client for the booking backend
#[derive(Clone)]
pub struct HttpBookingSource {
    /// Fully built endpoint URL
    url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBookingSource {
    /// Create a source for one room
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        address: &str,
        room_id: u32,
        timezone_id: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            url: endpoint_url(address, room_id, timezone_id),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Create from `DisplayConfig`
    ///
    /// The timezone is resolved now, so a system timezone change is picked up
    /// the next time a source is constructed.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &DisplayConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.api.address,
            config.api.room_id,
            &config.timezone_id(),
            config.api.request_timeout,
        )
    }

    /// The polled URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn endpoint_url(address: &str, room_id: u32, timezone_id: &str) -> String {
    format!(
        "{}/rooms/{}/{}",
        address.trim_end_matches('/'),
        room_id,
        url_safe_timezone(timezone_id)
    )
}

#[async_trait]
impl BookingSource for HttpBookingSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> Result<BookingPayload, FetchError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Transport(format!("backend returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP/1.1 response and return the base address
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}")
    }

    fn source(address: &str) -> HttpBookingSource {
        HttpBookingSource::new(address, 3, "Europe/Berlin", Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("http://127.0.0.1:37222", 1, "Europe/Berlin"),
            "http://127.0.0.1:37222/rooms/1/Europe&Berlin"
        );
        assert_eq!(
            endpoint_url("http://host/", 12, "UTC"),
            "http://host/rooms/12/UTC"
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = DisplayConfig::default();
        config.api.room_id = 5;
        config.api.timezone = Some("America/New_York".to_string());

        let source = HttpBookingSource::from_config(&config).unwrap();
        assert_eq!(
            source.url(),
            "http://127.0.0.1:37222/rooms/5/America&New_York"
        );
        assert_eq!(source.name(), "http");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let address = serve_once(
            "200 OK",
            r#"{"current_booking": {"id": "8", "name": "Sync", "user": "Ana", "start_time": 3600, "end_time": 7199}}"#,
        )
        .await;

        let payload = source(&address).fetch().await.unwrap();
        assert_eq!(payload.current_booking.id, "8");
        assert_eq!(payload.current_booking.user, "Ana");
        assert!(payload.first_upcoming_booking.id.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let address = serve_once("404 Not Found", r#"{"detail": "Room not found"}"#).await;

        let err = source(&address).fetch().await.unwrap_err();
        assert_eq!(err, FetchError::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_transport() {
        let address = serve_once("500 Internal Server Error", "{}").await;

        let err = source(&address).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let address = serve_once("200 OK", "<html>not json</html>").await;

        let err = source(&address).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(&format!("http://{addr}")).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
