//! Blocking HTTP client for the booking API.
//!
//! Performs one `GET {base}/bookings/get-by-confirmation-code/{code}` per
//! lookup and decodes the booking, room and user records. Two response
//! shapes are accepted: the records side by side at the top level, or the
//! room and user nested inside the booking object.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::model::{BookingDetails, BookingRecord, RoomRecord, UserRecord};
use crate::{BookingSource, Error, ReceiptConfig, Result};

pub struct HttpBookingClient {
    client: Client,
    base_url: url::Url,
    user_agent: String,
    headers: HashMap<String, String>,
    timeout_ms: u64,
}

impl HttpBookingClient {
    pub fn new(config: &ReceiptConfig) -> Result<Self> {
        let base_url = url::Url::parse(&config.api_base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "API base URL cannot carry a path: {}",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            user_agent: config.user_agent.clone(),
            headers: config.headers.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// URL of the lookup for `code`; the code is a single path segment
    pub fn lookup_url(&self, code: &str) -> Result<url::Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::ConfigError("API base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["bookings", "get-by-confirmation-code", code]);
        Ok(url)
    }
}

impl BookingSource for HttpBookingClient {
    fn get_booking_by_confirmation_code(&self, code: &str) -> Result<BookingDetails> {
        let url = self.lookup_url(code)?;
        debug!("resolving booking {} via {}", code, url);

        let mut request = self
            .client
            .get(url.clone())
            .header("User-Agent", self.user_agent.clone())
            .header("Accept", "application/json");
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let resp = request.send().map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(self.timeout_ms)
            } else {
                Error::NetworkError(format!("Failed to fetch {}: {}", url, e))
            }
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(code.to_string()));
        }
        if !status.is_success() {
            return Err(Error::NetworkError(format!("{} returned HTTP {}", url, status)));
        }

        let body = resp
            .text()
            .map_err(|e| Error::NetworkError(format!("Failed to read response body: {}", e)))?;
        decode_booking(&body)
    }
}

#[derive(Deserialize)]
struct BookingResponse {
    booking: Option<BookingPayload>,
    room: Option<RoomRecord>,
    user: Option<UserRecord>,
}

#[derive(Deserialize)]
struct BookingPayload {
    #[serde(flatten)]
    record: BookingRecord,
    room: Option<RoomRecord>,
    user: Option<UserRecord>,
}

/// Decode a lookup response body into complete booking details
pub(crate) fn decode_booking(body: &str) -> Result<BookingDetails> {
    let resp: BookingResponse =
        serde_json::from_str(body).map_err(|e| Error::DecodeError(e.to_string()))?;

    let payload = resp
        .booking
        .ok_or_else(|| Error::DecodeError("response has no booking".into()))?;
    let room = resp
        .room
        .or(payload.room)
        .ok_or_else(|| Error::InvalidBooking("booking has no room".into()))?;
    let user = resp
        .user
        .or(payload.user)
        .ok_or_else(|| Error::InvalidBooking("booking has no user".into()))?;

    Ok(BookingDetails { booking: payload.record, room, user })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKING: &str = r#""confirmationCode":"RB-2024-001234","checkInDate":"2024-12-15","checkOutDate":"2024-12-18","adults":2,"children":1"#;
    const ROOM: &str = r#"{"roomType":"Deluxe","nightlyPrice":"153.00"}"#;
    const USER: &str = r#"{"name":"Ana Lima","email":"ana@example.com","phoneNumber":"555-0100"}"#;

    #[test]
    fn decodes_flat_response() {
        let body = format!(r#"{{"booking":{{{}}},"room":{},"user":{}}}"#, BOOKING, ROOM, USER);
        let details = decode_booking(&body).unwrap();
        assert_eq!(details.booking.confirmation_code, "RB-2024-001234");
        assert_eq!(details.room.room_type, "Deluxe");
        assert_eq!(details.user.name, "Ana Lima");
    }

    #[test]
    fn decodes_nested_response() {
        let body = format!(
            r#"{{"statusCode":200,"message":"successful","booking":{{{},"room":{},"user":{}}}}}"#,
            BOOKING, ROOM, USER
        );
        let details = decode_booking(&body).unwrap();
        assert_eq!(details.booking.children, 1);
        assert_eq!(details.user.email, "ana@example.com");
    }

    #[test]
    fn missing_user_is_an_error_not_a_partial_result() {
        let body = format!(r#"{{"booking":{{{}}},"room":{}}}"#, BOOKING, ROOM);
        assert!(matches!(decode_booking(&body), Err(Error::InvalidBooking(_))));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode_booking("<html>"), Err(Error::DecodeError(_))));
        assert!(matches!(decode_booking("{}"), Err(Error::DecodeError(_))));
    }

    #[test]
    fn lookup_url_encodes_code_as_one_segment() {
        let cfg =
            ReceiptConfig { api_base_url: "http://api.test/v1/".into(), ..Default::default() };
        let client = HttpBookingClient::new(&cfg).unwrap();
        let url = client.lookup_url("RB/1 2").unwrap();
        assert_eq!(url.as_str(), "http://api.test/v1/bookings/get-by-confirmation-code/RB%2F1%202");
    }
}
