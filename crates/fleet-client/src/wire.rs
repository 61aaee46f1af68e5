//! Fleet response envelopes and status handling
//!
//! Fleet wraps single objects as `{"item": {...}}`. A 404 on read means the
//! package policy is gone, which is an answer rather than a failure.

use crate::error::ClientError;
use fleet_core::RemotePolicy;
use serde::{Deserialize, Serialize};

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    pub item: T,
}

/// Raw response as handed over by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn item<T: Serialize>(item: &T) -> Result<Self, ClientError> {
        let body = serde_json::to_string(&ItemResponse { item })
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(Self::new(STATUS_OK, body))
    }
}

pub fn decode_create(response: &Response) -> Result<RemotePolicy, ClientError> {
    match response.status {
        STATUS_OK => decode_item(&response.body),
        status => Err(ClientError::unexpected(status, response.body.clone())),
    }
}

pub fn decode_read(response: &Response) -> Result<Option<RemotePolicy>, ClientError> {
    match response.status {
        STATUS_OK => decode_item(&response.body).map(Some),
        STATUS_NOT_FOUND => Ok(None),
        status => Err(ClientError::unexpected(status, response.body.clone())),
    }
}

pub fn decode_delete(response: &Response) -> Result<(), ClientError> {
    match response.status {
        STATUS_OK => Ok(()),
        status => Err(ClientError::unexpected(status, response.body.clone())),
    }
}

fn decode_item(body: &str) -> Result<RemotePolicy, ClientError> {
    serde_json::from_str::<ItemResponse<RemotePolicy>>(body)
        .map(|envelope| envelope.item)
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"{"item":{"id":"pp-1","name":"p","package":{"name":"winlog","version":"1.10.0"},"policy_id":"agent-1","inputs":{}}}"#;

    #[test]
    fn test_read_ok() {
        let policy = decode_read(&Response::new(200, ITEM)).unwrap().unwrap();
        assert_eq!(policy.id, "pp-1");
        assert!(policy.inputs.is_empty());
    }

    #[test]
    fn test_read_not_found_is_absence() {
        let body = r#"{"statusCode":404,"error":"Not Found"}"#;
        assert_eq!(decode_read(&Response::new(404, body)).unwrap(), None);
    }

    #[test]
    fn test_unexpected_status_keeps_body() {
        let err = decode_create(&Response::new(409, "conflict")).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected status code from server: got HTTP 409");
        assert_eq!(err.detail(), Some("conflict"));

        // Only reads treat 404 as absence.
        assert!(decode_delete(&Response::new(404, "")).is_err());
        assert!(decode_delete(&Response::new(200, "{}")).is_ok());
    }

    #[test]
    fn test_bad_body() {
        assert!(matches!(
            decode_create(&Response::new(200, "{}")),
            Err(ClientError::Decode(_))
        ));
    }
}
