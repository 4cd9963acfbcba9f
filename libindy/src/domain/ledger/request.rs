use std::{
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use indy_api_types::errors::prelude::*;
use serde::Serialize;

use super::constants::DEFAULT_PROTOCOL_VERSION;
use crate::domain::crypto::did::ShortDidValue;

static PROTOCOL_VERSION: AtomicUsize = AtomicUsize::new(DEFAULT_PROTOCOL_VERSION);
static LAST_REQ_ID: AtomicU64 = AtomicU64::new(0);

pub struct ProtocolVersion {}

impl ProtocolVersion {
    pub fn set(version: usize) {
        PROTOCOL_VERSION.store(version, Ordering::Relaxed);
    }

    pub fn get() -> usize {
        PROTOCOL_VERSION.load(Ordering::Relaxed)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Request<T> {
    pub req_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<ShortDidValue>,
    pub operation: T,
    pub protocol_version: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl<T: Serialize> Request<T> {
    pub fn new(
        req_id: u64,
        identifier: Option<ShortDidValue>,
        operation: T,
        protocol_version: usize,
    ) -> Request<T> {
        Request {
            req_id,
            identifier,
            operation,
            protocol_version,
            signature: None,
        }
    }

    pub fn build_request(identifier: Option<ShortDidValue>, operation: T) -> IndyResult<String> {
        let request = Request::new(get_req_id(), identifier, operation, ProtocolVersion::get());

        serde_json::to_string(&request)
            .to_indy(IndyErrorKind::InvalidState, "Cannot serialize Request")
    }
}

/// Nanosecond timestamp, bumped when two requests land on the same tick.
pub fn get_req_id() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos() as u64)
        .unwrap_or_default();

    let mut last = LAST_REQ_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_REQ_ID.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn req_ids_strictly_increase() {
        let ids: Vec<u64> = (0..100).map(|_| get_req_id()).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn build_request_shape() {
        let request = Request::build_request(
            Some(ShortDidValue("NcYxiDXkpYi6ov5FcYDi1e".to_string())),
            json!({"type": "105", "dest": "VsKV7grR1BUE29mG2Fm2kX"}),
        )
        .unwrap();
        let request: serde_json::Value = serde_json::from_str(&request).unwrap();

        assert_eq!(request["identifier"], "NcYxiDXkpYi6ov5FcYDi1e");
        assert_eq!(request["operation"]["type"], "105");
        assert!(request["reqId"].as_u64().unwrap() > 0);
        assert!(request["protocolVersion"].as_u64().is_some());
        assert!(request.get("signature").is_none());
    }
}
