use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::error::RequestError;

/// Success bodies arrive either bare or wrapped as `{"Result": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        #[serde(rename = "Result")]
        result: T,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { result } => result,
            Envelope::Bare(value) => value,
        }
    }
}

/// Decodes a success body, unwrapping the envelope if there is one.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, RequestError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| RequestError::decode(format!("Unexpected response from server: {}", e)))
}

/// `true` for bodies that carry no value at all.
pub fn is_empty_body(body: &str) -> bool {
    let body = body.trim();
    body.is_empty() || body == "null" || body == "{}"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::kyc::KycSubmission;
    use serde_json::json;

    #[test]
    fn wrapped_and_bare_bodies_decode_alike() {
        let bare = json!({"id": 1, "status": "pending"}).to_string();
        let wrapped = json!({"Result": {"id": 1, "status": "pending"}}).to_string();
        let a: KycSubmission = decode_body(&bare).unwrap();
        let b: KycSubmission = decode_body(&wrapped).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn lists_decode_in_either_shape() {
        let ids: Vec<u64> = decode_body("[1,2]").unwrap();
        assert_eq!(ids, vec![1, 2]);
        let ids: Vec<u64> = decode_body(r#"{"Result":[3]}"#).unwrap();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_body::<KycSubmission>("<html>").unwrap_err();
        assert_eq!(err.kind, crate::api::error::RequestErrorKind::Decode);
    }
}
