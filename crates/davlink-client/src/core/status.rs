//! Shared status-to-outcome mapping and response header lookup.

use crate::error::TransferError;

/// Map a response status onto the shared outcome taxonomy.
///
/// Any 2xx is success. The handful of statuses callers react to get their
/// own conditions; everything else carries the raw code.
pub fn process_status(status: u16, url: &str) -> Result<(), TransferError> {
    match status {
        200..=299 => Ok(()),
        400 => Err(TransferError::BadRequest {
            url: url.to_string(),
        }),
        401 => Err(TransferError::NotAuthorized {
            url: url.to_string(),
        }),
        404 => Err(TransferError::NotFound {
            url: url.to_string(),
        }),
        409 => Err(TransferError::Conflict {
            url: url.to_string(),
        }),
        code => Err(TransferError::Status {
            code,
            url: url.to_string(),
        }),
    }
}

/// Case-insensitive single-header lookup.
pub(crate) fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Entity length declared by the response, if parseable.
pub(crate) fn declared_length(headers: &[(String, String)]) -> Option<u64> {
    header_value(headers, "content-length").and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_hundreds_are_success() {
        assert!(process_status(200, "u").is_ok());
        assert!(process_status(201, "u").is_ok());
        assert!(process_status(204, "u").is_ok());
        assert!(process_status(299, "u").is_ok());
    }

    #[test]
    fn known_statuses_map_to_their_conditions() {
        assert!(matches!(
            process_status(400, "u"),
            Err(TransferError::BadRequest { .. })
        ));
        assert!(matches!(
            process_status(401, "u"),
            Err(TransferError::NotAuthorized { .. })
        ));
        assert!(matches!(
            process_status(404, "u"),
            Err(TransferError::NotFound { .. })
        ));
        assert!(matches!(
            process_status(409, "u"),
            Err(TransferError::Conflict { .. })
        ));
    }

    #[test]
    fn other_statuses_carry_the_code() {
        assert!(matches!(
            process_status(412, "u"),
            Err(TransferError::Status { code: 412, .. })
        ));
        assert!(matches!(
            process_status(503, "u"),
            Err(TransferError::Status { code: 503, .. })
        ));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let headers = vec![
            ("ETag".to_string(), "\"v1\"".to_string()),
            ("Content-Length".to_string(), "42".to_string()),
        ];
        assert_eq!(header_value(&headers, "etag"), Some("\"v1\""));
        assert_eq!(header_value(&headers, "ETAG"), Some("\"v1\""));
        assert_eq!(header_value(&headers, "x-missing"), None);
        assert_eq!(declared_length(&headers), Some(42));
    }

    #[test]
    fn unparseable_length_is_none() {
        let headers = vec![("Content-Length".to_string(), "many".to_string())];
        assert_eq!(declared_length(&headers), None);
    }
}
