//! Binance Error Mapping
//!
//! Translates HTTP status and `{code, msg}` bodies into `ExchangeError`.

use reqwest::StatusCode;

use super::responses::ApiErrorBody;
use crate::ports::ExchangeError;

/// Map a non-success response to an `ExchangeError`
pub fn map_api_error(status: StatusCode, body: &str) -> ExchangeError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
        return ExchangeError::RateLimited;
    }

    let Ok(ApiErrorBody { code, msg }) = serde_json::from_str::<ApiErrorBody>(body) else {
        return ExchangeError::Api {
            status: status.as_u16(),
            code: 0,
            message: if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body.to_string()
            },
        };
    };

    match code {
        -2018 | -2019 | -4164 => ExchangeError::InsufficientFunds(msg),
        -2010 if msg.to_ascii_lowercase().contains("balance") => ExchangeError::InsufficientFunds(msg),
        -1121 | -1122 => ExchangeError::InvalidSymbol(msg),
        -2011 | -2013 => ExchangeError::OrderNotFound(msg),
        -1022 | -2014 | -2015 => ExchangeError::Authentication(msg),
        -1003 => ExchangeError::RateLimited,
        _ => ExchangeError::Api {
            status: status.as_u16(),
            code,
            message: msg,
        },
    }
}

/// Map a transport failure
pub fn map_transport_error(err: reqwest::Error) -> ExchangeError {
    if err.is_timeout() {
        ExchangeError::Network(format!("request timed out: {}", err))
    } else if err.is_decode() {
        ExchangeError::Decode(err.to_string())
    } else {
        ExchangeError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(code: i64, msg: &str) -> String {
        serde_json::json!({ "code": code, "msg": msg }).to_string()
    }

    #[test]
    fn test_insufficient_margin() {
        let err = map_api_error(StatusCode::BAD_REQUEST, &body(-2019, "Margin is insufficient."));
        assert_eq!(err, ExchangeError::InsufficientFunds("Margin is insufficient.".into()));
    }

    #[test]
    fn test_new_order_rejected_balance() {
        let err = map_api_error(
            StatusCode::BAD_REQUEST,
            &body(-2010, "Account has insufficient balance for requested action."),
        );
        assert!(matches!(err, ExchangeError::InsufficientFunds(_)));
    }

    #[test]
    fn test_new_order_rejected_other_reason() {
        let err = map_api_error(StatusCode::BAD_REQUEST, &body(-2010, "Order would immediately trigger."));
        assert!(matches!(err, ExchangeError::Api { code: -2010, status: 400, .. }));
    }

    #[test]
    fn test_invalid_symbol() {
        let err = map_api_error(StatusCode::BAD_REQUEST, &body(-1121, "Invalid symbol."));
        assert!(matches!(err, ExchangeError::InvalidSymbol(_)));
    }

    #[test]
    fn test_unknown_order() {
        let err = map_api_error(StatusCode::BAD_REQUEST, &body(-2013, "Order does not exist."));
        assert!(matches!(err, ExchangeError::OrderNotFound(_)));
    }

    #[test]
    fn test_bad_api_key() {
        let err = map_api_error(StatusCode::UNAUTHORIZED, &body(-2015, "Invalid API-key, IP, or permissions for action."));
        assert!(matches!(err, ExchangeError::Authentication(_)));
    }

    #[test]
    fn test_rate_limited_by_status() {
        assert_eq!(map_api_error(StatusCode::TOO_MANY_REQUESTS, ""), ExchangeError::RateLimited);
        assert_eq!(
            map_api_error(StatusCode::from_u16(418).unwrap(), "banned"),
            ExchangeError::RateLimited
        );
    }

    #[test]
    fn test_non_json_body() {
        let err = map_api_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(
            err,
            ExchangeError::Api { status: 502, code: 0, message: "Bad Gateway".into() }
        );
    }
}
