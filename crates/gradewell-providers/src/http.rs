//! HTTP plumbing shared by the providers.

use std::time::Duration;

use crate::error::ProviderError;

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn send_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

/// Map non-success statuses onto `ProviderError`.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 401 || status == 403 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::AuthenticationFailed(body));
    }
    if status == 404 {
        return Err(ProviderError::ModelNotFound(model.to_string()));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::ApiError {
            status,
            message: body,
        });
    }
    Ok(response)
}

pub(crate) fn parse_error(e: reqwest::Error) -> ProviderError {
    ProviderError::InvalidResponse(format!("failed to parse response: {e}"))
}
