use crate::ServiceError;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

/// Create a JSON request, parse the response.
/// Throws error on non OK status code.
pub async fn send_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: HeaderMap,
) -> Result<R, ServiceError> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    if response.status().is_client_error() || response.status().is_server_error() {
        Err(ServiceError::StatusCode(
            response.status(),
            response.text().await.unwrap_or_default(),
        ))
    } else {
        Ok(response.json::<R>().await?)
    }
}

/// Create a JSON request whose error replies still carry a typed body.
/// The body is parsed regardless of status; a non OK status only becomes an
/// error when the body cannot be parsed.
pub async fn send_json_lenient<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: HeaderMap,
    provider: &'static str,
) -> Result<R, ServiceError> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<R>(&body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(ServiceError::StatusCode(status, body)),
        Err(error) => Err(ServiceError::Invariant(
            provider,
            format!("Failed to parse response body: {error}"),
        )),
    }
}

/// Convert user supplied headers into a header map, rejecting invalid names
/// or values.
pub fn extra_headers(
    provider: &'static str,
    headers: &HashMap<String, String>,
) -> Result<HeaderMap, ServiceError> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
            ServiceError::InvalidInput(format!(
                "Invalid {provider} header name '{key}': {error}"
            ))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|error| {
            ServiceError::InvalidInput(format!(
                "Invalid {provider} header value for '{key}': {error}"
            ))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
