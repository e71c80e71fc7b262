use alloy::transports::http::reqwest::{Client, Proxy};
use std::time::Duration;

use crate::interfaces::ClientError;
use crate::utils::logger::{LogLevel, Logger};

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for RPC traffic, routed through `proxy` when one is configured.
pub fn build_http_client(
    proxy: Option<&str>,
    current: usize,
    total: usize,
) -> Result<Client, ClientError> {
    let mut builder = Client::builder().timeout(RPC_TIMEOUT);

    if let Some(proxy_url) = proxy {
        let proxy = Proxy::all(proxy_url).map_err(|e| ClientError::Proxy(e.to_string()))?;
        builder = builder.proxy(proxy);
        Logger::log(
            current,
            total,
            &format!("Using proxy {}", redact_proxy(proxy_url)),
            LogLevel::Debug,
        );
    }

    builder.build().map_err(|e| ClientError::Proxy(e.to_string()))
}

/// Hide credentials before a proxy URL reaches the logs.
pub fn redact_proxy(proxy_url: &str) -> String {
    match url::Url::parse(proxy_url) {
        Ok(mut parsed) if !parsed.username().is_empty() => {
            let _ = parsed.set_username("***");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => "<unparseable proxy>".to_string(),
    }
}
