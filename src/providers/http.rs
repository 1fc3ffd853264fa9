use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::time::Duration;
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::ConfigError;

pub(crate) const USER_AGENT: &str = concat!("autoposter/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(conn: &ConnectionConfig) -> Result<reqwest::Client, ConfigError> {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(conn.connect_timeout)
        .timeout(conn.timeout);

    if let Some(proxy_url) = &conn.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if conn.enable_multiplexing {
        builder = builder.http2_adaptive_window(true);
    } else {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    }

    Ok(builder.default_headers(headers).build()?)
}

/// `base` + `path`, tolerating a trailing slash (or path prefix) on `base`.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|_| ConfigError::InvalidValue {
        key: "base_url",
        value: joined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let base = Url::parse("http://127.0.0.1:9000/proxy").unwrap();
        assert_eq!(
            endpoint(&base, "/v1/messages").unwrap().as_str(),
            "http://127.0.0.1:9000/proxy/v1/messages"
        );

        let root = Url::parse("https://api.openai.com/").unwrap();
        assert_eq!(
            endpoint(&root, "v1/images/edits").unwrap().as_str(),
            "https://api.openai.com/v1/images/edits"
        );
    }
}
