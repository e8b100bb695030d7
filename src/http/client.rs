use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};

use crate::{
    args::{DEFAULT_USER_AGENT, RunArgs},
    error::{AppError, AppResult, HttpError, ValidationError},
};

/// Client knobs pulled out of the CLI args so tests and the runner share
/// one constructor.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: std::time::Duration,
    pub connect_timeout: std::time::Duration,
    pub headers: Vec<(String, String)>,
    pub no_ua: bool,
    pub authorized: bool,
    pub insecure: bool,
}

impl From<&RunArgs> for HttpSettings {
    fn from(args: &RunArgs) -> Self {
        Self {
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            headers: args.headers.clone(),
            no_ua: args.no_ua,
            authorized: args.authorized,
            insecure: args.insecure,
        }
    }
}

/// Builds the client shared by every virtual user.
///
/// # Errors
///
/// Returns an error when a header is malformed, the default User-Agent is
/// disabled without `--authorized`, or the client cannot be built.
pub fn build_client(settings: &HttpSettings) -> AppResult<Client> {
    if settings.no_ua && !settings.authorized {
        return Err(AppError::validation(ValidationError::NoUaRequiresAuthorized));
    }

    let mut client_builder = Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout);

    if !settings.no_ua {
        client_builder = client_builder.user_agent(DEFAULT_USER_AGENT);
    }

    if !settings.headers.is_empty() {
        let mut headers = HeaderMap::new();
        for (key, value) in &settings.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderName {
                    name: key.clone(),
                    source: err,
                })
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderValue {
                    name: key.clone(),
                    source: err,
                })
            })?;
            headers.append(name, value);
        }
        client_builder = client_builder.default_headers(headers);
    }

    if settings.insecure {
        client_builder = client_builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    client_builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
