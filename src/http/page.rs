use scraper::{Html, Selector};
use url::Url;

use crate::error::HttpError;

/// Pulls `src` attributes out of every `<script>` element of a page.
///
/// The page goes through a full HTML parse, so script bodies, comments, and
/// quoted attribute values are handled as a browser would. Character
/// references in `src` are decoded. Inline scripts (no `src`) are skipped and
/// sources come back in document order with duplicates kept.
#[derive(Debug, Clone)]
pub struct ScriptExtractor {
    script_src: Selector,
}

impl ScriptExtractor {
    /// # Errors
    ///
    /// Returns an error if the built-in selector fails to parse.
    pub fn new() -> Result<Self, HttpError> {
        let script_src =
            Selector::parse("script[src]").map_err(|err| HttpError::ScriptSelector {
                message: err.to_string(),
            })?;
        Ok(Self { script_src })
    }

    #[must_use]
    pub fn script_sources(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.script_src)
            .filter_map(|script| {
                let value = script.value().attr("src")?.trim();
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_owned())
                }
            })
            .collect()
    }
}

/// Resolves a script `src` against the base URL.
///
/// Relative sources are appended to the base verbatim, so
/// `https://host` + `/app.js` yields `https://host/app.js`. Absolute
/// `http(s)://` sources are used as-is and protocol-relative ones borrow the
/// base scheme.
#[must_use]
pub fn resolve_script_url(base_url: &str, src: &str) -> String {
    let lowered = src.get(..8).unwrap_or(src).to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return src.to_owned();
    }
    if src.starts_with("//") {
        let scheme = Url::parse(base_url)
            .map(|url| url.scheme().to_owned())
            .unwrap_or_else(|_err| "https".to_owned());
        return format!("{}:{}", scheme, src);
    }
    format!("{}{}", base_url, src)
}

/// Checks that the base URL is an absolute http(s) URL.
///
/// # Errors
///
/// Returns an error when the URL does not parse or uses another scheme.
pub fn validate_base_url(base_url: &str) -> Result<Url, HttpError> {
    let url = Url::parse(base_url).map_err(|err| HttpError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(HttpError::UnsupportedScheme {
            url: base_url.to_owned(),
        }),
    }
}
