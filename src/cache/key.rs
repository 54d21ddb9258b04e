//! Cache Key Module
//!
//! Derives the storage key a request's response is cached under.

use url::Url;

use crate::config::DEFAULT_STRIP_PARAMS;
use crate::models::Request;

/// Derives a key with the default [`KeyPolicy`].
pub fn derive_key(request: &Request, explicit: Option<&str>) -> String {
    KeyPolicy::default().derive(request, explicit)
}

// == Key Policy ==
/// Rules for turning a request into a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPolicy {
    /// Query parameters a transport injects to disambiguate requests
    strip_params: Vec<String>,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STRIP_PARAMS.iter().copied())
    }
}

impl KeyPolicy {
    pub fn new<I, S>(strip_params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strip_params: strip_params.into_iter().map(Into::into).collect(),
        }
    }

    // == Derive ==
    /// Returns `explicit` when given, otherwise `"{url}|{METHOD}|{body}"`.
    ///
    /// Requests that differ only in stripped query parameters or in the URL
    /// fragment share a key.
    pub fn derive(&self, request: &Request, explicit: Option<&str>) -> String {
        if let Some(key) = explicit.filter(|k| !k.is_empty()) {
            return key.to_string();
        }

        format!(
            "{}|{}|{}",
            self.normalize_url(&request.url),
            request.method,
            request.body.as_deref().unwrap_or("")
        )
    }

    // == Normalize ==
    /// Removes the fragment and the stripped query parameters from `raw`.
    pub fn normalize_url(&self, raw: &str) -> String {
        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            // Relative or otherwise unparsable targets
            Err(_) => return self.normalize_textually(raw),
        };

        url.set_fragment(None);

        if let Some(query) = url.query().map(str::to_string) {
            let kept = self.filter_query(&query);
            let total = query.split('&').filter(|pair| !pair.is_empty()).count();

            if kept.is_empty() {
                url.set_query(None);
            } else if kept.len() != total {
                // Original bytes of each pair, no form re-encoding
                let joined = kept.join("&");
                url.set_query(Some(&joined));
            }
        }

        url.to_string()
    }

    fn normalize_textually(&self, raw: &str) -> String {
        let without_fragment = raw.split('#').next().unwrap_or(raw);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => return without_fragment.to_string(),
        };

        let kept = self.filter_query(query);
        if kept.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, kept.join("&"))
        }
    }

    /// Non-empty `name=value` pairs of `query` whose name is not stripped.
    fn filter_query<'a>(&self, query: &'a str) -> Vec<&'a str> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| {
                let name = pair.split('=').next().unwrap_or(pair);
                !self.is_stripped(name)
            })
            .collect()
    }

    fn is_stripped(&self, name: &str) -> bool {
        self.strip_params.iter().any(|p| p == name)
    }
}
