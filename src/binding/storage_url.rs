//! URL-to-path conversion
//!
//! Resource patterns may be given as full storage URLs. The resolver hands
//! every pattern to a [`UrlPathConverter`] first; a converter that recognizes
//! the URL returns the equivalent `container[/item]` string.
//!
//! The default [`StorageUrlConverter`] knows two layouts, both configurable:
//!
//! ```text
//! https://<account><host_suffix>/<container>/<item...>     (account-per-host)
//! http://<path_style_host>/<account>/<container>/<item...> (emulator, path-style)
//! ```
//!
//! Any closure `Fn(&str) -> Option<String>` is also a converter.
//!
//! Converter output is template syntax: `{name}` is a parameter and `{{`/`}}`
//! are literal braces. Percent-encoded braces (`%7B`, `%7D`) therefore come
//! out doubled, while bare `{name}` placeholders in the URL path survive.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::{BindingConfig, StorageConventions};

/// Pure `url → optional container[/item]` function
///
/// The returned string is parsed as a template, so literal braces must be
/// doubled.
pub trait UrlPathConverter: Send + Sync {
    fn convert(&self, candidate: &str) -> Option<String>;
}

impl<F> UrlPathConverter for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn convert(&self, candidate: &str) -> Option<String> {
        self(candidate)
    }
}

/// Storage URL converter driven by [`StorageConventions`]
#[derive(Debug, Clone)]
pub struct StorageUrlConverter {
    host_suffixes: Vec<String>,
    path_style_hosts: Vec<String>,
}

impl Default for StorageUrlConverter {
    fn default() -> Self {
        Self::new(&StorageConventions::default())
    }
}

impl StorageUrlConverter {
    pub fn new(conventions: &StorageConventions) -> Self {
        Self {
            host_suffixes: conventions
                .host_suffixes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            path_style_hosts: conventions
                .path_style_hosts
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &BindingConfig) -> Self {
        Self::new(&config.storage)
    }

    /// Number of leading path segments before the container name, if the host is known
    fn account_segments(&self, url: &Url) -> Option<usize> {
        let host = url.host_str()?.to_ascii_lowercase();

        if self
            .host_suffixes
            .iter()
            .any(|suffix| host.len() > suffix.len() && host.ends_with(suffix.as_str()))
        {
            return Some(0);
        }

        let host_port = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };
        if self.path_style_hosts.iter().any(|h| *h == host_port) {
            return Some(1);
        }

        None
    }
}

impl UrlPathConverter for StorageUrlConverter {
    fn convert(&self, candidate: &str) -> Option<String> {
        // Cheap pre-check: plain `container/item` patterns never parse as URLs
        if !candidate.contains("://") {
            return None;
        }

        // `%7B`/`%7D` written in the pattern are literal braces; `url` encodes
        // bare `{`/`}` the same way, so mark the written ones before parsing
        let url = Url::parse(&double_encoded_braces(candidate)).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let skip = self.account_segments(&url)?;
        let segments: Vec<&str> = url.path_segments()?.skip(skip).collect();

        let (container, item) = segments.split_first()?;
        let container = decode_segment(container)?;
        if container.is_empty() || container.contains('/') {
            return None;
        }

        let item = decode_segment(&item.join("/"))?;
        if item.is_empty() {
            Some(container)
        } else {
            Some(format!("{}/{}", container, item))
        }
    }
}

/// Rewrite `%7B` as `%7B%7B` and `%7D` as `%7D%7D`, so they decode to the
/// `{{`/`}}` escapes of template syntax
fn double_encoded_braces(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut rest = candidate;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let escape = rest.get(pos..pos + 3).unwrap_or("%");
        if escape.eq_ignore_ascii_case("%7B") || escape.eq_ignore_ascii_case("%7D") {
            out.push_str(escape);
            out.push_str(escape);
            rest = &rest[pos + 3..];
        } else {
            out.push('%');
            rest = &rest[pos + 1..];
        }
    }

    out.push_str(rest);
    out
}

/// Percent-decode one path part; `None` when the bytes are not UTF-8
fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(candidate: &str) -> Option<String> {
        StorageUrlConverter::default().convert(candidate)
    }

    #[test]
    fn account_host_url() {
        assert_eq!(
            convert("https://acct.blob.core.windows.net/mycontainer/dir/report.txt").as_deref(),
            Some("mycontainer/dir/report.txt")
        );
    }

    #[test]
    fn account_host_container_only() {
        assert_eq!(
            convert("https://acct.blob.core.windows.net/mycontainer").as_deref(),
            Some("mycontainer")
        );
        assert_eq!(
            convert("https://acct.blob.core.windows.net/mycontainer/").as_deref(),
            Some("mycontainer")
        );
    }

    #[test]
    fn host_match_is_case_insensitive() {
        assert_eq!(
            convert("https://ACCT.Blob.Core.Windows.Net/c1c/x").as_deref(),
            Some("c1c/x")
        );
    }

    #[test]
    fn path_style_url() {
        assert_eq!(
            convert("http://127.0.0.1:10000/devstoreaccount1/input/a.txt").as_deref(),
            Some("input/a.txt")
        );
    }

    #[test]
    fn path_style_requires_port_match() {
        assert!(convert("http://127.0.0.1:9999/devstoreaccount1/input/a.txt").is_none());
    }

    #[test]
    fn query_string_ignored() {
        assert_eq!(
            convert("https://acct.blob.core.windows.net/c1c/a.txt?sv=2020&sig=abc").as_deref(),
            Some("c1c/a.txt")
        );
    }

    #[test]
    fn percent_escapes_decoded() {
        assert_eq!(
            convert("https://acct.blob.core.windows.net/c1c/my%20file.txt").as_deref(),
            Some("c1c/my file.txt")
        );
    }

    #[test]
    fn template_braces_survive() {
        assert_eq!(
            convert("https://acct.blob.core.windows.net/{c}/{name}.txt").as_deref(),
            Some("{c}/{name}.txt")
        );
    }

    #[test]
    fn unknown_host_or_scheme() {
        assert!(convert("https://example.com/c1c/a.txt").is_none());
        assert!(convert("ftp://acct.blob.core.windows.net/c1c/a.txt").is_none());
        assert!(convert("https://blob.core.windows.net/c1c/a.txt").is_none());
    }

    #[test]
    fn not_a_url() {
        assert!(convert("mycontainer/report.txt").is_none());
        assert!(convert("{url}").is_none());
        assert!(convert("https://acct.blob.core.windows.net/").is_none());
    }

    #[test]
    fn custom_conventions() {
        let converter = StorageUrlConverter::new(&StorageConventions {
            host_suffixes: vec![".store.example.test".into()],
            path_style_hosts: vec![],
        });
        assert_eq!(
            converter
                .convert("https://a.store.example.test/box/item")
                .as_deref(),
            Some("box/item")
        );
        assert!(converter
            .convert("http://127.0.0.1:10000/acct/box/item")
            .is_none());
    }

    #[test]
    fn closure_converter() {
        let converter = |candidate: &str| candidate.strip_prefix("mem://").map(str::to_string);
        assert_eq!(converter.convert("mem://c1c/x").as_deref(), Some("c1c/x"));
        assert!(converter.convert("c1c/x").is_none());
    }

    #[test]
    fn encoded_braces_stay_literal() {
        assert_eq!(
            convert("https://acct.blob.core.windows.net/input/a%7Bb%7D.txt").as_deref(),
            Some("input/a{{b}}.txt")
        );
        assert_eq!(
            convert("https://acct.blob.core.windows.net/input/a%7d.txt").as_deref(),
            Some("input/a}}.txt")
        );
    }

    #[test]
    fn encoded_separator_in_container_rejected() {
        assert!(convert("https://acct.blob.core.windows.net/in%2Fput/x.txt").is_none());
        assert_eq!(
            convert("https://acct.blob.core.windows.net/input/a%2Fb.txt").as_deref(),
            Some("input/a/b.txt")
        );
    }

    #[test]
    fn double_encoded_braces_only_touches_brace_escapes() {
        assert_eq!(double_encoded_braces("a%7Bb%7d"), "a%7B%7Bb%7d%7d");
        assert_eq!(double_encoded_braces("a%20b%"), "a%20b%");
        assert_eq!(double_encoded_braces("{x}"), "{x}");
    }

    #[test]
    fn decode_segment_requires_utf8() {
        assert_eq!(decode_segment("a%2Fb").as_deref(), Some("a/b"));
        assert_eq!(decode_segment("caf%C3%A9").as_deref(), Some("caf\u{e9}"));
        assert!(decode_segment("%ff").is_none());
    }
}
