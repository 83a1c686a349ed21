//! Deterministic cache keys.
//!
//! Parameters are sorted by name before the key is built, so two requests
//! that differ only in parameter order share one cache entry.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a resource read: `resource?a=1&b=2`
    pub fn for_resource<I, K, V>(resource: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let sorted: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (escape(k.as_ref()), escape(v.as_ref())))
            .collect();

        if sorted.is_empty() {
            return Self(resource.to_string());
        }

        let query = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        Self(format!("{resource}?{query}"))
    }

    /// Key identifying an in-flight request: method, resource key and body.
    ///
    /// `serde_json` objects serialize with sorted keys, so the body part is
    /// canonical as well.
    pub fn for_request<I, K, V>(method: &str, resource: &str, params: I, body: Option<&Value>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let target = Self::for_resource(resource, params);
        match body {
            Some(body) => Self(format!("{method} {target}#{body}")),
            None => Self(format!("{method} {target}")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '#' => out.push_str("%23"),
            _ => out.push(ch),
        }
    }
    out
}
