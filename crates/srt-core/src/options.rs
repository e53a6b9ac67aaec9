//! Socket option set derived from an `srt://` address

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Option set applied to both sockets of a connection
///
/// Keys are lower-cased SRT option names (`latency`, `passphrase`,
/// `streamid`, ...). Values are kept as text and interpreted by the socket
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketOptions {
    entries: BTreeMap<String, String>,
}

impl SocketOptions {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive options from the query component of an address
    ///
    /// Never fails. A repeated key keeps its last value.
    pub fn from_uri(uri: &Url) -> Self {
        let mut options = Self::new();
        for (key, value) in uri.query_pairs() {
            options.set(&key, value.into_owned());
        }
        options
    }

    /// Set an option, replacing any previous value
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_ascii_lowercase(), value.into());
    }

    /// Raw value of an option
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterate over options in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no options are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer these options over `defaults`; our values win on conflict
    pub fn merged_over(&self, defaults: &SocketOptions) -> SocketOptions {
        let mut merged = defaults.clone();
        for (key, value) in &self.entries {
            merged.entries.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Receiver/sender latency (`latency`, in milliseconds)
    pub fn latency(&self) -> Option<Duration> {
        self.get("latency")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
    }

    /// Encryption passphrase
    pub fn passphrase(&self) -> Option<&str> {
        self.get("passphrase")
    }

    /// Stream identifier (`streamid`)
    pub fn stream_id(&self) -> Option<&str> {
        self.get("streamid")
    }

    /// Connection mode (`caller`, `listener`, `rendezvous`)
    pub fn mode(&self) -> Option<&str> {
        self.get("mode")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_from_uri_without_query() {
        let options = SocketOptions::from_uri(&parse("srt://127.0.0.1:9000"));
        assert!(options.is_empty());
    }

    #[test]
    fn test_from_uri_typed_accessors() {
        let uri = parse(
            "srt://example.com:9000?latency=250&passphrase=secret%20pw&streamid=live/cam1&mode=caller",
        );
        let options = SocketOptions::from_uri(&uri);

        assert_eq!(options.len(), 4);
        assert_eq!(options.latency(), Some(Duration::from_millis(250)));
        assert_eq!(options.passphrase(), Some("secret pw"));
        assert_eq!(options.stream_id(), Some("live/cam1"));
        assert_eq!(options.mode(), Some("caller"));
    }

    #[test]
    fn test_keys_are_case_insensitive_and_last_wins() {
        let uri = parse("srt://h:1?Latency=100&latency=200");
        let options = SocketOptions::from_uri(&uri);
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("LATENCY"), Some("200"));
    }

    #[test]
    fn test_unparseable_latency_is_ignored() {
        let options = SocketOptions::from_uri(&parse("srt://h:1?latency=fast"));
        assert_eq!(options.latency(), None);
        assert_eq!(options.get("latency"), Some("fast"));
    }

    #[test]
    fn test_merged_over_defaults() {
        let mut defaults = SocketOptions::new();
        defaults.set("latency", "120");
        defaults.set("maxbw", "0");

        let uri_options = SocketOptions::from_uri(&parse("srt://h:1?latency=500"));
        let merged = uri_options.merged_over(&defaults);

        assert_eq!(merged.latency(), Some(Duration::from_millis(500)));
        assert_eq!(merged.get("maxbw"), Some("0"));
        assert_eq!(merged.len(), 2);
    }
}
