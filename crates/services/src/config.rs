use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_SNAPSHOT_KEY: &str = "user";
pub const DEFAULT_AUTH_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// Runtime settings for a `Tracker`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    /// `SQLite` URL for the session store; `None` keeps the snapshot in memory.
    pub db_url: Option<String>,
    /// Key the session snapshot is stored under.
    pub snapshot_key: String,
    /// Simulated network latency for sign-in and sign-up.
    pub auth_delay: Duration,
    /// Base for generated avatar URLs; `None` disables avatars.
    pub avatar_base_url: Option<Url>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_url: None,
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_owned(),
            auth_delay: DEFAULT_AUTH_DELAY,
            avatar_base_url: Url::parse(DEFAULT_AVATAR_BASE_URL).ok(),
        }
    }
}

impl TrackerConfig {
    /// Read `TRACKER_*` variables from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank or unparsable values keep the default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = read("TRACKER_DB_URL") {
            config.db_url = Some(normalize_sqlite_url(url));
        }
        if let Some(key) = read("TRACKER_SNAPSHOT_KEY") {
            config.snapshot_key = key;
        }
        if let Some(raw) = read("TRACKER_AUTH_DELAY_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => config.auth_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid TRACKER_AUTH_DELAY_MS"),
            }
        }
        if let Some(raw) = read("TRACKER_AVATAR_BASE_URL") {
            match Url::parse(&raw) {
                Ok(url) => config.avatar_base_url = Some(url),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid TRACKER_AVATAR_BASE_URL"),
            }
        }
        config
    }

    #[must_use]
    pub fn with_auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = delay;
        self
    }

    #[must_use]
    pub fn with_db_url(mut self, db_url: impl Into<String>) -> Self {
        self.db_url = Some(normalize_sqlite_url(db_url.into()));
        self
    }
}

fn normalize_sqlite_url(value: String) -> String {
    if value.starts_with("sqlite:") {
        value
    } else {
        format!("sqlite://{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = TrackerConfig::from_lookup(|_| None);
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.snapshot_key, "user");
        assert_eq!(config.auth_delay, Duration::from_secs(1));
        assert!(config.db_url.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = TrackerConfig::from_lookup(lookup(&[
            ("TRACKER_DB_URL", "tracker.sqlite3"),
            ("TRACKER_SNAPSHOT_KEY", "session"),
            ("TRACKER_AUTH_DELAY_MS", "25"),
            ("TRACKER_AVATAR_BASE_URL", "https://avatars.example.com/svg"),
        ]));
        assert_eq!(config.db_url.as_deref(), Some("sqlite://tracker.sqlite3"));
        assert_eq!(config.snapshot_key, "session");
        assert_eq!(config.auth_delay, Duration::from_millis(25));
        assert_eq!(
            config.avatar_base_url.unwrap().as_str(),
            "https://avatars.example.com/svg"
        );
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = TrackerConfig::from_lookup(lookup(&[
            ("TRACKER_SNAPSHOT_KEY", "   "),
            ("TRACKER_AUTH_DELAY_MS", "soon"),
            ("TRACKER_AVATAR_BASE_URL", "::nope::"),
        ]));
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn sqlite_urls_are_kept_verbatim() {
        let config = TrackerConfig::default().with_db_url("sqlite::memory:");
        assert_eq!(config.db_url.as_deref(), Some("sqlite::memory:"));
    }
}
