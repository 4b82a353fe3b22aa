use crate::session::ProgressSchedule;
use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    time::Duration,
};

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/credentials.json";
pub const DEFAULT_PORTAL_URL: &str = "http://127.0.0.1:5000/api/attendance";
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub data_path: PathBuf,
    pub portal_url: String,
    pub request_timeout: Duration,
    pub progress: ProgressSchedule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            progress: ProgressSchedule::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());

        Self {
            host: lookup("HOST")
                .and_then(|value| value.trim().parse::<IpAddr>().ok())
                .unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|value| value.trim().parse::<u16>().ok())
                .unwrap_or(defaults.port),
            data_path: lookup("APP_DATA_PATH")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            portal_url: lookup("PORTAL_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.portal_url),
            request_timeout: parsed("PORTAL_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            progress: ProgressSchedule {
                logging_in: parse_millis(parsed("PROGRESS_LOGGING_IN_MS"))
                    .unwrap_or(defaults.progress.logging_in),
                analyzing: parse_millis(parsed("PROGRESS_ANALYZING_MS"))
                    .unwrap_or(defaults.progress.analyzing),
            },
        }
    }
}

fn parse_millis(value: Option<u64>) -> Option<Duration> {
    value.map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/credentials.json"));
        assert_eq!(config.portal_url, DEFAULT_PORTAL_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.progress, ProgressSchedule::default());
    }

    #[test]
    fn env_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9191"),
            ("APP_DATA_PATH", "/tmp/creds.json"),
            ("PORTAL_URL", "http://portal.test/api/attendance"),
            ("PORTAL_TIMEOUT_SECS", "5"),
            ("PROGRESS_LOGGING_IN_MS", "50"),
            ("PROGRESS_ANALYZING_MS", "150"),
        ]));
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 9191);
        assert_eq!(config.data_path, PathBuf::from("/tmp/creds.json"));
        assert_eq!(config.portal_url, "http://portal.test/api/attendance");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.progress.logging_in, Duration::from_millis(50));
        assert_eq!(config.progress.analyzing, Duration::from_millis(150));
    }

    #[test]
    fn garbage_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "localhost:80"),
            ("PORT", "http"),
            ("PORTAL_TIMEOUT_SECS", "0"),
            ("PROGRESS_ANALYZING_MS", "-3"),
        ]));
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.progress.analyzing, Duration::from_secs(6));
    }
}
