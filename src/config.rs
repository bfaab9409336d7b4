//! Build-time Configuration
//!
//! The board is a static bundle, so settings are baked in when it is built:
//!
//! - `KANBAN_DATABASE_URL`: realtime database root, e.g.
//!   `https://my-board-default-rtdb.firebaseio.com`. Unset runs the board
//!   against an in-memory store.
//! - `KANBAN_DATABASE_AUTH`: optional token appended as `?auth=`
//! - `KANBAN_LOG_LEVEL`: `error` .. `trace`, default `info`

use log::LevelFilter;
use task_sync::Backoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub database_url: String,
    pub auth: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` means demo mode
    pub remote: Option<RemoteConfig>,
    pub log_level: LevelFilter,
    pub backoff: Backoff,
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("KANBAN_DATABASE_URL"),
            option_env!("KANBAN_DATABASE_AUTH"),
            option_env!("KANBAN_LOG_LEVEL"),
        )
    }

    pub fn from_values(
        database_url: Option<&str>,
        auth: Option<&str>,
        log_level: Option<&str>,
    ) -> Self {
        let remote = non_empty(database_url).map(|url| RemoteConfig {
            database_url: url.trim_end_matches('/').to_string(),
            auth: non_empty(auth).map(str::to_string),
        });
        Self {
            remote,
            log_level: log_level
                .map(console_logger::parse_level)
                .unwrap_or(LevelFilter::Info),
            backoff: Backoff::default(),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.remote.is_none()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
