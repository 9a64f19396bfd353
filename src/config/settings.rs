use serde::Deserialize;

use crate::session::DEFAULT_OUTBOUND_CAPACITY;

/// Top-level configuration settings for the relay.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub origins: OriginSettings,
    pub log: LogSettings,
}

/// Deployment mode. Decides the default bind address.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    Dev,
    Prod,
}

/// Configuration settings for the listening socket and the WebSocket endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub mode: DeployMode,
    /// Overrides the mode-derived bind host when set.
    pub host: Option<String>,
    pub port: u16,
    pub path: String,
    pub max_message_bytes: usize,
    /// Frames queued per connection before further sends to it fail.
    pub outbound_queue_capacity: usize,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        let host = match (&self.host, self.mode) {
            (Some(host), _) => host.as_str(),
            (None, DeployMode::Dev) => "127.0.0.1",
            (None, DeployMode::Prod) => "0.0.0.0",
        };
        format!("{}:{}", host, self.port)
    }
}

/// Which browser origins may open a connection.
///
/// `exact_origins` are matched verbatim; this is where a development origin
/// such as `http://localhost:5173` belongs.
#[derive(Debug, Deserialize, Clone)]
pub struct OriginSettings {
    pub exact_origins: Vec<String>,
    pub allowed_hosts: Vec<String>,
    pub allowed_host_suffixes: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub origins: Option<PartialOriginSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub mode: Option<DeployMode>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub max_message_bytes: Option<usize>,
    pub outbound_queue_capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialOriginSettings {
    pub exact_origins: Option<Vec<String>>,
    pub allowed_hosts: Option<Vec<String>>,
    pub allowed_host_suffixes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                mode: DeployMode::Prod,
                host: None,
                port: 8080,
                path: "/signaling".to_string(),
                max_message_bytes: 1024,
                outbound_queue_capacity: DEFAULT_OUTBOUND_CAPACITY,
            },
            origins: OriginSettings {
                exact_origins: Vec::new(),
                allowed_hosts: vec!["gridunlockapp.com".to_string()],
                allowed_host_suffixes: vec![".gridunlock-org.pages.dev".to_string()],
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Overlays whatever was provided onto `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let origins = self.origins.unwrap_or_default();
        let log = self.log.unwrap_or_default();

        Settings {
            server: ServerSettings {
                mode: server.mode.unwrap_or(default.server.mode),
                host: server.host.or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
                path: server.path.unwrap_or(default.server.path),
                max_message_bytes: server
                    .max_message_bytes
                    .unwrap_or(default.server.max_message_bytes),
                outbound_queue_capacity: server
                    .outbound_queue_capacity
                    .unwrap_or(default.server.outbound_queue_capacity),
            },
            origins: OriginSettings {
                exact_origins: origins
                    .exact_origins
                    .unwrap_or(default.origins.exact_origins),
                allowed_hosts: origins
                    .allowed_hosts
                    .unwrap_or(default.origins.allowed_hosts),
                allowed_host_suffixes: origins
                    .allowed_host_suffixes
                    .unwrap_or(default.origins.allowed_host_suffixes),
            },
            log: LogSettings {
                level: log.level.unwrap_or(default.log.level),
            },
        }
    }
}
