use tracing::warn;

/// Delivery scope for relayed location updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayScope {
    /// Confine `updateLocationResponse` to the sender's room(s)
    #[default]
    Room,
    /// Broadcast to every connected party process-wide
    Global,
}

impl RelayScope {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "room" => Some(Self::Room),
            "global" => Some(Self::Global),
            _ => None,
        }
    }
}

/// Broker configuration, read once from the environment at startup
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub port: u16,
    /// Origins allowed by the CORS layer; empty allows none
    pub cors_whitelist: Vec<String>,
    pub relay_scope: RelayScope,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_whitelist: Vec::new(),
            relay_scope: RelayScope::default(),
        }
    }
}

impl BrokerConfig {
    /// Build the configuration from `SERVER_PORT`, `CORS_WHITELIST` and
    /// `RELAY_SCOPE`. Unparseable values fall back to defaults with a
    /// warning rather than aborting startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid SERVER_PORT, using default");
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        let cors_whitelist = std::env::var("CORS_WHITELIST")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let relay_scope = match std::env::var("RELAY_SCOPE") {
            Ok(raw) => RelayScope::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Invalid RELAY_SCOPE, using room scope");
                defaults.relay_scope
            }),
            Err(_) => defaults.relay_scope,
        };

        Self {
            port,
            cors_whitelist,
            relay_scope,
        }
    }
}
