use crate::error::NexusResult;
use crate::persona::Persona;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable holding the backend base URL.
pub const ENV_API_URL: &str = "NEXUS_API_URL";
/// Environment variable holding the user id sent with every request.
pub const ENV_USER_ID: &str = "NEXUS_USER_ID";
/// Environment variable holding the Scribe (router) agent id.
pub const ENV_AGENT_ROUTER: &str = "NEXUS_AGENT_ID_ROUTER";
/// Environment variable holding the Debater agent id.
pub const ENV_AGENT_DEBATER: &str = "NEXUS_AGENT_ID_DEBATER";
/// Environment variable holding the Coach agent id.
pub const ENV_AGENT_COACH: &str = "NEXUS_AGENT_ID_COACH";

/// External agent identifiers, one per persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIds {
    /// Agent behind the Scribe persona.
    #[serde(default)]
    pub router: String,
    /// Agent behind the Debater persona.
    #[serde(default)]
    pub debater: String,
    /// Agent behind the Coach persona.
    #[serde(default)]
    pub coach: String,
}

/// Startup configuration, read once.
///
/// Every value is fail-soft: a missing entry is an empty string, never an
/// error. A persona whose agent id is empty simply cannot be switched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexusConfig {
    /// Backend base URL, without trailing slash.
    #[serde(default)]
    pub api_url: String,
    /// User the backend files sessions under.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Per-persona agent ids.
    #[serde(default)]
    pub agents: AgentIds,
}

fn default_user_id() -> String {
    "user_123".to_string()
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            user_id: default_user_id(),
            agents: AgentIds::default(),
        }
    }
}

impl NexusConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> NexusResult<Self> {
        let mut config: NexusConfig = toml::from_str(s)?;
        config.normalize();
        Ok(config)
    }

    /// Configuration from process environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.overlay(|key| std::env::var(key).ok());
        config
    }

    /// Load the TOML file at `path` if it exists, then overlay the environment.
    pub fn load(path: &Path) -> NexusResult<Self> {
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(path)?;
            debug!(path = %path.display(), "Loaded config file");
            Self::from_toml_str(&data)?
        } else {
            debug!(path = %path.display(), "No config file, using environment only");
            Self::default()
        };
        config.overlay(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overwrite fields with values found through `lookup`. Empty values are
    /// ignored so a blank variable does not erase a file setting.
    pub fn overlay<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_URL) {
            self.api_url = v;
        }
        if let Some(v) = get(ENV_USER_ID) {
            self.user_id = v;
        }
        if let Some(v) = get(ENV_AGENT_ROUTER) {
            self.agents.router = v;
        }
        if let Some(v) = get(ENV_AGENT_DEBATER) {
            self.agents.debater = v;
        }
        if let Some(v) = get(ENV_AGENT_COACH) {
            self.agents.coach = v;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let trimmed = self.api_url.trim().trim_end_matches('/').to_string();
        self.api_url = trimmed;
    }

    /// Agent id for `persona`, or `None` when it is not configured.
    pub fn agent_id(&self, persona: Persona) -> Option<&str> {
        let id = match persona {
            Persona::Scribe => &self.agents.router,
            Persona::Debater => &self.agents.debater,
            Persona::Coach => &self.agents.coach,
        };
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    /// Log a warning for each persona that has no agent id.
    pub fn warn_missing(&self) {
        if self.api_url.is_empty() {
            warn!("{ENV_API_URL} is not set; backend calls will fail");
        }
        for persona in Persona::ALL {
            if self.agent_id(persona).is_none() {
                warn!(persona = %persona, "No agent id configured");
            }
        }
    }
}
