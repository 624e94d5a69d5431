use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "smokesignal.toml";
pub const NESTED_CONFIG_FILE: &str = "config/smokesignal.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub server: ServerConfig,
    pub workflow: WorkflowConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 application key. Absence is reported per request, not at startup.
    pub public_key: Option<String>,
    pub application_id: Option<String>,
    pub bot_token: Option<SecretString>,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub presentation: Presentation,
    pub time_request: TimeRequestMode,
    pub fixed_minutes: u16,
    pub acknowledge_note: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Content,
    Embed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRequestMode {
    Off,
    Fixed,
    Prompt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub public_key: Option<String>,
    pub application_id: Option<String>,
    pub bot_token: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub presentation: Option<Presentation>,
    pub time_request: Option<TimeRequestMode>,
    pub acknowledge_note: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                public_key: None,
                application_id: None,
                bot_token: None,
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8787,
                graceful_shutdown_secs: 15,
            },
            workflow: WorkflowConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            presentation: Presentation::Content,
            time_request: TimeRequestMode::Prompt,
            fixed_minutes: 15,
            acknowledge_note: false,
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

fn normalize_public_key(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl std::str::FromStr for Presentation {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "embed" => Ok(Self::Embed),
            other => Err(ConfigError::Validation(format!(
                "unsupported presentation `{other}` (expected content|embed)"
            ))),
        }
    }
}

impl std::str::FromStr for TimeRequestMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "fixed" => Ok(Self::Fixed),
            "prompt" => Ok(Self::Prompt),
            other => Err(ConfigError::Validation(format!(
                "unsupported time request mode `{other}` (expected off|fixed|prompt)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(discord) = patch.discord {
            if let Some(public_key) = discord.public_key {
                self.discord.public_key = normalize_public_key(public_key);
            }
            if let Some(application_id) = discord.application_id {
                self.discord.application_id = Some(application_id);
            }
            if let Some(bot_token_value) = discord.bot_token {
                self.discord.bot_token = Some(secret_value(bot_token_value));
            }
            if let Some(api_base_url) = discord.api_base_url {
                self.discord.api_base_url = api_base_url;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(workflow) = patch.workflow {
            if let Some(presentation) = workflow.presentation {
                self.workflow.presentation = presentation;
            }
            if let Some(time_request) = workflow.time_request {
                self.workflow.time_request = time_request;
            }
            if let Some(fixed_minutes) = workflow.fixed_minutes {
                self.workflow.fixed_minutes = fixed_minutes;
            }
            if let Some(acknowledge_note) = workflow.acknowledge_note {
                self.workflow.acknowledge_note = acknowledge_note;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let public_key =
            read_env("SMOKESIGNAL_DISCORD_PUBLIC_KEY").or_else(|| read_env("DISCORD_PUBLIC_KEY"));
        if let Some(value) = public_key {
            self.discord.public_key = normalize_public_key(value);
        }
        let application_id = read_env("SMOKESIGNAL_DISCORD_APPLICATION_ID")
            .or_else(|| read_env("DISCORD_APP_ID"));
        if let Some(value) = application_id {
            self.discord.application_id = Some(value);
        }
        let bot_token =
            read_env("SMOKESIGNAL_DISCORD_BOT_TOKEN").or_else(|| read_env("DISCORD_BOT_TOKEN"));
        if let Some(value) = bot_token {
            self.discord.bot_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("SMOKESIGNAL_DISCORD_API_BASE_URL") {
            self.discord.api_base_url = value;
        }

        if let Some(value) = read_env("SMOKESIGNAL_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SMOKESIGNAL_SERVER_PORT") {
            self.server.port = parse_u16("SMOKESIGNAL_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SMOKESIGNAL_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SMOKESIGNAL_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("SMOKESIGNAL_WORKFLOW_PRESENTATION") {
            self.workflow.presentation = value.parse()?;
        }
        if let Some(value) = read_env("SMOKESIGNAL_WORKFLOW_TIME_REQUEST") {
            self.workflow.time_request = value.parse()?;
        }
        if let Some(value) = read_env("SMOKESIGNAL_WORKFLOW_FIXED_MINUTES") {
            self.workflow.fixed_minutes = parse_u16("SMOKESIGNAL_WORKFLOW_FIXED_MINUTES", &value)?;
        }
        if let Some(value) = read_env("SMOKESIGNAL_WORKFLOW_ACKNOWLEDGE_NOTE") {
            self.workflow.acknowledge_note =
                parse_bool("SMOKESIGNAL_WORKFLOW_ACKNOWLEDGE_NOTE", &value)?;
        }

        let log_level =
            read_env("SMOKESIGNAL_LOGGING_LEVEL").or_else(|| read_env("SMOKESIGNAL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SMOKESIGNAL_LOGGING_FORMAT").or_else(|| read_env("SMOKESIGNAL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(public_key) = overrides.public_key {
            self.discord.public_key = normalize_public_key(public_key);
        }
        if let Some(application_id) = overrides.application_id {
            self.discord.application_id = Some(application_id);
        }
        if let Some(bot_token) = overrides.bot_token {
            self.discord.bot_token = Some(secret_value(bot_token));
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(presentation) = overrides.presentation {
            self.workflow.presentation = presentation;
        }
        if let Some(time_request) = overrides.time_request {
            self.workflow.time_request = time_request;
        }
        if let Some(acknowledge_note) = overrides.acknowledge_note {
            self.workflow.acknowledge_note = acknowledge_note;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_discord(&self.discord)?;
        validate_server(&self.server)?;
        validate_workflow(&self.workflow)?;
        validate_logging(&self.logging)?;
        Ok(())
    }

    /// Credentials needed by the one-off command registration, checked only when registering.
    pub fn registration_credentials(&self) -> Result<(&str, &SecretString), ConfigError> {
        let application_id = self
            .discord
            .application_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "discord.application_id is required to register commands (env DISCORD_APP_ID)"
                        .to_string(),
                )
            })?;
        let bot_token = self
            .discord
            .bot_token
            .as_ref()
            .filter(|token| !token.expose_secret().trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "discord.bot_token is required to register commands (env DISCORD_BOT_TOKEN)"
                        .to_string(),
                )
            })?;
        Ok((application_id, bot_token))
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_discord(discord: &DiscordConfig) -> Result<(), ConfigError> {
    if let Some(public_key) = &discord.public_key {
        let well_formed =
            public_key.len() == 64 && public_key.chars().all(|ch| ch.is_ascii_hexdigit());
        if !well_formed {
            return Err(ConfigError::Validation(
                "discord.public_key must be 64 hex characters. Copy it from https://discord.com/developers/applications > Your App > General Information".to_string(),
            ));
        }
    }

    let base_url = discord.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "discord.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_workflow(workflow: &WorkflowConfig) -> Result<(), ConfigError> {
    if workflow.time_request == TimeRequestMode::Fixed
        && (workflow.fixed_minutes == 0 || workflow.fixed_minutes > 240)
    {
        return Err(ConfigError::Validation(
            "workflow.fixed_minutes must be in range 1..=240 when time_request is `fixed`"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    discord: Option<DiscordPatch>,
    server: Option<ServerPatch>,
    workflow: Option<WorkflowPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordPatch {
    public_key: Option<String>,
    application_id: Option<String>,
    bot_token: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowPatch {
    presentation: Option<Presentation>,
    time_request: Option<TimeRequestMode>,
    fixed_minutes: Option<u16>,
    acknowledge_note: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{
        AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, Presentation,
        TimeRequestMode,
    };

    const KEY: &str = "5d6d6c0b1f6a4b3e8f0d2a9c7e1b3d5f7a9c1e3b5d7f9a1c3e5b7d9f1a3c5e7b";

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_load_without_public_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.discord.public_key.is_none(), "public key should be unset by default")?;
        ensure(config.server.port == 8787, "default port should be 8787")?;
        ensure(
            config.workflow.time_request == TimeRequestMode::Prompt,
            "default time request mode should prompt",
        )?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SMOKESIGNAL_KEY", KEY);

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("smokesignal.toml");
            fs::write(
                &path,
                r#"
[discord]
public_key = "  ${TEST_SMOKESIGNAL_KEY}  "

[workflow]
presentation = "embed"
time_request = "fixed"
fixed_minutes = 10
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.discord.public_key.as_deref() == Some(KEY),
                "public key should be interpolated and trimmed",
            )?;
            ensure(config.workflow.presentation == Presentation::Embed, "embed presentation")?;
            ensure(config.workflow.time_request == TimeRequestMode::Fixed, "fixed time mode")?;
            ensure(config.workflow.fixed_minutes == 10, "fixed minutes from file")?;
            Ok(())
        })();

        clear_vars(&["TEST_SMOKESIGNAL_KEY"]);
        result
    }

    #[test]
    fn legacy_env_names_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("DISCORD_PUBLIC_KEY", format!("{KEY}\n"));
        env::set_var("DISCORD_APP_ID", "123456789012345678");
        env::set_var("DISCORD_BOT_TOKEN", "bot-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.discord.public_key.as_deref() == Some(KEY), "trimmed public key")?;
            let (application_id, token) = config
                .registration_credentials()
                .map_err(|err| format!("credentials missing: {err}"))?;
            ensure(application_id == "123456789012345678", "application id from env")?;
            ensure(token.expose_secret() == "bot-secret-value", "bot token from env")?;
            Ok(())
        })();

        clear_vars(&["DISCORD_PUBLIC_KEY", "DISCORD_APP_ID", "DISCORD_BOT_TOKEN"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SMOKESIGNAL_SERVER_PORT", "9100");
        env::set_var("SMOKESIGNAL_WORKFLOW_PRESENTATION", "content");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("smokesignal.toml");
            fs::write(
                &path,
                r#"
[server]
port = 9000
bind_address = "0.0.0.0"

[workflow]
presentation = "embed"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.port == 9100, "env port should win over file")?;
            ensure(config.server.bind_address == "0.0.0.0", "file bind address should apply")?;
            ensure(
                config.workflow.presentation == Presentation::Content,
                "env presentation should win over file",
            )?;
            ensure(config.logging.level == "debug", "override log level should win")?;
            Ok(())
        })();

        clear_vars(&["SMOKESIGNAL_SERVER_PORT", "SMOKESIGNAL_WORKFLOW_PRESENTATION"]);
        result
    }

    #[test]
    fn malformed_public_key_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                public_key: Some("not-a-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".into()),
            Err(error) => error,
        };

        ensure(
            matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("discord.public_key")
            ),
            "validation failure should mention discord.public_key",
        )
    }

    #[test]
    fn registration_credentials_require_application_id() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                bot_token: Some("bot-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(
            matches!(
                config.registration_credentials(),
                Err(ConfigError::Validation(ref message)) if message.contains("application_id")
            ),
            "missing application id should be reported",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SMOKESIGNAL_DISCORD_BOT_TOKEN", "very-secret-bot-token");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("very-secret-bot-token"),
                "debug output should not contain the bot token",
            )
        })();

        clear_vars(&["SMOKESIGNAL_DISCORD_BOT_TOKEN"]);
        result
    }
}
