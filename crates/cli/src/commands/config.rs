use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use smokesignal_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let public_key = config.discord.public_key.as_deref().map(redact_public_key);
    let bot_token = match &config.discord.bot_token {
        Some(token) => redact_token(token.expose_secret()),
        None => "<unset>".to_string(),
    };

    let fields = [
        field(
            "discord.public_key",
            public_key.unwrap_or_else(|| "<unset>".to_string()),
            &["SMOKESIGNAL_DISCORD_PUBLIC_KEY", "DISCORD_PUBLIC_KEY"],
        ),
        field(
            "discord.application_id",
            config.discord.application_id.clone().unwrap_or_else(|| "<unset>".to_string()),
            &["SMOKESIGNAL_DISCORD_APPLICATION_ID", "DISCORD_APP_ID"],
        ),
        field(
            "discord.bot_token",
            bot_token,
            &["SMOKESIGNAL_DISCORD_BOT_TOKEN", "DISCORD_BOT_TOKEN"],
        ),
        field(
            "discord.api_base_url",
            config.discord.api_base_url.clone(),
            &["SMOKESIGNAL_DISCORD_API_BASE_URL"],
        ),
        field(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["SMOKESIGNAL_SERVER_BIND_ADDRESS"],
        ),
        field("server.port", config.server.port.to_string(), &["SMOKESIGNAL_SERVER_PORT"]),
        field(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["SMOKESIGNAL_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        field(
            "workflow.presentation",
            format!("{:?}", config.workflow.presentation),
            &["SMOKESIGNAL_WORKFLOW_PRESENTATION"],
        ),
        field(
            "workflow.time_request",
            format!("{:?}", config.workflow.time_request),
            &["SMOKESIGNAL_WORKFLOW_TIME_REQUEST"],
        ),
        field(
            "workflow.fixed_minutes",
            config.workflow.fixed_minutes.to_string(),
            &["SMOKESIGNAL_WORKFLOW_FIXED_MINUTES"],
        ),
        field(
            "workflow.acknowledge_note",
            config.workflow.acknowledge_note.to_string(),
            &["SMOKESIGNAL_WORKFLOW_ACKNOWLEDGE_NOTE"],
        ),
        field(
            "logging.level",
            config.logging.level.clone(),
            &["SMOKESIGNAL_LOGGING_LEVEL", "SMOKESIGNAL_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["SMOKESIGNAL_LOGGING_FORMAT", "SMOKESIGNAL_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        fields
            .iter()
            .map(|(key, value, env_keys)| render_line(key, value, source(key, env_keys))),
    );
    lines.join("\n")
}

type Field = (&'static str, String, &'static [&'static str]);

fn field(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Field {
    (key, value, env_keys)
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

/// Blank values are ignored by the loader, so they do not count as an env source either.
fn env_is_set(key: &str) -> bool {
    env::var(key).is_ok_and(|value| !value.trim().is_empty())
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Public keys are not secret, but only the leading bytes are needed to tell them apart.
fn redact_public_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    format!("{prefix}…")
}

fn redact_token(token: &str) -> String {
    if token.trim().is_empty() {
        return "<empty>".to_string();
    }
    "<redacted>".to_string()
}
