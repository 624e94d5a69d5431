use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use smokesignal_cli::commands::{config, payload, register};

#[test]
fn register_reports_missing_credentials() {
    with_env(&[], || {
        let result = register::run(true);
        assert_eq!(result.exit_code, 2, "expected credential failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "register");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "missing_credentials");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("discord.application_id"), "message was: {message}");
    });
}

#[test]
fn register_requires_bot_token_even_with_application_id() {
    with_env(&[("DISCORD_APP_ID", "123456789012345678")], || {
        let result = register::run(true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "missing_credentials");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("discord.bot_token"), "message was: {message}");
    });
}

#[test]
fn register_dry_run_names_target_without_leaking_token() {
    with_env(
        &[("DISCORD_APP_ID", "123456789012345678"), ("DISCORD_BOT_TOKEN", "bot-secret-value")],
        || {
            let result = register::run(true);
            assert_eq!(result.exit_code, 0, "expected dry run success");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "register");
            assert_eq!(payload["status"], "ok");
            let message = payload["message"].as_str().unwrap_or_default();
            assert!(message.contains(
                "https://discord.com/api/v10/applications/123456789012345678/commands"
            ));
            assert!(message.contains("/smoketime and /smoke"));
            assert!(!result.output.contains("bot-secret-value"));
        },
    );
}

#[test]
fn register_reports_invalid_config_values() {
    with_env(&[("SMOKESIGNAL_SERVER_PORT", "not-a-port")], || {
        let result = register::run(true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn payload_prints_both_command_definitions() {
    let result = payload::run();
    assert_eq!(result.exit_code, 0);

    let definitions = parse_payload(&result.output);
    let names: Vec<&str> = definitions
        .as_array()
        .expect("payload should be an array")
        .iter()
        .filter_map(|definition| definition["name"].as_str())
        .collect();
    assert_eq!(names, vec!["smoketime", "smoke"]);
    assert_eq!(definitions[0]["options"][0]["type"], 6);
    assert_eq!(definitions[0]["options"][0]["required"], false);
}

#[test]
fn config_attributes_env_sources_and_redacts_token() {
    with_env(
        &[("DISCORD_BOT_TOKEN", "bot-secret-value"), ("SMOKESIGNAL_SERVER_PORT", "9100")],
        || {
            let output = config::run();

            assert!(output.starts_with("effective config"));
            assert!(
                output.contains("- server.port = 9100 (source: env (SMOKESIGNAL_SERVER_PORT))")
            );
            assert!(output
                .contains("- discord.bot_token = <redacted> (source: env (DISCORD_BOT_TOKEN))"));
            assert!(output.contains("- discord.public_key = <unset> (source: default)"));
            assert!(!output.contains("bot-secret-value"));
        },
    );
}

#[test]
fn config_ignores_blank_env_values_when_attributing_sources() {
    with_env(&[("SMOKESIGNAL_SERVER_PORT", "   "), ("DISCORD_APP_ID", "")], || {
        let output = config::run();

        assert!(output.contains("- server.port = 8787 (source: default)"), "output: {output}");
        assert!(output.contains("- discord.application_id = <unset> (source: default)"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "DISCORD_PUBLIC_KEY",
        "DISCORD_APP_ID",
        "DISCORD_BOT_TOKEN",
        "SMOKESIGNAL_DISCORD_PUBLIC_KEY",
        "SMOKESIGNAL_DISCORD_APPLICATION_ID",
        "SMOKESIGNAL_DISCORD_BOT_TOKEN",
        "SMOKESIGNAL_DISCORD_API_BASE_URL",
        "SMOKESIGNAL_SERVER_BIND_ADDRESS",
        "SMOKESIGNAL_SERVER_PORT",
        "SMOKESIGNAL_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SMOKESIGNAL_WORKFLOW_PRESENTATION",
        "SMOKESIGNAL_WORKFLOW_TIME_REQUEST",
        "SMOKESIGNAL_WORKFLOW_FIXED_MINUTES",
        "SMOKESIGNAL_WORKFLOW_ACKNOWLEDGE_NOTE",
        "SMOKESIGNAL_LOGGING_LEVEL",
        "SMOKESIGNAL_LOGGING_FORMAT",
        "SMOKESIGNAL_LOG_LEVEL",
        "SMOKESIGNAL_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
