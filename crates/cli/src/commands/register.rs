use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use smokesignal_core::config::{AppConfig, LoadOptions};
use smokesignal_discord::commands::{registration_payload, SmokeCommand};

use crate::commands::CommandResult;

pub fn run(dry_run: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "register",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let (application_id, bot_token) = match config.registration_credentials() {
        Ok(credentials) => credentials,
        Err(error) => {
            return CommandResult::failure("register", "missing_credentials", error.to_string(), 2);
        }
    };

    let url = commands_url(&config.discord.api_base_url, application_id);
    let names = command_names();
    if dry_run {
        return CommandResult::success(
            "register",
            format!("dry run: would PUT {names} to {url}"),
        );
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "register",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let response = registration_request(&Client::new(), &url, bot_token)
            .send()
            .await
            .map_err(|error| ("http_transport", error.to_string(), 4u8))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(("discord_api", format!("discord rejected registration ({status}): {body}"), 5u8))
    });

    match result {
        Ok(()) => CommandResult::success("register", format!("commands {names} registered")),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("register", error_class, message, exit_code)
        }
    }
}

pub fn commands_url(api_base_url: &str, application_id: &str) -> String {
    format!("{}/applications/{application_id}/commands", api_base_url.trim_end_matches('/'))
}

/// Bulk overwrite of the global command set, so repeated runs converge on the same commands.
pub fn registration_request(
    client: &Client,
    url: &str,
    bot_token: &SecretString,
) -> RequestBuilder {
    client
        .put(url)
        .header(reqwest::header::AUTHORIZATION, format!("Bot {}", bot_token.expose_secret()))
        .json(&registration_payload())
}

fn command_names() -> String {
    SmokeCommand::ALL
        .iter()
        .map(|command| format!("/{}", command.name()))
        .collect::<Vec<_>>()
        .join(" and ")
}
