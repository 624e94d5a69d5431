use smokesignal_discord::commands::registration_payload;

use crate::commands::CommandResult;

/// Prints the exact body `register` would send, for registering by hand.
pub fn run() -> CommandResult {
    match serde_json::to_string_pretty(&registration_payload()) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("payload", "serialization", error.to_string(), 3),
    }
}
