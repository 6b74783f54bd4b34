//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::command::ConfigCommand;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute `config validate` or `config show`.
///
/// Unlike batch commands, both require the file to exist.
pub fn execute(command: &ConfigCommand, path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    match command {
        ConfigCommand::Validate => {
            if output::is_json() {
                return output::json_output(&json!({
                    "valid": true,
                    "path": path.display().to_string(),
                }));
            }
            output::success(&format!("{} is valid", path.display()));
            Ok(())
        }
        ConfigCommand::Show => show(&config),
    }
}

fn show(config: &Config) -> Result<()> {
    if output::is_json() {
        return output::json_output(&json!({
            "database": config.database,
            "logging": { "level": config.logging.level, "format": config.logging.format },
            "recompute": {
                "max_attempts": config.recompute.max_attempts,
                "retry_delay_ms": config.recompute.retry_delay_ms,
            },
            "leaderboard": {
                "top_n": config.leaderboard.top_n,
                "bottom_n": config.leaderboard.bottom_n,
                "window": config.leaderboard.window,
            },
            "badges": {
                "monuments": config.badges.monuments,
                "grand_tours": config.badges.grand_tours,
            },
        }));
    }

    output::section("Effective configuration");
    output::field("Database", &config.database);
    output::field("Log level", &config.logging.level);
    output::field("Log format", &config.logging.format);

    output::section("Recompute");
    output::field("Attempts", config.recompute.max_attempts);
    output::field("Retry delay", format!("{}ms", config.recompute.retry_delay_ms));

    output::section("Leaderboard");
    output::field("Top", config.leaderboard.top_n);
    output::field("Bottom", config.leaderboard.bottom_n);
    output::field("Window", config.leaderboard.window);

    output::section("Badges");
    output::field("Monuments", config.badges.monuments.join(", "));
    output::field("Grand tours", config.badges.grand_tours.join(", "));
    Ok(())
}
