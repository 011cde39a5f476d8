//! Chat command parsing and fixed replies.

use std::str::FromStr;

use strum::IntoEnumIterator;
use vermeer_social::telegram::BotCommand;

use crate::gallery::ReportMode;

/// Greeting sent for `/start`.
pub const WELCOME: &str = "Hello! I'm image generation bot. Type /help to see what I can do.";

/// Status message sent while a session is being planned.
pub const RECEIVED: &str = "Received message, generating prompts...";

/// Apology shown when a session aborts.
pub fn apology(error: &impl std::fmt::Display) -> String {
    format!("An error occurred. Please try again later. Error: {}", error)
}

/// Command names the bot answers to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum CommandName {
    /// Greeting
    Start,
    /// Usage document
    Help,
    /// Generation session with short progress notices
    Gen,
    /// Generation session with full payload in progress notices
    GenLong,
    /// Default payload dump
    ApiDef,
}

impl CommandName {
    /// Menu description.
    pub fn description(self) -> &'static str {
        match self {
            Self::Start => "Start the bot",
            Self::Help => "Show help",
            Self::Gen => "Generate images",
            Self::GenLong => "Generate images, showing the parameters of each request",
            Self::ApiDef => "Show the default request payload",
        }
    }
}

/// A recognized inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// `/api_def`
    ApiDef,
    /// `/gen` or `/gen_long` with the rest of the message
    Generate {
        /// Argument text after the command
        text: String,
        /// Progress notice detail
        mode: ReportMode,
    },
}

impl Command {
    /// Parse a message. Returns `None` for anything that is not a known
    /// command.
    ///
    /// # Examples
    ///
    /// ```
    /// use vermeer_bot::{Command, ReportMode};
    ///
    /// assert_eq!(
    ///     Command::parse("/gen@vermeer_bot prompt: a cat"),
    ///     Some(Command::Generate {
    ///         text: "prompt: a cat".to_string(),
    ///         mode: ReportMode::Short,
    ///     })
    /// );
    /// assert_eq!(Command::parse("hello"), None);
    /// ```
    pub fn parse(message: &str) -> Option<Self> {
        let message = message.trim_start();
        let rest = message.strip_prefix('/')?;

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split_once('@').map_or(head, |(name, _bot)| name);

        let command = match CommandName::from_str(name).ok()? {
            CommandName::Start => Self::Start,
            CommandName::Help => Self::Help,
            CommandName::ApiDef => Self::ApiDef,
            CommandName::Gen => Self::Generate {
                text: args.to_string(),
                mode: ReportMode::Short,
            },
            CommandName::GenLong => Self::Generate {
                text: args.to_string(),
                mode: ReportMode::Verbose,
            },
        };
        Some(command)
    }
}

/// Command menu registered with the platform at startup.
pub fn bot_commands() -> Vec<BotCommand> {
    CommandName::iter()
        .map(|name| BotCommand::new(name.as_ref(), name.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/api_def"), Some(Command::ApiDef));
        assert_eq!(Command::parse("  /help  "), Some(Command::Help));
    }

    #[test]
    fn test_parse_generation_arguments() {
        assert_eq!(
            Command::parse("/gen prompt: a cat\nbatch_count: 2"),
            Some(Command::Generate {
                text: "prompt: a cat\nbatch_count: 2".to_string(),
                mode: ReportMode::Short,
            })
        );
        assert_eq!(
            Command::parse("/gen_long a cat"),
            Some(Command::Generate {
                text: "a cat".to_string(),
                mode: ReportMode::Verbose,
            })
        );
        assert_eq!(
            Command::parse("/gen"),
            Some(Command::Generate {
                text: String::new(),
                mode: ReportMode::Short,
            })
        );
    }

    #[test]
    fn test_parse_accepts_bot_suffix() {
        assert_eq!(Command::parse("/start@vermeer_bot"), Some(Command::Start));
        assert_eq!(
            Command::parse("/gen_long@vermeer_bot a cat"),
            Some(Command::Generate {
                text: "a cat".to_string(),
                mode: ReportMode::Verbose,
            })
        );
    }

    #[test]
    fn test_parse_ignores_unknown_text() {
        assert_eq!(Command::parse("a cat"), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("/generate a cat"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_menu_lists_every_command() {
        let names: Vec<String> = bot_commands().into_iter().map(|c| c.command).collect();
        assert_eq!(names, ["start", "help", "gen", "gen_long", "api_def"]);
    }

    #[test]
    fn test_apology_includes_error() {
        assert_eq!(
            apology(&"boom"),
            "An error occurred. Please try again later. Error: boom"
        );
    }
}
