//! REPL command parsing
//!
//! A line is split into a verb and the rest. The verb is matched
//! case-insensitively against the command names and their aliases; the rest
//! is interpreted per command. A bare number is its own command whose meaning
//! depends on where the user is.

use crate::app::StateKind;
use crate::errors::{InputResult, UserInputError};

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect to a registry node by number or label
    Connect { target: String, auth: bool },
    /// Connect to an ad-hoc node URL
    Url { url: String, auth: bool },
    Select(usize),
    Download(Option<usize>),
    Back,
    Refresh,
    Search(String),
    ListAll,
    Next,
    Prev,
    View(usize),
    /// Bare number: connect, select or view depending on state
    Number(usize),
    Help,
    Quit,
}

const ALL_STATES: &[StateKind] = &[
    StateKind::Disconnected,
    StateKind::Connected,
    StateKind::StockSelected,
];
const CONNECTING: &[StateKind] = &[StateKind::Disconnected, StateKind::Connected];
const CONNECTED: &[StateKind] = &[StateKind::Connected];
const ON_NODE: &[StateKind] = &[StateKind::Connected, StateKind::StockSelected];
const BROWSING: &[StateKind] = &[StateKind::StockSelected];

/// One line of the help listing
#[derive(Debug, Clone, Copy)]
pub struct CommandHelp {
    pub usage: &'static str,
    pub aliases: &'static str,
    pub summary: &'static str,
    pub states: &'static [StateKind],
}

/// Every command with its usage, in display order
pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        usage: "connect <n|name> [--auth]",
        aliases: "c",
        summary: "Connect to a known node",
        states: CONNECTING,
    },
    CommandHelp {
        usage: "url <url> [--auth]",
        aliases: "u",
        summary: "Connect to a node by URL",
        states: CONNECTING,
    },
    CommandHelp {
        usage: "select <n>",
        aliases: "sl",
        summary: "Browse a stock",
        states: CONNECTED,
    },
    CommandHelp {
        usage: "refresh",
        aliases: "r",
        summary: "Reload the stock list",
        states: CONNECTED,
    },
    CommandHelp {
        usage: "download [n]",
        aliases: "d, dd",
        summary: "Download a stock as ZIP (current stock if n is omitted)",
        states: ON_NODE,
    },
    CommandHelp {
        usage: "search <text>",
        aliases: "s",
        summary: "Search datasets by name",
        states: BROWSING,
    },
    CommandHelp {
        usage: "list-all",
        aliases: "ll, list",
        summary: "Clear the search and list all datasets",
        states: BROWSING,
    },
    CommandHelp {
        usage: "next",
        aliases: "n",
        summary: "Next page",
        states: BROWSING,
    },
    CommandHelp {
        usage: "prev",
        aliases: "p",
        summary: "Previous page",
        states: BROWSING,
    },
    CommandHelp {
        usage: "view <n>",
        aliases: "v",
        summary: "Show dataset details",
        states: BROWSING,
    },
    CommandHelp {
        usage: "back",
        aliases: "b",
        summary: "Go up one level",
        states: ON_NODE,
    },
    CommandHelp {
        usage: "<n>",
        aliases: "",
        summary: "Connect, select or view entry n",
        states: ALL_STATES,
    },
    CommandHelp {
        usage: "help",
        aliases: "h, ?",
        summary: "Show this help",
        states: ALL_STATES,
    },
    CommandHelp {
        usage: "quit",
        aliases: "q, exit",
        summary: "Leave bwilcd",
        states: ALL_STATES,
    },
];

impl Command {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> InputResult<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.to_lowercase();

        if rest.is_empty() {
            if let Ok(number) = verb.parse::<usize>() {
                return Ok(Some(Command::Number(number)));
            }
        }

        let command = match verb.as_str() {
            "connect" | "c" => {
                let (target, auth) = split_auth_flag(rest);
                if target.is_empty() {
                    return Err(missing("connect", "a node number or name"));
                }
                Command::Connect { target, auth }
            }
            "url" | "u" => {
                let (url, auth) = split_auth_flag(rest);
                if url.is_empty() {
                    return Err(missing("url", "a node URL"));
                }
                Command::Url { url, auth }
            }
            "select" | "sl" => Command::Select(required_number("select", rest)?),
            "download" | "d" | "dd" => {
                if rest.is_empty() {
                    Command::Download(None)
                } else {
                    Command::Download(Some(parse_number(rest)?))
                }
            }
            "back" | "b" => Command::Back,
            "refresh" | "r" => Command::Refresh,
            "search" | "s" => {
                if rest.is_empty() {
                    return Err(missing("search", "a search term"));
                }
                Command::Search(rest.to_string())
            }
            "list-all" | "ll" | "list" => Command::ListAll,
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "view" | "v" => Command::View(required_number("view", rest)?),
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return Err(UserInputError::UnknownCommand { verb }),
        };

        Ok(Some(command))
    }

    /// Canonical name, as used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Connect { .. } => "connect",
            Command::Url { .. } => "url",
            Command::Select(_) => "select",
            Command::Download(_) => "download",
            Command::Back => "back",
            Command::Refresh => "refresh",
            Command::Search(_) => "search",
            Command::ListAll => "list-all",
            Command::Next => "next",
            Command::Prev => "prev",
            Command::View(_) => "view",
            Command::Number(_) => "<n>",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }

    /// States in which the command may run
    pub fn valid_states(&self) -> &'static [StateKind] {
        match self {
            Command::Connect { .. } | Command::Url { .. } => CONNECTING,
            Command::Select(_) | Command::Refresh => CONNECTED,
            Command::Download(_) | Command::Back => ON_NODE,
            Command::Search(_)
            | Command::ListAll
            | Command::Next
            | Command::Prev
            | Command::View(_) => BROWSING,
            Command::Number(_) | Command::Help | Command::Quit => ALL_STATES,
        }
    }

    pub fn allowed_in(&self, state: StateKind) -> bool {
        self.valid_states().contains(&state)
    }

    /// Reject the command unless it may run in `state`
    pub fn check_allowed(&self, state: StateKind) -> InputResult<()> {
        if self.allowed_in(state) {
            Ok(())
        } else {
            Err(UserInputError::NotAllowed {
                command: self.name(),
                state: state.describe(),
            })
        }
    }
}

/// Separate `--auth`/`-a` from the remaining words
fn split_auth_flag(rest: &str) -> (String, bool) {
    let mut auth = false;
    let mut words = Vec::new();
    for word in rest.split_whitespace() {
        if word == "--auth" || word == "-a" {
            auth = true;
        } else {
            words.push(word);
        }
    }
    (words.join(" "), auth)
}

fn required_number(command: &'static str, rest: &str) -> InputResult<usize> {
    if rest.is_empty() {
        return Err(missing(command, "a number"));
    }
    parse_number(rest)
}

fn parse_number(text: &str) -> InputResult<usize> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| UserInputError::InvalidNumber {
            value: text.trim().to_string(),
        })
}

fn missing(command: &'static str, expected: &'static str) -> UserInputError {
    UserInputError::MissingArgument { command, expected }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(parse("sl 2"), Command::Select(2));
        assert_eq!(parse("SELECT 2"), Command::Select(2));
        assert_eq!(parse("dd"), Command::Download(None));
        assert_eq!(parse("d 3"), Command::Download(Some(3)));
        assert_eq!(parse("ll"), Command::ListAll);
        assert_eq!(parse("list"), Command::ListAll);
        assert_eq!(parse("n"), Command::Next);
        assert_eq!(parse("p"), Command::Prev);
        assert_eq!(parse("b"), Command::Back);
        assert_eq!(parse("r"), Command::Refresh);
        assert_eq!(parse("?"), Command::Help);
        assert_eq!(parse("exit"), Command::Quit);
        assert_eq!(parse("v 21"), Command::View(21));
    }

    #[test]
    fn test_search_keeps_query_case() {
        assert_eq!(parse("s  Steel Hot-Rolled "), Command::Search("Steel Hot-Rolled".into()));
    }

    #[test]
    fn test_auth_flag() {
        assert_eq!(
            parse("connect ProBas --auth"),
            Command::Connect {
                target: "ProBas".into(),
                auth: true
            }
        );
        assert_eq!(
            parse("u -a node.example.org/Node"),
            Command::Url {
                url: "node.example.org/Node".into(),
                auth: true
            }
        );
        assert_eq!(
            parse("c 1"),
            Command::Connect {
                target: "1".into(),
                auth: false
            }
        );
    }

    #[test]
    fn test_bare_number_and_blank_line() {
        assert_eq!(parse(" 7 "), Command::Number(7));
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse("frobnicate"),
            Err(UserInputError::UnknownCommand {
                verb: "frobnicate".into()
            })
        );
        assert!(matches!(
            Command::parse("select"),
            Err(UserInputError::MissingArgument { .. })
        ));
        assert!(matches!(
            Command::parse("view two"),
            Err(UserInputError::InvalidNumber { .. })
        ));
        assert!(matches!(
            Command::parse("search"),
            Err(UserInputError::MissingArgument { .. })
        ));
        assert!(matches!(
            Command::parse("connect --auth"),
            Err(UserInputError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_transition_table() {
        assert!(Command::Select(1).allowed_in(StateKind::Connected));
        assert!(!Command::Select(1).allowed_in(StateKind::StockSelected));
        assert!(!Command::Next.allowed_in(StateKind::Connected));
        assert!(Command::Download(None).allowed_in(StateKind::StockSelected));
        assert!(!Command::Download(None).allowed_in(StateKind::Disconnected));
        assert!(!Command::Back.allowed_in(StateKind::Disconnected));
        assert!(Command::Help.allowed_in(StateKind::StockSelected));

        assert_eq!(
            Command::Refresh.check_allowed(StateKind::Disconnected),
            Err(UserInputError::NotAllowed {
                command: "refresh",
                state: "disconnected"
            })
        );
    }

    #[test]
    fn test_help_table_matches_commands() {
        let select = COMMANDS.iter().find(|c| c.usage.starts_with("select")).unwrap();
        assert_eq!(select.states, Command::Select(1).valid_states());
        let view = COMMANDS.iter().find(|c| c.usage.starts_with("view")).unwrap();
        assert_eq!(view.states, Command::View(1).valid_states());
    }
}
