use std::path::PathBuf;

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Empty,
    Message(String),
    Stop,
    New,
    Auto(bool),
    Open(Option<PathBuf>),
    Help,
    Quit,
    Unknown(String),
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return InputCommand::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return InputCommand::Message(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match (name, arg) {
            ("stop", _) => InputCommand::Stop,
            ("new", _) => InputCommand::New,
            ("auto", "on") => InputCommand::Auto(true),
            ("auto", "off") => InputCommand::Auto(false),
            ("open", "") => InputCommand::Open(None),
            ("open", path) => InputCommand::Open(Some(PathBuf::from(path))),
            ("help", _) => InputCommand::Help,
            ("quit", _) | ("exit", _) => InputCommand::Quit,
            _ => InputCommand::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Commands:
  /stop         stop the running request
  /new          start a new conversation
  /auto on|off  run sensitive tools without asking
  /open [path]  set or clear the current editor file
  /quit         exit
Anything else is sent to the agent.";

/// `y`/`yes` allows; everything else denies.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Where a line of input goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Answer to the open confirmation prompt.
    Answer { allow: bool },
    Command(InputCommand),
}

impl InputCommand {
    /// Commands that abandon an open confirmation prompt instead of answering it.
    pub fn interrupts_prompt(&self) -> bool {
        matches!(self, InputCommand::Stop | InputCommand::New | InputCommand::Quit)
    }
}

/// Route `line`. While a prompt is open, only `/stop`, `/new` and `/quit` bypass it.
pub fn route(line: &str, prompt_pending: bool) -> Route {
    let command = InputCommand::parse(line);
    if prompt_pending && !command.interrupts_prompt() {
        return Route::Answer {
            allow: is_affirmative(line),
        };
    }
    Route::Command(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            InputCommand::parse("  fix the build "),
            InputCommand::Message("fix the build".into())
        );
        assert_eq!(InputCommand::parse("   "), InputCommand::Empty);
    }

    #[test]
    fn slash_commands_parse() {
        assert_eq!(InputCommand::parse("/stop"), InputCommand::Stop);
        assert_eq!(InputCommand::parse("/new"), InputCommand::New);
        assert_eq!(InputCommand::parse("/auto on"), InputCommand::Auto(true));
        assert_eq!(InputCommand::parse("/auto off"), InputCommand::Auto(false));
        assert_eq!(
            InputCommand::parse("/open src/main.rs"),
            InputCommand::Open(Some(PathBuf::from("src/main.rs")))
        );
        assert_eq!(InputCommand::parse("/open"), InputCommand::Open(None));
        assert_eq!(InputCommand::parse("/exit"), InputCommand::Quit);
    }

    #[test]
    fn bad_arguments_are_unknown() {
        assert_eq!(
            InputCommand::parse("/auto maybe"),
            InputCommand::Unknown("/auto maybe".into())
        );
    }

    #[test]
    fn only_yes_allows() {
        assert!(is_affirmative("Y"));
        assert!(is_affirmative(" yes "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }

    #[test]
    fn stop_during_prompt_is_a_command() {
        assert_eq!(route("/stop", true), Route::Command(InputCommand::Stop));
        assert_eq!(route(" /new ", true), Route::Command(InputCommand::New));
        assert_eq!(route("/quit", true), Route::Command(InputCommand::Quit));
    }

    #[test]
    fn other_lines_during_prompt_answer_it() {
        assert_eq!(route("y", true), Route::Answer { allow: true });
        assert_eq!(route("no", true), Route::Answer { allow: false });
        assert_eq!(route("/auto on", true), Route::Answer { allow: false });
        assert_eq!(route("", true), Route::Answer { allow: false });
    }

    #[test]
    fn without_prompt_lines_are_commands() {
        assert_eq!(route("y", false), Route::Command(InputCommand::Message("y".into())));
        assert_eq!(route("/stop", false), Route::Command(InputCommand::Stop));
    }
}
