//! Small command-line argument parser with generated help output.
//!
//! Options and positional arguments are registered up front, `process` consumes
//! the raw argument vector once, and the results are read back with `is_set`
//! and `positional_arguments`.
//!
//! ```
//! use cmdline_parser::ArgumentParser;
//!
//! let mut parser = ArgumentParser::new();
//! parser.add_option("p", "Port to listen on").alias("port").hint("number");
//! parser.add_positional_argument("source", "Input file");
//!
//! assert!(parser.process(["app", "in.txt", "--port=8080"]));
//! assert_eq!(parser.is_set("port"), (true, "8080"));
//! assert_eq!(parser.positional("source"), Some("in.txt"));
//! ```

pub mod token {
    /// An option-shaped argv element.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct OptionToken {
        /// The element exactly as supplied.
        pub raw: String,
        /// `raw`, plus the following element joined with a single space when it
        /// was consumed as the value.
        pub joined: String,
    }

    /// Argv split into option tokens and positional tokens, both in scan order.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Classified {
        pub options: Vec<OptionToken>,
        pub positionals: Vec<String>,
    }

    /// Split `tokens` (argv without the application path) into options and
    /// positionals.
    ///
    /// Anything starting with `-` is an option. An option swallows the next
    /// element as its value whenever that element does not start with `-`,
    /// whether or not the option was declared to take one.
    pub fn classify(tokens: &[String]) -> Classified {
        let mut out = Classified::default();
        let mut i = 0;

        while i < tokens.len() {
            let arg = tokens[i].as_str();
            if !arg.starts_with('-') {
                out.positionals.push(arg.to_string());
                i += 1;
                continue;
            }

            let mut joined = arg.to_string();
            if let Some(next) = tokens.get(i + 1) {
                if !next.starts_with('-') {
                    joined.push(' ');
                    joined.push_str(next);
                    i += 1;
                }
            }
            tracing::trace!(token = %joined, "option token");
            out.options.push(OptionToken {
                raw: arg.to_string(),
                joined,
            });
            i += 1;
        }

        out
    }

    /// Split an option token into `(name, value)`.
    ///
    /// Accepted forms are `-x`, `-x=value`, `-x value` (one ASCII letter) and
    /// `--name`, `--name=value`, `--name value` (ASCII alphanumerics). The name
    /// keeps its dashes. The value is empty when none is attached. Any other
    /// shape yields `None`.
    pub fn match_option(token: &str) -> Option<(&str, &str)> {
        let (name_len, rest) = if let Some(body) = token.strip_prefix("--") {
            let len = body
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(body.len());
            if len == 0 {
                return None;
            }
            (2 + len, &body[len..])
        } else if let Some(body) = token.strip_prefix('-') {
            let first = body.chars().next()?;
            if !first.is_ascii_alphabetic() {
                return None;
            }
            (2, &body[1..])
        } else {
            return None;
        };

        let value = attached_value(rest)?;
        Some((&token[..name_len], value))
    }

    fn attached_value(rest: &str) -> Option<&str> {
        if rest.is_empty() {
            return Some("");
        }
        let value = rest.strip_prefix(|c: char| c == '=' || c.is_whitespace())?;
        if value.is_empty() || value.contains('\0') {
            return None;
        }
        Some(value)
    }
}

pub mod help {
    use crate::parser::{OptionSpec, PositionalArgSpec};

    const INDENT: &str = "  ";
    /// Description column, counted from the end of the indent.
    const DESCRIPTION_COLUMN: usize = 25;

    /// Strip everything up to the last `\` from the application path.
    pub fn display_name(application_path: &str) -> &str {
        match application_path.rfind('\\') {
            Some(pos) => &application_path[pos + 1..],
            None => application_path,
        }
    }

    /// Render the usage listing for a schema.
    pub fn render(
        application_path: &str,
        options: &[OptionSpec],
        positionals: &[PositionalArgSpec],
    ) -> String {
        let mut out = String::from("Usage\n\n");
        out.push_str(INDENT);
        out.push_str(display_name(application_path));
        out.push(' ');
        for arg in positionals {
            out.push_str(arg.name());
            out.push(' ');
        }
        out.push_str("[options]\n\n\n");

        if !options.is_empty() {
            out.push_str("Options:\n");
            for opt in options {
                let mut left = format!("{INDENT}{}", opt.name());
                for alias in opt.aliases() {
                    left.push(' ');
                    left.push_str(alias);
                }
                push_hint(&mut left, opt.value_hint());
                push_row(&mut out, &left, opt.description());
            }
            out.push('\n');
        }

        if !positionals.is_empty() {
            out.push_str("Arguments:\n");
            for arg in positionals {
                let mut left = format!("{INDENT}{}", arg.name());
                push_hint(&mut left, arg.value_hint());
                push_row(&mut out, &left, arg.description());
            }
            out.push('\n');
        }

        out
    }

    fn push_hint(left: &mut String, hint: &str) {
        if !hint.is_empty() {
            left.push_str(&format!(" <{hint}>"));
        }
    }

    fn push_row(out: &mut String, left: &str, description: &str) {
        let width = left.chars().count() - INDENT.len();
        out.push_str(left);
        match DESCRIPTION_COLUMN.checked_sub(width) {
            Some(pad) => out.push_str(&" ".repeat(pad)),
            None => {
                out.push('\n');
                out.push_str(&" ".repeat(DESCRIPTION_COLUMN));
            }
        }
        out.push_str(description);
        out.push('\n');
    }
}

pub mod parser {
    use crate::{help, token};
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::io::Write;
    use thiserror::Error;

    const HELP_COMMAND: &str = "h";
    const HELP_ALIAS: &str = "help";
    const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

    /// Value check hook. Exported for callers; parsing never invokes it.
    pub type Validator = Box<dyn Fn(&str) -> bool + Send + Sync>;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum ErrorCode {
        #[default]
        NoError,
        InvalidOption,
    }

    impl ErrorCode {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::NoError => "no error",
                Self::InvalidOption => "invalid option",
            }
        }
    }

    impl fmt::Display for ErrorCode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Typed view of a failed `process` call, for `?` propagation.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ParseError {
        /// One or more option tokens matched no registered name or alias.
        #[error("invalid option: {}", .tokens.join(", "))]
        InvalidOption { tokens: Vec<String> },
    }

    /// Prefix a command with `-` (one character) or `--` (anything else).
    fn normalize(command: &str) -> String {
        if command.chars().count() == 1 {
            format!("-{command}")
        } else {
            format!("--{command}")
        }
    }

    /// A registered option and its parse result.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub struct OptionSpec {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        aliases: Vec<String>,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        description: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        hint: String,
        #[serde(default)]
        enabled: bool,
        #[serde(default)]
        value: String,
    }

    impl OptionSpec {
        fn new(command: &str, description: impl Into<String>) -> Self {
            Self {
                name: normalize(command),
                description: description.into(),
                ..Default::default()
            }
        }

        /// Add an alternate name. Normalized the same way as the command.
        pub fn alias(&mut self, alias: &str) -> &mut Self {
            self.aliases.push(normalize(alias));
            self
        }

        /// Set the value placeholder shown in help, without angle brackets.
        pub fn hint(&mut self, hint: impl Into<String>) -> &mut Self {
            self.hint = hint.into();
            self
        }

        /// Canonical name, including its dash prefix.
        pub fn name(&self) -> &str {
            &self.name
        }

        pub fn aliases(&self) -> &[String] {
            &self.aliases
        }

        pub fn description(&self) -> &str {
            &self.description
        }

        pub fn value_hint(&self) -> &str {
            &self.hint
        }

        /// Whether the option was seen by `process`.
        pub fn is_enabled(&self) -> bool {
            self.enabled
        }

        /// Last non-empty value supplied, or empty.
        pub fn value(&self) -> &str {
            &self.value
        }

        fn answers_to(&self, name: &str) -> bool {
            self.name == name || self.aliases.iter().any(|a| a == name)
        }
    }

    /// A registered positional slot and the token bound to it.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub struct PositionalArgSpec {
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        description: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        hint: String,
        #[serde(default)]
        value: String,
    }

    impl PositionalArgSpec {
        fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                description: description.into(),
                ..Default::default()
            }
        }

        pub fn hint(&mut self, hint: impl Into<String>) -> &mut Self {
            self.hint = hint.into();
            self
        }

        pub fn name(&self) -> &str {
            &self.name
        }

        pub fn description(&self) -> &str {
            &self.description
        }

        pub fn value_hint(&self) -> &str {
            &self.hint
        }

        pub fn value(&self) -> &str {
            &self.value
        }
    }

    /// Serializable snapshot of the parser after `process`.
    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "kebab-case")]
    pub struct ParseReport<'a> {
        pub application: &'a str,
        pub error_code: ErrorCode,
        pub error_message: String,
        pub options: &'a [OptionSpec],
        pub arguments: &'a [PositionalArgSpec],
        pub extra: &'a [String],
    }

    /// Option/argument schema plus the state left by `process`.
    ///
    /// Results are written in place and are not cleared by a later `process`
    /// call; in particular `error_code` stays `InvalidOption` once set. Call
    /// `reset` to start over with the same schema.
    #[derive(Debug, Clone)]
    pub struct ArgumentParser {
        options: Vec<OptionSpec>,
        positionals: Vec<PositionalArgSpec>,
        application_path: String,
        args: Vec<String>,
        extra: Vec<String>,
        rejected: Vec<String>,
        error_code: ErrorCode,
        help_requested: bool,
    }

    impl Default for ArgumentParser {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ArgumentParser {
        /// Create a parser with the built-in `-h`/`--help` option registered.
        pub fn new() -> Self {
            let mut parser = Self {
                options: Vec::new(),
                positionals: Vec::new(),
                application_path: String::new(),
                args: Vec::new(),
                extra: Vec::new(),
                rejected: Vec::new(),
                error_code: ErrorCode::NoError,
                help_requested: false,
            };
            parser.add_option(HELP_COMMAND, "Show help").alias(HELP_ALIAS);
            parser
        }

        /// Register an option. Returns the new entry for `alias`/`hint` chaining.
        ///
        /// No uniqueness check is made; when two entries answer to the same
        /// name the one registered first wins.
        pub fn add_option(
            &mut self,
            command: &str,
            description: impl Into<String>,
        ) -> &mut OptionSpec {
            self.options.push(OptionSpec::new(command, description));
            let last = self.options.len() - 1;
            &mut self.options[last]
        }

        /// Register an option with its aliases and value hint in one call.
        pub fn add_option_with(
            &mut self,
            command: &str,
            description: impl Into<String>,
            aliases: &[&str],
            hint: &str,
        ) -> &mut OptionSpec {
            let option = self.add_option(command, description);
            for alias in aliases {
                option.alias(alias);
            }
            option.hint(hint)
        }

        /// Register a positional slot. Slots bind in registration order.
        pub fn add_positional_argument(
            &mut self,
            name: impl Into<String>,
            description: impl Into<String>,
        ) -> &mut PositionalArgSpec {
            self.positionals
                .push(PositionalArgSpec::new(name, description));
            let last = self.positionals.len() - 1;
            &mut self.positionals[last]
        }

        pub fn add_positional_argument_with(
            &mut self,
            name: impl Into<String>,
            description: impl Into<String>,
            hint: &str,
        ) -> &mut PositionalArgSpec {
            self.add_positional_argument(name, description).hint(hint)
        }

        /// Parse `argv`, whose first element is the application path.
        ///
        /// If an option token is exactly `-h` or `--help` (no value attached),
        /// help is printed to stdout and nothing else is evaluated. Otherwise every option token is applied; unknown
        /// ones set `ErrorCode::InvalidOption` without stopping the scan.
        /// Returns `false` if any option token was unknown.
        pub fn process<I>(&mut self, argv: I) -> bool
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            let mut argv = argv.into_iter().map(Into::<String>::into);
            self.application_path = argv.next().unwrap_or_default();
            self.args = argv.collect();
            self.help_requested = false;

            let classified = token::classify(&self.args);
            tracing::debug!(
                options = classified.options.len(),
                positionals = classified.positionals.len(),
                "classified arguments"
            );

            if classified
                .options
                .iter()
                .any(|t| HELP_FLAGS.contains(&t.joined.as_str()))
            {
                self.help_requested = true;
                self.show_help();
                return true;
            }

            let mut ok = true;
            for opt in &classified.options {
                let Some((name, value)) = token::match_option(&opt.joined) else {
                    tracing::trace!(token = %opt.joined, "ignoring malformed option token");
                    continue;
                };
                if !self.set_option(name, value) {
                    tracing::warn!(option = name, "unknown option");
                    self.error_code = ErrorCode::InvalidOption;
                    self.rejected.push(name.to_string());
                    ok = false;
                }
            }

            self.bind_positionals(classified.positionals);
            ok
        }

        fn set_option(&mut self, name: &str, value: &str) -> bool {
            let Some(option) = self.options.iter_mut().find(|o| o.answers_to(name)) else {
                return false;
            };
            option.enabled = true;
            if !value.is_empty() {
                option.value = value.to_string();
            }
            tracing::debug!(option = %option.name, value, "option set");
            true
        }

        fn bind_positionals(&mut self, tokens: Vec<String>) {
            let mut tokens = tokens.into_iter();
            for (slot, token) in self.positionals.iter_mut().zip(tokens.by_ref()) {
                slot.value = token;
            }
            self.extra = tokens.collect();
            if !self.extra.is_empty() {
                tracing::debug!(count = self.extra.len(), "unbound positional arguments");
            }
        }

        fn find_option(&self, name: &str) -> Option<&OptionSpec> {
            let name = normalize(name);
            self.options.iter().find(|o| o.answers_to(&name))
        }

        /// `(enabled, value)` for an option given by canonical name or alias,
        /// without dashes. Unknown names give `(false, "")`.
        pub fn is_set(&self, name: &str) -> (bool, &str) {
            self.find_option(name)
                .map_or((false, ""), |o| (o.enabled, o.value.as_str()))
        }

        /// The value of an enabled option, if one was supplied.
        pub fn value(&self, name: &str) -> Option<&str> {
            self.find_option(name)
                .filter(|o| o.enabled && !o.value.is_empty())
                .map(|o| o.value.as_str())
        }

        pub fn options(&self) -> &[OptionSpec] {
            &self.options
        }

        pub fn positional_arguments(&self) -> &[PositionalArgSpec] {
            &self.positionals
        }

        /// The token bound to the first slot called `name`, if any.
        pub fn positional(&self, name: &str) -> Option<&str> {
            self.positionals
                .iter()
                .find(|a| a.name == name)
                .filter(|a| !a.value.is_empty())
                .map(|a| a.value.as_str())
        }

        /// Positional tokens left over after every slot was filled.
        pub fn extra_arguments(&self) -> &[String] {
            &self.extra
        }

        /// Raw tokens after the application path.
        pub fn args(&self) -> &[String] {
            &self.args
        }

        /// The application path exactly as passed in `argv[0]`.
        pub fn application_name(&self) -> &str {
            &self.application_path
        }

        pub fn error_code(&self) -> ErrorCode {
            self.error_code
        }

        pub fn error_message(&self) -> String {
            format!("Error: {}", self.error_code)
        }

        /// Whether the last `process` call stopped at `-h`/`--help`.
        pub fn help_requested(&self) -> bool {
            self.help_requested
        }

        pub fn check(&self) -> Result<(), ParseError> {
            match self.error_code {
                ErrorCode::NoError => Ok(()),
                ErrorCode::InvalidOption => Err(ParseError::InvalidOption {
                    tokens: self.rejected.clone(),
                }),
            }
        }

        /// Clear every parse result, including the error code. The schema stays.
        pub fn reset(&mut self) {
            for option in &mut self.options {
                option.enabled = false;
                option.value.clear();
            }
            for arg in &mut self.positionals {
                arg.value.clear();
            }
            self.application_path.clear();
            self.args.clear();
            self.extra.clear();
            self.rejected.clear();
            self.error_code = ErrorCode::NoError;
            self.help_requested = false;
        }

        pub fn report(&self) -> ParseReport<'_> {
            ParseReport {
                application: &self.application_path,
                error_code: self.error_code,
                error_message: self.error_message(),
                options: &self.options,
                arguments: &self.positionals,
                extra: &self.extra,
            }
        }

        pub fn help_text(&self) -> String {
            help::render(&self.application_path, &self.options, &self.positionals)
        }

        /// Write `help_text` to stdout.
        pub fn show_help(&self) {
            let text = self.help_text();
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
            {
                tracing::warn!(error = %err, "failed to write help");
            }
        }
    }
}

pub use parser::{
    ArgumentParser, ErrorCode, OptionSpec, ParseError, ParseReport, PositionalArgSpec, Validator,
};
