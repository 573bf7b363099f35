//! Locale catalog for every message this library emits on its own.
//!
//! A [`Catalog`] is plain data: static strings for section headers and
//! chrome briefs, function pointers for messages that interpolate runtime
//! values. User briefs are never translated, only library chrome is.
//! Applications register additional catalogs with
//! [`AppConfig::catalog`](crate::AppConfig::catalog); the built-in locale is
//! `en`.

use crate::scanner::ScanError;

#[derive(Clone)]
pub struct Catalog {
    pub locale: &'static str,

    // section headers
    pub usage_header: &'static str,
    pub aliases_header: &'static str,
    pub flags_header: &'static str,
    pub arguments_header: &'static str,
    pub commands_header: &'static str,

    // briefs for the built-in chrome flags
    pub help_brief: &'static str,
    pub help_all_brief: &'static str,
    pub version_brief: &'static str,
    pub negated_flag_brief: fn(display_name: &str) -> String,

    // diagnostics
    pub no_command_registered_for_input:
        fn(input: &str, corrections: &[String], serial_comma: bool) -> String,
    pub no_text_available_for_locale: fn(requested: &str, fallback: &str) -> String,
    pub current_version_is_not_latest:
        fn(current: &str, latest: &str, upgrade_command: Option<&str>) -> String,
    pub exception_while_parsing_arguments: fn(details: &str) -> String,
    pub exception_while_loading_command_function: fn(details: &str) -> String,
    pub command_error_result: fn(details: &str) -> String,
    pub command_error_context_load: fn(details: &str) -> String,
    pub scanner_error: fn(error: &ScanError, serial_comma: bool) -> String,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").field("locale", &self.locale).finish()
    }
}

/// Join `items` with `, ` and a final conjunction, optionally with a serial
/// comma before the conjunction.
pub fn join_with_conjunction(conjunction: &str, items: &[String], serial_comma: bool) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [a, b] => format!("{} {} {}", a, conjunction, b),
        _ => {
            let head = items[..items.len() - 1].join(", ");
            let comma = if serial_comma { "," } else { "" };
            format!(
                "{}{} {} {}",
                head,
                comma,
                conjunction,
                items[items.len() - 1]
            )
        }
    }
}

fn en_negated_flag_brief(display_name: &str) -> String {
    format!("Sets {} to false", display_name)
}

fn en_no_command_registered(input: &str, corrections: &[String], serial_comma: bool) -> String {
    let mut out = format!("No command registered for `{}`", input);
    if !corrections.is_empty() {
        let quoted = corrections
            .iter()
            .map(|c| format!("`{}`", c))
            .collect::<Vec<_>>();
        out.push_str(", did you mean ");
        out.push_str(&join_with_conjunction("or", &quoted, serial_comma));
        out.push('?');
    }
    out
}

fn en_no_text_available(requested: &str, fallback: &str) -> String {
    format!(
        "No text available for locale `{}`, defaulting to `{}`",
        requested, fallback
    )
}

fn en_version_is_not_latest(current: &str, latest: &str, upgrade_command: Option<&str>) -> String {
    let mut out = format!(
        "A newer version {} is available (current version is {})",
        latest, current
    );
    if let Some(cmd) = upgrade_command {
        out.push_str(&format!(", upgrade via `{}`", cmd));
    }
    out
}

fn en_while_parsing_arguments(details: &str) -> String {
    format!("Unable to parse arguments: {}", details)
}

fn en_while_loading_command(details: &str) -> String {
    format!("Unable to load command implementation: {}", details)
}

fn en_command_error_result(details: &str) -> String {
    details.to_string()
}

fn en_context_load(details: &str) -> String {
    format!("Unable to build context for command: {}", details)
}

fn en_scanner_error(error: &ScanError, serial_comma: bool) -> String {
    match error {
        ScanError::FlagNotFound {
            input, corrections, ..
        } => {
            let mut out = format!("No flag registered for `--{}`", input);
            if !corrections.is_empty() {
                let quoted = corrections
                    .iter()
                    .map(|c| format!("`--{}`", c))
                    .collect::<Vec<_>>();
                out.push_str(", did you mean ");
                out.push_str(&join_with_conjunction("or", &quoted, serial_comma));
                out.push('?');
            }
            out
        }
        ScanError::AliasNotFound { alias } => {
            format!("No alias registered for `-{}`", alias)
        }
        ScanError::DuplicateFlag { name } => {
            format!("Flag `--{}` was already specified", name)
        }
        ScanError::MissingValueForFlag { name } => {
            format!("Expected input for flag `--{}`", name)
        }
        ScanError::MissingArgument { placeholder } => {
            format!("Expected input for argument `{}`", placeholder)
        }
        ScanError::TooManyArguments { expected } => {
            format!("Too many arguments, expected at most {}", expected)
        }
        ScanError::EnumValueNotAllowed {
            name,
            value,
            allowed,
        } => format!(
            "`{}` is not one of ({}) for flag `--{}`",
            value,
            allowed.join("|"),
            name
        ),
        ScanError::InvalidParsedValue {
            name,
            value,
            message,
        } => format!("Failed to parse `{}` for {}: {}", value, name, message),
        ScanError::NegationNotAllowed { input, name } => {
            format!("Flag `--{}` cannot be negated via `--{}`", name, input)
        }
        ScanError::CollidingFlagName { input, names } => {
            let quoted = names
                .iter()
                .map(|n| format!("`--{}`", n))
                .collect::<Vec<_>>();
            format!(
                "`--{}` matches multiple flags: {}",
                input,
                join_with_conjunction("and", &quoted, serial_comma)
            )
        }
    }
}

impl Catalog {
    /// The built-in `en` locale.
    pub fn en() -> Self {
        Self {
            locale: "en",
            usage_header: "USAGE",
            aliases_header: "ALIASES",
            flags_header: "FLAGS",
            arguments_header: "ARGUMENTS",
            commands_header: "COMMANDS",
            help_brief: "Print help information and exit",
            help_all_brief: "Print help information (including hidden entries) and exit",
            version_brief: "Print version information and exit",
            negated_flag_brief: en_negated_flag_brief,
            no_command_registered_for_input: en_no_command_registered,
            no_text_available_for_locale: en_no_text_available,
            current_version_is_not_latest: en_version_is_not_latest,
            exception_while_parsing_arguments: en_while_parsing_arguments,
            exception_while_loading_command_function: en_while_loading_command,
            command_error_result: en_command_error_result,
            command_error_context_load: en_context_load,
            scanner_error: en_scanner_error,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::en()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn joins_zero_one_and_two_items() {
        assert_eq!(join_with_conjunction("or", &[], true), "");
        assert_eq!(join_with_conjunction("or", &s(&["a"]), true), "a");
        assert_eq!(join_with_conjunction("or", &s(&["a", "b"]), true), "a or b");
    }

    #[test]
    fn serial_comma_is_optional() {
        let items = s(&["a", "b", "c"]);
        assert_eq!(join_with_conjunction("and", &items, true), "a, b, and c");
        assert_eq!(join_with_conjunction("and", &items, false), "a, b and c");
    }

    #[test]
    fn route_suggestion_message() {
        let msg = en_no_command_registered("fo", &s(&["foo"]), true);
        assert_eq!(msg, "No command registered for `fo`, did you mean `foo`?");
        let msg = en_no_command_registered("fo", &[], true);
        assert_eq!(msg, "No command registered for `fo`");
    }

    #[test]
    fn flag_suggestion_message() {
        let err = ScanError::FlagNotFound {
            input: "verbos".to_string(),
            known: s(&["verbose"]),
            corrections: s(&["verbose"]),
        };
        assert_eq!(
            en_scanner_error(&err, true),
            "No flag registered for `--verbos`, did you mean `--verbose`?"
        );
    }

    #[test]
    fn version_message_names_upgrade_command() {
        let msg = en_version_is_not_latest("1.0.0", "1.2.0", Some("pkg up"));
        assert_eq!(
            msg,
            "A newer version 1.2.0 is available (current version is 1.0.0), upgrade via `pkg up`"
        );
    }
}
