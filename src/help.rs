//! Help and usage rendering: USAGE, ALIASES, FLAGS, ARGUMENTS and COMMANDS
//! sections with column alignment and optional ANSI styling.
//!
//! Column widths are computed from the unstyled text so escape sequences
//! never disturb the padding.

use crate::case::{camel_to_kebab, upper_first};
use crate::color::Painter;
use crate::params::{Flag, FlagKind, Positionals, Variadic};
use crate::routes::{Command, RouteMap, RoutingTarget};
use crate::text::Catalog;

/// Which spelling of camelCase names the help output shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayCase {
    #[default]
    Original,
    ConvertCamelToKebab,
}

/// Documentation rendering options, fixed per application.
#[derive(Debug, Clone, Copy)]
pub struct DocConfig {
    /// Show `-c` instead of `--count` in the usage line when an alias exists.
    pub use_alias_in_usage_line: bool,
    /// Always list `--helpAll`, even without hidden entries.
    pub always_show_help_all: bool,
    /// Use the serial comma when joining lists of three or more.
    pub serial_comma: bool,
    pub case_style: DisplayCase,
    /// Master switch for ANSI styling; the environment and the stream's
    /// color depth still have a veto.
    pub use_ansi_color: bool,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            use_alias_in_usage_line: false,
            always_show_help_all: false,
            serial_comma: true,
            case_style: DisplayCase::Original,
            use_ansi_color: true,
        }
    }
}

pub(crate) struct HelpEnv<'a> {
    pub(crate) docs: &'a DocConfig,
    pub(crate) catalog: &'a Catalog,
    pub(crate) painter: Painter,
    pub(crate) has_version: bool,
}

fn display_name(name: &str, case: DisplayCase) -> String {
    match case {
        DisplayCase::Original => name.to_string(),
        DisplayCase::ConvertCamelToKebab => camel_to_kebab(name),
    }
}

fn display_negated(name: &str, case: DisplayCase) -> String {
    match case {
        DisplayCase::Original => format!("no{}", upper_first(name)),
        DisplayCase::ConvertCamelToKebab => format!("no-{}", camel_to_kebab(name)),
    }
}

fn flag_placeholder(flag: &Flag) -> Option<String> {
    match &flag.kind {
        FlagKind::Boolean { .. } | FlagKind::Counter => None,
        FlagKind::Choice { values, .. } => Some(format!("({})", values.join("|"))),
        FlagKind::Parsed { placeholder, .. } => Some(format!(
            "<{}>",
            placeholder.as_deref().unwrap_or("value")
        )),
    }
}

fn flag_default(flag: &Flag) -> Option<String> {
    match &flag.kind {
        FlagKind::Boolean { default, .. } => default.map(|d| d.to_string()),
        FlagKind::Counter => None,
        FlagKind::Choice { default, .. } => default.clone(),
        FlagKind::Parsed { default, .. } => default.clone(),
    }
}

fn flag_separator(flag: &Flag) -> Option<char> {
    match flag.kind {
        FlagKind::Parsed {
            variadic: Variadic::Separator(sep),
            ..
        } => Some(sep),
        _ => None,
    }
}

fn is_variadic(flag: &Flag) -> bool {
    matches!(
        flag.kind,
        FlagKind::Parsed {
            variadic: Variadic::Repeat | Variadic::Separator(_),
            ..
        }
    )
}

struct Row {
    left: String,
    painted_left: String,
    right: String,
}

fn plain_row(left: String, right: String) -> Row {
    Row {
        painted_left: left.clone(),
        left,
        right,
    }
}

fn right_text(painter: &Painter, brief: &str, suffix: Option<String>) -> String {
    let mut right = String::new();
    if !brief.is_empty() {
        right.push_str(&painter.brief(brief));
    }
    if let Some(suffix) = suffix {
        if !right.is_empty() {
            right.push(' ');
        }
        right.push_str(&painter.dim(&suffix));
    }
    right
}

fn push_section(out: &mut String, header: &str, rows: &[Row], painter: &Painter) {
    if rows.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&painter.header(header));
    out.push('\n');
    let width = rows.iter().map(|r| r.left.chars().count()).max().unwrap_or(0);
    for row in rows {
        out.push_str("  ");
        out.push_str(&row.painted_left);
        if row.right.is_empty() {
            out.push('\n');
            continue;
        }
        for _ in row.left.chars().count()..width {
            out.push(' ');
        }
        out.push_str("  ");
        out.push_str(&row.right);
        out.push('\n');
    }
}

fn alias_for<'a>(command: &'a Command, name: &str) -> Option<char> {
    command
        .aliases
        .iter()
        .find(|(_, n)| n == name)
        .map(|(a, _)| *a)
}

fn usage_flag_token(command: &Command, name: &str, flag: &Flag, docs: &DocConfig) -> String {
    let display = if docs.use_alias_in_usage_line {
        match alias_for(command, name) {
            Some(alias) => format!("-{}", alias),
            None => format!("--{}", display_name(name, docs.case_style)),
        }
    } else {
        format!("--{}", display_name(name, docs.case_style))
    };
    let mut inner = display;
    if let Some(ph) = flag_placeholder(flag) {
        inner.push(' ');
        inner.push_str(&ph);
    }
    if is_variadic(flag) || matches!(flag.kind, FlagKind::Counter) {
        inner.push_str(" ...");
    }
    let optional = match &flag.kind {
        FlagKind::Boolean { .. } | FlagKind::Counter => true,
        FlagKind::Choice { default, .. } => flag.optional || default.is_some(),
        FlagKind::Parsed { default, .. } => flag.optional || default.is_some(),
    };
    if optional {
        format!("[{}]", inner)
    } else {
        inner
    }
}

fn usage_positional_tokens(positionals: &Positionals) -> Vec<String> {
    match positionals {
        Positionals::Tuple(params) => params
            .iter()
            .map(|p| {
                if p.optional {
                    format!("[{}]", p.placeholder)
                } else {
                    format!("<{}>", p.placeholder)
                }
            })
            .collect(),
        Positionals::Array {
            param, minimum, ..
        } => {
            let required = minimum.map_or(false, |m| m > 0);
            if required {
                vec![format!("<{}> ...", param.placeholder)]
            } else {
                vec![format!("[{} ...]", param.placeholder)]
            }
        }
    }
}

fn has_hidden_entries(command: &Command) -> bool {
    command.flags.iter().any(|(_, f)| f.hidden)
}

fn show_help_all(env: &HelpEnv<'_>, has_hidden: bool) -> bool {
    env.docs.always_show_help_all || has_hidden
}

fn chrome_rows(env: &HelpEnv<'_>, has_hidden: bool, root_level: bool) -> Vec<Row> {
    let case = env.docs.case_style;
    let mut rows = vec![plain_row(
        format!("-h, --{}", display_name("help", case)),
        right_text(&env.painter, env.catalog.help_brief, None),
    )];
    if show_help_all(env, has_hidden) {
        rows.push(plain_row(
            format!("-H, --{}", display_name("helpAll", case)),
            right_text(&env.painter, env.catalog.help_all_brief, None),
        ));
    }
    if root_level && env.has_version {
        rows.push(plain_row(
            "-v, --version".to_string(),
            right_text(&env.painter, env.catalog.version_brief, None),
        ));
    }
    rows
}

fn aliases_section(out: &mut String, prefix: &[String], aliases: &[String], env: &HelpEnv<'_>) {
    if aliases.is_empty() || prefix.is_empty() {
        return;
    }
    let parent = &prefix[..prefix.len() - 1];
    let rows = aliases
        .iter()
        .map(|alias| {
            let mut path = parent.join(" ");
            if !path.is_empty() {
                path.push(' ');
            }
            path.push_str(alias);
            plain_row(path, String::new())
        })
        .collect::<Vec<_>>();
    push_section(out, env.catalog.aliases_header, &rows, &env.painter);
}

/// Render the help page of a command reached at `prefix`.
pub(crate) fn format_command_help(
    command: &Command,
    prefix: &[String],
    aliases: &[String],
    env: &HelpEnv<'_>,
    root_level: bool,
    help_all: bool,
) -> String {
    let mut out = String::new();
    let about = command
        .full_description
        .as_deref()
        .unwrap_or(&command.brief);
    if !about.is_empty() {
        out.push_str(about);
        out.push('\n');
    }

    // USAGE
    let path = prefix.join(" ");
    let mut usage = path.clone();
    for (name, flag) in &command.flags {
        if flag.hidden && !help_all {
            continue;
        }
        usage.push(' ');
        usage.push_str(&usage_flag_token(command, name, flag, env.docs));
    }
    for token in usage_positional_tokens(&command.positionals) {
        usage.push(' ');
        usage.push_str(&token);
    }
    let has_hidden = has_hidden_entries(command);
    let mut usage_rows = vec![plain_row(usage, String::new())];
    usage_rows.push(plain_row(
        format!("{} --{}", path, display_name("help", env.docs.case_style)),
        String::new(),
    ));
    if show_help_all(env, has_hidden) {
        usage_rows.push(plain_row(
            format!("{} --{}", path, display_name("helpAll", env.docs.case_style)),
            String::new(),
        ));
    }
    if root_level && env.has_version {
        usage_rows.push(plain_row(format!("{} --version", path), String::new()));
    }
    push_section(&mut out, env.catalog.usage_header, &usage_rows, &env.painter);

    aliases_section(&mut out, prefix, aliases, env);

    // FLAGS
    let mut rows = Vec::new();
    for (name, flag) in &command.flags {
        if flag.hidden && !help_all {
            continue;
        }
        let mut left = match alias_for(command, name) {
            Some(alias) => format!("-{}, ", alias),
            None => "    ".to_string(),
        };
        left.push_str("--");
        left.push_str(&display_name(name, env.docs.case_style));
        if let Some(ph) = flag_placeholder(flag) {
            left.push(' ');
            left.push_str(&ph);
        }
        if is_variadic(flag) {
            left.push_str(" ...");
        }
        let mut suffix = Vec::new();
        if let Some(sep) = flag_separator(flag) {
            suffix.push(format!("[separator = \"{}\"]", sep));
        }
        if let Some(default) = flag_default(flag) {
            suffix.push(format!("[default {}]", default));
        }
        let suffix = if suffix.is_empty() {
            None
        } else {
            Some(suffix.join(" "))
        };
        rows.push(plain_row(left, right_text(&env.painter, &flag.brief, suffix)));

        if flag.negation_allowed() {
            let negated = display_negated(name, env.docs.case_style);
            let display = format!("--{}", display_name(name, env.docs.case_style));
            rows.push(plain_row(
                format!("    --{}", negated),
                right_text(
                    &env.painter,
                    &(env.catalog.negated_flag_brief)(&display),
                    None,
                ),
            ));
        }
    }
    rows.extend(chrome_rows(env, has_hidden, root_level));
    push_section(&mut out, env.catalog.flags_header, &rows, &env.painter);

    // ARGUMENTS
    let mut rows = Vec::new();
    match &command.positionals {
        Positionals::Tuple(params) => {
            for param in params {
                let left = if param.optional {
                    format!("[{}]", param.placeholder)
                } else {
                    format!("<{}>", param.placeholder)
                };
                let suffix = param.default.as_ref().map(|d| format!("[default {}]", d));
                rows.push(plain_row(left, right_text(&env.painter, &param.brief, suffix)));
            }
        }
        Positionals::Array { param, .. } => {
            rows.push(plain_row(
                format!("<{}> ...", param.placeholder),
                right_text(&env.painter, &param.brief, None),
            ));
        }
    }
    push_section(&mut out, env.catalog.arguments_header, &rows, &env.painter);

    out
}

/// Render the help page of a route map reached at `prefix`.
pub(crate) fn format_route_map_help(
    map: &RouteMap,
    prefix: &[String],
    aliases: &[String],
    env: &HelpEnv<'_>,
    root_level: bool,
    help_all: bool,
) -> String {
    let mut out = String::new();
    let about = map.full_description.as_deref().unwrap_or(&map.brief);
    if !about.is_empty() {
        out.push_str(about);
        out.push('\n');
    }

    let has_hidden = map.entries().any(|e| e.hidden);
    let path = prefix.join(" ");
    let case = env.docs.case_style;

    // USAGE: one line per visible route
    let mut usage_rows = Vec::new();
    for entry in map.entries() {
        if entry.hidden && !help_all {
            continue;
        }
        usage_rows.push(plain_row(
            format!("{} {} ...", path, display_name(&entry.name, case)),
            String::new(),
        ));
    }
    usage_rows.push(plain_row(
        format!("{} --{}", path, display_name("help", case)),
        String::new(),
    ));
    if show_help_all(env, has_hidden) {
        usage_rows.push(plain_row(
            format!("{} --{}", path, display_name("helpAll", case)),
            String::new(),
        ));
    }
    if root_level && env.has_version {
        usage_rows.push(plain_row(format!("{} --version", path), String::new()));
    }
    push_section(&mut out, env.catalog.usage_header, &usage_rows, &env.painter);

    aliases_section(&mut out, prefix, aliases, env);

    let rows = chrome_rows(env, has_hidden, root_level);
    push_section(&mut out, env.catalog.flags_header, &rows, &env.painter);

    // COMMANDS
    let mut rows = Vec::new();
    for entry in map.entries() {
        if entry.hidden && !help_all {
            continue;
        }
        let mut left = display_name(&entry.name, case);
        for alias in map.aliases_of(&entry.name) {
            left.push_str(", ");
            left.push_str(alias);
        }
        let painted_left = env.painter.route(&left);
        let is_default = map.default_command.as_deref() == Some(entry.name.as_str());
        let suffix = if is_default {
            Some("(default)".to_string())
        } else {
            None
        };
        rows.push(Row {
            right: right_text(&env.painter, entry.target.brief(), suffix),
            left,
            painted_left,
        });
    }
    push_section(&mut out, env.catalog.commands_header, &rows, &env.painter);

    out
}

/// The usage line alone, used by diagnostics that want to point at it.
pub(crate) fn format_usage_line(command: &Command, prefix: &[String], docs: &DocConfig) -> String {
    let mut usage = prefix.join(" ");
    for (name, flag) in &command.flags {
        if flag.hidden {
            continue;
        }
        usage.push(' ');
        usage.push_str(&usage_flag_token(command, name, flag, docs));
    }
    for token in usage_positional_tokens(&command.positionals) {
        usage.push(' ');
        usage.push_str(&token);
    }
    usage
}

pub(crate) fn target_help(
    target: &RoutingTarget,
    prefix: &[String],
    aliases: &[String],
    env: &HelpEnv<'_>,
    root_level: bool,
    help_all: bool,
) -> String {
    match target {
        RoutingTarget::Command(command) => {
            format_command_help(command, prefix, aliases, env, root_level, help_all)
        }
        RoutingTarget::Map(map) => {
            format_route_map_help(map, prefix, aliases, env, root_level, help_all)
        }
    }
}

impl Command {
    /// Plain (unstyled) help page for this command under `prefix`.
    pub fn format_help(&self, prefix: &[String], docs: &DocConfig, catalog: &Catalog) -> String {
        let env = HelpEnv {
            docs,
            catalog,
            painter: Painter::new(false),
            has_version: false,
        };
        format_command_help(self, prefix, &[], &env, false, false)
    }

    /// The usage line of this command under `prefix`.
    pub fn format_usage_line(&self, prefix: &[String], docs: &DocConfig) -> String {
        format_usage_line(self, prefix, docs)
    }
}

impl RouteMap {
    /// Plain (unstyled) help page for this route map under `prefix`.
    pub fn format_help(&self, prefix: &[String], docs: &DocConfig, catalog: &Catalog) -> String {
        let env = HelpEnv {
            docs,
            catalog,
            painter: Painter::new(false),
            has_version: false,
        };
        format_route_map_help(self, prefix, &[], &env, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{number_parser, PositionalParam};

    fn plain_env<'a>(docs: &'a DocConfig, catalog: &'a Catalog) -> HelpEnv<'a> {
        HelpEnv {
            docs,
            catalog,
            painter: Painter::new(false),
            has_version: false,
        }
    }

    fn pfx(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn command_help_golden() {
        let cmd = Command::builder(|_, _| Ok(()))
            .brief("Copy a thing")
            .flag("force", Flag::boolean().brief("Overwrite"))
            .positionals(Positionals::tuple([
                PositionalParam::string("source").brief("Source path"),
            ]))
            .build();
        let docs = DocConfig::default();
        let catalog = Catalog::en();
        let env = plain_env(&docs, &catalog);
        let help = format_command_help(&cmd, &pfx(&["cli", "copy"]), &[], &env, false, false);
        let expected = "\
Copy a thing

USAGE
  cli copy [--force] <source>
  cli copy --help

FLAGS
      --force  Overwrite
  -h, --help   Print help information and exit

ARGUMENTS
  <source>  Source path
";
        assert_eq!(help, expected);
    }

    #[test]
    fn route_map_help_golden() {
        let map = RouteMap::builder()
            .brief("Manage items")
            .route(
                "add",
                Command::builder(|_, _| Ok(())).brief("Add an item").build(),
            )
            .route(
                "removeAll",
                Command::builder(|_, _| Ok(()))
                    .brief("Remove everything")
                    .build(),
            )
            .alias("rm", "removeAll")
            .hidden_route(
                "debug",
                Command::builder(|_, _| Ok(())).brief("Dump state").build(),
            )
            .build();
        let docs = DocConfig::default();
        let catalog = Catalog::en();
        let env = plain_env(&docs, &catalog);
        let help = format_route_map_help(&map, &pfx(&["cli", "item"]), &[], &env, false, false);
        let expected = "\
Manage items

USAGE
  cli item add ...
  cli item removeAll ...
  cli item --help
  cli item --helpAll

FLAGS
  -h, --help     Print help information and exit
  -H, --helpAll  Print help information (including hidden entries) and exit

COMMANDS
  add            Add an item
  removeAll, rm  Remove everything
";
        assert_eq!(help, expected);
    }

    #[test]
    fn help_all_reveals_hidden_entries() {
        let cmd = Command::builder(|_, _| Ok(()))
            .flag("secret", Flag::boolean().hidden().brief("Internal"))
            .build();
        let docs = DocConfig::default();
        let catalog = Catalog::en();
        let env = plain_env(&docs, &catalog);
        let brief = format_command_help(&cmd, &pfx(&["cli"]), &[], &env, false, false);
        assert!(!brief.contains("--secret"));
        assert!(brief.contains("--helpAll"));
        let full = format_command_help(&cmd, &pfx(&["cli"]), &[], &env, false, true);
        assert!(full.contains("--secret"));
    }

    #[test]
    fn enum_variadic_and_default_annotations() {
        let cmd = Command::builder(|_, _| Ok(()))
            .flag("level", Flag::choice(["low", "high"]).default_value("low"))
            .flag(
                "ports",
                Flag::parsed(number_parser)
                    .separator(',')
                    .placeholder("port")
                    .optional(),
            )
            .build();
        let docs = DocConfig::default();
        let catalog = Catalog::en();
        let env = plain_env(&docs, &catalog);
        let help = format_command_help(&cmd, &pfx(&["cli"]), &[], &env, false, false);
        assert!(help.contains("--level (low|high)"));
        assert!(help.contains("[default low]"));
        assert!(help.contains("--ports <port> ..."));
        assert!(help.contains("[separator = \",\"]"));
    }

    #[test]
    fn negated_rows_follow_their_flag() {
        let cmd = Command::builder(|_, _| Ok(()))
            .flag(
                "colorOutput",
                Flag::boolean().default_enabled(true).brief("Use color"),
            )
            .build();
        let catalog = Catalog::en();
        let docs = DocConfig::default();
        let env = plain_env(&docs, &catalog);
        let help = format_command_help(&cmd, &pfx(&["cli"]), &[], &env, false, false);
        assert!(help.contains("--noColorOutput"));

        let kebab = DocConfig {
            case_style: DisplayCase::ConvertCamelToKebab,
            ..DocConfig::default()
        };
        let env = plain_env(&kebab, &catalog);
        let help = format_command_help(&cmd, &pfx(&["cli"]), &[], &env, false, false);
        assert!(help.contains("--no-color-output"));
        assert!(help.contains("--color-output"));
        assert!(!help.contains("--colorOutput"));
    }

    #[test]
    fn aliases_section_lists_sibling_spellings() {
        let cmd = Command::builder(|_, _| Ok(())).brief("Remove").build();
        let docs = DocConfig::default();
        let catalog = Catalog::en();
        let env = plain_env(&docs, &catalog);
        let help = format_command_help(
            &cmd,
            &pfx(&["cli", "removeAll"]),
            &pfx(&["rm"]),
            &env,
            false,
            false,
        );
        assert!(help.contains("ALIASES\n  cli rm\n"));
    }

    #[test]
    fn usage_line_can_prefer_aliases() {
        let cmd = Command::builder(|_, _| Ok(()))
            .flag("count", Flag::parsed(number_parser).placeholder("n"))
            .alias('c', "count")
            .build();
        let docs = DocConfig {
            use_alias_in_usage_line: true,
            ..DocConfig::default()
        };
        assert_eq!(
            format_usage_line(&cmd, &pfx(&["cli"]), &docs),
            "cli -c <n>"
        );
        let docs = DocConfig::default();
        assert_eq!(
            format_usage_line(&cmd, &pfx(&["cli"]), &docs),
            "cli --count <n>"
        );
    }
}
