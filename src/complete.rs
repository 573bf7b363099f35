//! Completion proposals for the token under the cursor.
//!
//! The proposer replays the route scanner over everything before the
//! partial token, then consults either the reached map (route names) or the
//! reached command (flag names, aliases, enum values) for candidates. Shell
//! integration receives one completion per line.

use crate::context::RunContext;
use crate::params::{FlagKind, Positionals, Variadic};
use crate::routes::{Command, RouteMap, RoutingTarget};
use crate::route_scan::RouteScanner;
use crate::scanner::{scan_arguments, HelpRequest, ScanResult, ScannerConfig};
use crate::scanner::CaseStyle;
use crate::case::{camel_to_kebab, kebab_to_camel};
use crate::app::Application;

/// What kind of thing a completion stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    RouteName,
    RouteAlias,
    LongFlag,
    FlagAlias,
    EnumValue,
    PositionalValue,
}

/// One ranked proposal for the partial token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub kind: CompletionKind,
    pub completion: String,
    pub brief: String,
}

/// What the proposer is allowed to surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionConfig {
    pub include_aliases: bool,
    pub include_hidden_routes: bool,
}

/// Propose completions for the final token of `argv`; callers append an
/// empty token when the line ends on a separator.
pub fn propose_completions(
    app: &Application,
    argv: &[String],
    _ctx: &RunContext,
) -> Vec<Completion> {
    let (partial, rest) = match argv.split_last() {
        Some((last, rest)) => (last.as_str(), rest),
        None => ("", argv),
    };
    let case_style = app.scanner_config().case_style;
    let mut scanner = RouteScanner::new(app.root().clone(), app.name(), case_style);
    for token in rest {
        if scanner.next(token).is_err() {
            return Vec::new();
        }
    }
    let result = scanner.finish_without_default();
    if result.help != HelpRequest::None {
        return Vec::new();
    }
    match &result.target {
        RoutingTarget::Map(map) => route_completions(map, partial, app),
        RoutingTarget::Command(command) => {
            command_completions(command, &result.unprocessed, partial, app)
        }
    }
}

/// Print proposals one per line for shell consumption.
pub fn print_completions(app: &Application, argv: &[String], ctx: &mut RunContext) {
    let completions = propose_completions(app, argv, ctx);
    for completion in &completions {
        ctx.stdout.write_str(&format!("{}\n", completion.completion));
    }
}

fn route_completions(map: &RouteMap, partial: &str, app: &Application) -> Vec<Completion> {
    let config = app.completion_config();
    let mut out = Vec::new();
    for entry in map.entries() {
        if entry.hidden && !config.include_hidden_routes {
            continue;
        }
        if entry.name.starts_with(partial) {
            out.push(Completion {
                kind: CompletionKind::RouteName,
                completion: entry.name.clone(),
                brief: entry.target().brief().to_string(),
            });
        }
    }
    if config.include_aliases {
        for (alias, route) in &map.aliases {
            if !alias.starts_with(partial) {
                continue;
            }
            let entry = map
                .entries()
                .find(|e| e.name == *route && (config.include_hidden_routes || !e.hidden));
            if let Some(entry) = entry {
                out.push(Completion {
                    kind: CompletionKind::RouteAlias,
                    completion: alias.clone(),
                    brief: entry.target().brief().to_string(),
                });
            }
        }
    }
    out
}

fn can_repeat(kind: &FlagKind) -> bool {
    matches!(
        kind,
        FlagKind::Counter
            | FlagKind::Parsed {
                variadic: Variadic::Repeat | Variadic::Separator(_),
                ..
            }
    )
}

fn command_completions(
    command: &Command,
    prior: &[String],
    partial: &str,
    app: &Application,
) -> Vec<Completion> {
    let config = app.scanner_config();
    let scan = scan_arguments(prior, command, config);
    if scan.help != HelpRequest::None {
        return Vec::new();
    }
    if scan.saw_escape {
        return positional_completions(command, &scan, partial);
    }
    if let Some(rest) = partial.strip_prefix("--") {
        if let Some((flag_part, value_part)) = rest.split_once('=') {
            return flag_value_completions(command, config, flag_part, value_part);
        }
        return long_flag_completions(command, config, &scan, partial);
    }
    if partial.starts_with('-') && !partial.is_empty() {
        return alias_completions(command, &scan, partial);
    }
    if let Some(previous) = prior.last() {
        if let Some(name) = value_pending_flag(command, config, previous) {
            let flag = match command.flag(&name) {
                Some(flag) => flag,
                None => return Vec::new(),
            };
            return flag
                .completion_values()
                .iter()
                .filter(|v| v.starts_with(partial))
                .map(|v| Completion {
                    kind: CompletionKind::EnumValue,
                    completion: v.clone(),
                    brief: flag.brief.clone(),
                })
                .collect();
        }
    }
    positional_completions(command, &scan, partial)
}

/// The flag name addressed by `token` when that token still waits for a
/// value in the next position.
fn value_pending_flag(
    command: &Command,
    config: &ScannerConfig,
    token: &str,
) -> Option<String> {
    if token.contains('=') {
        return None;
    }
    if let Some(name_part) = token.strip_prefix("--") {
        let resolved = if command.flag(name_part).is_some() {
            Some(name_part.to_string())
        } else if config.case_style == CaseStyle::AllowKebabForCamel && name_part.contains('-') {
            let camel = kebab_to_camel(name_part);
            command.flag(&camel).map(|_| camel)
        } else {
            None
        };
        let name = resolved?;
        if command.flag(&name).map_or(false, |f| f.expects_value()) {
            return Some(name);
        }
        return None;
    }
    let mut chars = token.strip_prefix('-')?.chars();
    let alias = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let name = command.alias_target(alias)?.to_string();
    if command.flag(&name).map_or(false, |f| f.expects_value()) {
        Some(name)
    } else {
        None
    }
}

fn long_flag_completions(
    command: &Command,
    config: &ScannerConfig,
    scan: &ScanResult,
    partial: &str,
) -> Vec<Completion> {
    let mut out = Vec::new();
    for (name, flag) in &command.flags {
        if flag.hidden {
            continue;
        }
        if scan.present.iter().any(|p| p == name) && !can_repeat(&flag.kind) {
            continue;
        }
        let camel = format!("--{}", name);
        let proposal = if camel.starts_with(partial) {
            Some(camel)
        } else if config.case_style == CaseStyle::AllowKebabForCamel {
            let kebab = format!("--{}", camel_to_kebab(name));
            kebab.starts_with(partial).then_some(kebab)
        } else {
            None
        };
        if let Some(completion) = proposal {
            out.push(Completion {
                kind: CompletionKind::LongFlag,
                completion,
                brief: flag.brief.clone(),
            });
        }
    }
    out
}

fn alias_completions(command: &Command, scan: &ScanResult, partial: &str) -> Vec<Completion> {
    let mut out = Vec::new();
    for (alias, name) in &command.aliases {
        let flag = match command.flag(name) {
            Some(flag) => flag,
            None => continue,
        };
        if flag.hidden {
            continue;
        }
        if scan.present.iter().any(|p| p == name) && !can_repeat(&flag.kind) {
            continue;
        }
        let completion = format!("-{}", alias);
        if completion.starts_with(partial) {
            out.push(Completion {
                kind: CompletionKind::FlagAlias,
                completion,
                brief: flag.brief.clone(),
            });
        }
    }
    out
}

fn flag_value_completions(
    command: &Command,
    config: &ScannerConfig,
    flag_part: &str,
    value_part: &str,
) -> Vec<Completion> {
    let name = if command.flag(flag_part).is_some() {
        flag_part.to_string()
    } else if config.case_style == CaseStyle::AllowKebabForCamel && flag_part.contains('-') {
        kebab_to_camel(flag_part)
    } else {
        return Vec::new();
    };
    let flag = match command.flag(&name) {
        Some(flag) => flag,
        None => return Vec::new(),
    };
    flag.completion_values()
        .iter()
        .filter(|v| v.starts_with(value_part))
        .map(|v| Completion {
            kind: CompletionKind::EnumValue,
            completion: format!("--{}={}", flag_part, v),
            brief: flag.brief.clone(),
        })
        .collect()
}

fn positional_completions(
    command: &Command,
    scan: &ScanResult,
    partial: &str,
) -> Vec<Completion> {
    let slot = scan.raw_positional.len();
    let param = match &command.positionals {
        Positionals::Tuple(params) => params.get(slot),
        Positionals::Array { param, maximum, .. } => {
            if maximum.map_or(false, |max| slot >= max) {
                None
            } else {
                Some(param)
            }
        }
    };
    let param = match param {
        Some(param) => param,
        None => return Vec::new(),
    };
    param
        .choices
        .iter()
        .filter(|v| v.starts_with(partial))
        .map(|v| Completion {
            kind: CompletionKind::PositionalValue,
            completion: v.clone(),
            brief: param.brief.clone(),
        })
        .collect()
}
