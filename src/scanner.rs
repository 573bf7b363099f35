//! The argument scanner: turns the tokens left over after routing into a
//! flags map and a positional vector, validated against a command's schema.
//!
//! Scanning never bails on the first problem. Recoverable errors are
//! collected so a single invocation can report every mistake at once; the
//! driver decides how to render them.

use crate::case::{camel_to_kebab, kebab_to_camel, negated_forms};
use crate::distance::{corrections_for, CorrectionOptions};
use crate::params::{boolean_parser, FlagKind, FlagValues, Positionals, Value, Variadic};
use crate::routes::Command;

/// How strictly input spelling must match declared names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseStyle {
    /// Only the declared spelling is accepted.
    #[default]
    Original,
    /// `--kebab-case` input may address a `camelCase` flag or route.
    AllowKebabForCamel,
}

/// Scanner behavior shared by every command of an application.
#[derive(Debug, Clone, Copy)]
pub struct ScannerConfig {
    pub case_style: CaseStyle,
    /// Whether a bare `--` switches the rest of the line to positionals.
    pub allow_argument_escape: bool,
    /// `None` disables "did you mean" suggestions for flag typos.
    pub corrections: Option<CorrectionOptions>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            case_style: CaseStyle::Original,
            allow_argument_escape: false,
            corrections: Some(CorrectionOptions::default()),
        }
    }
}

/// Whether help was requested, and how much of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpRequest {
    #[default]
    None,
    Brief,
    All,
}

/// Recognize the reserved help tokens.
pub(crate) fn help_request_for_token(token: &str) -> Option<HelpRequest> {
    match token {
        "--help" | "-h" => Some(HelpRequest::Brief),
        "--helpAll" | "--help-all" | "-H" => Some(HelpRequest::All),
        _ => None,
    }
}

pub(crate) fn looks_like_flag(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('-')
}

/// Everything that can go wrong while scanning arguments. Every variant
/// carries the fields the text catalog needs to render it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    FlagNotFound {
        input: String,
        known: Vec<String>,
        corrections: Vec<String>,
    },
    AliasNotFound {
        alias: char,
    },
    DuplicateFlag {
        name: String,
    },
    MissingValueForFlag {
        name: String,
    },
    MissingArgument {
        placeholder: String,
    },
    TooManyArguments {
        expected: usize,
    },
    EnumValueNotAllowed {
        name: String,
        value: String,
        allowed: Vec<String>,
    },
    InvalidParsedValue {
        /// display form, e.g. ``flag `--count` `` or ``argument `path` ``
        name: String,
        value: String,
        message: String,
    },
    NegationNotAllowed {
        input: String,
        name: String,
    },
    CollidingFlagName {
        input: String,
        names: Vec<String>,
    },
}

/// Scanner output: collected state is reported even when errors occurred.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub flags: FlagValues,
    pub positional: Vec<Value>,
    /// Flags that were explicitly present on the command line, before
    /// defaults were installed. Completion uses this to stop proposing
    /// flags that cannot repeat.
    pub present: Vec<String>,
    /// The raw positional tokens, in order, before parsing.
    pub raw_positional: Vec<String>,
    pub help: HelpRequest,
    pub saw_escape: bool,
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// per-flag accumulation before declaration-order materialization
enum Seen {
    Bool(bool),
    Count(usize),
    One(Value),
    Many(Vec<Value>),
}

#[derive(Default)]
struct ScanState {
    seen: Vec<(String, Seen)>,
    positional: Vec<String>,
    errors: Vec<ScanError>,
    escape: bool,
    help: HelpRequest,
}

impl ScanState {
    fn seen_mut(&mut self, name: &str) -> Option<&mut Seen> {
        self.seen
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    fn is_seen(&self, name: &str) -> bool {
        self.seen.iter().any(|(n, _)| n == name)
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        if self.is_seen(name) {
            self.errors.push(ScanError::DuplicateFlag {
                name: name.to_string(),
            });
        } else {
            self.seen.push((name.to_string(), Seen::Bool(value)));
        }
    }

    fn bump(&mut self, name: &str) {
        match self.seen_mut(name) {
            Some(Seen::Count(n)) => *n += 1,
            Some(_) => {}
            None => self.seen.push((name.to_string(), Seen::Count(1))),
        }
    }

    fn set_one(&mut self, name: &str, value: Value) {
        if self.is_seen(name) {
            self.errors.push(ScanError::DuplicateFlag {
                name: name.to_string(),
            });
        } else {
            self.seen.push((name.to_string(), Seen::One(value)));
        }
    }

    fn append(&mut self, name: &str, value: Value) {
        match self.seen_mut(name) {
            Some(Seen::Many(xs)) => xs.push(value),
            Some(_) => {}
            None => self
                .seen
                .push((name.to_string(), Seen::Many(vec![value]))),
        }
    }
}

/// Scan `tokens` against `command`'s schema.
pub fn scan_arguments(tokens: &[String], command: &Command, config: &ScannerConfig) -> ScanResult {
    let mut state = ScanState::default();
    let mut ix = 0;
    while ix < tokens.len() {
        let token = &tokens[ix];
        ix += 1;
        if state.escape {
            state.positional.push(token.clone());
            continue;
        }
        if let Some(request) = help_request_for_token(token) {
            state.help = request;
            break;
        }
        if token == "--" && config.allow_argument_escape {
            state.escape = true;
            continue;
        }
        if let Some(rest) = token.strip_prefix("--") {
            if rest.is_empty() {
                state.positional.push(token.clone());
            } else {
                long_flag(&mut state, command, config, rest, tokens, &mut ix);
            }
        } else if looks_like_flag(token) {
            short_cluster(&mut state, command, config, &token[1..], tokens, &mut ix);
        } else {
            state.positional.push(token.clone());
        }
    }
    finish(state, command, config)
}

enum Hit {
    Plain(String),
    Negated(String),
}

fn long_flag(
    state: &mut ScanState,
    command: &Command,
    config: &ScannerConfig,
    rest: &str,
    tokens: &[String],
    ix: &mut usize,
) {
    let (name_part, eq_value) = match rest.split_once('=') {
        Some((n, v)) => (n, Some(v.to_string())),
        None => (rest, None),
    };

    let mut hits: Vec<Hit> = Vec::new();
    if command.flag(name_part).is_some() {
        hits.push(Hit::Plain(name_part.to_string()));
    }
    if config.case_style == CaseStyle::AllowKebabForCamel && name_part.contains('-') {
        let camel = kebab_to_camel(name_part);
        if camel != name_part
            && command.flag(&camel).is_some()
            && !hits.iter().any(|h| matches!(h, Hit::Plain(n) if *n == camel))
        {
            hits.push(Hit::Plain(camel));
        }
    }
    let mut negation_denied = None;
    for (name, flag) in &command.flags {
        if !flag.is_boolean() {
            continue;
        }
        let (camel_form, kebab_form) = negated_forms(name);
        if name_part == camel_form || name_part == kebab_form {
            if flag.negation_allowed() {
                if !hits
                    .iter()
                    .any(|h| matches!(h, Hit::Negated(n) if n == name))
                {
                    hits.push(Hit::Negated(name.clone()));
                }
            } else {
                negation_denied = Some(name.clone());
            }
        }
    }

    if hits.len() > 1 {
        let names = hits
            .iter()
            .map(|h| match h {
                Hit::Plain(n) | Hit::Negated(n) => n.clone(),
            })
            .collect();
        state.errors.push(ScanError::CollidingFlagName {
            input: name_part.to_string(),
            names,
        });
        return;
    }
    match hits.pop() {
        Some(Hit::Plain(name)) => apply_flag(state, command, config, &name, eq_value, tokens, ix),
        Some(Hit::Negated(name)) => match eq_value {
            Some(value) => state.errors.push(ScanError::InvalidParsedValue {
                name: format!("flag `--{}`", name_part),
                value,
                message: "negated boolean flags do not accept a value".to_string(),
            }),
            None => state.set_bool(&name, false),
        },
        None => {
            if let Some(name) = negation_denied {
                state.errors.push(ScanError::NegationNotAllowed {
                    input: name_part.to_string(),
                    name,
                });
            } else {
                let err = unknown_flag_error(command, config, name_part);
                state.errors.push(err);
            }
        }
    }
}

fn short_cluster(
    state: &mut ScanState,
    command: &Command,
    config: &ScannerConfig,
    cluster: &str,
    tokens: &[String],
    ix: &mut usize,
) {
    let chars: Vec<char> = cluster.chars().collect();
    let first = chars[0];

    if chars.len() > 1 {
        // -x=value assigns the value no matter the flag kind
        if chars[1] == '=' {
            let value: String = chars[2..].iter().collect();
            apply_alias(state, command, config, first, Some(value), tokens, ix);
            return;
        }
        // -xvalue is a value assignment when x expects one
        if let Some(name) = command.alias_target(first) {
            if command.flag(name).map_or(false, |f| f.expects_value()) {
                let value: String = chars[1..].iter().collect();
                let name = name.to_string();
                apply_flag(state, command, config, &name, Some(value), tokens, ix);
                return;
            }
        }
    }

    // a batch of boolean/counter aliases, one increment per occurrence
    for ch in chars {
        apply_alias(state, command, config, ch, None, tokens, ix);
    }
}

fn apply_alias(
    state: &mut ScanState,
    command: &Command,
    config: &ScannerConfig,
    alias: char,
    eq_value: Option<String>,
    tokens: &[String],
    ix: &mut usize,
) {
    match command.alias_target(alias) {
        None => state.errors.push(ScanError::AliasNotFound { alias }),
        Some(name) => {
            let name = name.to_string();
            if command.flag(&name).is_none() {
                // the alias points at a flag nobody declared
                let err = unknown_flag_error(command, config, &name);
                state.errors.push(err);
                return;
            }
            apply_flag(state, command, config, &name, eq_value, tokens, ix);
        }
    }
}

fn apply_flag(
    state: &mut ScanState,
    command: &Command,
    config: &ScannerConfig,
    name: &str,
    eq_value: Option<String>,
    tokens: &[String],
    ix: &mut usize,
) {
    let kind = match command.flag(name) {
        Some(flag) => flag.kind.clone(),
        None => return,
    };
    match kind {
        FlagKind::Boolean { .. } => match eq_value {
            Some(raw) => match boolean_parser(&raw) {
                Ok(Value::Bool(b)) => state.set_bool(name, b),
                _ => state.errors.push(ScanError::InvalidParsedValue {
                    name: format!("flag `--{}`", name),
                    value: raw,
                    message: "expected true or false".to_string(),
                }),
            },
            None => state.set_bool(name, true),
        },
        FlagKind::Counter => match eq_value {
            Some(raw) => state.errors.push(ScanError::InvalidParsedValue {
                name: format!("flag `--{}`", name),
                value: raw,
                message: "counter flags do not accept a value".to_string(),
            }),
            None => state.bump(name),
        },
        FlagKind::Choice { values, .. } => {
            let raw = match take_value(state, config, eq_value, tokens, ix) {
                Some(raw) => raw,
                None => {
                    state.errors.push(ScanError::MissingValueForFlag {
                        name: name.to_string(),
                    });
                    return;
                }
            };
            if values.iter().any(|v| *v == raw) {
                state.set_one(name, Value::Str(raw));
            } else {
                state.errors.push(ScanError::EnumValueNotAllowed {
                    name: name.to_string(),
                    value: raw,
                    allowed: values,
                });
            }
        }
        FlagKind::Parsed {
            parse, variadic, ..
        } => {
            let raw = match take_value(state, config, eq_value, tokens, ix) {
                Some(raw) => raw,
                None => {
                    state.errors.push(ScanError::MissingValueForFlag {
                        name: name.to_string(),
                    });
                    return;
                }
            };
            match variadic {
                Variadic::Separator(sep) => {
                    for part in raw.split(sep) {
                        match parse(part) {
                            Ok(value) => state.append(name, value),
                            Err(message) => state.errors.push(ScanError::InvalidParsedValue {
                                name: format!("flag `--{}`", name),
                                value: part.to_string(),
                                message,
                            }),
                        }
                    }
                }
                Variadic::Repeat => match parse(&raw) {
                    Ok(value) => state.append(name, value),
                    Err(message) => state.errors.push(ScanError::InvalidParsedValue {
                        name: format!("flag `--{}`", name),
                        value: raw,
                        message,
                    }),
                },
                Variadic::No => match parse(&raw) {
                    Ok(value) => state.set_one(name, value),
                    Err(message) => state.errors.push(ScanError::InvalidParsedValue {
                        name: format!("flag `--{}`", name),
                        value: raw,
                        message,
                    }),
                },
            }
        }
    }
}

/// Value precedence: the `=value` suffix, then the next token when it does
/// not look like a flag. After the argument escape any token is accepted.
fn take_value(
    state: &mut ScanState,
    config: &ScannerConfig,
    eq_value: Option<String>,
    tokens: &[String],
    ix: &mut usize,
) -> Option<String> {
    if eq_value.is_some() {
        return eq_value;
    }
    let next = tokens.get(*ix)?;
    if state.escape {
        *ix += 1;
        return Some(next.clone());
    }
    if next == "--" && config.allow_argument_escape {
        state.escape = true;
        *ix += 1;
        let after = tokens.get(*ix)?;
        *ix += 1;
        return Some(after.clone());
    }
    if looks_like_flag(next) {
        return None;
    }
    *ix += 1;
    Some(next.clone())
}

fn unknown_flag_error(command: &Command, config: &ScannerConfig, input: &str) -> ScanError {
    let known: Vec<String> = command.flags.iter().map(|(n, _)| n.clone()).collect();
    let mut candidates = known.clone();
    if config.case_style == CaseStyle::AllowKebabForCamel {
        for name in &known {
            let kebab = camel_to_kebab(name);
            if kebab != *name {
                candidates.push(kebab);
            }
        }
    }
    let corrections = match config.corrections {
        Some(options) => corrections_for(input, candidates, options),
        None => Vec::new(),
    };
    ScanError::FlagNotFound {
        input: input.to_string(),
        known,
        corrections,
    }
}

// a required flag that already produced an error must not also be
// reported as missing
fn error_mentions_flag(error: &ScanError, name: &str) -> bool {
    match error {
        ScanError::DuplicateFlag { name: n }
        | ScanError::MissingValueForFlag { name: n }
        | ScanError::EnumValueNotAllowed { name: n, .. } => n == name,
        ScanError::InvalidParsedValue { name: n, .. } => n.contains(&format!("`--{}`", name)),
        _ => false,
    }
}

fn finish(mut state: ScanState, command: &Command, _config: &ScannerConfig) -> ScanResult {
    let mut flags = FlagValues::default();
    let present = state.seen.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>();
    let raw_positional = state.positional.clone();
    let skip_requirements = state.help != HelpRequest::None;

    for (name, flag) in &command.flags {
        let seen = state.seen.iter().find(|(n, _)| n == name).map(|(_, s)| s);
        match seen {
            Some(Seen::Bool(b)) => flags.insert(name, Value::Bool(*b)),
            Some(Seen::Count(n)) => flags.insert(name, Value::Count(*n)),
            Some(Seen::One(v)) => flags.insert(name, v.clone()),
            Some(Seen::Many(xs)) => flags.insert(name, Value::List(xs.clone())),
            None => {
                if skip_requirements {
                    continue;
                }
                match &flag.kind {
                    FlagKind::Boolean { default, .. } => {
                        flags.insert(name, Value::Bool(default.unwrap_or(false)));
                    }
                    FlagKind::Counter => flags.insert(name, Value::Count(0)),
                    FlagKind::Choice { default, .. } => match default {
                        Some(v) => flags.insert(name, Value::Str(v.clone())),
                        None if !flag.optional => {
                            if !state.errors.iter().any(|e| error_mentions_flag(e, name)) {
                                state.errors.push(ScanError::MissingValueForFlag {
                                    name: name.clone(),
                                });
                            }
                        }
                        None => {}
                    },
                    FlagKind::Parsed {
                        parse,
                        variadic,
                        default,
                        ..
                    } => match default {
                        Some(raw) => {
                            install_parsed_default(&mut state, &mut flags, name, parse, *variadic, raw);
                        }
                        None if !flag.optional => {
                            if !state.errors.iter().any(|e| error_mentions_flag(e, name)) {
                                state.errors.push(ScanError::MissingValueForFlag {
                                    name: name.clone(),
                                });
                            }
                        }
                        None => {}
                    },
                }
            }
        }
    }

    let mut positional = Vec::new();
    if !skip_requirements {
        bind_positionals(&mut state, command, &mut positional);
    }

    ScanResult {
        flags,
        positional,
        present,
        raw_positional,
        help: state.help,
        saw_escape: state.escape,
        errors: state.errors,
    }
}

fn install_parsed_default(
    state: &mut ScanState,
    flags: &mut FlagValues,
    name: &str,
    parse: &crate::params::ParseFn,
    variadic: Variadic,
    raw: &str,
) {
    let mut parsed = Vec::new();
    let parts: Vec<&str> = match variadic {
        Variadic::Separator(sep) => raw.split(sep).collect(),
        _ => vec![raw],
    };
    for part in parts {
        match parse(part) {
            Ok(value) => parsed.push(value),
            Err(message) => {
                state.errors.push(ScanError::InvalidParsedValue {
                    name: format!("flag `--{}`", name),
                    value: part.to_string(),
                    message,
                });
                return;
            }
        }
    }
    match variadic {
        Variadic::No => flags.insert(name, parsed.remove(0)),
        Variadic::Repeat | Variadic::Separator(_) => flags.insert(name, Value::List(parsed)),
    }
}

fn bind_positionals(state: &mut ScanState, command: &Command, out: &mut Vec<Value>) {
    match &command.positionals {
        Positionals::Tuple(params) => {
            if state.positional.len() > params.len() {
                state.errors.push(ScanError::TooManyArguments {
                    expected: params.len(),
                });
            }
            for (slot, param) in params.iter().enumerate() {
                let raw = state.positional.get(slot).cloned().or_else(|| param.default.clone());
                match raw {
                    Some(raw) => match (param.parse)(&raw) {
                        Ok(value) => out.push(value),
                        Err(message) => state.errors.push(ScanError::InvalidParsedValue {
                            name: format!("argument `{}`", param.placeholder),
                            value: raw,
                            message,
                        }),
                    },
                    None => {
                        if !param.optional {
                            state.errors.push(ScanError::MissingArgument {
                                placeholder: param.placeholder.clone(),
                            });
                        }
                    }
                }
            }
        }
        Positionals::Array {
            param,
            minimum,
            maximum,
        } => {
            if let Some(max) = maximum {
                if state.positional.len() > *max {
                    state
                        .errors
                        .push(ScanError::TooManyArguments { expected: *max });
                }
            }
            if let Some(min) = minimum {
                if state.positional.len() < *min {
                    state.errors.push(ScanError::MissingArgument {
                        placeholder: param.placeholder.clone(),
                    });
                }
            }
            for raw in &state.positional {
                match (param.parse)(raw) {
                    Ok(value) => out.push(value),
                    Err(message) => state.errors.push(ScanError::InvalidParsedValue {
                        name: format!("argument `{}`", param.placeholder),
                        value: raw.clone(),
                        message,
                    }),
                }
            }
        }
    }
}
