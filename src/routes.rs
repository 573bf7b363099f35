//! Routing model: commands (leaf actions) and route maps (dispatch nodes).
//!
//! Both are built once through their builders, which run every
//! constructor-time check, and are immutable afterwards. Builder mistakes
//! are programmer errors and panic with a `stricli: ` prefix; user input
//! mistakes never panic and surface as scan or routing errors instead.

use std::rc::Rc;

use crate::case::kebab_to_camel;
use crate::context::RunContext;
use crate::params::{Flag, FlagValues, Positionals, Value};
use crate::scanner::CaseStyle;

/// Flag names claimed by the help machinery.
pub(crate) const RESERVED_FLAG_NAMES: [&str; 3] = ["help", "helpAll", "help-all"];

/// Short aliases claimed by the help machinery. `v` joins this list at the
/// application level when version info is configured.
pub(crate) const RESERVED_ALIASES: [char; 2] = ['h', 'H'];

/// What a command action receives: the flags map and the positional vector.
#[derive(Debug, Clone)]
pub struct CommandInputs {
    pub flags: FlagValues,
    pub positional: Vec<Value>,
}

/// A failure reported by a command action.
#[derive(Debug, Clone)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps any displayable error value.
    pub fn from_error(error: impl std::fmt::Display) -> Self {
        Self {
            message: error.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CommandError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// A command implementation.
pub type Action = Rc<dyn Fn(&mut RunContext, &CommandInputs) -> Result<(), CommandError>>;

#[derive(Clone)]
pub(crate) enum Loader {
    Eager(Action),
    Lazy(Rc<dyn Fn() -> Result<Action, String>>),
}

/// A leaf routing target: parameter schema plus implementation.
#[derive(Clone)]
pub struct Command {
    pub(crate) flags: Vec<(String, Flag)>,
    pub(crate) aliases: Vec<(char, String)>,
    pub(crate) positionals: Positionals,
    pub(crate) loader: Loader,
    pub(crate) brief: String,
    pub(crate) full_description: Option<String>,
}

impl Command {
    /// Command with an eager implementation.
    pub fn builder(
        action: impl Fn(&mut RunContext, &CommandInputs) -> Result<(), CommandError> + 'static,
    ) -> CommandBuilder {
        CommandBuilder::new(Loader::Eager(Rc::new(action)))
    }

    /// Command whose implementation is produced on demand; a loader failure
    /// surfaces as [`ExitCode::CommandLoadError`](crate::ExitCode).
    pub fn lazy(loader: impl Fn() -> Result<Action, String> + 'static) -> CommandBuilder {
        CommandBuilder::new(Loader::Lazy(Rc::new(loader)))
    }

    pub(crate) fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub(crate) fn alias_target(&self, alias: char) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(a, _)| *a == alias)
            .map(|(_, n)| n.as_str())
    }

    /// Used by the application envelope to detect `--version` collisions.
    pub fn uses_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|(n, _)| n == name)
    }

    pub fn uses_alias(&self, alias: char) -> bool {
        self.aliases.iter().any(|(a, _)| *a == alias)
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }
}

/// Assembles and validates a [`Command`].
pub struct CommandBuilder {
    flags: Vec<(String, Flag)>,
    aliases: Vec<(char, String)>,
    positionals: Positionals,
    loader: Loader,
    brief: String,
    full_description: Option<String>,
}

impl CommandBuilder {
    fn new(loader: Loader) -> Self {
        Self {
            flags: Vec::new(),
            aliases: Vec::new(),
            positionals: Positionals::none(),
            loader,
            brief: String::new(),
            full_description: None,
        }
    }

    pub fn brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = brief.into();
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.full_description = Some(text.into());
        self
    }

    pub fn flag(mut self, name: impl Into<String>, flag: Flag) -> Self {
        self.flags.push((name.into(), flag));
        self
    }

    /// Single-character synonym for a flag. The target flag does not have
    /// to exist; a dangling alias is reported at scan time.
    pub fn alias(mut self, alias: char, flag_name: impl Into<String>) -> Self {
        self.aliases.push((alias, flag_name.into()));
        self
    }

    pub fn positionals(mut self, positionals: Positionals) -> Self {
        self.positionals = positionals;
        self
    }

    /// Runs the constructor-time checks.
    pub fn build(self) -> Command {
        for (ix, (name, _)) in self.flags.iter().enumerate() {
            assert!(
                !RESERVED_FLAG_NAMES.contains(&name.as_str()),
                "stricli: flag name `{}` is reserved",
                name
            );
            assert!(
                !self.flags[..ix].iter().any(|(n, _)| n == name),
                "stricli: flag `{}` is declared twice",
                name
            );
        }
        for (ix, (alias, _)) in self.aliases.iter().enumerate() {
            assert!(
                !RESERVED_ALIASES.contains(alias),
                "stricli: alias `{}` is reserved",
                alias
            );
            assert!(
                !self.aliases[..ix].iter().any(|(a, _)| a == alias),
                "stricli: alias `{}` is declared twice",
                alias
            );
        }
        // a negatable boolean must not have its negated spellings taken by
        // another flag
        for (name, flag) in &self.flags {
            if let Some((camel, kebab)) = flag.negated_spellings(name) {
                for (other, _) in &self.flags {
                    assert!(
                        *other != camel && *other != kebab,
                        "stricli: flag `{}` collides with the negated form of `{}`",
                        other,
                        name
                    );
                }
            }
        }
        Command {
            flags: self.flags,
            aliases: self.aliases,
            positionals: self.positionals,
            loader: self.loader,
            brief: self.brief,
            full_description: self.full_description,
        }
    }
}

/// A child of a route map, either a nested map or a command.
#[derive(Clone)]
pub enum RoutingTarget {
    Command(Rc<Command>),
    Map(Rc<RouteMap>),
}

impl From<Command> for RoutingTarget {
    fn from(command: Command) -> Self {
        RoutingTarget::Command(Rc::new(command))
    }
}

impl From<RouteMap> for RoutingTarget {
    fn from(map: RouteMap) -> Self {
        RoutingTarget::Map(Rc::new(map))
    }
}

impl RoutingTarget {
    pub(crate) fn brief(&self) -> &str {
        match self {
            RoutingTarget::Command(c) => &c.brief,
            RoutingTarget::Map(m) => &m.brief,
        }
    }
}

/// One named route inside a route map.
#[derive(Clone)]
pub struct RouteEntry {
    pub(crate) name: String,
    pub(crate) target: RoutingTarget,
    pub(crate) hidden: bool,
}

impl RouteEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn target(&self) -> &RoutingTarget {
        &self.target
    }
}

/// An internal routing node dispatching on the next token.
#[derive(Clone)]
pub struct RouteMap {
    pub(crate) routes: Vec<RouteEntry>,
    pub(crate) aliases: Vec<(String, String)>,
    pub(crate) default_command: Option<String>,
    pub(crate) brief: String,
    pub(crate) full_description: Option<String>,
}

impl RouteMap {
    pub fn builder() -> RouteMapBuilder {
        RouteMapBuilder::default()
    }

    /// Resolve a token to a route, honoring aliases and, when the case
    /// style allows it, the kebab-case spelling of a camelCase route.
    pub fn lookup(&self, token: &str, case_style: CaseStyle) -> Option<(&str, &RoutingTarget)> {
        if let Some(found) = self.lookup_exact(token) {
            return Some(found);
        }
        if case_style == CaseStyle::AllowKebabForCamel && token.contains('-') {
            return self.lookup_exact(&kebab_to_camel(token));
        }
        None
    }

    fn lookup_exact(&self, token: &str) -> Option<(&str, &RoutingTarget)> {
        if let Some(entry) = self.routes.iter().find(|e| e.name == token) {
            return Some((entry.name.as_str(), &entry.target));
        }
        let (_, route) = self.aliases.iter().find(|(a, _)| a == token)?;
        let entry = self.routes.iter().find(|e| &e.name == route)?;
        Some((entry.name.as_str(), &entry.target))
    }

    /// The command the map falls back to when no route matches.
    pub fn default_command(&self) -> Option<(&str, Rc<Command>)> {
        let name = self.default_command.as_deref()?;
        let entry = self.routes.iter().find(|e| e.name == name)?;
        match &entry.target {
            RoutingTarget::Command(cmd) => Some((entry.name.as_str(), Rc::clone(cmd))),
            RoutingTarget::Map(_) => None,
        }
    }

    /// Every other spelling that reaches the same route as `input`, used by
    /// the help renderer's ALIASES section.
    pub fn other_aliases_for_input(&self, input: &str, case_style: CaseStyle) -> Vec<String> {
        let canonical = match self.lookup(input, case_style) {
            Some((name, _)) => name.to_string(),
            None => return Vec::new(),
        };
        let mut spellings = vec![canonical.clone()];
        if case_style == CaseStyle::AllowKebabForCamel {
            let kebab = crate::case::camel_to_kebab(&canonical);
            if kebab != canonical {
                spellings.push(kebab);
            }
        }
        for (alias, route) in &self.aliases {
            if *route == canonical {
                spellings.push(alias.clone());
            }
        }
        spellings.retain(|s| s != input);
        spellings
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    pub(crate) fn aliases_of(&self, route: &str) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|(_, r)| r == route)
            .map(|(a, _)| a.as_str())
            .collect()
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }

    /// Route names, and optionally aliases, offered to completion and to
    /// the "did you mean" candidate set.
    pub(crate) fn completion_names(
        &self,
        include_hidden: bool,
        include_aliases: bool,
    ) -> Vec<String> {
        let mut names = Vec::new();
        for entry in &self.routes {
            if entry.hidden && !include_hidden {
                continue;
            }
            names.push(entry.name.clone());
        }
        if include_aliases {
            for (alias, route) in &self.aliases {
                let visible = self
                    .routes
                    .iter()
                    .any(|e| e.name == *route && (include_hidden || !e.hidden));
                if visible {
                    names.push(alias.clone());
                }
            }
        }
        names
    }
}

/// Assembles and validates a [`RouteMap`].
#[derive(Default)]
pub struct RouteMapBuilder {
    routes: Vec<RouteEntry>,
    aliases: Vec<(String, String)>,
    default_command: Option<String>,
    brief: String,
    full_description: Option<String>,
}

impl RouteMapBuilder {
    pub fn brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = brief.into();
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.full_description = Some(text.into());
        self
    }

    pub fn route(mut self, name: impl Into<String>, target: impl Into<RoutingTarget>) -> Self {
        self.routes.push(RouteEntry {
            name: name.into(),
            target: target.into(),
            hidden: false,
        });
        self
    }

    /// A route listed only under `--helpAll`.
    pub fn hidden_route(
        mut self,
        name: impl Into<String>,
        target: impl Into<RoutingTarget>,
    ) -> Self {
        self.routes.push(RouteEntry {
            name: name.into(),
            target: target.into(),
            hidden: true,
        });
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, route: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), route.into()));
        self
    }

    /// Route to fall back to when the next token matches nothing.
    pub fn default_command(mut self, route: impl Into<String>) -> Self {
        self.default_command = Some(route.into());
        self
    }

    /// Runs the constructor-time checks.
    pub fn build(self) -> RouteMap {
        assert!(
            !self.routes.is_empty(),
            "stricli: a route map requires at least one route"
        );
        for (ix, entry) in self.routes.iter().enumerate() {
            assert!(
                !self.routes[..ix].iter().any(|e| e.name == entry.name),
                "stricli: route `{}` is declared twice",
                entry.name
            );
        }
        for (ix, (alias, route)) in self.aliases.iter().enumerate() {
            assert!(
                !self.routes.iter().any(|e| &e.name == alias),
                "stricli: alias `{}` shadows a route of the same name",
                alias
            );
            assert!(
                !self.aliases[..ix].iter().any(|(a, _)| a == alias),
                "stricli: alias `{}` is declared twice",
                alias
            );
            assert!(
                self.routes.iter().any(|e| &e.name == route),
                "stricli: alias `{}` points at unknown route `{}`",
                alias,
                route
            );
        }
        if let Some(name) = &self.default_command {
            let entry = self
                .routes
                .iter()
                .find(|e| &e.name == name)
                .unwrap_or_else(|| {
                    panic!("stricli: default command route `{}` does not exist", name)
                });
            assert!(
                matches!(entry.target, RoutingTarget::Command(_)),
                "stricli: default command route `{}` must resolve to a command",
                name
            );
        }
        RouteMap {
            routes: self.routes,
            aliases: self.aliases,
            default_command: self.default_command,
            brief: self.brief,
            full_description: self.full_description,
        }
    }
}
