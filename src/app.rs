//! The application envelope and the `run` driver.
//!
//! `run` is one straight pipeline: locale resolution, version check, route
//! scan, help rendering, per-command scope, loader, argument scan, action.
//! Every failure class maps to a distinct, stable exit code.

use std::rc::Rc;

use crate::color::{should_use_ansi_color, Painter};
use crate::complete::CompletionConfig;
use crate::context::{CommandInfo, RunContext};
use crate::distance::corrections_for;
use crate::help::{target_help, DocConfig, HelpEnv};
use crate::route_scan::{scan_routes, RouteScanError, RouteScanResult};
use crate::routes::{CommandError, CommandInputs, Loader, RoutingTarget};
use crate::scanner::{scan_arguments, HelpRequest, ScannerConfig};
use crate::text::{join_with_conjunction, Catalog};

/// Any non-"0" value suppresses the latest-version check.
pub const SKIP_VERSION_CHECK_ENV: &str = "STRICLI_SKIP_VERSION_CHECK";

/// Stable process exit codes, part of the application-visible contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    CommandFailed = 1,
    InvalidArgument = 2,
    UnknownCommand = 3,
    CommandLoadError = 4,
    ContextLoadError = 5,
}

impl ExitCode {
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Version reporting configuration.
#[derive(Clone)]
pub struct VersionInfo {
    pub(crate) current_version: String,
    pub(crate) get_latest_version: Option<Rc<dyn Fn() -> Option<String>>>,
    pub(crate) upgrade_command: Option<String>,
}

impl VersionInfo {
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            current_version: current_version.into(),
            get_latest_version: None,
            upgrade_command: None,
        }
    }

    /// Callback probing for the latest published version; a differing
    /// result produces a warning on stderr before the command runs.
    pub fn latest_from(mut self, probe: impl Fn() -> Option<String> + 'static) -> Self {
        self.get_latest_version = Some(Rc::new(probe));
        self
    }

    /// Command named in the out-of-date warning.
    pub fn upgrade_command(mut self, command: impl Into<String>) -> Self {
        self.upgrade_command = Some(command.into());
        self
    }
}

pub type ExitCodeFn = Rc<dyn Fn(&CommandError) -> ExitCode>;

/// Top-level configuration, frozen into the [`Application`].
#[derive(Clone)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub docs: DocConfig,
    pub completion: CompletionConfig,
    pub(crate) version: Option<VersionInfo>,
    pub(crate) catalogs: Vec<Catalog>,
    pub(crate) default_locale: String,
    pub(crate) determine_exit_code: Option<ExitCodeFn>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            docs: DocConfig::default(),
            completion: CompletionConfig::default(),
            version: None,
            catalogs: Vec::new(),
            default_locale: "en".to_string(),
            determine_exit_code: None,
        }
    }
}

impl AppConfig {
    pub fn scanner(mut self, scanner: ScannerConfig) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn docs(mut self, docs: DocConfig) -> Self {
        self.docs = docs;
        self
    }

    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    pub fn version_info(mut self, version: VersionInfo) -> Self {
        self.version = Some(version);
        self
    }

    /// Register an additional text catalog; its locale tag comes from the
    /// catalog itself.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalogs.push(catalog);
        self
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Override the exit code used for command failures.
    pub fn determine_exit_code(
        mut self,
        choose: impl Fn(&CommandError) -> ExitCode + 'static,
    ) -> Self {
        self.determine_exit_code = Some(Rc::new(choose));
        self
    }
}

/// An immutable, runnable command line application.
pub struct Application {
    name: String,
    root: RoutingTarget,
    config: AppConfig,
}

impl Application {
    /// Freeze the application. Panics when version chrome would collide
    /// with the root command's own schema; a flag named `version` on a
    /// nested command stays legal.
    pub fn new(
        name: impl Into<String>,
        root: impl Into<RoutingTarget>,
        config: AppConfig,
    ) -> Self {
        let root = root.into();
        if config.version.is_some() {
            if let RoutingTarget::Command(command) = &root {
                assert!(
                    !command.uses_flag("version"),
                    "stricli: root command flag `version` collides with the version chrome"
                );
                assert!(
                    !command.uses_alias('v'),
                    "stricli: root command alias `v` collides with the version chrome"
                );
            }
        }
        Self {
            name: name.into(),
            root,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn root(&self) -> &RoutingTarget {
        &self.root
    }

    pub(crate) fn scanner_config(&self) -> &ScannerConfig {
        &self.config.scanner
    }

    pub(crate) fn completion_config(&self) -> &CompletionConfig {
        &self.config.completion
    }

    /// Resolve the display catalog, warning on stderr when the requested
    /// locale has no registered text.
    fn resolve_catalog(&self, ctx: &mut RunContext) -> Catalog {
        let builtin = Catalog::en();
        let lookup = |locale: &str| -> Option<&Catalog> {
            self.config.catalogs.iter().find(|c| c.locale == locale)
        };
        let fallback = lookup(&self.config.default_locale)
            .cloned()
            .unwrap_or(builtin);
        if let Some(requested) = ctx.locale.clone() {
            if let Some(found) = lookup(&requested) {
                return found.clone();
            }
            if requested == fallback.locale {
                return fallback;
            }
            let warning =
                (fallback.no_text_available_for_locale)(&requested, fallback.locale);
            ctx.stderr.write_str(&format!("{}\n", warning));
        }
        fallback
    }

    fn write_help(
        &self,
        ctx: &mut RunContext,
        catalog: &Catalog,
        result: &RouteScanResult,
        help_all: bool,
    ) {
        let enabled = should_use_ansi_color(
            self.config.docs.use_ansi_color,
            ctx,
            ctx.stdout.color_depth(),
        );
        let env = HelpEnv {
            docs: &self.config.docs,
            catalog,
            painter: Painter::new(enabled),
            has_version: self.config.version.is_some(),
        };
        let text = target_help(
            &result.target,
            &result.prefix,
            &result.aliases,
            &env,
            result.root_level,
            help_all,
        );
        ctx.stdout.write_str(&text);
    }

    /// Process `argv` and return the exit code; see the module docs for
    /// the pipeline stages.
    pub fn run(&self, argv: &[String], ctx: &mut RunContext) -> ExitCode {
        let catalog = self.resolve_catalog(ctx);
        let serial = self.config.docs.serial_comma;

        if let Some(version) = &self.config.version {
            if !ctx.env_enabled(SKIP_VERSION_CHECK_ENV) {
                if let Some(probe) = &version.get_latest_version {
                    if let Some(latest) = probe() {
                        if latest != version.current_version {
                            let warning = (catalog.current_version_is_not_latest)(
                                &version.current_version,
                                &latest,
                                version.upgrade_command.as_deref(),
                            );
                            ctx.stderr.write_str(&format!("{}\n", warning));
                        }
                    }
                }
            }
            if matches!(argv.first().map(String::as_str), Some("--version" | "-v")) {
                ctx.stdout
                    .write_str(&format!("{}\n", version.current_version));
                return ExitCode::Success;
            }
        }

        let result = match scan_routes(
            self.root.clone(),
            &self.name,
            self.config.scanner.case_style,
            argv,
        ) {
            Ok(result) => result,
            Err(RouteScanError::RouteNotFound { input, map }) => {
                let candidates = map.completion_names(
                    self.config.completion.include_hidden_routes,
                    self.config.completion.include_aliases,
                );
                let corrections = match self.config.scanner.corrections {
                    Some(options) => corrections_for(&input, candidates, options),
                    None => Vec::new(),
                };
                let message =
                    (catalog.no_command_registered_for_input)(&input, &corrections, serial);
                ctx.stderr.write_str(&format!("{}\n", message));
                return ExitCode::UnknownCommand;
            }
        };

        // a route map terminal means there was nothing to dispatch to, so
        // its help page is the answer
        if result.help != HelpRequest::None || matches!(result.target, RoutingTarget::Map(_)) {
            self.write_help(ctx, &catalog, &result, result.help == HelpRequest::All);
            return ExitCode::Success;
        }
        let command = match &result.target {
            RoutingTarget::Command(command) => Rc::clone(command),
            RoutingTarget::Map(_) => unreachable!("map terminals render help above"),
        };

        if let Some(builder) = ctx.for_command.clone() {
            let info = CommandInfo {
                prefix: result.prefix.clone(),
            };
            match builder(&info) {
                Ok(scope) => ctx.scope = Some(scope),
                Err(message) => {
                    ctx.stderr.write_str(&format!(
                        "{}\n",
                        (catalog.command_error_context_load)(&message)
                    ));
                    return ExitCode::ContextLoadError;
                }
            }
        }

        let action = match &command.loader {
            Loader::Eager(action) => action.clone(),
            Loader::Lazy(load) => match load() {
                Ok(action) => action,
                Err(message) => {
                    ctx.stderr.write_str(&format!(
                        "{}\n",
                        (catalog.exception_while_loading_command_function)(&message)
                    ));
                    return ExitCode::CommandLoadError;
                }
            },
        };

        let scan = scan_arguments(&result.unprocessed, &command, &self.config.scanner);
        if scan.help != HelpRequest::None {
            self.write_help(ctx, &catalog, &result, scan.help == HelpRequest::All);
            return ExitCode::Success;
        }
        if !scan.errors.is_empty() {
            let rendered = scan
                .errors
                .iter()
                .map(|error| (catalog.scanner_error)(error, serial))
                .collect::<Vec<_>>();
            let joined = join_with_conjunction("and", &rendered, serial);
            ctx.stderr.write_str(&format!(
                "{}\n",
                (catalog.exception_while_parsing_arguments)(&joined)
            ));
            return ExitCode::InvalidArgument;
        }

        let inputs = CommandInputs {
            flags: scan.flags,
            positional: scan.positional,
        };
        match action(ctx, &inputs) {
            Ok(()) => ExitCode::Success,
            Err(error) => {
                ctx.stderr.write_str(&format!(
                    "{}\n",
                    (catalog.command_error_result)(error.message())
                ));
                match &self.config.determine_exit_code {
                    Some(choose) => choose(&error),
                    None => ExitCode::CommandFailed,
                }
            }
        }
    }
}

/// Process `argv` against `app` within `ctx`; the single entry point for
/// applications built with this library.
pub fn run(app: &Application, argv: &[String], ctx: &mut RunContext) -> ExitCode {
    app.run(argv, ctx)
}
