#![doc = include_str!("../README.md")]

mod app;
mod case;
mod color;
mod complete;
mod context;
mod distance;
mod help;
mod params;
mod route_scan;
mod routes;
mod scanner;
mod text;

#[cfg(test)]
mod tests;

pub use crate::app::{
    run, AppConfig, Application, ExitCode, ExitCodeFn, VersionInfo, SKIP_VERSION_CHECK_ENV,
};
pub use crate::color::NO_COLOR_ENV;
pub use crate::complete::{
    print_completions, propose_completions, Completion, CompletionConfig, CompletionKind,
};
pub use crate::context::{
    CommandInfo, MemoryStream, RunContext, ScopeBuilder, StderrStream, StdoutStream, Stream,
};
pub use crate::distance::{
    corrections_for, damerau_levenshtein, distance_within, CorrectionOptions, DistanceWeights,
};
pub use crate::help::{DisplayCase, DocConfig};
pub use crate::params::{
    boolean_parser, choice_parser, loose_boolean_parser, number_parser, string_parser, Flag,
    FlagValues, ParseFn, PositionalParam, Positionals, Value, Variadic,
};
pub use crate::route_scan::{RouteScanError, RouteScanResult, RouteScanner};
pub use crate::routes::{
    Action, Command, CommandBuilder, CommandError, CommandInputs, RouteEntry, RouteMap,
    RouteMapBuilder, RoutingTarget,
};
pub use crate::scanner::{
    scan_arguments, CaseStyle, HelpRequest, ScanError, ScanResult, ScannerConfig,
};
pub use crate::text::{join_with_conjunction, Catalog};
