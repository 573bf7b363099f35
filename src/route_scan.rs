//! The route scanner: walks the leading argument tokens through the route
//! tree until a terminal is reached, intercepting help requests on the way.
//!
//! The walk is a small explicit state machine. Once a terminal command is
//! found every later token lands in the unprocessed tail for the argument
//! scanner; help tokens freeze the terminal so `app sub --help` documents
//! `sub` rather than whatever follows.

use std::rc::Rc;

use crate::routes::{RouteMap, RoutingTarget};
use crate::scanner::{help_request_for_token, CaseStyle, HelpRequest};

/// Outcome of a completed route walk.
#[derive(Clone)]
pub struct RouteScanResult {
    pub target: RoutingTarget,
    /// Tokens the walk did not consume, in order.
    pub unprocessed: Vec<String>,
    pub help: HelpRequest,
    /// Display path: application name first, then each route name entered.
    pub prefix: Vec<String>,
    /// True when the terminal was reached without entering any route.
    pub root_level: bool,
    /// Other spellings of the final route, for the ALIASES help section.
    pub aliases: Vec<String>,
}

/// The only routing failure: a token matched nothing in the current map.
#[derive(Clone)]
pub enum RouteScanError {
    RouteNotFound { input: String, map: Rc<RouteMap> },
}

pub struct RouteScanner {
    current: RoutingTarget,
    parent: Option<(Rc<RouteMap>, String)>,
    prefix: Vec<String>,
    help: HelpRequest,
    target: Option<RoutingTarget>,
    unprocessed: Vec<String>,
    case_style: CaseStyle,
    descended: bool,
}

impl RouteScanner {
    pub fn new(root: RoutingTarget, app_name: &str, case_style: CaseStyle) -> Self {
        Self {
            current: root,
            parent: None,
            prefix: vec![app_name.to_string()],
            help: HelpRequest::None,
            target: None,
            unprocessed: Vec::new(),
            case_style,
            descended: false,
        }
    }

    /// Feed one token to the walk.
    pub fn next(&mut self, token: &str) -> Result<(), RouteScanError> {
        if let Some(request) = help_request_for_token(token) {
            self.help = request;
            if self.target.is_none() {
                self.target = Some(self.current.clone());
            }
            return Ok(());
        }
        if self.target.is_some() {
            self.unprocessed.push(token.to_string());
            return Ok(());
        }
        match self.current.clone() {
            RoutingTarget::Command(_) => {
                self.target = Some(self.current.clone());
                self.unprocessed.push(token.to_string());
                Ok(())
            }
            RoutingTarget::Map(map) => {
                if let Some((name, child)) = map.lookup(token, self.case_style) {
                    self.prefix.push(name.to_string());
                    let child = child.clone();
                    self.parent = Some((Rc::clone(&map), token.to_string()));
                    self.current = child;
                    self.descended = true;
                    Ok(())
                } else if let Some((_, command)) = map.default_command() {
                    // the default command absorbs the token as its first input
                    self.current = RoutingTarget::Command(command);
                    self.unprocessed.push(token.to_string());
                    Ok(())
                } else {
                    Err(RouteScanError::RouteNotFound {
                        input: token.to_string(),
                        map,
                    })
                }
            }
        }
    }

    /// Close the walk and classify the terminal.
    pub fn finish(self) -> RouteScanResult {
        self.finish_inner(true)
    }

    /// Like [`finish`](RouteScanner::finish) but keeps a route-map terminal
    /// a map: completion wants the map's route names, not the default
    /// command's flags.
    pub(crate) fn finish_without_default(self) -> RouteScanResult {
        self.finish_inner(false)
    }

    fn finish_inner(mut self, descend_default: bool) -> RouteScanResult {
        let mut target = self.target.take().unwrap_or_else(|| self.current.clone());
        if descend_default && self.help == HelpRequest::None {
            if let RoutingTarget::Map(map) = &target {
                if let Some((_, command)) = map.default_command() {
                    target = RoutingTarget::Command(command);
                }
            }
        }
        let aliases = match &self.parent {
            Some((map, input)) => map.other_aliases_for_input(input, self.case_style),
            None => Vec::new(),
        };
        RouteScanResult {
            target,
            unprocessed: self.unprocessed,
            help: self.help,
            prefix: self.prefix,
            root_level: !self.descended,
            aliases,
        }
    }
}

/// Walk every token of `argv`; convenience used by the driver and by
/// completions.
pub(crate) fn scan_routes(
    root: RoutingTarget,
    app_name: &str,
    case_style: CaseStyle,
    argv: &[String],
) -> Result<RouteScanResult, RouteScanError> {
    let mut scanner = RouteScanner::new(root, app_name, case_style);
    for token in argv {
        scanner.next(token)?;
    }
    Ok(scanner.finish())
}
