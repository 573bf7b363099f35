use std::cell::RefCell;
use std::rc::Rc;

use crate::*;

fn toks(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

fn noop() -> Command {
    Command::builder(|_, _| Ok(())).build()
}

/// Command that records the inputs it was invoked with.
fn recording() -> (Rc<RefCell<Option<CommandInputs>>>, CommandBuilder) {
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let builder = Command::builder(move |_, inputs| {
        *sink.borrow_mut() = Some(inputs.clone());
        Ok(())
    });
    (seen, builder)
}

#[test]
fn unknown_route_suggests_the_closest_name() {
    let map = RouteMap::builder()
        .route("foo", noop())
        .route("bar", noop())
        .route("baz", noop())
        .build();
    let app = Application::new("cli", map, AppConfig::default());
    let (mut ctx, out, err) = RunContext::in_memory();
    let code = app.run(&toks(&["fo"]), &mut ctx);
    assert_eq!(code, ExitCode::UnknownCommand);
    assert_eq!(
        err.contents(),
        "No command registered for `fo`, did you mean `foo`?\n"
    );
    assert_eq!(out.contents(), "");
}

#[test]
fn boolean_cluster_invokes_the_command_with_all_flags_set() {
    let (seen, builder) = recording();
    let cmd = builder
        .flag("alpha", Flag::boolean())
        .flag("bravo", Flag::boolean())
        .flag("charlie", Flag::boolean())
        .alias('a', "alpha")
        .alias('b', "bravo")
        .alias('c', "charlie")
        .build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, _) = RunContext::in_memory();
    assert_eq!(app.run(&toks(&["-abc"]), &mut ctx), ExitCode::Success);
    let inputs = seen.borrow().clone().unwrap();
    assert_eq!(inputs.flags.get_bool("alpha"), Some(true));
    assert_eq!(inputs.flags.get_bool("bravo"), Some(true));
    assert_eq!(inputs.flags.get_bool("charlie"), Some(true));
}

#[test]
fn dangling_alias_exits_with_invalid_argument() {
    let cmd = Command::builder(|_, _| Ok(())).alias('x', "nonexistent").build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, err) = RunContext::in_memory();
    assert_eq!(app.run(&toks(&["-x"]), &mut ctx), ExitCode::InvalidArgument);
    assert!(err.contents().contains("No flag registered"));
}

#[test]
fn kebab_negation_resets_a_default_true_boolean() {
    let (seen, builder) = recording();
    let cmd = builder
        .flag("colorOutput", Flag::boolean().default_enabled(true))
        .build();
    let config = AppConfig::default().scanner(ScannerConfig {
        case_style: CaseStyle::AllowKebabForCamel,
        ..ScannerConfig::default()
    });
    let app = Application::new("cli", cmd, config);
    let (mut ctx, _, _) = RunContext::in_memory();
    assert_eq!(
        app.run(&toks(&["--no-color-output"]), &mut ctx),
        ExitCode::Success
    );
    let inputs = seen.borrow().clone().unwrap();
    assert_eq!(inputs.flags.get_bool("colorOutput"), Some(false));
}

#[test]
fn version_flag_prints_the_current_version() {
    let config = AppConfig::default().version_info(VersionInfo::new("1.2.3"));
    let app = Application::new("cli", noop(), config);
    let (mut ctx, out, _) = RunContext::in_memory();
    assert_eq!(app.run(&toks(&["--version"]), &mut ctx), ExitCode::Success);
    assert_eq!(out.contents(), "1.2.3\n");

    let (mut ctx, out, _) = RunContext::in_memory();
    assert_eq!(app.run(&toks(&["-v"]), &mut ctx), ExitCode::Success);
    assert_eq!(out.contents(), "1.2.3\n");
}

#[test]
fn counter_alias_cluster_counts_occurrences() {
    let (seen, builder) = recording();
    let cmd = builder
        .flag("verbose", Flag::counter())
        .alias('v', "verbose")
        .build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, _) = RunContext::in_memory();
    assert_eq!(app.run(&toks(&["-vvv"]), &mut ctx), ExitCode::Success);
    let inputs = seen.borrow().clone().unwrap();
    assert_eq!(inputs.flags.get_count("verbose"), Some(3));
}

#[test]
fn out_of_date_version_warns_unless_suppressed() {
    let build = || {
        AppConfig::default().version_info(
            VersionInfo::new("1.0.0")
                .latest_from(|| Some("2.0.0".to_string()))
                .upgrade_command("pkg install cli@latest"),
        )
    };
    let app = Application::new("cli", noop(), build());
    let (mut ctx, _, err) = RunContext::in_memory();
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert_eq!(
        err.contents(),
        "A newer version 2.0.0 is available (current version is 1.0.0), \
         upgrade via `pkg install cli@latest`\n"
    );

    let app = Application::new("cli", noop(), build());
    let (mut ctx, _, err) = RunContext::in_memory();
    ctx.env
        .insert(SKIP_VERSION_CHECK_ENV.to_string(), "1".to_string());
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert_eq!(err.contents(), "");
}

#[test]
fn missing_locale_warns_and_falls_back() {
    let app = Application::new("cli", noop(), AppConfig::default());
    let (mut ctx, _, err) = RunContext::in_memory();
    ctx.locale = Some("fr".to_string());
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert_eq!(
        err.contents(),
        "No text available for locale `fr`, defaulting to `en`\n"
    );
}

#[test]
fn scope_builder_feeds_the_command_and_failures_map_to_context_load() {
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let cmd = Command::builder(move |ctx, _| {
        let scope = ctx.scope.as_ref().and_then(|s| s.downcast_ref::<i32>());
        *sink.borrow_mut() = scope.copied();
        Ok(())
    })
    .build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, _) = RunContext::in_memory();
    ctx.for_command = Some(Rc::new(|info| {
        assert_eq!(info.prefix, vec!["cli".to_string()]);
        Ok(Box::new(42i32))
    }));
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert_eq!(*seen.borrow(), Some(42));

    let app = Application::new("cli", noop(), AppConfig::default());
    let (mut ctx, _, err) = RunContext::in_memory();
    ctx.for_command = Some(Rc::new(|_| Err("boom".to_string())));
    assert_eq!(app.run(&[], &mut ctx), ExitCode::ContextLoadError);
    assert_eq!(
        err.contents(),
        "Unable to build context for command: boom\n"
    );
}

#[test]
fn lazy_loader_failure_maps_to_command_load_error() {
    let cmd = Command::lazy(|| Err("missing module".to_string())).build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, err) = RunContext::in_memory();
    assert_eq!(app.run(&[], &mut ctx), ExitCode::CommandLoadError);
    assert_eq!(
        err.contents(),
        "Unable to load command implementation: missing module\n"
    );
}

#[test]
fn lazy_loader_success_runs_the_command() {
    let cmd = Command::lazy(|| {
        let action: Action = Rc::new(|ctx, _| {
            ctx.stdout.write_str("ran\n");
            Ok(())
        });
        Ok(action)
    })
    .build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, out, _) = RunContext::in_memory();
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert_eq!(out.contents(), "ran\n");
}

#[test]
fn command_errors_render_and_map_to_command_failed() {
    let cmd = Command::builder(|_, _| Err(CommandError::new("kaboom"))).build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, err) = RunContext::in_memory();
    assert_eq!(app.run(&[], &mut ctx), ExitCode::CommandFailed);
    assert_eq!(err.contents(), "kaboom\n");
}

#[test]
fn exit_code_mapping_is_configurable() {
    let cmd = Command::builder(|_, _| Err(CommandError::new("soft failure"))).build();
    let config = AppConfig::default().determine_exit_code(|_| ExitCode::Success);
    let app = Application::new("cli", cmd, config);
    let (mut ctx, _, err) = RunContext::in_memory();
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert_eq!(err.contents(), "soft failure\n");
}

#[test]
fn scanner_errors_are_joined_with_and() {
    let cmd = Command::builder(|_, _| Ok(()))
        .flag("out", Flag::parsed(string_parser).optional())
        .build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, err) = RunContext::in_memory();
    let code = app.run(&toks(&["--out", "a", "--out", "b", "--missing"]), &mut ctx);
    assert_eq!(code, ExitCode::InvalidArgument);
    let rendered = err.contents();
    assert!(rendered.starts_with("Unable to parse arguments: "));
    assert!(rendered.contains("Flag `--out` was already specified"));
    assert!(rendered.contains(" and "));
    assert!(rendered.contains("No flag registered for `--missing`"));
}

#[test]
fn a_route_map_without_input_renders_its_help() {
    let map = RouteMap::builder()
        .brief("Do things")
        .route("copy", Command::builder(|_, _| Ok(())).brief("Copy").build())
        .build();
    let app = Application::new("cli", map, AppConfig::default());
    let (mut ctx, out, _) = RunContext::in_memory();
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    let help = out.contents();
    assert!(help.starts_with("Do things\n"));
    assert!(help.contains("USAGE"));
    assert!(help.contains("COMMANDS"));
    assert!(help.contains("copy"));
}

#[test]
fn help_flag_on_a_command_renders_its_help() {
    let map = RouteMap::builder()
        .route(
            "copy",
            Command::builder(|_, _| Ok(()))
                .brief("Copy a thing")
                .flag("force", Flag::boolean().brief("Overwrite"))
                .build(),
        )
        .build();
    let app = Application::new("cli", map, AppConfig::default());
    let (mut ctx, out, _) = RunContext::in_memory();
    assert_eq!(app.run(&toks(&["copy", "--help"]), &mut ctx), ExitCode::Success);
    let help = out.contents();
    assert!(help.starts_with("Copy a thing\n"));
    assert!(help.contains("cli copy [--force]"));
    assert!(help.contains("--force"));
}

#[test]
fn ansi_styling_follows_the_color_gate() {
    let map = RouteMap::builder().route("copy", noop()).build();
    let app = Application::new("cli", map, AppConfig::default());

    // a terminal-like stdout gets styled output
    let stdout = MemoryStream::new().with_color_depth(24);
    let stderr = MemoryStream::new();
    let mut ctx = RunContext {
        stdout: Box::new(stdout.clone()),
        stderr: Box::new(stderr),
        env: Default::default(),
        locale: None,
        for_command: None,
        scope: None,
    };
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert!(stdout.contents().contains("\u{1b}["));

    // STRICLI_NO_COLOR vetoes styling even on capable terminals
    let stdout = MemoryStream::new().with_color_depth(24);
    let stderr = MemoryStream::new();
    let mut ctx = RunContext {
        stdout: Box::new(stdout.clone()),
        stderr: Box::new(stderr),
        env: Default::default(),
        locale: None,
        for_command: None,
        scope: None,
    };
    ctx.env.insert(NO_COLOR_ENV.to_string(), "1".to_string());
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert!(!stdout.contents().contains("\u{1b}["));

    // memory streams without a depth report stay plain
    let (mut ctx, out, _) = RunContext::in_memory();
    assert_eq!(app.run(&[], &mut ctx), ExitCode::Success);
    assert!(!out.contents().contains("\u{1b}["));
}

#[test]
fn run_free_function_matches_the_method() {
    let app = Application::new("cli", noop(), AppConfig::default());
    let (mut ctx, _, _) = RunContext::in_memory();
    assert_eq!(run(&app, &[], &mut ctx), ExitCode::Success);
}

#[test]
fn variadic_flags_and_positionals_reach_the_command() {
    let (seen, builder) = recording();
    let cmd = builder
        .flag("tag", Flag::parsed(string_parser).variadic().optional())
        .flag("ports", Flag::parsed(number_parser).separator(',').optional())
        .positionals(Positionals::array(PositionalParam::string("file")))
        .build();
    let app = Application::new("cli", cmd, AppConfig::default());
    let (mut ctx, _, _) = RunContext::in_memory();
    let code = app.run(
        &toks(&["--tag", "a", "--ports", "80,443", "--tag", "b", "x.txt", "y.txt"]),
        &mut ctx,
    );
    assert_eq!(code, ExitCode::Success);
    let inputs = seen.borrow().clone().unwrap();
    let tags: Vec<_> = inputs
        .flags
        .get_list("tag")
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(tags, vec!["a", "b"]);
    let ports: Vec<_> = inputs
        .flags
        .get_list("ports")
        .unwrap()
        .iter()
        .filter_map(Value::as_num)
        .collect();
    assert_eq!(ports, vec![80.0, 443.0]);
    let files: Vec<_> = inputs.positional.iter().filter_map(Value::as_str).collect();
    assert_eq!(files, vec!["x.txt", "y.txt"]);
}

#[test]
fn usage_line_tokens_keep_their_classification() {
    let cmd = Command::builder(|_, _| Ok(()))
        .flag("count", Flag::parsed(number_parser).placeholder("n"))
        .flag("force", Flag::boolean())
        .positionals(Positionals::tuple([PositionalParam::string("source")]))
        .build();
    let usage = cmd.format_usage_line(&["cli".to_string()], &DocConfig::default());
    assert_eq!(usage, "cli --count <n> [--force] <source>");
    // lexing the rendered line classifies every element the same way the
    // scanner would
    for token in usage.split(' ').skip(1) {
        let bare = token.trim_matches(|c| matches!(c, '[' | ']'));
        if bare.starts_with('-') {
            assert!(bare.starts_with("--") && bare.len() > 2, "bad flag {}", bare);
        } else {
            assert!(bare.starts_with('<'), "bad positional {}", bare);
        }
    }
}

#[test]
#[should_panic(expected = "collides with the version chrome")]
fn root_command_alias_v_is_rejected_with_version_info() {
    let cmd = Command::builder(|_, _| Ok(()))
        .flag("verbose", Flag::counter())
        .alias('v', "verbose")
        .build();
    let config = AppConfig::default().version_info(VersionInfo::new("1.0.0"));
    let _ = Application::new("cli", cmd, config);
}

#[test]
fn nested_commands_may_use_a_version_flag() {
    // the chrome only claims `--version` at the root
    let nested = Command::builder(|_, _| Ok(()))
        .flag("version", Flag::parsed(string_parser).optional())
        .build();
    let map = RouteMap::builder().route("bump", nested).build();
    let config = AppConfig::default().version_info(VersionInfo::new("1.0.0"));
    let app = Application::new("cli", map, config);
    let (mut ctx, _, _) = RunContext::in_memory();
    assert_eq!(
        app.run(&toks(&["bump", "--version", "2.0.0"]), &mut ctx),
        ExitCode::Success
    );
}
