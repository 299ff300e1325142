//! mtree CLI — driving adapter for the mtree match tree engine.
//!
//! Subcommands:
//! - `eval <config> [--context key=value...] [--pending key...] [--trace]` — evaluate
//!   config against context
//! - `check <config>` — validate config loads without errors
//! - `info` — print registered type URLs
//!
//! Logs go to stderr, filtered by `MTREE_LOG` (default `warn`).

use std::collections::HashMap;
use std::io;
use std::process;

use mtree::{MatchResult, MatchTree, MatchTreeConfig, Registry};
use mtree_test::TestContext;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "eval" => cmd_eval(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "info" => cmd_info(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_eval(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("eval requires a config file path".into());
    }

    let config_path = &args[0];
    let options = parse_eval_options(&args[1..])?;

    let tree = load_tree(config_path)?;
    let ctx = build_test_context(&options);

    let result = if options.trace {
        let trace = tree.evaluate_with_trace(&ctx);
        eprintln!("{trace:#?}");
        trace.result
    } else {
        tree.evaluate(&ctx)
    };
    println!("{}", render(&result));

    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a config file path".into());
    }

    let tree = load_tree(&args[0]).map_err(|e| format!("config invalid: {e}"))?;

    println!("Config valid (depth {})", tree.depth());
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<(), String> {
    let registry = build_registry();

    println!("Registered inputs:");
    for url in registry.input_type_urls() {
        println!("  {url}");
    }

    println!("\nRegistered matchers:");
    for url in registry.matcher_type_urls() {
        println!("  {url}");
    }

    println!("\nBuilt-in maps:\n  exact_match_map\n  prefix_match_map");

    Ok(())
}

fn render(result: &MatchResult<String>) -> &str {
    match result {
        MatchResult::Matched(action) => action.as_str(),
        MatchResult::NoMatch => "(no match)",
        MatchResult::Indeterminate => "(indeterminate)",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> Registry<TestContext, String> {
    let builder = mtree::RegistryBuilder::new();
    mtree_test::register(builder).build()
}

fn build_test_context(options: &EvalOptions) -> TestContext {
    let ctx = options
        .context
        .iter()
        .fold(TestContext::new(), |ctx, (k, v)| ctx.with(k, v));
    options.pending.iter().fold(ctx, |ctx, k| ctx.pending(k))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<MatchTreeConfig<String>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

fn load_tree(path: &str) -> Result<MatchTree<TestContext, String>, String> {
    let config = load_config(path)?;
    let tree = build_registry()
        .load(config)
        .map_err(|e| format!("config load failed: {e}"))?;
    tracing::info!(path, depth = tree.depth(), "config loaded");
    Ok(tree)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct EvalOptions {
    context: HashMap<String, String>,
    pending: Vec<String>,
    trace: bool,
}

fn parse_eval_options(args: &[String]) -> Result<EvalOptions, String> {
    let mut options = EvalOptions::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--context" => {
                i += 1;
                while i < args.len() && !args[i].starts_with("--") {
                    let pair = &args[i];
                    let (key, value) = pair.split_once('=').ok_or_else(|| {
                        format!("invalid context pair \"{pair}\", expected key=value")
                    })?;
                    options.context.insert(key.to_owned(), value.to_owned());
                    i += 1;
                }
            }
            "--pending" => {
                i += 1;
                while i < args.len() && !args[i].starts_with("--") {
                    options.pending.push(args[i].clone());
                    i += 1;
                }
            }
            "--trace" => {
                options.trace = true;
                i += 1;
            }
            other => return Err(format!("unexpected argument \"{other}\"")),
        }
    }

    Ok(options)
}

fn print_usage() {
    eprintln!(
        "Usage: mtree <command> [options]

Commands:
  eval <config> [--context key=value...] [--pending key...] [--trace]
                                           Evaluate config against context
  check <config>                           Validate config
  info                                     Print registered type URLs
  help                                     Show this help

Environment:
  MTREE_LOG                                Log filter (default: warn)"
    );
}
