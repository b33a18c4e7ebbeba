mod debug_report;

use intentio::{ContextMatcher, IntentSet, Options, RequestContext, ResolutionVerbose, resolve_verbose_with, ruleset};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "INTENTIO_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let intents = match ruleset::from_path(&config.rules) {
        Ok(intents) => intents,
        Err(err) => {
            eprintln!("error: failed to load {}: {err}", config.rules.display());
            std::process::exit(1);
        }
    };

    let set = IntentSet::new(intents);
    let matcher = config.context.as_ref().map(|c| c as &dyn ContextMatcher);
    let res = resolve_verbose_with(&set, &config.input, matcher, &config.options);

    if config.json {
        print_json(&res);
    } else {
        debug_report::print_run(&res, config.color);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn print_json(res: &ResolutionVerbose) {
    let out = serde_json::json!({
        "query": res.query,
        "finalQuery": res.actions.last().map_or(res.query.as_str(), |a| a.modified_query.as_str()),
        "stop": res.details.stop.as_str(),
        "rounds": res.details.rounds.len(),
        "actions": res.actions,
    });
    match serde_json::to_string_pretty(&out) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("error: failed to encode output: {err}");
            std::process::exit(1);
        }
    }
}

struct CliConfig {
    input: String,
    rules: PathBuf,
    context: Option<RequestContext>,
    options: Options,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut rules: Option<PathBuf> = None;
    let mut context: Option<RequestContext> = None;
    let mut options = Options::default();
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        // `--flag=value` is accepted for every option taking a value.
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => args.next().ok_or_else(|| format!("error: {name} expects a value")),
            }
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("intentio {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--rules" | "-r" => rules = Some(PathBuf::from(value("--rules")?)),
            "--context" | "-c" => context = Some(parse_context(&value("--context")?)?),
            "--language" | "-l" => options.language = value("--language")?,
            "--max-rounds" => {
                let raw = value("--max-rounds")?;
                options.max_rounds =
                    raw.parse().map_err(|_| format!("error: invalid --max-rounds '{raw}' (expected a number)"))?;
            }
            "--input" | "-i" => {
                let v = value("--input")?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(v);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let rules = rules.ok_or_else(|| format!("error: --rules is required\n\n{}", help_text()))?;

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };
    let input = input.trim().to_string();

    if input.is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, rules, context, options, json, color })
}

fn parse_context(raw: &str) -> Result<RequestContext, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| format!("error: invalid --context JSON: {err}"))?;
    if !value.is_object() {
        return Err("error: --context expects a JSON object".to_string());
    }
    Ok(RequestContext::from_value(value))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "intentio {version}

Resolve a search query against a JSON intent ruleset.

Usage:
  intentio --rules <file> [OPTIONS] [--] <query...>
  intentio --rules <file> [OPTIONS] --input <text>

Options:
  -r, --rules <file>         JSON array of intents (required).
  -i, --input <text>         Query to resolve. If omitted, reads remaining args
                             or stdin when no args are provided.
  -c, --context <json>       Request context object, e.g. '{{\"market\":\"de\"}}'.
                             Without it every intent is eligible.
  -l, --language <code>      Language for unit translation. Default: {language}
  --max-rounds <n>           Upper bound on cascading rounds. Default: {max_rounds}
  --json                     Print the activations as JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}               Log filter (e.g. debug, intentio=trace). Default: warn

Exit codes:
  0  Success.
  1  Ruleset could not be loaded.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        language = Options::default().language,
        max_rounds = intentio::DEFAULT_MAX_ROUNDS,
        log_env = LOG_ENV,
    )
}
