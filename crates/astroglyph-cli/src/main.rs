use anyhow::{Context, Result, bail};
use astroglyph_config::Config;
use astroglyph_syntax::{EcmaScript, ParseOptions, debug_tree, parse_with};
use std::{env, fs, path::PathBuf, process};

const USAGE: &str = "Usage: astroglyph-cli <file> [--config <path>] [--diagnostics-only]";

#[derive(Debug, PartialEq)]
struct Args {
    file: PathBuf,
    config: Option<PathBuf>,
    diagnostics_only: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut file = None;
    let mut config = None;
    let mut diagnostics_only = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    bail!("--config needs a path");
                };
                config = Some(Config::expand_path(&PathBuf::from(path)));
            }
            "--diagnostics-only" => diagnostics_only = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if file.is_some() => bail!("only one input file is supported"),
            _ => file = Some(PathBuf::from(arg)),
        }
    }

    let Some(file) = file else {
        bail!("no input file given");
    };
    Ok(Args {
        file,
        config,
        diagnostics_only,
    })
}

fn load_options(config: Option<&PathBuf>) -> Result<ParseOptions> {
    let loaded = match config {
        Some(path) => {
            let config = Config::load_from_path(path)?;
            if config.is_none() {
                bail!("config file {} does not exist", path.display());
            }
            config
        }
        None => Config::load()?,
    };
    match loaded {
        Some(config) => Ok(config.parser),
        None => {
            log::info!(
                "No config file at {}, using defaults",
                Config::config_path().display()
            );
            Ok(ParseOptions::default())
        }
    }
}

/// Tree dump and diagnostics for one document, and whether it had errors.
fn render(source: &str, options: &ParseOptions, diagnostics_only: bool) -> (String, bool) {
    let parse = parse_with(source, options, &EcmaScript);
    let mut out = String::new();
    if !diagnostics_only {
        out.push_str(&debug_tree(&parse.syntax()));
    }
    for diagnostic in parse.diagnostics() {
        out.push_str(&format!("{diagnostic}\n"));
    }
    (out, parse.has_errors())
}

fn run(args: &Args) -> Result<bool> {
    let options = load_options(args.config.as_ref())?;
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    log::info!("Parsing {} ({} bytes)", args.file.display(), source.len());

    let (out, has_errors) = render(&source, &options, args.diagnostics_only);
    print!("{out}");
    Ok(has_errors)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    if run(&args)? {
        process::exit(1);
    }
    Ok(())
}
