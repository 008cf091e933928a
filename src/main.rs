use std::{env, fs::read_to_string, io, process, rc::Rc, time::Instant};

use plc::{
    analyzer::analyzer::analyze,
    config::{Config, Mode, USAGE},
    display_error,
    environment::Value,
    errors::errors::Error,
    interpreter::interpreter::Interpreter,
    lexer::lexer::tokenize,
    parser::parser::parse,
};
use tracing::debug;

fn main() {
    init_tracing();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}\n{}", error, USAGE);
            process::exit(2);
        }
    };

    process::exit(run(&config));
}

/// Installs a log subscriber, only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Runs the file named by `config` and returns the process exit code.
fn run(config: &Config) -> i32 {
    let content = match read_to_string(&config.file) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("Failed to read {}: {}", config.file.display(), error);
            return 1;
        }
    };

    let file_name = config
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("shell"));

    match execute(config, &content, &file_name) {
        Ok(code) => code,
        Err(error) => {
            if display_error(&error, &config.file, &content, &mut io::stderr()).is_err() {
                eprintln!("{}", error);
            }
            1
        }
    }
}

fn execute(config: &Config, content: &str, file_name: &str) -> Result<i32, Error> {
    let start = Instant::now();

    let tokens = tokenize(content.to_string(), Some(file_name.to_string()))?;
    debug!(elapsed = ?start.elapsed(), tokens = tokens.len(), "tokenized");

    if config.dump_tokens {
        for token in &tokens {
            println!("{}", token);
        }
    }

    let parse_start = Instant::now();
    let ast = parse(tokens, Rc::new(file_name.to_string()))?;
    debug!(elapsed = ?parse_start.elapsed(), "parsed");

    if config.dump_ast {
        println!("{:#?}", ast);
    }

    let analyze_start = Instant::now();
    analyze(&ast)?;
    debug!(elapsed = ?analyze_start.elapsed(), "analyzed");

    if config.mode == Mode::Check {
        return Ok(0);
    }

    let value = Interpreter::new().run(&ast)?;
    debug!(elapsed = ?start.elapsed(), "finished");

    Ok(match value {
        Value::Integer(code) => code,
        _ => 0,
    })
}
