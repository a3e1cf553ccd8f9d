//! hostcall CLI

use clap::{Parser, Subcommand, ValueEnum};
use hostcall::host::Host;
use hostcall::host::demo::demo_class_path;
use hostcall::script::{Runner, ScriptError, report_error};
use hostcall::{BridgeConfig, Session, Value};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "hostcall", version, about = "Call host classes from interpreter values")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log level, overriding -v and -q
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a call script against the demo classes
    Run {
        /// Script file
        file: PathBuf,
        /// Bridge configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run one foreign operation
    Call {
        /// Operation name, e.g. invoke-static
        operation: String,
        /// Arguments, in call script notation
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the demo classes and their public members
    Classes,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet, cli.log_level);

    let result = match cli.command {
        Command::Run { file, config } => run_file(&file, config.as_deref()),
        Command::Call {
            operation,
            args,
            config,
        } => call_operation(&operation, &args, config.as_deref()),
        Command::Classes => list_classes(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn setup_logging(verbose: u8, quiet: bool, log_level: Option<LogLevel>) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = if let Some(level) = log_level {
        EnvFilter::new(match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(true);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<BridgeConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading bridge config");
            Ok(BridgeConfig::load(path)?)
        }
        None => Ok(BridgeConfig::default()),
    }
}

fn print_result(binding: Option<&str>, value: &Value) {
    match binding {
        Some(name) => println!("{name} = {value}"),
        None => println!("{value}"),
    }
}

fn run_file(path: &Path, config: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    let session = Session::demo(load_config(config)?);

    let mut runner = Runner::new(&session);
    let outcome = runner.run_each(&source, |call, value| {
        print_result(call.binding.as_deref(), value);
    });
    match outcome {
        Ok(()) => Ok(()),
        Err(error) => {
            report_error(&filename, &source, &error)?;
            Err(error.into())
        }
    }
}

fn call_operation(operation: &str, args: &[String], config: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut line = operation.to_string();
    for arg in args {
        line.push(' ');
        // Bare words cannot hold spaces; quote anything that needs it
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push_str(&format!("{arg:?}"));
        } else {
            line.push_str(arg);
        }
    }

    let session = Session::demo(load_config(config)?);
    let mut runner = Runner::new(&session);
    match runner.run(&line) {
        Ok(values) => {
            for value in &values {
                print_result(None, value);
            }
            Ok(())
        }
        Err(error @ ScriptError::Runtime { .. }) => Err(error.into()),
        Err(error) => {
            report_error("<args>", &line, &error)?;
            Err(error.into())
        }
    }
}

fn list_classes() -> Result<(), Box<dyn Error>> {
    let class_path = demo_class_path();
    for name in class_path.class_names() {
        let Some(class) = class_path.find_class(name) else {
            continue;
        };
        println!("{name}");
        for constructor in class.constructors() {
            println!("  new {constructor:?}");
        }
        for method in class_path.public_methods(&class) {
            println!("  {method:?}");
        }
    }
    Ok(())
}
