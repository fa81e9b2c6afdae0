use std::path::Path;

use clap::Parser;
use console::style;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use twisterlang::codec::{self, BuildRequest};
use twisterlang::domains::envelope::Envelope;
use twisterlang::error::{Result, TwisterLangError};
use twisterlang::lint::{EnvelopeLint, Schema};

#[derive(Parser, Debug)]
#[command(name = "twisterlang")]
#[command(about = "TwisterLang envelope CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    Build {
        #[arg(long, help = "JSON string of the message to build")]
        message: String,
    },
    Validate {
        #[arg(long, help = "JSON string of the message to validate")]
        message: String,

        #[arg(long, help = "Path to a schema file for stricter field checks")]
        schema: Option<String>,
    },
    Encode {
        #[arg(long, help = "JSON string of the envelope to encode")]
        message: String,
    },
    Decode {
        #[arg(long, help = "Transport text to decode")]
        text: String,
    },
    Lint {
        #[arg(help = "Envelope file or directory of .json files")]
        path: String,

        #[arg(long, help = "Path to a schema file for stricter field checks")]
        schema: Option<String>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,twisterlang=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build { message } => {
            let value = parse_message(&message)?;
            let request = BuildRequest::from_value(value)?;
            let envelope = codec::build(request)?;
            println!("{}", render_pretty(&envelope.to_value())?);
            println!(
                "{} {}",
                style("encoded:").color256(245),
                codec::encode_to_text(&envelope)?
            );
            Ok(())
        }
        Commands::Validate { message, schema } => {
            let value = parse_message(&message)?;
            let lint = EnvelopeLint::new(load_schema(schema.as_deref())?);
            match lint.check(&value) {
                None => {
                    println!("Message is valid: true");
                    Ok(())
                }
                Some(reason) => {
                    println!("Message is valid: false ({reason})");
                    std::process::exit(1);
                }
            }
        }
        Commands::Encode { message } => {
            let value = parse_message(&message)?;
            let envelope: Envelope = serde_json::from_value(value)
                .map_err(|e| TwisterLangError::InvalidArguments(e.to_string()))?;
            println!("{}", codec::encode_to_text(&envelope)?);
            Ok(())
        }
        Commands::Decode { text } => {
            let message = codec::decode_from_text(&text)?;
            println!("{}", render_pretty(&message)?);
            if !codec::validate(&message) {
                println!(
                    "{}",
                    style("warning: decoded message is not a valid envelope").color256(214)
                );
            }
            Ok(())
        }
        Commands::Lint { path, schema } => {
            let lint = EnvelopeLint::new(load_schema(schema.as_deref())?);
            let target = Path::new(&path);
            let failures = if target.is_dir() {
                lint.lint_dir(target)?
            } else {
                let errors = lint.lint_file(target)?;
                let mut failures = std::collections::BTreeMap::new();
                if !errors.is_empty() {
                    failures.insert(path.clone(), errors);
                }
                failures
            };

            if failures.is_empty() {
                println!("No linting errors found.");
                return Ok(());
            }
            for (file, errors) in &failures {
                println!("{}", style(format!("Errors in {file}:")).color256(203));
                for error in errors {
                    println!(" - entry {}: {}", error.index, error.reason);
                }
            }
            std::process::exit(1);
        }
    }
}

fn parse_message(message: &str) -> Result<Value> {
    serde_json::from_str(message).map_err(|e| TwisterLangError::Parse(e.to_string()))
}

fn render_pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| TwisterLangError::Serialization(e.to_string()))
}

fn load_schema(path: Option<&str>) -> Result<Option<Schema>> {
    path.map(Schema::from_file).transpose()
}
