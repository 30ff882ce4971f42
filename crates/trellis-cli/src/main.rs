use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use trellis_runtime::{patterns, PatternCompiler};

/// Trellis pattern-expression compiler.
///
/// Compiles chained, nested method-call expressions against the standard
/// pattern library and lets you probe inputs against the result.
///
/// EXAMPLES:
///     trellis compile 'string().contains("x")'
///     trellis compile 'anyOf(string().startsWith("a"), string().endsWith("z"))' --probe abc
///     trellis declarations
#[derive(Parser)]
#[command(name = "trellis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a pattern expression
    ///
    /// Prints the canonical form of the compiled pattern and, for every
    /// --probe input, whether the pattern accepts it.
    #[command(visible_alias = "c")]
    Compile {
        /// The pattern expression to compile
        expression: String,
        /// Input strings to test against the compiled pattern
        #[arg(long, short = 'p')]
        probe: Vec<String>,
        /// Output as JSON
        #[arg(long, env = "TRELLIS_JSON")]
        json: bool,
    },

    /// List the callables known to the compiler
    ///
    /// Prints every registered candidate grouped by owning kind.
    #[command(visible_alias = "d")]
    Declarations {
        /// Output as JSON
        #[arg(long, env = "TRELLIS_JSON")]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let compiler = PatternCompiler::new(Arc::new(patterns::standard_registry()));

    match cli.command {
        Commands::Compile {
            expression,
            probe,
            json,
        } => {
            let value = compiler.compile(&expression)?;
            let rendered =
                patterns::render(&value).unwrap_or_else(|| "<opaque pattern>".to_string());
            if json {
                let probes: Vec<serde_json::Value> = probe
                    .iter()
                    .map(|input| {
                        serde_json::json!({
                            "input": input,
                            "matches": patterns::accepts(&value, input),
                        })
                    })
                    .collect();
                let out = serde_json::json!({ "pattern": rendered, "probes": probes });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{rendered}");
                for input in &probe {
                    match patterns::accepts(&value, input) {
                        Some(true) => println!("{input}: match"),
                        Some(false) => println!("{input}: no match"),
                        None => println!("{input}: pattern is not probeable"),
                    }
                }
            }
        }
        Commands::Declarations { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&compiler.declarations())?);
            } else {
                print!("{}", compiler.dump_declarations());
            }
        }
    }

    Ok(())
}
