use anyhow::{bail, Context};
use build_engine::share::short_code;
use build_engine::{Engine, RoutingContext, RulesConfig, WireBuild};
use clap::{Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;
use serde::Serialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum Table {
    Masteries,
    Actions,
    Expertise,
}

#[derive(Subcommand)]
enum Cmd {
    /// Encode a build JSON file as a compact share token
    Encode {
        /// Path to a build JSON file (chosenMasteries, chosenActions, ...)
        file: PathBuf,
    },
    /// Encode a build JSON file as a JSON share token
    EncodeJson {
        /// Path to a build JSON file
        file: PathBuf,
    },
    /// Decode a share token or URL and print the build as JSON
    Decode {
        token: String,
        /// Print the build as decoded, before unknown entries are dropped
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Print derived stats for a share token
    Stats { token: String },
    /// Check a share token against the rules; exits non-zero when invalid
    Validate { token: String },
    /// Check a list of rank values (0-5) against the rank caps
    Ranks {
        #[arg(allow_negative_numbers = true, num_args = 0..)]
        values: Vec<i64>,
    },
    /// Print share links for a token
    Share {
        token: String,
        /// Base URL the links point at
        #[arg(long)]
        base_url: Option<String>,
        /// Path the links are generated from
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Generate a random valid build
    Sample {
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Print the build JSON instead of the token
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List catalog entries
    Catalog {
        #[arg(value_enum, default_value_t = Table::Masteries)]
        table: Table,
    },
}

#[derive(Parser)]
#[command(name = "build-cli")]
#[command(about = "Character build codec and stat calculator")]
struct Cli {
    /// Catalog file (.json/.yaml); the builtin catalog when omitted
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Rules file (.json/.yaml)
    #[arg(long, global = true, conflicts_with = "preset")]
    rules: Option<PathBuf>,
    /// Builtin rule set: default | classic
    #[arg(long, global = true)]
    preset: Option<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn load_engine(cli: &Cli) -> anyhow::Result<Engine> {
    let mut engine = Engine::from_paths(cli.catalog.as_deref(), cli.rules.as_deref())?;
    if let Some(name) = cli.preset.as_deref() {
        info!(preset = name, "using builtin rules");
        engine = Engine::new(engine.catalog().clone(), RulesConfig::builtin(name)?);
    }
    debug!(
        masteries = engine.catalog().masteries.len(),
        actions = engine.catalog().actions.len(),
        expertise = engine.catalog().expertise.len(),
        "catalog loaded"
    );
    Ok(engine)
}

fn load_build(engine: &Engine, path: &Path) -> anyhow::Result<build_engine::BuildState> {
    let text = read_text_auto(path)?;
    debug!(path = %path.display(), bytes = text.len(), "read build file");
    let wire: WireBuild = serde_json::from_str(&text)
        .with_context(|| format!("invalid build JSON: {}", path.display()))?;
    Ok(wire.into_build(engine.catalog()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = load_engine(&cli)?;
    match cli.cmd {
        Cmd::Encode { file } => {
            let build = load_build(&engine, &file)?;
            println!("{}", engine.encode(&build));
        }
        Cmd::EncodeJson { file } => {
            let build = load_build(&engine, &file)?;
            println!("{}", engine.encode_json(&build));
        }
        Cmd::Decode { token, raw } => {
            if raw {
                let decoded = engine.decode_raw(&token)?;
                eprintln!("format: {}", decoded.format);
                print_json(&decoded.wire)?;
            } else {
                let build = engine.decode(&token)?;
                print_json(&WireBuild::from_build(&build))?;
            }
        }
        Cmd::Stats { token } => {
            let build = engine.decode(&token)?;
            print_json(&engine.compute_stats(&build))?;
        }
        Cmd::Validate { token } => {
            let report = engine.validate_token(&token);
            if report.valid {
                println!("valid");
            } else {
                for error in &report.errors {
                    println!("{}", error);
                }
                bail!("build has {} problem(s)", report.errors.len());
            }
        }
        Cmd::Ranks { values } => {
            let check = engine.validate_rank_distribution(&values);
            match check.message {
                None => println!("ok"),
                Some(message) => bail!(message),
            }
        }
        Cmd::Share {
            token,
            base_url,
            path,
        } => {
            let mut ctx = RoutingContext {
                current_path: path,
                ..RoutingContext::default()
            };
            if let Some(base_url) = base_url {
                ctx.base_url = base_url;
            }
            let build = engine.decode(&token)?;
            let links = engine.share_links(&build, &ctx);
            println!("full: {}", links.full);
            println!("direct: {}", links.direct);
            println!("forum: {}", links.forum);
            println!("discord: {}", links.discord);
            println!("code: {}", short_code(&links.full));
        }
        Cmd::Sample { seed, json } => {
            let build = engine.sample(seed);
            if json {
                print_json(&WireBuild::from_build(&build))?;
            } else {
                println!("{}", engine.encode(&build));
            }
        }
        Cmd::Catalog { table } => {
            let catalog = engine.catalog();
            match table {
                Table::Masteries => {
                    for m in catalog.masteries.iter() {
                        println!(
                            "{:>3} {:<14} {:<10} {}",
                            m.id,
                            m.lookup,
                            m.primary_role.as_str(),
                            m.name
                        );
                    }
                }
                Table::Actions => {
                    for a in catalog.actions.iter() {
                        println!("{:>3} {:<16} {:<8} {}", a.id, a.lookup, a.category, a.name);
                    }
                }
                Table::Expertise => {
                    for e in catalog.expertise.iter() {
                        println!("{:>3} {:<12} {}", e.id, e.lookup, e.name);
                    }
                }
            }
        }
    }
    Ok(())
}
