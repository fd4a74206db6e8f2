use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

use linkage::mechanism::MechanismCfg;
use linkage::planner::{plan, Plan, PlannerCfg, StallLimit, UnresolvedReason};

mod load;

use load::MechanismFile;

#[derive(Parser)]
#[command(name = "linkage")]
#[command(about = "Plan the solving order of a planar linkage")]
struct Cmd {
    /// Log planner decisions (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Action {
    /// Plan the expression order for a mechanism file (YAML or .json)
    Plan {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Write the result here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Exit with an error when some joints stay unresolved
        #[arg(long)]
        strict: bool,
        #[arg(long, default_value = "ground")]
        ground_link: String,
        /// Fruitless scan steps before giving up (default: joint count)
        #[arg(long)]
        stall_limit: Option<usize>,
    },
    /// Print the mechanism expression `M[...]`
    Expr {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "ground")]
        ground_link: String,
    },
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let default_level = if cmd.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Plan {
            input,
            format,
            out,
            strict,
            ground_link,
            stall_limit,
        } => run_plan(&input, format, out.as_deref(), strict, ground_link, stall_limit),
        Action::Expr { input, ground_link } => expr(&input, ground_link),
    }
}

fn run_plan(
    input: &Path,
    format: Format,
    out: Option<&Path>,
    strict: bool,
    ground_link: String,
    stall_limit: Option<usize>,
) -> Result<()> {
    tracing::info!(input = %input.display(), ?format, strict, "plan");
    let file = MechanismFile::read(input)?;
    let mech = file.to_mechanism(&MechanismCfg { ground_link })?;
    let cfg = PlannerCfg {
        stall_limit: stall_limit.map_or(StallLimit::JointCount, StallLimit::Fixed),
    };
    let plan = plan(&mech, cfg)?;
    let text = format_plan(&plan, format)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &text)?;
        }
        None => print!("{text}"),
    }
    if strict && !plan.is_complete() {
        bail!(
            "{} joint(s) unresolved: {:?}",
            plan.unresolved.len(),
            plan.unresolved_joints()
        );
    }
    Ok(())
}

fn expr(input: &Path, ground_link: String) -> Result<()> {
    let file = MechanismFile::read(input)?;
    let mech = file.to_mechanism(&MechanismCfg { ground_link })?;
    mech.validate()?;
    println!("{}", mech.expr());
    Ok(())
}

fn format_plan(plan: &Plan, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => {
            let mut s = serde_json::to_string_pretty(plan)?;
            s.push('\n');
            s
        }
        Format::Text => {
            let mut s = plan.render();
            s.push('\n');
            for u in &plan.unresolved {
                let why = match u.reason {
                    UnresolvedReason::UnsupportedKind { kind } => {
                        format!("unsupported joint type {kind}")
                    }
                    UnresolvedReason::NoLockedReference { nearest: Some(n) } => {
                        format!("driver without a locked reference (nearest P{n})")
                    }
                    UnresolvedReason::NoLockedReference { nearest: None } => {
                        "driver without any neighbor".to_string()
                    }
                    UnresolvedReason::UnderConstrained => "under-constrained".to_string(),
                };
                s.push_str(&format!("# P{}: {why}\n", u.joint));
            }
            s
        }
    })
}
