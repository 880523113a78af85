//! `bt` - behavior tree toolchain.
//!
//! - `bt compile` - script → flattened tree asset
//! - `bt inspect` - print the tables of a compiled asset
//! - `bt run` - tick a compiled tree against a blackboard

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use ai_bt::{BehaviorRegistry, BehaviorTree, BehaviorTreeAsset, Brain, NodeId};
use ai_bt_compiler::{compile_with, CompileOptions};
use ai_core::{Blackboard, BlackboardAsset, Status, TickContext};

use crate::config::RunConfig;

#[derive(Parser)]
#[command(name = "bt")]
#[command(about = "Behavior tree compiler and runner", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Run configuration file (defaults to <project>/.bt/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a script into a tree asset
    Compile {
        script: PathBuf,
        asset: PathBuf,

        /// Reject unknown attributes
        #[arg(long)]
        strict: bool,
    },

    /// Print the node tables of a tree asset
    Inspect { asset: PathBuf },

    /// Tick a tree asset
    Run {
        asset: PathBuf,

        /// Tick budget (overrides max_ticks)
        #[arg(long)]
        ticks: Option<u64>,

        /// Persisted blackboard to start from
        #[arg(long)]
        blackboard: Option<PathBuf>,

        /// Write the blackboard back after the run
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let project_root = match cli.project {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::load_from_project(&project_root)?,
    };
    config.resolve_paths(&project_root);

    match cli.command {
        Commands::Compile {
            script,
            asset,
            strict,
        } => compile_script(&script, &asset, strict || config.strict_attributes),
        Commands::Inspect { asset } => inspect_asset(&asset),
        Commands::Run {
            asset,
            ticks,
            blackboard,
            save,
        } => {
            if let Some(ticks) = ticks {
                config.max_ticks = ticks;
            }
            if blackboard.is_some() {
                config.blackboard = blackboard;
            }
            config.save_blackboard |= save;
            run_tree(&asset, &config)
        }
    }
}

fn compile_script(script: &Path, asset: &Path, strict: bool) -> Result<()> {
    let options = CompileOptions {
        strict_attributes: strict,
    };
    let compiled = compile_with(script, asset, &BehaviorRegistry::builtin(), options)
        .with_context(|| format!("Failed to compile {}", script.display()))?;

    println!(
        "Compiled {} ({} nodes) -> {}",
        script.display(),
        compiled.len(),
        asset.display()
    );
    Ok(())
}

fn inspect_asset(path: &Path) -> Result<()> {
    let asset = BehaviorTreeAsset::load(path)
        .with_context(|| format!("Failed to load tree asset {}", path.display()))?;
    asset
        .validate()
        .with_context(|| format!("Invalid tree asset {}", path.display()))?;

    println!("Tree asset: {}", path.display());
    println!("{:>4}  {:>6}  {:<14} children", "id", "parent", "behavior");
    for (index, behavior) in asset.behaviors.iter().enumerate() {
        let parent = asset.parents[index].map_or_else(|| "-".to_string(), |p| p.0.to_string());
        let children: Vec<String> = asset.children[index]
            .iter()
            .map(|c| c.0.to_string())
            .collect();
        println!(
            "{:>4}  {:>6}  {:<14} [{}]",
            index,
            parent,
            behavior.tag(),
            children.join(", ")
        );
    }
    Ok(())
}

fn run_tree(path: &Path, config: &RunConfig) -> Result<()> {
    let tree = BehaviorTree::load(path)
        .with_context(|| format!("Failed to load tree asset {}", path.display()))?;
    let blackboard = load_blackboard(config.blackboard.as_deref())?;

    let mut brain = Brain::new(0, tree).with_blackboard(blackboard);
    brain.config.think_every_ticks = config.think_every_ticks;

    tracing::info!(
        asset = %path.display(),
        max_ticks = config.max_ticks,
        "Starting run"
    );

    let mut ctx = TickContext::new(0);
    let mut ticks = 0;
    let mut last = Status::Undefined;
    while ticks < config.max_ticks {
        if let Some(status) = brain.tick(&ctx) {
            last = status;
            if config.stop_on_completion && status.is_terminal() {
                ticks += 1;
                break;
            }
        }
        ticks += 1;
        ctx = ctx.next();
    }

    println!("Finished after {ticks} ticks: {last:?}");
    if brain.tree.status() == Status::Running {
        print_running_path(&brain.tree);
        tracing::info!(ticks, "Tick budget exhausted, aborting running branch");
        brain.tree.abort(&ctx, &mut brain.blackboard);
    }

    if config.save_blackboard {
        let Some(target) = config.blackboard.as_deref() else {
            bail!("--save needs a blackboard path (--blackboard or `blackboard:` in config)");
        };
        brain
            .blackboard
            .serialize()
            .save(target)
            .with_context(|| format!("Failed to save blackboard to {}", target.display()))?;
        println!("Saved blackboard ({} parameters) to {}", brain.blackboard.len(), target.display());
    }
    Ok(())
}

fn load_blackboard(path: Option<&Path>) -> Result<Blackboard> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(Blackboard::new());
    };
    let asset = BlackboardAsset::load(path)
        .with_context(|| format!("Failed to load blackboard {}", path.display()))?;
    let blackboard = Blackboard::from_asset(asset)
        .with_context(|| format!("Inconsistent blackboard {}", path.display()))?;
    tracing::debug!(path = %path.display(), parameters = blackboard.len(), "Loaded blackboard");
    Ok(blackboard)
}

fn print_running_path(tree: &BehaviorTree) {
    let path: Vec<String> = tree
        .running_path()
        .iter()
        .map(|&id: &NodeId| {
            let name = tree.node(id).map_or("?", |node| node.name());
            format!("{name}{id}")
        })
        .collect();
    println!("Running path: {}", path.join(" > "));
}
