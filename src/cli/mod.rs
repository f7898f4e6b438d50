//! CLI module for schemafinder.
//!
//! Subcommands:
//! - `browse`: Walk the column browser with scripted selections and keys
//! - `graph`: Build the eager node graph of whole documents

mod browse;
mod graph;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;

pub use browse::Selection;

/// schemafinder - JSON Schema column browser
#[derive(Parser)]
#[command(name = "schemafinder")]
#[command(about = "Browse JSON Schema documents column by column")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Allow fetching remote documents named by `$ref`
    #[arg(long, global = true)]
    pub allow_remote: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open schema files in the column browser
    Browse {
        /// Schema files, one root entry each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Key presses applied after the selections, e.g. "l j j l"
        #[arg(long)]
        keys: Option<String>,

        /// Select a row as <column>:<row>, repeatable
        #[arg(long = "select")]
        selections: Vec<Selection>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the node graph of whole schema files
    Graph {
        /// Schema files, each walked under its file stem
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        let ctx = self.context()?;

        match &self.command {
            Command::Browse {
                files,
                keys,
                selections,
                json,
            } => {
                self.run_browse(&ctx, files, keys.as_deref(), selections, *json)
                    .await
            }
            Command::Graph { files, json } => self.run_graph(&ctx, files, *json).await,
        }
    }

    /// Layered config with command-line overrides applied.
    fn context(&self) -> Result<Context> {
        let mut config = Config::load()?;
        if self.allow_remote {
            config.deref.allow_remote = true;
        }
        tracing::debug!(allow_remote = config.deref.allow_remote, "Loaded configuration");

        Ok(Context::new(config)?)
    }
}
