use std::path::PathBuf;

use clap::Parser;

use crate::model::Difficulty;

#[derive(Parser, Debug)]
#[command(name = "trivia", version, about = "Terminal-based timed trivia quiz")]
pub struct Cli {
    /// Question difficulty [default: from config, else easy]
    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Trivia API endpoint
    #[arg(long, value_name = "url")]
    pub api_url: Option<String>,

    /// Config file [default: <config dir>/trivia/config.yaml]
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Directory for saved progress, high score and log
    #[arg(long, value_name = "dir")]
    pub data_dir: Option<PathBuf>,

    /// Discard the saved quiz in progress and start fresh
    #[arg(long)]
    pub clear: bool,

    /// Show saved progress without entering the TUI
    #[arg(long)]
    pub status: bool,

    /// Export the saved quiz and answers to a YAML file
    #[arg(long, value_name = "path")]
    pub export: Option<PathBuf>,
}
