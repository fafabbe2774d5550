//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Minify and bundle JavaScript and CSS in place
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: minwatch.toml)
    #[arg(short = 'C', long, default_value = "minwatch.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Minify and bundle once for production
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: InputArgs,
    },

    /// Build once, then rebuild on every change until Ctrl+C
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        args: InputArgs,
    },
}

/// Shared input arguments for Build and Dev commands
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Files or directories to process. If omitted, walks the current directory.
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Emit source maps (default: false for build, true for dev)
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub sourcemap: Option<bool>,
}

impl Cli {
    pub const fn is_dev(&self) -> bool {
        matches!(self.command, Commands::Dev { .. })
    }

    pub const fn input(&self) -> &InputArgs {
        match &self.command {
            Commands::Build { args } | Commands::Dev { args } => args,
        }
    }

    /// Source map flag with the per-command default applied.
    pub fn source_map(&self) -> bool {
        self.input().sourcemap.unwrap_or(self.is_dev())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["minwatch", "build", "js", "css/site.css"]).unwrap();
        assert!(!cli.is_dev());
        assert!(!cli.source_map());
        assert_eq!(cli.input().paths, vec![PathBuf::from("js"), PathBuf::from("css/site.css")]);
        assert_eq!(cli.config, PathBuf::from("minwatch.toml"));
    }

    #[test]
    fn test_dev_alias_and_sourcemap_default() {
        let cli = Cli::try_parse_from(["minwatch", "d"]).unwrap();
        assert!(cli.is_dev());
        assert!(cli.source_map());
        assert!(cli.input().paths.is_empty());
    }

    #[test]
    fn test_sourcemap_flag_forms() {
        let cli = Cli::try_parse_from(["minwatch", "build", "--sourcemap"]).unwrap();
        assert!(cli.source_map());
        let cli = Cli::try_parse_from(["minwatch", "dev", "--sourcemap", "false"]).unwrap();
        assert!(!cli.source_map());
    }

    #[test]
    fn test_global_verbose() {
        let cli = Cli::try_parse_from(["minwatch", "b", "-V"]).unwrap();
        assert!(cli.verbose);
    }
}
