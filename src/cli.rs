//! Command-line interface for sortwise.
//!
//! Every subcommand runs its operation on a worker thread that holds the
//! target folder (see [`crate::lock`]), reports per-file events through a
//! [`ConsoleSink`] and prints a summary with [`OutputFormatter`] once the
//! operation returns.

use crate::classify::{Classifier, CommandClassifier, ResponseFileClassifier};
use crate::cleanup::clean_artifacts;
use crate::config::Config;
use crate::error::OrganizeResult;
use crate::executor::apply_plan;
use crate::lock::{FolderLocks, run_exclusive};
use crate::logging::ConsoleSink;
use crate::organizer::Organizer;
use crate::output::OutputFormatter;
use crate::plan::MovePlan;
use crate::revert::revert;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Sort the files of a folder into category subfolders, with preview and revert.
#[derive(Debug, Parser)]
#[command(name = "sortwise", version)]
pub struct Cli {
    /// Configuration file [default: ./.sortwiserc.toml, then ~/.config/sortwise/config.toml]
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every file event (-v); also raises the log file level (-vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Append log events to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify a folder and show where each file would go, without moving anything
    Preview {
        folder: PathBuf,
        /// Read the classification from a saved model response instead of running the classifier command
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
        /// Write the plan as JSON so it can be applied later
        #[arg(long, value_name = "FILE")]
        save_plan: Option<PathBuf>,
    },
    /// Move files into their category folders
    Apply {
        folder: PathBuf,
        /// Apply a plan saved by `preview --save-plan`
        #[arg(long, value_name = "FILE", conflicts_with = "from")]
        plan: Option<PathBuf>,
        /// Classify from a saved model response, then apply
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },
    /// Move every file of the last apply back to where it was
    Revert { folder: PathBuf },
    /// Delete the movement log and empty category folders
    Clean {
        folder: PathBuf,
        /// Keep the movement log
        #[arg(long)]
        keep_journal: bool,
        /// Keep empty folders
        #[arg(long)]
        keep_folders: bool,
    },
}

impl Cli {
    /// Log filter level selected by the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Runs a parsed command line.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use sortwise::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["sortwise", "revert", "/path/to/folder"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let quiet = cli.verbose == 0;
    let locks = FolderLocks::new();

    match cli.command {
        Command::Preview {
            folder,
            from,
            save_plan,
        } => run_preview(&locks, &config, &folder, from, save_plan, quiet),
        Command::Apply { folder, plan, from } => {
            run_apply(&locks, &config, &folder, plan, from, quiet)
        }
        Command::Revert { folder } => run_revert(&locks, &folder, quiet),
        Command::Clean {
            folder,
            keep_journal,
            keep_folders,
        } => run_clean(&locks, &folder, !keep_journal, !keep_folders, quiet),
    }
}

fn console(quiet: bool) -> ConsoleSink {
    if quiet {
        ConsoleSink::quiet()
    } else {
        ConsoleSink::new()
    }
}

/// Runs `op` on a worker holding `folder` and waits for it.
fn exclusive<T, F>(locks: &FolderLocks, folder: &Path, op: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&Path) -> OrganizeResult<T> + Send + 'static,
{
    run_exclusive(locks, folder, op)
        .and_then(|worker| worker.join())
        .map_err(|e| format!("Error: {}", e))
}

/// Picks the response file when one is given, else the configured command.
fn classifier_for(
    config: &Config,
    from: Option<PathBuf>,
) -> Result<Box<dyn Classifier>, String> {
    if let Some(path) = from {
        return Ok(Box::new(ResponseFileClassifier::new(path)));
    }

    match &config.classifier.command {
        Some(program) => Ok(Box::new(CommandClassifier::new(
            program.clone(),
            config.classifier.args.clone(),
        ))),
        None => Err(
            "No classifier configured. Set [classifier] command in the configuration or pass --from <FILE>."
                .to_string(),
        ),
    }
}

fn organizer_for(config: &Config) -> Result<Organizer, String> {
    Organizer::from_config(config).map_err(|e| format!("Error compiling filters: {}", e))
}

fn run_preview(
    locks: &FolderLocks,
    config: &Config,
    folder: &Path,
    from: Option<PathBuf>,
    save_plan: Option<PathBuf>,
    quiet: bool,
) -> Result<(), String> {
    OutputFormatter::info(&format!("Previewing: {}", folder.display()));

    let organizer = organizer_for(config)?;
    let classifier = classifier_for(config, from)?;
    let preview = exclusive(locks, folder, move |folder| {
        organizer.preview(folder, classifier.as_ref(), &console(quiet))
    })?;

    OutputFormatter::plan_table(&preview.plan);

    if let Some(path) = save_plan {
        preview
            .plan
            .save(&path)
            .map_err(|e| format!("Error: {}", e))?;
        OutputFormatter::success(&format!("Plan saved to {}", path.display()));
        OutputFormatter::info(&format!(
            "Run 'sortwise apply {} --plan {}' to carry it out.",
            folder.display(),
            path.display()
        ));
    }

    OutputFormatter::preview_notice("No files were moved.");
    Ok(())
}

fn run_apply(
    locks: &FolderLocks,
    config: &Config,
    folder: &Path,
    plan: Option<PathBuf>,
    from: Option<PathBuf>,
    quiet: bool,
) -> Result<(), String> {
    let report = match plan {
        Some(plan_path) => {
            let plan = MovePlan::load(&plan_path).map_err(|e| format!("Error: {}", e))?;
            OutputFormatter::info(&format!(
                "Applying {} planned moves in: {}",
                plan.counts().moves,
                folder.display()
            ));
            exclusive(locks, folder, move |folder| {
                apply_plan(folder, &plan, &console(quiet))
            })?
        }
        None => {
            let organizer = organizer_for(config)?;
            let classifier = classifier_for(config, from)?;
            OutputFormatter::info(&format!("Organizing: {}", folder.display()));
            exclusive(locks, folder, move |folder| {
                organizer.organize(folder, classifier.as_ref(), &console(quiet))
            })?
        }
    };

    OutputFormatter::apply_summary(&report);
    if !report.moved.is_empty() {
        OutputFormatter::info(&format!(
            "Use 'sortwise revert {}' to move the files back.",
            folder.display()
        ));
    }
    Ok(())
}

fn run_revert(locks: &FolderLocks, folder: &Path, quiet: bool) -> Result<(), String> {
    OutputFormatter::info(&format!("Reverting: {}", folder.display()));
    let report = exclusive(locks, folder, move |folder| revert(folder, &console(quiet)))?;
    OutputFormatter::revert_summary(&report);
    Ok(())
}

fn run_clean(
    locks: &FolderLocks,
    folder: &Path,
    delete_journal: bool,
    prune_folders: bool,
    quiet: bool,
) -> Result<(), String> {
    let report = exclusive(locks, folder, move |folder| {
        clean_artifacts(folder, delete_journal, prune_folders, &console(quiet))
    })?;
    OutputFormatter::cleanup_summary(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_preview_with_options() {
        let cli = Cli::try_parse_from([
            "sortwise",
            "-vv",
            "preview",
            "/tmp/folder",
            "--from",
            "response.json",
            "--save-plan",
            "plan.json",
        ])
        .expect("Failed to parse");

        assert_eq!(cli.log_level(), "debug");
        match cli.command {
            Command::Preview {
                folder,
                from,
                save_plan,
            } => {
                assert_eq!(folder, PathBuf::from("/tmp/folder"));
                assert_eq!(from, Some(PathBuf::from("response.json")));
                assert_eq!(save_plan, Some(PathBuf::from("plan.json")));
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_apply_plan_and_from_conflict() {
        let result = Cli::try_parse_from([
            "sortwise", "apply", "/tmp/folder", "--plan", "p.json", "--from", "r.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["sortwise", "revert", "/tmp/folder", "-c", "my.toml"])
            .expect("Failed to parse");

        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_clean_flags() {
        let cli = Cli::try_parse_from(["sortwise", "clean", "/tmp/folder", "--keep-journal"])
            .expect("Failed to parse");

        assert!(matches!(
            cli.command,
            Command::Clean {
                keep_journal: true,
                keep_folders: false,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_classifier_is_reported() {
        let result = classifier_for(&Config::default(), None);
        let Err(message) = result else {
            panic!("Expected an error without a classifier");
        };
        assert!(message.contains("--from"));
    }
}
