//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{run_session, ApplicationError};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{QuestionTree, TagMatching};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::StdConsole;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(Commands::Completion { shell }) = &cli.command {
        completion(*shell);
        return Ok(());
    }

    let settings = load_settings(cli)?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        None => play(&container, None),
        Some(Commands::Play { seed }) => play(&container, seed.as_deref()),
        Some(Commands::New { object, force }) => new_document(&container, object.as_deref(), *force),
        Some(Commands::Show) => show(&container),
        Some(Commands::Stats) => stats(&container),
        Some(Commands::Check) => check(&container),
        Some(Commands::Config { command }) => config(cli, &container, command),
        Some(Commands::Completion { .. }) => Ok(()),
    }
}

/// Settings from config layers, then command line flags on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(file) = &cli.file {
        settings.questions_file = file.clone();
    }
    if cli.strict {
        settings.tag_matching = TagMatching::Strict;
    }
    Ok(settings)
}

#[instrument(skip(container))]
fn play(container: &ServiceContainer, seed: Option<&str>) -> CliResult<()> {
    let path = container.settings.questions_file.as_path();
    let seed = seed.unwrap_or(&container.settings.seed_object);
    let mut tree = container.documents.load_or_seed(path, seed)?;

    let mut console = StdConsole::new();
    let summary = run_session(&container.documents, path, &mut tree, &mut console)?;

    output::success(&format!(
        "{} round(s): {} won, {} new object(s) learned, saved to {}",
        summary.rounds,
        summary.wins,
        summary.learned,
        path.display()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn new_document(container: &ServiceContainer, object: Option<&str>, force: bool) -> CliResult<()> {
    let path = container.settings.questions_file.as_path();
    if container.documents.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "{} already exists, use --force to start over",
            path.display()
        )));
    }
    let object = object.unwrap_or(&container.settings.seed_object);
    let tree = QuestionTree::from_object(object);
    container.documents.save(&tree, Some(path))?;
    output::success(&format!("new question document {} knows '{}'", path.display(), object));
    Ok(())
}

#[instrument(skip(container))]
fn show(container: &ServiceContainer) -> CliResult<()> {
    let tree = container.documents.load(&container.settings.questions_file)?;
    output::info(&tree.to_termtree());
    Ok(())
}

#[instrument(skip(container))]
fn stats(container: &ServiceContainer) -> CliResult<()> {
    let path = container.settings.questions_file.as_path();
    let tree = container.documents.load(path)?;
    output::header(&path.display());
    output::field("questions", &tree.question_count());
    output::field("objects", &tree.objects().len());
    output::field("depth", &tree.depth());
    Ok(())
}

#[instrument(skip(container))]
fn check(container: &ServiceContainer) -> CliResult<()> {
    let path = container.settings.questions_file.as_path();
    let tree = container.documents.load(path)?;
    tree.validate().map_err(ApplicationError::from)?;
    output::success(&format!(
        "{}: {} questions, {} objects ({} tags)",
        path.display(),
        tree.question_count(),
        tree.objects().len(),
        container.settings.tag_matching
    ));
    Ok(())
}

fn config(cli: &Cli, container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match config_path(cli) {
                Some(path) => output::info(&path.display()),
                None => output::warning("no config directory on this platform"),
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = config_path(cli).ok_or_else(|| {
                CliError::Usage("no config directory on this platform, use --config".into())
            })?;
            if container.fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                )));
            }
            let template = Settings::template()?;
            container
                .fs
                .ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
            container
                .fs
                .write(&path, &template)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("config template written to {}", path.display()));
            Ok(())
        }
    }
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(global_config_path)
}

fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
