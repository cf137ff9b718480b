//! Command dispatch
//!
//! Loads settings, applies flag overrides, and runs the selected command.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, info, instrument, warn};

use crate::application::services::TreeService;
use crate::application::demo_tree;
use crate::cli::args::{Cli, Commands, ConfigCommands, NotationArg};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Notation, Tree, TreeOutline};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Demo { input, no_render }) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            _demo(&container, input.as_deref(), *no_render)
        }
        Some(Commands::Print { file, notation }) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            _print(&container, file.as_deref(), *notation)
        }
        Some(Commands::Dump { file, dot }) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            _dump(&container, file.as_deref(), *dot)
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => _config_show(&load_settings(cli)?),
            ConfigCommands::Template => {
                print!("{}", Settings::template());
                Ok(())
            }
            ConfigCommands::Path => _config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see 'bintree --help'".into(),
        )),
    }
}

/// Layered settings from the working directory, then flag overrides.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir()
        .map_err(|e| InfraError::io("determine working directory", e))?;
    let mut settings = Settings::load(Some(&cwd))?;

    if let Some(mode) = cli.mode {
        settings.parse.mode = mode.into();
    }
    if let Some(limit) = cli.node_limit {
        if limit == 0 {
            return Err(CliError::InvalidArgs(
                "--node-limit must be at least 1".into(),
            ));
        }
        settings.parse.node_limit = Some(limit);
    }
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn read_tree(service: &TreeService, file: Option<&Path>) -> CliResult<Tree> {
    let tree = match file {
        Some(path) => service.read_file(path)?,
        None => service.read(&mut io::stdin().lock(), "stdin")?,
    };
    let nodes = tree.node_count();
    if tree.size() != nodes {
        warn!(size = tree.size(), nodes, "recorded size differs from node count");
    }
    Ok(tree)
}

fn print_notations(service: &TreeService, tree: &Tree, notations: &[Notation]) -> CliResult<()> {
    service
        .write_notations(tree, notations, &mut io::stdout().lock())
        .map_err(|e| InfraError::io("write tree to stdout", e))?;
    Ok(())
}

#[instrument(skip(container))]
fn _demo(container: &ServiceContainer, input: Option<&Path>, no_render: bool) -> CliResult<()> {
    let service = container.tree_service();
    let mut dumper = (!no_render).then(|| container.graph_dumper());

    let mut tree = demo_tree(container.settings.parse.node_limit)?;
    print_notations(&service, &tree, &Notation::ALL)?;
    if let Some(dumper) = dumper.as_mut() {
        let image = dumper.dump(&tree)?;
        info!(image = %image.display(), "demo tree rendered");
    }
    let released = tree.destroy();
    debug!(released, "demo tree destroyed");

    let mut tree = read_tree(&service, input)?;
    print_notations(&service, &tree, &Notation::ALL)?;
    if let Some(dumper) = dumper.as_mut() {
        let image = dumper.dump(&tree)?;
        info!(image = %image.display(), "input tree rendered");
    }
    tree.destroy();
    Ok(())
}

#[instrument(skip(container))]
fn _print(
    container: &ServiceContainer,
    file: Option<&Path>,
    notation: NotationArg,
) -> CliResult<()> {
    let service = container.tree_service();
    let tree = read_tree(&service, file)?;
    match notation {
        NotationArg::All => print_notations(&service, &tree, &Notation::ALL),
        NotationArg::Prefix => print_notations(&service, &tree, &[Notation::Prefix]),
        NotationArg::Infix => print_notations(&service, &tree, &[Notation::Infix]),
        NotationArg::Postfix => print_notations(&service, &tree, &[Notation::Postfix]),
        NotationArg::Outline => {
            output::info(&tree.to_outline());
            Ok(())
        }
    }
}

#[instrument(skip(container))]
fn _dump(container: &ServiceContainer, file: Option<&Path>, dot: bool) -> CliResult<()> {
    let tree = read_tree(&container.tree_service(), file)?;
    let mut dumper = container.graph_dumper();
    if dot {
        print!("{}", dumper.describe(&tree));
        return Ok(());
    }
    let image = dumper.dump(&tree)?;
    output::action("Rendered", &image.display());
    output::detail(&format!(
        "logged to {}",
        container.settings.log_file.display()
    ));
    Ok(())
}

fn _config_show(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn _config_path() -> CliResult<()> {
    output::header("Config files (lowest to highest precedence)");
    match global_config_path() {
        Some(path) => output::detail(&format!(
            "global: {} {}",
            path.display(),
            exists_marker(&path)
        )),
        None => output::warning("cannot determine global config directory"),
    }
    let cwd = std::env::current_dir()
        .map_err(|e| InfraError::io("determine working directory", e))?;
    let local = local_config_path(&cwd);
    output::detail(&format!(
        "local:  {} {}",
        local.display(),
        exists_marker(&local)
    ));
    output::detail("env:    BINTREE_* (e.g. BINTREE_PARSE__MODE=reference)");
    Ok(())
}

fn exists_marker(path: &Path) -> &'static str {
    if path.exists() {
        "(found)"
    } else {
        "(not found)"
    }
}
