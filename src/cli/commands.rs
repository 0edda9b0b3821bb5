//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::report::fmt_coord;
use crate::application::{rows, to_termtree, ApplicationError, TreeDocument};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{LayoutConfig, LayoutEngine};

/// Spacing values given on the command line; they beat loaded settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOverrides {
    pub node_size: Option<f64>,
    pub sibling_distance: Option<f64>,
    pub tree_distance: Option<f64>,
}

impl LayoutOverrides {
    fn apply(&self, base: LayoutConfig) -> LayoutConfig {
        LayoutConfig {
            node_size: self.node_size.unwrap_or(base.node_size),
            sibling_distance: self.sibling_distance.unwrap_or(base.sibling_distance),
            tree_distance: self.tree_distance.unwrap_or(base.tree_distance),
        }
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Layout {
            file,
            format,
            screen,
            node_size,
            sibling_distance,
            tree_distance,
        }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            let overrides = LayoutOverrides {
                node_size: *node_size,
                sibling_distance: *sibling_distance,
                tree_distance: *tree_distance,
            };
            let rendered = render_layout(file, *format, *screen, &settings, overrides)?;
            output::info(&rendered);
            Ok(())
        }
        Some(Commands::Config { command }) => execute_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::header("# effective settings");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::InvalidArgs(
                    "no home directory, cannot locate global config".to_string(),
                ))
            }
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

/// Reads, lays out and formats a tree document.
#[instrument(level = "debug", skip(settings))]
pub fn render_layout(
    file: &Path,
    format: OutputFormat,
    screen: bool,
    settings: &Settings,
    overrides: LayoutOverrides,
) -> CliResult<String> {
    let document = TreeDocument::from_path(file)?;
    let tree = document.to_arena();

    let config = overrides.apply(settings.layout);
    debug!(?config, "layout config");
    let engine = LayoutEngine::new(config).map_err(ApplicationError::from)?;
    let layout = engine.layout(&tree).map_err(ApplicationError::from)?;

    let rendered = match format {
        OutputFormat::Tree => to_termtree(&tree, &layout).to_string(),
        OutputFormat::Table => {
            let transform = screen.then_some(&settings.screen);
            rows(&tree, &layout, transform)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    if screen && format == OutputFormat::Tree {
        let transform = &settings.screen;
        let points = rows(&tree, &layout, Some(transform))
            .into_iter()
            .filter_map(|row| {
                row.screen
                    .map(|p| format!("{}: ({}, {})", row.label, fmt_coord(p.x), fmt_coord(p.y)))
            })
            .collect::<Vec<_>>()
            .join("\n");
        return Ok(format!("{}\n{}", rendered.trim_end(), points));
    }

    Ok(rendered.trim_end().to_string())
}
