//! Command dispatch for the potx CLI.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::{
    args::{Arguments, Command, ExtractCommand},
    exit_status::ExitStatus,
    report,
};
use crate::{
    catalog::{Catalog, pot},
    config::{self, CONFIG_FILE_NAME, Config},
    parsers::{Parser, block_templates::BlockTemplatesParser, php::PhpParser},
    scan::ScanCache,
};

pub fn run(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };
    match args.command {
        Some(Command::Extract(cmd)) => extract(cmd),
        Some(Command::Parsers) => {
            report::print_parsers();
            Ok(ExitStatus::Success)
        }
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let loaded = config::load_config(&cmd.dir)?;
    let config = loaded.config;
    if cmd.verbose && loaded.from_file {
        report::print_config_used();
    }
    let exclude_vendor = config.exclude_vendor_dirs && !cmd.include_vendor;
    let output = cmd
        .output
        .clone()
        .unwrap_or_else(|| config.output.clone());
    let parser_names: Vec<String> = if cmd.parsers.is_empty() {
        config.parsers.clone()
    } else {
        cmd.parsers.iter().map(|p| p.name().to_string()).collect()
    };

    let mut catalog = Catalog::new();
    let mut cache = ScanCache::new();
    for name in &parser_names {
        let parser = build_parser(name, &config, &cmd, exclude_vendor)?;
        catalog = parser
            .extract_from_directory(Some(catalog), &cmd.dir, &cmd.relative_path, &mut cache)
            .with_context(|| format!("{name} extraction failed"))?;
        if cmd.verbose {
            report::print_parser_progress(name, &catalog);
        }
    }

    if output == "-" {
        print!("{}", pot::to_pot_string(&catalog));
    } else {
        fs::write(Path::new(&output), pot::to_pot_string(&catalog))
            .with_context(|| format!("Failed to write {output}"))?;
    }
    report::print_extract_summary(&catalog, &output, cmd.verbose);

    Ok(if catalog.is_empty() {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    })
}

fn build_parser(
    name: &str,
    config: &Config,
    cmd: &ExtractCommand,
    exclude_vendor: bool,
) -> Result<Box<dyn Parser>> {
    match name {
        "php" => {
            let mut parser = PhpParser::new().with_markers(config.markers.clone());
            if !exclude_vendor {
                parser = parser.include_vendor_dirs();
            }
            if cmd.builtin_only {
                parser = parser.builtin_only();
            }
            Ok(Box::new(parser))
        }
        "block-templates" => {
            let mut parser = BlockTemplatesParser::new();
            if !exclude_vendor {
                parser = parser.include_vendor_dirs();
            }
            Ok(Box::new(parser))
        }
        other => anyhow::bail!("Unknown parser \"{other}\""),
    }
}

fn init() -> Result<ExitStatus> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }
    fs::write(config_path, config::default_config_json()?)?;
    report::print_init_created();
    Ok(ExitStatus::Success)
}
