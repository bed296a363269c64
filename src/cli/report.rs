//! Colored terminal output for command results.
//!
//! Summaries go to stderr so that `extract --output -` keeps stdout clean
//! for the template itself.

use colored::Colorize;

use crate::catalog::Catalog;
use crate::config::CONFIG_FILE_NAME;
use crate::parsers::all_parsers;

pub fn print_extract_summary(catalog: &Catalog, destination: &str, verbose: bool) {
    if catalog.is_empty() {
        eprintln!(
            "{} no translatable strings found",
            "warning:".bold().yellow()
        );
    }
    let target = if destination == "-" {
        "stdout"
    } else {
        destination
    };
    eprintln!(
        "{} {} entries, {} references -> {}",
        "extracted:".bold().green(),
        catalog.len(),
        catalog.reference_count(),
        target
    );
    if verbose {
        for entry in catalog.entries() {
            let context = entry
                .context
                .as_deref()
                .map(|c| format!("[{c}] "))
                .unwrap_or_default();
            eprintln!(
                "  {}{} ({} references)",
                context.dimmed(),
                entry.singular,
                entry.references.len()
            );
        }
    }
}

pub fn print_parser_progress(name: &str, catalog: &Catalog) {
    eprintln!(
        "{} {} done, {} entries so far",
        "parser:".bold().blue(),
        name,
        catalog.len()
    );
}

pub fn print_parsers() {
    for parser in all_parsers() {
        println!(
            "{:<18} directory: {:<5} live instance: {}",
            parser.name().bold(),
            parser.supports_directory(),
            parser.supports_live_instance()
        );
    }
}

pub fn print_config_used() {
    eprintln!("{} using {}", "config:".bold().blue(), CONFIG_FILE_NAME);
}

pub fn print_init_created() {
    println!("{} created {}", "ok:".bold().green(), CONFIG_FILE_NAME);
}
