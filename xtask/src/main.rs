//! xtask - Build tasks for tally
//!
//! Run with: cargo xtask <command>
//!
//! Commands:
//! - gen-docs: Generate man pages and COMMANDS.md from the CLI definitions

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser, Subcommand};

use tally::cli::Cli;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build tasks for tally")]
struct Xtask {
    #[command(subcommand)]
    command: XtaskCommand,
}

#[derive(Subcommand)]
enum XtaskCommand {
    /// Generate documentation from CLI definitions
    #[command(name = "gen-docs")]
    GenDocs {
        /// Output directory
        #[arg(long, short, default_value = "docs")]
        output: PathBuf,

        /// Generate man pages only
        #[arg(long)]
        man: bool,

        /// Generate COMMANDS.md only
        #[arg(long)]
        markdown: bool,
    },
}

fn main() -> Result<()> {
    let args = Xtask::parse();

    match args.command {
        XtaskCommand::GenDocs {
            output,
            man,
            markdown,
        } => {
            let gen_all = !man && !markdown;
            if gen_all || man {
                generate_man_pages(&output)?;
            }
            if gen_all || markdown {
                generate_markdown(&output)?;
            }
        }
    }

    Ok(())
}

fn visible_subcommands(cmd: &Command) -> impl Iterator<Item = &Command> {
    cmd.get_subcommands().filter(|c| !c.is_hide_set())
}

fn render_man(cmd: Command, path: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Generated: {}", path.display());
    Ok(())
}

/// One man page for tally and one per (nested) subcommand.
fn generate_man_pages(output: &Path) -> Result<()> {
    let man_dir = output.join("man");
    fs::create_dir_all(&man_dir).context("Failed to create man directory")?;

    let cmd = Cli::command();
    render_man(cmd.clone(), &man_dir.join("tally.1"))?;

    for sub in visible_subcommands(&cmd) {
        let name = sub.get_name();
        render_man(sub.clone(), &man_dir.join(format!("tally-{}.1", name)))?;

        for nested in visible_subcommands(sub) {
            let file = format!("tally-{}-{}.1", name, nested.get_name());
            render_man(nested.clone(), &man_dir.join(file))?;
        }
    }

    println!("Man pages generated in {}", man_dir.display());
    Ok(())
}

/// Argument and option bullet lists for one command.
fn push_arguments(markdown: &mut String, cmd: &Command) {
    let args: Vec<_> = cmd
        .get_arguments()
        .filter(|a| {
            let id = a.get_id().as_str();
            id != "help" && id != "version"
        })
        .collect();

    let positional: Vec<_> = args.iter().filter(|a| a.is_positional()).collect();
    if !positional.is_empty() {
        markdown.push_str("### Arguments\n\n");
        for arg in positional {
            markdown.push_str(&format!("- `<{}>`", arg.get_id().as_str().to_uppercase()));
            if let Some(help) = arg.get_help() {
                markdown.push_str(&format!(": {}", help));
            }
            markdown.push('\n');
        }
        markdown.push('\n');
    }

    let options: Vec<_> = args.iter().filter(|a| !a.is_positional()).collect();
    if !options.is_empty() {
        markdown.push_str("### Options\n\n");
        for arg in options {
            let flag = match (arg.get_short(), arg.get_long()) {
                (Some(s), Some(l)) => format!("-{}, --{}", s, l),
                (None, Some(l)) => format!("--{}", l),
                (Some(s), None) => format!("-{}", s),
                (None, None) => continue,
            };
            markdown.push_str(&format!("- `{}`", flag));
            if let Some(help) = arg.get_help() {
                markdown.push_str(&format!(": {}", help));
            }
            markdown.push('\n');
        }
        markdown.push('\n');
    }
}

/// Generate COMMANDS.md
fn generate_markdown(output: &Path) -> Result<()> {
    fs::create_dir_all(output).context("Failed to create output directory")?;

    let cmd = Cli::command();
    let mut markdown = String::new();

    markdown.push_str("# tally Command Reference\n\n");
    markdown.push_str("This document is auto-generated from the CLI definitions.\n\n");
    markdown.push_str("## Table of Contents\n\n");
    for sub in visible_subcommands(&cmd) {
        let name = sub.get_name();
        markdown.push_str(&format!("- [{}](#tally-{})\n", name, name));
    }
    markdown.push_str("\n---\n\n");

    markdown.push_str("## tally\n\n");
    if let Some(about) = cmd.get_about() {
        markdown.push_str(&format!("{}\n\n", about));
    }
    if let Some(long_about) = cmd.get_long_about() {
        markdown.push_str(&format!("```\n{}\n```\n\n", long_about));
    }
    push_arguments(&mut markdown, &cmd);

    for sub in visible_subcommands(&cmd) {
        let name = sub.get_name();
        markdown.push_str(&format!("## tally {}\n\n", name));
        if let Some(about) = sub.get_about() {
            markdown.push_str(&format!("{}\n\n", about));
        }
        push_arguments(&mut markdown, sub);

        if let Some(long_about) = sub.get_long_about() {
            markdown.push_str(&format!("### Description\n\n```\n{}\n```\n\n", long_about));
        }

        for nested in visible_subcommands(sub) {
            markdown.push_str(&format!("#### tally {} {}\n\n", name, nested.get_name()));
            if let Some(about) = nested.get_about() {
                markdown.push_str(&format!("{}\n\n", about));
            }
            push_arguments(&mut markdown, nested);
        }

        markdown.push_str("---\n\n");
    }

    markdown.push_str("\n*Generated by `cargo xtask gen-docs`*\n");

    let output_path = output.join("COMMANDS.md");
    fs::write(&output_path, markdown)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    println!("Generated: {}", output_path.display());

    Ok(())
}
