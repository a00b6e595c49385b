//! Completions command handler

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};
use std::io::{self, Write};

/// Write the completion script for `shell` to stdout.
#[cfg(not(tarpaulin_include))]
pub fn handle<C: CommandFactory>(shell: CompletionShell) -> Result<()> {
    write_completions::<C>(shell, &mut io::stdout())
}

pub(crate) fn write_completions<C: CommandFactory>(
    shell: CompletionShell,
    out: &mut dyn Write,
) -> Result<()> {
    let mut cmd = C::command();
    generate(shell, &mut cmd, "tally", out);
    Ok(())
}
