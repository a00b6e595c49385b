//! Build script for tally
//!
//! Dev builds get `VERGEN_GIT_SHA` so `tally --version` names the commit the
//! binary was built from. Builds with the `release` feature report the bare
//! package version and skip git entirely.

#[cfg(not(feature = "release"))]
fn emit_git_sha() -> Result<(), Box<dyn std::error::Error>> {
    use vergen_gitcl::{Emitter, GitclBuilder};

    let git = GitclBuilder::default().sha(true).build()?;
    Emitter::default().add_instructions(&git)?.emit()?;
    Ok(())
}

fn main() {
    #[cfg(not(feature = "release"))]
    if let Err(e) = emit_git_sha() {
        // Source tarballs have no .git; the version still needs a value.
        println!("cargo:warning=git SHA unavailable for version string: {e}");
        println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
    }
}
