//! Man pages for looprec and each subcommand, rendered from `src/cli.rs`
//!
//! Skipped on debug builds unless LOOPREC_GEN_MANPAGES is set.

use clap::CommandFactory;
use std::io;
use std::path::{Path, PathBuf};

include!("src/cli.rs");

fn wanted() -> bool {
    std::env::var_os("LOOPREC_GEN_MANPAGES").is_some()
        || std::env::var("PROFILE").as_deref() == Ok("release")
}

fn render(cmd: clap::Command, path: &Path) -> io::Result<()> {
    let mut out = std::fs::File::create(path)?;
    clap_mangen::Man::new(cmd).render(&mut out)
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=LOOPREC_GEN_MANPAGES");
    if !wanted() {
        return Ok(());
    }

    let out_dir = std::env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target"));
    let man_dir = out_dir.join("man");
    std::fs::create_dir_all(&man_dir)?;

    let root = Cli::command();
    let pages = root
        .get_subcommands()
        .filter(|sub| sub.get_name() != "help")
        .map(|sub| (format!("looprec-{}.1", sub.get_name()), sub.clone()))
        .collect::<Vec<_>>();

    render(root, &man_dir.join("looprec.1"))?;
    for (file, sub) in pages {
        render(sub, &man_dir.join(file))?;
    }

    println!("cargo:warning=looprec man pages: {}", man_dir.display());
    Ok(())
}
