use std::fs;
use std::path::Path;

use clap::CommandFactory;

// cli.rs is self-contained (clap + clap_complete only), so the build
// script can include it directly for man page generation.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    // Re-run if the CLI definitions change.
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    // Walk the command tree iteratively, prefixing subcommand pages with
    // their parent's name (pansync-vr.1 and so on).
    let mut pending = vec![cli::Cli::command()];
    while let Some(cmd) = pending.pop() {
        let name = cmd.get_name().to_owned();
        for sub in cmd.get_subcommands() {
            pending.push(sub.clone().name(format!("{name}-{}", sub.get_name())));
        }

        let mut page = Vec::new();
        clap_mangen::Man::new(cmd)
            .render(&mut page)
            .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
        fs::write(man_dir.join(format!("{name}.1")), page)
            .unwrap_or_else(|e| panic!("failed to write `{name}.1`: {e}"));
    }
}
