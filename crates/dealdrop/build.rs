// Generates man pages for `dealdrop` and every visible subcommand into
// `$OUT_DIR/man`.

use std::fs;
use std::path::Path;

use clap::CommandFactory;

#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR") else {
        panic!("OUT_DIR is not set; build.rs must run under cargo");
    };
    let man_dir = Path::new(&out_dir).join("man");
    if let Err(e) = fs::create_dir_all(&man_dir) {
        panic!("cannot create {}: {e}", man_dir.display());
    }

    write_pages(&cli::Cli::command(), &man_dir);
}

fn write_pages(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();
    let mut page = Vec::new();
    if let Err(e) = clap_mangen::Man::new(cmd.clone()).render(&mut page) {
        panic!("cannot render man page for `{name}`: {e}");
    }
    let path = dir.join(format!("{name}.1"));
    if let Err(e) = fs::write(&path, page) {
        panic!("cannot write {}: {e}", path.display());
    }

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let prefixed = sub.clone().name(format!("{name}-{}", sub.get_name()));
        write_pages(&prefixed, dir);
    }
}
