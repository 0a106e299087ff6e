// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Command line entry point

use std::{io, process::ExitCode};

use clap::Parser;
use terminfo_gen::{Destination, Options, Rustfmt, TerminfoLoader, compile};

/// Compile terminfo entries into capability registration source files
///
/// Each terminal name is looked up in the terminfo database and compiled
/// into a Rust source file registering its capability record. With no
/// terminal names, the terminal from $TERM is compiled.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Write generated source to this file ("-" for standard output)
    #[arg(short, long, default_value = "-")]
    out: String,

    /// Registry crate named in generated imports; when empty, the
    /// generated file registers within its own crate
    #[arg(short = 'P', long, default_value = "")]
    package: String,

    /// Suppress load failure messages
    #[arg(short, long)]
    quiet: bool,

    /// Terminal names to compile
    terms: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = Options {
        terms: cli.terms,
        destination: Destination::from(cli.out.as_str()),
        package: cli.package,
        quiet: cli.quiet,
    };

    match compile::run(&options, &TerminfoLoader, &Rustfmt, &mut io::stderr()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
