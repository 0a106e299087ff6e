// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compilation driver
//!
//! Resolves the requested terminal names, loads a capability record per
//! name, and emits one registration entry per accepted record. Load
//! failures are independent: a terminal that cannot be loaded is reported
//! and skipped, never aborting the batch. Only a destination write failure
//! is fatal.
//!
//! A record is accepted only when its canonical name equals the name that
//! was requested. Requesting an alias therefore loads a record but emits
//! nothing for it; whether that is deduplication or an accident of history
//! is an open question, and the behavior is kept as is.

use std::{env, io::Write};

use crate::{
    emit::{Destination, Formatter, emit},
    load::Loader,
    record::Capabilities,
};

/// What to compile and where to put it
#[derive(Debug, Clone)]
pub struct Options {
    /// Terminal names; empty means take one from `$TERM`
    pub terms: Vec<String>,
    /// Where registration entries are written
    pub destination: Destination,
    /// Registry crate named in generated imports; empty selects
    /// self-registration mode
    pub package: String,
    /// Suppress per-terminal load failure diagnostics
    pub quiet: bool,
}

/// Outcome counts of one compilation run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records loaded, whether or not they were accepted for emission
    pub loaded: usize,
    /// Terminals whose record could not be loaded
    pub failed: usize,
    /// Registration entries written
    pub emitted: usize,
}

/// Resolve the terminal names to compile
///
/// An empty request falls back to `$TERM`; an empty or unset `$TERM`
/// resolves to an empty batch, which is not an error.
fn resolve_terms(terms: &[String]) -> Vec<String> {
    if !terms.is_empty() {
        return terms.to_vec();
    }
    match env::var("TERM") {
        Ok(term) if !term.is_empty() => vec![term],
        _ => vec![],
    }
}

/// Compile registration entries for the requested terminals
///
/// Load failure diagnostics go to `diag`, one line per failing terminal,
/// unless quiet is set. Returns the summary, or the first write error.
pub fn run(
    options: &Options,
    loader: &impl Loader,
    formatter: &impl Formatter,
    diag: &mut impl Write,
) -> Result<Summary, crate::emit::Error> {
    let mut summary = Summary::default();
    let mut records: Vec<(String, Capabilities, String)> = vec![];

    for term in resolve_terms(&options.terms) {
        match loader.load(&term) {
            Ok((caps, desc)) => records.push((term, caps, desc)),
            Err(error) => {
                summary.failed += 1;
                if !options.quiet {
                    // Best effort, like the diagnostics stream itself.
                    let _ = writeln!(diag, "Failed loading {term}: {error}");
                }
            }
        }
    }
    summary.loaded = records.len();

    for (term, caps, desc) in &records {
        if caps.name == *term {
            emit(&options.destination, caps, desc, &options.package, formatter)?;
            summary.emitted += 1;
        }
    }

    Ok(summary)
}
