// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Emitting registration entries
//!
//! A registration entry is a generated Rust source file that adds one
//! capability record to the runtime registry. The file starts with a
//! generated-file marker and an import of the registry crate, followed by a
//! single `register` function that constructs the record from its
//! non-default fields only.

use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    process::Command,
};

use crate::{encode::encode, record::Capabilities};

/// Where a registration entry is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output, never closed by the emitter
    Stdout,
    /// A file, created or truncated, closed after the write
    File(PathBuf),
}

impl From<&str> for Destination {
    fn from(spec: &str) -> Self {
        match spec {
            "" | "-" => Self::Stdout,
            path => Self::File(PathBuf::from(path)),
        }
    }
}

/// Failure to write a registration entry
///
/// This is the only fatal error in the pipeline: a destination that cannot
/// be written aborts the whole run.
#[derive(thiserror::Error, Debug)]
#[error("failed writing {destination}: {source}")]
pub struct Error {
    destination: String,
    #[source]
    source: io::Error,
}

/// Source formatting pass over an emitted file
///
/// Strictly best-effort: implementations report nothing and the emitter
/// ignores every outcome, including the tool being absent.
pub trait Formatter {
    fn format(&self, path: &Path);
}

/// Runs `rustfmt` over the emitted file
pub struct Rustfmt;

impl Formatter for Rustfmt {
    fn format(&self, path: &Path) {
        let _ = Command::new("rustfmt")
            .args(["--edition", "2024"])
            .arg(path)
            .status();
    }
}

/// A formatter that does nothing
pub struct NoFormatter;

impl Formatter for NoFormatter {
    fn format(&self, _path: &Path) {}
}

fn header(package: &str) -> String {
    let mut text = String::from("// Generated automatically.  DO NOT HAND-EDIT.\n\n");
    if package.is_empty() {
        // Self-registration: the file lives inside the registry crate.
        text.push_str("use crate::{Capabilities, Database};\n");
    } else {
        let _ = writeln!(text, "use {package}::{{Capabilities, Database}};");
    }
    text
}

fn registration(caps: &Capabilities, desc: &str) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "\n/// {desc}");
    text.push_str("pub fn register(db: &mut Database) {\n");
    text.push_str("    db.add(Capabilities {\n");
    for field in encode(caps) {
        let _ = writeln!(text, "        {}: {},", field.name, field.literal);
    }
    text.push_str("        ..Capabilities::default()\n");
    text.push_str("    });\n");
    text.push_str("}\n");
    text
}

/// Render a complete registration entry as source text
pub fn render(caps: &Capabilities, desc: &str, package: &str) -> String {
    let mut text = header(package);
    text.push_str(&registration(caps, desc));
    text
}

/// Write one registration entry to the destination
///
/// For file destinations the parent directory is created best-effort and
/// the formatter runs after a successful write; both steps are allowed to
/// fail silently. Only the write itself can fail the emitter.
pub fn emit(
    destination: &Destination,
    caps: &Capabilities,
    desc: &str,
    package: &str,
    formatter: &impl Formatter,
) -> Result<(), Error> {
    let text = render(caps, desc, package);
    match destination {
        Destination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| Error {
                    destination: "<stdout>".to_string(),
                    source,
                })?;
        }
        Destination::File(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                // If this fails, the file write below fails and reports it.
                let _ = fs::create_dir_all(parent);
            }
            fs::write(path, &text).map_err(|source| Error {
                destination: path.display().to_string(),
                source,
            })?;
            formatter.format(path);
        }
    }
    Ok(())
}
