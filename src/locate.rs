// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Search for the terminfo database file for a terminal

use std::{
    env,
    ffi::OsStr,
    path::{Path, PathBuf},
};

const DEFAULT_DIRS: &[&str] = &[
    "/etc/terminfo",
    "/lib/terminfo",
    "/usr/share/terminfo",
    "/usr/lib/terminfo",
    "/boot/system/data/terminfo", // haiku
];

/// Errors reported when looking for a terminfo database file
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The name of the terminal is not valid
    #[error("Invalid terminal name")]
    InvalidTerminalName,
    /// Terminfo file for the terminal could not be found
    #[error("File not found")]
    FileNotFound,
}

/// Probe one database directory for the terminal's entry file
///
/// Checks the standard layout first (leaf directory named after the first
/// character of the terminal name), then the hexadecimal layout used on
/// case-insensitive filesystems (MacOS, Windows).
fn entry_in(dir: &Path, term_name: &OsStr, first_byte: u8) -> Option<PathBuf> {
    let standard_leaf = (first_byte as char).to_string();
    let filename = dir.join(standard_leaf).join(term_name);
    if filename.exists() {
        return Some(filename);
    }

    let hex_leaf = format!("{first_byte:02x}");
    let filename = dir.join(hex_leaf).join(term_name);
    filename.exists().then_some(filename)
}

/// Returns all directories that are searched for terminfo files
///
/// The order is `TERMINFO`, `~/.terminfo`, then the colon-separated
/// `TERMINFO_DIRS` entries, where an empty entry stands for the default
/// system locations. The defaults are appended at the end if no empty
/// entry consumed them. Directories are not checked for existence.
pub fn search_directories() -> Vec<PathBuf> {
    let mut search_dirs = vec![];

    // Lazily evaluated iterator, consumed at most once.
    let mut default_dirs = DEFAULT_DIRS.iter().map(PathBuf::from);

    if let Ok(dir) = env::var("TERMINFO") {
        search_dirs.push(PathBuf::from(&dir));
    }

    if let Some(home_dir) = env::home_dir() {
        search_dirs.push(home_dir.join(".terminfo"));
    }

    if let Ok(dirs) = env::var("TERMINFO_DIRS") {
        for dir in dirs.split(':') {
            if dir.is_empty() {
                search_dirs.extend(&mut default_dirs);
            } else {
                search_dirs.push(PathBuf::from(dir));
            }
        }
    }

    // Nothing is added here if an empty TERMINFO_DIRS entry was seen.
    search_dirs.extend(&mut default_dirs);

    search_dirs
}

/// Find the terminfo database file for the terminal name
///
/// Returns the path of the first matching entry file in search order.
pub fn locate(term_name: impl AsRef<OsStr>) -> Result<PathBuf, Error> {
    let term_name = term_name.as_ref();
    let Some(first_byte) = term_name.as_encoded_bytes().first() else {
        return Err(Error::InvalidTerminalName);
    };

    search_directories()
        .iter()
        .find_map(|dir| entry_in(dir, term_name, *first_byte))
        .ok_or(Error::FileNotFound)
}
