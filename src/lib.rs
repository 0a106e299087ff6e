// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compiler turning terminfo database entries into Rust source files that
//! register capability records with a runtime capability registry
//!
//! A generated file imports the registry crate (`Capabilities` and
//! `Database`) and defines a single `register` function that adds one
//! record, listing only the capabilities that differ from their defaults.
//! The emission order of fields is fixed, so regenerated files diff
//! cleanly.

pub mod compile;
pub mod emit;
pub mod encode;
pub mod load;
pub mod locate;
pub mod parse;
pub mod record;

pub use compile::{Options, Summary};
pub use emit::{Destination, Formatter, Rustfmt};
pub use load::{Loader, TerminfoLoader};
pub use parse::Terminfo;
pub use record::{Capabilities, FieldValue};
