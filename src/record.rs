// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Capability record and its fixed field table

/// Value of a single capability field, borrowed from the record
///
/// Each variant carries the default that marks a field as "not interesting":
/// `0` for numbers, the empty string for sequences, the empty slice for name
/// lists. Fields at their default are never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Int(i32),
    Str(&'a str),
    List(&'a [String]),
}

impl FieldValue<'_> {
    /// True if the value equals the default for its type
    pub fn is_default(&self) -> bool {
        match self {
            Self::Int(number) => *number == 0,
            Self::Str(sequence) => sequence.is_empty(),
            Self::List(names) => names.is_empty(),
        }
    }
}

macro_rules! field_type {
    (int) => { i32 };
    (str) => { String };
    (list) => { Vec<String> };
}

macro_rules! field_value {
    (int, $caps:expr, $field:ident) => {
        FieldValue::Int($caps.$field)
    };
    (str, $caps:expr, $field:ident) => {
        FieldValue::Str(&$caps.$field)
    };
    (list, $caps:expr, $field:ident) => {
        FieldValue::List(&$caps.$field)
    };
}

/// Declares the capability record together with its field table
///
/// The declaration order below is the emission order. Keeping the struct and
/// the iteration table in one place guarantees they can never disagree.
macro_rules! capability_record {
    ($($kind:ident $field:ident),* $(,)?) => {
        /// Structured description of one terminal
        ///
        /// Field defaults (`0`, `""`, empty list) mean "unspecified" or
        /// "unsupported" and are omitted from generated registration entries.
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct Capabilities {
            $(pub $field: field_type!($kind),)*
        }

        impl Capabilities {
            /// Field names in emission order
            pub const FIELD_NAMES: &'static [&'static str] = &[$(stringify!($field)),*];

            /// Visits every field in emission order, populated or not
            pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldValue<'_>)> {
                [$((stringify!($field), field_value!($kind, self, $field))),*].into_iter()
            }
        }
    };
}

capability_record! {
    // Identity
    str name,
    list aliases,
    // Geometry
    int columns,
    int lines,
    int colors,
    // Control sequences
    str bell,
    str clear,
    str enter_ca,
    str exit_ca,
    str show_cursor,
    str hide_cursor,
    str attr_off,
    str underline,
    str bold,
    str dim,
    str blink,
    str reverse,
    str enter_keypad,
    str exit_keypad,
    str set_fg,
    str set_bg,
    str set_fg_bg,
    str pad_char,
    str alt_chars,
    str enter_acs,
    str exit_acs,
    str enable_acs,
    str set_fg_rgb,
    str set_bg_rgb,
    str set_fg_bg_rgb,
    str mouse,
    str mouse_mode,
    str set_cursor,
    str cursor_back1,
    str cursor_up1,
    // Key sequences
    str key_up,
    str key_down,
    str key_right,
    str key_left,
    str key_insert,
    str key_delete,
    str key_backspace,
    str key_home,
    str key_end,
    str key_page_up,
    str key_page_down,
    str key_f1,
    str key_f2,
    str key_f3,
    str key_f4,
    str key_f5,
    str key_f6,
    str key_f7,
    str key_f8,
    str key_f9,
    str key_f10,
    str key_f11,
    str key_f12,
    str key_f13,
    str key_f14,
    str key_f15,
    str key_f16,
    str key_f17,
    str key_f18,
    str key_f19,
    str key_f20,
    str key_f21,
    str key_f22,
    str key_f23,
    str key_f24,
    str key_f25,
    str key_f26,
    str key_f27,
    str key_f28,
    str key_f29,
    str key_f30,
    str key_f31,
    str key_f32,
    str key_f33,
    str key_f34,
    str key_f35,
    str key_f36,
    str key_f37,
    str key_f38,
    str key_f39,
    str key_f40,
    str key_f41,
    str key_f42,
    str key_f43,
    str key_f44,
    str key_f45,
    str key_f46,
    str key_f47,
    str key_f48,
    str key_f49,
    str key_f50,
    str key_f51,
    str key_f52,
    str key_f53,
    str key_f54,
    str key_f55,
    str key_f56,
    str key_f57,
    str key_f58,
    str key_f59,
    str key_f60,
    str key_f61,
    str key_f62,
    str key_f63,
    str key_f64,
    str key_cancel,
    str key_print,
    str key_exit,
    str key_help,
    str key_clear,
    str key_backtab,
    str key_shift_left,
    str key_shift_right,
    str key_shift_up,
    str key_shift_down,
    str key_ctrl_left,
    str key_ctrl_right,
    str key_ctrl_up,
    str key_ctrl_down,
    str key_meta_left,
    str key_meta_right,
    str key_meta_up,
    str key_meta_down,
    str key_alt_left,
    str key_alt_right,
    str key_alt_up,
    str key_alt_down,
    str key_alt_shift_left,
    str key_alt_shift_right,
    str key_alt_shift_up,
    str key_alt_shift_down,
    str key_meta_shift_left,
    str key_meta_shift_right,
    str key_meta_shift_up,
    str key_meta_shift_down,
    str key_ctrl_shift_left,
    str key_ctrl_shift_right,
    str key_ctrl_shift_up,
    str key_ctrl_shift_down,
    str key_shift_home,
    str key_shift_end,
    str key_ctrl_home,
    str key_ctrl_end,
    str key_meta_home,
    str key_meta_end,
    str key_alt_home,
    str key_alt_end,
    str key_ctrl_shift_home,
    str key_ctrl_shift_end,
    str key_meta_shift_home,
    str key_meta_shift_end,
    str key_alt_shift_home,
    str key_alt_shift_end,
}
