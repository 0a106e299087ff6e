// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loading capability records from the terminfo database
//!
//! Maps raw terminfo capabilities onto the [`Capabilities`] record. Most of
//! the mapping is a straight rename table; a few sequences the database
//! does not carry directly (combined fg+bg, SGR mouse mode, direct-color
//! sequences, modified arrow keys on xterm-style terminals) are derived the
//! way established terminal libraries derive them.

use std::{fs, io};

use crate::{locate, parse, parse::Terminfo, record::Capabilities};

/// Errors reported when loading a terminal's capability record
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Locate(#[from] locate::Error),
    #[error(transparent)]
    Parse(#[from] parse::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Source of capability records
///
/// The driver and its tests depend on this interface rather than on the
/// terminfo database directly.
pub trait Loader {
    /// Returns the record and the human-readable terminal description
    fn load(&self, name: &str) -> Result<(Capabilities, String), Error>;
}

/// Loader backed by the system terminfo database
pub struct TerminfoLoader;

impl Loader for TerminfoLoader {
    fn load(&self, name: &str) -> Result<(Capabilities, String), Error> {
        let path = locate::locate(name)?;
        let buffer = fs::read(path)?;
        let entry = parse::parse(&buffer)?;
        Ok(build(&entry))
    }
}

/// One-to-one renames from terminfo capability names to record fields
const STRING_CAPS: &[(&str, fn(&mut Capabilities) -> &mut String)] = &[
    ("bel", |caps| &mut caps.bell),
    ("clear", |caps| &mut caps.clear),
    ("smcup", |caps| &mut caps.enter_ca),
    ("rmcup", |caps| &mut caps.exit_ca),
    ("cnorm", |caps| &mut caps.show_cursor),
    ("civis", |caps| &mut caps.hide_cursor),
    ("sgr0", |caps| &mut caps.attr_off),
    ("smul", |caps| &mut caps.underline),
    ("bold", |caps| &mut caps.bold),
    ("dim", |caps| &mut caps.dim),
    ("blink", |caps| &mut caps.blink),
    ("rev", |caps| &mut caps.reverse),
    ("smkx", |caps| &mut caps.enter_keypad),
    ("rmkx", |caps| &mut caps.exit_keypad),
    ("pad", |caps| &mut caps.pad_char),
    ("acsc", |caps| &mut caps.alt_chars),
    ("smacs", |caps| &mut caps.enter_acs),
    ("rmacs", |caps| &mut caps.exit_acs),
    ("enacs", |caps| &mut caps.enable_acs),
    ("kmous", |caps| &mut caps.mouse),
    ("cup", |caps| &mut caps.set_cursor),
    ("cub1", |caps| &mut caps.cursor_back1),
    ("cuu1", |caps| &mut caps.cursor_up1),
    ("kcuu1", |caps| &mut caps.key_up),
    ("kcud1", |caps| &mut caps.key_down),
    ("kcuf1", |caps| &mut caps.key_right),
    ("kcub1", |caps| &mut caps.key_left),
    ("kich1", |caps| &mut caps.key_insert),
    ("kdch1", |caps| &mut caps.key_delete),
    ("kbs", |caps| &mut caps.key_backspace),
    ("khome", |caps| &mut caps.key_home),
    ("kend", |caps| &mut caps.key_end),
    ("kpp", |caps| &mut caps.key_page_up),
    ("knp", |caps| &mut caps.key_page_down),
    ("kf1", |caps| &mut caps.key_f1),
    ("kf2", |caps| &mut caps.key_f2),
    ("kf3", |caps| &mut caps.key_f3),
    ("kf4", |caps| &mut caps.key_f4),
    ("kf5", |caps| &mut caps.key_f5),
    ("kf6", |caps| &mut caps.key_f6),
    ("kf7", |caps| &mut caps.key_f7),
    ("kf8", |caps| &mut caps.key_f8),
    ("kf9", |caps| &mut caps.key_f9),
    ("kf10", |caps| &mut caps.key_f10),
    ("kf11", |caps| &mut caps.key_f11),
    ("kf12", |caps| &mut caps.key_f12),
    ("kf13", |caps| &mut caps.key_f13),
    ("kf14", |caps| &mut caps.key_f14),
    ("kf15", |caps| &mut caps.key_f15),
    ("kf16", |caps| &mut caps.key_f16),
    ("kf17", |caps| &mut caps.key_f17),
    ("kf18", |caps| &mut caps.key_f18),
    ("kf19", |caps| &mut caps.key_f19),
    ("kf20", |caps| &mut caps.key_f20),
    ("kf21", |caps| &mut caps.key_f21),
    ("kf22", |caps| &mut caps.key_f22),
    ("kf23", |caps| &mut caps.key_f23),
    ("kf24", |caps| &mut caps.key_f24),
    ("kf25", |caps| &mut caps.key_f25),
    ("kf26", |caps| &mut caps.key_f26),
    ("kf27", |caps| &mut caps.key_f27),
    ("kf28", |caps| &mut caps.key_f28),
    ("kf29", |caps| &mut caps.key_f29),
    ("kf30", |caps| &mut caps.key_f30),
    ("kf31", |caps| &mut caps.key_f31),
    ("kf32", |caps| &mut caps.key_f32),
    ("kf33", |caps| &mut caps.key_f33),
    ("kf34", |caps| &mut caps.key_f34),
    ("kf35", |caps| &mut caps.key_f35),
    ("kf36", |caps| &mut caps.key_f36),
    ("kf37", |caps| &mut caps.key_f37),
    ("kf38", |caps| &mut caps.key_f38),
    ("kf39", |caps| &mut caps.key_f39),
    ("kf40", |caps| &mut caps.key_f40),
    ("kf41", |caps| &mut caps.key_f41),
    ("kf42", |caps| &mut caps.key_f42),
    ("kf43", |caps| &mut caps.key_f43),
    ("kf44", |caps| &mut caps.key_f44),
    ("kf45", |caps| &mut caps.key_f45),
    ("kf46", |caps| &mut caps.key_f46),
    ("kf47", |caps| &mut caps.key_f47),
    ("kf48", |caps| &mut caps.key_f48),
    ("kf49", |caps| &mut caps.key_f49),
    ("kf50", |caps| &mut caps.key_f50),
    ("kf51", |caps| &mut caps.key_f51),
    ("kf52", |caps| &mut caps.key_f52),
    ("kf53", |caps| &mut caps.key_f53),
    ("kf54", |caps| &mut caps.key_f54),
    ("kf55", |caps| &mut caps.key_f55),
    ("kf56", |caps| &mut caps.key_f56),
    ("kf57", |caps| &mut caps.key_f57),
    ("kf58", |caps| &mut caps.key_f58),
    ("kf59", |caps| &mut caps.key_f59),
    ("kf60", |caps| &mut caps.key_f60),
    ("kf61", |caps| &mut caps.key_f61),
    ("kf62", |caps| &mut caps.key_f62),
    ("kf63", |caps| &mut caps.key_f63),
    ("kf64", |caps| &mut caps.key_f64),
    ("kcan", |caps| &mut caps.key_cancel),
    ("kprt", |caps| &mut caps.key_print),
    ("kext", |caps| &mut caps.key_exit),
    ("khlp", |caps| &mut caps.key_help),
    ("kclr", |caps| &mut caps.key_clear),
    ("kcbt", |caps| &mut caps.key_backtab),
    ("kLFT", |caps| &mut caps.key_shift_left),
    ("kRIT", |caps| &mut caps.key_shift_right),
    ("kHOM", |caps| &mut caps.key_shift_home),
    ("kEND", |caps| &mut caps.key_shift_end),
];

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Shifted arrows on xterm-style terminals; the trigger for synthesizing
/// the rest of the modified-key matrix
const XTERM_SHIFT_RIGHT: &str = "\u{1b}[1;2C";
const XTERM_SHIFT_HOME: &str = "\u{1b}[1;2H";

fn xterm_modified(code: u32, suffix: char) -> String {
    format!("\u{1b}[1;{code}{suffix}")
}

/// Fill in modified arrow and home/end sequences
///
/// The terminfo database only records the shifted variants. When those
/// match the xterm encoding, the remaining modifier combinations follow
/// the same pattern: shift 2, alt 3, alt+shift 4, ctrl 5, ctrl+shift 6,
/// meta 9, meta+shift 10.
fn synthesize_modified_keys(caps: &mut Capabilities) {
    if caps.key_shift_right == XTERM_SHIFT_RIGHT {
        caps.key_shift_up = xterm_modified(2, 'A');
        caps.key_shift_down = xterm_modified(2, 'B');
        caps.key_alt_up = xterm_modified(3, 'A');
        caps.key_alt_down = xterm_modified(3, 'B');
        caps.key_alt_right = xterm_modified(3, 'C');
        caps.key_alt_left = xterm_modified(3, 'D');
        caps.key_alt_shift_up = xterm_modified(4, 'A');
        caps.key_alt_shift_down = xterm_modified(4, 'B');
        caps.key_alt_shift_right = xterm_modified(4, 'C');
        caps.key_alt_shift_left = xterm_modified(4, 'D');
        caps.key_ctrl_up = xterm_modified(5, 'A');
        caps.key_ctrl_down = xterm_modified(5, 'B');
        caps.key_ctrl_right = xterm_modified(5, 'C');
        caps.key_ctrl_left = xterm_modified(5, 'D');
        caps.key_ctrl_shift_up = xterm_modified(6, 'A');
        caps.key_ctrl_shift_down = xterm_modified(6, 'B');
        caps.key_ctrl_shift_right = xterm_modified(6, 'C');
        caps.key_ctrl_shift_left = xterm_modified(6, 'D');
        caps.key_meta_up = xterm_modified(9, 'A');
        caps.key_meta_down = xterm_modified(9, 'B');
        caps.key_meta_right = xterm_modified(9, 'C');
        caps.key_meta_left = xterm_modified(9, 'D');
        caps.key_meta_shift_up = xterm_modified(10, 'A');
        caps.key_meta_shift_down = xterm_modified(10, 'B');
        caps.key_meta_shift_right = xterm_modified(10, 'C');
        caps.key_meta_shift_left = xterm_modified(10, 'D');
    }
    if caps.key_shift_home == XTERM_SHIFT_HOME {
        caps.key_alt_home = xterm_modified(3, 'H');
        caps.key_alt_end = xterm_modified(3, 'F');
        caps.key_alt_shift_home = xterm_modified(4, 'H');
        caps.key_alt_shift_end = xterm_modified(4, 'F');
        caps.key_ctrl_home = xterm_modified(5, 'H');
        caps.key_ctrl_end = xterm_modified(5, 'F');
        caps.key_ctrl_shift_home = xterm_modified(6, 'H');
        caps.key_ctrl_shift_end = xterm_modified(6, 'F');
        caps.key_meta_home = xterm_modified(9, 'H');
        caps.key_meta_end = xterm_modified(9, 'F');
        caps.key_meta_shift_home = xterm_modified(10, 'H');
        caps.key_meta_shift_end = xterm_modified(10, 'F');
    }
}

/// Enable/disable SGR mouse reporting, parameterized on enter (1) / exit (0)
const MOUSE_MODE: &str = "%?%p1%{1}%=%t%'h'%Pa%e%'l'%Pa%;\
                          \u{1b}[?1000%ga%c\u{1b}[?1002%ga%c\u{1b}[?1003%ga%c\u{1b}[?1006%ga%c";

const DIRECT_COLORS: i32 = 1 << 24;

/// Direct-color sequences for terminals that advertise RGB support
/// without carrying `setrgbf`/`setrgbb`
const SET_FG_RGB: &str = "\u{1b}[38;2;%p1%d;%p2%d;%p3%dm";
const SET_BG_RGB: &str = "\u{1b}[48;2;%p1%d;%p2%d;%p3%dm";
const SET_FG_BG_RGB: &str = "\u{1b}[38;2;%p1%d;%p2%d;%p3%d;48;2;%p4%d;%p5%d;%p6%dm";

fn renumber(sequence: &str, renames: &[(&str, &str)]) -> String {
    let mut sequence = sequence.to_string();
    for (from, to) in renames {
        sequence = sequence.replace(from, to);
    }
    sequence
}

/// Derive the sequences the database does not carry directly
fn synthesize(caps: &mut Capabilities, entry: &Terminfo<'_>) {
    if !caps.set_fg.is_empty() && !caps.set_bg.is_empty() {
        caps.set_fg_bg = format!(
            "{}{}",
            caps.set_fg,
            renumber(&caps.set_bg, &[("%p1", "%p2")])
        );
    }

    if !caps.mouse.is_empty() {
        caps.mouse_mode = MOUSE_MODE.to_string();
    }

    if let (Some(set_fg), Some(set_bg)) =
        (entry.strings.get("setrgbf"), entry.strings.get("setrgbb"))
    {
        caps.set_fg_rgb = lossy(set_fg);
        caps.set_bg_rgb = lossy(set_bg);
        caps.set_fg_bg_rgb = format!(
            "{}{}",
            caps.set_fg_rgb,
            renumber(
                &caps.set_bg_rgb,
                &[("%p1", "%p4"), ("%p2", "%p5"), ("%p3", "%p6")]
            )
        );
    } else if entry.booleans.contains("Tc") || entry.booleans.contains("RGB") {
        caps.set_fg_rgb = SET_FG_RGB.to_string();
        caps.set_bg_rgb = SET_BG_RGB.to_string();
        caps.set_fg_bg_rgb = SET_FG_BG_RGB.to_string();
    }
    if !caps.set_fg_rgb.is_empty() {
        caps.colors = caps.colors.max(DIRECT_COLORS);
    }

    synthesize_modified_keys(caps);
}

/// Build a capability record and description from a parsed terminfo entry
pub fn build(entry: &Terminfo<'_>) -> (Capabilities, String) {
    let mut caps = Capabilities {
        name: entry.name.to_string(),
        aliases: entry.aliases.iter().map(ToString::to_string).collect(),
        ..Capabilities::default()
    };

    caps.columns = entry.numbers.get("cols").copied().unwrap_or(0);
    caps.lines = entry.numbers.get("lines").copied().unwrap_or(0);
    caps.colors = entry.numbers.get("colors").copied().unwrap_or(0);

    for (cap, field) in STRING_CAPS {
        if let Some(value) = entry.strings.get(cap) {
            *field(&mut caps) = lossy(value);
        }
    }

    // Prefer the ANSI color-set sequences, fall back to the legacy ones.
    for (caps_list, field) in [
        (["setaf", "setf"], &mut caps.set_fg),
        (["setab", "setb"], &mut caps.set_bg),
    ] {
        for cap in caps_list {
            if let Some(value) = entry.strings.get(cap) {
                *field = lossy(value);
                break;
            }
        }
    }

    synthesize(&mut caps, entry);

    (caps, entry.description.to_string())
}

#[cfg(test)]
mod test {
    use collection_literals::collection;

    use super::*;

    fn xterm_entry() -> Terminfo<'static> {
        Terminfo {
            name: "xterm",
            aliases: vec!["xterm-debian"],
            description: "X11 terminal emulator",
            numbers: collection! {
                "cols" => 80,
                "lines" => 24,
                "colors" => 8,
            },
            strings: collection! {
                "bel" => b"\x07".as_slice(),
                "clear" => b"\x1b[H\x1b[2J",
                "setaf" => b"\x1b[3%p1%dm",
                "setab" => b"\x1b[4%p1%dm",
                "kmous" => b"\x1b[M",
                "kf1" => b"\x1bOP",
                "kLFT" => b"\x1b[1;2D",
                "kRIT" => b"\x1b[1;2C",
                "kHOM" => b"\x1b[1;2H",
                "kEND" => b"\x1b[1;2F",
            },
            ..Terminfo::default()
        }
    }

    #[test]
    fn identity_and_geometry() {
        let (caps, desc) = build(&xterm_entry());
        assert_eq!(caps.name, "xterm");
        assert_eq!(caps.aliases, ["xterm-debian"]);
        assert_eq!(desc, "X11 terminal emulator");
        assert_eq!(caps.columns, 80);
        assert_eq!(caps.lines, 24);
        assert_eq!(caps.colors, 8);
    }

    #[test]
    fn direct_renames() {
        let (caps, _) = build(&xterm_entry());
        assert_eq!(caps.bell, "\u{7}");
        assert_eq!(caps.clear, "\u{1b}[H\u{1b}[2J");
        assert_eq!(caps.key_f1, "\u{1b}OP");
        assert_eq!(caps.mouse, "\u{1b}[M");
    }

    #[test]
    fn combined_fg_bg() {
        let (caps, _) = build(&xterm_entry());
        assert_eq!(caps.set_fg, "\u{1b}[3%p1%dm");
        assert_eq!(caps.set_bg, "\u{1b}[4%p1%dm");
        assert_eq!(caps.set_fg_bg, "\u{1b}[3%p1%dm\u{1b}[4%p2%dm");
    }

    #[test]
    fn legacy_color_fallback() {
        let entry = Terminfo {
            name: "oldterm",
            strings: collection! {
                "setf" => b"\x1bF%p1%d".as_slice(),
                "setb" => b"\x1bB%p1%d",
            },
            ..Terminfo::default()
        };
        let (caps, _) = build(&entry);
        assert_eq!(caps.set_fg, "\u{1b}F%p1%d");
        assert_eq!(caps.set_bg, "\u{1b}B%p1%d");
    }

    #[test]
    fn mouse_mode_follows_kmous() {
        let (caps, _) = build(&xterm_entry());
        assert!(caps.mouse_mode.contains("\u{1b}[?1006"));

        let entry = Terminfo {
            name: "dumb",
            ..Terminfo::default()
        };
        let (caps, _) = build(&entry);
        assert!(caps.mouse.is_empty());
        assert!(caps.mouse_mode.is_empty());
    }

    #[test]
    fn truecolor_flag() {
        let entry = Terminfo {
            name: "xterm-direct",
            booleans: collection! { "RGB" },
            numbers: collection! { "colors" => 256 },
            ..Terminfo::default()
        };
        let (caps, _) = build(&entry);
        assert_eq!(caps.set_fg_rgb, "\u{1b}[38;2;%p1%d;%p2%d;%p3%dm");
        assert_eq!(caps.set_bg_rgb, "\u{1b}[48;2;%p1%d;%p2%d;%p3%dm");
        assert_eq!(
            caps.set_fg_bg_rgb,
            "\u{1b}[38;2;%p1%d;%p2%d;%p3%d;48;2;%p4%d;%p5%d;%p6%dm"
        );
        assert_eq!(caps.colors, 1 << 24);
    }

    #[test]
    fn extended_rgb_caps_win_over_flag() {
        let entry = Terminfo {
            name: "fancy",
            booleans: collection! { "Tc" },
            strings: collection! {
                "setrgbf" => b"\x1b[38:2:%p1%d:%p2%d:%p3%dm".as_slice(),
                "setrgbb" => b"\x1b[48:2:%p1%d:%p2%d:%p3%dm",
            },
            ..Terminfo::default()
        };
        let (caps, _) = build(&entry);
        assert_eq!(caps.set_fg_rgb, "\u{1b}[38:2:%p1%d:%p2%d:%p3%dm");
        assert_eq!(
            caps.set_fg_bg_rgb,
            "\u{1b}[38:2:%p1%d:%p2%d:%p3%dm\u{1b}[48:2:%p4%d:%p5%d:%p6%dm"
        );
    }

    #[test]
    fn modified_keys_synthesized_for_xterm_encoding() {
        let (caps, _) = build(&xterm_entry());
        assert_eq!(caps.key_shift_up, "\u{1b}[1;2A");
        assert_eq!(caps.key_alt_left, "\u{1b}[1;3D");
        assert_eq!(caps.key_ctrl_right, "\u{1b}[1;5C");
        assert_eq!(caps.key_meta_shift_down, "\u{1b}[1;10B");
        assert_eq!(caps.key_ctrl_home, "\u{1b}[1;5H");
        assert_eq!(caps.key_meta_shift_end, "\u{1b}[1;10F");
    }

    #[test]
    fn modified_keys_left_alone_for_other_encodings() {
        let entry = Terminfo {
            name: "rxvt",
            strings: collection! {
                "kRIT" => b"\x1b[c".as_slice(),
                "kLFT" => b"\x1b[d",
            },
            ..Terminfo::default()
        };
        let (caps, _) = build(&entry);
        assert_eq!(caps.key_shift_right, "\u{1b}[c");
        assert!(caps.key_ctrl_right.is_empty());
        assert!(caps.key_alt_up.is_empty());
    }
}
