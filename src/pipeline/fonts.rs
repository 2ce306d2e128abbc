//! Standard PDF fonts: names, encoding and the metrics layout needs.
//!
//! The document only uses two of the base-14 fonts, so nothing is embedded.
//! Text is encoded as WinAnsi (the encoding declared on both font
//! dictionaries); characters outside it are replaced by `?`.

use encoding_rs::WINDOWS_1252;

/// Fonts available to the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    pub const ALL: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];

    /// PostScript name used as `/BaseFont`.
    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name inside each page's `/Font` dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

/// Advance width of `text` in points at `size`.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let table = font.widths();
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| match b {
            32..=126 => table[(b - 32) as usize] as u32,
            _ => DEFAULT_WIDTH,
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Encode `text` as WinAnsi bytes for a `Tj` string operand.
///
/// Line breaks and tabs become spaces; anything cp1252 cannot represent,
/// and other control characters, becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut buf = [0u8; 4];
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => out.push(b' '),
            c if c.is_control() => out.push(b'?'),
            c => {
                let (bytes, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
                if unmappable {
                    out.push(b'?');
                } else {
                    out.extend_from_slice(&bytes);
                }
            }
        }
    }
    out
}

const DEFAULT_WIDTH: u32 = 556;

// Widths for codes 32..=126, from the Adobe core font AFMs.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_title_width() {
        // I n v o i c e = 278+611+556+611+278+556+556
        let w = text_width("Invoice", Font::HelveticaBold, 24.0);
        assert!((w - 82.704).abs() < 1e-3, "got {w}");
    }

    #[test]
    fn regular_is_narrower_than_bold() {
        let regular = text_width("Quote", Font::Helvetica, 12.0);
        let bold = text_width("Quote", Font::HelveticaBold, 12.0);
        assert!(regular < bold);
    }

    #[test]
    fn empty_text_has_no_width() {
        assert_eq!(text_width("", Font::Helvetica, 10.0), 0.0);
    }

    #[test]
    fn latin1_passes_through() {
        assert_eq!(encode_win_ansi("Café"), b"Caf\xe9".to_vec());
    }

    #[test]
    fn windows_specials_and_fallback() {
        assert_eq!(encode_win_ansi("€5 – ok"), b"\x805 \x96 ok".to_vec());
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
        assert_eq!(encode_win_ansi("a\nb"), b"a b".to_vec());
    }

    #[test]
    fn full_cp1252_upper_range() {
        assert_eq!(
            encode_win_ansi("Œuvre Škoda ‰ Ÿ œ ž"),
            b"\x8cuvre \x8akoda \x89 \x9f \x9c \x9e".to_vec()
        );
        assert_eq!(encode_win_ansi("ƒ†‡ˆ‹›˜Ž"), b"\x83\x86\x87\x88\x8b\x9b\x98\x8e".to_vec());
    }

    #[test]
    fn control_characters_are_replaced() {
        assert_eq!(encode_win_ansi("a\u{7}b\u{85}"), b"a?b?".to_vec());
    }

    #[test]
    fn resource_names_are_distinct() {
        assert_ne!(
            Font::Helvetica.resource_name(),
            Font::HelveticaBold.resource_name()
        );
    }
}
