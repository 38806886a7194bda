// Copyright 2023 Remi Bernotavicius

pub const PT_TO_MM: f32 = 25.4 / 72.0;

pub const ELLIPSIS: char = '…';

/// Glyph advance widths for laying out label text.
pub trait TextMeasure {
    /// Advance width of `c` as a fraction of the font size.
    fn advance_em(&self, c: char) -> f32;

    fn width_mm(&self, text: &str, size_pt: f32) -> f32 {
        text.chars().map(|c| self.advance_em(c)).sum::<f32>() * size_pt * PT_TO_MM
    }
}

/// East Asian wide and fullwidth characters.
pub fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}

/// Widths guessed from the character class, for when no font file is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct EstimatedMetrics;

impl TextMeasure for EstimatedMetrics {
    fn advance_em(&self, c: char) -> f32 {
        if is_wide(c) {
            1.0
        } else {
            0.55
        }
    }
}

/// Breaks `text` into lines no wider than `max_width` (mm), filling each line with as many
/// characters as fit. Stops after `max_lines`; whatever is left over is dropped. A character
/// wider than `max_width` gets a line of its own.
pub fn wrap_chars(
    measure: &dyn TextMeasure,
    text: &str,
    size_pt: f32,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    if max_lines == 0 {
        return vec![];
    }
    let mut lines = vec![];
    let mut current = String::new();
    let mut current_width = 0.0;
    for c in text.chars() {
        let w = measure.advance_em(c) * size_pt * PT_TO_MM;
        if !current.is_empty() && current_width + w > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
            if lines.len() == max_lines {
                return lines;
            }
        }
        current.push(c);
        current_width += w;
    }
    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

/// Returns `text` unchanged if it fits in `max_width` (mm). Otherwise drops characters from the
/// end until the rest plus an ellipsis fits.
pub fn truncate_with_ellipsis(
    measure: &dyn TextMeasure,
    text: &str,
    size_pt: f32,
    max_width: f32,
) -> String {
    if measure.width_mm(text, size_pt) <= max_width {
        return text.into();
    }
    let mut kept: String = text.into();
    loop {
        kept.pop();
        let candidate = format!("{kept}{ELLIPSIS}");
        if kept.is_empty() || measure.width_mm(&candidate, size_pt) <= max_width {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 1 mm wide at 10 pt.
    struct Monospace;

    impl TextMeasure for Monospace {
        fn advance_em(&self, _c: char) -> f32 {
            1.0 / (10.0 * PT_TO_MM)
        }
    }

    #[test]
    fn wrap_fills_lines() {
        let lines = wrap_chars(&Monospace, "abcdefghij", 10.0, 4.5, 5);
        assert_eq!(lines, ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_stops_at_max_lines() {
        let lines = wrap_chars(&Monospace, "abcdefghij", 10.0, 3.5, 2);
        assert_eq!(lines, ["abc", "def"]);
    }

    #[test]
    fn wrap_short_text() {
        assert_eq!(wrap_chars(&Monospace, "ab", 10.0, 4.5, 3), ["ab"]);
        assert!(wrap_chars(&Monospace, "", 10.0, 4.5, 3).is_empty());
    }

    #[test]
    fn wrap_narrower_than_a_character() {
        let lines = wrap_chars(&Monospace, "abc", 10.0, 0.5, 5);
        assert_eq!(lines, ["a", "b", "c"]);
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_with_ellipsis(&Monospace, "abc", 10.0, 3.5), "abc");
        assert_eq!(
            truncate_with_ellipsis(&Monospace, "abcdef", 10.0, 4.5),
            "abc…"
        );
        assert_eq!(truncate_with_ellipsis(&Monospace, "abcdef", 10.0, 0.5), "…");
    }

    #[test]
    fn truncate_long_store_name() {
        let name = "とても長い店舗名のテスト12345";
        let max_width = 20.0;
        let m = EstimatedMetrics;
        assert!(m.width_mm(name, 6.0) > max_width);

        let truncated = truncate_with_ellipsis(&m, name, 6.0, max_width);
        assert!(truncated.ends_with(ELLIPSIS));
        assert!(m.width_mm(&truncated, 6.0) <= max_width);
        let kept = truncated.trim_end_matches(ELLIPSIS);
        assert!(name.starts_with(kept));
        assert!(!kept.is_empty());
    }

    #[test]
    fn estimated_widths() {
        let m = EstimatedMetrics;
        assert_eq!(m.advance_em('パ'), 1.0);
        assert_eq!(m.advance_em('、'), 1.0);
        assert_eq!(m.advance_em('Ａ'), 1.0);
        assert_eq!(m.advance_em('a'), 0.55);
        assert_eq!(m.advance_em('1'), 0.55);
    }
}
