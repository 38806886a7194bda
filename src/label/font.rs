// Copyright 2023 Remi Bernotavicius

use super::text::{EstimatedMetrics, TextMeasure};
use rusttype::{Font, Scale};
use std::path::{Path, PathBuf};

/// Fonts with Japanese coverage in the places common systems install them.
const FONT_CANDIDATES: &[&str] = &[
    "C:/Windows/Fonts/msgothic.ttc",
    "C:/Windows/Fonts/YuGothM.ttc",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "/usr/share/fonts/opentype/ipafont-gothic/ipag.ttf",
    "/usr/share/fonts/truetype/fonts-japanese-gothic.ttf",
    "/usr/share/fonts/truetype/takao-gothic/TakaoGothic.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
];

/// A TrueType font file both measured here and embedded into the PDF.
pub struct EmbeddedFont {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    font: Font<'static>,
    scale: Scale,
    units_per_em: f32,
}

impl EmbeddedFont {
    pub fn load(path: &Path) -> Option<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                log::debug!("can't read font {}: {error}", path.display());
                return None;
            }
        };
        let Some(font) = Font::try_from_vec(bytes.clone()) else {
            log::warn!("{} is not a usable TrueType font", path.display());
            return None;
        };
        let v_metrics = font.v_metrics_unscaled();
        Some(Self {
            path: path.to_owned(),
            bytes,
            scale: Scale::uniform(v_metrics.ascent - v_metrics.descent),
            units_per_em: f32::from(font.units_per_em()),
            font,
        })
    }
}

impl TextMeasure for EmbeddedFont {
    fn advance_em(&self, c: char) -> f32 {
        let glyph = self.font.glyph(c);
        if glyph.id().0 == 0 {
            return EstimatedMetrics.advance_em(c);
        }
        glyph.scaled(self.scale).h_metrics().advance_width / self.units_per_em
    }
}

/// The font labels are set in. Falls back to the PDF built-in Helvetica, measured with
/// estimated widths, when no font file can be loaded.
pub enum LabelFont {
    Embedded(EmbeddedFont),
    Builtin,
}

impl LabelFont {
    /// Tries `configured` first, then the usual system locations.
    pub fn discover(configured: Option<&Path>) -> Self {
        let configured = configured.map(Path::to_path_buf);
        let candidates = configured
            .iter()
            .cloned()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));
        for path in candidates {
            if !path.exists() {
                continue;
            }
            if let Some(font) = EmbeddedFont::load(&path) {
                log::info!("label font: {}", path.display());
                return Self::Embedded(font);
            }
        }
        if let Some(path) = configured {
            log::warn!("configured label font {} could not be loaded", path.display());
        }
        log::warn!("no Japanese font found, labels fall back to Helvetica");
        Self::Builtin
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        match self {
            Self::Embedded(font) => font,
            Self::Builtin => &EstimatedMetrics,
        }
    }
}

#[test]
fn missing_font_falls_back() {
    let font = LabelFont::discover(Some(Path::new("/nonexistent/font.ttf")));
    let measure = font.measure();
    assert!(measure.advance_em('パ') > 0.0);
    assert!(measure.advance_em('a') > 0.0);
}

#[test]
fn garbage_font_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ttf");
    std::fs::write(&path, b"not a font").unwrap();
    assert!(EmbeddedFont::load(&path).is_none());
}
