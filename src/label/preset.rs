// Copyright 2023 Remi Bernotavicius

use super::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

pub const A4: PageSize = PageSize {
    width: 210.0,
    height: 297.0,
};

/// A rectangular grid of equally sized labels. Lengths are in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub width: f32,
    pub height: f32,
    pub cols: u32,
    pub rows: u32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub gap_x: f32,
    pub gap_y: f32,
}

impl GridConfig {
    pub fn per_page(&self) -> u32 {
        self.cols * self.rows
    }

    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(Error::InvalidGrid(
                "columns and rows must be at least 1".into(),
            ));
        }
        let lengths = [
            ("width", self.width),
            ("height", self.height),
            ("left margin", self.margin_left),
            ("top margin", self.margin_top),
            ("horizontal gap", self.gap_x),
            ("vertical gap", self.gap_y),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidGrid(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        if self.width == 0.0 || self.height == 0.0 {
            return Err(Error::InvalidGrid("label size must be positive".into()));
        }
        Ok(())
    }

    /// Parses `width,height,cols,rows,margin_left,margin_top,gap_x,gap_y`.
    pub fn parse(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [width, height, cols, rows, margin_left, margin_top, gap_x, gap_y] = fields[..] else {
            return Err(Error::InvalidGrid(format!(
                "expected 8 comma separated values, got {}",
                fields.len()
            )));
        };
        let length = |name: &str, v: &str| {
            v.parse::<f32>()
                .map_err(|_| Error::InvalidGrid(format!("{name} {v:?} is not a number")))
        };
        let count = |name: &str, v: &str| {
            v.parse::<u32>()
                .map_err(|_| Error::InvalidGrid(format!("{name} {v:?} is not a whole number")))
        };
        let grid = Self {
            width: length("width", width)?,
            height: length("height", height)?,
            cols: count("columns", cols)?,
            rows: count("rows", rows)?,
            margin_left: length("left margin", margin_left)?,
            margin_top: length("top margin", margin_top)?,
            gap_x: length("horizontal gap", gap_x)?,
            gap_y: length("vertical gap", gap_y)?,
        };
        grid.validate()?;
        Ok(grid)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub key: &'static str,
    pub name: &'static str,
    pub grid: GridConfig,
}

pub const STANDARD: &str = "standard";

pub const PRESETS: &[Preset] = &[
    Preset {
        key: STANDARD,
        name: "Standard 90×60 mm, 8 per sheet",
        grid: GridConfig {
            width: 90.0,
            height: 60.0,
            cols: 2,
            rows: 4,
            margin_left: 15.0,
            margin_top: 20.0,
            gap_x: 10.0,
            gap_y: 8.0,
        },
    },
    Preset {
        key: "a-one-72210",
        name: "A-One 72210, 86.4×50.8 mm, 10 per sheet",
        grid: GridConfig {
            width: 86.4,
            height: 50.8,
            cols: 2,
            rows: 5,
            margin_left: 18.6,
            margin_top: 21.5,
            gap_x: 0.0,
            gap_y: 0.0,
        },
    },
    Preset {
        key: "a-one-72212",
        name: "A-One 72212, 86.4×42.3 mm, 12 per sheet",
        grid: GridConfig {
            width: 86.4,
            height: 42.3,
            cols: 2,
            rows: 6,
            margin_left: 18.6,
            margin_top: 21.6,
            gap_x: 0.0,
            gap_y: 0.0,
        },
    },
    Preset {
        key: "a-one-72224",
        name: "A-One 72224, 66.0×33.9 mm, 24 per sheet",
        grid: GridConfig {
            width: 66.0,
            height: 33.9,
            cols: 3,
            rows: 8,
            margin_left: 6.0,
            margin_top: 12.9,
            gap_x: 0.0,
            gap_y: 0.0,
        },
    },
];

pub fn find_preset(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.key == key)
}

/// Where a job's grid comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum GridSource {
    Preset(String),
    Custom(GridConfig),
}

impl GridSource {
    pub fn resolve(&self) -> Result<GridConfig> {
        let grid = match self {
            Self::Preset(key) => {
                find_preset(key)
                    .ok_or_else(|| Error::UnknownPreset(key.clone()))?
                    .grid
            }
            Self::Custom(grid) => *grid,
        };
        grid.validate()?;
        Ok(grid)
    }
}

impl Default for GridSource {
    fn default() -> Self {
        Self::Preset(STANDARD.into())
    }
}

#[test]
fn presets_fit_on_a4() {
    for preset in PRESETS {
        let g = preset.grid;
        g.validate().unwrap();
        let cols = g.cols as f32;
        let rows = g.rows as f32;
        let used_width = g.margin_left + cols * g.width + (cols - 1.0) * g.gap_x;
        let used_height = g.margin_top + rows * g.height + (rows - 1.0) * g.gap_y;
        assert!(used_width <= A4.width + 0.01, "{} too wide", preset.key);
        assert!(used_height <= A4.height + 0.01, "{} too tall", preset.key);
    }
}

#[test]
fn parse_custom_grid() {
    let grid = GridConfig::parse("50, 30, 3, 9, 5, 10, 2.5, 1").unwrap();
    assert_eq!(grid.per_page(), 27);
    assert_eq!(grid.gap_x, 2.5);

    assert!(matches!(
        GridConfig::parse("50,30,3,9"),
        Err(Error::InvalidGrid(_))
    ));
    assert!(matches!(
        GridConfig::parse("50,30,0,9,5,10,2,1"),
        Err(Error::InvalidGrid(_))
    ));
    assert!(matches!(
        GridConfig::parse("50,0,3,9,5,10,2,1"),
        Err(Error::InvalidGrid(_))
    ));
    assert!(matches!(
        GridConfig::parse("50,x,3,9,5,10,2,1"),
        Err(Error::InvalidGrid(_))
    ));
}

#[test]
fn resolve_grid_source() {
    assert_eq!(GridSource::default().resolve().unwrap().per_page(), 8);
    assert!(matches!(
        GridSource::Preset("a-one-99999".into()).resolve(),
        Err(Error::UnknownPreset(_))
    ));
}
