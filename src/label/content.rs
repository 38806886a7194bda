// Copyright 2023 Remi Bernotavicius

use super::text::{truncate_with_ellipsis, wrap_chars, TextMeasure};
use crate::cost::yen;
use chrono::NaiveDate;

const PADDING: f32 = 3.0;

const NAME_SIZE: f32 = 14.0;
const NAME_MAX_LINES: usize = 3;
const HEADING_SIZE: f32 = 8.0;
const BODY_SIZE: f32 = 7.0;
const INGREDIENTS_MAX_LINES: usize = 4;
const STORE_SIZE: f32 = 6.0;

const BORDER_THICKNESS: f32 = 0.5;
const DIVIDER_THICKNESS: f32 = 0.3;

pub const INGREDIENTS_PREFIX: &str = "【材料】";
pub const NO_INGREDIENTS: &str = "材料未設定";

/// One drawing instruction, positioned in millimetres from the label's bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
    },
    Border {
        width: f32,
        height: f32,
        thickness: f32,
    },
}

/// Everything printed on one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelContent {
    pub product_name: String,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub production_date: NaiveDate,
    pub best_before: Option<NaiveDate>,
    pub unit_cost: Option<f64>,
    pub selling_price: Option<f64>,
    pub store_name: String,
}

fn japanese_date(date: NaiveDate) -> String {
    date.format("%Y年%m月%d日").to_string()
}

impl LabelContent {
    /// Lays the content out top to bottom inside a `width` × `height` label.
    pub fn layout(&self, measure: &dyn TextMeasure, width: f32, height: f32) -> Vec<DrawOp> {
        let inner_width = width - 2.0 * PADDING;
        let mut ops = vec![DrawOp::Border {
            width,
            height,
            thickness: BORDER_THICKNESS,
        }];
        let text = |ops: &mut Vec<DrawOp>, x: f32, y: f32, size: f32, text: String| {
            ops.push(DrawOp::Text { x, y, size, text });
        };
        let divider = |ops: &mut Vec<DrawOp>, y: f32| {
            ops.push(DrawOp::Line {
                from: (PADDING, y),
                to: (width - PADDING, y),
                thickness: DIVIDER_THICKNESS,
            });
        };

        let mut y = height - PADDING;

        let name_lines = wrap_chars(
            measure,
            &self.product_name,
            NAME_SIZE,
            inner_width,
            NAME_MAX_LINES,
        );
        let single_line = name_lines.len() <= 1;
        for line in name_lines {
            text(&mut ops, PADDING, y - 5.0, NAME_SIZE, line);
            y -= 6.0;
        }
        if single_line {
            y -= 2.0;
        }

        divider(&mut ops, y);
        y -= 4.0;

        text(
            &mut ops,
            PADDING,
            y,
            HEADING_SIZE,
            INGREDIENTS_PREFIX.into(),
        );
        let prefix_width = measure.width_mm(INGREDIENTS_PREFIX, HEADING_SIZE) + 1.0;
        let ingredients = if self.ingredients.is_empty() {
            NO_INGREDIENTS.to_owned()
        } else {
            self.ingredients.join("、")
        };
        let ingredient_lines = wrap_chars(
            measure,
            &ingredients,
            BODY_SIZE,
            inner_width - prefix_width,
            INGREDIENTS_MAX_LINES,
        );
        for line in ingredient_lines {
            text(&mut ops, PADDING + prefix_width, y, BODY_SIZE, line);
            y -= 3.0;
        }
        y -= 2.0;

        if !self.allergens.is_empty() {
            let allergens = format!("アレルゲン: {}", self.allergens.join(", "));
            text(&mut ops, PADDING, y, BODY_SIZE, allergens);
            y -= 4.0;
        }

        let produced = format!("製造日: {}", japanese_date(self.production_date));
        text(&mut ops, PADDING, y, BODY_SIZE, produced);
        y -= 3.0;
        if let Some(best_before) = self.best_before {
            let best_before = format!("賞味期限: {}", japanese_date(best_before));
            text(&mut ops, PADDING, y, BODY_SIZE, best_before);
            y -= 3.0;
        }

        if self.unit_cost.is_some() || self.selling_price.is_some() {
            y -= 1.0;
            divider(&mut ops, y);
            y -= 3.0;
            if let Some(cost) = self.unit_cost {
                text(&mut ops, PADDING, y, BODY_SIZE, format!("原価: {}円", yen(cost)));
                y -= 3.0;
            }
            if let Some(price) = self.selling_price {
                let price = format!("販売価格: {}円", yen(price));
                text(&mut ops, PADDING, y, BODY_SIZE, price);
            }
        }

        let store_name =
            truncate_with_ellipsis(measure, &self.store_name, STORE_SIZE, inner_width);
        let store_width = measure.width_mm(&store_name, STORE_SIZE);
        text(
            &mut ops,
            width - PADDING - store_width,
            PADDING,
            STORE_SIZE,
            store_name,
        );

        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::text::EstimatedMetrics;

    fn content() -> LabelContent {
        LabelContent {
            product_name: "メロンパン".into(),
            ingredients: vec!["強力粉".into(), "バター".into(), "卵".into()],
            allergens: vec!["小麦".into(), "乳".into(), "卵".into()],
            production_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            best_before: NaiveDate::from_ymd_opt(2025, 3, 4),
            unit_cost: None,
            selling_price: None,
            store_name: "ベーカリー".into(),
        }
    }

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn dividers(ops: &[DrawOp]) -> usize {
        ops.iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }

    #[test]
    fn basic_label() {
        let ops = content().layout(&EstimatedMetrics, 90.0, 60.0);
        assert!(matches!(ops[0], DrawOp::Border { width, .. } if width == 90.0));
        assert_eq!(
            texts(&ops),
            [
                "メロンパン",
                "【材料】",
                "強力粉、バター、卵",
                "アレルゲン: 小麦, 乳, 卵",
                "製造日: 2025年03月01日",
                "賞味期限: 2025年03月04日",
                "ベーカリー",
            ]
        );
        assert_eq!(dividers(&ops), 1);
    }

    #[test]
    fn prices_are_gated() {
        let mut c = content();
        c.unit_cost = Some(1234.4);
        let ops = c.layout(&EstimatedMetrics, 90.0, 60.0);
        let t = texts(&ops);
        assert!(t.contains(&"原価: 1,234円"));
        assert!(!t.iter().any(|t| t.starts_with("販売価格")));
        assert_eq!(dividers(&ops), 2);

        c.unit_cost = None;
        c.selling_price = Some(65.0);
        let ops = c.layout(&EstimatedMetrics, 90.0, 60.0);
        let t = texts(&ops);
        assert!(t.contains(&"販売価格: 65円"));
        assert!(!t.iter().any(|t| t.starts_with("原価")));
    }

    #[test]
    fn no_ingredients_no_allergens() {
        let mut c = content();
        c.ingredients.clear();
        c.allergens.clear();
        c.best_before = None;
        let ops = c.layout(&EstimatedMetrics, 90.0, 60.0);
        let t = texts(&ops);
        assert!(t.contains(&NO_INGREDIENTS));
        assert!(!t.iter().any(|t| t.starts_with("アレルゲン")));
        assert!(!t.iter().any(|t| t.starts_with("賞味期限")));
    }

    #[test]
    fn long_name_wraps_to_three_lines() {
        let mut c = content();
        c.product_name = "とても長い名前の特製クリームたっぷりメロンパンスペシャル限定版".into();
        let ops = c.layout(&EstimatedMetrics, 40.0, 60.0);
        let name_lines: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { size, .. } if *size == NAME_SIZE))
            .collect();
        assert_eq!(name_lines.len(), NAME_MAX_LINES);
    }

    #[test]
    fn ingredient_lines_share_row_with_prefix() {
        let mut c = content();
        c.ingredients = (0..40).map(|n| format!("材料{n}")).collect();
        let ops = c.layout(&EstimatedMetrics, 90.0, 60.0);

        let prefix_y = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { y, text, .. } if text == INGREDIENTS_PREFIX => Some(*y),
                _ => None,
            })
            .unwrap();
        let ingredient_rows: Vec<(f32, f32)> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, size, .. } if *size == BODY_SIZE && *x > PADDING => {
                    Some((*x, *y))
                }
                _ => None,
            })
            .collect();
        assert_eq!(ingredient_rows.len(), INGREDIENTS_MAX_LINES);
        assert_eq!(ingredient_rows[0].1, prefix_y);
    }

    #[test]
    fn store_name_is_right_aligned_and_truncated() {
        let mut c = content();
        c.store_name = "とても長い店舗名のテスト12345".into();
        let width = 30.0;
        let ops = c.layout(&EstimatedMetrics, width, 60.0);
        let Some(DrawOp::Text { x, y, text, size }) = ops.last() else {
            panic!("store name missing");
        };
        assert_eq!(*y, PADDING);
        assert!(text.ends_with('…'));
        let text_width = EstimatedMetrics.width_mm(text, *size);
        assert!(text_width <= width - 2.0 * PADDING);
        assert!((x + text_width - (width - PADDING)).abs() < 1e-4);
    }
}
