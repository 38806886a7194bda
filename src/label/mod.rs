// Copyright 2023 Remi Bernotavicius

//! Printable product labels laid out on a grid of label cells.

use crate::cost::{self, CostCalculator};
use crate::database::models::RecipeDetail;
use chrono::NaiveDate;

pub mod content;
pub mod font;
pub mod layout;
pub mod preset;
mod render;
pub mod text;

pub use content::{DrawOp, LabelContent};
pub use font::LabelFont;
pub use layout::CellOrigin;
pub use preset::{GridConfig, GridSource, A4, PRESETS};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown label preset {0:?}")]
    UnknownPreset(String),
    #[error("invalid label grid: {0}")]
    InvalidGrid(String),
    #[error("invalid production date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One request for a sheet (or several) of identical labels.
pub struct LabelJob<'a> {
    pub recipe: &'a RecipeDetail,
    pub calculator: CostCalculator<'a>,
    pub store_name: &'a str,
    pub show_cost: bool,
    pub show_price: bool,
    /// `YYYY-MM-DD`
    pub production_date: &'a str,
    pub label_count: usize,
    pub grid: GridSource,
}

/// Where every label goes and what is drawn in each.
#[derive(Debug, Clone)]
pub struct LabelPlan {
    pub pages: Vec<Vec<CellOrigin>>,
    pub ops: Vec<DrawOp>,
}

pub struct LabelDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
}

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(date.into()))
}

impl LabelJob<'_> {
    pub fn content(&self) -> Result<LabelContent> {
        let production_date = parse_date(self.production_date)?;
        let recipe = &self.recipe.recipe;
        let best_before = recipe
            .shelf_life_days
            .filter(|&days| days > 0)
            .and_then(|days| u64::try_from(days).ok())
            .and_then(|days| production_date.checked_add_days(chrono::Days::new(days)));
        Ok(LabelContent {
            product_name: recipe.product_name.clone(),
            ingredients: self
                .recipe
                .ingredients
                .iter()
                .map(|line| line.ingredient.name.clone())
                .collect(),
            allergens: cost::allergens(&self.recipe.ingredients),
            production_date,
            best_before,
            unit_cost: self
                .show_cost
                .then(|| self.calculator.unit_cost(self.recipe)),
            selling_price: self
                .show_price
                .then(|| self.calculator.selling_price(self.recipe)),
            store_name: self.store_name.into(),
        })
    }

    pub fn plan(&self, measure: &dyn text::TextMeasure) -> Result<LabelPlan> {
        let grid = self.grid.resolve()?;
        let content = self.content()?;
        Ok(LabelPlan {
            pages: layout::paginate(&grid, &A4, self.label_count),
            ops: content.layout(measure, grid.width, grid.height),
        })
    }
}

/// `label_{product}_{YYYYMMDD}.pdf`, with path separators in the product name replaced.
pub fn filename(product_name: &str, generated_on: NaiveDate) -> String {
    let product: String = product_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("label_{product}_{}.pdf", generated_on.format("%Y%m%d"))
}

/// Lays out and renders the job. `today` only feeds the suggested filename.
pub fn generate(job: &LabelJob<'_>, font: &LabelFont, today: NaiveDate) -> Result<LabelDocument> {
    let plan = job.plan(font.measure())?;
    let product_name = &job.recipe.recipe.product_name;
    let bytes = render::render(product_name, &A4, &plan.pages, &plan.ops, font)?;
    log::info!(
        "generated {} label(s) of {product_name:?} on {} page(s)",
        job.label_count,
        plan.pages.len()
    );
    Ok(LabelDocument {
        bytes,
        filename: filename(product_name, today),
        page_count: plan.pages.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{
        CostSetting, CostSettingId, Ingredient, IngredientId, IngredientLine, Recipe, RecipeId,
        RecipeIngredientId, StoreId, Unit,
    };

    fn at() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn detail() -> RecipeDetail {
        RecipeDetail {
            recipe: Recipe {
                id: RecipeId::new(1),
                store_id: StoreId::new(1),
                product_name: "メロンパン".into(),
                category: Some("菓子パン".into()),
                production_quantity: 10,
                production_time: 60,
                shelf_life_days: Some(2),
                created_at: at(),
                updated_at: at(),
                custom_profit_margin: None,
                selling_price: None,
            },
            ingredients: vec![IngredientLine {
                id: RecipeIngredientId::new(1),
                quantity: 500.0,
                ingredient: Ingredient {
                    id: IngredientId::new(1),
                    store_id: StoreId::new(1),
                    name: "強力粉".into(),
                    supplier: None,
                    is_allergen: true,
                    allergen_type: Some("小麦".into()),
                    created_at: at(),
                    updated_at: at(),
                    purchase_price: 100.0,
                    purchase_quantity: 100.0,
                    purchase_unit: Unit::Grams,
                    usage_unit: Unit::Grams,
                },
            }],
        }
    }

    fn setting() -> CostSetting {
        CostSetting {
            id: CostSettingId::new(1),
            store_id: StoreId::new(1),
            profit_margin: 30.0,
            created_at: at(),
            updated_at: at(),
        }
    }

    fn job<'a>(
        recipe: &'a RecipeDetail,
        setting: &'a CostSetting,
        label_count: usize,
    ) -> LabelJob<'a> {
        LabelJob {
            recipe,
            calculator: CostCalculator::new(Some(setting), &[]),
            store_name: "ベーカリー",
            show_cost: true,
            show_price: true,
            production_date: "2025-03-01",
            label_count,
            grid: GridSource::default(),
        }
    }

    #[test]
    fn ten_labels_make_two_pages() {
        let (recipe, setting) = (detail(), setting());
        let plan = job(&recipe, &setting, 10)
            .plan(&text::EstimatedMetrics)
            .unwrap();
        let per_page: Vec<_> = plan.pages.iter().map(Vec::len).collect();
        assert_eq!(per_page, [8, 2]);
    }

    #[test]
    fn content_from_recipe() {
        let (recipe, setting) = (detail(), setting());
        let content = job(&recipe, &setting, 1).content().unwrap();
        assert_eq!(content.ingredients, ["強力粉"]);
        assert_eq!(content.allergens, ["小麦"]);
        assert_eq!(content.best_before, NaiveDate::from_ymd_opt(2025, 3, 3));
        assert_eq!(content.unit_cost, Some(50.0));
        assert!((content.selling_price.unwrap() - 65.0).abs() < 1e-9);
    }

    #[test]
    fn no_best_before_without_shelf_life() {
        let (mut recipe, setting) = (detail(), setting());
        for shelf_life in [None, Some(0), Some(-1)] {
            recipe.recipe.shelf_life_days = shelf_life;
            let content = job(&recipe, &setting, 1).content().unwrap();
            assert_eq!(content.best_before, None, "{shelf_life:?}");
        }
    }

    #[test]
    fn hidden_prices() {
        let (recipe, setting) = (detail(), setting());
        let mut job = job(&recipe, &setting, 1);
        job.show_cost = false;
        job.show_price = false;
        let content = job.content().unwrap();
        assert_eq!(content.unit_cost, None);
        assert_eq!(content.selling_price, None);
    }

    #[test]
    fn bad_inputs() {
        let (recipe, setting) = (detail(), setting());
        let mut bad_date = job(&recipe, &setting, 1);
        bad_date.production_date = "2025/03/01";
        assert!(matches!(
            bad_date.plan(&text::EstimatedMetrics),
            Err(Error::InvalidDate(_))
        ));

        let mut bad_grid = job(&recipe, &setting, 1);
        bad_grid.grid = GridSource::Preset("nope".into());
        assert!(matches!(
            bad_grid.plan(&text::EstimatedMetrics),
            Err(Error::UnknownPreset(_))
        ));
    }

    #[test]
    fn generates_pdf() {
        let (recipe, setting) = (detail(), setting());
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let doc = generate(&job(&recipe, &setting, 10), &LabelFont::Builtin, today).unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.filename, "label_メロンパン_20250301.pdf");
    }

    #[test]
    fn zero_labels_still_make_a_document() {
        let (recipe, setting) = (detail(), setting());
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let doc = generate(&job(&recipe, &setting, 0), &LabelFont::Builtin, today).unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(doc.page_count, 0);
    }

    #[test]
    fn filename_sanitized() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        assert_eq!(filename("a/b\\c", day), "label_a_b_c_20251224.pdf");
    }
}
