// Copyright 2023 Remi Bernotavicius

//! Production cost and price calculation for recipes.

use crate::database::models::{CostSetting, CustomCostItem, IngredientLine, Recipe, RecipeDetail};
use std::fmt;
use thousands::Separable as _;

pub mod custom_cost;
pub mod unit_conversion;

/// Formats a currency amount rounded to whole yen with thousands separators.
pub fn yen(amount: f64) -> String {
    let rounded = amount.round();
    // -0.0 prints as "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.0}", rounded).separate_with_commas()
}

/// Names of the custom cost items the legacy settings were migrated into.
pub const LABOR_COST_NAME: &str = "人件費";
pub const UTILITY_COST_NAME: &str = "光熱費";

/// Labor and utility settings from before they became custom cost items.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegacyOverheads {
    pub include_labor_cost: bool,
    pub hourly_wage: f64,
    pub include_utility_cost: bool,
    pub monthly_utility_cost: f64,
}

impl LegacyOverheads {
    fn hours(production_time: i32) -> f64 {
        f64::from(production_time) / 60.0
    }

    pub fn labor_cost(&self, production_time: i32) -> f64 {
        if !self.include_labor_cost || production_time <= 0 {
            return 0.0;
        }
        self.hourly_wage * Self::hours(production_time)
    }

    pub fn utility_cost(&self, production_time: i32) -> f64 {
        if !self.include_utility_cost || production_time <= 0 {
            return 0.0;
        }
        self.monthly_utility_cost / 30.0 / 24.0 * Self::hours(production_time)
    }
}

/// A named cost added on top of the materials.
#[derive(Debug, Clone, PartialEq)]
pub struct Overhead {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub material_cost: f64,
    pub overheads: Vec<Overhead>,
    pub total_cost: f64,
    pub production_quantity: i32,
    pub unit_cost: f64,
    pub profit_margin: Option<f64>,
    pub selling_price: f64,
    pub manual_price: bool,
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<20}{:>12}円", "材料費", yen(self.material_cost))?;
        for overhead in &self.overheads {
            writeln!(f, "{:<20}{:>12}円", overhead.name, yen(overhead.amount))?;
        }
        writeln!(f, "{:<20}{:>12}円", "合計", yen(self.total_cost))?;
        let per_unit = format!("原価 (÷{})", self.production_quantity);
        writeln!(f, "{:<20}{:>12}円", per_unit, yen(self.unit_cost))?;
        let price_label = match (self.manual_price, self.profit_margin) {
            (true, _) => "販売価格 (手動)".to_owned(),
            (false, Some(margin)) => format!("販売価格 ({margin}%)"),
            (false, None) => "販売価格".to_owned(),
        };
        write!(f, "{:<20}{:>12}円", price_label, yen(self.selling_price))
    }
}

/// A store's cost setting and custom cost items, as loaded for costing its recipes.
#[derive(Debug, Clone, Default)]
pub struct StoreCosts {
    pub cost_setting: Option<CostSetting>,
    pub custom_items: Vec<CustomCostItem>,
}

impl StoreCosts {
    pub fn calculator(&self) -> CostCalculator<'_> {
        CostCalculator::new(self.cost_setting.as_ref(), &self.custom_items)
    }
}

/// Cost of one recipe line.
pub fn line_cost(line: &IngredientLine) -> f64 {
    use unit_conversion::{to_base, unit_price};

    let ingredient = &line.ingredient;
    let price = unit_price(
        ingredient.purchase_price,
        ingredient.purchase_quantity,
        ingredient.purchase_unit,
        ingredient.usage_unit,
    );
    to_base(line.quantity, ingredient.usage_unit) * to_base(price, ingredient.usage_unit)
}

pub fn material_cost(lines: &[IngredientLine]) -> f64 {
    lines.iter().fold(0.0, |acc, line| acc + line_cost(line))
}

/// Allergen types of the flagged ingredients, each once, in the order they first appear.
pub fn allergens(lines: &[IngredientLine]) -> Vec<String> {
    let mut found: Vec<String> = vec![];
    for line in lines {
        let ingredient = &line.ingredient;
        if !ingredient.is_allergen {
            continue;
        }
        if let Some(allergen) = &ingredient.allergen_type {
            if !found.contains(allergen) {
                found.push(allergen.clone());
            }
        }
    }
    found
}

/// Costs recipes of one store, given the store's cost setting and custom cost items.
#[derive(Clone, Copy)]
pub struct CostCalculator<'a> {
    cost_setting: Option<&'a CostSetting>,
    custom_items: &'a [CustomCostItem],
    legacy: Option<LegacyOverheads>,
}

impl<'a> CostCalculator<'a> {
    pub fn new(cost_setting: Option<&'a CostSetting>, custom_items: &'a [CustomCostItem]) -> Self {
        Self {
            cost_setting,
            custom_items,
            legacy: None,
        }
    }

    pub fn with_legacy_overheads(mut self, legacy: LegacyOverheads) -> Self {
        self.legacy = Some(legacy);
        self
    }

    pub fn material_cost(&self, recipe: &RecipeDetail) -> f64 {
        material_cost(&recipe.ingredients)
    }

    fn overheads(&self, recipe: &Recipe) -> Vec<Overhead> {
        let mut overheads = vec![];
        if let Some(legacy) = &self.legacy {
            let labor = legacy.labor_cost(recipe.production_time);
            if labor > 0.0 {
                overheads.push(Overhead {
                    name: LABOR_COST_NAME.into(),
                    amount: labor,
                });
            }
            let utility = legacy.utility_cost(recipe.production_time);
            if utility > 0.0 {
                overheads.push(Overhead {
                    name: UTILITY_COST_NAME.into(),
                    amount: utility,
                });
            }
        }
        for item in self.custom_items.iter().filter(|i| i.is_active) {
            overheads.push(Overhead {
                name: item.name.clone(),
                amount: custom_cost::contribution(item, recipe),
            });
        }
        overheads
    }

    pub fn total_cost(&self, recipe: &RecipeDetail) -> f64 {
        self.material_cost(recipe) + overhead_total(&self.overheads(&recipe.recipe))
    }

    pub fn unit_cost(&self, recipe: &RecipeDetail) -> f64 {
        per_unit(self.total_cost(recipe), recipe.recipe.production_quantity)
    }

    /// The recipe's own margin if it has one, else the store's. `None` without a cost setting.
    pub fn profit_margin(&self, recipe: &Recipe) -> Option<f64> {
        let setting = self.cost_setting?;
        Some(recipe.custom_profit_margin.unwrap_or(setting.profit_margin))
    }

    fn apply_margin(&self, recipe: &Recipe, unit_cost: f64) -> f64 {
        match self.profit_margin(recipe) {
            Some(margin) if margin > 0.0 => unit_cost * (1.0 + margin / 100.0),
            _ => unit_cost,
        }
    }

    /// The manually set selling price if there is one, otherwise the unit cost marked up by the
    /// effective profit margin.
    pub fn selling_price(&self, recipe: &RecipeDetail) -> f64 {
        match recipe.recipe.selling_price {
            Some(price) => price,
            None => self.apply_margin(&recipe.recipe, self.unit_cost(recipe)),
        }
    }

    pub fn breakdown(&self, recipe: &RecipeDetail) -> CostBreakdown {
        let material_cost = self.material_cost(recipe);
        let overheads = self.overheads(&recipe.recipe);
        let total_cost = material_cost + overhead_total(&overheads);
        let unit_cost = per_unit(total_cost, recipe.recipe.production_quantity);
        let selling_price = match recipe.recipe.selling_price {
            Some(price) => price,
            None => self.apply_margin(&recipe.recipe, unit_cost),
        };
        CostBreakdown {
            material_cost,
            overheads,
            total_cost,
            production_quantity: recipe.recipe.production_quantity,
            unit_cost,
            profit_margin: self.profit_margin(&recipe.recipe),
            selling_price,
            manual_price: recipe.recipe.selling_price.is_some(),
        }
    }
}

fn overhead_total(overheads: &[Overhead]) -> f64 {
    overheads.iter().fold(0.0, |acc, o| acc + o.amount)
}

fn per_unit(total: f64, production_quantity: i32) -> f64 {
    if production_quantity <= 0 {
        return 0.0;
    }
    total / f64::from(production_quantity)
}

#[cfg(test)]
mod tests {
    use super::custom_cost::tests::{item, recipe};
    use super::*;
    use crate::database::models::{
        CalculationType, CostSettingId, Ingredient, IngredientId, RecipeIngredientId, StoreId,
        Unit,
    };

    fn setting(profit_margin: f64) -> CostSetting {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        CostSetting {
            id: CostSettingId::new(1),
            store_id: StoreId::new(1),
            profit_margin,
            created_at: at,
            updated_at: at,
        }
    }

    fn ingredient(
        id: i32,
        purchase_price: f64,
        purchase_quantity: f64,
        purchase_unit: Unit,
        usage_unit: Unit,
        allergen: Option<&str>,
    ) -> Ingredient {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Ingredient {
            id: IngredientId::new(id),
            store_id: StoreId::new(1),
            name: format!("ingredient {id}"),
            supplier: None,
            is_allergen: allergen.is_some(),
            allergen_type: allergen.map(Into::into),
            created_at: at,
            updated_at: at,
            purchase_price,
            purchase_quantity,
            purchase_unit,
            usage_unit,
        }
    }

    fn line(id: i32, quantity: f64, ingredient: Ingredient) -> IngredientLine {
        IngredientLine {
            id: RecipeIngredientId::new(id),
            quantity,
            ingredient,
        }
    }

    /// A batch of 10 with one ingredient line costing 500.
    fn simple_recipe() -> RecipeDetail {
        RecipeDetail {
            recipe: recipe(10, 60),
            ingredients: vec![line(
                1,
                500.0,
                ingredient(1, 100.0, 100.0, Unit::Grams, Unit::Grams, None),
            )],
        }
    }

    #[test]
    fn no_ingredients() {
        let detail = RecipeDetail {
            recipe: recipe(10, 60),
            ingredients: vec![],
        };
        let calc = CostCalculator::new(None, &[]);
        assert_eq!(calc.material_cost(&detail), 0.0);
        assert!(calc.material_cost(&detail).is_sign_positive());
        assert!(calc.total_cost(&detail).is_sign_positive());
        assert!(calc.unit_cost(&detail).is_sign_positive());
        assert_eq!(yen(calc.selling_price(&detail)), "0");
        assert!(allergens(&detail.ingredients).is_empty());

        let text = calc.breakdown(&detail).to_string();
        assert!(!text.contains("-0"), "{text}");
    }

    #[test]
    fn simple_costing() {
        let detail = simple_recipe();
        let setting = setting(30.0);
        let calc = CostCalculator::new(Some(&setting), &[]);

        assert_eq!(calc.material_cost(&detail), 500.0);
        assert_eq!(calc.total_cost(&detail), 500.0);
        assert_eq!(calc.unit_cost(&detail), 50.0);
        assert!((calc.selling_price(&detail) - 65.0).abs() < 1e-9);
    }

    #[test]
    fn unit_cost_with_zero_quantity() {
        let mut detail = simple_recipe();
        detail.recipe.production_quantity = 0;
        let calc = CostCalculator::new(None, &[]);
        assert_eq!(calc.unit_cost(&detail), 0.0);

        detail.recipe.production_quantity = -3;
        assert_eq!(calc.unit_cost(&detail), 0.0);
    }

    #[test]
    fn manual_selling_price_wins() {
        let mut detail = simple_recipe();
        detail.recipe.selling_price = Some(180.0);
        detail.recipe.custom_profit_margin = Some(90.0);
        let setting = setting(30.0);

        assert_eq!(
            CostCalculator::new(Some(&setting), &[]).selling_price(&detail),
            180.0
        );
        assert_eq!(CostCalculator::new(None, &[]).selling_price(&detail), 180.0);
        let breakdown = CostCalculator::new(Some(&setting), &[]).breakdown(&detail);
        assert!(breakdown.manual_price);
        assert_eq!(breakdown.selling_price, 180.0);
    }

    #[test]
    fn margin_selection() {
        let mut detail = simple_recipe();
        let setting = setting(30.0);

        detail.recipe.custom_profit_margin = Some(50.0);
        let calc = CostCalculator::new(Some(&setting), &[]);
        assert_eq!(calc.selling_price(&detail), 75.0);

        assert_eq!(
            CostCalculator::new(None, &[]).selling_price(&detail),
            50.0,
            "no setting means no markup"
        );

        detail.recipe.custom_profit_margin = Some(0.0);
        assert_eq!(calc.selling_price(&detail), 50.0);
    }

    #[test]
    fn per_unit_item() {
        let detail = simple_recipe();
        let items = [item(1, CalculationType::PerUnit, 2.0)];
        let calc = CostCalculator::new(None, &items);

        assert_eq!(calc.total_cost(&detail) - calc.material_cost(&detail), 20.0);
    }

    #[test]
    fn toggling_item_removes_its_contribution() {
        let detail = simple_recipe();
        let mut items = vec![
            item(1, CalculationType::Fixed, 150.0),
            item(2, CalculationType::PerTime, 5.0),
        ];
        let before = CostCalculator::new(None, &items).total_cost(&detail);

        items[1].is_active = false;
        let after = CostCalculator::new(None, &items).total_cost(&detail);
        assert_eq!(before - after, 300.0);

        let breakdown = CostCalculator::new(None, &items).breakdown(&detail);
        assert_eq!(breakdown.overheads.len(), 1);
        assert_eq!(breakdown.overheads[0].amount, 150.0);
    }

    #[test]
    fn legacy_overheads_match_migrated_items() {
        let detail = RecipeDetail {
            recipe: recipe(10, 90),
            ..simple_recipe()
        };
        let legacy = LegacyOverheads {
            include_labor_cost: true,
            hourly_wage: 1_200.0,
            include_utility_cost: true,
            monthly_utility_cost: 43_200.0,
        };
        let old = CostCalculator::new(None, &[]).with_legacy_overheads(legacy);

        let items = [
            item(1, CalculationType::PerTime, 1_200.0 / 60.0),
            item(2, CalculationType::PerTime, 43_200.0 / 43_200.0),
        ];
        let new = CostCalculator::new(None, &items);

        assert_eq!(old.total_cost(&detail), 500.0 + 1_800.0 + 90.0);
        assert!((old.total_cost(&detail) - new.total_cost(&detail)).abs() < 1e-9);

        let names: Vec<_> = old
            .breakdown(&detail)
            .overheads
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, [LABOR_COST_NAME, UTILITY_COST_NAME]);
    }

    #[test]
    fn legacy_overheads_need_production_time() {
        let detail = RecipeDetail {
            recipe: recipe(10, 0),
            ..simple_recipe()
        };
        let legacy = LegacyOverheads {
            include_labor_cost: true,
            hourly_wage: 1_200.0,
            ..Default::default()
        };
        let calc = CostCalculator::new(None, &[]).with_legacy_overheads(legacy);
        assert_eq!(calc.total_cost(&detail), 500.0);
    }

    #[test]
    fn unit_conversion_in_material_cost() {
        // 2000 per kg, used in grams.
        let flour = ingredient(1, 2_000.0, 1.0, Unit::Kilograms, Unit::Grams, None);
        assert_eq!(line_cost(&line(1, 250.0, flour)), 500.0);

        // Usage in kg scales both quantity and price.
        let flour = ingredient(1, 2_000.0, 1.0, Unit::Kilograms, Unit::Kilograms, None);
        assert!((line_cost(&line(1, 0.5, flour)) - 0.001).abs() < 1e-12);

        let broken = ingredient(1, 2_000.0, 0.0, Unit::Grams, Unit::Grams, None);
        assert_eq!(line_cost(&line(1, 10.0, broken)), 0.0);
    }

    #[test]
    fn allergen_list() {
        let mut no_type = ingredient(4, 1.0, 1.0, Unit::Grams, Unit::Grams, None);
        no_type.is_allergen = true;
        let mut not_flagged = ingredient(5, 1.0, 1.0, Unit::Grams, Unit::Grams, Some("そば"));
        not_flagged.is_allergen = false;

        let lines = vec![
            line(1, 1.0, ingredient(1, 1.0, 1.0, Unit::Grams, Unit::Grams, Some("小麦"))),
            line(2, 1.0, ingredient(2, 1.0, 1.0, Unit::Grams, Unit::Grams, Some("卵"))),
            line(3, 1.0, ingredient(3, 1.0, 1.0, Unit::Grams, Unit::Grams, Some("小麦"))),
            line(4, 1.0, no_type),
            line(5, 1.0, not_flagged),
        ];
        assert_eq!(allergens(&lines), ["小麦", "卵"]);
    }

    #[test]
    fn yen_formatting() {
        assert_eq!(yen(1_234_567.4), "1,234,567");
        assert_eq!(yen(65.0), "65");
        assert_eq!(yen(999.6), "1,000");
        assert_eq!(yen(-0.0), "0");
        assert_eq!(yen(-0.2), "0");
    }

    #[test]
    fn breakdown_display() {
        let detail = simple_recipe();
        let setting = setting(30.0);
        let items = [item(1, CalculationType::Fixed, 1_500.0)];
        let costs = StoreCosts {
            cost_setting: Some(setting),
            custom_items: items.to_vec(),
        };
        let text = costs.calculator().breakdown(&detail).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].ends_with("1,500円"));
        assert!(lines[2].ends_with("2,000円"));
        assert!(lines[3].starts_with("原価 (÷10)") && lines[3].ends_with("200円"));
        assert!(lines[4].starts_with("販売価格 (30%)") && lines[4].ends_with("260円"));
    }
}
