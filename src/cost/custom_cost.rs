// Copyright 2023 Remi Bernotavicius

use crate::database::models::{CalculationType, CustomCostItem, Recipe};

impl CalculationType {
    /// Cost added to one production batch of `recipe` by an item charging `amount`.
    pub fn contribution(self, amount: f64, recipe: &Recipe) -> f64 {
        match self {
            Self::Fixed => amount,
            Self::PerUnit => amount * f64::from(recipe.production_quantity),
            Self::PerTime if recipe.production_time > 0 => {
                amount * f64::from(recipe.production_time)
            }
            Self::PerTime => 0.0,
        }
    }

    pub fn amount_suffix(self) -> &'static str {
        match self {
            Self::Fixed => "per batch",
            Self::PerUnit => "per piece",
            Self::PerTime => "per minute",
        }
    }
}

/// What `item` adds to the batch cost of `recipe`. Inactive items add nothing.
pub fn contribution(item: &CustomCostItem, recipe: &Recipe) -> f64 {
    if !item.is_active {
        return 0.0;
    }
    item.calculation_type.contribution(item.amount, recipe)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::models::{CustomCostItemId, RecipeId, StoreId};

    pub fn recipe(production_quantity: i32, production_time: i32) -> Recipe {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Recipe {
            id: RecipeId::new(1),
            store_id: StoreId::new(1),
            product_name: "メロンパン".into(),
            category: None,
            production_quantity,
            production_time,
            shelf_life_days: None,
            created_at: at,
            updated_at: at,
            custom_profit_margin: None,
            selling_price: None,
        }
    }

    pub fn item(id: i32, calculation_type: CalculationType, amount: f64) -> CustomCostItem {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        CustomCostItem {
            id: CustomCostItemId::new(id),
            store_id: StoreId::new(1),
            name: format!("item {id}"),
            calculation_type,
            amount,
            is_active: true,
            description: None,
            display_order: id,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn contributions() {
        let r = recipe(10, 90);
        assert_eq!(contribution(&item(1, CalculationType::Fixed, 150.0), &r), 150.0);
        assert_eq!(contribution(&item(2, CalculationType::PerUnit, 2.0), &r), 20.0);
        assert_eq!(contribution(&item(3, CalculationType::PerTime, 20.0), &r), 1_800.0);
    }

    #[test]
    fn per_time_without_production_time() {
        let per_time = item(1, CalculationType::PerTime, 20.0);
        assert_eq!(contribution(&per_time, &recipe(10, 0)), 0.0);
        assert_eq!(contribution(&per_time, &recipe(10, -5)), 0.0);
    }

    #[test]
    fn inactive_contributes_nothing() {
        let mut fixed = item(1, CalculationType::Fixed, 150.0);
        fixed.is_active = false;
        assert_eq!(contribution(&fixed, &recipe(10, 90)), 0.0);
    }
}
