// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use strum::{EnumIter, EnumString};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
        pub struct $name(i32);

        impl $name {
            pub fn new(id: i32) -> Self {
                Self(id)
            }

            pub fn get(&self) -> i32 {
                self.0
            }
        }
    };
}

id_type!(StoreId);
id_type!(IngredientId);
id_type!(RecipeId);
id_type!(RecipeIngredientId);
id_type!(CostSettingId);
id_type!(CustomCostItemId);

#[derive(Queryable, Selectable, Identifiable, Clone, Debug)]
#[diesel(table_name = crate::database::schema::stores)]
pub struct Store {
    pub id: StoreId,
    pub login_id: String,
    pub store_name: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Units an ingredient can be bought or used in. The database stores the symbol.
#[derive(
    Debug, Display, EnumIter, EnumString, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, DbEnum,
)]
pub enum Unit {
    #[display("g")]
    #[db_rename = "g"]
    #[strum(serialize = "g")]
    Grams,
    #[display("kg")]
    #[db_rename = "kg"]
    #[strum(serialize = "kg")]
    Kilograms,
    #[display("ml")]
    #[db_rename = "ml"]
    #[strum(serialize = "ml")]
    Milliliters,
    #[display("L")]
    #[db_rename = "L"]
    #[strum(serialize = "L", serialize = "l")]
    Liters,
    #[display("個")]
    #[db_rename = "個"]
    #[strum(serialize = "個")]
    Pieces,
    #[display("枚")]
    #[db_rename = "枚"]
    #[strum(serialize = "枚")]
    Sheets,
    #[display("本")]
    #[db_rename = "本"]
    #[strum(serialize = "本")]
    Sticks,
}

impl Unit {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Store))]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct Ingredient {
    pub id: IngredientId,
    pub store_id: StoreId,
    pub name: String,
    pub supplier: Option<String>,
    pub is_allergen: bool,
    pub allergen_type: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub purchase_price: f64,
    pub purchase_quantity: f64,
    pub purchase_unit: Unit,
    pub usage_unit: Unit,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Store))]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct Recipe {
    pub id: RecipeId,
    pub store_id: StoreId,
    pub product_name: String,
    pub category: Option<String>,
    pub production_quantity: i32,
    pub production_time: i32,
    pub shelf_life_days: Option<i32>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub custom_profit_margin: Option<f64>,
    pub selling_price: Option<f64>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug)]
#[diesel(belongs_to(Recipe))]
#[diesel(belongs_to(Ingredient))]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
pub struct RecipeIngredient {
    pub id: RecipeIngredientId,
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
    pub quantity: f64,
}

/// One row of a recipe's ingredient list with the ingredient it points at.
#[derive(Clone, Debug)]
pub struct IngredientLine {
    pub id: RecipeIngredientId,
    pub quantity: f64,
    pub ingredient: Ingredient,
}

/// A recipe together with its ingredient lines, in insertion order.
#[derive(Clone, Debug)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<IngredientLine>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug)]
#[diesel(belongs_to(Store))]
#[diesel(table_name = crate::database::schema::cost_settings)]
pub struct CostSetting {
    pub id: CostSettingId,
    pub store_id: StoreId,
    pub profit_margin: f64,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(
    Debug, Display, EnumIter, EnumString, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, DbEnum,
)]
pub enum CalculationType {
    #[display("fixed")]
    #[db_rename = "fixed"]
    #[strum(serialize = "fixed")]
    Fixed,
    #[display("per unit")]
    #[db_rename = "per_unit"]
    #[strum(serialize = "per_unit")]
    PerUnit,
    #[display("per minute")]
    #[db_rename = "per_time"]
    #[strum(serialize = "per_time")]
    PerTime,
}

impl CalculationType {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Store))]
#[diesel(table_name = crate::database::schema::custom_cost_items)]
pub struct CustomCostItem {
    pub id: CustomCostItemId,
    pub store_id: StoreId,
    pub name: String,
    pub calculation_type: CalculationType,
    pub amount: f64,
    pub is_active: bool,
    pub description: Option<String>,
    pub display_order: i32,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[test]
fn unit_symbols() {
    use std::str::FromStr as _;

    assert_eq!(Unit::from_str("kg").unwrap(), Unit::Kilograms);
    assert_eq!(Unit::from_str("L").unwrap(), Unit::Liters);
    assert_eq!(Unit::from_str("l").unwrap(), Unit::Liters);
    assert_eq!(Unit::from_str("個").unwrap(), Unit::Pieces);
    assert!(Unit::from_str("cups").is_err());

    assert_eq!(Unit::Liters.to_string(), "L");
    assert_eq!(Unit::iter().count(), 7);
}

#[test]
fn calculation_type_tags() {
    use std::str::FromStr as _;

    assert_eq!(
        CalculationType::from_str("per_unit").unwrap(),
        CalculationType::PerUnit
    );
    assert_eq!(
        CalculationType::from_str("per_time").unwrap(),
        CalculationType::PerTime
    );
    assert!(CalculationType::from_str("per_batch").is_err());
}
