// Copyright 2023 Remi Bernotavicius

//! Text-field input as typed into the UI or given on the command line, and its validation into
//! the values the repository writes.

use crate::database::models::{CalculationType, CustomCostItem, Ingredient, Recipe, Unit};
use diesel::prelude::{AsChangeset, Insertable};

pub const RECIPE_CATEGORIES: [&str; 6] = [
    "食パン",
    "菓子パン",
    "調理パン",
    "ハード系",
    "デニッシュ",
    "その他",
];

pub const ALLERGEN_TYPES: [&str; 8] = [
    "小麦",
    "卵",
    "乳",
    "そば",
    "落花生",
    "えび",
    "かに",
    "その他",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

type Result<T> = std::result::Result<T, ValidationError>;

fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(value.into())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.into())
}

fn parse_f64(field: &'static str, value: &str) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::new(field, format!("{value:?} is not a number")))?;
    if !parsed.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    Ok(parsed)
}

fn parse_optional_f64(field: &'static str, value: &str) -> Result<Option<f64>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_f64(field, value).map(Some)
}

fn parse_i32(field: &'static str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::new(field, format!("{value:?} is not a whole number")))
}

fn at_least<T: PartialOrd + std::fmt::Display>(field: &'static str, value: T, min: T) -> Result<T> {
    if value < min {
        return Err(ValidationError::new(field, format!("must be at least {min}")));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientForm {
    pub name: String,
    pub purchase_price: String,
    pub purchase_quantity: String,
    pub purchase_unit: Unit,
    pub usage_unit: Unit,
    pub supplier: String,
    pub is_allergen: bool,
    pub allergen_type: String,
}

impl Default for IngredientForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            purchase_price: String::new(),
            purchase_quantity: "1".into(),
            purchase_unit: Unit::Grams,
            usage_unit: Unit::Grams,
            supplier: String::new(),
            is_allergen: false,
            allergen_type: String::new(),
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::ingredients)]
#[diesel(treat_none_as_null = true)]
pub struct IngredientInput {
    pub name: String,
    pub purchase_price: f64,
    pub purchase_quantity: f64,
    pub purchase_unit: Unit,
    pub usage_unit: Unit,
    pub supplier: Option<String>,
    pub is_allergen: bool,
    pub allergen_type: Option<String>,
}

impl IngredientForm {
    pub fn from_ingredient(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.clone(),
            purchase_price: ingredient.purchase_price.to_string(),
            purchase_quantity: ingredient.purchase_quantity.to_string(),
            purchase_unit: ingredient.purchase_unit,
            usage_unit: ingredient.usage_unit,
            supplier: ingredient.supplier.clone().unwrap_or_default(),
            is_allergen: ingredient.is_allergen,
            allergen_type: ingredient.allergen_type.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<IngredientInput> {
        let purchase_quantity = parse_f64("purchase quantity", &self.purchase_quantity)?;
        if purchase_quantity < 0.001 {
            return Err(ValidationError::new(
                "purchase quantity",
                "must be at least 0.001",
            ));
        }
        Ok(IngredientInput {
            name: required("name", &self.name)?,
            purchase_price: at_least(
                "purchase price",
                parse_f64("purchase price", &self.purchase_price)?,
                0.0,
            )?,
            purchase_quantity,
            purchase_unit: self.purchase_unit,
            usage_unit: self.usage_unit,
            supplier: optional(&self.supplier),
            is_allergen: self.is_allergen,
            allergen_type: self
                .is_allergen
                .then(|| optional(&self.allergen_type))
                .flatten(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeForm {
    pub product_name: String,
    pub category: String,
    pub production_quantity: String,
    pub production_time: String,
    pub shelf_life_days: String,
    pub custom_profit_margin: String,
    pub selling_price: String,
}

impl Default for RecipeForm {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            category: String::new(),
            production_quantity: "1".into(),
            production_time: "0".into(),
            shelf_life_days: String::new(),
            custom_profit_margin: String::new(),
            selling_price: String::new(),
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeInput {
    pub product_name: String,
    pub category: Option<String>,
    pub production_quantity: i32,
    pub production_time: i32,
    pub shelf_life_days: Option<i32>,
    pub custom_profit_margin: Option<f64>,
    pub selling_price: Option<f64>,
}

impl RecipeInput {
    pub fn named(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            category: None,
            production_quantity: 1,
            production_time: 0,
            shelf_life_days: None,
            custom_profit_margin: None,
            selling_price: None,
        }
    }
}

impl RecipeForm {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        let opt = |v: Option<String>| v.unwrap_or_default();
        Self {
            product_name: recipe.product_name.clone(),
            category: opt(recipe.category.clone()),
            production_quantity: recipe.production_quantity.to_string(),
            production_time: recipe.production_time.to_string(),
            shelf_life_days: opt(recipe.shelf_life_days.map(|d| d.to_string())),
            custom_profit_margin: opt(recipe.custom_profit_margin.map(|m| m.to_string())),
            selling_price: opt(recipe.selling_price.map(|p| p.to_string())),
        }
    }

    pub fn validate(&self) -> Result<RecipeInput> {
        let shelf_life_days = if self.shelf_life_days.trim().is_empty() {
            None
        } else {
            let days = parse_i32("shelf life", &self.shelf_life_days)?;
            Some(at_least("shelf life", days, 0)?)
        };
        let custom_profit_margin =
            parse_optional_f64("profit margin", &self.custom_profit_margin)?
                .map(validate_margin)
                .transpose()?;
        let selling_price = parse_optional_f64("selling price", &self.selling_price)?
            .map(|p| at_least("selling price", p, 0.0))
            .transpose()?;

        Ok(RecipeInput {
            product_name: required("product name", &self.product_name)?,
            category: optional(&self.category),
            production_quantity: at_least(
                "production quantity",
                parse_i32("production quantity", &self.production_quantity)?,
                1,
            )?,
            production_time: at_least(
                "production time",
                parse_i32("production time", &self.production_time)?,
                0,
            )?,
            shelf_life_days,
            custom_profit_margin,
            selling_price,
        })
    }
}

fn validate_margin(margin: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&margin) {
        return Err(ValidationError::new(
            "profit margin",
            "must be between 0 and 100",
        ));
    }
    Ok(margin)
}

pub fn parse_profit_margin(value: &str) -> Result<f64> {
    validate_margin(parse_f64("profit margin", value)?)
}

pub fn parse_quantity(value: &str) -> Result<f64> {
    at_least("quantity", parse_f64("quantity", value)?, 0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomCostItemForm {
    pub name: String,
    pub calculation_type: CalculationType,
    pub amount: String,
    pub is_active: bool,
    pub description: String,
}

impl Default for CustomCostItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            calculation_type: CalculationType::Fixed,
            amount: String::new(),
            is_active: true,
            description: String::new(),
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::database::schema::custom_cost_items)]
#[diesel(treat_none_as_null = true)]
pub struct CustomCostItemInput {
    pub name: String,
    pub calculation_type: CalculationType,
    pub amount: f64,
    pub is_active: bool,
    pub description: Option<String>,
}

impl CustomCostItemForm {
    pub fn from_item(item: &CustomCostItem) -> Self {
        Self {
            name: item.name.clone(),
            calculation_type: item.calculation_type,
            amount: item.amount.to_string(),
            is_active: item.is_active,
            description: item.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<CustomCostItemInput> {
        Ok(CustomCostItemInput {
            name: required("name", &self.name)?,
            calculation_type: self.calculation_type,
            amount: at_least("amount", parse_f64("amount", &self.amount)?, 0.0)?,
            is_active: self.is_active,
            description: optional(&self.description),
        })
    }
}

#[test]
fn ingredient_form_validation() {
    let mut form = IngredientForm {
        name: " 強力粉 ".into(),
        purchase_price: "2000".into(),
        purchase_quantity: "1".into(),
        purchase_unit: Unit::Kilograms,
        usage_unit: Unit::Grams,
        supplier: "".into(),
        is_allergen: false,
        allergen_type: "小麦".into(),
    };
    let input = form.validate().unwrap();
    assert_eq!(input.name, "強力粉");
    assert_eq!(input.supplier, None);
    assert_eq!(input.allergen_type, None, "type is dropped when not an allergen");

    form.is_allergen = true;
    assert_eq!(form.validate().unwrap().allergen_type.as_deref(), Some("小麦"));

    form.purchase_quantity = "0".into();
    assert_eq!(form.validate().unwrap_err().field, "purchase quantity");

    form.purchase_quantity = "1".into();
    form.purchase_price = "-5".into();
    assert_eq!(form.validate().unwrap_err().field, "purchase price");

    form.purchase_price = "abc".into();
    assert_eq!(form.validate().unwrap_err().field, "purchase price");
}

#[test]
fn recipe_form_validation() {
    let mut form = RecipeForm {
        product_name: "メロンパン".into(),
        production_quantity: "10".into(),
        production_time: "90".into(),
        shelf_life_days: "3".into(),
        ..Default::default()
    };
    let input = form.validate().unwrap();
    assert_eq!(input.production_quantity, 10);
    assert_eq!(input.shelf_life_days, Some(3));
    assert_eq!(input.custom_profit_margin, None);
    assert_eq!(input.category, None);

    form.production_quantity = "0".into();
    assert_eq!(form.validate().unwrap_err().field, "production quantity");

    form.production_quantity = "10".into();
    form.custom_profit_margin = "120".into();
    assert_eq!(form.validate().unwrap_err().field, "profit margin");

    form.custom_profit_margin = "40".into();
    form.selling_price = "250".into();
    let input = form.validate().unwrap();
    assert_eq!(input.custom_profit_margin, Some(40.0));
    assert_eq!(input.selling_price, Some(250.0));

    form.product_name = "   ".into();
    assert_eq!(form.validate().unwrap_err().field, "product name");
}

#[test]
fn custom_cost_item_form_validation() {
    let form = CustomCostItemForm {
        name: "包装費".into(),
        calculation_type: CalculationType::PerUnit,
        amount: "2".into(),
        ..Default::default()
    };
    let input = form.validate().unwrap();
    assert_eq!(input.calculation_type, CalculationType::PerUnit);
    assert_eq!(input.amount, 2.0);
    assert!(input.is_active);

    let form = CustomCostItemForm {
        amount: "-1".into(),
        ..form
    };
    assert_eq!(form.validate().unwrap_err().field, "amount");
}
