// Copyright 2023 Remi Bernotavicius

//! Store-scoped reads and writes. Every function takes the owning `StoreId` and never touches
//! rows belonging to another store.

use super::models::{
    CostSetting, CustomCostItem, CustomCostItemId, Ingredient, IngredientId, IngredientLine,
    Recipe, RecipeDetail, RecipeId, RecipeIngredient, RecipeIngredientId, Store, StoreId,
};
use super::{Connection, Error, Result};
use crate::cost::StoreCosts;
use crate::forms::{CustomCostItemInput, IngredientInput, RecipeInput};
use diesel::dsl::now;
use diesel::expression_methods::AggregateExpressionMethods as _;
use diesel::expression_methods::EscapeExpressionMethods as _;
use diesel::expression_methods::TextExpressionMethods as _;
use diesel::prelude::Connection as _;
use diesel::ExpressionMethods as _;
use diesel::OptionalExtension as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

pub const PER_PAGE: i64 = 20;

/// One page of a listing. Page numbers start at 1.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn pages(&self) -> i64 {
        ((self.total + PER_PAGE - 1) / PER_PAGE).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }
}

fn offset(page: i64) -> i64 {
    (page.max(1) - 1) * PER_PAGE
}

/// Substring match for `LIKE ... ESCAPE '\\'`, with wildcards in `search` matched literally.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::from("%");
    for c in search.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct CachedQuery<IdT> {
    query: String,
    results: Vec<(IdT, String)>,
}

// Stores

pub fn register_store(
    conn: &mut Connection,
    new_login_id: &str,
    new_store_name: &str,
) -> Result<Store> {
    if find_store_by_login(conn, new_login_id)?.is_some() {
        return Err(Error::LoginIdTaken(new_login_id.into()));
    }

    let store = conn.transaction::<_, Error, _>(|conn| {
        let store = {
            use super::schema::stores::dsl::*;
            diesel::insert_into(stores)
                .values((login_id.eq(new_login_id), store_name.eq(new_store_name)))
                .returning(Store::as_returning())
                .get_result(conn)?
        };
        {
            use super::schema::cost_settings::dsl::*;
            diesel::insert_into(cost_settings)
                .values((store_id.eq(store.id), profit_margin.eq(30.0)))
                .execute(conn)?;
        }
        Ok(store)
    })?;
    log::info!("registered store {} ({})", store.login_id, store.id);
    Ok(store)
}

pub fn find_store_by_login(conn: &mut Connection, find_login_id: &str) -> Result<Option<Store>> {
    use super::schema::stores::dsl::*;

    Ok(stores
        .select(Store::as_select())
        .filter(login_id.eq(find_login_id))
        .first(conn)
        .optional()?)
}

pub fn list_stores(conn: &mut Connection) -> Result<Vec<Store>> {
    use super::schema::stores::dsl::*;

    Ok(stores
        .select(Store::as_select())
        .order_by(store_name.asc())
        .load(conn)?)
}

pub fn delete_store(conn: &mut Connection, store: StoreId) -> Result<()> {
    use super::schema::stores::dsl::*;

    let deleted = diesel::delete(stores.filter(id.eq(store))).execute(conn)?;
    if deleted == 0 {
        return Err(Error::NotFound("store"));
    }
    log::info!("deleted store {store}");
    Ok(())
}

// Ingredients

pub fn list_ingredients(
    conn: &mut Connection,
    store: StoreId,
    search: &str,
    page: i64,
) -> Result<Paginated<Ingredient>> {
    use super::schema::ingredients::dsl::*;

    let filtered = || {
        let mut query = ingredients
            .filter(store_id.eq(store))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if !search.trim().is_empty() {
            query = query.filter(name.like(like_pattern(search)).escape('\\'));
        }
        query
    };

    let total: i64 = filtered().count().get_result(conn)?;
    let items = filtered()
        .select(Ingredient::as_select())
        .order_by((created_at.desc(), id.desc()))
        .limit(PER_PAGE)
        .offset(offset(page))
        .load(conn)?;
    Ok(Paginated {
        items,
        page: page.max(1),
        total,
    })
}

pub fn get_ingredient(
    conn: &mut Connection,
    store: StoreId,
    ingredient: IngredientId,
) -> Result<Ingredient> {
    use super::schema::ingredients::dsl::*;

    ingredients
        .select(Ingredient::as_select())
        .filter(store_id.eq(store))
        .filter(id.eq(ingredient))
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound("ingredient"))
}

pub fn search_ingredients(
    conn: &mut Connection,
    store: StoreId,
    cached_ingredient_search: &mut Option<CachedQuery<Ingredient>>,
    query: &str,
) -> Vec<(Ingredient, String)> {
    if let Some(cached) = cached_ingredient_search.as_ref() {
        if cached.query == query {
            return cached.results.clone();
        }
    }

    use super::schema::ingredients::dsl::*;

    let result: Vec<_> = match ingredients
        .select(Ingredient::as_select())
        .filter(store_id.eq(store))
        .filter(name.like(like_pattern(query)).escape('\\'))
        .order_by(name.asc())
        .load(conn)
    {
        Ok(found) => found.into_iter().map(|i| (i.clone(), i.name)).collect(),
        Err(error) => {
            log::error!("ingredient search failed: {error}");
            vec![]
        }
    };

    *cached_ingredient_search = Some(CachedQuery {
        query: query.into(),
        results: result.clone(),
    });
    result
}

pub fn add_ingredient(
    conn: &mut Connection,
    store: StoreId,
    input: &IngredientInput,
) -> Result<IngredientId> {
    use super::schema::ingredients::dsl::*;

    let new_id = diesel::insert_into(ingredients)
        .values((store_id.eq(store), input))
        .returning(id)
        .get_result(conn)?;
    log::info!("added ingredient {:?} ({new_id}) to store {store}", input.name);
    Ok(new_id)
}

pub fn update_ingredient(
    conn: &mut Connection,
    store: StoreId,
    edit_id: IngredientId,
    input: &IngredientInput,
) -> Result<()> {
    use super::schema::ingredients::dsl::*;

    let updated = diesel::update(ingredients)
        .filter(store_id.eq(store))
        .filter(id.eq(edit_id))
        .set((input, updated_at.eq(now)))
        .execute(conn)?;
    if updated == 0 {
        return Err(Error::NotFound("ingredient"));
    }
    Ok(())
}

/// Number of distinct recipes using the ingredient.
pub fn ingredient_usage_count(conn: &mut Connection, ingredient: IngredientId) -> Result<i64> {
    use super::schema::recipe_ingredients::dsl::*;

    Ok(recipe_ingredients
        .filter(ingredient_id.eq(ingredient))
        .select(diesel::dsl::count(recipe_id).aggregate_distinct())
        .get_result(conn)?)
}

/// Deletes the ingredient unless some recipe still uses it.
pub fn delete_ingredient(
    conn: &mut Connection,
    store: StoreId,
    delete_id: IngredientId,
) -> Result<()> {
    let ingredient = get_ingredient(conn, store, delete_id)?;
    let used_by = ingredient_usage_count(conn, delete_id)?;
    if used_by > 0 {
        return Err(Error::IngredientInUse {
            name: ingredient.name,
            recipes: used_by,
        });
    }

    use super::schema::ingredients::dsl::*;
    diesel::delete(ingredients.filter(store_id.eq(store)).filter(id.eq(delete_id))).execute(conn)?;
    log::info!("deleted ingredient {:?} ({delete_id})", ingredient.name);
    Ok(())
}

// Recipes

pub fn list_recipes(
    conn: &mut Connection,
    store: StoreId,
    search: &str,
    filter_category: Option<&str>,
    page: i64,
) -> Result<Paginated<Recipe>> {
    use super::schema::recipes::dsl::*;

    let filtered = || {
        let mut query = recipes
            .filter(store_id.eq(store))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if !search.trim().is_empty() {
            query = query.filter(product_name.like(like_pattern(search)).escape('\\'));
        }
        if let Some(c) = filter_category {
            query = query.filter(category.eq(c.to_owned()));
        }
        query
    };

    let total: i64 = filtered().count().get_result(conn)?;
    let items = filtered()
        .select(Recipe::as_select())
        .order_by((updated_at.desc(), id.desc()))
        .limit(PER_PAGE)
        .offset(offset(page))
        .load(conn)?;
    Ok(Paginated {
        items,
        page: page.max(1),
        total,
    })
}

/// Categories in use by the store's recipes, sorted.
pub fn recipe_categories(conn: &mut Connection, store: StoreId) -> Result<Vec<String>> {
    use super::schema::recipes::dsl::*;

    let found: Vec<Option<String>> = recipes
        .filter(store_id.eq(store))
        .select(category)
        .distinct()
        .order_by(category.asc())
        .load(conn)?;
    Ok(found.into_iter().flatten().collect())
}

fn get_recipe_row(conn: &mut Connection, store: StoreId, recipe: RecipeId) -> Result<Recipe> {
    use super::schema::recipes::dsl::*;

    recipes
        .select(Recipe::as_select())
        .filter(store_id.eq(store))
        .filter(id.eq(recipe))
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound("recipe"))
}

pub fn get_recipe(
    conn: &mut Connection,
    store: StoreId,
    recipe_id: RecipeId,
) -> Result<RecipeDetail> {
    use super::schema::{ingredients, recipe_ingredients};
    use diesel::BelongingToDsl as _;

    let recipe = get_recipe_row(conn, store, recipe_id)?;
    let ingredients = RecipeIngredient::belonging_to(&recipe)
        .inner_join(ingredients::table)
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .order_by(recipe_ingredients::id.asc())
        .load::<(RecipeIngredient, Ingredient)>(conn)?
        .into_iter()
        .map(|(usage, ingredient)| IngredientLine {
            id: usage.id,
            quantity: usage.quantity,
            ingredient,
        })
        .collect();

    Ok(RecipeDetail {
        recipe,
        ingredients,
    })
}

pub fn add_recipe(conn: &mut Connection, store: StoreId, input: &RecipeInput) -> Result<RecipeId> {
    use super::schema::recipes::dsl::*;

    let new_id = diesel::insert_into(recipes)
        .values((store_id.eq(store), input))
        .returning(id)
        .get_result(conn)?;
    log::info!("added recipe {:?} ({new_id}) to store {store}", input.product_name);
    Ok(new_id)
}

pub fn update_recipe(
    conn: &mut Connection,
    store: StoreId,
    edit_id: RecipeId,
    input: &RecipeInput,
) -> Result<()> {
    use super::schema::recipes::dsl::*;

    let updated = diesel::update(recipes)
        .filter(store_id.eq(store))
        .filter(id.eq(edit_id))
        .set((input, updated_at.eq(now)))
        .execute(conn)?;
    if updated == 0 {
        return Err(Error::NotFound("recipe"));
    }
    Ok(())
}

pub fn delete_recipe(conn: &mut Connection, store: StoreId, delete_id: RecipeId) -> Result<()> {
    use super::schema::recipes::dsl::*;

    let deleted = diesel::delete(recipes.filter(store_id.eq(store)).filter(id.eq(delete_id)))
        .execute(conn)?;
    if deleted == 0 {
        return Err(Error::NotFound("recipe"));
    }
    log::info!("deleted recipe {delete_id}");
    Ok(())
}

fn touch_recipe(conn: &mut Connection, recipe: RecipeId) -> Result<()> {
    use super::schema::recipes::dsl::*;

    diesel::update(recipes.filter(id.eq(recipe)))
        .set(updated_at.eq(now))
        .execute(conn)?;
    Ok(())
}

/// Finds the recipe a join row belongs to, checking it is one of the store's recipes.
fn recipe_of_line(
    conn: &mut Connection,
    store: StoreId,
    line: RecipeIngredientId,
) -> Result<RecipeId> {
    use super::schema::{recipe_ingredients, recipes};

    recipe_ingredients::table
        .inner_join(recipes::table)
        .filter(recipe_ingredients::id.eq(line))
        .filter(recipes::store_id.eq(store))
        .select(recipes::id)
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound("recipe ingredient"))
}

pub fn add_recipe_ingredient(
    conn: &mut Connection,
    store: StoreId,
    new_recipe_id: RecipeId,
    new_ingredient_id: IngredientId,
    new_quantity: f64,
) -> Result<RecipeIngredientId> {
    get_recipe_row(conn, store, new_recipe_id)?;
    get_ingredient(conn, store, new_ingredient_id)?;

    use super::schema::recipe_ingredients::dsl::*;
    let new_id = diesel::insert_into(recipe_ingredients)
        .values((
            recipe_id.eq(new_recipe_id),
            ingredient_id.eq(new_ingredient_id),
            quantity.eq(new_quantity),
        ))
        .returning(id)
        .get_result(conn)?;
    touch_recipe(conn, new_recipe_id)?;
    Ok(new_id)
}

pub fn edit_recipe_ingredient(
    conn: &mut Connection,
    store: StoreId,
    line: RecipeIngredientId,
    new_ingredient_id: IngredientId,
    new_quantity: f64,
) -> Result<()> {
    let recipe = recipe_of_line(conn, store, line)?;
    get_ingredient(conn, store, new_ingredient_id)?;

    use super::schema::recipe_ingredients::dsl::*;
    diesel::update(recipe_ingredients)
        .filter(id.eq(line))
        .set((ingredient_id.eq(new_ingredient_id), quantity.eq(new_quantity)))
        .execute(conn)?;
    touch_recipe(conn, recipe)
}

pub fn delete_recipe_ingredient(
    conn: &mut Connection,
    store: StoreId,
    line: RecipeIngredientId,
) -> Result<()> {
    let recipe = recipe_of_line(conn, store, line)?;

    use super::schema::recipe_ingredients::dsl::*;
    diesel::delete(recipe_ingredients)
        .filter(id.eq(line))
        .execute(conn)?;
    touch_recipe(conn, recipe)
}

// Cost settings

pub fn get_cost_setting(conn: &mut Connection, store: StoreId) -> Result<Option<CostSetting>> {
    use super::schema::cost_settings::dsl::*;

    Ok(cost_settings
        .select(CostSetting::as_select())
        .filter(store_id.eq(store))
        .first(conn)
        .optional()?)
}

/// Returns the store's cost setting, creating the default one if it went missing.
pub fn ensure_cost_setting(conn: &mut Connection, store: StoreId) -> Result<CostSetting> {
    if let Some(setting) = get_cost_setting(conn, store)? {
        return Ok(setting);
    }

    use super::schema::cost_settings::dsl::*;
    Ok(diesel::insert_into(cost_settings)
        .values((store_id.eq(store), profit_margin.eq(30.0)))
        .returning(CostSetting::as_returning())
        .get_result(conn)?)
}

pub fn update_profit_margin(conn: &mut Connection, store: StoreId, new_margin: f64) -> Result<()> {
    ensure_cost_setting(conn, store)?;

    use super::schema::cost_settings::dsl::*;
    diesel::update(cost_settings)
        .filter(store_id.eq(store))
        .set((profit_margin.eq(new_margin), updated_at.eq(now)))
        .execute(conn)?;
    log::info!("store {store} profit margin set to {new_margin}%");
    Ok(())
}

// Custom cost items

pub fn list_custom_cost_items(
    conn: &mut Connection,
    store: StoreId,
) -> Result<Vec<CustomCostItem>> {
    use super::schema::custom_cost_items::dsl::*;

    Ok(custom_cost_items
        .select(CustomCostItem::as_select())
        .filter(store_id.eq(store))
        .order_by((display_order.asc(), id.asc()))
        .load(conn)?)
}

/// Everything besides the recipe itself that goes into costing the store's recipes.
pub fn store_costs(conn: &mut Connection, store: StoreId) -> Result<StoreCosts> {
    Ok(StoreCosts {
        cost_setting: get_cost_setting(conn, store)?,
        custom_items: list_custom_cost_items(conn, store)?,
    })
}

pub fn get_custom_cost_item(
    conn: &mut Connection,
    store: StoreId,
    item: CustomCostItemId,
) -> Result<CustomCostItem> {
    use super::schema::custom_cost_items::dsl::*;

    custom_cost_items
        .select(CustomCostItem::as_select())
        .filter(store_id.eq(store))
        .filter(id.eq(item))
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound("custom cost item"))
}

/// Adds the item at the end of the store's display order.
pub fn add_custom_cost_item(
    conn: &mut Connection,
    store: StoreId,
    input: &CustomCostItemInput,
) -> Result<CustomCostItemId> {
    use super::schema::custom_cost_items::dsl::*;

    conn.transaction::<_, Error, _>(|conn| {
        let max_order: Option<i32> = custom_cost_items
            .filter(store_id.eq(store))
            .select(diesel::dsl::max(display_order))
            .first(conn)?;
        let new_id = diesel::insert_into(custom_cost_items)
            .values((
                store_id.eq(store),
                display_order.eq(max_order.unwrap_or(0) + 1),
                input,
            ))
            .returning(id)
            .get_result(conn)?;
        log::info!("added custom cost item {:?} ({new_id}) to store {store}", input.name);
        Ok(new_id)
    })
}

pub fn update_custom_cost_item(
    conn: &mut Connection,
    store: StoreId,
    edit_id: CustomCostItemId,
    input: &CustomCostItemInput,
) -> Result<()> {
    use super::schema::custom_cost_items::dsl::*;

    let updated = diesel::update(custom_cost_items)
        .filter(store_id.eq(store))
        .filter(id.eq(edit_id))
        .set((input, updated_at.eq(now)))
        .execute(conn)?;
    if updated == 0 {
        return Err(Error::NotFound("custom cost item"));
    }
    Ok(())
}

/// Flips the item's active flag and returns the new value.
pub fn toggle_custom_cost_item(
    conn: &mut Connection,
    store: StoreId,
    item: CustomCostItemId,
) -> Result<bool> {
    let current = get_custom_cost_item(conn, store, item)?;

    use super::schema::custom_cost_items::dsl::*;
    diesel::update(custom_cost_items)
        .filter(id.eq(item))
        .set((is_active.eq(!current.is_active), updated_at.eq(now)))
        .execute(conn)?;
    Ok(!current.is_active)
}

pub fn delete_custom_cost_item(
    conn: &mut Connection,
    store: StoreId,
    item: CustomCostItemId,
) -> Result<()> {
    use super::schema::custom_cost_items::dsl::*;

    let deleted = diesel::delete(custom_cost_items.filter(store_id.eq(store)).filter(id.eq(item)))
        .execute(conn)?;
    if deleted == 0 {
        return Err(Error::NotFound("custom cost item"));
    }
    Ok(())
}

/// Sets `display_order` to each id's position in `order`. Ids of other stores are ignored.
/// Runs as one transaction.
pub fn reorder_custom_cost_items(
    conn: &mut Connection,
    store: StoreId,
    order: &[CustomCostItemId],
) -> Result<()> {
    use super::schema::custom_cost_items::dsl::*;

    conn.transaction::<_, Error, _>(|conn| {
        for (position, item) in order.iter().enumerate() {
            let position = i32::try_from(position).unwrap_or(i32::MAX);
            diesel::update(custom_cost_items)
                .filter(store_id.eq(store))
                .filter(id.eq(*item))
                .set(display_order.eq(position))
                .execute(conn)?;
        }
        Ok(())
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Swaps the item with its neighbour in display order. Moving past either end does nothing.
pub fn move_custom_cost_item(
    conn: &mut Connection,
    store: StoreId,
    item: CustomCostItemId,
    direction: Direction,
) -> Result<()> {
    let mut order: Vec<_> = list_custom_cost_items(conn, store)?
        .into_iter()
        .map(|i| i.id)
        .collect();
    let position = order
        .iter()
        .position(|i| *i == item)
        .ok_or(Error::NotFound("custom cost item"))?;
    let other = match direction {
        Direction::Up if position > 0 => position - 1,
        Direction::Down if position + 1 < order.len() => position + 1,
        _ => return Ok(()),
    };
    order.swap(position, other);
    reorder_custom_cost_items(conn, store, &order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CalculationType, Unit};
    use crate::database::test_connection;

    fn flour() -> IngredientInput {
        IngredientInput {
            name: "強力粉".into(),
            purchase_price: 2000.0,
            purchase_quantity: 1.0,
            purchase_unit: Unit::Kilograms,
            usage_unit: Unit::Grams,
            supplier: None,
            is_allergen: true,
            allergen_type: Some("小麦".into()),
        }
    }

    fn item(name: &str) -> CustomCostItemInput {
        CustomCostItemInput {
            name: name.into(),
            calculation_type: CalculationType::Fixed,
            amount: 10.0,
            is_active: true,
            description: None,
        }
    }

    #[test]
    fn register_store_creates_cost_setting() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "bakery", "Bakery").unwrap();

        let setting = get_cost_setting(&mut conn, store.id).unwrap().unwrap();
        assert_eq!(setting.profit_margin, 30.0);

        assert!(matches!(
            register_store(&mut conn, "bakery", "Other"),
            Err(Error::LoginIdTaken(_))
        ));
        assert_eq!(
            find_store_by_login(&mut conn, "bakery").unwrap().unwrap().id,
            store.id
        );
    }

    #[test]
    fn stores_are_isolated() {
        let mut conn = test_connection();
        let a = register_store(&mut conn, "a", "A").unwrap().id;
        let b = register_store(&mut conn, "b", "B").unwrap().id;

        let flour_id = add_ingredient(&mut conn, a, &flour()).unwrap();
        assert_eq!(list_ingredients(&mut conn, b, "", 1).unwrap().total, 0);
        assert!(matches!(
            get_ingredient(&mut conn, b, flour_id),
            Err(Error::NotFound(_))
        ));
        assert!(delete_ingredient(&mut conn, b, flour_id).is_err());

        let recipe = add_recipe(&mut conn, b, &RecipeInput::named("食パン")).unwrap();
        assert!(add_recipe_ingredient(&mut conn, b, recipe, flour_id, 100.0).is_err());
    }

    #[test]
    fn ingredient_search_and_paging() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        for n in 0..25 {
            let input = IngredientInput {
                name: format!("粉{n}"),
                ..flour()
            };
            add_ingredient(&mut conn, store, &input).unwrap();
        }
        add_ingredient(
            &mut conn,
            store,
            &IngredientInput {
                name: "バター".into(),
                ..flour()
            },
        )
        .unwrap();

        let first = list_ingredients(&mut conn, store, "", 1).unwrap();
        assert_eq!(first.total, 26);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.pages(), 2);
        assert!(first.has_next());
        assert_eq!(first.items[0].name, "バター", "newest first");

        let second = list_ingredients(&mut conn, store, "", 2).unwrap();
        assert_eq!(second.items.len(), 6);
        assert!(!second.has_next());

        let found = list_ingredients(&mut conn, store, "バタ", 1).unwrap();
        assert_eq!(found.total, 1);
    }

    #[test]
    fn search_matches_wildcards_literally() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        for name in ["強力粉", "カカオ70%チョコ", "A_バター", "AXバター"] {
            let input = IngredientInput {
                name: name.into(),
                ..flour()
            };
            add_ingredient(&mut conn, store, &input).unwrap();
        }

        let names = |conn: &mut Connection, search: &str| -> Vec<String> {
            list_ingredients(conn, store, search, 1)
                .unwrap()
                .items
                .into_iter()
                .map(|i| i.name)
                .collect()
        };
        assert_eq!(names(&mut conn, "%"), ["カカオ70%チョコ"]);
        assert_eq!(names(&mut conn, "_"), ["A_バター"]);
        assert_eq!(names(&mut conn, "A_"), ["A_バター"]);
        assert_eq!(names(&mut conn, "バター").len(), 2);

        let mut cache = None;
        let found = search_ingredients(&mut conn, store, &mut cache, "%");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn ingredient_in_use_cannot_be_deleted() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        let flour_id = add_ingredient(&mut conn, store, &flour()).unwrap();
        let recipe = add_recipe(&mut conn, store, &RecipeInput::named("食パン")).unwrap();
        let line = add_recipe_ingredient(&mut conn, store, recipe, flour_id, 250.0).unwrap();
        let second = add_recipe_ingredient(&mut conn, store, recipe, flour_id, 50.0).unwrap();
        assert_eq!(ingredient_usage_count(&mut conn, flour_id).unwrap(), 1);

        match delete_ingredient(&mut conn, store, flour_id) {
            Err(Error::IngredientInUse { name, recipes }) => {
                assert_eq!(name, "強力粉");
                assert_eq!(recipes, 1);
            }
            other => panic!("unexpected {other:?}"),
        }

        delete_recipe_ingredient(&mut conn, store, line).unwrap();
        delete_recipe_ingredient(&mut conn, store, second).unwrap();
        delete_ingredient(&mut conn, store, flour_id).unwrap();
        assert_eq!(list_ingredients(&mut conn, store, "", 1).unwrap().total, 0);
    }

    #[test]
    fn recipe_detail_lines() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        let flour_id = add_ingredient(&mut conn, store, &flour()).unwrap();
        let butter_id = add_ingredient(
            &mut conn,
            store,
            &IngredientInput {
                name: "バター".into(),
                allergen_type: Some("乳".into()),
                ..flour()
            },
        )
        .unwrap();
        let recipe = add_recipe(&mut conn, store, &RecipeInput::named("クロワッサン")).unwrap();
        add_recipe_ingredient(&mut conn, store, recipe, flour_id, 500.0).unwrap();
        add_recipe_ingredient(&mut conn, store, recipe, butter_id, 300.0).unwrap();

        let detail = get_recipe(&mut conn, store, recipe).unwrap();
        let names: Vec<_> = detail
            .ingredients
            .iter()
            .map(|l| l.ingredient.name.as_str())
            .collect();
        assert_eq!(names, ["強力粉", "バター"]);

        let flour_line = detail.ingredients[0].id;
        delete_recipe_ingredient(&mut conn, store, flour_line).unwrap();
        let detail = get_recipe(&mut conn, store, recipe).unwrap();
        assert_eq!(detail.ingredients.len(), 1);
        assert_eq!(detail.ingredients[0].quantity, 300.0);

        delete_recipe(&mut conn, store, recipe).unwrap();
        assert_eq!(ingredient_usage_count(&mut conn, butter_id).unwrap(), 0);
    }

    #[test]
    fn recipe_category_filter() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        for (name, category) in [
            ("食パン", "食パン"),
            ("メロンパン", "菓子パン"),
            ("あんパン", "菓子パン"),
        ] {
            let input = RecipeInput {
                category: Some(category.into()),
                ..RecipeInput::named(name)
            };
            add_recipe(&mut conn, store, &input).unwrap();
        }

        let sweet = list_recipes(&mut conn, store, "", Some("菓子パン"), 1).unwrap();
        assert_eq!(sweet.total, 2);
        let melon = list_recipes(&mut conn, store, "メロン", Some("菓子パン"), 1).unwrap();
        assert_eq!(melon.total, 1);
        assert_eq!(
            recipe_categories(&mut conn, store).unwrap(),
            ["菓子パン", "食パン"]
        );
    }

    #[test]
    fn unknown_calculation_type_is_rejected() {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};
        use diesel::RunQueryDsl as _;

        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        let insert = |conn: &mut Connection, kind: &str| {
            diesel::sql_query(format!(
                "INSERT INTO custom_cost_items (store_id, name, calculation_type, amount) \
                 VALUES ({store}, 'x', '{kind}', 1)"
            ))
            .execute(conn)
        };

        assert!(matches!(
            insert(&mut conn, "per_batch"),
            Err(DieselError::DatabaseError(
                DatabaseErrorKind::CheckViolation,
                _
            ))
        ));
        assert!(list_custom_cost_items(&mut conn, store).unwrap().is_empty());

        insert(&mut conn, "per_unit").unwrap();
        let items = list_custom_cost_items(&mut conn, store).unwrap();
        assert_eq!(items[0].calculation_type, CalculationType::PerUnit);
    }

    #[test]
    fn custom_cost_item_ordering() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        let a = add_custom_cost_item(&mut conn, store, &item("a")).unwrap();
        let b = add_custom_cost_item(&mut conn, store, &item("b")).unwrap();
        let c = add_custom_cost_item(&mut conn, store, &item("c")).unwrap();

        let ids = |conn: &mut Connection| -> Vec<_> {
            list_custom_cost_items(conn, store)
                .unwrap()
                .into_iter()
                .map(|i| i.id)
                .collect()
        };
        assert_eq!(ids(&mut conn), [a, b, c]);

        reorder_custom_cost_items(&mut conn, store, &[c, a, b]).unwrap();
        assert_eq!(ids(&mut conn), [c, a, b]);
        reorder_custom_cost_items(&mut conn, store, &[c, a, b]).unwrap();
        assert_eq!(ids(&mut conn), [c, a, b]);

        move_custom_cost_item(&mut conn, store, b, Direction::Up).unwrap();
        assert_eq!(ids(&mut conn), [c, b, a]);
        move_custom_cost_item(&mut conn, store, c, Direction::Up).unwrap();
        assert_eq!(ids(&mut conn), [c, b, a]);

        assert!(!toggle_custom_cost_item(&mut conn, store, a).unwrap());
        assert!(toggle_custom_cost_item(&mut conn, store, a).unwrap());

        delete_custom_cost_item(&mut conn, store, b).unwrap();
        assert_eq!(ids(&mut conn), [c, a]);
    }

    #[test]
    fn store_costs_price_a_recipe() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        let flour = add_ingredient(&mut conn, store, &flour()).unwrap();
        let recipe = add_recipe(
            &mut conn,
            store,
            &RecipeInput {
                production_quantity: 10,
                ..RecipeInput::named("食パン")
            },
        )
        .unwrap();
        add_recipe_ingredient(&mut conn, store, recipe, flour, 250.0).unwrap();
        add_custom_cost_item(
            &mut conn,
            store,
            &CustomCostItemInput {
                calculation_type: CalculationType::PerUnit,
                amount: 2.0,
                ..item("包装")
            },
        )
        .unwrap();

        let detail = get_recipe(&mut conn, store, recipe).unwrap();
        let costs = store_costs(&mut conn, store).unwrap();
        let calc = costs.calculator();
        assert_eq!(calc.material_cost(&detail), 500.0);
        assert_eq!(calc.total_cost(&detail), 520.0);
        assert_eq!(calc.unit_cost(&detail), 52.0);
    }

    #[test]
    fn reorder_ignores_other_stores() {
        let mut conn = test_connection();
        let a = register_store(&mut conn, "a", "A").unwrap().id;
        let b = register_store(&mut conn, "b", "B").unwrap().id;
        let mine = add_custom_cost_item(&mut conn, a, &item("mine")).unwrap();
        let theirs = add_custom_cost_item(&mut conn, b, &item("theirs")).unwrap();

        reorder_custom_cost_items(&mut conn, a, &[theirs, mine]).unwrap();
        assert_eq!(
            get_custom_cost_item(&mut conn, b, theirs)
                .unwrap()
                .display_order,
            1
        );
        assert_eq!(
            get_custom_cost_item(&mut conn, a, mine).unwrap().display_order,
            1
        );
    }

    #[test]
    fn deleting_store_cascades() {
        let mut conn = test_connection();
        let store = register_store(&mut conn, "s", "S").unwrap().id;
        add_ingredient(&mut conn, store, &flour()).unwrap();
        add_custom_cost_item(&mut conn, store, &item("a")).unwrap();

        delete_store(&mut conn, store).unwrap();
        assert!(get_cost_setting(&mut conn, store).unwrap().is_none());
        assert!(list_custom_cost_items(&mut conn, store).unwrap().is_empty());
        assert_eq!(list_ingredients(&mut conn, store, "", 1).unwrap().total, 0);
    }
}
