// Copyright 2023 Remi Bernotavicius

use super::{new_error_toast, new_info_toast, report, search::SearchWidget};
use crate::cost::{self, yen, StoreCosts};
use crate::database;
use crate::database::models::{Ingredient, IngredientLine, RecipeDetail, RecipeId, StoreId};
use crate::database::query::{self, CachedQuery};
use crate::forms::{parse_quantity, RecipeForm, RECIPE_CATEGORIES};
use eframe::egui;

struct LineBeingEdited {
    line: IngredientLine,
    ingredient_name: String,
    ingredient: Option<Ingredient>,
    quantity: String,
    cached_ingredient_search: Option<CachedQuery<Ingredient>>,
}

impl LineBeingEdited {
    fn new(line: &IngredientLine) -> Self {
        Self {
            line: line.clone(),
            ingredient_name: line.ingredient.name.clone(),
            ingredient: Some(line.ingredient.clone()),
            quantity: line.quantity.to_string(),
            cached_ingredient_search: None,
        }
    }
}

pub enum UpdateEvent {
    Closed,
    Edited,
    PrintLabels,
}

pub struct RecipeWindow {
    store: StoreId,
    detail: RecipeDetail,
    costs: StoreCosts,
    form: RecipeForm,

    line_being_edited: Option<LineBeingEdited>,

    new_ingredient_name: String,
    new_ingredient: Option<Ingredient>,
    new_quantity: String,
    cached_ingredient_search: Option<CachedQuery<Ingredient>>,

    edit_mode: bool,
}

impl RecipeWindow {
    pub fn new(
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        store: StoreId,
        recipe_id: RecipeId,
        edit_mode: bool,
    ) -> Option<Self> {
        let detail = report(toasts, query::get_recipe(conn, store, recipe_id))?;
        let costs = report(toasts, query::store_costs(conn, store))?;
        Some(Self {
            store,
            form: RecipeForm::from_recipe(&detail.recipe),
            detail,
            costs,

            line_being_edited: None,

            new_ingredient_name: String::new(),
            new_ingredient: None,
            new_quantity: String::new(),
            cached_ingredient_search: None,

            edit_mode,
        })
    }

    /// Reloads the recipe and the store's costs, after they were edited elsewhere.
    pub fn refresh(&mut self, conn: &mut database::Connection, toasts: &mut egui_toast::Toasts) {
        let id = self.detail.recipe.id;
        if let Some(detail) = report(toasts, query::get_recipe(conn, self.store, id)) {
            self.detail = detail;
        }
        if let Some(costs) = report(toasts, query::store_costs(conn, self.store)) {
            self.costs = costs;
        }
    }

    fn save_line(
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        store: StoreId,
        e: &LineBeingEdited,
    ) -> bool {
        let Some(ingredient) = &e.ingredient else {
            toasts.add(new_error_toast("Couldn't find ingredient"));
            return false;
        };
        let Some(quantity) = report(toasts, parse_quantity(&e.quantity)) else {
            return false;
        };
        let result = query::edit_recipe_ingredient(conn, store, e.line.id, ingredient.id, quantity);
        report(toasts, result).is_some()
    }

    fn update_ingredients(
        &mut self,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        ui: &mut egui::Ui,
    ) -> bool {
        let mut refresh_self = false;
        let store = self.store;
        egui::Grid::new(("ingredient grid", self.detail.recipe.id)).show(ui, |ui| {
            ui.label("Ingredient");
            ui.label("Quantity");
            ui.label("Cost");
            ui.end_row();

            for line in &self.detail.ingredients {
                if let Some(e) = &mut self.line_being_edited {
                    if e.line.id == line.id {
                        ui.add(SearchWidget::new(
                            ("recipe line", line.id),
                            &mut e.ingredient_name,
                            &mut e.ingredient,
                            |query| {
                                query::search_ingredients(
                                    conn,
                                    store,
                                    &mut e.cached_ingredient_search,
                                    query,
                                )
                            },
                        ));
                        ui.horizontal(|ui| {
                            ui.add(egui::TextEdit::singleline(&mut e.quantity).desired_width(60.0));
                            if let Some(ingredient) = &e.ingredient {
                                ui.label(ingredient.usage_unit.to_string());
                            }
                        });
                        ui.label("");
                        if ui.button("Save").clicked() && Self::save_line(conn, toasts, store, e) {
                            refresh_self = true;
                        }
                        ui.end_row();
                        continue;
                    }
                }

                ui.label(&line.ingredient.name);
                ui.label(format!("{} {}", line.quantity, line.ingredient.usage_unit));
                ui.label(format!("{}円", yen(cost::line_cost(line))));
                if self.edit_mode && self.line_being_edited.is_none() {
                    if ui.button("Edit").clicked() {
                        self.line_being_edited = Some(LineBeingEdited::new(line));
                    }
                    if ui.button("Delete").clicked() {
                        let result = query::delete_recipe_ingredient(conn, store, line.id);
                        refresh_self |= report(toasts, result).is_some();
                    }
                }
                ui.end_row();
            }
        });
        if self.detail.ingredients.is_empty() {
            ui.label("No ingredients");
        }

        if self.edit_mode {
            ui.horizontal(|ui| {
                ui.label("Add Ingredient:");
                ui.add(
                    SearchWidget::new(
                        ("new recipe line", self.detail.recipe.id),
                        &mut self.new_ingredient_name,
                        &mut self.new_ingredient,
                        |query| {
                            query::search_ingredients(
                                conn,
                                store,
                                &mut self.cached_ingredient_search,
                                query,
                            )
                        },
                    )
                    .hint_text("search for ingredient"),
                );
                ui.add(
                    egui::TextEdit::singleline(&mut self.new_quantity)
                        .hint_text("quantity")
                        .desired_width(60.0),
                );

                if ui.button("Add").clicked() {
                    if let Some(ingredient) = &self.new_ingredient {
                        if let Some(quantity) = report(toasts, parse_quantity(&self.new_quantity))
                        {
                            let result = query::add_recipe_ingredient(
                                conn,
                                store,
                                self.detail.recipe.id,
                                ingredient.id,
                                quantity,
                            );
                            if report(toasts, result).is_some() {
                                self.new_ingredient_name.clear();
                                self.new_ingredient = None;
                                self.new_quantity.clear();
                                refresh_self = true;
                            }
                        }
                    } else {
                        toasts.add(new_error_toast("Couldn't find ingredient"));
                    }
                }
            });
        }
        refresh_self
    }

    fn update_fields(
        &mut self,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        ui: &mut egui::Ui,
    ) -> bool {
        let recipe = &self.detail.recipe;
        let form = &mut self.form;
        let edit = self.edit_mode;
        let field = |ui: &mut egui::Ui, label: &str, value: &mut String, shown: String| {
            ui.label(label);
            if edit {
                ui.text_edit_singleline(value);
            } else {
                ui.label(shown);
            }
            ui.end_row();
        };
        let or_blank = |v: Option<String>| v.unwrap_or_default();

        egui::Grid::new(("recipe information", recipe.id)).show(ui, |ui| {
            if edit {
                ui.label("Name:");
                ui.text_edit_singleline(&mut form.product_name);
                ui.end_row();
            }

            ui.label("Category:");
            if edit {
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut form.category).desired_width(100.0));
                    egui::ComboBox::from_id_salt(("recipe category", recipe.id))
                        .selected_text("")
                        .show_ui(ui, |ui| {
                            for category in RECIPE_CATEGORIES {
                                if ui.selectable_label(false, category).clicked() {
                                    form.category = category.into();
                                }
                            }
                        });
                });
            } else {
                ui.label(recipe.category.as_deref().unwrap_or(""));
            }
            ui.end_row();

            field(
                ui,
                "Production Quantity:",
                &mut form.production_quantity,
                recipe.production_quantity.to_string(),
            );
            field(
                ui,
                "Production Time (min):",
                &mut form.production_time,
                recipe.production_time.to_string(),
            );
            field(
                ui,
                "Shelf Life (days):",
                &mut form.shelf_life_days,
                or_blank(recipe.shelf_life_days.map(|d| d.to_string())),
            );
            field(
                ui,
                "Profit Margin (%):",
                &mut form.custom_profit_margin,
                or_blank(recipe.custom_profit_margin.map(|m| m.to_string())),
            );
            field(
                ui,
                "Selling Price:",
                &mut form.selling_price,
                or_blank(recipe.selling_price.map(yen)),
            );
        });

        if !edit || !ui.button("Save Recipe").clicked() {
            return false;
        }
        let Some(input) = report(toasts, self.form.validate()) else {
            return false;
        };
        let result = query::update_recipe(conn, self.store, self.detail.recipe.id, &input);
        if report(toasts, result).is_none() {
            return false;
        }
        toasts.add(new_info_toast(format!("Saved {}", input.product_name)));
        true
    }

    fn update_costs(&self, ui: &mut egui::Ui) {
        let breakdown = self.costs.calculator().breakdown(&self.detail);
        let allergens = cost::allergens(&self.detail.ingredients);
        egui::Grid::new(("recipe costs", self.detail.recipe.id))
            .striped(true)
            .show(ui, |ui| {
                let mut row = |label: &str, amount: f64| {
                    ui.label(label);
                    ui.label(format!("{}円", yen(amount)));
                    ui.end_row();
                };
                row("Materials", breakdown.material_cost);
                for overhead in &breakdown.overheads {
                    row(&overhead.name, overhead.amount);
                }
                row("Total", breakdown.total_cost);
                row(
                    &format!("Per Unit (÷{})", breakdown.production_quantity),
                    breakdown.unit_cost,
                );
                let price_label = match (breakdown.manual_price, breakdown.profit_margin) {
                    (true, _) => "Selling Price (manual)".to_owned(),
                    (false, Some(margin)) => format!("Suggested Price ({margin}%)"),
                    (false, None) => "Suggested Price".to_owned(),
                };
                row(&price_label, breakdown.selling_price);
            });
        if !allergens.is_empty() {
            ui.label(format!("Allergens: {}", allergens.join(", ")));
        }
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        let mut events = vec![];
        let mut open = true;
        let mut refresh_self = false;
        egui::Window::new(self.detail.recipe.product_name.clone())
            .id(egui::Id::new(("recipe", self.detail.recipe.id)))
            .open(&mut open)
            .show(ctx, |ui| {
                refresh_self |= self.update_ingredients(conn, toasts, ui);
                ui.separator();
                if self.update_fields(conn, toasts, ui) {
                    refresh_self = true;
                    events.push(UpdateEvent::Edited);
                }
                ui.separator();
                self.update_costs(ui);
                ui.separator();
                ui.horizontal(|ui| {
                    ui.toggle_value(&mut self.edit_mode, "Edit");
                    if !self.edit_mode {
                        self.line_being_edited = None;
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Labels").clicked() {
                            events.push(UpdateEvent::PrintLabels);
                        }
                    });
                });
            });

        if refresh_self {
            self.line_being_edited = None;
            self.refresh(conn, toasts);
            self.form = RecipeForm::from_recipe(&self.detail.recipe);
        }
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
