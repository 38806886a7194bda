// Copyright 2023 Remi Bernotavicius

use super::{recipe::RecipeWindow, report};
use crate::database;
use crate::database::models::{Recipe, RecipeId, StoreId};
use crate::database::query::{self, Paginated};
use crate::forms::RecipeInput;
use eframe::egui;
use std::collections::HashMap;

pub struct RecipeListWindow {
    store: StoreId,
    page: Paginated<Recipe>,
    search: String,
    category: Option<String>,
    categories: Vec<String>,
    edit_mode: bool,
    new_recipe_name: String,
}

impl RecipeListWindow {
    pub fn new(
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        store: StoreId,
    ) -> Self {
        let mut window = Self {
            store,
            page: Paginated {
                items: vec![],
                page: 1,
                total: 0,
            },
            search: String::new(),
            category: None,
            categories: vec![],
            edit_mode: false,
            new_recipe_name: String::new(),
        };
        window.load_page(conn, toasts, 1);
        window
    }

    fn load_page(
        &mut self,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        page: i64,
    ) {
        let result = query::list_recipes(
            conn,
            self.store,
            &self.search,
            self.category.as_deref(),
            page,
        );
        if let Some(page) = report(toasts, result) {
            self.page = page;
        }
        if let Some(categories) = report(toasts, query::recipe_categories(conn, self.store)) {
            self.categories = categories;
        }
    }

    /// Reloads the current page, after a recipe was edited elsewhere.
    pub fn refresh(&mut self, conn: &mut database::Connection, toasts: &mut egui_toast::Toasts) {
        self.load_page(conn, toasts, self.page.page);
    }

    fn update_filters(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label("Search:");
            changed |= ui.text_edit_singleline(&mut self.search).changed();

            let selected = self.category.clone();
            egui::ComboBox::from_id_salt(("recipe category filter", self.store))
                .selected_text(selected.as_deref().unwrap_or("All categories"))
                .show_ui(ui, |ui| {
                    changed |= ui
                        .selectable_value(&mut self.category, None, "All categories")
                        .changed();
                    for category in &self.categories {
                        changed |= ui
                            .selectable_value(
                                &mut self.category,
                                Some(category.clone()),
                                category.as_str(),
                            )
                            .changed();
                    }
                });
        });
        changed
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        recipe_windows: &mut HashMap<RecipeId, RecipeWindow>,
    ) -> bool {
        let mut open = true;
        let mut goto_page = None;
        egui::Window::new("Recipes")
            .id(egui::Id::new(("recipe list", self.store)))
            .open(&mut open)
            .show(ctx, |ui| {
                if self.update_filters(ui) {
                    goto_page = Some(1);
                }
                ui.separator();

                let scroll_height = ui.available_height() - 70.0;
                egui::ScrollArea::vertical()
                    .auto_shrink(false)
                    .max_height(scroll_height)
                    .show(ui, |ui| {
                        egui::Grid::new(("recipe list grid", self.store))
                            .striped(true)
                            .show(ui, |ui| {
                                for recipe in &self.page.items {
                                    let mut shown = recipe_windows.contains_key(&recipe.id);
                                    ui.toggle_value(&mut shown, recipe.product_name.clone());
                                    ui.label(recipe.category.as_deref().unwrap_or(""));

                                    if self.edit_mode && ui.button("Delete").clicked() {
                                        let result =
                                            query::delete_recipe(conn, self.store, recipe.id);
                                        if report(toasts, result).is_some() {
                                            goto_page.get_or_insert(self.page.page);
                                            shown = false;
                                        }
                                    }
                                    ui.end_row();

                                    if shown && !recipe_windows.contains_key(&recipe.id) {
                                        if let Some(window) = RecipeWindow::new(
                                            conn,
                                            toasts,
                                            self.store,
                                            recipe.id,
                                            false,
                                        ) {
                                            recipe_windows.insert(recipe.id, window);
                                        }
                                    } else if !shown {
                                        recipe_windows.remove(&recipe.id);
                                    }
                                }
                            });
                        if self.page.items.is_empty() {
                            ui.label("No recipes");
                        }
                    });

                ui.horizontal(|ui| {
                    let page = self.page.page;
                    if ui
                        .add_enabled(self.page.has_prev(), egui::Button::new("Previous"))
                        .clicked()
                    {
                        goto_page = Some(page - 1);
                    }
                    ui.label(format!("Page {page} of {}", self.page.pages()));
                    if ui
                        .add_enabled(self.page.has_next(), egui::Button::new("Next"))
                        .clicked()
                    {
                        goto_page = Some(page + 1);
                    }
                });
                ui.separator();
                ui.horizontal(|ui| {
                    ui.toggle_value(&mut self.edit_mode, "Edit");
                    if self.edit_mode {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.new_recipe_name)
                                .hint_text("new recipe name")
                                .desired_width(ui.available_width() - 100.0),
                        );
                        if ui.button("Add").clicked() {
                            let name = self.new_recipe_name.trim();
                            let result = if name.is_empty() {
                                Err("A recipe needs a name".to_owned())
                            } else {
                                query::add_recipe(conn, self.store, &RecipeInput::named(name))
                                    .map_err(|e| e.to_string())
                            };
                            if let Some(id) = report(toasts, result) {
                                self.new_recipe_name.clear();
                                goto_page = Some(1);
                                if let Some(window) =
                                    RecipeWindow::new(conn, toasts, self.store, id, true)
                                {
                                    recipe_windows.insert(id, window);
                                }
                            }
                        }
                    }
                });
            });

        if let Some(page) = goto_page {
            self.load_page(conn, toasts, page);
        }

        !open
    }
}
