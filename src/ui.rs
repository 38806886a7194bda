// Copyright 2023 Remi Bernotavicius

use crate::config::Config;
use crate::database;
use crate::database::models::{RecipeId, Store};
use eframe::egui;
use std::collections::HashMap;
use std::mem;
use std::path::PathBuf;

mod about;
mod cost_settings;
mod custom_costs;
mod ingredient_list;
mod labels;
mod recipe;
mod recipe_list;
mod search;
mod store;

use about::AboutWindow;
use cost_settings::CostSettingsWindow;
use custom_costs::CustomCostsWindow;
use ingredient_list::IngredientListWindow;
use labels::LabelWindow;
use recipe::RecipeWindow;
use recipe_list::RecipeListWindow;
use store::StoreWindow;

fn toast(kind: egui_toast::ToastKind, text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    egui_toast::Toast {
        text: text.into(),
        kind,
        options: egui_toast::ToastOptions::default()
            .duration_in_seconds(3.0)
            .show_progress(false)
            .show_icon(true),
        ..Default::default()
    }
}

pub fn new_error_toast(text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    toast(egui_toast::ToastKind::Error, text)
}

pub fn new_info_toast(text: impl Into<egui::WidgetText>) -> egui_toast::Toast {
    toast(egui_toast::ToastKind::Success, text)
}

/// Shows `result`'s error as a toast and logs it, returning the value on success.
pub fn report<T, E: std::fmt::Display>(
    toasts: &mut egui_toast::Toasts,
    result: Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            log::error!("{error}");
            toasts.add(new_error_toast(error.to_string()));
            None
        }
    }
}

/// Windows that only make sense for the selected store.
#[derive(Default)]
struct StoreWindows {
    ingredient_list: Option<IngredientListWindow>,
    recipe_list: Option<RecipeListWindow>,
    recipes: HashMap<RecipeId, RecipeWindow>,
    cost_settings: Option<CostSettingsWindow>,
    custom_costs: Option<CustomCostsWindow>,
    labels: HashMap<RecipeId, LabelWindow>,
}

pub struct BakeryManager {
    conn: database::Connection,
    config: Config,
    data_path: PathBuf,
    toasts: egui_toast::Toasts,
    store: Option<Store>,
    store_window: Option<StoreWindow>,
    windows: StoreWindows,
    about_window: Option<AboutWindow>,
}

impl BakeryManager {
    pub fn new(mut conn: database::Connection, config: Config, data_path: PathBuf) -> Self {
        let mut toasts = egui_toast::Toasts::new()
            .anchor(egui::Align2::RIGHT_BOTTOM, (-10.0, -10.0))
            .direction(egui::Direction::BottomUp);
        let store_window = Some(StoreWindow::new(&mut conn, &mut toasts));
        Self {
            conn,
            config,
            data_path,
            toasts,
            store: None,
            store_window,
            windows: StoreWindows::default(),
            about_window: None,
        }
    }

    fn select_store(&mut self, store: Store) {
        log::info!("selected store {}", store.login_id);
        self.windows = StoreWindows {
            recipe_list: Some(RecipeListWindow::new(
                &mut self.conn,
                &mut self.toasts,
                store.id,
            )),
            ..Default::default()
        };
        self.store = Some(store);
    }

    fn costs_changed(&mut self) {
        for window in self.windows.recipes.values_mut() {
            window.refresh(&mut self.conn, &mut self.toasts);
        }
    }

    fn update_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Stores").clicked() && self.store_window.is_none() {
                        let window = StoreWindow::new(&mut self.conn, &mut self.toasts);
                        self.store_window = Some(window);
                        ui.close_menu();
                    }
                    if ui.button("About").clicked() && self.about_window.is_none() {
                        self.about_window = Some(AboutWindow::new());
                        ui.close_menu();
                    }
                });
                let Some(store) = &self.store else {
                    return;
                };
                let store_id = store.id;
                let windows = &mut self.windows;
                ui.menu_button("Store", |ui| {
                    if ui.button("Ingredients").clicked() && windows.ingredient_list.is_none() {
                        windows.ingredient_list = Some(IngredientListWindow::new(
                            &mut self.conn,
                            &mut self.toasts,
                            store_id,
                        ));
                        ui.close_menu();
                    }
                    if ui.button("Recipes").clicked() && windows.recipe_list.is_none() {
                        windows.recipe_list = Some(RecipeListWindow::new(
                            &mut self.conn,
                            &mut self.toasts,
                            store_id,
                        ));
                        ui.close_menu();
                    }
                    if ui.button("Profit Margin").clicked() && windows.cost_settings.is_none() {
                        windows.cost_settings = Some(CostSettingsWindow::new(
                            &mut self.conn,
                            &mut self.toasts,
                            store_id,
                        ));
                        ui.close_menu();
                    }
                    if ui.button("Custom Costs").clicked() && windows.custom_costs.is_none() {
                        windows.custom_costs = Some(CustomCostsWindow::new(
                            &mut self.conn,
                            &mut self.toasts,
                            store_id,
                        ));
                        ui.close_menu();
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(&store.store_name);
                });
            });
        });
    }

    fn update_store_window(&mut self, ctx: &egui::Context) {
        let Some(window) = &mut self.store_window else {
            return;
        };
        match window.update(ctx, &mut self.conn, &mut self.toasts) {
            store::UpdateEvent::None => {}
            store::UpdateEvent::Closed => self.store_window = None,
            store::UpdateEvent::Selected(store) => {
                self.store_window = None;
                self.select_store(store);
            }
            store::UpdateEvent::Deleted(id) => {
                if self.store.as_ref().is_some_and(|s| s.id == id) {
                    self.store = None;
                    self.windows = StoreWindows::default();
                }
            }
        }
    }

    fn update_ingredient_window(&mut self, ctx: &egui::Context) {
        let Some(window) = &mut self.windows.ingredient_list else {
            return;
        };
        let mut refresh_recipes = false;
        for event in window.update(ctx, &mut self.conn, &mut self.toasts) {
            match event {
                ingredient_list::UpdateEvent::Closed => self.windows.ingredient_list = None,
                ingredient_list::UpdateEvent::IngredientEdited => refresh_recipes = true,
            }
        }
        if refresh_recipes {
            self.costs_changed();
        }
    }

    fn update_recipe_list_window(&mut self, ctx: &egui::Context) {
        if let Some(window) = &mut self.windows.recipe_list {
            if window.update(
                ctx,
                &mut self.conn,
                &mut self.toasts,
                &mut self.windows.recipes,
            ) {
                self.windows.recipe_list = None;
            }
        }
    }

    fn update_recipes(&mut self, ctx: &egui::Context) {
        for (id, mut recipe) in mem::take(&mut self.windows.recipes) {
            let mut closed = false;
            for event in recipe.update(ctx, &mut self.conn, &mut self.toasts) {
                match event {
                    recipe::UpdateEvent::Closed => closed = true,
                    recipe::UpdateEvent::Edited => {
                        if let Some(list) = &mut self.windows.recipe_list {
                            list.refresh(&mut self.conn, &mut self.toasts);
                        }
                    }
                    recipe::UpdateEvent::PrintLabels => {
                        if let Some(store) = &self.store {
                            self.windows.labels.entry(id).or_insert_with(|| {
                                LabelWindow::new(store.clone(), id, &self.config.labels)
                            });
                        }
                    }
                }
            }

            if !closed {
                self.windows.recipes.insert(id, recipe);
            }
        }
    }

    fn update_cost_windows(&mut self, ctx: &egui::Context) {
        let mut changed = false;
        if let Some(window) = &mut self.windows.cost_settings {
            match window.update(ctx, &mut self.conn, &mut self.toasts) {
                cost_settings::UpdateEvent::None => {}
                cost_settings::UpdateEvent::Closed => self.windows.cost_settings = None,
                cost_settings::UpdateEvent::Changed => changed = true,
            }
        }
        if let Some(window) = &mut self.windows.custom_costs {
            match window.update(ctx, &mut self.conn, &mut self.toasts) {
                custom_costs::UpdateEvent::None => {}
                custom_costs::UpdateEvent::Closed => self.windows.custom_costs = None,
                custom_costs::UpdateEvent::Changed => changed = true,
            }
        }
        if changed {
            self.costs_changed();
        }
    }

    fn update_label_windows(&mut self, ctx: &egui::Context) {
        for (id, mut window) in mem::take(&mut self.windows.labels) {
            let closed = window.update(ctx, &mut self.conn, &mut self.toasts, &self.data_path);
            if !closed {
                self.windows.labels.insert(id, window);
            }
        }
    }

    fn update_about_window(&mut self, ctx: &egui::Context) {
        if let Some(window) = &mut self.about_window {
            if window.update(ctx) {
                self.about_window = None;
            }
        }
    }
}

impl eframe::App for BakeryManager {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_menu(ctx);
        self.update_store_window(ctx);
        self.update_ingredient_window(ctx);
        self.update_recipe_list_window(ctx);
        self.update_recipes(ctx);
        self.update_cost_windows(ctx);
        self.update_label_windows(ctx);
        self.update_about_window(ctx);
        self.toasts.show(ctx);
    }
}
