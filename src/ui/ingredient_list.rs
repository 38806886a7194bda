// Copyright 2023 Remi Bernotavicius

use super::{new_info_toast, report};
use crate::cost::{unit_conversion::unit_price, yen};
use crate::database;
use crate::database::models::{Ingredient, IngredientId, StoreId, Unit};
use crate::database::query::{self, Paginated};
use crate::forms::{IngredientForm, ALLERGEN_TYPES};
use eframe::egui;

pub enum UpdateEvent {
    Closed,
    IngredientEdited,
}

/// `None` while adding a new ingredient.
struct IngredientBeingEdited {
    id: Option<IngredientId>,
    form: IngredientForm,
}

fn unit_combo(ui: &mut egui::Ui, id_salt: impl std::hash::Hash, unit: &mut Unit) {
    egui::ComboBox::from_id_salt(id_salt)
        .selected_text(unit.to_string())
        .show_ui(ui, |ui| {
            for u in Unit::iter() {
                ui.selectable_value(unit, u, u.to_string());
            }
        });
}

fn form_ui(ui: &mut egui::Ui, form: &mut IngredientForm) {
    egui::Grid::new("ingredient form").show(ui, |ui| {
        ui.label("Name:");
        ui.text_edit_singleline(&mut form.name);
        ui.end_row();

        ui.label("Purchase Price:");
        ui.text_edit_singleline(&mut form.purchase_price);
        ui.end_row();

        ui.label("Purchase Quantity:");
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut form.purchase_quantity).desired_width(80.0));
            unit_combo(ui, "purchase unit", &mut form.purchase_unit);
        });
        ui.end_row();

        ui.label("Usage Unit:");
        unit_combo(ui, "usage unit", &mut form.usage_unit);
        ui.end_row();

        ui.label("Supplier:");
        ui.text_edit_singleline(&mut form.supplier);
        ui.end_row();

        ui.checkbox(&mut form.is_allergen, "Allergen");
        if form.is_allergen {
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut form.allergen_type).desired_width(80.0));
                egui::ComboBox::from_id_salt("allergen type")
                    .selected_text("")
                    .show_ui(ui, |ui| {
                        for allergen in ALLERGEN_TYPES {
                            if ui.selectable_label(false, allergen).clicked() {
                                form.allergen_type = allergen.into();
                            }
                        }
                    });
            });
        }
        ui.end_row();
    });
}

pub struct IngredientListWindow {
    store: StoreId,
    page: Paginated<Ingredient>,
    search: String,
    edit_mode: bool,
    ingredient_being_edited: Option<IngredientBeingEdited>,
}

impl IngredientListWindow {
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
            edit_mode: false,
            ingredient_being_edited: None,
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
        let result = query::list_ingredients(conn, self.store, &self.search, page);
        if let Some(page) = report(toasts, result) {
            self.page = page;
        }
    }

    fn save(
        &mut self,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) -> bool {
        let Some(editing) = &self.ingredient_being_edited else {
            return false;
        };
        let Some(input) = report(toasts, editing.form.validate()) else {
            return false;
        };
        let saved = match editing.id {
            Some(id) => report(
                toasts,
                query::update_ingredient(conn, self.store, id, &input),
            )
            .is_some(),
            None => report(toasts, query::add_ingredient(conn, self.store, &input)).is_some(),
        };
        if saved {
            toasts.add(new_info_toast(format!("Saved {}", input.name)));
            self.ingredient_being_edited = None;
        }
        saved
    }

    fn update_table(
        &mut self,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        ui: &mut egui::Ui,
        refresh_self: &mut bool,
    ) {
        egui::Grid::new(("ingredients grid", self.store))
            .striped(true)
            .show(ui, |ui| {
                ui.label("Name");
                ui.label("Price");
                ui.label("Unit Price");
                ui.label("Supplier");
                ui.label("Allergen");
                ui.end_row();

                for ingredient in &self.page.items {
                    ui.label(&ingredient.name);
                    ui.label(format!(
                        "{}円 / {}{}",
                        yen(ingredient.purchase_price),
                        ingredient.purchase_quantity,
                        ingredient.purchase_unit
                    ));
                    let price = unit_price(
                        ingredient.purchase_price,
                        ingredient.purchase_quantity,
                        ingredient.purchase_unit,
                        ingredient.usage_unit,
                    );
                    ui.label(format!("{price:.2}円 / {}", ingredient.usage_unit));
                    ui.label(ingredient.supplier.as_deref().unwrap_or(""));
                    ui.label(if ingredient.is_allergen {
                        ingredient.allergen_type.as_deref().unwrap_or("yes")
                    } else {
                        ""
                    });
                    if self.edit_mode {
                        if ui.button("Edit").clicked() {
                            self.ingredient_being_edited = Some(IngredientBeingEdited {
                                id: Some(ingredient.id),
                                form: IngredientForm::from_ingredient(ingredient),
                            });
                        }
                        if ui.button("Delete").clicked() {
                            let result = query::delete_ingredient(conn, self.store, ingredient.id);
                            if report(toasts, result).is_some() {
                                *refresh_self = true;
                            }
                        }
                    }
                    ui.end_row();
                }
            });
        if self.page.items.is_empty() {
            ui.label("No ingredients");
        }
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) -> Vec<UpdateEvent> {
        let mut open = true;
        let mut events = vec![];
        let mut refresh_self = false;
        let mut goto_page = None;
        egui::Window::new("Ingredients")
            .id(egui::Id::new(("ingredients", self.store)))
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Search:");
                    if ui.text_edit_singleline(&mut self.search).changed() {
                        goto_page = Some(1);
                    }
                });
                ui.separator();

                let scroll_height = ui.available_height() - 70.0;
                egui::ScrollArea::vertical()
                    .auto_shrink(false)
                    .max_height(scroll_height)
                    .show(ui, |ui| {
                        self.update_table(conn, toasts, ui, &mut refresh_self);
                    });

                ui.horizontal(|ui| {
                    let page = self.page.page;
                    if ui
                        .add_enabled(self.page.has_prev(), egui::Button::new("Previous"))
                        .clicked()
                    {
                        goto_page = Some(page - 1);
                    }
                    ui.label(format!(
                        "Page {page} of {} ({} ingredients)",
                        self.page.pages(),
                        self.page.total
                    ));
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
                    if self.edit_mode
                        && self.ingredient_being_edited.is_none()
                        && ui.button("New Ingredient").clicked()
                    {
                        self.ingredient_being_edited = Some(IngredientBeingEdited {
                            id: None,
                            form: IngredientForm::default(),
                        });
                    }
                });
                if !self.edit_mode {
                    self.ingredient_being_edited = None;
                }

                let mut save = false;
                let mut cancel = false;
                if let Some(editing) = &mut self.ingredient_being_edited {
                    ui.separator();
                    form_ui(ui, &mut editing.form);
                    ui.horizontal(|ui| {
                        save = ui.button("Save").clicked();
                        cancel = ui.button("Cancel").clicked();
                    });
                }
                if cancel {
                    self.ingredient_being_edited = None;
                }
                if save && self.save(conn, toasts) {
                    refresh_self = true;
                    events.push(UpdateEvent::IngredientEdited);
                }
            });

        if refresh_self {
            goto_page.get_or_insert(self.page.page);
        }
        if let Some(page) = goto_page {
            self.load_page(conn, toasts, page);
        }
        if !open {
            events.push(UpdateEvent::Closed);
        }
        events
    }
}
