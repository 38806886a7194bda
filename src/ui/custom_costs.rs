// Copyright 2023 Remi Bernotavicius

use super::{new_info_toast, report};
use crate::database;
use crate::database::models::{CalculationType, CustomCostItem, CustomCostItemId, StoreId};
use crate::database::query::{self, Direction};
use crate::forms::CustomCostItemForm;
use eframe::egui;

pub enum UpdateEvent {
    None,
    Closed,
    Changed,
}

struct ItemBeingEdited {
    id: Option<CustomCostItemId>,
    form: CustomCostItemForm,
}

fn form_ui(ui: &mut egui::Ui, form: &mut CustomCostItemForm) {
    egui::Grid::new("custom cost item form").show(ui, |ui| {
        ui.label("Name:");
        ui.text_edit_singleline(&mut form.name);
        ui.end_row();

        ui.label("Calculation:");
        egui::ComboBox::from_id_salt("custom cost calculation type")
            .selected_text(form.calculation_type.to_string())
            .show_ui(ui, |ui| {
                for t in CalculationType::iter() {
                    ui.selectable_value(&mut form.calculation_type, t, t.to_string());
                }
            });
        ui.end_row();

        ui.label("Amount:");
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut form.amount).desired_width(80.0));
            ui.label(form.calculation_type.amount_suffix());
        });
        ui.end_row();

        ui.label("Description:");
        ui.text_edit_singleline(&mut form.description);
        ui.end_row();

        ui.label("");
        ui.checkbox(&mut form.is_active, "Active");
        ui.end_row();
    });
}

enum Action {
    Toggle(CustomCostItemId),
    Move(CustomCostItemId, Direction),
    Delete(CustomCostItemId),
}

pub struct CustomCostsWindow {
    store: StoreId,
    items: Vec<CustomCostItem>,
    edit_mode: bool,
    item_being_edited: Option<ItemBeingEdited>,
}

impl CustomCostsWindow {
    pub fn new(
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        store: StoreId,
    ) -> Self {
        Self {
            store,
            items: report(toasts, query::list_custom_cost_items(conn, store)).unwrap_or_default(),
            edit_mode: false,
            item_being_edited: None,
        }
    }

    fn apply(
        &self,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        action: Action,
    ) -> bool {
        let result = match action {
            Action::Toggle(id) => query::toggle_custom_cost_item(conn, self.store, id).map(|_| ()),
            Action::Move(id, direction) => {
                query::move_custom_cost_item(conn, self.store, id, direction)
            }
            Action::Delete(id) => query::delete_custom_cost_item(conn, self.store, id),
        };
        report(toasts, result).is_some()
    }

    fn save(&mut self, conn: &mut database::Connection, toasts: &mut egui_toast::Toasts) -> bool {
        let Some(editing) = &self.item_being_edited else {
            return false;
        };
        let Some(input) = report(toasts, editing.form.validate()) else {
            return false;
        };
        let saved = match editing.id {
            Some(id) => report(
                toasts,
                query::update_custom_cost_item(conn, self.store, id, &input),
            )
            .is_some(),
            None => report(
                toasts,
                query::add_custom_cost_item(conn, self.store, &input),
            )
            .is_some(),
        };
        if saved {
            toasts.add(new_info_toast(format!("Saved {}", input.name)));
            self.item_being_edited = None;
        }
        saved
    }

    fn update_table(&mut self, ui: &mut egui::Ui) -> Option<Action> {
        let mut action = None;
        let last = self.items.len().saturating_sub(1);
        egui::Grid::new(("custom costs grid", self.store))
            .striped(true)
            .show(ui, |ui| {
                ui.label("Active");
                ui.label("Name");
                ui.label("Amount");
                ui.label("Description");
                ui.end_row();

                for (i, item) in self.items.iter().enumerate() {
                    let mut active = item.is_active;
                    if ui.checkbox(&mut active, "").changed() {
                        action = Some(Action::Toggle(item.id));
                    }
                    ui.label(&item.name);
                    ui.label(format!(
                        "{} {}",
                        item.amount,
                        item.calculation_type.amount_suffix()
                    ));
                    ui.label(item.description.as_deref().unwrap_or(""));
                    if self.edit_mode {
                        if ui.add_enabled(i > 0, egui::Button::new("⏶")).clicked() {
                            action = Some(Action::Move(item.id, Direction::Up));
                        }
                        if ui.add_enabled(i < last, egui::Button::new("⏷")).clicked() {
                            action = Some(Action::Move(item.id, Direction::Down));
                        }
                        if ui.button("Edit").clicked() {
                            self.item_being_edited = Some(ItemBeingEdited {
                                id: Some(item.id),
                                form: CustomCostItemForm::from_item(item),
                            });
                        }
                        if ui.button("Delete").clicked() {
                            action = Some(Action::Delete(item.id));
                        }
                    }
                    ui.end_row();
                }
            });
        if self.items.is_empty() {
            ui.label("No custom costs");
        }
        action
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) -> UpdateEvent {
        let mut open = true;
        let mut changed = false;
        egui::Window::new("Custom Costs")
            .id(egui::Id::new(("custom costs", self.store)))
            .open(&mut open)
            .show(ctx, |ui| {
                if let Some(action) = self.update_table(ui) {
                    changed |= self.apply(conn, toasts, action);
                }
                ui.separator();
                ui.horizontal(|ui| {
                    ui.toggle_value(&mut self.edit_mode, "Edit");
                    if self.edit_mode
                        && self.item_being_edited.is_none()
                        && ui.button("New Cost").clicked()
                    {
                        self.item_being_edited = Some(ItemBeingEdited {
                            id: None,
                            form: CustomCostItemForm::default(),
                        });
                    }
                });
                if !self.edit_mode {
                    self.item_being_edited = None;
                }

                let mut save = false;
                let mut cancel = false;
                if let Some(editing) = &mut self.item_being_edited {
                    ui.separator();
                    form_ui(ui, &mut editing.form);
                    ui.horizontal(|ui| {
                        save = ui.button("Save").clicked();
                        cancel = ui.button("Cancel").clicked();
                    });
                }
                if cancel {
                    self.item_being_edited = None;
                }
                if save {
                    changed |= self.save(conn, toasts);
                }
            });

        if changed {
            self.items = report(toasts, query::list_custom_cost_items(conn, self.store))
                .unwrap_or_default();
        }
        match (open, changed) {
            (false, _) => UpdateEvent::Closed,
            (true, true) => UpdateEvent::Changed,
            (true, false) => UpdateEvent::None,
        }
    }
}
