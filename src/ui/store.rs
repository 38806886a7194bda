// Copyright 2023 Remi Bernotavicius

use super::{new_info_toast, report};
use crate::database;
use crate::database::models::{Store, StoreId};
use crate::database::query;
use eframe::egui;

pub enum UpdateEvent {
    None,
    Closed,
    Selected(Store),
    Deleted(StoreId),
}

pub struct StoreWindow {
    stores: Vec<Store>,
    edit_mode: bool,
    new_login_id: String,
    new_store_name: String,
}

impl StoreWindow {
    pub fn new(conn: &mut database::Connection, toasts: &mut egui_toast::Toasts) -> Self {
        Self {
            stores: report(toasts, query::list_stores(conn)).unwrap_or_default(),
            edit_mode: false,
            new_login_id: String::new(),
            new_store_name: String::new(),
        }
    }

    fn register(
        &mut self,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) -> Option<Store> {
        let login_id = self.new_login_id.trim();
        let store_name = self.new_store_name.trim();
        if login_id.is_empty() || store_name.is_empty() {
            toasts.add(super::new_error_toast(
                "A login id and a store name are required",
            ));
            return None;
        }
        let store = report(toasts, query::register_store(conn, login_id, store_name))?;
        toasts.add(new_info_toast(format!("Registered {}", store.store_name)));
        self.new_login_id.clear();
        self.new_store_name.clear();
        Some(store)
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) -> UpdateEvent {
        let mut open = true;
        let mut event = UpdateEvent::None;
        let mut refresh_self = false;
        egui::Window::new("Stores")
            .open(&mut open)
            .show(ctx, |ui| {
                egui::Grid::new("stores grid").show(ui, |ui| {
                    ui.label("Login ID");
                    ui.label("Name");
                    ui.end_row();

                    for store in &self.stores {
                        ui.label(&store.login_id);
                        if ui.button(&store.store_name).clicked() {
                            event = UpdateEvent::Selected(store.clone());
                        }
                        if self.edit_mode && ui.button("Delete").clicked() {
                            if report(toasts, query::delete_store(conn, store.id)).is_some() {
                                event = UpdateEvent::Deleted(store.id);
                                refresh_self = true;
                            }
                        }
                        ui.end_row();
                    }
                });
                if self.stores.is_empty() {
                    ui.label("No stores yet, register one below");
                }
                ui.separator();
                egui::Grid::new("register store grid").show(ui, |ui| {
                    ui.label("Login ID:");
                    ui.text_edit_singleline(&mut self.new_login_id);
                    ui.end_row();
                    ui.label("Store Name:");
                    ui.text_edit_singleline(&mut self.new_store_name);
                    ui.end_row();
                });
                ui.horizontal(|ui| {
                    ui.toggle_value(&mut self.edit_mode, "Edit");
                    if ui.button("Register").clicked() {
                        if let Some(store) = self.register(conn, toasts) {
                            event = UpdateEvent::Selected(store);
                        }
                    }
                });
            });

        if refresh_self {
            *self = Self {
                edit_mode: self.edit_mode,
                ..Self::new(conn, toasts)
            };
        }
        if !open {
            return UpdateEvent::Closed;
        }
        event
    }
}
