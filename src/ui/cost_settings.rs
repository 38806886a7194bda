// Copyright 2023 Remi Bernotavicius

use super::{new_info_toast, report};
use crate::database;
use crate::database::models::StoreId;
use crate::database::query;
use crate::forms::parse_profit_margin;
use eframe::egui;

pub enum UpdateEvent {
    None,
    Closed,
    Changed,
}

pub struct CostSettingsWindow {
    store: StoreId,
    profit_margin: String,
}

impl CostSettingsWindow {
    pub fn new(
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        store: StoreId,
    ) -> Self {
        let setting = report(toasts, query::ensure_cost_setting(conn, store));
        Self {
            store,
            profit_margin: setting
                .map(|s| s.profit_margin.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
    ) -> UpdateEvent {
        let mut open = true;
        let mut event = UpdateEvent::None;
        egui::Window::new("Profit Margin")
            .id(egui::Id::new(("cost settings", self.store)))
            .resizable([false, false])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Default margin added to unit cost when a recipe has none of its own.");
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut self.profit_margin).desired_width(60.0));
                    ui.label("%");
                    if ui.button("Save").clicked() {
                        let saved = report(toasts, parse_profit_margin(&self.profit_margin))
                            .and_then(|margin| {
                                let result = query::update_profit_margin(conn, self.store, margin);
                                report(toasts, result)
                            });
                        if saved.is_some() {
                            toasts.add(new_info_toast("Saved profit margin"));
                            event = UpdateEvent::Changed;
                        }
                    }
                });
            });

        if !open {
            return UpdateEvent::Closed;
        }
        event
    }
}
