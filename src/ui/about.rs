// Copyright 2023 Remi Bernotavicius

use crate::label::PRESETS;
use eframe::egui;

pub struct AboutWindow {}

impl AboutWindow {
    pub fn new() -> Self {
        Self {}
    }

    pub fn update(&mut self, ctx: &egui::Context) -> bool {
        let mut open = true;

        egui::Window::new("About")
            .resizable([false, false])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Bakery Labels");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.label("Recipe costing and product labels for bakeries");
                    ui.label(format!("{} label sheet presets", PRESETS.len()));
                });
            });

        !open
    }
}
