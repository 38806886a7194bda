// Copyright 2023 Remi Bernotavicius

use super::{new_info_toast, report};
use crate::config::LabelConfig;
use crate::database;
use crate::database::models::{RecipeId, Store};
use crate::database::query;
use crate::label::{self, preset, GridConfig, GridSource, LabelFont};
use eframe::egui;
use std::path::{Path, PathBuf};

pub struct LabelWindow {
    store: Store,
    recipe_id: RecipeId,
    preset: String,
    custom: Option<GridConfig>,
    count: usize,
    production_date: chrono::NaiveDate,
    show_cost: bool,
    show_price: bool,
    font_path: Option<PathBuf>,
    font: Option<LabelFont>,
}

fn grid_ui(ui: &mut egui::Ui, grid: &mut GridConfig) {
    let mm = |ui: &mut egui::Ui, label: &str, value: &mut f32| {
        ui.label(label);
        ui.add(
            egui::DragValue::new(value)
                .speed(0.1)
                .range(0.0..=297.0)
                .suffix(" mm"),
        );
        ui.end_row();
    };
    egui::Grid::new("custom label grid").show(ui, |ui| {
        mm(ui, "Label Width:", &mut grid.width);
        mm(ui, "Label Height:", &mut grid.height);
        ui.label("Columns:");
        ui.add(egui::DragValue::new(&mut grid.cols).range(1..=10));
        ui.end_row();
        ui.label("Rows:");
        ui.add(egui::DragValue::new(&mut grid.rows).range(1..=20));
        ui.end_row();
        mm(ui, "Left Margin:", &mut grid.margin_left);
        mm(ui, "Top Margin:", &mut grid.margin_top);
        mm(ui, "Horizontal Gap:", &mut grid.gap_x);
        mm(ui, "Vertical Gap:", &mut grid.gap_y);
    });
}

impl LabelWindow {
    pub fn new(store: Store, recipe_id: RecipeId, config: &LabelConfig) -> Self {
        Self {
            store,
            recipe_id,
            preset: config.default_preset.clone(),
            custom: None,
            count: 8,
            production_date: chrono::Local::now().date_naive(),
            show_cost: false,
            show_price: true,
            font_path: config.font_path.clone(),
            font: None,
        }
    }

    fn grid_source(&self) -> GridSource {
        match self.custom {
            Some(grid) => GridSource::Custom(grid),
            None => GridSource::Preset(self.preset.clone()),
        }
    }

    /// Writes the PDF into `labels/` under the data directory and returns its path.
    fn generate(
        &mut self,
        conn: &mut database::Connection,
        data_path: &Path,
    ) -> Result<(PathBuf, usize), Box<dyn std::error::Error>> {
        let recipe = query::get_recipe(conn, self.store.id, self.recipe_id)?;
        let costs = query::store_costs(conn, self.store.id)?;
        let production_date = self.production_date.format("%Y-%m-%d").to_string();
        let job = label::LabelJob {
            recipe: &recipe,
            calculator: costs.calculator(),
            store_name: &self.store.store_name,
            show_cost: self.show_cost,
            show_price: self.show_price,
            production_date: &production_date,
            label_count: self.count,
            grid: self.grid_source(),
        };
        let font_path = self.font_path.as_deref();
        let font = self
            .font
            .get_or_insert_with(|| LabelFont::discover(font_path));
        let document = label::generate(&job, font, chrono::Local::now().date_naive())?;

        let dir = data_path.join("labels");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(&document.filename);
        std::fs::write(&path, &document.bytes)?;
        Ok((path, document.page_count))
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        conn: &mut database::Connection,
        toasts: &mut egui_toast::Toasts,
        data_path: &Path,
    ) -> bool {
        let mut open = true;
        let mut generate = false;
        egui::Window::new("Labels")
            .id(egui::Id::new(("labels", self.recipe_id)))
            .open(&mut open)
            .show(ctx, |ui| {
                egui::Grid::new(("label options", self.recipe_id)).show(ui, |ui| {
                    ui.label("Sheet:");
                    let selected = match (&self.custom, preset::find_preset(&self.preset)) {
                        (Some(_), _) => "Custom",
                        (None, Some(p)) => p.name,
                        (None, None) => self.preset.as_str(),
                    };
                    let mut custom_selected = self.custom.is_some();
                    egui::ComboBox::from_id_salt(("label preset", self.recipe_id))
                        .selected_text(selected.to_owned())
                        .show_ui(ui, |ui| {
                            for p in label::PRESETS {
                                let checked = !custom_selected && self.preset == p.key;
                                if ui.selectable_label(checked, p.name).clicked() {
                                    self.preset = p.key.into();
                                    custom_selected = false;
                                }
                            }
                            if ui.selectable_label(custom_selected, "Custom").clicked() {
                                custom_selected = true;
                            }
                        });
                    match (custom_selected, self.custom.is_some()) {
                        (true, false) => {
                            let start = preset::find_preset(&self.preset)
                                .unwrap_or(&label::PRESETS[0])
                                .grid;
                            self.custom = Some(start);
                        }
                        (false, true) => self.custom = None,
                        _ => {}
                    }
                    ui.end_row();

                    ui.label("Count:");
                    ui.add(egui::DragValue::new(&mut self.count).range(0..=1000));
                    ui.end_row();

                    ui.label("Production Date:");
                    ui.add(egui_extras::DatePickerButton::new(&mut self.production_date));
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut self.show_cost, "Show unit cost");
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut self.show_price, "Show selling price");
                    ui.end_row();
                });
                if let Some(grid) = &mut self.custom {
                    ui.separator();
                    grid_ui(ui, grid);
                }
                ui.separator();
                generate = ui.button("Generate PDF").clicked();
            });

        if generate {
            let result = self.generate(conn, data_path).map_err(|e| e.to_string());
            if let Some((path, pages)) = report(toasts, result) {
                log::info!("wrote {}", path.display());
                toasts.add(new_info_toast(format!("Wrote {pages} page(s)")));
                if let Err(error) = open::that(&path) {
                    log::warn!("couldn't open {}: {error}", path.display());
                }
            }
        }

        !open
    }
}
