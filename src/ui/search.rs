// Copyright 2023 Remi Bernotavicius

use eframe::egui;
use std::hash::Hash;

/// A text box with a drop-down of matching entries. Picking an entry, or typing one's exact
/// name, stores its value in `value`; any other text clears it.
pub struct SearchWidget<'a, SearchFn, ValueT> {
    buf: &'a mut String,
    value: &'a mut Option<ValueT>,
    search_fn: SearchFn,
    pop_up_id: egui::Id,
    hint_text: Option<egui::WidgetText>,
}

impl<'a, SearchFn, ValueT> SearchWidget<'a, SearchFn, ValueT>
where
    SearchFn: FnOnce(&str) -> Vec<(ValueT, String)>,
{
    pub fn new(
        id_source: impl Hash,
        buf: &'a mut String,
        value: &'a mut Option<ValueT>,
        search_fn: SearchFn,
    ) -> Self {
        Self {
            buf,
            value,
            search_fn,
            pop_up_id: egui::Id::new(id_source),
            hint_text: None,
        }
    }

    pub fn hint_text(mut self, hint_text: impl Into<egui::WidgetText>) -> Self {
        self.hint_text = Some(hint_text.into());
        self
    }
}

impl<SearchFn, ValueT> egui::Widget for SearchWidget<'_, SearchFn, ValueT>
where
    SearchFn: FnOnce(&str) -> Vec<(ValueT, String)>,
    ValueT: Clone,
{
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let Self {
            buf,
            value,
            search_fn,
            pop_up_id,
            hint_text,
        } = self;

        let mut edit = egui::TextEdit::singleline(buf);
        if let Some(hint_text) = hint_text {
            edit = edit.hint_text(hint_text);
        }
        let mut response = edit.show(ui).response;
        if response.gained_focus() {
            ui.memory_mut(|m| m.open_popup(pop_up_id));
        }
        if !ui.memory(|m| m.is_popup_open(pop_up_id)) {
            return response;
        }

        let matches = search_fn(buf.as_str());
        let exact = matches.iter().find(|(_, name)| name.as_str() == buf.as_str());
        *value = exact.map(|(v, _)| v.clone());

        let mut picked = None;
        egui::popup_below_widget(
            ui,
            pop_up_id,
            &response,
            egui::PopupCloseBehavior::CloseOnClick,
            |ui| {
                egui::ScrollArea::vertical()
                    .max_height(200.0)
                    .show(ui, |ui| {
                        if matches.is_empty() {
                            ui.weak("No matches");
                        }
                        for (v, name) in &matches {
                            if ui.selectable_label(false, name).clicked() {
                                picked = Some((v.clone(), name.clone()));
                            }
                        }
                    });
            },
        );

        if let Some((v, name)) = picked {
            *value = Some(v);
            *buf = name;
            ui.memory_mut(|m| m.close_popup());
            response.mark_changed();
        }
        response
    }
}
