use crate::loaders::LoadState;

/// Text shown while the model loads or after it failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayText {
    Progress(String),
    Error(String),
}

impl OverlayText {
    pub fn text(&self) -> &str {
        match self {
            OverlayText::Progress(text) | OverlayText::Error(text) => text,
        }
    }
}

/// Overlay contents for `state`; `None` once the model is in the scene
pub fn overlay_text(state: &LoadState) -> Option<OverlayText> {
    match state {
        LoadState::Pending { progress: None } => Some(OverlayText::Progress("Loading...".to_string())),
        LoadState::Pending { progress: Some(progress) } => Some(OverlayText::Progress(progress.label())),
        LoadState::Succeeded => None,
        LoadState::Failed(error) => Some(OverlayText::Error(format!("Failed to load model: {}", error))),
    }
}

/// Draws a full-window panel over the 3D view while `state` has text
pub fn draw_overlay(ctx: &egui::Context, state: &LoadState) {
    let Some(text) = overlay_text(state) else {
        return;
    };

    let color = match text {
        OverlayText::Progress(_) => egui::Color32::WHITE,
        OverlayText::Error(_) => egui::Color32::from_rgb(255, 100, 100),
    };

    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(egui::Color32::from_black_alpha(180)))
        .show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new(text.text()).size(24.0).color(color));
            });
        });
}
