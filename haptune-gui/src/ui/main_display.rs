//! # Main Display Module
//!
//! This module assembles the main window layout from the panels built in
//! [`super::controls`] and the canvas widgets.

use haptune_core::session::Session;
use iced::widget::{column, container, row, text, text_input, Space};
use iced::{Alignment, Color, Element, Length};

use super::controls::{self, action};
use crate::widgets::profile_plot::ProfilePlot;
use crate::{AppDisplayData, Inputs, Message, Status};

/// Creates the complete main application view.
pub fn create_main_view<'a>(
    session: &'a Session,
    inputs: &'a Inputs,
    data: &'a AppDisplayData,
) -> Element<'a, Message> {
    let title = text("HapTune").size(28);

    let plot_panel = container(ProfilePlot::from_session(session).view())
        .width(Length::FillPortion(3))
        .height(Length::Fill);

    let editor = row![
        plot_panel,
        Space::with_width(10),
        controls::create_control_panel(session, inputs, data),
    ]
    .height(Length::FillPortion(3))
    .align_y(Alignment::Start);

    let mut content = column![title, create_load_row(session, inputs), editor]
        .spacing(10)
        .width(Length::Fill);

    if data.vibration_panel_visible {
        content = content.push(controls::create_vibration_panel(session, inputs, data));
    }
    content = content.push(create_status_line(data.status.as_ref()));

    container(content.padding(20))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Path entry with Load, Unload and Reset, Reset Editing and the loaded-file label.
fn create_load_row<'a>(session: &'a Session, inputs: &'a Inputs) -> Element<'a, Message> {
    row![
        text_input("Profile file (.csv)", &inputs.load_path)
            .on_input(Message::LoadPathChanged)
            .on_submit(Message::LoadFile)
            .size(14)
            .padding(6)
            .width(Length::FillPortion(2)),
        action("Load", Message::LoadFile),
        action("Unload and Reset", Message::UnloadAndReset),
        action("Reset Editing", Message::ResetEditing),
        text(session.loaded_file_label()).size(14).width(Length::FillPortion(1)),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}

fn create_status_line(status: Option<&Status>) -> Element<'static, Message> {
    let (message, color) = match status {
        Some(Status::Info(message)) => (message.clone(), Color::from_rgb(0.7, 0.7, 0.7)),
        Some(Status::Error(message)) => (message.clone(), Color::from_rgb(0.9, 0.3, 0.3)),
        None => ("Ctrl+click to add a point, drag to move, Delete to remove".to_string(), Color::from_rgb(0.5, 0.5, 0.5)),
    };
    text(message).size(13).color(color).into()
}
