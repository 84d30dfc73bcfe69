//! # Controls Module
//!
//! The control panel beside the editing plot and the vibration panel below
//! it. Both are built from small labelled inputs and buttons.

use haptune_core::session::Session;
use haptune_core::spectrum::Window;
use iced::widget::{button, checkbox, column, container, row, scrollable, text, text_input, Space};
use iced::{Alignment, Color, Element, Length};

use crate::widgets::spectrum_plot::SpectrumPlot;
use crate::widgets::waveform_plot::WaveformPlot;
use crate::{AppDisplayData, AxisField, Inputs, Message};

const LABEL_WIDTH: f32 = 110.0;
const SIDEBAR_WIDTH: f32 = 300.0;

/// Creates the right-hand control panel.
pub fn create_control_panel<'a>(
    session: &'a Session,
    inputs: &'a Inputs,
    data: &'a AppDisplayData,
) -> Element<'a, Message> {
    let smoothing = section(
        "Smoothing",
        column![
            labeled_input("Factor", &inputs.smoothing, Message::SmoothingChanged),
            row![
                action("Smoothing", Message::ApplySmoothing),
                action("No Smoothing", Message::RemoveSmoothing),
            ]
            .spacing(8),
            text(format!("Current: {}", session.profile.smoothing())).size(12),
        ],
    );

    let interpolation = section(
        "Interpolation",
        column![
            labeled_input("Points per unit", &inputs.interpolation, Message::InterpolationChanged),
            row![
                action("Interpolate", Message::Interpolate),
                action("No Interpolate", Message::RemoveInterpolation),
            ]
            .spacing(8),
        ],
    );

    let downsample = section(
        "Downsampling",
        column![
            labeled_input("Keep every", &inputs.downsample, Message::DownsampleChanged),
            action("Downsample", Message::Downsample),
        ],
    );

    let axes = section(
        "Axes",
        column![
            axis_input("X min", &inputs.x_min, AxisField::XMin),
            axis_input("X max", &inputs.x_max, AxisField::XMax),
            axis_input("Y min", &inputs.y_min, AxisField::YMin),
            axis_input("Y max", &inputs.y_max, AxisField::YMax),
            axis_input("X tick", &inputs.x_tick, AxisField::XTick),
            axis_input("Y tick", &inputs.y_tick, AxisField::YTick),
            axis_input("X label", &inputs.x_label, AxisField::XLabel),
            axis_input("Y label", &inputs.y_label, AxisField::YLabel),
            row![action("Apply", Message::ApplyAxes), action("Auto", Message::AutoAxes)].spacing(8),
        ],
    );

    let files = section(
        "Files",
        column![
            labeled_input("Save path", &inputs.save_path, Message::SavePathChanged),
            row![
                action("Save Table CSV", Message::SaveTable),
                action("Save Brace CSV", Message::SaveBrace),
            ]
            .spacing(8),
            row![
                action("Save Session", Message::SaveSession),
                action("Load Session", Message::LoadSession),
            ]
            .spacing(8),
        ],
    );

    let vibration_toggle = toggle_button(
        "Vibration Panel",
        data.vibration_panel_visible,
        Message::ToggleVibrationPanel,
    );

    let sections = column![smoothing, interpolation, downsample, axes, files, vibration_toggle]
        .spacing(16)
        .padding(10);

    container(scrollable(sections))
        .width(Length::Fixed(SIDEBAR_WIDTH))
        .height(Length::Fill)
        .into()
}

/// Creates the vibration panel: synthesiser settings on the left, the
/// waveform and its spectrum on the right.
pub fn create_vibration_panel<'a>(
    session: &'a Session,
    inputs: &'a Inputs,
    data: &'a AppDisplayData,
) -> Element<'a, Message> {
    let tone_rows = inputs.tones.iter().enumerate().fold(
        column![text("Tones (enabled, Hz, amplitude)").size(14)].spacing(4),
        |col, (i, tone)| {
            col.push(
                row![
                    checkbox("", tone.enabled).on_toggle(move |enabled| Message::ToneEnabled(i, enabled)),
                    text_input("Hz", &tone.frequency)
                        .on_input(move |value| Message::ToneFrequencyChanged(i, value))
                        .size(14)
                        .padding(4),
                    text_input("Amplitude", &tone.amplitude)
                        .on_input(move |value| Message::ToneAmplitudeChanged(i, value))
                        .size(14)
                        .padding(4),
                    button(text("Remove").size(12))
                        .padding([4, 8])
                        .on_press(Message::RemoveTone(i)),
                ]
                .spacing(6)
                .align_y(Alignment::Center),
            )
        },
    );

    let settings = column![
        labeled_input("Sampling rate", &inputs.sampling_rate, Message::SamplingRateChanged),
        labeled_input("Global amplitude", &inputs.global_amplitude, Message::GlobalAmplitudeChanged),
        tone_rows,
        action("Add Tone", Message::AddTone),
        row![
            action("Generate Vibration", Message::GenerateVibration),
            action("Clear Vibration", Message::ClearVibration),
        ]
        .spacing(8),
        row![
            action("Generate Envelope", Message::GenerateEnvelope),
            action("Clear Envelope", Message::ClearEnvelope),
        ]
        .spacing(8),
        row![
            checkbox("Show envelope", session.envelope_visible).on_toggle(Message::EnvelopeVisible),
            checkbox("Hann window", session.spectrum_window == Window::Hann).on_toggle(Message::HannWindow),
        ]
        .spacing(16),
        labeled_input("Vibration path", &inputs.vibration_path, Message::VibrationPathChanged),
        row![
            action("Save Vibration", Message::SaveVibration),
            action("Export WAV", Message::ExportWav),
        ]
        .spacing(8),
        if data.playing {
            toggle_button("Stop", true, Message::Stop)
        } else {
            toggle_button("Play", false, Message::Play)
        },
    ]
    .spacing(8)
    .width(Length::Fixed(420.0));

    let signal = session.signal();
    let rate = signal.map_or(session.vibration.sampling_rate, |s| s.sampling_rate);
    let plots = column![
        text("Vibration").size(16),
        WaveformPlot::new(signal, session.envelope_visible).view(),
        text("Spectrum").size(16),
        SpectrumPlot::new(session.spectrum().unwrap_or_default(), rate).view(),
    ]
    .spacing(6)
    .width(Length::Fill)
    .height(Length::Fill);

    container(
        row![scrollable(settings), Space::with_width(10), plots]
            .padding(10)
            .align_y(Alignment::Start),
    )
    .width(Length::Fill)
    .height(Length::FillPortion(2))
    .into()
}

/// A standard panel button.
pub fn action<'a>(label: &'a str, message: Message) -> Element<'a, Message> {
    button(text(label).size(14)).padding([6, 10]).on_press(message).into()
}

/// A button highlighted in red while its mode is active.
fn toggle_button<'a>(label: &'a str, active: bool, message: Message) -> Element<'a, Message> {
    let mut toggle = button(text(label).size(14).width(Length::Fill))
        .padding([6, 10])
        .on_press(message);
    if active {
        toggle = toggle.style(|_theme, _status| button::Style {
            background: Some(iced::Background::Color(Color::from_rgb(0.8, 0.2, 0.2))),
            text_color: Color::WHITE,
            ..button::Style::default()
        });
    }
    toggle.into()
}

fn section<'a>(title: &'a str, body: iced::widget::Column<'a, Message>) -> Element<'a, Message> {
    column![text(title).size(18), body.spacing(6)].spacing(6).into()
}

fn labeled_input<'a>(
    label: &'a str,
    value: &'a str,
    on_input: impl Fn(String) -> Message + 'a,
) -> Element<'a, Message> {
    row![
        text(label).size(14).width(Length::Fixed(LABEL_WIDTH)),
        text_input("", value).on_input(on_input).size(14).padding(4),
    ]
    .spacing(6)
    .align_y(Alignment::Center)
    .into()
}

fn axis_input<'a>(label: &'a str, value: &'a str, field: AxisField) -> Element<'a, Message> {
    labeled_input(label, value, move |value| Message::AxisFieldChanged(field, value))
}
