//! # Profile Plot Widget
//!
//! The interactive editing canvas. It shows the control points, the curve
//! through them, the interpolated resampling, the envelope preview and the
//! synthesised vibration on the user's axes.
//!
//! ## Interaction
//! - Ctrl + left click adds a point
//! - Left click selects the nearest point; dragging moves it

use haptune_core::axes::{Axis, AxisSettings};
use haptune_core::profile::{CLOSE_POINT_TOLERANCE, DISPLAY_CURVE_SAMPLES};
use haptune_core::session::Session;
use haptune_core::ControlPoint;
use iced::widget::canvas::{self, event, Event, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{keyboard, mouse, Color, Element, Rectangle, Renderer, Theme};

use super::PlotArea;

const CURVE_COLOR: Color = iced::color!(0x34, 0x98, 0xDB);
const POINT_COLOR: Color = iced::color!(0xFF, 0x33, 0x33);
const INTERPOLATED_COLOR: Color = iced::color!(0xF3, 0x9C, 0x12);
const ENVELOPE_COLOR: Color = iced::color!(0x34, 0xDB, 0x98);
const VIBRATION_COLOR: Color = iced::color!(0x9B, 0x59, 0xB6);
const WARNING_COLOR: Color = iced::color!(0xFF, 0xD7, 0x00);
const LIMIT_COLOR: Color = iced::color!(0x95, 0xA5, 0xA6);

/// Snapshot of everything the editing canvas draws.
#[derive(Debug, Clone)]
pub struct ProfilePlot {
    points: Vec<ControlPoint>,
    curve: Vec<ControlPoint>,
    interpolated: Option<Vec<ControlPoint>>,
    envelope: Option<Vec<ControlPoint>>,
    vibration: Option<Vec<ControlPoint>>,
    selected: Option<ControlPoint>,
    close_pairs: Vec<(usize, usize)>,
    axes: AxisSettings,
}

/// Mouse interaction state kept by the canvas between events.
#[derive(Debug, Default)]
pub struct PlotState {
    dragging: bool,
    modifiers: keyboard::Modifiers,
}

impl ProfilePlot {
    pub fn from_session(session: &Session) -> Self {
        let profile = &session.profile;
        Self {
            points: profile.points().to_vec(),
            curve: profile.display_curve(DISPLAY_CURVE_SAMPLES),
            interpolated: profile.interpolated().map(<[ControlPoint]>::to_vec),
            envelope: session.visible_envelope().map(<[ControlPoint]>::to_vec),
            vibration: session.signal().map(|s| s.samples.clone()),
            selected: session.selected(),
            close_pairs: profile.close_pairs(CLOSE_POINT_TOLERANCE),
            axes: session.axes.clone(),
        }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }

    fn area(&self, bounds: Rectangle) -> PlotArea {
        let range = self.axes.display_range();
        PlotArea::new(bounds.size(), (range.x_min, range.x_max), (range.y_min, range.y_max))
    }
}

impl<Message> canvas::Program<Message> for ProfilePlot
where
    Message: From<crate::Message>,
{
    type State = PlotState;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        let area = self.area(bounds);
        let data_position = cursor.position_in(bounds).and_then(|p| area.to_data(p));

        match event {
            Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                state.modifiers = modifiers;
                (event::Status::Ignored, None)
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some((x, y)) = data_position else {
                    return (event::Status::Ignored, None);
                };
                let message = if state.modifiers.control() {
                    crate::Message::AddPoint(x, y)
                } else {
                    state.dragging = true;
                    crate::Message::SelectNear(x, y)
                };
                (event::Status::Captured, Some(message.into()))
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) if state.dragging => match data_position {
                Some((x, y)) => (
                    event::Status::Captured,
                    Some(crate::Message::DragSelected(x, y).into()),
                ),
                None => (event::Status::Ignored, None),
            },
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if state.dragging => {
                state.dragging = false;
                (event::Status::Captured, None)
            }
            _ => (event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let area = self.area(bounds);
        if !area.is_valid() {
            return vec![frame.into_geometry()];
        }

        let text_color = theme.palette().text;
        area.draw_axes(
            &mut frame,
            &self.axes.ticks(Axis::X),
            &self.axes.ticks(Axis::Y),
            text_color,
        );
        area.draw_labels(&mut frame, &self.axes.x_label, &self.axes.y_label, text_color);
        area.draw_limit_lines(
            &mut frame,
            (self.axes.x_min, self.axes.x_max),
            (self.axes.y_min, self.axes.y_max),
            LIMIT_COLOR,
        );

        if let Some(vibration) = &self.vibration {
            area.draw_line(&mut frame, vibration, VIBRATION_COLOR, 1.0);
        }
        if let Some(envelope) = &self.envelope {
            let lower: Vec<ControlPoint> = envelope.iter().map(ControlPoint::mirrored).collect();
            area.draw_line(&mut frame, envelope, ENVELOPE_COLOR, 1.5);
            area.draw_line(&mut frame, &lower, ENVELOPE_COLOR, 1.5);
        }

        area.draw_line(&mut frame, &self.curve, CURVE_COLOR, 2.0);
        if let Some(interpolated) = &self.interpolated {
            area.draw_markers(&mut frame, interpolated, INTERPOLATED_COLOR, 2.0);
        }
        area.draw_markers(&mut frame, &self.points, POINT_COLOR, 4.0);

        let ring = Stroke::default().with_color(WARNING_COLOR).with_width(2.0);
        for &(i, j) in &self.close_pairs {
            for p in [self.points.get(i), self.points.get(j)].into_iter().flatten() {
                if area.contains(p.x, p.y) {
                    frame.stroke(&Path::circle(area.to_screen(p.x, p.y), 7.0), ring);
                }
            }
        }

        if let Some(selected) = self.selected.filter(|p| area.contains(p.x, p.y)) {
            frame.stroke(
                &Path::circle(area.to_screen(selected.x, selected.y), 8.0),
                Stroke::default().with_color(text_color).with_width(2.0),
            );
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.dragging {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}
