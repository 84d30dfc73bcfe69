//! # Waveform Plot Widget
//!
//! Read-only view of a synthesised vibration with its envelope drawn above
//! and below the trace.

use haptune_core::vibration::VibrationSignal;
use haptune_core::ControlPoint;
use iced::widget::canvas::{self, Geometry};
use iced::widget::container;
use iced::{mouse, Color, Element, Rectangle, Renderer, Theme};

use super::{auto_ticks, PlotArea};

const TRACE_COLOR: Color = iced::color!(0x9B, 0x59, 0xB6);
const ENVELOPE_COLOR: Color = iced::color!(0x34, 0xDB, 0x98);

/// Trace of a generated vibration over its envelope.
pub struct WaveformPlot {
    samples: Vec<ControlPoint>,
    envelope: Vec<ControlPoint>,
    show_envelope: bool,
}

impl WaveformPlot {
    pub fn new(signal: Option<&VibrationSignal>, show_envelope: bool) -> Self {
        Self {
            samples: signal.map(|s| s.samples.clone()).unwrap_or_default(),
            envelope: signal.map(|s| s.envelope.clone()).unwrap_or_default(),
            show_envelope,
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

    /// Data ranges covering the trace and the envelope, with a little headroom.
    fn ranges(&self) -> ((f64, f64), (f64, f64)) {
        let first = self.samples.first().map_or(0.0, |p| p.x);
        let last = self.samples.last().map_or(1.0, |p| p.x);
        let peak = self
            .samples
            .iter()
            .chain(&self.envelope)
            .fold(0.0f64, |max, p| p.y.abs().max(max));
        let peak = if peak > 0.0 { peak * 1.1 } else { 1.0 };
        ((first, last.max(first + f64::EPSILON)), (-peak, peak))
    }
}

impl<Message> canvas::Program<Message> for WaveformPlot {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        if self.samples.is_empty() {
            return vec![frame.into_geometry()];
        }

        let (x_range, y_range) = self.ranges();
        let area = PlotArea::new(bounds.size(), x_range, y_range);
        if !area.is_valid() {
            return vec![frame.into_geometry()];
        }

        let text_color = theme.palette().text;
        area.draw_axes(
            &mut frame,
            &auto_ticks(x_range.0, x_range.1),
            &auto_ticks(y_range.0, y_range.1),
            text_color,
        );
        area.draw_labels(&mut frame, "Sample", "Amplitude", text_color);

        area.draw_line(&mut frame, &self.samples, TRACE_COLOR, 1.0);
        if self.show_envelope {
            let lower: Vec<ControlPoint> = self.envelope.iter().map(ControlPoint::mirrored).collect();
            area.draw_line(&mut frame, &self.envelope, ENVELOPE_COLOR, 1.5);
            area.draw_line(&mut frame, &lower, ENVELOPE_COLOR, 1.5);
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_symmetric_around_zero() {
        let signal = VibrationSignal {
            sampling_rate: 1000,
            envelope: vec![ControlPoint::new(0.0, 2.0), ControlPoint::new(10.0, 2.0)],
            samples: vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(10.0, -1.0)],
        };
        let ((x0, x1), (y0, y1)) = WaveformPlot::new(Some(&signal), true).ranges();
        assert_eq!((x0, x1), (0.0, 10.0));
        assert!((y1 - 2.2).abs() < 1e-12);
        assert_eq!(y0, -y1);
    }

    #[test]
    fn empty_plot_has_unit_ranges() {
        let ((x0, x1), (y0, y1)) = WaveformPlot::new(None, false).ranges();
        assert_eq!((x0, x1, y0, y1), (0.0, 1.0, -1.0, 1.0));
    }
}
