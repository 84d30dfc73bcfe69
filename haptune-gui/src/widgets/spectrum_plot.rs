//! # Spectrum Plot Widget
//!
//! Shows the single-sided DFT magnitude of the current vibration as bars
//! from DC up to the Nyquist frequency.

use haptune_core::spectrum::Spectrum;
use iced::widget::canvas::{self, Geometry, Path};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};

use super::{auto_ticks, PlotArea};

const BAR_COLOR: Color = iced::color!(0x34, 0x98, 0xDB);

/// Bar chart of a vibration spectrum from DC to Nyquist.
pub struct SpectrumPlot {
    spectrum: Spectrum,
    nyquist: f64,
}

impl SpectrumPlot {
    /// # Arguments
    /// * `spectrum` - Magnitudes to draw
    /// * `sampling_rate` - Rate of the analysed signal, fixing the Nyquist limit
    pub fn new(spectrum: Spectrum, sampling_rate: u32) -> Self {
        Self {
            spectrum,
            nyquist: sampling_rate as f64 / 2.0,
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
}

impl<Message> canvas::Program<Message> for SpectrumPlot {
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

        let max_magnitude = self.spectrum.max_magnitude();
        if self.spectrum.is_empty() || max_magnitude <= 0.0 || self.nyquist <= 0.0 {
            return vec![frame.into_geometry()];
        }

        let y_max = max_magnitude * 1.1;
        let area = PlotArea::new(bounds.size(), (0.0, self.nyquist), (0.0, y_max));
        if !area.is_valid() {
            return vec![frame.into_geometry()];
        }

        let text_color = theme.palette().text;
        area.draw_axes(
            &mut frame,
            &auto_ticks(0.0, self.nyquist),
            &auto_ticks(0.0, y_max),
            text_color,
        );
        area.draw_labels(&mut frame, "Frequency (Hz)", "Magnitude", text_color);

        let inner = area.inner();
        let bar_width = (inner.width / self.spectrum.len() as f32).max(1.0);
        let baseline = area.to_screen(0.0, 0.0).y;

        for (&frequency, &magnitude) in self.spectrum.frequencies.iter().zip(&self.spectrum.magnitudes) {
            if frequency > self.nyquist {
                break;
            }
            let top = area.to_screen(frequency, magnitude);
            let height = baseline - top.y;
            if height.is_finite() && height > 0.0 {
                let bar = Path::rectangle(
                    Point::new(top.x - bar_width / 2.0, top.y),
                    Size::new(bar_width, height),
                );
                frame.fill(&bar, BAR_COLOR);
            }
        }

        vec![frame.into_geometry()]
    }
}
