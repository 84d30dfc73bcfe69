//! # Widgets Module
//!
//! Canvas widgets for the HapTune editor and the shared plotting helpers
//! they draw with.

pub mod profile_plot;
pub mod spectrum_plot;
pub mod waveform_plot;

use haptune_core::axes;
use haptune_core::ControlPoint;
use iced::widget::canvas::{Frame, LineDash, Path, Stroke, Text};
use iced::{alignment, Color, Point, Rectangle, Size};

const PADDING_LEFT: f32 = 56.0;
const PADDING_RIGHT: f32 = 12.0;
const PADDING_TOP: f32 = 12.0;
const PADDING_BOTTOM: f32 = 36.0;

const GRID_COLOR: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 0.08 };
const AXIS_COLOR: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 0.35 };
const LABEL_SIZE: f32 = 11.0;
const LIMIT_DASH: [f32; 2] = [6.0, 4.0];

/// Maps data coordinates onto the drawable area of a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub bounds: Size,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotArea {
    pub fn new(bounds: Size, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            bounds,
            x_min: x_range.0,
            x_max: x_range.1,
            y_min: y_range.0,
            y_max: y_range.1,
        }
    }

    /// The rectangle inside the tick-label padding.
    pub fn inner(&self) -> Rectangle {
        Rectangle {
            x: PADDING_LEFT,
            y: PADDING_TOP,
            width: (self.bounds.width - PADDING_LEFT - PADDING_RIGHT).max(1.0),
            height: (self.bounds.height - PADDING_TOP - PADDING_BOTTOM).max(1.0),
        }
    }

    /// False for empty ranges, which cannot be mapped to the screen.
    pub fn is_valid(&self) -> bool {
        self.x_max > self.x_min
            && self.y_max > self.y_min
            && self.bounds.width.is_finite()
            && self.bounds.height.is_finite()
    }

    /// Canvas position of a data point. Points outside the range land outside the plot.
    pub fn to_screen(&self, x: f64, y: f64) -> Point {
        let inner = self.inner();
        let fx = (x - self.x_min) / (self.x_max - self.x_min);
        let fy = (y - self.y_min) / (self.y_max - self.y_min);
        Point::new(
            inner.x + fx as f32 * inner.width,
            inner.y + (1.0 - fy as f32) * inner.height,
        )
    }

    /// Like [`to_screen`](Self::to_screen), pinned to the edges of the plot.
    pub fn to_screen_clamped(&self, x: f64, y: f64) -> Point {
        self.to_screen(x.clamp(self.x_min, self.x_max), y.clamp(self.y_min, self.y_max))
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }

    /// Data coordinates under a canvas position, if it lies inside the plot.
    pub fn to_data(&self, position: Point) -> Option<(f64, f64)> {
        let inner = self.inner();
        if !inner.contains(position) {
            return None;
        }
        let fx = ((position.x - inner.x) / inner.width) as f64;
        let fy = (1.0 - (position.y - inner.y) / inner.height) as f64;
        Some((
            self.x_min + fx * (self.x_max - self.x_min),
            self.y_min + fy * (self.y_max - self.y_min),
        ))
    }

    /// Grid lines, tick labels, the frame and the zero lines.
    pub fn draw_axes(&self, frame: &mut Frame, x_ticks: &[f64], y_ticks: &[f64], text_color: Color) {
        let inner = self.inner();
        let grid = Stroke::default().with_color(GRID_COLOR).with_width(1.0);

        for &tick in x_ticks {
            let top = self.to_screen(tick, self.y_max);
            let bottom = self.to_screen(tick, self.y_min);
            frame.stroke(&Path::line(top, bottom), grid);
            frame.fill_text(Text {
                content: tick_label(tick),
                position: Point::new(bottom.x, inner.y + inner.height + 4.0),
                color: text_color,
                size: LABEL_SIZE.into(),
                horizontal_alignment: alignment::Horizontal::Center,
                vertical_alignment: alignment::Vertical::Top,
                ..Text::default()
            });
        }

        for &tick in y_ticks {
            let left = self.to_screen(self.x_min, tick);
            let right = self.to_screen(self.x_max, tick);
            frame.stroke(&Path::line(left, right), grid);
            frame.fill_text(Text {
                content: tick_label(tick),
                position: Point::new(inner.x - 6.0, left.y),
                color: text_color,
                size: LABEL_SIZE.into(),
                horizontal_alignment: alignment::Horizontal::Right,
                vertical_alignment: alignment::Vertical::Center,
                ..Text::default()
            });
        }

        let axis = Stroke::default().with_color(AXIS_COLOR).with_width(1.0);
        frame.stroke(&Path::rectangle(Point::new(inner.x, inner.y), inner.size()), axis);

        if (self.y_min..=self.y_max).contains(&0.0) {
            frame.stroke(
                &Path::line(self.to_screen(self.x_min, 0.0), self.to_screen(self.x_max, 0.0)),
                axis,
            );
        }
        if (self.x_min..=self.x_max).contains(&0.0) {
            frame.stroke(
                &Path::line(self.to_screen(0.0, self.y_min), self.to_screen(0.0, self.y_max)),
                axis,
            );
        }
    }

    /// Axis titles below and left of the plot.
    pub fn draw_labels(&self, frame: &mut Frame, x_label: &str, y_label: &str, text_color: Color) {
        let inner = self.inner();
        frame.fill_text(Text {
            content: x_label.to_string(),
            position: Point::new(inner.center_x(), self.bounds.height - 2.0),
            color: text_color,
            size: 12.0.into(),
            horizontal_alignment: alignment::Horizontal::Center,
            vertical_alignment: alignment::Vertical::Bottom,
            ..Text::default()
        });
        frame.fill_text(Text {
            content: y_label.to_string(),
            position: Point::new(2.0, inner.y - 2.0),
            color: text_color,
            size: 12.0.into(),
            horizontal_alignment: alignment::Horizontal::Left,
            vertical_alignment: alignment::Vertical::Top,
            ..Text::default()
        });
    }

    /// Full-height and full-width segments at the given axis limits.
    ///
    /// # Arguments
    /// * `x_limits` - Data x values of the vertical lines
    /// * `y_limits` - Data y values of the horizontal lines
    ///
    /// # Returns
    /// * `Vec<(Point, Point)>` - Screen segments, skipping limits outside the plot
    pub fn limit_segments(&self, x_limits: (f64, f64), y_limits: (f64, f64)) -> Vec<(Point, Point)> {
        let vertical = [x_limits.0, x_limits.1]
            .into_iter()
            .filter(|x| (self.x_min..=self.x_max).contains(x))
            .map(|x| (self.to_screen(x, self.y_min), self.to_screen(x, self.y_max)));
        let horizontal = [y_limits.0, y_limits.1]
            .into_iter()
            .filter(|y| (self.y_min..=self.y_max).contains(y))
            .map(|y| (self.to_screen(self.x_min, y), self.to_screen(self.x_max, y)));
        vertical.chain(horizontal).collect()
    }

    /// Dashed lines marking the axis limits inside the display margin.
    pub fn draw_limit_lines(&self, frame: &mut Frame, x_limits: (f64, f64), y_limits: (f64, f64), color: Color) {
        let dashed = Stroke {
            line_dash: LineDash {
                segments: &LIMIT_DASH,
                offset: 0,
            },
            ..Stroke::default().with_color(color).with_width(1.0)
        };
        for (from, to) in self.limit_segments(x_limits, y_limits) {
            frame.stroke(&Path::line(from, to), dashed.clone());
        }
    }

    /// Strokes a polyline through `points`, pinned inside the plot.
    pub fn draw_line(&self, frame: &mut Frame, points: &[ControlPoint], color: Color, width: f32) {
        if points.len() < 2 {
            return;
        }
        let path = Path::new(|builder| {
            builder.move_to(self.to_screen_clamped(points[0].x, points[0].y));
            for p in &points[1..] {
                builder.line_to(self.to_screen_clamped(p.x, p.y));
            }
        });
        frame.stroke(&path, Stroke::default().with_color(color).with_width(width));
    }

    /// Fills a dot for each point inside the plot.
    pub fn draw_markers(&self, frame: &mut Frame, points: &[ControlPoint], color: Color, radius: f32) {
        for p in points.iter().filter(|p| self.contains(p.x, p.y)) {
            frame.fill(&Path::circle(self.to_screen(p.x, p.y), radius), color);
        }
    }
}

/// Rounded tick values covering `[min, max]`, about ten of them.
pub fn auto_ticks(min: f64, max: f64) -> Vec<f64> {
    if min.is_nan() || max.is_nan() || max <= min {
        return Vec::new();
    }
    axes::tick_positions(min, max, axes::nice_tick(min, max))
}

fn tick_label(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> PlotArea {
        PlotArea::new(
            Size::new(PADDING_LEFT + PADDING_RIGHT + 100.0, PADDING_TOP + PADDING_BOTTOM + 50.0),
            (0.0, 10.0),
            (-5.0, 5.0),
        )
    }

    #[test]
    fn corners_map_to_inner_rectangle() {
        let area = area();
        assert_eq!(area.to_screen(0.0, 5.0), Point::new(PADDING_LEFT, PADDING_TOP));
        assert_eq!(
            area.to_screen(10.0, -5.0),
            Point::new(PADDING_LEFT + 100.0, PADDING_TOP + 50.0)
        );
    }

    #[test]
    fn screen_and_data_coordinates_invert() {
        let area = area();
        let point = area.to_screen(2.5, 1.0);
        let (x, y) = area.to_data(point).unwrap();
        assert!((x - 2.5).abs() < 1e-4);
        assert!((y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn clamped_points_stay_on_the_frame() {
        let area = area();
        assert_eq!(area.to_screen_clamped(20.0, 9.0), area.to_screen(10.0, 5.0));
        assert!(!area.contains(20.0, 0.0));
        assert!(area.contains(10.0, -5.0));
    }

    #[test]
    fn positions_in_the_padding_are_outside() {
        assert!(area().to_data(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn limit_lines_sit_inside_the_margin() {
        let area = area();
        let segments = area.limit_segments((1.0, 9.0), (-4.0, 4.0));
        let close = |a: f32, b: f32| (a - b).abs() < 1e-3;
        assert_eq!(segments.len(), 4);
        assert!(close(segments[0].0.x, PADDING_LEFT + 10.0));
        assert!(close(segments[1].0.x, PADDING_LEFT + 90.0));
        assert!(close(segments[2].0.y, PADDING_TOP + 45.0));
        assert!(close(segments[3].0.y, PADDING_TOP + 5.0));
        assert_eq!(area.limit_segments((-1.0, 20.0), (-9.0, 9.0)).len(), 0);
    }

    #[test]
    fn ticks_cover_the_range() {
        let ticks = auto_ticks(0.0, 500.0);
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&500.0));
        assert!(auto_ticks(1.0, 1.0).is_empty());
        // spans too small for a two-decimal tick
        assert!(auto_ticks(0.0, 1e-4).is_empty());
    }

    #[test]
    fn tick_labels_drop_integer_fractions() {
        assert_eq!(tick_label(100.0), "100");
        assert_eq!(tick_label(0.25), "0.25");
    }
}
