use framescope::aggregation::{AggregateStats, FrameCount};
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Size, Theme,
};

const PADDING: f32 = 12.0;
const BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.05);
const GRID: Color = Color::from_rgb(0.25, 0.25, 0.3);

/// Bar palette, cycled when there are more classes than colors.
const PALETTE: [Color; 6] = [
    Color::from_rgb(0.18, 0.72, 0.89),
    Color::from_rgb(0.95, 0.55, 0.2),
    Color::from_rgb(0.45, 0.8, 0.4),
    Color::from_rgb(0.85, 0.35, 0.55),
    Color::from_rgb(0.95, 0.85, 0.3),
    Color::from_rgb(0.6, 0.5, 0.9),
];

pub fn bar_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

fn draw_axes(frame: &mut Frame, size: Size) {
    let axes = Path::new(|builder| {
        builder.move_to(Point::new(PADDING, PADDING));
        builder.line_to(Point::new(PADDING, size.height - PADDING));
        builder.line_to(Point::new(size.width - PADDING, size.height - PADDING));
    });
    frame.stroke(&axes, Stroke::default().with_color(GRID).with_width(1.0));
}

/// Height of `count` on a plot area of `height` whose tallest value is `max`.
fn scaled(count: usize, max: usize, height: f32) -> f32 {
    if max == 0 {
        0.0
    } else {
        count as f32 / max as f32 * height
    }
}

/// One bar per class, in first-seen order.
#[derive(Clone)]
pub struct ClassBars {
    counts: Vec<usize>,
    max: usize,
}

impl ClassBars {
    pub fn new(stats: &AggregateStats) -> Self {
        Self {
            counts: stats
                .class_frequency
                .iter()
                .map(|(_, count)| count)
                .collect(),
            max: stats.class_frequency.max_count(),
        }
    }
}

impl<Message> canvas::Program<Message> for ClassBars {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);
        draw_axes(&mut frame, bounds.size());

        if !self.counts.is_empty() {
            let plot_width = bounds.width - 2.0 * PADDING;
            let plot_height = bounds.height - 2.0 * PADDING;
            let slot = plot_width / self.counts.len() as f32;
            let bar_width = (slot * 0.7).max(1.0);

            for (idx, count) in self.counts.iter().enumerate() {
                let height = scaled(*count, self.max, plot_height);
                let x = PADDING + idx as f32 * slot + (slot - bar_width) / 2.0;
                let y = bounds.height - PADDING - height;
                frame.fill_rectangle(
                    Point::new(x, y),
                    Size::new(bar_width, height),
                    bar_color(idx),
                );
            }
        }

        vec![frame.into_geometry()]
    }
}

/// Detections per frame, in frame order.
#[derive(Clone)]
pub struct FrameSeries {
    points: Vec<usize>,
}

impl FrameSeries {
    pub fn new(series: &[FrameCount]) -> Self {
        Self {
            points: series.iter().map(|point| point.count).collect(),
        }
    }
}

impl<Message> canvas::Program<Message> for FrameSeries {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);
        draw_axes(&mut frame, bounds.size());

        let max = self.points.iter().copied().max().unwrap_or(0);
        let plot_width = bounds.width - 2.0 * PADDING;
        let plot_height = bounds.height - 2.0 * PADDING;
        let step = if self.points.len() > 1 {
            plot_width / (self.points.len() as f32 - 1.0)
        } else {
            0.0
        };
        let position = |i: usize, count: usize| {
            Point::new(
                PADDING + i as f32 * step,
                bounds.height - PADDING - scaled(count, max, plot_height),
            )
        };

        if self.points.len() > 1 {
            let path = Path::new(|builder| {
                for (i, count) in self.points.iter().enumerate() {
                    if i == 0 {
                        builder.move_to(position(i, *count));
                    } else {
                        builder.line_to(position(i, *count));
                    }
                }
            });
            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.5)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        }

        for (i, count) in self.points.iter().enumerate() {
            let marker = Path::new(|builder| builder.circle(position(i, *count), 3.0));
            frame.fill(&marker, Color::from_rgb(0.95, 0.55, 0.2));
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framescope::aggregation::ClassNameTable;
    use framescope::compute_aggregate_stats;
    use framescope::service_interface::{BoundingBoxDetection, DetectionFrame};

    #[test]
    fn scaled_handles_empty_and_full_heights() {
        assert_eq!(scaled(3, 0, 100.0), 0.0);
        assert_eq!(scaled(4, 4, 100.0), 100.0);
        assert_eq!(scaled(1, 4, 100.0), 25.0);
    }

    #[test]
    fn chart_data_follows_aggregate_order() {
        let det = |class| BoundingBoxDetection::new((0.0, 0.0, 1.0, 1.0), 0.5, class).unwrap();
        let frames = vec![
            DetectionFrame::new("a", vec![det(3), det(0), det(3)], ""),
            DetectionFrame::new("b", vec![], ""),
        ];
        let stats = compute_aggregate_stats(&frames, &ClassNameTable::default()).unwrap();

        let bars = ClassBars::new(&stats);
        assert_eq!(bars.counts, vec![2, 1]);
        assert_eq!(bars.max, 2);
        assert_eq!(FrameSeries::new(&stats.per_frame_series).points, vec![3, 0]);
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(bar_color(0), bar_color(PALETTE.len()));
    }
}
