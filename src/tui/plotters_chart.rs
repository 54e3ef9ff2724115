//! Plotters-powered acquisitions bar chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `BarChart` widget?
//! - a real numeric x axis, so gaps between years stay visible
//! - annotations (count labels, the era marker) without manual cell math
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use crate::aggregate::YearBar;

/// Bars up to and including the split year.
const EARLY_COLOR: RGBColor = RGBColor(128, 128, 128);
/// Bars after the split year (steel blue).
const LATE_COLOR: RGBColor = RGBColor(70, 130, 180);
const SELECTED_COLOR: RGBColor = RGBColor(255, 165, 0);
const MARKER_COLOR: RGBColor = RGBColor(255, 255, 0);

/// Half the width of one bar, in years.
const HALF_BAR: f64 = 0.4;

/// A render-only chart description; bounds are derived from `bars`.
pub struct AcqBarChart<'a> {
    /// One bar per year, ascending.
    pub bars: &'a [YearBar],
    pub split_year: i32,
    /// Year drawn in the highlight color, if any.
    pub selected: Option<i32>,
}

impl AcqBarChart<'_> {
    /// `[first - 0.5, last + 0.5]` so the outer bars are not clipped.
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        let first = self.bars.first()?.year as f64;
        let last = self.bars.last()?.year as f64;
        Some([first - 0.5, last + 0.5])
    }

    /// Zero to just above the tallest bar, leaving room for its label.
    pub fn y_bounds(&self) -> [f64; 2] {
        let max = self.bars.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
        [0.0, max * 1.15 + 0.5]
    }

    fn bar_color(&self, bar: &YearBar) -> RGBColor {
        if self.selected == Some(bar.year) {
            SELECTED_COLOR
        } else if bar.year > self.split_year {
            LATE_COLOR
        } else {
            EARLY_COLOR
        }
    }
}

impl Widget for AcqBarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a tiny chart; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }

        let Some([x0, x1]) = self.x_bounds() else {
            return;
        };
        let [y0, y1] = self.y_bounds();
        let split_x = self.split_year as f64 + 0.5;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 5)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("Year")
                .y_desc("Count")
                .x_labels(self.bars.len().min(12))
                .y_labels(5)
                .x_label_formatter(&|v| {
                    if v.fract() == 0.0 { format!("{v:.0}") } else { String::new() }
                })
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart.draw_series(self.bars.iter().map(|bar| {
                let x = bar.year as f64;
                Rectangle::new(
                    [(x - HALF_BAR, 0.0), (x + HALF_BAR, bar.count as f64)],
                    self.bar_color(bar).filled(),
                )
            }))?;

            chart.draw_series(self.bars.iter().map(|bar| {
                Text::new(
                    bar.count.to_string(),
                    (bar.year as f64 - HALF_BAR / 2.0, bar.count as f64 + 0.5),
                    ("sans-serif", 10).into_font().color(&WHITE),
                )
            }))?;

            // Era marker, only when the split falls inside the plotted range.
            if split_x > x0 && split_x < x1 {
                chart.draw_series(LineSeries::new([(split_x, y0), (split_x, y1)], &MARKER_COLOR))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> Vec<YearBar> {
        vec![
            YearBar { year: 1997, count: 1 },
            YearBar { year: 2010, count: 4 },
            YearBar { year: 2014, count: 9 },
        ]
    }

    #[test]
    fn bounds_pad_the_outer_years() {
        let bars = bars();
        let chart = AcqBarChart { bars: &bars, split_year: 2011, selected: None };
        assert_eq!(chart.x_bounds(), Some([1996.5, 2014.5]));
        let [lo, hi] = chart.y_bounds();
        assert_eq!(lo, 0.0);
        assert!(hi > 9.0);
    }

    #[test]
    fn colors_follow_era_and_selection() {
        let bars = bars();
        let chart = AcqBarChart { bars: &bars, split_year: 2011, selected: Some(2010) };
        assert_eq!(chart.bar_color(&bars[0]), EARLY_COLOR);
        assert_eq!(chart.bar_color(&bars[1]), SELECTED_COLOR);
        assert_eq!(chart.bar_color(&bars[2]), LATE_COLOR);
    }

    #[test]
    fn renders_bars_into_the_buffer() {
        let bars = bars();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        AcqBarChart { bars: &bars, split_year: 2011, selected: Some(2014) }.render(area, &mut buf);
        let drawn = buf.content().iter().filter(|c| c.symbol() != " ").count();
        assert!(drawn > 0);
    }

    #[test]
    fn tiny_area_shows_a_hint() {
        let bars = bars();
        let area = Rect::new(0, 0, 50, 4);
        let mut buf = Buffer::empty(area);
        AcqBarChart { bars: &bars, split_year: 2011, selected: None }.render(area, &mut buf);
        let first_row: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(first_row.starts_with("Chart area too small"));
    }

    #[test]
    fn empty_chart_has_no_x_range() {
        let chart = AcqBarChart { bars: &[], split_year: 2011, selected: None };
        assert_eq!(chart.x_bounds(), None);
    }
}
