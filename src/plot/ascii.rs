//! ASCII bar chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bars up to and including the split year: `=`
//! - bars after the split year: `#`
//! - the count of each bar is printed just above it

use crate::aggregate::YearBar;

const EARLY_FILL: char = '=';
const LATE_FILL: char = '#';

/// Render one bar per year, left to right in the given (ascending) order.
///
/// `height` is the number of rows available to the tallest bar; `bar_width`
/// the number of columns per bar (bars are separated by one blank column).
pub fn render_bar_chart(bars: &[YearBar], split_year: i32, height: usize, bar_width: usize) -> String {
    if bars.is_empty() {
        return "No acquisitions to plot.\n".to_string();
    }

    let height = height.max(2);
    let bar_width = bar_width.max(1);
    let width = bars.len() * (bar_width + 1) - 1;
    let max_count = bars.iter().map(|b| b.count).max().unwrap_or(0).max(1);

    // One extra row on top so the tallest bar still has room for its label.
    let rows = height + 1;
    let mut grid = vec![vec![' '; width]; rows];

    for (i, bar) in bars.iter().enumerate() {
        let x0 = i * (bar_width + 1);
        let h = bar_height(bar.count, max_count, height);
        let fill = if bar.year > split_year { LATE_FILL } else { EARLY_FILL };

        for row in grid.iter_mut().skip(rows - h) {
            for cell in &mut row[x0..x0 + bar_width] {
                *cell = fill;
            }
        }

        let label = bar.count.to_string();
        put_centered(&mut grid[rows - h - 1], x0, bar_width, &label);
    }

    let total: usize = bars.iter().map(|b| b.count).sum();
    let mut out = String::new();
    out.push_str(&format!(
        "Acquisitions per year | n={total} | years={}..{}\n",
        bars[0].year,
        bars[bars.len() - 1].year
    ));

    for row in grid {
        push_line(&mut out, row.into_iter().collect());
    }
    push_line(&mut out, "-".repeat(width));
    for line in year_labels(bars, bar_width, width) {
        push_line(&mut out, line);
    }
    out.push_str(&format!(
        "{EARLY_FILL} <= {split_year}   {LATE_FILL} > {split_year}\n"
    ));

    out
}

/// Scaled bar height; a non-zero count always gets at least one row.
fn bar_height(count: usize, max_count: usize, height: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let h = (count as f64 / max_count as f64 * height as f64).round() as usize;
    h.clamp(1, height)
}

fn put_centered(row: &mut [char], x0: usize, span: usize, text: &str) {
    let chars: Vec<char> = text.chars().collect();
    let start = if chars.len() >= span {
        x0
    } else {
        x0 + (span - chars.len()) / 2
    };
    for (i, ch) in chars.into_iter().enumerate() {
        if let Some(cell) = row.get_mut(start + i) {
            *cell = ch;
        }
    }
}

/// Years under each bar: on one line when they fit, else stacked vertically.
fn year_labels(bars: &[YearBar], bar_width: usize, width: usize) -> Vec<String> {
    let labels: Vec<Vec<char>> = bars.iter().map(|b| b.year.to_string().chars().collect()).collect();
    let fits = labels.iter().all(|l| l.len() <= bar_width);

    if fits {
        let mut row = vec![' '; width];
        for (i, label) in labels.iter().enumerate() {
            let text: String = label.iter().collect();
            put_centered(&mut row, i * (bar_width + 1), bar_width, &text);
        }
        return vec![row.into_iter().collect()];
    }

    let depth = labels.iter().map(Vec::len).max().unwrap_or(0);
    (0..depth)
        .map(|d| {
            let mut row = vec![' '; width];
            for (i, label) in labels.iter().enumerate() {
                if let Some(&ch) = label.get(d) {
                    row[i * (bar_width + 1) + (bar_width - 1) / 2] = ch;
                }
            }
            row.into_iter().collect()
        })
        .collect()
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(year: i32, count: usize) -> YearBar {
        YearBar { year, count }
    }

    #[test]
    fn bar_chart_golden_snapshot_small() {
        let txt = render_bar_chart(&[bar(2010, 1), bar(2012, 2)], 2011, 4, 4);
        let expected = concat!(
            "Acquisitions per year | n=3 | years=2010..2012\n",
            "      2\n",
            "     ####\n",
            " 1   ####\n",
            "==== ####\n",
            "==== ####\n",
            "---------\n",
            "2010 2012\n",
            "= <= 2011   # > 2011\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn narrow_bars_stack_year_labels() {
        let txt = render_bar_chart(&[bar(1997, 1), bar(2014, 1)], 2011, 2, 1);
        let expected = concat!(
            "Acquisitions per year | n=2 | years=1997..2014\n",
            "1 1\n",
            "= #\n",
            "= #\n",
            "---\n",
            "1 2\n",
            "9 0\n",
            "9 1\n",
            "7 4\n",
            "= <= 2011   # > 2011\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn small_counts_still_get_a_row() {
        assert_eq!(bar_height(1, 100, 10), 1);
        assert_eq!(bar_height(100, 100, 10), 10);
        assert_eq!(bar_height(0, 100, 10), 0);
    }

    #[test]
    fn empty_series_renders_a_hint() {
        assert_eq!(render_bar_chart(&[], 2011, 10, 4), "No acquisitions to plot.\n");
    }
}
