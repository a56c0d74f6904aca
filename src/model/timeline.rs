use chrono::{Duration, NaiveDate};

use super::task::Task;

pub const DEFAULT_CELL_WIDTH: f32 = 18.0;
pub const MIN_CELL_WIDTH: f32 = 2.0;
pub const MAX_CELL_WIDTH: f32 = 80.0;

/// Horizontal placement of a task bar, in pixels from the range start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left: f32,
    pub width: f32,
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Pixel delta to a whole day offset. Rounds, so drags under half a cell snap back to zero.
pub fn column_to_offset_days(pixel_delta: f32, cell_width: f32) -> i64 {
    if cell_width <= 0.0 {
        return 0;
    }
    let days = (pixel_delta / cell_width).round();
    if !days.is_finite() {
        return 0;
    }
    days as i64
}

/// Bar placement for `start..=end`. Inverted or zero-length ranges still get one cell.
pub fn bar_geometry(
    start: NaiveDate,
    end: NaiveDate,
    range_start: NaiveDate,
    cell_width: f32,
) -> BarGeometry {
    let left = days_between(range_start, start) as f32 * cell_width;
    let span = (days_between(start, end) + 1) as f32 * cell_width;
    BarGeometry {
        left,
        width: span.max(cell_width),
    }
}

/// `date` moved by `days`, or `None` when that leaves the representable calendar.
pub fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// The visible window `[start, end)` of the timeline and its zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// First date past the visible range.
    pub end: NaiveDate,
    /// Pixels per day.
    pub cell_width: f32,
}

impl TimelineViewport {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            cell_width: DEFAULT_CELL_WIDTH,
        }
    }

    pub fn with_cell_width(mut self, cell_width: f32) -> Self {
        self.cell_width = cell_width.clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH);
        self
    }

    /// Viewport covering every scheduled task, with a week of lead and a month of tail.
    pub fn fit_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> Self {
        let mut first: Option<NaiveDate> = None;
        let mut last: Option<NaiveDate> = None;
        for task in tasks {
            if let Some(start) = task.start_date {
                first = Some(first.map_or(start, |f| f.min(start)));
                let end = task.bar_end().unwrap_or(start).max(start);
                last = Some(last.map_or(end, |l| l.max(end)));
            }
        }
        let (first, last) = (first.unwrap_or(today), last.unwrap_or(today));
        Self::new(
            shift(first, -7).unwrap_or(first),
            shift(last, 30).unwrap_or(last),
        )
    }

    /// Number of visible day columns.
    pub fn day_count(&self) -> i64 {
        days_between(self.start, self.end).max(0)
    }

    /// Column of `date`, unclamped. Used for drag math.
    pub fn date_to_column(&self, date: NaiveDate) -> i64 {
        days_between(self.start, date)
    }

    /// Column of `date` clamped into the visible range. Used for rendering.
    pub fn date_to_column_clamped(&self, date: NaiveDate) -> i64 {
        self.date_to_column(date)
            .clamp(0, (self.day_count() - 1).max(0))
    }

    pub fn column_to_date(&self, column: i64) -> Option<NaiveDate> {
        shift(self.start, column)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Whether any day of `start..=end` is visible. Inverted ranges are normalized.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        lo < self.end && hi >= self.start
    }

    pub fn offset_days(&self, pixel_delta: f32) -> i64 {
        column_to_offset_days(pixel_delta, self.cell_width)
    }

    /// Bar placement with both ends clamped to the visible range.
    pub fn clamped_bar(&self, start: NaiveDate, end: NaiveDate) -> BarGeometry {
        let last_day = self.end.pred_opt().unwrap_or(self.end).max(self.start);
        bar_geometry(
            start.clamp(self.start, last_day),
            end.clamp(self.start, last_day),
            self.start,
            self.cell_width,
        )
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.day_count() as f32 * self.cell_width
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.cell_width = (self.cell_width * 1.2).min(MAX_CELL_WIDTH);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.cell_width = (self.cell_width / 1.2).max(MIN_CELL_WIDTH);
    }

    /// Scroll the viewport by a number of days.
    /// Scroll the viewport by a number of days. Scrolling off the calendar is ignored.
    pub fn scroll_days(&mut self, days: i64) {
        if let (Some(start), Some(end)) = (shift(self.start, days), shift(self.end, days)) {
            self.start = start;
            self.end = end;
        }
    }
}
