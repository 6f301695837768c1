use chrono::{Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use netplot_common::ChartKind;

use super::{ChartBase, ChartModel, PlotChange, PlotData, PlotHandle, PlotVariant};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
struct TimeTrace {
    /// `(epoch milliseconds, y)`, sorted by time, at most one point per
    /// millisecond.
    points: Vec<(i64, f64)>,
    max_age_ms: i64,
}

impl TimeTrace {
    /// Store a point, then drop points older than the max age. Returns the
    /// write and the number of points dropped.
    fn insert(&mut self, plot: usize, at: i64, y: f64) -> (PlotChange, usize) {
        let point = (at as f64, y);
        let write = match self.points.binary_search_by_key(&at, |(t, _)| *t) {
            Ok(pos) => {
                self.points[pos].1 = y;
                PlotChange::SetPoint { plot, at: pos, point }
            }
            Err(pos) => {
                self.points.insert(pos, (at, y));
                PlotChange::InsertPoint { plot, at: pos, point }
            }
        };

        if self.max_age_ms <= 0 {
            return (write, 0);
        }
        let stale = match self.points.last() {
            Some(&(newest, _)) => {
                let cutoff = newest.saturating_sub(self.max_age_ms);
                self.points.partition_point(|(t, _)| *t < cutoff)
            }
            None => 0,
        };
        self.points.drain(..stale);
        (write, stale)
    }
}

/// Values against wall-clock time.
///
/// Sequential values are stamped with the time of arrival; indexed values
/// carry their own local wall-clock timestamp. Points are ordered and aged on
/// absolute instants, so clock changes do not reorder or expire them. A
/// second value at the same millisecond replaces the first. `replot` has nothing to rewind and only validates the
/// index.
#[derive(Debug, Clone)]
pub struct TimeSeriesPlot {
    base: ChartBase,
    traces: Vec<TimeTrace>,
}

impl TimeSeriesPlot {
    pub fn new() -> Self {
        Self {
            base: ChartBase::new(ChartKind::Time),
            traces: Vec::new(),
        }
    }
}

impl TimeSeriesPlot {
    fn insert(&mut self, index: usize, at_ms: i64, y: f64) {
        let (write, dropped) = self.traces[index].insert(index, at_ms, y);
        self.base.record(write);
        if dropped > 0 {
            self.base.record(PlotChange::DropOldest {
                plot: index,
                count: dropped,
            });
        }
    }
}

impl Default for TimeSeriesPlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Epoch milliseconds of a local wall-clock time. An ambiguous time maps to
/// its first occurrence; a time skipped by a clock change uses the current
/// UTC offset.
fn instant_millis(at: &NaiveDateTime) -> i64 {
    match Local.from_local_datetime(at) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.timestamp_millis(),
        LocalResult::None => {
            let offset = i64::from(Local::now().offset().local_minus_utc());
            at.and_utc().timestamp_millis() - offset * 1000
        }
    }
}

impl PlotVariant for TimeSeriesPlot {
    fn base(&self) -> &ChartBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ChartBase {
        &mut self.base
    }

    fn init(&mut self) {
        self.base.reset();
        self.traces.clear();
    }

    fn add_plot(&mut self) -> Result<PlotHandle> {
        let max_age_ms = i64::try_from(self.attributes().max_age_seconds)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let handle = self.base.register_plot(false);
        self.traces.push(TimeTrace {
            points: Vec::new(),
            max_age_ms,
        });
        Ok(handle)
    }

    fn add_value(&mut self, index: usize, y: f64) -> Result<()> {
        self.base.check_index(index)?;
        self.insert(index, Utc::now().timestamp_millis(), y);
        Ok(())
    }

    fn add_timed_value(&mut self, index: usize, at: NaiveDateTime, y: f64) -> Result<()> {
        self.base.check_index(index)?;
        self.insert(index, instant_millis(&at), y);
        Ok(())
    }

    fn clear(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)?;
        self.traces[index].points.clear();
        self.base.record(PlotChange::ClearPoints { plot: index });
        Ok(())
    }

    fn replot(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)
    }

    fn render(&self) -> ChartModel {
        self.base.model(self.traces.iter().map(|trace| {
            PlotData::Points(
                trace
                    .points
                    .iter()
                    .map(|(t, y)| (*t as f64, *y))
                    .collect(),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;
    use netplot_common::protocol::parse_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn time_with_plots(count: usize) -> TimeSeriesPlot {
        let mut plot = TimeSeriesPlot::new();
        plot.init();
        for _ in 0..count {
            plot.add_plot().unwrap();
        }
        plot
    }

    fn ys(plot: &TimeSeriesPlot, index: usize) -> Vec<f64> {
        plot.render().plots[index]
            .data
            .points()
            .iter()
            .map(|(_, y)| *y)
            .collect()
    }

    #[test]
    fn test_same_timestamp_updates() {
        let mut plot = time_with_plots(1);
        let at = ts("2013;1;2;23;10;5;587");
        plot.add_timed_value(0, at, 1.0).unwrap();
        plot.add_timed_value(0, at, 2.0).unwrap();

        let points = plot.render().plots[0].data.points().to_vec();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0], (instant_millis(&at) as f64, 2.0));
    }

    #[test]
    fn test_points_stay_sorted() {
        let mut plot = time_with_plots(1);
        plot.add_timed_value(0, ts("2013;1;2;10;0;2;0"), 2.0).unwrap();
        plot.add_timed_value(0, ts("2013;1;2;10;0;0;0"), 0.0).unwrap();
        plot.add_timed_value(0, ts("2013;1;2;10;0;1;0"), 1.0).unwrap();
        assert_eq!(ys(&plot, 0), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_old_points_are_pruned() {
        let mut plot = TimeSeriesPlot::new();
        plot.init();
        plot.set_attribute("max_age_seconds", "10").unwrap();
        plot.add_plot().unwrap();

        plot.add_timed_value(0, ts("2013;1;2;10;0;0;0"), 1.0).unwrap();
        plot.add_timed_value(0, ts("2013;1;2;10;0;5;0"), 2.0).unwrap();
        plot.add_timed_value(0, ts("2013;1;2;10;0;12;0"), 3.0).unwrap();
        assert_eq!(ys(&plot, 0), vec![2.0, 3.0]);
    }

    #[test]
    fn test_zero_max_age_keeps_everything() {
        let mut plot = TimeSeriesPlot::new();
        plot.init();
        plot.set_attribute("max_age_seconds", "0").unwrap();
        plot.add_plot().unwrap();

        plot.add_timed_value(0, ts("2000;1;1;0;0;0;0"), 1.0).unwrap();
        plot.add_timed_value(0, ts("2020;1;1;0;0;0;0"), 2.0).unwrap();
        assert_eq!(ys(&plot, 0), vec![1.0, 2.0]);
    }

    #[test]
    fn test_sequential_values_use_now() {
        let mut plot = time_with_plots(2);
        let before = Utc::now().timestamp_millis() as f64;
        plot.add_value(0, 1.0).unwrap();
        plot.add_value(1, 2.0).unwrap();
        let after = Utc::now().timestamp_millis() as f64;

        let model = plot.render();
        let (t, y) = model.plots[0].data.points()[0];
        assert!(t >= before && t <= after);
        assert_eq!(y, 1.0);
        assert_eq!(model.plots[1].data.points()[0].1, 2.0);
    }

    #[test]
    fn test_explicit_timestamps_are_local_wall_time() {
        let mut plot = time_with_plots(1);
        let at = ts("2013;6;2;12;0;0;250");
        plot.add_timed_value(0, at, 1.0).unwrap();

        let expected = Local
            .from_local_datetime(&at)
            .earliest()
            .map(|t| t.timestamp_millis())
            .unwrap();
        assert_eq!(plot.render().plots[0].data.points()[0].0, expected as f64);
    }

    #[test]
    fn test_changes_mirror_inserts_and_pruning() {
        let mut plot = TimeSeriesPlot::new();
        plot.init();
        plot.set_attribute("max_age_seconds", "10").unwrap();
        plot.add_plot().unwrap();

        let first = ts("2013;1;2;10;0;0;0");
        let late = ts("2013;1;2;10;0;20;0");
        plot.add_timed_value(0, first, 1.0).unwrap();
        plot.add_timed_value(0, first, 2.0).unwrap();
        plot.add_timed_value(0, late, 3.0).unwrap();

        let first_ms = instant_millis(&first) as f64;
        let late_ms = instant_millis(&late) as f64;
        assert_eq!(
            plot.take_changes(),
            vec![
                PlotChange::InsertPoint {
                    plot: 0,
                    at: 0,
                    point: (first_ms, 1.0),
                },
                PlotChange::SetPoint {
                    plot: 0,
                    at: 0,
                    point: (first_ms, 2.0),
                },
                PlotChange::InsertPoint {
                    plot: 0,
                    at: 1,
                    point: (late_ms, 3.0),
                },
                PlotChange::DropOldest { plot: 0, count: 1 },
            ]
        );
    }

    #[test]
    fn test_replot_is_noop_but_checks_index() {
        let mut plot = time_with_plots(1);
        plot.add_value(0, 1.0).unwrap();
        plot.replot(0).unwrap();
        assert_eq!(ys(&plot, 0), vec![1.0]);
        assert!(matches!(plot.replot(1), Err(PlotError::InvalidIndex { .. })));
    }

    #[test]
    fn test_clear() {
        let mut plot = time_with_plots(1);
        plot.add_value(0, 1.0).unwrap();
        plot.clear(0).unwrap();
        assert!(ys(&plot, 0).is_empty());
        assert!(matches!(plot.clear(2), Err(PlotError::InvalidIndex { .. })));
    }

    #[test]
    fn test_xy_form_is_unsupported() {
        let mut plot = time_with_plots(1);
        assert!(matches!(
            plot.add_xy_value(0, 1.0, 1.0),
            Err(PlotError::UnsupportedOperation { .. })
        ));
    }
}
