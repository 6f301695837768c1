use netplot_common::ChartKind;

use super::{ChartBase, ChartModel, PlotChange, PlotData, PlotHandle, PlotVariant};
use crate::error::Result;

const MAX_PLOTS: usize = 1;

/// Single-series bar chart.
///
/// Bars are numbered from 1 by an internal counter. A value lands on the
/// bar at the counter position, replacing its height if that bar exists and
/// appending a new bar otherwise. `replot` only rewinds the counter, so bars
/// past the rewritten ones keep their old heights.
#[derive(Debug, Clone)]
pub struct BarPlot {
    base: ChartBase,
    bars: Vec<(f64, f64)>,
    counter: usize,
}

impl BarPlot {
    pub fn new() -> Self {
        Self {
            base: ChartBase::new(ChartKind::Bar),
            bars: Vec::new(),
            counter: 1,
        }
    }
}

impl Default for BarPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotVariant for BarPlot {
    fn base(&self) -> &ChartBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ChartBase {
        &mut self.base
    }

    fn init(&mut self) {
        self.base.reset();
        self.bars.clear();
        self.counter = 1;
    }

    fn add_plot(&mut self) -> Result<PlotHandle> {
        self.base.check_capacity(MAX_PLOTS)?;
        Ok(self.base.register_plot(false))
    }

    fn add_value(&mut self, index: usize, y: f64) -> Result<()> {
        self.base.check_index(index)?;
        let at = self.counter - 1;
        let bar = (self.counter as f64, y);
        match self.bars.get_mut(at) {
            Some(existing) => *existing = bar,
            None => self.bars.push(bar),
        }
        self.counter += 1;
        self.base.record(PlotChange::SetPoint {
            plot: index,
            at,
            point: bar,
        });
        Ok(())
    }

    fn clear(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)?;
        self.bars.clear();
        self.counter = 1;
        self.base.record(PlotChange::ClearPoints { plot: index });
        Ok(())
    }

    fn replot(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)?;
        self.counter = 1;
        Ok(())
    }

    fn render(&self) -> ChartModel {
        self.base.model([PlotData::Points(self.bars.clone())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;

    fn bar_with_plot() -> BarPlot {
        let mut bar = BarPlot::new();
        bar.init();
        bar.add_plot().unwrap();
        bar
    }

    fn points(bar: &BarPlot) -> Vec<(f64, f64)> {
        bar.render().plots[0].data.points().to_vec()
    }

    #[test]
    fn test_values_append_bars() {
        let mut bar = bar_with_plot();
        for y in [5.0, 6.0, 7.0] {
            bar.add_value(0, y).unwrap();
        }
        assert_eq!(points(&bar), vec![(1.0, 5.0), (2.0, 6.0), (3.0, 7.0)]);
    }

    #[test]
    fn test_replot_overwrites_in_place() {
        let mut bar = bar_with_plot();
        for y in [5.0, 6.0, 7.0] {
            bar.add_value(0, y).unwrap();
        }
        bar.replot(0).unwrap();
        bar.add_value(0, 9.0).unwrap();
        assert_eq!(points(&bar), vec![(1.0, 9.0), (2.0, 6.0), (3.0, 7.0)]);

        // Writing past the old length appends again.
        for y in [1.0, 2.0, 3.0] {
            bar.add_value(0, y).unwrap();
        }
        assert_eq!(
            points(&bar),
            vec![(1.0, 9.0), (2.0, 1.0), (3.0, 2.0), (4.0, 3.0)]
        );
    }

    #[test]
    fn test_clear_restarts_counter() {
        let mut bar = bar_with_plot();
        bar.add_value(0, 5.0).unwrap();
        bar.add_value(0, 6.0).unwrap();
        bar.clear(0).unwrap();
        assert!(points(&bar).is_empty());

        bar.add_value(0, 8.0).unwrap();
        assert_eq!(points(&bar), vec![(1.0, 8.0)]);
    }

    #[test]
    fn test_replot_records_no_change() {
        let mut bar = bar_with_plot();
        bar.add_value(0, 5.0).unwrap();
        bar.replot(0).unwrap();
        bar.add_value(0, 6.0).unwrap();
        assert_eq!(
            bar.take_changes(),
            vec![
                PlotChange::SetPoint {
                    plot: 0,
                    at: 0,
                    point: (1.0, 5.0),
                },
                PlotChange::SetPoint {
                    plot: 0,
                    at: 0,
                    point: (1.0, 6.0),
                },
            ]
        );
    }

    #[test]
    fn test_single_plot_only() {
        let mut bar = bar_with_plot();
        assert_eq!(
            bar.add_plot(),
            Err(PlotError::TooManyPlots {
                kind: ChartKind::Bar,
                max: 1,
            })
        );
        assert_eq!(bar.plot_count(), 1);
    }

    #[test]
    fn test_invalid_index() {
        let mut bar = BarPlot::new();
        bar.init();
        assert!(matches!(bar.clear(0), Err(PlotError::InvalidIndex { .. })));
        assert!(matches!(bar.replot(0), Err(PlotError::InvalidIndex { .. })));

        let mut bar = bar_with_plot();
        assert!(matches!(bar.add_value(1, 1.0), Err(PlotError::InvalidIndex { .. })));
    }

    #[test]
    fn test_xy_form_is_unsupported() {
        let mut bar = bar_with_plot();
        assert!(matches!(
            bar.add_xy_value(0, 1.0, 2.0),
            Err(PlotError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_init_discards_bars() {
        let mut bar = bar_with_plot();
        bar.add_value(0, 1.0).unwrap();
        bar.init();
        assert_eq!(bar.plot_count(), 0);
        assert!(bar.render().plots.is_empty());
    }
}
