use netplot_common::ChartKind;

use super::{ChartBase, ChartModel, PlotChange, PlotData, PlotHandle, PlotVariant};
use crate::error::Result;

const MAX_PLOTS: usize = 2;

/// Dial with up to two needles. Each needle gets its own scale, built from
/// the scale attributes current when it is added.
#[derive(Debug, Clone)]
pub struct DialPlot {
    base: ChartBase,
    values: Vec<f64>,
}

impl DialPlot {
    pub fn new() -> Self {
        Self {
            base: ChartBase::new(ChartKind::Dial),
            values: Vec::new(),
        }
    }
}

impl Default for DialPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotVariant for DialPlot {
    fn base(&self) -> &ChartBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ChartBase {
        &mut self.base
    }

    fn init(&mut self) {
        self.base.reset();
        self.values.clear();
    }

    fn add_plot(&mut self) -> Result<PlotHandle> {
        self.base.check_capacity(MAX_PLOTS)?;
        let handle = self.base.register_plot(true);
        self.values.push(0.0);
        Ok(handle)
    }

    fn add_value(&mut self, index: usize, y: f64) -> Result<()> {
        self.base.check_index(index)?;
        self.values[index] = y;
        self.base.record(PlotChange::SetValue {
            plot: index,
            value: y,
        });
        Ok(())
    }

    fn clear(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)?;
        self.values[index] = 0.0;
        self.base.record(PlotChange::SetValue {
            plot: index,
            value: 0.0,
        });
        Ok(())
    }

    /// Needles have no history, so there is nothing to rewind.
    fn replot(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)
    }

    fn render(&self) -> ChartModel {
        self.base
            .model(self.values.iter().map(|value| PlotData::Value(*value)))
    }
}
