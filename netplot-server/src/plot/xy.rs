use netplot_common::ChartKind;

use super::{ChartBase, ChartModel, PlotChange, PlotData, PlotHandle, PlotVariant};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
struct Trace {
    points: Vec<(f64, f64)>,
    cursor: usize,
}

/// Scatter/line chart of explicit `(x, y)` points.
///
/// Each trace has a write cursor. Points written below the current length
/// replace the point at the cursor, otherwise they are appended. `replot`
/// rewinds the cursor so a client can redraw a trace in place.
#[derive(Debug, Clone)]
pub struct XyPlot {
    base: ChartBase,
    traces: Vec<Trace>,
}

impl XyPlot {
    pub fn new() -> Self {
        Self {
            base: ChartBase::new(ChartKind::Xy),
            traces: Vec::new(),
        }
    }
}

impl Default for XyPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotVariant for XyPlot {
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
        let handle = self.base.register_plot(false);
        self.traces.push(Trace::default());
        Ok(handle)
    }

    fn add_xy_value(&mut self, index: usize, x: f64, y: f64) -> Result<()> {
        self.base.check_index(index)?;
        let trace = &mut self.traces[index];
        let at = trace.cursor;
        match trace.points.get_mut(at) {
            Some(point) => *point = (x, y),
            None => trace.points.push((x, y)),
        }
        trace.cursor += 1;
        self.base.record(PlotChange::SetPoint {
            plot: index,
            at,
            point: (x, y),
        });
        Ok(())
    }

    fn clear(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)?;
        let trace = &mut self.traces[index];
        trace.points.clear();
        trace.cursor = 0;
        self.base.record(PlotChange::ClearPoints { plot: index });
        Ok(())
    }

    fn replot(&mut self, index: usize) -> Result<()> {
        self.base.check_index(index)?;
        self.traces[index].cursor = 0;
        Ok(())
    }

    fn render(&self) -> ChartModel {
        self.base.model(
            self.traces
                .iter()
                .map(|trace| PlotData::Points(trace.points.clone())),
        )
    }
}
