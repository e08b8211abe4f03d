//! The risk engine: one integration pass over a stack of loss grids.

use std::fmt;
use std::sync::Arc;

use floodrisk_core::{CoreError, Frequency, GeoReference, Grid, GridSource};
use ndarray::{ArrayViewMut2, Axis};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregator::{RiskAggregator, RiskSummary};
use crate::error::{EngineError, EngineResult};
use crate::frequency::LossEvent;
use crate::integrator::RiskCurve;
use crate::observer::{NoopObserver, PassObserver, RowProgress};
use crate::zip::{check_alignment, GridZip};

/// Bands handed to each worker thread on average in a sharded pass.
const BANDS_PER_THREAD: usize = 4;

/// Integrates N co-registered loss grids into a risk grid and a total.
///
/// Built with [`RiskEngineBuilder`]. Frequencies and trapezoid widths are
/// fixed at build time; [`RiskEngine::run`] may be called repeatedly, each
/// call being an independent pass.
pub struct RiskEngine {
    events: Vec<LossEvent>,
    curve: RiskCurve,
    parallel: bool,
    threads: Option<usize>,
    band_rows: Option<usize>,
    strict_georeference: bool,
    observer: Arc<dyn PassObserver>,
}

impl RiskEngine {
    /// Starts a builder.
    pub fn builder() -> RiskEngineBuilder {
        RiskEngineBuilder::new()
    }

    /// Events in integration order.
    pub fn events(&self) -> &[LossEvent] {
        &self.events
    }

    /// Event frequencies in integration order.
    pub fn frequencies(&self) -> &[Frequency] {
        self.curve.frequencies()
    }

    /// The shared risk curve.
    pub fn curve(&self) -> &RiskCurve {
        &self.curve
    }

    /// `(rows, cols)` of every input grid.
    pub fn shape(&self) -> (usize, usize) {
        self.events[0].source().shape()
    }

    /// True if rows are sharded across worker threads.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Runs one pass, writing every cell of `out` and returning the totals.
    ///
    /// `out` must be shaped like the inputs. Its declared no-data value is
    /// only used to count cells whose risk collides with it.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `out` is shaped differently from the inputs,
    /// or placed differently under strict georeference checking.
    /// `IOFailure` if any input row cannot be read. On error the contents of
    /// `out` are unspecified.
    pub fn run(&self, out: &mut Grid<f64>) -> EngineResult<RiskSummary> {
        let sources: Vec<&dyn GridSource<f64>> = self.events.iter().map(LossEvent::source).collect();
        check_alignment(&sources, out.shape())?;
        self.check_georeference(out)?;

        let (rows, cols) = out.shape();
        let sentinel = out.nodata();
        info!(
            rows,
            cols,
            events = self.events.len(),
            parallel = self.parallel,
            "starting risk pass"
        );
        self.observer.on_start(rows, cols);

        let progress = RowProgress::default();
        let aggregator = if self.parallel {
            self.run_sharded(&sources, out.view_mut(), sentinel, &progress)?
        } else {
            self.integrate(GridZip::band(sources, out.view_mut(), 0), cols, sentinel, &progress)?
        };

        let summary = aggregator.finish(rows, cols, self.events.len());
        if summary.sentinel_cells > 0 {
            warn!(
                cells = summary.sentinel_cells,
                nodata = ?summary.nodata,
                "computed risk equals the output no-data value; these cells will read as no-data"
            );
        }
        info!(
            net_risk = summary.net_risk.value(),
            cells = summary.cells,
            "risk pass complete"
        );
        self.observer.on_finish(&summary);
        Ok(summary)
    }

    /// Runs one pass into a fresh grid shaped and georeferenced like the
    /// first input, with every cell starting at `nodata`.
    pub fn compute(&self, nodata: f64) -> EngineResult<(Grid<f64>, RiskSummary)> {
        let model = self.events[0].source();
        let (rows, cols) = model.shape();
        let mut out = Grid::new(rows, cols, nodata)
            .with_geo(model.geo_reference().clone())
            .with_nodata(Some(nodata));
        let summary = self.run(&mut out)?;
        Ok((out, summary))
    }

    fn run_sharded(
        &self,
        sources: &[&dyn GridSource<f64>],
        out: ArrayViewMut2<'_, f64>,
        sentinel: Option<f64>,
        progress: &RowProgress,
    ) -> EngineResult<RiskAggregator> {
        match self.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|err| EngineError::ThreadPool(err.to_string()))?
                .install(|| self.shard(sources, out, sentinel, progress)),
            None => self.shard(sources, out, sentinel, progress),
        }
    }

    fn shard(
        &self,
        sources: &[&dyn GridSource<f64>],
        mut out: ArrayViewMut2<'_, f64>,
        sentinel: Option<f64>,
        progress: &RowProgress,
    ) -> EngineResult<RiskAggregator> {
        let band_rows = self.band_rows(out.nrows());
        let cols = out.ncols();
        debug!(band_rows, threads = rayon::current_num_threads(), "sharding rows");

        let bands: Vec<(usize, ArrayViewMut2<'_, f64>)> = out
            .axis_chunks_iter_mut(Axis(0), band_rows)
            .enumerate()
            .map(|(i, band)| (i * band_rows, band))
            .collect();

        let partials = bands
            .into_par_iter()
            .map(|(first_row, band)| {
                let zip = GridZip::band(sources.to_vec(), band, first_row);
                self.integrate(zip, cols, sentinel, progress)
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let mut total = RiskAggregator::new(sentinel);
        for partial in partials {
            total.merge(partial);
        }
        Ok(total)
    }

    fn integrate(
        &self,
        mut zip: GridZip<'_>,
        cols: usize,
        sentinel: Option<f64>,
        progress: &RowProgress,
    ) -> EngineResult<RiskAggregator> {
        let mut aggregator = RiskAggregator::new(sentinel);
        while let Some(cell) = zip.next_cell()? {
            let row_done = cell.col + 1 == cols;
            let value = self.curve.integrate(cell.losses);
            aggregator.record(cell, value);
            if row_done {
                progress.row_done(self.observer.as_ref());
            }
        }
        Ok(aggregator)
    }

    fn band_rows(&self, rows: usize) -> usize {
        self.band_rows
            .unwrap_or_else(|| rows / (rayon::current_num_threads() * BANDS_PER_THREAD))
            .max(1)
    }

    fn check_georeference(&self, out: &Grid<f64>) -> EngineResult<()> {
        for event in &self.events {
            let Some(reason) = georeference_drift(event.source().geo_reference(), out.geo()) else {
                continue;
            };
            if self.strict_georeference {
                return Err(CoreError::georeference_mismatch(event.name(), reason).into());
            }
            warn!(
                grid = event.name(),
                reason,
                "input georeference differs from the output; grids are assumed co-registered"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskEngine")
            .field("events", &self.events)
            .field("parallel", &self.parallel)
            .field("threads", &self.threads)
            .field("strict_georeference", &self.strict_georeference)
            .finish_non_exhaustive()
    }
}

/// Describes how `geo` differs from `expected`, if it does.
fn georeference_drift(geo: &GeoReference, expected: &GeoReference) -> Option<&'static str> {
    if geo.transform != expected.transform {
        Some("geotransform differs")
    } else if geo.projection != expected.projection {
        Some("projection differs")
    } else {
        None
    }
}

/// Builder for [`RiskEngine`].
pub struct RiskEngineBuilder {
    events: Vec<LossEvent>,
    parallel: bool,
    threads: Option<usize>,
    band_rows: Option<usize>,
    strict_georeference: bool,
    observer: Option<Arc<dyn PassObserver>>,
}

impl RiskEngineBuilder {
    /// Creates an empty, sequential builder.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            parallel: false,
            threads: None,
            band_rows: None,
            strict_georeference: false,
            observer: None,
        }
    }

    /// Appends an event. Events are integrated in the order they are added.
    pub fn with_event(mut self, event: LossEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Appends several events.
    pub fn with_events(mut self, events: impl IntoIterator<Item = LossEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Shards rows across rayon workers.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runs sharded passes on a dedicated pool of `threads` workers
    /// instead of the global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Fixes the number of rows per band in a sharded pass.
    pub fn with_band_rows(mut self, rows: usize) -> Self {
        self.band_rows = Some(rows);
        self
    }

    /// Rejects inputs whose geotransform or projection differs instead of
    /// logging a warning.
    pub fn with_strict_georeference(mut self, strict: bool) -> Self {
        self.strict_georeference = strict;
        self
    }

    /// Installs a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn PassObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validates the event stack and builds the engine.
    ///
    /// # Errors
    ///
    /// `InsufficientData` with fewer than two events, `DimensionMismatch`
    /// if the event grids differ in shape (or in georeference when strict),
    /// `InvalidParameter` for a zero thread count or band size.
    pub fn build(self) -> EngineResult<RiskEngine> {
        if self.events.len() < 2 {
            return Err(CoreError::insufficient_data(2, self.events.len()).into());
        }
        if self.threads == Some(0) {
            return Err(CoreError::invalid_parameter("threads", "thread count must be positive").into());
        }
        if self.band_rows == Some(0) {
            return Err(CoreError::invalid_parameter("band_rows", "band size must be positive").into());
        }

        let shape = self.events[0].source().shape();
        let sources: Vec<&dyn GridSource<f64>> = self.events.iter().map(LossEvent::source).collect();
        check_alignment(&sources, shape)?;
        if self.strict_georeference {
            let model = self.events[0].source().geo_reference();
            for event in &self.events[1..] {
                if let Some(reason) = georeference_drift(event.source().geo_reference(), model) {
                    return Err(CoreError::georeference_mismatch(event.name(), reason).into());
                }
            }
        }

        let curve = RiskCurve::new(self.events.iter().map(LossEvent::frequency).collect())?;
        debug!(
            events = self.events.len(),
            rows = shape.0,
            cols = shape.1,
            frequencies = ?curve.frequencies().iter().map(|f| f.value()).collect::<Vec<_>>(),
            "risk engine built"
        );

        Ok(RiskEngine {
            events: self.events,
            curve,
            parallel: self.parallel || self.threads.is_some(),
            threads: self.threads,
            band_rows: self.band_rows,
            strict_georeference: self.strict_georeference,
            observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
        })
    }
}

impl Default for RiskEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floodrisk_core::ReturnPeriod;

    fn uniform(rows: usize, cols: usize, loss: f64) -> Grid<f64> {
        Grid::new(rows, cols, loss)
    }

    fn event(ari: i64, grid: Grid<f64>) -> LossEvent {
        LossEvent::new(ReturnPeriod::new(ari).unwrap(), grid)
    }

    fn reference_engine() -> RiskEngine {
        RiskEngine::builder()
            .with_event(event(2, uniform(2, 2, 100.0)))
            .with_event(event(10, uniform(2, 2, 200.0)))
            .with_event(event(50, uniform(2, 2, 300.0)))
            .with_event(event(100, uniform(2, 2, 400.0)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let (out, summary) = reference_engine().compute(0.0).unwrap();
        for v in out.cells() {
            assert_relative_eq!(*v, 83.5, epsilon = 1e-10);
        }
        assert_relative_eq!(summary.net_risk.value(), 334.0, epsilon = 1e-9);
        assert_eq!(summary.cells, 4);
        assert_eq!(summary.events, 4);
        assert_eq!(summary.sentinel_cells, 0);
    }

    #[test]
    fn test_needs_two_events() {
        let err = RiskEngine::builder()
            .with_event(event(100, uniform(1, 1, 1.0)))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "InsufficientData");
    }

    #[test]
    fn test_mismatched_inputs_rejected_at_build() {
        let err = RiskEngine::builder()
            .with_event(event(2, uniform(2, 2, 1.0)))
            .with_event(event(10, uniform(3, 2, 1.0)))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "DimensionMismatch");
    }

    #[test]
    fn test_mismatched_output_rejected() {
        let mut out = Grid::new(1, 2, 0.0);
        let err = reference_engine().run(&mut out).unwrap_err();
        assert_eq!(err.kind(), "DimensionMismatch");
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = RiskEngine::builder()
            .with_event(event(2, uniform(1, 1, 1.0)))
            .with_event(event(10, uniform(1, 1, 1.0)))
            .with_threads(0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");
    }

    #[test]
    fn test_sentinel_collisions_counted() {
        let engine = RiskEngine::builder()
            .with_event(event(2, uniform(3, 1, 0.0)))
            .with_event(event(10, uniform(3, 1, 0.0)))
            .build()
            .unwrap();
        let (_, summary) = engine.compute(0.0).unwrap();
        assert_eq!(summary.net_risk.value(), 0.0);
        assert_eq!(summary.sentinel_cells, 3);
        assert_eq!(summary.nodata, Some(0.0));
    }

    #[test]
    fn test_output_keeps_model_georeference() {
        let geo = GeoReference::north_up(500.0, 900.0, 25.0);
        let engine = RiskEngine::builder()
            .with_event(event(2, uniform(2, 2, 1.0).with_geo(geo.clone())))
            .with_event(event(10, uniform(2, 2, 2.0).with_geo(geo.clone())))
            .build()
            .unwrap();
        let (out, _) = engine.compute(-9999.0).unwrap();
        assert_eq!(out.geo(), &geo);
        assert_eq!(out.nodata(), Some(-9999.0));
    }

    fn shifted_pair(strict: bool) -> EngineResult<RiskEngine> {
        let geo = GeoReference::north_up(500.0, 900.0, 25.0);
        let shifted = GeoReference::north_up(525.0, 900.0, 25.0);
        RiskEngine::builder()
            .with_event(event(2, uniform(2, 2, 1.0).with_geo(geo)))
            .with_event(event(10, uniform(2, 2, 2.0).with_geo(shifted)))
            .with_strict_georeference(strict)
            .build()
    }

    #[test]
    fn test_georeference_drift_only_warns_by_default() {
        let (_, summary) = shifted_pair(false).unwrap().compute(0.0).unwrap();
        assert_eq!(summary.cells, 4);
    }

    #[test]
    fn test_strict_georeference_rejects_drift_at_build() {
        let err = shifted_pair(true).unwrap_err();
        assert_eq!(err.kind(), "DimensionMismatch");
        assert!(err.to_string().contains("geotransform differs"));
    }

    #[test]
    fn test_strict_georeference_rejects_drifted_output() {
        let engine = RiskEngine::builder()
            .with_event(event(2, uniform(2, 2, 1.0)))
            .with_event(event(10, uniform(2, 2, 2.0)))
            .with_strict_georeference(true)
            .build()
            .unwrap();
        let mut out = Grid::new(2, 2, 0.0)
            .with_geo(GeoReference::default().with_projection("EPSG:28355"));
        let err = engine.run(&mut out).unwrap_err();
        assert_eq!(err.kind(), "DimensionMismatch");
        assert!(err.to_string().contains("projection differs"));
    }

    #[test]
    fn test_threads_imply_parallel() {
        let engine = RiskEngine::builder()
            .with_event(event(2, uniform(4, 3, 100.0)))
            .with_event(event(10, uniform(4, 3, 200.0)))
            .with_threads(2)
            .with_band_rows(1)
            .build()
            .unwrap();
        assert!(engine.is_parallel());
        let (out, summary) = engine.compute(0.0).unwrap();
        assert_eq!(summary.cells, 12);
        for v in out.cells() {
            assert_relative_eq!(*v, 300.0 * 0.4 / 2.0, epsilon = 1e-12);
        }
    }
}
