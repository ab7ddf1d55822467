//! Run lifecycle of one analysis: book, select and fill per event, finalize.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::derived::{DerivedQuantities, Observable};
use crate::error::{Error, Result};
use crate::event::{CrossSection, CrossSectionProvider, Event};
use crate::histogram::{Binning, HistogramSet, HistogramSink, Transform};
use crate::selector::{CutResult, Cutflow, Selector};

/// One histogram of an analysis and the observable that feeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBooking {
    pub name: String,
    pub observable: Observable,
    pub binning: Binning,
    #[serde(default)]
    pub transform: Transform,
    /// Fill with weight 1 instead of the event weight.
    #[serde(default)]
    pub unit_weight: bool,
}

impl HistogramBooking {
    pub fn new(
        name: impl Into<String>,
        observable: Observable,
        binning: Binning,
        transform: Transform,
    ) -> Self {
        HistogramBooking {
            name: name.into(),
            observable,
            binning,
            transform,
            unit_weight: false,
        }
    }

    pub fn unit_weight(mut self) -> Self {
        self.unit_weight = true;
        self
    }
}

/// Cuts plus histograms: everything that distinguishes one analysis from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDefinition {
    pub config: AnalysisConfig,
    pub histograms: Vec<HistogramBooking>,
}

impl AnalysisDefinition {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn needs_cross_section(&self) -> bool {
        self.histograms
            .iter()
            .any(|h| h.transform == Transform::ScaleByCrossSection)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// Built, nothing booked yet.
    Created,
    /// Histograms booked, no event seen.
    Configured,
    Running,
    /// Histograms transformed and read-only.
    Finalized,
}

/// Bookkeeping over every event handed to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RunStatistics {
    pub events: u64,
    pub sum_of_weights: f64,
    pub accepted_weight: f64,
}

impl RunStatistics {
    /// Pairs a generator cross section with the weights seen in this run.
    pub fn with_cross_section(&self, cross_section: f64) -> CrossSection {
        CrossSection::new(cross_section, self.sum_of_weights)
    }
}

pub struct AnalysisRunner {
    definition: AnalysisDefinition,
    selector: Selector,
    histograms: HistogramSet,
    state: RunState,
    stats: RunStatistics,
}

impl AnalysisRunner {
    pub fn new(definition: AnalysisDefinition) -> Self {
        let selector = Selector::from_config(&definition.config);
        AnalysisRunner {
            definition,
            selector,
            histograms: HistogramSet::new(),
            state: RunState::Created,
            stats: RunStatistics::default(),
        }
    }

    /// Validates the configuration and books every histogram. Must run once
    /// before the first event.
    pub fn init(&mut self) -> Result<()> {
        self.expect_state("init", &[RunState::Created])?;
        self.definition.config.validate()?;

        let n_leading = self.definition.config.n_leading;
        let mut histograms = HistogramSet::new();
        for booking in &self.definition.histograms {
            booking.observable.validate(n_leading).map_err(|e| match e {
                Error::Configuration(msg) => {
                    Error::Configuration(format!("histogram '{}': {msg}", booking.name))
                }
                other => other,
            })?;
            histograms.book(booking.name.as_str(), &booking.binning, booking.transform)?;
        }
        self.histograms = histograms;
        self.selector.reset();
        self.stats = RunStatistics::default();
        self.state = RunState::Configured;

        info!(
            analysis = %self.definition.name(),
            histograms = self.histograms.len(),
            cuts = self.selector.cuts().len(),
            "analysis initialized"
        );
        Ok(())
    }

    /// Selects one event and, if it passes, fills every histogram its
    /// observables feed.
    pub fn analyze(&mut self, event: &Event) -> Result<CutResult> {
        self.expect_state("analyze", &[RunState::Configured, RunState::Running])?;
        self.state = RunState::Running;
        self.stats.events += 1;
        self.stats.sum_of_weights += event.weight();

        let jets = event.jets_by_pt(self.definition.config.min_jet_pt);
        let result = self.selector.apply(jets);
        if let CutResult::Vetoed { reason } = result {
            debug!(n_jets = jets.len(), "event vetoed: {reason}");
            return Ok(result);
        }

        let derived = DerivedQuantities::compute(jets, &self.definition.config);
        for booking in &self.definition.histograms {
            let Some(value) = derived.value(booking.observable) else {
                continue;
            };
            let weight = if booking.unit_weight { 1.0 } else { event.weight() };
            if let Err(e) = self.histograms.fill(&booking.name, value, weight) {
                warn!(histogram = %booking.name, value, "fill failed: {e}");
            }
        }
        self.stats.accepted_weight += event.weight();
        Ok(result)
    }

    /// Applies each histogram's terminal transform. `cross_section` is only
    /// needed when some histogram is scaled to it.
    pub fn finalize(&mut self, cross_section: Option<&dyn CrossSectionProvider>) -> Result<()> {
        self.expect_state("finalize", &[RunState::Configured, RunState::Running])?;
        self.histograms.finalize(cross_section)?;
        self.state = RunState::Finalized;

        info!(
            analysis = %self.definition.name(),
            events = self.stats.events,
            sum_of_weights = self.stats.sum_of_weights,
            "{} unvetoed events",
            self.selector.accepted()
        );
        debug!("cutflow:\n{}", self.selector.cutflow());
        Ok(())
    }

    /// Drives a whole run over `events`, initializing first if needed.
    pub fn run<I>(&mut self, events: I, cross_section: Option<&dyn CrossSectionProvider>) -> Result<()>
    where
        I: IntoIterator<Item = Event>,
    {
        if self.state == RunState::Created {
            self.init()?;
        }
        for event in events {
            self.analyze(&event)?;
        }
        self.finalize(cross_section)
    }

    /// Hands the finalized histograms to `sink`.
    pub fn export(&self, sink: &mut dyn HistogramSink) -> Result<()> {
        self.expect_state("export", &[RunState::Finalized])?;
        self.histograms.export(sink)
    }

    pub fn histograms(&self) -> &HistogramSet {
        &self.histograms
    }

    pub fn accepted_events(&self) -> u64 {
        self.selector.accepted()
    }

    pub fn cutflow(&self) -> Cutflow {
        self.selector.cutflow()
    }

    pub fn statistics(&self) -> RunStatistics {
        self.stats
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn definition(&self) -> &AnalysisDefinition {
        &self.definition
    }

    fn expect_state(&self, operation: &'static str, allowed: &[RunState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::Lifecycle {
                operation,
                state: self.state,
            })
        }
    }
}
