//! # mc-jet-analyses
//!
//! Event selection and weighted histogramming for Monte Carlo jet validation
//! analyses. Events arrive with their jets already clustered and ordered by
//! pt; each analysis applies an ordered list of cuts, derives angular and mass
//! observables from the leading jets of accepted events, fills weighted
//! histograms, and normalizes them once the event source is exhausted.
//!
//! ```no_run
//! use mc_jet_analyses::{AnalysisRunner, Event, RunInfo, analyses};
//!
//! # fn events() -> Vec<Event> { Vec::new() }
//! let run = RunInfo::new(13_000.0);
//! let mut runner = AnalysisRunner::new(analyses::mc_dm_vbf(&run));
//! runner.run(events(), None)?;
//! for h in runner.histograms().iter() {
//!     println!("{}: integral {}", h.name(), h.integral());
//! }
//! # Ok::<(), mc_jet_analyses::Error>(())
//! ```

pub mod analyses;
pub mod analysis;
pub mod cluster_sequence;
pub mod config;
pub mod constants;
pub mod derived;
pub mod error;
pub mod event;
pub mod histogram;
pub mod kinematics;
pub mod pseudo_jet;
pub mod selector;

pub use analysis::{AnalysisDefinition, AnalysisRunner, HistogramBooking, RunState, RunStatistics};
pub use cluster_sequence::{Algorithm, JetClusterer, JetDefinition};
pub use config::AnalysisConfig;
pub use derived::{DerivedQuantities, Observable, Region};
pub use error::{Error, Result};
pub use event::{CrossSection, CrossSectionProvider, Event, RunInfo};
pub use histogram::{Binning, Histogram1D, HistogramSet, HistogramSink, Transform};
pub use pseudo_jet::PseudoJet;
pub use selector::{Cut, CutKind, CutResult, Cutflow, Selector};
