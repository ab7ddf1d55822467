//! Weighted 1D histograms and the named set an analysis books at init time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::event::CrossSectionProvider;

/// How the bin edges of a histogram are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Binning {
    /// Explicit edges, `n + 1` strictly increasing values for `n` bins.
    Edges { edges: Vec<f64> },
    /// `n` equal-width bins over `[lo, hi)`.
    Linear { n: usize, lo: f64, hi: f64 },
    /// `n` bins equally spaced in log10 over `[lo, hi)`; needs `lo > 0`.
    Log { n: usize, lo: f64, hi: f64 },
}

impl Binning {
    pub fn edges(edges: Vec<f64>) -> Self {
        Binning::Edges { edges }
    }

    pub fn linear(n: usize, lo: f64, hi: f64) -> Self {
        Binning::Linear { n, lo, hi }
    }

    pub fn log(n: usize, lo: f64, hi: f64) -> Self {
        Binning::Log { n, lo, hi }
    }

    /// Materializes and validates the bin edges.
    pub fn to_edges(&self) -> Result<Vec<f64>> {
        let edges = match *self {
            Binning::Edges { ref edges } => edges.clone(),
            Binning::Linear { n, lo, hi } => {
                check_range(n, lo, hi)?;
                let mut edges: Vec<f64> = (0..=n)
                    .map(|i| lo + (hi - lo) * (i as f64) / (n as f64))
                    .collect();
                edges[n] = hi;
                edges
            }
            Binning::Log { n, lo, hi } => {
                check_range(n, lo, hi)?;
                if lo <= 0.0 {
                    return Err(Error::config(format!(
                        "logarithmic binning needs a positive lower bound, got {lo}"
                    )));
                }
                let (log_lo, log_hi) = (lo.log10(), hi.log10());
                let mut edges: Vec<f64> = (0..=n)
                    .map(|i| 10f64.powf(log_lo + (log_hi - log_lo) * (i as f64) / (n as f64)))
                    .collect();
                edges[0] = lo;
                edges[n] = hi;
                edges
            }
        };
        check_edges(&edges)?;
        Ok(edges)
    }
}

fn check_range(n: usize, lo: f64, hi: f64) -> Result<()> {
    if n == 0 {
        return Err(Error::config("binning needs at least one bin"));
    }
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(Error::config(format!("invalid bin range [{lo}, {hi})")));
    }
    Ok(())
}

fn check_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::config(format!(
            "need at least two bin edges, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(Error::config("bin edges must be finite"));
    }
    if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
        return Err(Error::config(format!(
            "bin edges must be strictly increasing ({} >= {})",
            w[0], w[1]
        )));
    }
    Ok(())
}

/// End-of-run transform declared for a histogram at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Keep raw weighted counts.
    #[default]
    None,
    /// Rescale so that the sum of content times bin width is 1.
    Normalize,
    /// Multiply by `cross_section / sum_of_weights`.
    ScaleByCrossSection,
    /// Multiply by a constant.
    ScaleByFactor { factor: f64 },
}

/// A weighted 1D histogram.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram1D {
    name: String,
    edges: Vec<f64>,
    contents: Vec<f64>,
    sumw2: Vec<f64>,
    underflow: f64,
    overflow: f64,
    total_weight: f64,
    entries: u64,
    transform: Transform,
    finalized: bool,
}

impl Histogram1D {
    pub fn new(name: impl Into<String>, binning: &Binning, transform: Transform) -> Result<Self> {
        let name = name.into();
        let edges = binning
            .to_edges()
            .map_err(|e| Error::config(format!("histogram '{name}': {e}")))?;
        if let Transform::ScaleByFactor { factor } = transform
            && !factor.is_finite()
        {
            return Err(Error::config(format!(
                "histogram '{name}': scale factor must be finite, got {factor}"
            )));
        }
        let n_bins = edges.len() - 1;
        Ok(Histogram1D {
            name,
            edges,
            contents: vec![0.0; n_bins],
            sumw2: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
            total_weight: 0.0,
            entries: 0,
            transform,
            finalized: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Sum of squared weights per bin.
    pub fn sumw2(&self) -> &[f64] {
        &self.sumw2
    }

    pub fn n_bins(&self) -> usize {
        self.contents.len()
    }

    pub fn bin_width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Weight of every fill, in range or not.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Sum of bin content times bin width, flows excluded.
    pub fn integral(&self) -> f64 {
        self.contents
            .iter()
            .enumerate()
            .map(|(i, c)| c * self.bin_width(i))
            .sum()
    }

    /// Index of the bin with `edges[i] <= value < edges[i + 1]`.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        let (lo, hi) = (self.edges[0], self.edges[self.edges.len() - 1]);
        if !(value >= lo && value < hi) {
            return None;
        }
        Some(self.edges.partition_point(|&e| e <= value) - 1)
    }

    /// Adds `weight` to the bin containing `value`. Out-of-range values only
    /// count towards the flows and the total weight.
    pub fn fill(&mut self, value: f64, weight: f64) -> Result<Option<usize>> {
        if self.finalized {
            return Err(Error::HistogramFinalized(self.name.clone()));
        }
        self.total_weight += weight;
        self.entries += 1;
        let bin = self.find_bin(value);
        match bin {
            Some(i) => {
                self.contents[i] += weight;
                self.sumw2[i] += weight * weight;
            }
            None if value < self.edges[0] => self.underflow += weight,
            None if value >= self.edges[self.edges.len() - 1] => self.overflow += weight,
            // NaN
            None => {}
        }
        Ok(bin)
    }

    /// Multiplies every content by `factor`.
    pub fn scale(&mut self, factor: f64) -> Result<()> {
        self.ensure_open()?;
        self.scale_contents(factor);
        self.finalized = true;
        Ok(())
    }

    /// Rescales to unit integral. An empty histogram is left untouched.
    pub fn normalize(&mut self) -> Result<()> {
        self.ensure_open()?;
        let integral = self.integral();
        if integral == 0.0 {
            warn!(histogram = %self.name, "skipping normalization of histogram with zero integral");
        } else {
            self.scale_contents(1.0 / integral);
        }
        self.finalized = true;
        Ok(())
    }

    /// Marks the histogram read-only without touching it.
    fn freeze(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.finalized = true;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finalized {
            Err(Error::HistogramFinalized(self.name.clone()))
        } else {
            Ok(())
        }
    }

    fn scale_contents(&mut self, factor: f64) {
        for c in &mut self.contents {
            *c *= factor;
        }
        for w2 in &mut self.sumw2 {
            *w2 *= factor * factor;
        }
        self.underflow *= factor;
        self.overflow *= factor;
        self.total_weight *= factor;
    }

    fn ensure_mergeable(&self, other: &Histogram1D) -> Result<()> {
        self.ensure_open()?;
        other.ensure_open()?;
        if self.edges != other.edges {
            return Err(Error::config(format!(
                "cannot merge histogram '{}': bin edges differ",
                self.name
            )));
        }
        Ok(())
    }

    /// Sums `other` into this histogram; callers check [`Self::ensure_mergeable`] first.
    fn add(&mut self, other: &Histogram1D) {
        for (c, o) in self.contents.iter_mut().zip(&other.contents) {
            *c += o;
        }
        for (w2, o) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *w2 += o;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.total_weight += other.total_weight;
        self.entries += other.entries;
    }
}

/// Downstream consumer of finalized histograms (persistence, plotting).
pub trait HistogramSink {
    fn record(&mut self, histogram: &Histogram1D) -> Result<()>;
}

impl HistogramSink for Vec<Histogram1D> {
    fn record(&mut self, histogram: &Histogram1D) -> Result<()> {
        self.push(histogram.clone());
        Ok(())
    }
}

/// Histograms addressable by name, kept in booking order.
#[derive(Debug, Clone, Default)]
pub struct HistogramSet {
    histograms: Vec<Histogram1D>,
    index: HashMap<String, usize>,
}

impl HistogramSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(
        &mut self,
        name: impl Into<String>,
        binning: &Binning,
        transform: Transform,
    ) -> Result<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(Error::config(format!("histogram '{name}' booked twice")));
        }
        let histogram = Histogram1D::new(name.clone(), binning, transform)?;
        self.index.insert(name, self.histograms.len());
        self.histograms.push(histogram);
        Ok(())
    }

    pub fn fill(&mut self, name: &str, value: f64, weight: f64) -> Result<Option<usize>> {
        self.get_mut(name)?.fill(value, weight)
    }

    pub fn get(&self, name: &str) -> Option<&Histogram1D> {
        self.index.get(name).map(|&i| &self.histograms[i])
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownHistogram(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Histogram1D> {
        let i = self.position(name)?;
        Ok(&mut self.histograms[i])
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Histogram1D> {
        self.histograms.iter()
    }

    /// Applies every histogram's terminal transform.
    ///
    /// All requirements are checked before any histogram is touched, so on error
    /// the set is left exactly as it was.
    pub fn finalize(&mut self, cross_section: Option<&dyn CrossSectionProvider>) -> Result<()> {
        let mut xs_factor = None;
        for h in &self.histograms {
            h.ensure_open()?;
            if h.transform == Transform::ScaleByCrossSection && xs_factor.is_none() {
                let provider =
                    cross_section.ok_or_else(|| Error::MissingCrossSection(h.name.clone()))?;
                let (sigma, sumw) = (provider.cross_section(), provider.sum_of_weights());
                if sumw == 0.0 {
                    return Err(Error::DegenerateNormalization {
                        name: h.name.clone(),
                        cross_section: sigma,
                    });
                }
                xs_factor = Some(sigma / sumw);
            }
        }

        for h in &mut self.histograms {
            match h.transform {
                Transform::None => h.freeze()?,
                Transform::Normalize => h.normalize()?,
                Transform::ScaleByFactor { factor } => h.scale(factor)?,
                Transform::ScaleByCrossSection => {
                    if let Some(factor) = xs_factor {
                        h.scale(factor)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Adds the raw contents of an identically booked set into this one.
    ///
    /// Every pair is checked before any histogram is summed, so a rejected merge
    /// leaves the set untouched.
    pub fn merge(&mut self, other: &HistogramSet) -> Result<()> {
        if self.len() != other.len() {
            return Err(Error::config(format!(
                "cannot merge histogram sets of sizes {} and {}",
                self.len(),
                other.len()
            )));
        }
        let mut targets = Vec::with_capacity(other.len());
        for theirs in &other.histograms {
            let i = self.position(&theirs.name)?;
            self.histograms[i].ensure_mergeable(theirs)?;
            targets.push(i);
        }
        for (i, theirs) in targets.into_iter().zip(&other.histograms) {
            self.histograms[i].add(theirs);
        }
        Ok(())
    }

    pub fn export(&self, sink: &mut dyn HistogramSink) -> Result<()> {
        self.histograms.iter().try_for_each(|h| sink.record(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CrossSection;

    fn approx_eq(a: f64, b: f64) {
        let diff = (a - b).abs();
        assert!(diff < 1e-12, "left={a}, right={b}, diff={diff}");
    }

    #[test]
    fn explicit_edges_find_the_bracketing_bin() {
        let mut h =
            Histogram1D::new("h", &Binning::edges(vec![0.0, 1.0, 2.0, 4.0, 8.0]), Transform::None)
                .unwrap();
        assert_eq!(h.fill(3.0, 2.0).unwrap(), Some(2));
        assert_eq!(h.contents(), &[0.0, 0.0, 2.0, 0.0]);
        assert_eq!(h.sumw2()[2], 4.0);
    }

    #[test]
    fn left_edges_belong_to_their_own_bin() {
        let (n, lo, hi) = (7, -1.3, 2.9);
        let mut h = Histogram1D::new("h", &Binning::linear(n, lo, hi), Transform::None).unwrap();
        for i in 0..n {
            let left = lo + (hi - lo) * (i as f64) / (n as f64);
            assert_eq!(h.fill(left, 1.0).unwrap(), Some(i));
        }
        assert!(h.contents().iter().all(|&c| c == 1.0));
    }

    #[test]
    fn out_of_range_fills_only_reach_the_flows() {
        let mut h = Histogram1D::new("h", &Binning::linear(2, 0.0, 2.0), Transform::None).unwrap();
        assert_eq!(h.fill(-0.5, 1.5).unwrap(), None);
        assert_eq!(h.fill(2.0, 0.5).unwrap(), None);
        assert_eq!(h.fill(f64::NAN, 1.0).unwrap(), None);
        assert_eq!(h.contents(), &[0.0, 0.0]);
        assert_eq!(h.underflow(), 1.5);
        assert_eq!(h.overflow(), 0.5);
        assert_eq!(h.total_weight(), 3.0);
        assert_eq!(h.entries(), 3);
    }

    #[test]
    fn log_binning_spans_the_range() {
        let edges = Binning::log(4, 10.0, 1e5).to_edges().unwrap();
        assert_eq!(edges.len(), 5);
        assert_eq!(edges[0], 10.0);
        assert_eq!(edges[4], 1e5);
        approx_eq(edges[1].log10(), 2.0);
        approx_eq(edges[2].log10(), 3.0);
    }

    #[test]
    fn invalid_binnings_are_rejected() {
        assert!(Binning::log(10, 0.0, 100.0).to_edges().is_err());
        assert!(Binning::log(10, -1.0, 100.0).to_edges().is_err());
        assert!(Binning::linear(0, 0.0, 1.0).to_edges().is_err());
        assert!(Binning::linear(3, 1.0, 1.0).to_edges().is_err());
        assert!(Binning::edges(vec![0.0, 1.0, 1.0]).to_edges().is_err());
        assert!(Binning::edges(vec![2.0, 1.0]).to_edges().is_err());
        assert!(Binning::edges(vec![0.0]).to_edges().is_err());
        let err = Histogram1D::new("h", &Binning::edges(vec![0.0, f64::INFINITY]), Transform::None)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn normalize_gives_unit_integral_with_uneven_widths() {
        let mut h =
            Histogram1D::new("h", &Binning::edges(vec![0.0, 1.0, 2.0, 4.0, 8.0]), Transform::None)
                .unwrap();
        h.fill(0.5, 3.0).unwrap();
        h.fill(3.0, 2.0).unwrap();
        h.fill(5.0, -0.5).unwrap();
        h.fill(9.0, 100.0).unwrap();
        h.normalize().unwrap();
        approx_eq(h.integral(), 1.0);
        assert!(h.is_finalized());
    }

    #[test]
    fn normalize_leaves_empty_histogram_alone() {
        let mut h = Histogram1D::new("h", &Binning::linear(4, 0.0, 1.0), Transform::None).unwrap();
        h.normalize().unwrap();
        assert_eq!(h.integral(), 0.0);
        assert!(h.is_finalized());
    }

    #[test]
    fn transforms_are_terminal() {
        let mut h = Histogram1D::new("h", &Binning::linear(4, 0.0, 1.0), Transform::None).unwrap();
        h.fill(0.1, 1.0).unwrap();
        h.scale(2.0).unwrap();
        assert_eq!(h.contents()[0], 2.0);
        assert_eq!(h.sumw2()[0], 4.0);
        assert!(matches!(h.normalize(), Err(Error::HistogramFinalized(_))));
        assert!(matches!(h.fill(0.1, 1.0), Err(Error::HistogramFinalized(_))));
    }

    #[test]
    fn set_applies_each_declared_transform() {
        let mut set = HistogramSet::new();
        let binning = Binning::linear(2, 0.0, 2.0);
        set.book("raw", &binning, Transform::None).unwrap();
        set.book("norm", &binning, Transform::Normalize).unwrap();
        set.book("xs", &binning, Transform::ScaleByCrossSection).unwrap();
        set.book("k", &binning, Transform::ScaleByFactor { factor: 0.5 }).unwrap();
        for name in ["raw", "norm", "xs", "k"] {
            set.fill(name, 0.5, 4.0).unwrap();
        }
        set.finalize(Some(&CrossSection::new(3.0, 2.0))).unwrap();

        assert_eq!(set.get("raw").unwrap().contents()[0], 4.0);
        approx_eq(set.get("norm").unwrap().integral(), 1.0);
        assert_eq!(set.get("xs").unwrap().contents()[0], 6.0);
        assert_eq!(set.get("k").unwrap().contents()[0], 2.0);
        assert!(set.iter().all(Histogram1D::is_finalized));
    }

    #[test]
    fn set_finalize_checks_cross_section_before_touching_anything() {
        let mut set = HistogramSet::new();
        set.book("norm", &Binning::linear(2, 0.0, 2.0), Transform::Normalize).unwrap();
        set.book("xs", &Binning::linear(2, 0.0, 2.0), Transform::ScaleByCrossSection)
            .unwrap();
        set.fill("norm", 0.5, 1.0).unwrap();

        assert!(matches!(set.finalize(None), Err(Error::MissingCrossSection(_))));
        assert!(matches!(
            set.finalize(Some(&CrossSection::new(1.0, 0.0))),
            Err(Error::DegenerateNormalization { .. })
        ));
        assert!(!set.get("norm").unwrap().is_finalized());
        assert_eq!(set.get("norm").unwrap().contents()[0], 1.0);
    }

    #[test]
    fn set_rejects_duplicates_and_unknown_names() {
        let mut set = HistogramSet::new();
        set.book("a", &Binning::linear(1, 0.0, 1.0), Transform::None).unwrap();
        assert!(set.book("a", &Binning::linear(1, 0.0, 1.0), Transform::None).is_err());
        assert!(matches!(set.fill("b", 0.5, 1.0), Err(Error::UnknownHistogram(_))));
    }

    #[test]
    fn merge_adds_raw_contents() {
        let mut a = HistogramSet::new();
        a.book("h", &Binning::linear(2, 0.0, 2.0), Transform::None).unwrap();
        let mut b = a.clone();
        a.fill("h", 0.5, 1.0).unwrap();
        b.fill("h", 0.5, 2.0).unwrap();
        b.fill("h", 1.5, 3.0).unwrap();
        a.merge(&b).unwrap();
        let h = a.get("h").unwrap();
        assert_eq!(h.contents(), &[3.0, 3.0]);
        assert_eq!(h.entries(), 3);
        assert_eq!(h.total_weight(), 6.0);
    }

    #[test]
    fn rejected_merge_leaves_the_set_untouched() {
        let mut a = HistogramSet::new();
        a.book("h1", &Binning::linear(2, 0.0, 2.0), Transform::None).unwrap();
        a.book("h2", &Binning::linear(2, 0.0, 2.0), Transform::None).unwrap();
        let mut b = HistogramSet::new();
        b.book("h1", &Binning::linear(2, 0.0, 2.0), Transform::None).unwrap();
        b.book("h2", &Binning::linear(4, 0.0, 2.0), Transform::None).unwrap();
        b.fill("h1", 0.5, 3.0).unwrap();

        assert!(matches!(a.merge(&b), Err(Error::Configuration(_))));
        let h1 = a.get("h1").unwrap();
        assert_eq!(h1.contents(), &[0.0, 0.0]);
        assert_eq!(h1.entries(), 0);
        assert_eq!(h1.total_weight(), 0.0);
    }

    #[test]
    fn export_hands_every_histogram_to_the_sink() {
        let mut set = HistogramSet::new();
        set.book("a", &Binning::linear(1, 0.0, 1.0), Transform::None).unwrap();
        set.book("b", &Binning::linear(1, 0.0, 1.0), Transform::None).unwrap();
        let mut sink: Vec<Histogram1D> = Vec::new();
        set.export(&mut sink).unwrap();
        let names: Vec<&str> = sink.iter().map(Histogram1D::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
