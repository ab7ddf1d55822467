use mc_jet_analyses::analyses;
use mc_jet_analyses::{AnalysisRunner, Event, Histogram1D, PseudoJet, RunInfo};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing_subscriber::EnvFilter;

// Each line of the input holds one event: a weight followed by
// `pt eta phi` triplets of its jets, hardest first.
fn read_events(path: &Path) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let floats = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<f64>, _>>()?;
        let Some((&weight, jets)) = floats.split_first() else {
            continue;
        };
        let jets = jets
            .chunks_exact(3)
            .map(|j| PseudoJet::from_pt_eta_phi(j[0], j[1], j[2]))
            .collect();
        events.push(Event::new(jets, weight));
    }
    Ok(events)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./demos/data/vbf-events.dat".to_string());
    let events = read_events(Path::new(&path))?;

    let mut runner = AnalysisRunner::new(analyses::mc_dm_vbf(&RunInfo::new(13_000.0)));
    runner.run(events, None)?;
    println!("{}", runner.cutflow());

    let mut histograms: Vec<Histogram1D> = Vec::new();
    runner.export(&mut histograms)?;
    println!("\n{:<20} {:>10} {:>15}", "histogram", "entries", "integral");
    for h in &histograms {
        println!("{:<20} {:>10} {:>15.8}", h.name(), h.entries(), h.integral());
    }
    Ok(())
}
