use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use surfrec_core::{Snapshot, State, Trajectory};
use thiserror::Error;

pub mod cli;
pub use cli::*;

#[derive(Debug, Error)]
pub enum TrajectoryIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("snapshot {index} has {found} {what}, header declares {expected}")]
    Shape {
        index: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Tab-delimited trajectory table.
///
/// Columns: `Time`, one `Population<species>` per species, one `R<i>` per
/// event (1-based). Floats use the shortest representation that parses back
/// to the same value.
#[derive(Clone, Debug)]
pub struct TrajectoryWriter {
    species: Vec<String>,
    n_events: usize,
}

impl TrajectoryWriter {
    pub fn new(species: Vec<String>, n_events: usize) -> Self {
        Self { species, n_events }
    }

    pub fn header(&self) -> String {
        let mut columns = Vec::with_capacity(1 + self.species.len() + self.n_events);
        columns.push("Time".to_string());
        columns.extend(self.species.iter().map(|s| format!("Population{}", s)));
        columns.extend((1..=self.n_events).map(|i| format!("R{}", i)));
        columns.join("\t")
    }

    pub fn write_to<W: Write>(&self, trajectory: &Trajectory, out: W) -> Result<(), TrajectoryIoError> {
        let mut out = BufWriter::new(out);
        writeln!(out, "{}", self.header())?;

        for (index, snap) in trajectory.snapshots.iter().enumerate() {
            self.check_shape(index, snap)?;
            write!(out, "{}", snap.time)?;
            for x in snap.state.iter() {
                write!(out, "\t{}", x)?;
            }
            for p in &snap.propensities {
                write!(out, "\t{}", p)?;
            }
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Writes to a hidden sibling of `path` and renames it into place, so
    /// `path` never holds a partial table.
    pub fn write_file(&self, trajectory: &Trajectory, path: &Path) -> Result<(), TrajectoryIoError> {
        StagedOutput::create(path)?.commit(self, trajectory)
    }

    fn check_shape(&self, index: usize, snap: &Snapshot) -> Result<(), TrajectoryIoError> {
        if snap.state.dim() != self.species.len() {
            return Err(TrajectoryIoError::Shape {
                index,
                what: "populations",
                expected: self.species.len(),
                found: snap.state.dim(),
            });
        }
        if snap.propensities.len() != self.n_events {
            return Err(TrajectoryIoError::Shape {
                index,
                what: "propensities",
                expected: self.n_events,
                found: snap.propensities.len(),
            });
        }
        Ok(())
    }
}

/// An output file opened ahead of the run that fills it.
///
/// `create` opens `.<name>.partial` next to the target, so a directory that
/// cannot be written is reported before any work is done. `commit` writes the
/// table and renames it into place; dropping an uncommitted output removes the
/// staging file.
#[derive(Debug)]
pub struct StagedOutput {
    target: PathBuf,
    staging: PathBuf,
    file: Option<File>,
}

impl StagedOutput {
    pub fn create(path: &Path) -> Result<Self, TrajectoryIoError> {
        let staging = staging_path(path);
        let file = File::create(&staging)?;
        debug!("staging output at {}", staging.display());
        Ok(Self {
            target: path.to_path_buf(),
            staging,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.target
    }

    pub fn commit(mut self, writer: &TrajectoryWriter, trajectory: &Trajectory) -> Result<(), TrajectoryIoError> {
        let file = match self.file.take() {
            Some(file) => file,
            None => File::create(&self.staging)?,
        };
        writer.write_to(trajectory, file)?;
        fs::rename(&self.staging, &self.target)?;
        info!("wrote {} rows to {}", trajectory.len(), self.target.display());
        // renamed away; nothing left for Drop to remove
        self.staging = PathBuf::new();
        Ok(())
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        self.file.take();
        if !self.staging.as_os_str().is_empty() {
            let _ = fs::remove_file(&self.staging);
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trajectory".to_string());
    path.with_file_name(format!(".{}.partial", name))
}

/// A trajectory table read back from disk.
#[derive(Clone, Debug)]
pub struct TrajectoryTable {
    pub species: Vec<String>,
    pub n_events: usize,
    pub trajectory: Trajectory,
}

pub fn read_trajectory<R: BufRead>(input: R) -> Result<TrajectoryTable, TrajectoryIoError> {
    let mut lines = input.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(TrajectoryIoError::Parse {
                line: 1,
                message: "missing header".into(),
            })
        }
    };
    let (species, n_events) = parse_header(&header)?;
    let width = 1 + species.len() + n_events;

    let mut trajectory = Trajectory::new();
    for (i, line) in lines.enumerate() {
        let line_no = i + 2;
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let values = line
            .split('\t')
            .map(|field| {
                field.parse::<f64>().map_err(|_| TrajectoryIoError::Parse {
                    line: line_no,
                    message: format!("not a number: {:?}", field),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        if values.len() != width {
            return Err(TrajectoryIoError::Parse {
                line: line_no,
                message: format!("expected {} columns, found {}", width, values.len()),
            });
        }
        let (populations, propensities) = values[1..].split_at(species.len());
        trajectory.push(values[0], State::new(populations.to_vec()), propensities.to_vec());
    }

    debug!(
        "read {} rows over {} species and {} events",
        trajectory.len(),
        species.len(),
        n_events
    );
    Ok(TrajectoryTable {
        species,
        n_events,
        trajectory,
    })
}

pub fn read_trajectory_file(path: &Path) -> Result<TrajectoryTable, TrajectoryIoError> {
    read_trajectory(BufReader::new(File::open(path)?))
}

fn parse_header(header: &str) -> Result<(Vec<String>, usize), TrajectoryIoError> {
    let bad = |message: String| TrajectoryIoError::Parse { line: 1, message };
    let mut columns = header.split('\t');
    if columns.next() != Some("Time") {
        return Err(bad("first column must be Time".into()));
    }

    let mut species = Vec::new();
    let mut n_events = 0;
    for column in columns {
        if let Some(name) = column.strip_prefix("Population") {
            if n_events > 0 {
                return Err(bad(format!("population column {} after rate columns", column)));
            }
            species.push(name.to_string());
        } else if column.strip_prefix('R').and_then(|i| i.parse::<usize>().ok()) == Some(n_events + 1) {
            n_events += 1;
        } else {
            return Err(bad(format!("unexpected column {:?}", column)));
        }
    }
    Ok((species, n_events))
}
