//! Periodic position log.
//!
//! Appends one line per recorded frame: the frame counter followed by the
//! committed positions of the first few particles, all space separated.
//! Recording only reads the simulation.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use super::error::{SphError, SphResult};
use super::simulation::SphSimulation;

/// Number of particles logged per frame unless configured otherwise.
pub const DEFAULT_SAMPLE_COUNT: usize = 4;

/// Writes particle positions to a text file, one frame per line.
#[derive(Resource, Debug)]
pub struct PositionRecorder {
    path: PathBuf,
    writer: BufWriter<File>,
    frame: u64,
    sample_count: usize,
}

impl PositionRecorder {
    /// Starts a new log at `path`, truncating any existing file.
    pub fn create(path: impl AsRef<Path>, sample_count: usize) -> SphResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| SphError::io(&path, e))?;
        Ok(Self::from_file(path, file, sample_count, 0))
    }

    /// Continues an existing log, numbering new lines from `start_frame`.
    pub fn append(path: impl AsRef<Path>, sample_count: usize, start_frame: u64) -> SphResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SphError::io(&path, e))?;
        Ok(Self::from_file(path, file, sample_count, start_frame))
    }

    fn from_file(path: PathBuf, file: File, sample_count: usize, frame: u64) -> Self {
        Self {
            path,
            writer: BufWriter::new(file),
            frame,
            sample_count,
        }
    }

    /// Writes the current positions of the first `sample_count` particles and
    /// advances the frame counter. Returns the frame number written.
    pub fn record(&mut self, simulation: &SphSimulation) -> SphResult<u64> {
        let positions = simulation
            .particles()
            .iter()
            .take(self.sample_count)
            .map(|p| p.position);
        self.write_line(positions)
    }

    fn write_line(&mut self, positions: impl Iterator<Item = Vec3>) -> SphResult<u64> {
        let frame = self.frame;
        write_frame(&mut self.writer, frame, positions).map_err(|e| SphError::io(&self.path, e))?;
        self.frame += 1;
        Ok(frame)
    }

    /// Frame number the next record will carry.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

fn write_frame(
    writer: &mut impl Write,
    frame: u64,
    positions: impl Iterator<Item = Vec3>,
) -> std::io::Result<()> {
    write!(writer, "{frame}")?;
    for p in positions {
        write!(writer, " {} {} {}", p.x, p.y, p.z)?;
    }
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::params::SphParams;

    fn temp_log(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sph_fluid_{}_{}.txt", name, std::process::id()))
    }

    #[test]
    fn test_record_writes_frame_and_positions() {
        let path = temp_log("record");
        let mut sim = SphSimulation::new(2, SphParams::default()).unwrap();
        let mut recorder = PositionRecorder::create(&path, DEFAULT_SAMPLE_COUNT).unwrap();

        assert_eq!(recorder.record(&sim).unwrap(), 0);
        sim.step(0.01);
        assert_eq!(recorder.record(&sim).unwrap(), 1);
        assert_eq!(recorder.frame(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let fields: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(fields[0], "1");
        assert_eq!(fields.len(), 1 + 3 * DEFAULT_SAMPLE_COUNT);

        let x: f32 = fields[1].parse().unwrap();
        assert_eq!(x, sim.particle_positions()[0].x);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_sample_count_caps_at_particle_count() {
        let path = temp_log("cap");
        let sim = SphSimulation::new(1, SphParams::default()).unwrap();
        let mut recorder = PositionRecorder::create(&path, 4).unwrap();
        recorder.record(&sim).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.split_whitespace().count(), 1 + 3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_create_truncates_and_append_continues() {
        let path = temp_log("truncate");
        let sim = SphSimulation::new(1, SphParams::default()).unwrap();

        let mut recorder = PositionRecorder::create(&path, 1).unwrap();
        recorder.record(&sim).unwrap();
        recorder.record(&sim).unwrap();
        drop(recorder);

        let mut recorder = PositionRecorder::append(&path, 1, 2).unwrap();
        recorder.record(&sim).unwrap();
        drop(recorder);
        let contents = std::fs::read_to_string(&path).unwrap();
        let frames: Vec<&str> = contents
            .lines()
            .filter_map(|l| l.split_whitespace().next())
            .collect();
        assert_eq!(frames, vec!["0", "1", "2"]);

        let mut recorder = PositionRecorder::create(&path, 1).unwrap();
        recorder.record(&sim).unwrap();
        drop(recorder);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_io_error_is_reported() {
        let path = std::env::temp_dir()
            .join("sph_fluid_missing_dir")
            .join(format!("{}", std::process::id()))
            .join("log.txt");
        let result = PositionRecorder::create(&path, 4);
        assert!(matches!(result, Err(SphError::Io { .. })));
    }
}
