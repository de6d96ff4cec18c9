use super::SampleSource;
use crate::error::{SentinelError, SentinelResult};
use crate::types::{Fix, MotionVector};
use flate2::read::GzDecoder;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One recorded reading. Position fields are optional; a record without them
/// keeps the previous fix.
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    speed_mps: Option<f64>,
}

/// Replays a recorded session, one JSON record per line (`.jsonl` or
/// `.jsonl.gz`). Unparseable lines are skipped.
pub struct ReplaySource {
    lines: Box<dyn BufRead + Send>,
    fix: Option<Fix>,
    exhausted: bool,
    records: u64,
    skipped: u64,
}

impl ReplaySource {
    pub fn open(path: &Path) -> SentinelResult<Self> {
        let file = File::open(path)
            .map_err(|e| SentinelError::Replay(format!("{}: {}", path.display(), e)))?;
        info!("Replaying session from {}", path.display());

        if path.extension().map(|e| e == "gz").unwrap_or(false) {
            Ok(Self::from_reader(BufReader::new(GzDecoder::new(file))))
        } else {
            Ok(Self::from_reader(BufReader::new(file)))
        }
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            lines: Box::new(reader),
            fix: None,
            exhausted: false,
            records: 0,
            skipped: 0,
        }
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn update_fix(&mut self, record: &ReplayRecord) {
        if let (Some(latitude), Some(longitude)) = (record.lat, record.lon) {
            let speed_mps = record
                .speed_mps
                .or(self.fix.map(|f| f.speed_mps))
                .unwrap_or(0.0);
            self.fix = Some(Fix {
                latitude,
                longitude,
                speed_mps,
            });
        } else if let (Some(fix), Some(speed)) = (self.fix.as_mut(), record.speed_mps) {
            fix.speed_mps = speed;
        }
    }
}

impl SampleSource for ReplaySource {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn next_motion_vector(&mut self) -> Option<MotionVector> {
        let mut line = String::new();
        while !self.exhausted {
            line.clear();
            match self.lines.read_line(&mut line) {
                Ok(0) => {
                    info!(
                        "Replay finished: {} records, {} skipped",
                        self.records, self.skipped
                    );
                    self.exhausted = true;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<ReplayRecord>(trimmed) {
                        Ok(record) => {
                            self.records += 1;
                            self.update_fix(&record);
                            return Some(MotionVector::new(record.x, record.y, record.z));
                        }
                        Err(e) => {
                            self.skipped += 1;
                            debug!("Skipping replay line: {}", e);
                        }
                    }
                }
                Err(e) => {
                    info!("Replay stopped on read error: {}", e);
                    self.exhausted = true;
                }
            }
        }
        None
    }

    fn last_known_position(&self) -> Option<Fix> {
        self.fix
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
