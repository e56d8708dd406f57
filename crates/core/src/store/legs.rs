//! Append-only CSV leg store.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::normalizer::LegRecord;
use crate::planner::Direction;

use super::csv::{push_row, split_row, split_rows};
use super::StoreError;

const HEADER: &str = "direction,destination,city_name,date,price,airline,duration_hrs,stops,departure_time,arrival_time";

/// Trait for durable leg storage.
pub trait LegStore: Send + Sync {
    /// Append records to the store. Records are never updated after write.
    fn append(&self, legs: &[LegRecord]) -> Result<(), StoreError>;

    /// Load every record written so far. An absent store is empty, not an
    /// error (valid state early in a run).
    fn load(&self) -> Result<Vec<LegRecord>, StoreError>;
}

/// CSV-file leg store: fixed header written once at creation, rows appended
/// thereafter. The orchestrator serializes writers.
pub struct CsvLegStore {
    path: PathBuf,
}

impl CsvLegStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LegStore for CsvLegStore {
    fn append(&self, legs: &[LegRecord]) -> Result<(), StoreError> {
        let new_file = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        let mut out = String::new();
        if new_file {
            out.push_str(HEADER);
            out.push('\n');
        }
        for leg in legs {
            write_row(&mut out, leg);
        }

        file.write_all(out.as_bytes())
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.flush().map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<LegRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        // Rows are split quote-aware so a quoted field spanning lines (the
        // writer escapes embedded newlines) reloads as one record.
        let mut records = Vec::new();
        for (idx, row) in split_rows(&content).iter().enumerate() {
            if idx == 0 || row.is_empty() {
                continue;
            }
            records.push(self.parse_row(row, idx + 1)?);
        }
        Ok(records)
    }
}

impl CsvLegStore {
    fn parse_row(&self, line: &str, line_no: usize) -> Result<LegRecord, StoreError> {
        let fields = split_row(line);
        if fields.len() != 10 {
            return Err(StoreError::malformed(
                &self.path,
                format!("line {}: expected 10 fields, got {}", line_no, fields.len()),
            ));
        }

        let bad = |what: &str| {
            StoreError::malformed(&self.path, format!("line {}: bad {}", line_no, what))
        };

        let direction = match fields[0].as_str() {
            "outbound" => Direction::Outbound,
            "return" => Direction::Return,
            _ => return Err(bad("direction")),
        };

        Ok(LegRecord {
            direction,
            destination: fields[1].clone(),
            city_name: fields[2].clone(),
            date: fields[3].parse().map_err(|_| bad("date"))?,
            price: fields[4].parse().map_err(|_| bad("price"))?,
            airline: fields[5].clone(),
            duration_hrs: fields[6].parse().map_err(|_| bad("duration_hrs"))?,
            stops: fields[7].parse().map_err(|_| bad("stops"))?,
            departure_time: fields[8].clone(),
            arrival_time: fields[9].clone(),
        })
    }
}

fn write_row(out: &mut String, leg: &LegRecord) {
    let fields = [
        leg.direction.as_str().to_string(),
        leg.destination.clone(),
        leg.city_name.clone(),
        leg.date.to_string(),
        leg.price.to_string(),
        leg.airline.clone(),
        leg.duration_hrs.to_string(),
        leg.stops.to_string(),
        leg.departure_time.clone(),
        leg.arrival_time.clone(),
    ];
    push_row(out, &fields);
}
