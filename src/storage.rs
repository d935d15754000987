use crate::models::{MetadataRow, ObservationRow};
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save observation rows as CSV with header.
pub fn save_csv<P: AsRef<Path>>(rows: &[ObservationRow], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "series_code",
        "name",
        "unit",
        "frequency",
        "category",
        "last_update",
        "date",
        "value",
    ))?;
    for r in rows {
        wtr.serialize((
            &r.series_code,
            &r.name,
            &r.unit,
            &r.frequency,
            &r.category,
            &r.last_update,
            &r.date,
            r.value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save observation rows as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(rows: &[ObservationRow], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save metadata rows as CSV with header.
pub fn save_metadata_csv<P: AsRef<Path>>(rows: &[MetadataRow], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "series_code",
        "name",
        "unit",
        "frequency",
        "category",
        "layer1",
        "layer2",
        "layer3",
        "layer4",
        "layer5",
        "start",
        "end",
        "last_update",
        "notes",
    ))?;
    for r in rows {
        wtr.serialize((
            &r.series_code,
            &r.name,
            &r.unit,
            &r.frequency,
            &r.category,
            r.layer1,
            r.layer2,
            r.layer3,
            r.layer4,
            r.layer5,
            &r.start,
            &r.end,
            &r.last_update,
            &r.notes,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save metadata rows as pretty JSON array.
pub fn save_metadata_json<P: AsRef<Path>>(rows: &[MetadataRow], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
