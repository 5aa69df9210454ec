use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{rows, HEADERS};
use crate::ranking::RankedReport;

pub fn write_csv<W: Write>(report: &RankedReport, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record(HEADERS)?;
    for row in rows(report) {
        wtr.write_record(row.cells())?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn save_csv(report: &RankedReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file '{}'", path.display()))?;
    write_csv(report, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn test_csv_header_and_order() {
        let mut buf = Vec::new();
        write_csv(&sample_report(), &mut buf).unwrap();

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, HEADERS);

        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "alice.pdf");
        assert_eq!(&records[0][1], "82.74");
        assert_eq!(&records[1][0], "bob, jr.pdf");
        assert_eq!(&records[1][4], "docker, python, sql");
    }

    #[test]
    fn test_save_csv_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked_results.csv");
        save_csv(&sample_report(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Filename,Score (%),Explanation,Matched Skills,Missing Skills"));
    }
}
