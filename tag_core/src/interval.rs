use std::{collections::HashMap, io::BufRead, path::Path, sync::Arc};

use compress_io::compress::CompressIo;

use crate::{
    count::{N_SCORE_FIELDS, TRACK_PREFIX},
    error::{CountError, Result},
    next_line, sort,
};

/// A scored genomic interval from a summary graph (BedGraph style) file.
///
/// Chromosome names are shared between intervals so a collection holds a
/// single allocation per chromosome. Coordinate validity (start <= end) is
/// checked when reading from a file, not on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    chrom: Arc<str>,
    start: usize,
    end: usize,
    value: f64,
}

impl Interval {
    pub fn new<S: Into<Arc<str>>>(chrom: S, start: usize, end: usize, value: f64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            value,
        }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Scored intervals grouped by chromosome, kept in arrival order within
/// each chromosome. Built once by a loader and then only read.
#[derive(Default)]
pub struct IntervalCollection {
    chash: HashMap<Arc<str>, Vec<Interval>>,
}

impl IntervalCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a collection from a summary graph file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut rdr = CompressIo::new().path(path).bufreader()?;
        Self::from_reader(&mut rdr, &path.display().to_string())
    }

    /// Read a collection from an open reader; src names the source in
    /// error reports. Track headers are skipped; every other line must
    /// have exactly four fields (chrom, start, end, score) with
    /// start <= end.
    pub fn from_reader<R: BufRead>(rdr: &mut R, src: &str) -> Result<Self> {
        debug!("Reading intervals from {}", src);
        let mut coll = Self::new();
        let mut buf = String::new();
        let mut line = 0;
        while next_line(rdr, &mut buf)? {
            line += 1;
            // Skip track display headers
            if buf.starts_with(TRACK_PREFIX) {
                continue;
            }
            let fields: Vec<&str> = buf.split_ascii_whitespace().collect();
            if fields.len() != N_SCORE_FIELDS {
                return Err(CountError::format(
                    src,
                    line,
                    format!("expected {} fields, found {}", N_SCORE_FIELDS, fields.len()),
                ));
            }
            let start = fields[1].parse::<usize>().map_err(|_| {
                CountError::format(src, line, format!("bad start value {}", fields[1]))
            })?;
            let end = fields[2].parse::<usize>().map_err(|_| {
                CountError::format(src, line, format!("bad end value {}", fields[2]))
            })?;
            if start > end {
                return Err(CountError::format(
                    src,
                    line,
                    format!("interval start {} after end {}", start, end),
                ));
            }
            let value = fields[3].parse::<f64>().map_err(|_| {
                CountError::format(src, line, format!("bad score value {}", fields[3]))
            })?;
            // Share one name allocation per chromosome
            let chrom = match coll.chash.get_key_value(fields[0]) {
                Some((k, _)) => Arc::clone(k),
                None => Arc::from(fields[0]),
            };
            coll.insert(Interval {
                chrom,
                start,
                end,
                value,
            });
        }
        debug!(
            "Finished reading {}: {} intervals on {} chromosomes",
            src,
            coll.n_intervals(),
            coll.n_chroms()
        );
        Ok(coll)
    }

    /// Append an interval, preserving arrival order within its chromosome
    pub fn insert(&mut self, iv: Interval) {
        if let Some(v) = self.chash.get_mut(iv.chrom()) {
            v.push(iv)
        } else {
            self.chash.insert(Arc::clone(&iv.chrom), vec![iv]);
        }
    }

    /// Chromosome names in lexical order
    pub fn chroms(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.chash.keys().map(|c| c.as_ref()).collect();
        v.sort_unstable();
        v
    }

    pub fn intervals(&self, chrom: &str) -> Option<&[Interval]> {
        self.chash.get(chrom).map(|v| v.as_slice())
    }

    /// Iterate over all intervals in no particular chromosome order
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.chash.values().flat_map(|v| v.iter())
    }

    pub fn n_chroms(&self) -> usize {
        self.chash.len()
    }

    pub fn n_intervals(&self) -> usize {
        self.chash.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chash.is_empty()
    }

    /// Chromosomes whose intervals are not ascending on start, in lexical
    /// order
    pub fn unsorted_chroms(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self
            .chash
            .iter()
            .filter(|(_, ivs)| !sort::is_sorted_by_start(ivs))
            .map(|(c, _)| c.as_ref())
            .collect();
        v.sort_unstable();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const GRAPH: &str = "track type=bedGraph\n\
                         chr1 100 200 1.5\n\
                         chr1 200 300 0.5\n\
                         chr2 50 150 2.0\n\
                         chr1 300 400 -1.0\n";

    #[test]
    fn loads_grouped_by_chromosome() {
        let mut rdr = Cursor::new(GRAPH);
        let coll = IntervalCollection::from_reader(&mut rdr, "graph").unwrap();
        assert_eq!(coll.chroms(), vec!["chr1", "chr2"]);
        assert_eq!(coll.n_intervals(), 4);
        let chr1 = coll.intervals("chr1").unwrap();
        assert_eq!(chr1.len(), 3);
        // File order within the chromosome is preserved
        assert_eq!(chr1[0], Interval::new("chr1", 100, 200, 1.5));
        assert_eq!(chr1[2], Interval::new("chr1", 300, 400, -1.0));
        assert!(coll.intervals("chrX").is_none());
    }

    #[test]
    fn rejects_wrong_field_count() {
        let mut rdr = Cursor::new("chr1 100 200 1.0\nchr1 300 400\n");
        assert!(matches!(
            IntervalCollection::from_reader(&mut rdr, "graph"),
            Err(CountError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn rejects_start_after_end() {
        let mut rdr = Cursor::new("chr1 200 100 1.0\n");
        assert!(matches!(
            IntervalCollection::from_reader(&mut rdr, "graph"),
            Err(CountError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_bad_coordinates() {
        let mut rdr = Cursor::new("chr1 x 100 1.0\n");
        assert!(IntervalCollection::from_reader(&mut rdr, "graph").is_err());
    }

    #[test]
    fn zero_length_interval_is_valid() {
        let mut rdr = Cursor::new("chr1 100 100 1.0\n");
        let coll = IntervalCollection::from_reader(&mut rdr, "graph").unwrap();
        assert_eq!(coll.n_intervals(), 1);
    }

    #[test]
    fn unsorted_chroms_reports_offenders() {
        let mut rdr = Cursor::new(GRAPH);
        let coll = IntervalCollection::from_reader(&mut rdr, "graph").unwrap();
        assert!(coll.unsorted_chroms().is_empty());

        let mut coll = IntervalCollection::new();
        coll.insert(Interval::new("chr3", 500, 600, 1.0));
        coll.insert(Interval::new("chr3", 100, 200, 1.0));
        coll.insert(Interval::new("chr4", 0, 10, 1.0));
        assert_eq!(coll.unsorted_chroms(), vec!["chr3"]);
    }

    #[test]
    fn from_path_reads_files() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", GRAPH).unwrap();
        let coll = IntervalCollection::from_path(file.path()).unwrap();
        assert_eq!(coll.n_intervals(), 4);
        assert!(!coll.is_empty());
    }
}
