use std::{io::BufRead, path::Path};

use compress_io::compress::CompressIo;

use crate::{
    error::{CountError, Result},
    interval::IntervalCollection,
    next_line,
};

/// Lines starting with this prefix are display headers, not data
pub const TRACK_PREFIX: &str = "track";

/// Expected fields per summary graph line (chrom, start, end, score)
pub const N_SCORE_FIELDS: usize = 4;

/// Count the tags in a tag (BED style) file. Every line counts apart
/// from track display headers.
pub fn count_tags<P: AsRef<Path>>(path: P) -> Result<u64> {
    let mut rdr = CompressIo::new().path(path.as_ref()).bufreader()?;
    count_tags_from(&mut rdr)
}

/// Count the tags arriving from an open reader
pub fn count_tags_from<R: BufRead>(rdr: &mut R) -> Result<u64> {
    let mut buf = String::new();
    let mut total = 0;
    while next_line(rdr, &mut buf)? {
        if !buf.starts_with(TRACK_PREFIX) {
            total += 1
        }
    }
    Ok(total)
}

/// Where the scores for [`total_score`] come from: a summary graph file
/// on disk or a collection already in memory. Exactly one source must be
/// supplied.
pub enum ScoreSource<'a> {
    File(&'a Path),
    Collection(&'a IntervalCollection),
}

impl<'a> ScoreSource<'a> {
    pub fn resolve(
        file: Option<&'a Path>,
        collection: Option<&'a IntervalCollection>,
    ) -> Result<Self> {
        match (file, collection) {
            (Some(p), None) => Ok(Self::File(p)),
            (None, Some(c)) => Ok(Self::Collection(c)),
            (None, None) => Err(CountError::InvalidInput(
                "no score source: a summary graph file or a loaded collection is required",
            )),
            (Some(_), Some(_)) => Err(CountError::InvalidInput(
                "two score sources supplied where exactly one is required",
            )),
        }
    }
}

/// A zero threshold disables filtering so negative scores still contribute
fn qualifies(value: f64, threshold: f64) -> bool {
    threshold == 0.0 || value >= threshold
}

/// Sum the scores from src that pass threshold
pub fn total_score(src: ScoreSource, threshold: f64) -> Result<f64> {
    match src {
        ScoreSource::File(p) => {
            let mut rdr = CompressIo::new().path(p).bufreader()?;
            total_score_from(&mut rdr, &p.display().to_string(), threshold)
        }
        ScoreSource::Collection(coll) => Ok(coll
            .iter()
            .filter(|iv| qualifies(iv.value(), threshold))
            .map(|iv| iv.value())
            .sum()),
    }
}

/// Sum qualifying scores from an open reader; src names the source in
/// error reports. Malformed lines abort the sum.
pub fn total_score_from<R: BufRead>(rdr: &mut R, src: &str, threshold: f64) -> Result<f64> {
    let mut buf = String::new();
    let mut line = 0;
    let mut total = 0.0;
    while next_line(rdr, &mut buf)? {
        line += 1;
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
        let value = fields[3].parse::<f64>().map_err(|_| {
            CountError::format(src, line, format!("bad score value {}", fields[3]))
        })?;
        if qualifies(value, threshold) {
            total += value
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const SCORES: &str = "track name=\"x\"\n\
                          chr1 100 200 5.0\n\
                          chr1 200 300 -2.0\n";

    #[test]
    fn tag_counts_skip_track_headers() {
        let mut rdr = Cursor::new("track name=\"reads\"\nchr1\t100\t150\nchr1\t120\t170\n");
        assert_eq!(count_tags_from(&mut rdr).unwrap(), 2);
    }

    #[test]
    fn tag_counts_are_line_counts() {
        // Field layout is not inspected when counting tags
        let mut data = String::from("track one\n");
        for i in 0..9 {
            data.push_str(&format!("chr1\t{}\t{}\n", i * 100, i * 100 + 50));
        }
        let mut rdr = Cursor::new(data);
        assert_eq!(count_tags_from(&mut rdr).unwrap(), 9);
    }

    #[test]
    fn indented_track_line_is_a_tag() {
        // Only lines starting at column one are headers
        let mut rdr = Cursor::new("track a\n track b\nchr1\t0\t10\n");
        assert_eq!(count_tags_from(&mut rdr).unwrap(), 2);
    }

    #[test]
    fn count_tags_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "track x\nchr1\t0\t10\nchr1\t5\t15\nchr2\t0\t20\n").unwrap();
        assert_eq!(count_tags(file.path()).unwrap(), 3);
    }

    #[test]
    fn zero_threshold_keeps_negative_scores() {
        let mut rdr = Cursor::new(SCORES);
        let total = total_score_from(&mut rdr, "scores", 0.0).unwrap();
        assert!((total - 3.0).abs() < 1e-10);
    }

    #[test]
    fn threshold_filters_scores() {
        let mut rdr = Cursor::new(SCORES);
        let total = total_score_from(&mut rdr, "scores", 1.0).unwrap();
        assert!((total - 5.0).abs() < 1e-10);
    }

    #[test]
    fn short_line_is_fatal() {
        let mut rdr = Cursor::new("chr1 100 200 1.0\nchr1 200 300\n");
        assert!(matches!(
            total_score_from(&mut rdr, "scores", 0.0),
            Err(CountError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn bad_score_is_fatal() {
        let mut rdr = Cursor::new("chr1 100 200 high\n");
        assert!(matches!(
            total_score_from(&mut rdr, "scores", 0.0),
            Err(CountError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn resolve_requires_a_source() {
        assert!(matches!(
            ScoreSource::resolve(None, None),
            Err(CountError::InvalidInput(_))
        ));
    }

    #[test]
    fn resolve_rejects_two_sources() {
        let coll = IntervalCollection::new();
        let path = Path::new("scores.graph");
        assert!(matches!(
            ScoreSource::resolve(Some(path), Some(&coll)),
            Err(CountError::InvalidInput(_))
        ));
    }

    #[test]
    fn collection_scores_match_file_scores() {
        let mut rdr = Cursor::new("chr1 100 200 5.0\nchr1 200 300 -2.0\nchr2 0 50 0.25\n");
        let coll = IntervalCollection::from_reader(&mut rdr, "scores").unwrap();
        let t0 = total_score(ScoreSource::Collection(&coll), 0.0).unwrap();
        assert!((t0 - 3.25).abs() < 1e-10);
        let t1 = total_score(ScoreSource::Collection(&coll), 0.25).unwrap();
        assert!((t1 - 5.25).abs() < 1e-10);
    }

    #[test]
    fn empty_collection_sums_to_zero() {
        let coll = IntervalCollection::new();
        let total = total_score(ScoreSource::Collection(&coll), 0.0).unwrap();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn total_score_from_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SCORES).unwrap();
        let total = total_score(ScoreSource::File(file.path()), 1.0).unwrap();
        assert!((total - 5.0).abs() < 1e-10);
    }
}
