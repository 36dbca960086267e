#[macro_use]
extern crate log;

pub mod count;
pub mod error;
pub mod interval;
pub mod sort;

pub use count::{count_tags, count_tags_from, total_score, total_score_from, ScoreSource};
pub use error::{CountError, Result};
pub use interval::{Interval, IntervalCollection};
pub use sort::{is_sorted, is_sorted_by_start};

use std::io::BufRead;

/// Read in next line.
pub(crate) fn next_line<R: BufRead>(rdr: &mut R, buf: &mut String) -> std::io::Result<bool> {
    buf.clear();
    Ok(rdr.read_line(buf)? != 0)
}
