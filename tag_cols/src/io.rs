use std::io::{BufRead, Write};

use anyhow::Context;
use utils::next_line;

use crate::config::ColOp;

/// Lines starting with this prefix are comments
const COMMENT_PREFIX: &str = "#";

pub fn apply_op<R: BufRead, W: Write>(
    op: &ColOp,
    rdr: &mut R,
    wrt: &mut W,
    src: &str,
) -> anyhow::Result<()> {
    match op {
        ColOp::Rescale { col, factor } => rescale_column(rdr, wrt, src, *col, *factor),
        ColOp::Normalize { col } => normalize_column(rdr, wrt, src, *col),
        ColOp::Add { col, value } => add_column(rdr, wrt, src, *col, value.as_deref()),
        ColOp::Extract { cols } => extract_columns(rdr, wrt, src, *cols),
    }
}

fn parse_column(fields: &[&str], col: usize, src: &str, line: usize) -> anyhow::Result<f64> {
    let s = fields.get(col).ok_or_else(|| {
        anyhow!(
            "{}:{} Column {} out of range ({} fields)",
            src,
            line,
            col,
            fields.len()
        )
    })?;
    s.parse::<f64>()
        .with_context(|| format!("{}:{} Error parsing value in column {}", src, line, col))
}

fn write_with_column<W: Write>(
    wrt: &mut W,
    fields: &[&str],
    col: usize,
    new_value: f64,
) -> anyhow::Result<()> {
    let val = new_value.to_string();
    let out: Vec<&str> = fields
        .iter()
        .enumerate()
        .map(|(i, s)| if i == col { val.as_str() } else { *s })
        .collect();
    writeln!(wrt, "{}", out.join("\t"))?;
    Ok(())
}

/// Multiply column col on each data line by factor.  Comment and blank
/// lines are dropped from the output.
pub fn rescale_column<R: BufRead, W: Write>(
    rdr: &mut R,
    wrt: &mut W,
    src: &str,
    col: usize,
    factor: f64,
) -> anyhow::Result<()> {
    let mut buf = String::new();
    let mut line = 0;

    while let Some(s) = next_line(rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, src))?
    {
        line += 1;
        if s.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let fields: Vec<&str> = s.split_ascii_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let x = parse_column(&fields, col, src, line)?;
        write_with_column(wrt, &fields, col, x * factor)?
    }
    Ok(())
}

/// Divide column col on each data line by its value on the first data
/// line, so the column starts at 1.  Comment and blank lines are dropped
/// from the output.
pub fn normalize_column<R: BufRead, W: Write>(
    rdr: &mut R,
    wrt: &mut W,
    src: &str,
    col: usize,
) -> anyhow::Result<()> {
    let mut buf = String::new();
    let mut line = 0;
    let mut factor: Option<f64> = None;

    while let Some(s) = next_line(rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, src))?
    {
        line += 1;
        if s.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let fields: Vec<&str> = s.split_ascii_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let x = parse_column(&fields, col, src, line)?;
        let f = match factor {
            Some(f) => f,
            None => {
                if x == 0.0 {
                    return Err(anyhow!(
                        "{}:{} Cannot normalize on a zero value in column {}",
                        src,
                        line,
                        col
                    ));
                }
                factor = Some(x);
                x
            }
        };
        write_with_column(wrt, &fields, col, x / f)?
    }
    Ok(())
}

/// Insert a new column at position col on each data line.  With no
/// constant value the new column holds line number labels L1, L2, ...
/// An insert position past the end of a line appends the column.
pub fn add_column<R: BufRead, W: Write>(
    rdr: &mut R,
    wrt: &mut W,
    src: &str,
    col: usize,
    value: Option<&str>,
) -> anyhow::Result<()> {
    let mut buf = String::new();
    let mut line = 0;
    let mut counter = 0;

    while let Some(s) = next_line(rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, src))?
    {
        line += 1;
        if s.starts_with(COMMENT_PREFIX) {
            continue;
        }
        counter += 1;
        let fields: Vec<&str> = s.split_ascii_whitespace().collect();
        let label = value
            .map(str::to_owned)
            .unwrap_or_else(|| format!("L{}", counter));
        let ix = col.min(fields.len());
        let mut out: Vec<&str> = Vec::with_capacity(fields.len() + 1);
        out.extend_from_slice(&fields[..ix]);
        out.push(label.as_str());
        out.extend_from_slice(&fields[ix..]);
        writeln!(wrt, "{}", out.join("\t"))?
    }
    Ok(())
}

/// Copy the two requested columns from each line, in the order given.
/// Lines holding only the lower numbered column produce that column
/// alone; lines holding neither are dropped.
pub fn extract_columns<R: BufRead, W: Write>(
    rdr: &mut R,
    wrt: &mut W,
    src: &str,
    cols: (usize, usize),
) -> anyhow::Result<()> {
    let (c1, c2) = cols;
    let maxi = c1.max(c2);
    let mini = c1.min(c2);
    let mut buf = String::new();
    let mut line = 0;

    while let Some(s) = next_line(rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, src))?
    {
        line += 1;
        let fields: Vec<&str> = s.split_ascii_whitespace().collect();
        if fields.len() > maxi {
            writeln!(wrt, "{}\t{}", fields[c1], fields[c2])?
        } else if fields.len() > mini {
            writeln!(wrt, "{}", fields[mini])?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run<F>(input: &str, f: F) -> anyhow::Result<String>
    where
        F: FnOnce(&mut Cursor<&str>, &mut Vec<u8>) -> anyhow::Result<()>,
    {
        let mut rdr = Cursor::new(input);
        let mut wrt = Vec::new();
        f(&mut rdr, &mut wrt)?;
        Ok(String::from_utf8(wrt).unwrap())
    }

    #[test]
    fn rescale_rewrites_column() {
        let out = run("# header\nchr1\t100\t5.0\n\nchr2 200 2.5\n", |r, w| {
            rescale_column(r, w, "test", 2, 2.0)
        })
        .unwrap();
        // Comment and blank lines are dropped
        assert_eq!(out, "chr1\t100\t10\nchr2\t200\t5\n");
    }

    #[test]
    fn rescale_reports_bad_values() {
        let e = run("chr1\t100\thigh\n", |r, w| rescale_column(r, w, "test", 2, 2.0)).unwrap_err();
        assert!(e.to_string().contains("test:1"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let e = run("chr1\t100\n", |r, w| rescale_column(r, w, "test", 2, 2.0)).unwrap_err();
        assert!(e.to_string().contains("out of range"));
    }

    #[test]
    fn normalize_divides_by_first_value() {
        let out = run("10 a\n5 b\n2.5 c\n", |r, w| normalize_column(r, w, "test", 0)).unwrap();
        assert_eq!(out, "1\ta\n0.5\tb\n0.25\tc\n");
    }

    #[test]
    fn normalize_rejects_zero_first_value() {
        let e = run("0 a\n5 b\n", |r, w| normalize_column(r, w, "test", 0)).unwrap_err();
        assert!(e.to_string().contains("zero"));
    }

    #[test]
    fn add_labels_data_lines() {
        let out = run("# c\na b\nc d\n", |r, w| add_column(r, w, "test", 1, None)).unwrap();
        assert_eq!(out, "a\tL1\tb\nc\tL2\td\n");
    }

    #[test]
    fn add_uses_constant_value() {
        let out = run("a b\nc d\n", |r, w| add_column(r, w, "test", 0, Some("X"))).unwrap();
        assert_eq!(out, "X\ta\tb\nX\tc\td\n");
    }

    #[test]
    fn add_clamps_insert_position() {
        let out = run("a b\n", |r, w| add_column(r, w, "test", 10, None)).unwrap();
        assert_eq!(out, "a\tb\tL1\n");
    }

    #[test]
    fn add_counts_blank_lines() {
        // A blank line still gets a label row of its own
        let out = run("a b\n\nc d\n", |r, w| add_column(r, w, "test", 1, None)).unwrap();
        assert_eq!(out, "a\tL1\tb\nL2\nc\tL3\td\n");
    }

    #[test]
    fn extract_pairs_columns_in_given_order() {
        let out = run("a b c\nd e\nf\n", |r, w| {
            extract_columns(r, w, "test", (2, 0))
        })
        .unwrap();
        assert_eq!(out, "c\ta\nd\nf\n");
    }

    #[test]
    fn extract_drops_lines_without_columns() {
        let out = run("a\nb c d\n", |r, w| extract_columns(r, w, "test", (1, 2))).unwrap();
        assert_eq!(out, "c\td\n");
    }
}
