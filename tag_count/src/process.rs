use std::{
    fmt::{self, Formatter},
    io::Write,
    path::Path,
    thread,
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use crossbeam_channel::{unbounded, Receiver};

use tag_core::{count_tags, total_score, IntervalCollection, ScoreSource};

use crate::config::{Config, CountMode};

/// Total for one input file
#[derive(Debug, Clone, Copy)]
enum Total {
    Tags(u64),
    Score(f64),
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tags(n) => write!(f, "{}", n),
            Self::Score(x) => write!(f, "{:.4}", x),
        }
    }
}

fn count_one(path: &Path, mode: CountMode) -> anyhow::Result<Total> {
    match mode {
        CountMode::Tags => {
            let n = count_tags(path)
                .with_context(|| format!("Error counting tags from {}", path.display()))?;
            Ok(Total::Tags(n))
        }
        CountMode::Summary {
            threshold,
            check_sort,
        } => {
            let score = if check_sort {
                let coll = IntervalCollection::from_path(path)
                    .with_context(|| format!("Error reading summary graph {}", path.display()))?;
                let bad = coll.unsorted_chroms();
                if !bad.is_empty() {
                    return Err(anyhow!(
                        "{}: intervals not sorted on start for {}",
                        path.display(),
                        bad.join(", ")
                    ));
                }
                total_score(ScoreSource::Collection(&coll), threshold)?
            } else {
                total_score(ScoreSource::File(path), threshold)
                    .with_context(|| format!("Error totalling scores from {}", path.display()))?
            };
            Ok(Total::Score(score))
        }
    }
}

fn counter(
    ix: usize,
    mode: CountMode,
    r: Receiver<(usize, &Path)>,
) -> anyhow::Result<Vec<(usize, Total)>> {
    trace!("Starting up counter thread {}", ix);
    let mut v = Vec::new();
    while let Ok((i, path)) = r.recv() {
        trace!("Counter {} processing {}", ix, path.display());
        v.push((i, count_one(path, mode)?))
    }
    trace!("Closing down counter thread {}", ix);
    Ok(v)
}

/// Strategy
///
/// Each input file is counted independently, so files are farmed out to
/// a pool of counter threads and the totals reassembled in input order
/// before anything is written
pub fn process_inputs(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let inputs = cfg.inputs();
    let mode = cfg.mode();
    let nt = cfg.threads().min(inputs.len()).max(1);

    let mut results: Vec<Option<Total>> = vec![None; inputs.len()];

    if nt == 1 {
        for (i, p) in inputs.iter().enumerate() {
            results[i] = Some(count_one(p, mode)?)
        }
    } else {
        let mut v = Vec::with_capacity(nt);
        // Everything runs within a scope so that we can pass references to the threads
        thread::scope(|sc| {
            trace!("Spawning {} counter threads", nt);

            let (snd, rcv) = unbounded();
            let jobs: Vec<_> = (0..nt)
                .map(|i| {
                    let r = rcv.clone();
                    sc.spawn(move || counter(i + 1, mode, r))
                })
                .collect();
            drop(rcv);

            // Send input files to child threads
            for (i, p) in inputs.iter().enumerate() {
                if snd.send((i, p.as_path())).is_err() {
                    error!("Error sending message to counter threads");
                    break;
                }
            }

            drop(snd);
            for jh in jobs {
                v.push(jh.join())
            }
        });

        trace!("Collecting results from counter threads");
        for (ix, ch) in v.drain(..).enumerate() {
            match ch {
                Ok(c) => {
                    let totals = c
                        .with_context(|| format!("Error returned from counter thread {}", ix + 1))?;
                    for (i, t) in totals {
                        results[i] = Some(t)
                    }
                }
                Err(_) => return Err(anyhow!("Error joining counter thread {}", ix + 1)),
            }
        }
    }

    write_totals(cfg, &results)
}

fn write_totals(cfg: &Config, results: &[Option<Total>]) -> anyhow::Result<()> {
    // All counts must be present before anything is written
    let mut totals = Vec::with_capacity(results.len());
    for (p, t) in cfg.inputs().iter().zip(results.iter()) {
        totals.push(t.ok_or_else(|| anyhow!("Missing count for {}", p.display()))?)
    }

    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;

    // A single input gets a bare total
    if let [t] = totals.as_slice() {
        writeln!(wrt, "{}", t)?;
        return Ok(());
    }

    let mut grand_tags = 0;
    let mut grand_score = 0.0;
    for (p, t) in cfg.inputs().iter().zip(totals.iter()) {
        match t {
            Total::Tags(n) => grand_tags += n,
            Total::Score(x) => grand_score += x,
        }
        writeln!(wrt, "{}\t{}", t, p.display())?
    }
    let grand = match cfg.mode() {
        CountMode::Tags => Total::Tags(grand_tags),
        CountMode::Summary { .. } => Total::Score(grand_score),
    };
    writeln!(wrt, "{}\ttotal", grand)?;
    Ok(())
}
