use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::{config::Config, io};

pub fn process_file(cfg: &Config) -> anyhow::Result<()> {
    debug!("Applying {:?} to {}", cfg.op(), cfg.input().display());

    let mut rdr = CompressIo::new()
        .path(cfg.input())
        .bufreader()
        .with_context(|| format!("Could not open input file {}", cfg.input().display()))?;

    let mut wrt = CompressIo::new()
        .opt_path(cfg.output())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;

    let src = cfg.input().display().to_string();
    io::apply_op(cfg.op(), &mut rdr, &mut wrt, &src)
}
