use std::path::{Path, PathBuf};

/// A single column transformation applied to every data line
#[derive(Debug, Clone)]
pub enum ColOp {
    Rescale { col: usize, factor: f64 },
    Normalize { col: usize },
    Add { col: usize, value: Option<String> },
    Extract { cols: (usize, usize) },
}

pub struct Config {
    op: ColOp,
    input: PathBuf,
    output: Option<PathBuf>,
}

impl Config {
    pub fn new(op: ColOp, input: PathBuf, output: Option<PathBuf>) -> Self {
        Self { op, input, output }
    }

    pub fn op(&self) -> &ColOp {
        &self.op
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}
