use std::path::{Path, PathBuf};

/// What a run counts: tag lines, or qualifying scores from summary
/// graph files
#[derive(Debug, Clone, Copy)]
pub enum CountMode {
    Tags,
    Summary { threshold: f64, check_sort: bool },
}

pub struct Config {
    inputs: Vec<PathBuf>,
    mode: CountMode,
    threads: usize,
    output_file: Option<PathBuf>,
}

impl Config {
    pub fn new(
        inputs: Vec<PathBuf>,
        mode: CountMode,
        threads: usize,
        output_file: Option<PathBuf>,
    ) -> Self {
        Self {
            inputs,
            mode,
            threads,
            output_file,
        }
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn mode(&self) -> CountMode {
        self.mode
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }
}
