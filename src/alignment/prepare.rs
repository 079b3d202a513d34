//! Preparation of mate-aware input by external tools.
//!
//! Conversion to BAM, coordinate sorting and duplicate removal are not done
//! in-process. The SAM stage asks an [`AlignmentPreparer`] for a path that is
//! ready to read, so callers can plug in samtools, a different toolchain, or
//! nothing at all.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::{PipelineError, Result};

/// Turns a user-supplied alignment file into one ready for parsing.
pub trait AlignmentPreparer {
    fn prepare(&self, input: &Path) -> Result<PathBuf>;
}

/// Use the input exactly as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsIs;

impl AlignmentPreparer for AsIs {
    fn prepare(&self, input: &Path) -> Result<PathBuf> {
        Ok(input.to_path_buf())
    }
}

/// One external preparation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepStep {
    /// SAM text to BAM
    Convert { from: PathBuf, to: PathBuf },
    /// Coordinate sort
    Sort { from: PathBuf, to: PathBuf },
    /// PCR duplicate removal
    Dedup { from: PathBuf, to: PathBuf },
}

impl PrepStep {
    fn args(&self) -> Vec<&OsStr> {
        match self {
            PrepStep::Convert { from, to } => vec![
                OsStr::new("view"),
                OsStr::new("-b"),
                OsStr::new("-S"),
                OsStr::new("-o"),
                to.as_os_str(),
                from.as_os_str(),
            ],
            PrepStep::Sort { from, to } => vec![
                OsStr::new("sort"),
                OsStr::new("-o"),
                to.as_os_str(),
                from.as_os_str(),
            ],
            PrepStep::Dedup { from, to } => {
                vec![OsStr::new("rmdup"), from.as_os_str(), to.as_os_str()]
            }
        }
    }
}

/// Work out which steps a file needs from its name.
///
/// * `*.unique.bam` is used as is, duplicate removal included
/// * `*.sorted.bam` skips sorting
/// * `*.bam` skips conversion
/// * anything else is treated as SAM text
///
/// Returns the steps and the path of the final file.
pub fn plan_steps(input: &Path, rmdup: bool) -> (Vec<PrepStep>, PathBuf) {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    let sibling = |stem: &str, suffix: &str| input.with_file_name(format!("{stem}{suffix}"));

    if lower.ends_with(".unique.bam") {
        return (Vec::new(), input.to_path_buf());
    }

    let mut steps = Vec::new();
    let (stem, sorted) = if lower.ends_with(".sorted.bam") {
        let stem = &name[..name.len() - ".sorted.bam".len()];
        (stem.to_string(), input.to_path_buf())
    } else {
        let (stem, bam) = if lower.ends_with(".bam") {
            let stem = &name[..name.len() - ".bam".len()];
            (stem.to_string(), input.to_path_buf())
        } else {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            let bam = sibling(&stem, ".bam");
            steps.push(PrepStep::Convert {
                from: input.to_path_buf(),
                to: bam.clone(),
            });
            (stem, bam)
        };
        let sorted = sibling(&stem, ".sorted.bam");
        steps.push(PrepStep::Sort {
            from: bam,
            to: sorted.clone(),
        });
        (stem, sorted)
    };

    if rmdup {
        let unique = sibling(&stem, ".unique.bam");
        steps.push(PrepStep::Dedup {
            from: sorted,
            to: unique.clone(),
        });
        (steps, unique)
    } else {
        (steps, sorted)
    }
}

/// Prepare input with the samtools command-line suite.
#[derive(Debug, Clone)]
pub struct Samtools {
    /// Executable to invoke
    pub program: PathBuf,
    /// Remove PCR duplicates after sorting
    pub rmdup: bool,
}

impl Default for Samtools {
    fn default() -> Self {
        Self {
            program: PathBuf::from("samtools"),
            rmdup: false,
        }
    }
}

impl Samtools {
    pub fn with_rmdup(mut self, rmdup: bool) -> Self {
        self.rmdup = rmdup;
        self
    }

    fn run_step(&self, step: &PrepStep) -> Result<()> {
        let args = step.args();
        info!("running {} {:?}", self.program.display(), args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| PipelineError::ExternalTool {
                tool: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(PipelineError::ExternalTool {
                tool: self.program.display().to_string(),
                message: format!("{:?} exited with {}", args, status),
            });
        }
        Ok(())
    }
}

impl AlignmentPreparer for Samtools {
    fn prepare(&self, input: &Path) -> Result<PathBuf> {
        let (steps, output) = plan_steps(input, self.rmdup);
        for step in &steps {
            self.run_step(step)?;
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_sam_full_chain() {
        let (steps, out) = plan_steps(Path::new("/data/run1.sam"), true);
        assert_eq!(
            steps,
            vec![
                PrepStep::Convert {
                    from: "/data/run1.sam".into(),
                    to: "/data/run1.bam".into()
                },
                PrepStep::Sort {
                    from: "/data/run1.bam".into(),
                    to: "/data/run1.sorted.bam".into()
                },
                PrepStep::Dedup {
                    from: "/data/run1.sorted.bam".into(),
                    to: "/data/run1.unique.bam".into()
                },
            ]
        );
        assert_eq!(out, PathBuf::from("/data/run1.unique.bam"));
    }

    #[test]
    fn test_plan_bam_skips_conversion() {
        let (steps, out) = plan_steps(Path::new("run1.BAM"), false);
        assert_eq!(steps.len(), 1);
        assert!(matches!(steps[0], PrepStep::Sort { .. }));
        assert_eq!(out, PathBuf::from("run1.sorted.bam"));
    }

    #[test]
    fn test_plan_sorted_skips_sort() {
        let (steps, out) = plan_steps(Path::new("run1.sorted.bam"), false);
        assert!(steps.is_empty());
        assert_eq!(out, PathBuf::from("run1.sorted.bam"));

        let (steps, out) = plan_steps(Path::new("run1.sorted.bam"), true);
        assert_eq!(steps.len(), 1);
        assert_eq!(out, PathBuf::from("run1.unique.bam"));
    }

    #[test]
    fn test_plan_unique_skips_everything() {
        let (steps, out) = plan_steps(Path::new("run1.unique.bam"), true);
        assert!(steps.is_empty());
        assert_eq!(out, PathBuf::from("run1.unique.bam"));
    }

    #[test]
    fn test_as_is_passthrough() {
        let path = Path::new("x.sam");
        assert_eq!(AsIs.prepare(path).unwrap(), PathBuf::from("x.sam"));
    }

    #[test]
    fn test_missing_program_is_external_tool_error() {
        let tools = Samtools {
            program: PathBuf::from("/nonexistent/samtools"),
            rmdup: false,
        };
        let err = tools.prepare(Path::new("reads.bam")).unwrap_err();
        assert!(matches!(err, PipelineError::ExternalTool { .. }));
    }
}
