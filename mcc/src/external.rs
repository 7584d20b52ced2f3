//! Outlier classification by an external program.
//!
//! The program is invoked once per classifier call with GRASS style
//! `key=value` arguments:
//!
//! ```text
//! <program> [extra args...] input=<file> output=<file> outlier=<file>
//!     ew_step=<x_res> ns_step=<y_res> lambda=<tension>
//!     threshold=<curvature tolerance> density=<grid density>
//!     filter=<positive|negative>
//! ```
//!
//! `input` is a text point file (`x,y,z` per line). The program must
//! write the points it keeps as ground to `output` and the outliers to
//! `outlier`, in any format [`crate::io`] reads as text.

use crate::{
    classifier::{ClassificationResult, ClassifierParams, OutlierClassifier},
    io::{read_points_from, write_points, PointFormat},
    point::PointSet,
    scratch::ScratchSpace,
    MccError,
};
use log::debug;
use std::{
    ffi::OsString,
    fs::File,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

/// Default outlier detection program.
pub const DEFAULT_PROGRAM: &str = "v.outlier";

pub struct ExternalClassifier {
    program: OsString,
    args: Vec<OsString>,
    scratch: ScratchSpace,
}

impl ExternalClassifier {
    pub fn new<S: Into<OsString>>(program: S, scratch: ScratchSpace) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            scratch,
        }
    }

    /// Adds an argument passed before the `key=value` arguments.
    #[must_use]
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn command(&self, files: &CallFiles, params: &ClassifierParams) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(key_value("input", &files.input))
            .arg(key_value("output", &files.ground))
            .arg(key_value("outlier", &files.outlier))
            .arg(format!("ew_step={}", params.resolution.x))
            .arg(format!("ns_step={}", params.resolution.y))
            .arg(format!("lambda={}", params.tension))
            .arg(format!("threshold={}", params.curvature_tolerance))
            .arg(format!("density={}", params.grid_density))
            .arg(format!("filter={}", params.filter))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self, files: &CallFiles, params: &ClassifierParams) -> Result<(), MccError> {
        let mut cmd = self.command(files, params);
        debug!("external; {cmd:?}");
        let output = cmd.output().map_err(|e| MccError::External {
            program: self.program_name(),
            msg: e.to_string(),
        })?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(MccError::External {
                program: self.program_name(),
                msg: format!("{}: {}", output.status, stderr.trim()),
            })
        }
    }

    fn read_output(&self, path: &Path) -> Result<PointSet, MccError> {
        match File::open(path) {
            Ok(file) => read_points_from(BufReader::new(file), PointFormat::Text, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MccError::External {
                program: self.program_name(),
                msg: format!("no output written to {}", path.display()),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl OutlierClassifier for ExternalClassifier {
    fn classify(
        &mut self,
        points: &PointSet,
        params: &ClassifierParams,
    ) -> Result<ClassificationResult, MccError> {
        let files = CallFiles {
            input: self.scratch.acquire("input.txt"),
            ground: self.scratch.acquire("ground.txt"),
            outlier: self.scratch.acquire("outlier.txt"),
        };

        let result = write_points(&files.input, points)
            .and_then(|()| self.run(&files, params))
            .and_then(|()| {
                Ok(ClassificationResult {
                    ground_candidate: self.read_output(&files.ground)?,
                    non_ground: self.read_output(&files.outlier)?,
                })
            });

        for path in [&files.input, &files.ground, &files.outlier] {
            self.scratch.release(path);
        }

        result
    }
}

/// Scratch files of a single classifier call.
struct CallFiles {
    input: PathBuf,
    ground: PathBuf,
    outlier: PathBuf,
}

fn key_value(key: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(key);
    arg.push("=");
    arg.push(path);
    arg
}
