//! UI/Progress presentation layer
//!
//! This module handles:
//! - Stage progress of running installs, using indicatif
//! - Silent progress for tests and non-interactive runs
//! - Console summaries of install results ([`display`])
//!
//! The installer reports through the [`StageReporter`] trait and never
//! writes to the terminal itself.

pub mod display;

use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::InstallResult;
use crate::installer::InstallStage;

/// Receives stage transitions of one or more installs
pub trait StageReporter {
    /// A new bundle starts installing
    fn start_bundle(&mut self, bundle_name: &str, current: usize, total: usize);

    /// The installer entered `stage`
    fn stage_started(&mut self, stage: InstallStage);

    /// The current bundle reached the final stage
    fn finish_bundle(&mut self, result: &InstallResult);

    /// Abandon on error or cancellation
    fn abandon(&mut self);
}

/// Spinner with a stage counter, drawn on stderr
pub struct InteractiveStageReporter {
    stage_pb: ProgressBar,
    bundle: String,
}

impl InteractiveStageReporter {
    pub fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let stage_pb = ProgressBar::new(InstallStage::SEQUENCE.len() as u64);
        stage_pb.set_style(style);

        Self {
            stage_pb,
            bundle: String::new(),
        }
    }
}

impl Default for InteractiveStageReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StageReporter for InteractiveStageReporter {
    fn start_bundle(&mut self, bundle_name: &str, current: usize, total: usize) {
        self.bundle = if total > 1 {
            format!("({current}/{total}) {bundle_name}")
        } else {
            bundle_name.to_string()
        };
        self.stage_pb.reset();
        self.stage_pb.set_message(self.bundle.clone());
    }

    fn stage_started(&mut self, stage: InstallStage) {
        if let Some(position) = InstallStage::SEQUENCE.iter().position(|s| *s == stage) {
            self.stage_pb.set_position(position as u64 + 1);
        }
        self.stage_pb.set_message(format!("{}: {stage}", self.bundle));
        self.stage_pb.tick();
    }

    fn finish_bundle(&mut self, result: &InstallResult) {
        self.stage_pb
            .finish_with_message(format!("{}: {} created", self.bundle, result.total_created()));
    }

    fn abandon(&mut self) {
        self.stage_pb.abandon();
    }
}

/// No-op reporter
#[derive(Debug, Default)]
pub struct SilentStageReporter;

impl StageReporter for SilentStageReporter {
    fn start_bundle(&mut self, _bundle_name: &str, _current: usize, _total: usize) {}

    fn stage_started(&mut self, _stage: InstallStage) {}

    fn finish_bundle(&mut self, _result: &InstallResult) {}

    fn abandon(&mut self) {}
}
