//! Multi-unit rename driver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::config::RenameConfig;
use crate::core::errors::{Result, SymshrinkError, SymshrinkResultExt};
use crate::io::persistence::write_atomic;
use crate::io::rewrite::{apply_edits, CombinedOutput};
use crate::rename::{
    EngineStats, LoadReport, OccurrenceRecord, RenameEngine, RewriteSession, SaveOutcome,
    SessionStats, UnitRewrite,
};

/// Occurrences reported by the front end for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Source file the occurrences point into
    pub file: PathBuf,
    /// Occurrences in traversal order
    #[serde(default)]
    pub occurrences: Vec<OccurrenceRecord>,
}

impl TranslationUnit {
    /// Unit for `file` with the given occurrences
    pub fn new(file: impl Into<PathBuf>, occurrences: Vec<OccurrenceRecord>) -> Self {
        Self {
            file: file.into(),
            occurrences,
        }
    }

    /// Read an occurrence dump.
    ///
    /// A relative `file` is taken relative to the directory of the dump.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_io_err(|| format!("Failed to read occurrence dump: {}", path.display()))?;
        let mut unit: TranslationUnit =
            serde_json::from_str(&content).map_json_err("occurrence dump")?;

        if unit.file.is_relative() {
            if let Some(dir) = path.parent() {
                unit.file = dir.join(&unit.file);
            }
        }
        Ok(unit)
    }
}

/// What happened to the mapping file at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MappingStatus {
    /// No mapping file configured
    NotConfigured,
    /// Every persisted table was empty, nothing written
    SkippedEmpty,
    /// Written with this many entries
    Written {
        /// Entries across the saved tables
        entries: usize,
    },
    /// The write failed
    Failed {
        /// Error description
        message: String,
    },
}

/// A unit whose rewritten text could not be produced or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    /// Affected unit
    pub file: PathBuf,
    /// Error description
    pub message: String,
}

/// Files produced by [`ProjectRenamer::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedOutput {
    /// Source files rewritten in place
    pub files_written: usize,
    /// Combined output file, if one was written
    pub combined_output: Option<PathBuf>,
    /// Units that could not be rewritten
    pub failures: Vec<UnitFailure>,
}

/// Summary of a project run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    /// Units processed
    pub units: usize,
    /// Per-table load results
    pub loaded: Vec<LoadReport>,
    /// Session counters summed over all units
    pub occurrences: SessionStats,
    /// Engine counters at the end of the run
    pub engine: EngineStats,
    /// Source files rewritten in place
    pub files_written: usize,
    /// Combined output file, if one was written
    pub combined_output: Option<PathBuf>,
    /// Units that could not be rewritten
    pub failures: Vec<UnitFailure>,
    /// Fate of the mapping file
    pub mapping: MappingStatus,
}

impl ProjectReport {
    /// Whether every unit and the mapping were handled without error
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !matches!(self.mapping, MappingStatus::Failed { .. })
    }
}

/// Runs one rewrite session per unit against a shared engine.
pub struct ProjectRenamer {
    config: RenameConfig,
    engine: Arc<RenameEngine>,
}

impl ProjectRenamer {
    /// Renamer for a validated configuration
    pub fn new(config: RenameConfig) -> Result<Self> {
        config.validate()?;
        let engine = Arc::new(RenameEngine::from_config(&config));
        Ok(Self { config, engine })
    }

    /// Shared engine
    pub fn engine(&self) -> &Arc<RenameEngine> {
        &self.engine
    }

    /// Active configuration
    pub fn config(&self) -> &RenameConfig {
        &self.config
    }

    /// Load the configured mapping file, if any
    pub fn load_mapping(&self) -> Result<Vec<LoadReport>> {
        match &self.config.mapping_file {
            Some(path) => self.engine.load(path),
            None => Ok(Vec::new()),
        }
    }

    /// Run a session for every unit, in parallel when enabled.
    ///
    /// `on_unit` is called once per finished unit from the worker thread.
    pub fn rewrite_units<F>(&self, units: &[TranslationUnit], on_unit: F) -> Result<Vec<UnitRewrite>>
    where
        F: Fn(&UnitRewrite) + Sync + Send,
    {
        let rewrite = |unit: &TranslationUnit| {
            let mut session = RewriteSession::new(&unit.file, Arc::clone(&self.engine));
            session.run(&unit.occurrences);
            let result = session.finish();
            on_unit(&result);
            result
        };

        #[cfg(feature = "parallel")]
        {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(workers) = self.config.workers {
                builder = builder.num_threads(workers);
            }
            let pool = builder.build().map_err(|e| {
                SymshrinkError::internal(format!("Failed to build worker pool: {e}"))
            })?;
            Ok(pool.install(|| units.par_iter().map(rewrite).collect()))
        }

        #[cfg(not(feature = "parallel"))]
        {
            Ok(units.iter().map(rewrite).collect())
        }
    }

    /// Apply edits to source files as configured.
    ///
    /// A unit that fails is recorded and the others still proceed.
    pub fn apply(&self, rewrites: &[UnitRewrite]) -> AppliedOutput {
        let mut output = AppliedOutput::default();
        if !self.config.write_in_place && self.config.combined_output.is_none() {
            return output;
        }

        let mut combined = CombinedOutput::new();
        for unit in rewrites {
            match self.render_unit(unit) {
                Ok(text) => {
                    if self.config.write_in_place {
                        if let Err(e) = write_atomic(&unit.file, &text) {
                            output.failures.push(UnitFailure {
                                file: unit.file.clone(),
                                message: e.to_string(),
                            });
                            continue;
                        }
                        output.files_written += 1;
                    }
                    combined.push(unit.file.clone(), text);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", unit.file.display(), e);
                    output.failures.push(UnitFailure {
                        file: unit.file.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if let Some(path) = &self.config.combined_output {
            match combined.write_to(path) {
                Ok(()) => {
                    info!("Wrote {} units to {}", combined.len(), path.display());
                    output.combined_output = Some(path.clone());
                }
                Err(e) => output.failures.push(UnitFailure {
                    file: path.clone(),
                    message: e.to_string(),
                }),
            }
        }

        output
    }

    fn render_unit(&self, unit: &UnitRewrite) -> Result<String> {
        let source = std::fs::read_to_string(&unit.file)
            .map_io_err(|| format!("Failed to read source file: {}", unit.file.display()))?;
        apply_edits(&unit.file, &source, &unit.edits)
    }

    /// Persist the mapping if a file is configured
    pub fn save_mapping(&self) -> MappingStatus {
        let Some(path) = &self.config.mapping_file else {
            return MappingStatus::NotConfigured;
        };

        match self.engine.save(path) {
            Ok(SaveOutcome::Written { entries }) => MappingStatus::Written { entries },
            Ok(SaveOutcome::SkippedEmpty) => MappingStatus::SkippedEmpty,
            Err(e) => {
                warn!("Failed to save mapping to {}: {}", path.display(), e);
                MappingStatus::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Load, rewrite, apply and save
    pub fn run(&self, units: &[TranslationUnit]) -> Result<ProjectReport> {
        self.run_with_progress(units, |_| {})
    }

    /// [`run`](Self::run), reporting each finished unit to `on_unit`
    pub fn run_with_progress<F>(&self, units: &[TranslationUnit], on_unit: F) -> Result<ProjectReport>
    where
        F: Fn(&UnitRewrite) + Sync + Send,
    {
        info!("Renaming symbols in {} units", units.len());

        let loaded = self.load_mapping()?;
        let rewrites = self.rewrite_units(units, on_unit)?;

        let mut occurrences = SessionStats::default();
        for unit in &rewrites {
            occurrences.merge(&unit.stats);
        }

        let applied = self.apply(&rewrites);
        let mapping = self.save_mapping();

        let report = ProjectReport {
            units: rewrites.len(),
            loaded,
            occurrences,
            engine: self.engine.stats(),
            files_written: applied.files_written,
            combined_output: applied.combined_output,
            failures: applied.failures,
            mapping,
        };

        info!(
            "Renamed {} occurrences across {} units ({} names allocated)",
            report.occurrences.rewritten, report.units, report.engine.allocated
        );
        Ok(report)
    }
}
