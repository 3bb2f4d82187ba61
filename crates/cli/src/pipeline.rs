//! `padconv run`: decode → classify → cache → reconcile → write.

use std::path::{Path, PathBuf};
use std::thread;

use padconv_config::{Period, SchemaRegistry, Settings};
use padconv_core::{Schema, Table};
use padconv_io::cache::{clear_dir, stage as stage_cache};
use padconv_io::{
    classify, decode_sources, DecodeError, DecodeOutcome, LedgerCache, SourceEncoding, StagedDir, WriteError,
};
use padconv_recon::{ReconConfig, ReconInput, ReconSummary};
use serde::Serialize;

use crate::error::CliError;

pub struct RunOptions {
    pub period: Period,
    pub use_cache: bool,
}

/// What one kind contributed to the run.
#[derive(Debug, Serialize)]
pub struct KindReport {
    pub kind: String,
    pub files_read: usize,
    pub rows: usize,
    pub unknown_entity_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct RejectedFile {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub period: String,
    pub sources: Vec<String>,
    pub kinds: Vec<KindReport>,
    pub rejected: Vec<RejectedFile>,
    pub tables: Vec<String>,
    pub output_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    pub summary: ReconSummary,
}

/// Everything a run needs, loaded and validated up front.
pub struct Context {
    pub settings: Settings,
    pub registry: SchemaRegistry,
    pub recon: ReconConfig,
}

impl Context {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let settings = Settings::load(path)?;
        let registry = SchemaRegistry::load(&settings)?;
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::general(format!("cannot read {}: {e}", path.display())))?;
        let recon = ReconConfig::from_toml(&text)?;

        for kind in recon.required_kinds() {
            registry.require(kind)?;
        }
        Ok(Self {
            settings,
            registry,
            recon,
        })
    }

    /// Configured kinds plus the ones the engine cannot run without.
    fn selected(&self) -> Result<Vec<&Schema>, CliError> {
        let configured = &self.settings.input.kinds;
        if configured.is_empty() {
            return Ok(self.registry.select(&[])?);
        }
        let mut kinds = configured.clone();
        for required in self.recon.required_kinds() {
            if !kinds.iter().any(|k| k == required) {
                log::debug!("adding {required}: needed for reconciliation");
                kinds.push(required.to_string());
            }
        }
        self.registry
            .select(&kinds)
            .map_err(|e| CliError::usage(e.to_string()).with_hint("run `padconv schemas` to list kinds"))
    }
}

/// Decode every schema on its own thread. Results keep `schemas` order.
fn decode_all(
    schemas: &[&Schema],
    sources: &[PathBuf],
    encoding: SourceEncoding,
) -> Result<Vec<Result<DecodeOutcome, DecodeError>>, CliError> {
    thread::scope(|scope| {
        let handles: Vec<_> = schemas
            .iter()
            .map(|&schema| (schema.kind.as_str(), scope.spawn(move || decode_sources(schema, sources, encoding))))
            .collect();

        handles
            .into_iter()
            .map(|(kind, handle)| {
                handle
                    .join()
                    .map_err(|_| CliError::general(format!("decoder for {kind} panicked")))
            })
            .collect()
    })
}

pub fn run(ctx: &Context, options: &RunOptions) -> Result<RunReport, CliError> {
    let settings = &ctx.settings;
    let period = options.period;
    let sources = settings.sources(period);
    let output_dir = settings.output_dir(period);
    let cache_dir = (options.use_cache && settings.cache.enabled).then(|| settings.cache_dir(period));

    log::info!("period {period}: {} source director(ies)", sources.len());
    for dir in &sources {
        if !dir.is_dir() {
            log::warn!("source directory {} does not exist", dir.display());
        }
    }

    if let Some(dir) = &cache_dir {
        clear_dir(dir)?;
    }

    // Decode + classify
    let schemas = ctx.selected()?;
    let outcomes = decode_all(&schemas, &sources, settings.input.encoding)?;

    let mut cache = LedgerCache::new();
    let mut kinds = Vec::new();
    let mut rejected = Vec::new();

    for outcome in outcomes {
        let DecodeOutcome {
            mut records,
            files_read,
            failures,
        } = outcome?;

        let unknown = classify(&mut records, &settings.entities);
        log::info!("{}: {} row(s) from {} file(s)", records.kind, records.len(), files_read);
        kinds.push(KindReport {
            kind: records.kind.clone(),
            files_read,
            rows: records.len(),
            unknown_entity_rows: unknown,
        });
        rejected.extend(failures.into_iter().map(|f| RejectedFile {
            path: f.path.display().to_string(),
            error: f.error.to_string(),
        }));
        cache.insert(records)?;
    }

    // Reconcile
    let recon = &ctx.recon;
    let input = ReconInput {
        commitments: cache.require(&recon.commitments.kind)?,
        liquidations: cache.require(&recon.liquidations.kind)?,
        payments: cache.require(&recon.payments.kind)?,
    };
    let result = padconv_recon::run(recon, &input, period.year)?;

    let mut tables: Vec<Table> = cache.tables();
    tables.extend(result.tables());

    // Outputs and cache are staged; neither is visible until every writer
    // has finished.
    let staged_out = StagedDir::create(&output_dir).map_err(|e| write_err(&output_dir, e))?;
    for kind in &settings.output.writers {
        let writer = kind.build(staged_out.path());
        for table in &tables {
            writer.write(table)?;
        }
        log::debug!("{}: {} table(s) staged", writer.name(), tables.len());
    }
    let staged_cache = cache_dir.as_deref().map(|dir| stage_cache(dir, &tables)).transpose()?;

    staged_out.commit().map_err(|e| write_err(&output_dir, e))?;
    log::info!("{} table(s) written to {}", tables.len(), output_dir.display());
    if let Some(staged) = staged_cache {
        let dir = staged.target().to_path_buf();
        staged.commit().map_err(|e| write_err(&dir, e))?;
        log::info!("cache written to {}", dir.display());
    }

    Ok(RunReport {
        period: period.to_string(),
        sources: sources.iter().map(|p| p.display().to_string()).collect(),
        kinds,
        rejected,
        tables: tables.iter().map(|t| t.name.clone()).collect(),
        output_dir: output_dir.display().to_string(),
        cache_dir: cache_dir.map(|d| d.display().to_string()),
        summary: result.summary,
    })
}

fn write_err(path: &Path, e: std::io::Error) -> WriteError {
    WriteError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Human summary for stderr.
pub fn print_report(report: &RunReport) {
    let s = &report.summary;
    eprintln!(
        "{}: {} kind(s), {} table(s) written to {}",
        report.period,
        report.kinds.len(),
        report.tables.len(),
        report.output_dir
    );
    eprintln!(
        "restos a pagar: {} obligation(s), close unliquidated {}, close liquidated {}",
        s.obligations_carried,
        padconv_core::format_cents(s.total_close_unliquidated),
        padconv_core::format_cents(s.total_close_liquidated),
    );
    eprintln!("movement {}: {} obligation(s)", s.year, s.obligations_in_year);
    if !s.entity_counts.is_empty() {
        let counts: Vec<String> = s.entity_counts.iter().map(|(e, n)| format!("{e} {n}")).collect();
        eprintln!("entities: {}", counts.join(", "));
    }
    if s.warnings > 0 {
        let counts: Vec<String> = s.warning_counts.iter().map(|(w, n)| format!("{w} {n}")).collect();
        eprintln!("warnings: {} ({})", s.warnings, counts.join(", "));
    }
    for file in &report.rejected {
        eprintln!("rejected: {}", file.error);
    }
}
