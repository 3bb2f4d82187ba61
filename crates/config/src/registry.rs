//! Schema registry.
//!
//! Built-in layouts ship as TOML under `schemas/` and are embedded at compile
//! time. A `schemas.dir` in the settings adds kinds or replaces built-ins of
//! the same name. Every schema is validated on load, before any decoding.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use padconv_core::Schema;

use crate::error::ConfigError;
use crate::settings::Settings;

const BUILTIN: &[(&str, &str)] = &[
    ("BAL_DESP.toml", include_str!("../schemas/BAL_DESP.toml")),
    ("BAL_REC.toml", include_str!("../schemas/BAL_REC.toml")),
    ("BAL_VER.toml", include_str!("../schemas/BAL_VER.toml")),
    ("BREC_ANT.toml", include_str!("../schemas/BREC_ANT.toml")),
    ("BRUB_ANT.toml", include_str!("../schemas/BRUB_ANT.toml")),
    ("BVER_ENC.toml", include_str!("../schemas/BVER_ENC.toml")),
    ("BVMOVANT.toml", include_str!("../schemas/BVMOVANT.toml")),
    ("CREDOR.toml", include_str!("../schemas/CREDOR.toml")),
    ("CTA_DISP.toml", include_str!("../schemas/CTA_DISP.toml")),
    ("CTA_OPER.toml", include_str!("../schemas/CTA_OPER.toml")),
    ("DECRETO.toml", include_str!("../schemas/DECRETO.toml")),
    ("DIARIO.toml", include_str!("../schemas/DIARIO.toml")),
    ("EMPENHO.toml", include_str!("../schemas/EMPENHO.toml")),
    ("LIQUIDAC.toml", include_str!("../schemas/LIQUIDAC.toml")),
    ("ORGAO.toml", include_str!("../schemas/ORGAO.toml")),
    ("PAGAMENT.toml", include_str!("../schemas/PAGAMENT.toml")),
    ("PROGRAMA.toml", include_str!("../schemas/PROGRAMA.toml")),
    ("PROJATIV.toml", include_str!("../schemas/PROJATIV.toml")),
    ("RD_EXTRA.toml", include_str!("../schemas/RD_EXTRA.toml")),
    ("RECEITA.toml", include_str!("../schemas/RECEITA.toml")),
    ("RECURSO.toml", include_str!("../schemas/RECURSO.toml")),
    ("REC_ANT.toml", include_str!("../schemas/REC_ANT.toml")),
    ("RUBRICA.toml", include_str!("../schemas/RUBRICA.toml")),
    ("UNIORCAM.toml", include_str!("../schemas/UNIORCAM.toml")),
];

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaRegistry {
    /// Registry holding only the embedded layouts.
    pub fn builtin() -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for (name, text) in BUILTIN {
            registry.add(parse_schema(text, name)?);
        }
        Ok(registry)
    }

    /// Built-ins plus overrides from the settings' schema directory.
    pub fn load(settings: &Settings) -> Result<Self, ConfigError> {
        let mut registry = Self::builtin()?;
        if let Some(dir) = settings.schema_dir() {
            registry.load_dir(&dir)?;
        }
        Ok(registry)
    }

    /// Add every `*.toml` in `dir`, in file name order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        let io_err = |e: std::io::Error| ConfigError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        };
        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|ext| ext == "toml").unwrap_or(false))
            .collect();
        paths.sort();

        for path in paths {
            let source = path.display().to_string();
            let text = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: source.clone(),
                message: e.to_string(),
            })?;
            let schema = parse_schema(&text, &source)?;
            if self.schemas.contains_key(&schema.kind) {
                log::info!("schema {} overridden by {}", schema.kind, source);
            }
            self.add(schema);
        }
        Ok(())
    }

    pub fn add(&mut self, schema: Schema) {
        self.schemas.insert(schema.kind.clone(), schema);
    }

    pub fn get(&self, kind: &str) -> Option<&Schema> {
        self.schemas.get(kind)
    }

    pub fn require(&self, kind: &str) -> Result<&Schema, ConfigError> {
        self.get(kind)
            .ok_or_else(|| ConfigError::Invalid(format!("no schema registered for kind '{kind}'")))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schemas selected by `input.kinds` (every kind when the list is empty).
    pub fn select(&self, kinds: &[String]) -> Result<Vec<&Schema>, ConfigError> {
        if kinds.is_empty() {
            return Ok(self.schemas().collect());
        }
        kinds.iter().map(|k| self.require(k)).collect()
    }
}

fn parse_schema(text: &str, source: &str) -> Result<Schema, ConfigError> {
    let schema: Schema = toml::from_str(text).map_err(|e| ConfigError::Parse {
        source: source.to_string(),
        message: e.to_string(),
    })?;
    schema.validate()?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use padconv_core::ColumnKind;

    #[test]
    fn builtins_are_valid() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 24);
        let kinds: Vec<&str> = registry.kinds().collect();
        assert!(kinds.contains(&"EMPENHO"));
        assert!(kinds.contains(&"CTA_DISP"));
        assert!(kinds.contains(&"RUBRICA"));
    }

    #[test]
    fn journal_reads_its_export_name() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert_eq!(registry.require("DIARIO").unwrap().file_name(), "tce_4111.txt");
        assert_eq!(registry.require("DECRETO").unwrap().file_name(), "DECRETO.txt");
    }

    #[test]
    fn execution_totals_chain_through_derived_columns() {
        let registry = SchemaRegistry::builtin().unwrap();
        let brub = registry.require("BRUB_ANT").unwrap();
        let names: Vec<&str> = brub.derived.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["committed", "liquidated", "paid", "committed_to_liquidate", "committed_to_pay", "liquidated_to_pay"]
        );
        let receita = registry.require("RECEITA").unwrap();
        assert_eq!(receita.derived.last().unwrap().minus, vec!["realized".to_string()]);
        assert_eq!(registry.require("CTA_OPER").unwrap().column("amount").unwrap().sign_at, Some(52));
    }

    #[test]
    fn movement_kinds_share_the_commitment_key() {
        let registry = SchemaRegistry::builtin().unwrap();
        for kind in ["EMPENHO", "LIQUIDAC", "PAGAMENT"] {
            let schema = registry.require(kind).unwrap();
            for col in ["commitment_year", "commitment_entity_code", "commitment_seq", "amount"] {
                assert!(schema.has_column(col), "{kind} lacks {col}");
            }
            assert_eq!(schema.column("amount").unwrap().kind, ColumnKind::SignedDecimal);
        }
        assert!(registry.require("LIQUIDAC").unwrap().column("liquidation_date").unwrap().strict);
        assert!(!registry.require("EMPENHO").unwrap().column("commitment_date").unwrap().strict);
    }

    #[test]
    fn balance_derivations() {
        let registry = SchemaRegistry::builtin().unwrap();
        let bal = registry.require("BAL_DESP").unwrap();
        let names: Vec<&str> = bal.derived.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names[0], "updated_appropriation");
        assert!(names.contains(&"liquidated_to_pay"));
    }

    #[test]
    fn override_dir_replaces_and_adds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ORGAO.toml"),
            "kind = \"ORGAO\"\nline_length = 6\n[[columns]]\nname = \"org_code\"\nstart = 5\nend = 6\ntype = \"integer\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("PPA.toml"),
            "kind = \"PPA\"\nline_length = 10\n[[columns]]\nname = \"number\"\nstart = 1\nend = 10\ntype = \"text\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = SchemaRegistry::builtin().unwrap();
        registry.load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 25);
        assert_eq!(registry.require("ORGAO").unwrap().columns.len(), 1);
        assert!(registry.get("PPA").is_some());
    }

    #[test]
    fn invalid_override_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("BAD.toml"),
            "kind = \"BAD\"\nline_length = 4\n[[columns]]\nname = \"x\"\nstart = 1\nend = 9\ntype = \"text\"\n",
        )
        .unwrap();
        let mut registry = SchemaRegistry::default();
        assert!(matches!(registry.load_dir(dir.path()), Err(ConfigError::Schema(_))));
    }

    #[test]
    fn select_unknown_kind() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert_eq!(registry.select(&[]).unwrap().len(), 24);
        assert!(registry.select(&["NOPE".to_string()]).is_err());
    }
}
