use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Which record kinds and columns the engine reads. Defaults match the
/// built-in EMPENHO / LIQUIDAC / PAGAMENT schemas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub commitments: SourceConfig,
    pub liquidations: SourceConfig,
    pub payments: SourceConfig,
    pub key: KeyColumns,
    /// Column holding the signed amount, shared by all three kinds.
    pub amount: String,
    /// Commitment columns copied onto every ledger row when present.
    pub attributes: Vec<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            commitments: SourceConfig::new("EMPENHO", "commitment_date"),
            liquidations: SourceConfig::new("LIQUIDAC", "liquidation_date"),
            payments: SourceConfig::new("PAGAMENT", "payment_date"),
            key: KeyColumns::default(),
            amount: "amount".to_string(),
            attributes: [
                "commitment_number",
                "org_code",
                "unit_code",
                "function",
                "subfunction",
                "program",
                "action",
                "element",
                "earmarked_resource_code",
                "creditor",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources + key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub kind: String,
    pub date: String,
}

impl SourceConfig {
    pub fn new(kind: &str, date: &str) -> Self {
        Self {
            kind: kind.to_string(),
            date: date.to_string(),
        }
    }
}

/// Columns forming the obligation's natural key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeyColumns {
    pub fiscal_year: String,
    pub entity_code: String,
    pub sequence: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            fiscal_year: "commitment_year".to_string(),
            entity_code: "commitment_entity_code".to_string(),
            sequence: "commitment_seq".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

/// The `[recon]` table of a settings document; everything else is ignored.
#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    recon: ReconConfig,
}

impl ReconConfig {
    /// Read the optional `[recon]` table from a settings file's contents.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let doc: Document = toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        doc.recon.validate()?;
        Ok(doc.recon)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let kinds = [&self.commitments.kind, &self.liquidations.kind, &self.payments.kind];
        for (i, kind) in kinds.iter().enumerate() {
            if kind.trim().is_empty() {
                return Err(ReconError::ConfigValidation("recon kinds must not be empty".into()));
            }
            if kinds[..i].contains(kind) {
                return Err(ReconError::ConfigValidation(format!(
                    "kind '{kind}' used for more than one role"
                )));
            }
        }

        let columns = [
            &self.commitments.date,
            &self.liquidations.date,
            &self.payments.date,
            &self.key.fiscal_year,
            &self.key.entity_code,
            &self.key.sequence,
            &self.amount,
        ];
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(ReconError::ConfigValidation("recon column names must not be empty".into()));
        }
        Ok(())
    }

    /// Kinds the engine needs in the cache before it can start.
    pub fn required_kinds(&self) -> [&str; 3] {
        [
            self.commitments.kind.as_str(),
            self.liquidations.kind.as_str(),
            self.payments.kind.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_uses_defaults() {
        let config = ReconConfig::from_toml("[input]\nsources = [\"x\"]\n").unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.required_kinds(), ["EMPENHO", "LIQUIDAC", "PAGAMENT"]);
    }

    #[test]
    fn partial_override() {
        let config = ReconConfig::from_toml(
            r#"
[recon]
attributes = ["org_code"]

[recon.payments]
kind = "PAGAMENT"
date = "settled_on"
"#,
        )
        .unwrap();
        assert_eq!(config.payments.date, "settled_on");
        assert_eq!(config.liquidations.kind, "LIQUIDAC");
        assert_eq!(config.attributes, vec!["org_code"]);
    }

    #[test]
    fn rejects_duplicate_kind() {
        let err = ReconConfig::from_toml(
            "[recon.payments]\nkind = \"LIQUIDAC\"\ndate = \"liquidation_date\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("LIQUIDAC"));
    }
}
