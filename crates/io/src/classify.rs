//! Entity classifier.
//!
//! Rules run in a fixed order and the first one that applies wins:
//! 1. header tax id is the legislative branch's → legislative
//! 2. set has `org_code` → pension fund when it equals the pension code, else executive
//! 3. set has `commitment_entity_code` → same test against its own code
//! 4. set has `earmarked_resource_code` → same test against its own code
//! 5. otherwise unknown
//!
//! Rules 2-4 look at column *presence*; a null value in a present column
//! classifies as executive.

use padconv_core::{Entity, Record, RecordSet};
use serde::{Deserialize, Serialize};

pub const ORG_CODE: &str = "org_code";
pub const COMMITMENT_ENTITY_CODE: &str = "commitment_entity_code";
pub const EARMARKED_RESOURCE_CODE: &str = "earmarked_resource_code";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRules {
    pub legislative_tax_id: String,
    pub pension_org_code: i64,
    pub pension_commitment_entity_code: i64,
    pub pension_resource_code: i64,
}

impl Default for EntityRules {
    fn default() -> Self {
        Self {
            legislative_tax_id: "12292535000162".to_string(),
            pension_org_code: 12,
            pension_commitment_entity_code: 1,
            pension_resource_code: 50,
        }
    }
}

/// Which column discriminates pension fund from executive for a given set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Discriminant {
    Column { index: usize, pension: i64 },
    None,
}

impl EntityRules {
    fn discriminant(&self, set: &RecordSet) -> Discriminant {
        let candidates = [
            (ORG_CODE, self.pension_org_code),
            (COMMITMENT_ENTITY_CODE, self.pension_commitment_entity_code),
            (EARMARKED_RESOURCE_CODE, self.pension_resource_code),
        ];
        candidates
            .iter()
            .find_map(|(name, pension)| {
                set.column_index(name)
                    .map(|index| Discriminant::Column { index, pension: *pension })
            })
            .unwrap_or(Discriminant::None)
    }

    fn entity_of(&self, record: &Record, discriminant: Discriminant) -> Entity {
        if record.header.tax_id == self.legislative_tax_id {
            return Entity::Legislative;
        }
        match discriminant {
            Discriminant::Column { index, pension } => {
                match record.values.get(index).and_then(|v| v.as_int()) {
                    Some(code) if code == pension => Entity::PensionFund,
                    _ => Entity::Executive,
                }
            }
            Discriminant::None => Entity::Unknown,
        }
    }
}

/// Tag every row of `set`. Returns how many rows stayed `unknown`.
pub fn classify(set: &mut RecordSet, rules: &EntityRules) -> usize {
    let discriminant = rules.discriminant(set);
    let mut unknown = 0;
    for i in 0..set.len() {
        let entity = rules.entity_of(&set.rows()[i], discriminant);
        if entity == Entity::Unknown {
            unknown += 1;
        }
        set.rows_mut()[i].entity = entity;
    }
    if unknown > 0 {
        log::warn!("{}: {} row(s) could not be attributed to an entity", set.kind, unknown);
    }
    unknown
}
