use std::path::Path;

use flexstr::{SharedStr as FlexStr, ToSharedStr};
use rusqlite::Connection;
use serde_json::Value;

use crate::bio::aa_change::{is_placeholder_aa_change, parse_aa_position, strip_transcript_prefix,
                            AaChangeNotation};
use crate::bio::lollipop::{CohortDetails, VariantRow};
use crate::bio::variant_upload::Variant;
use crate::constants::{MISSENSE, NO_SCORE};
use crate::db::{open_read_only, row_to_json_map};
use crate::types::{GeneSymbol, GeneUniProtMap};

// A de novo variant from the cohort table and all of its stored columns
#[derive(Clone, Debug)]
pub struct CohortVariant {
    pub gene: GeneSymbol,
    pub status: Option<FlexStr>,
    pub cohort_condition: Option<FlexStr>,
    pub row: VariantRow,
    pub columns: serde_json::Map<String, Value>,
}

impl CohortVariant {
    // affected samples report their condition, others their status
    pub fn condition(&self) -> Option<FlexStr> {
        if self.status.as_deref() == Some("affected") {
            self.cohort_condition.clone()
        } else {
            self.status.clone()
        }
    }
}

fn text_column(columns: &serde_json::Map<String, Value>, name: &str) -> Option<FlexStr> {
    match columns.get(name)? {
        Value::Null => None,
        Value::String(s) => Some(s.to_shared_str()),
        other => Some(other.to_string().to_shared_str()),
    }
}

// the front end expects every score key, with "none" where there is no score
fn missense_score(columns: &serde_json::Map<String, Value>, name: &str, consequence: &str)
    -> Option<FlexStr>
{
    let score =
        if consequence.contains(MISSENSE) {
            text_column(columns, name)
        } else {
            None
        };

    Some(score.unwrap_or_else(|| NO_SCORE.into()))
}

fn cohort_variant_from_columns(columns: serde_json::Map<String, Value>) -> CohortVariant {
    let gene = text_column(&columns, "gene").unwrap_or_else(|| "".into());
    let consequence = text_column(&columns, "consequence").unwrap_or_else(|| "".into());
    let aa_change = text_column(&columns, "aa_change");
    let status = text_column(&columns, "status");
    let cohort_condition = text_column(&columns, "cohort_condition");

    let mut variant = CohortVariant {
        gene,
        status,
        cohort_condition,
        row: VariantRow {
            consequence: consequence.clone(),
            aa_change,
            details: CohortDetails::default(),
        },
        columns,
    };

    variant.row.details = CohortDetails {
        condition: variant.condition(),
        gmvp: missense_score(&variant.columns, "gmvp", &consequence),
        misfit_d: missense_score(&variant.columns, "MisFit_D", &consequence),
        alphamissense: missense_score(&variant.columns, "AlphaMissense", &consequence),
    };

    variant
}

// The cohort variants carry protein notation changes like "ENSP...:p.Arg273His"
pub fn cohort_missense_variants(cohort_variants: &[CohortVariant]) -> Vec<Variant> {
    cohort_variants.iter()
        .filter(|cohort_variant| cohort_variant.row.consequence.contains(MISSENSE))
        .filter_map(|cohort_variant| {
            let aa_change = cohort_variant.row.aa_change.as_ref()?;

            if is_placeholder_aa_change(aa_change) {
                return None;
            }

            let position =
                parse_aa_position(strip_transcript_prefix(aa_change),
                                  AaChangeNotation::ProteinNotation)?;

            Some(Variant {
                gene: cohort_variant.gene.clone(),
                consequence: MISSENSE.into(),
                aa_change: Some(aa_change.clone()),
                residue_position: Some(position),
            })
        })
        .collect()
}

pub struct DnvDb {
    conn: Connection,
}

impl DnvDb {
    pub fn new(conn: Connection) -> DnvDb {
        DnvDb {
            conn,
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<DnvDb> {
        Ok(DnvDb::new(open_read_only(path)?))
    }

    pub fn variants_of_gene(&self, gene: &str) -> rusqlite::Result<Vec<CohortVariant>> {
        let mut stmt =
            self.conn.prepare("SELECT * FROM dnvs WHERE UPPER(dnvs.gene) = UPPER(?1)")?;
        let mut rows = stmt.query([gene])?;
        let mut variants = vec![];

        while let Some(row) = rows.next()? {
            variants.push(cohort_variant_from_columns(row_to_json_map(row)?));
        }

        Ok(variants)
    }

    pub fn variants_of_sample(&self, sample: &str) -> rusqlite::Result<Vec<CohortVariant>> {
        let mut stmt = self.conn.prepare("SELECT * FROM dnvs WHERE dnvs.sample = ?1")?;
        let mut rows = stmt.query([sample])?;
        let mut variants = vec![];

        while let Some(row) = rows.next()? {
            variants.push(cohort_variant_from_columns(row_to_json_map(row)?));
        }

        Ok(variants)
    }

    pub fn genes(&self) -> rusqlite::Result<Vec<GeneSymbol>> {
        let mut stmt =
            self.conn.prepare("SELECT DISTINCT UPPER(gene) FROM dnvs WHERE gene IS NOT NULL ORDER BY 1")?;

        let genes: rusqlite::Result<Vec<GeneSymbol>> =
            stmt.query_map([], |row| row.get::<_, String>(0))?
            .map(|gene| gene.map(|gene| gene.to_shared_str()))
            .collect();

        genes
    }
}

// The missense variants of every cohort gene that has a UniProt ID and at
// least two variants to pair up.  gene_uniprot_map has upper case keys.
pub fn cohort_missense_by_gene(dnv_db: &DnvDb, gene_uniprot_map: &GeneUniProtMap)
    -> rusqlite::Result<Vec<(GeneSymbol, Vec<Variant>)>>
{
    let mut result = vec![];

    for gene in dnv_db.genes()? {
        if !gene_uniprot_map.contains_key(&gene) {
            continue;
        }

        let cohort_variants = dnv_db.variants_of_gene(&gene)?;

        let variants: Vec<Variant> = cohort_missense_variants(&cohort_variants)
            .into_iter()
            .map(|variant| Variant {
                gene: gene.clone(),
                ..variant
            })
            .collect();

        if variants.len() < 2 {
            tracing::debug!("{} has {} missense variants, skipping", gene, variants.len());
            continue;
        }

        result.push((gene, variants));
    }

    Ok(result)
}
