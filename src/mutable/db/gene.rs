use std::collections::HashMap;
use std::path::Path;

use flexstr::ToSharedStr;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::constants::PLOTTED_FEATURE_TYPES;
use crate::db::{open_read_only, row_to_json_map};
use crate::types::{GeneSymbol, GeneUniProtMap, UniProtId};

// the uniprot_id column holds one or more IDs separated by ';'
pub fn split_uniprot_ids(uniprot_id_field: &str) -> Vec<UniProtId> {
    uniprot_id_field.split(';')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.to_shared_str())
        .collect()
}

#[derive(Serialize, Clone, Debug)]
pub struct GeneMetrics {
    pub uniprot_id: Option<String>,
    #[serde(skip)]
    pub uniprot_json: Option<String>,
    // constraint scores and names, passed through as stored
    pub summary: serde_json::Map<String, Value>,
}

impl GeneMetrics {
    pub fn first_uniprot_id(&self) -> Option<UniProtId> {
        split_uniprot_ids(self.uniprot_id.as_deref()?).into_iter().next()
    }
}

// The parts of the stored UniProt entry JSON that get plotted
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProteinSummary {
    pub sequence: Value,
    pub domains: Vec<Value>,
}

impl ProteinSummary {
    pub fn from_uniprot_json(uniprot_json: &str) -> serde_json::Result<ProteinSummary> {
        let entry: Value = serde_json::from_str(uniprot_json)?;

        let sequence = entry.get("sequence").cloned().unwrap_or(Value::Null);

        let domains =
            match entry.get("features").and_then(Value::as_array) {
                Some(features) => {
                    features.iter()
                        .filter(|feature| {
                            feature.get("type").and_then(Value::as_str)
                                .is_some_and(|feature_type| PLOTTED_FEATURE_TYPES.contains(&feature_type))
                        })
                        .cloned()
                        .collect()
                },
                None => vec![],
            };

        Ok(ProteinSummary {
            sequence,
            domains,
        })
    }

    pub fn empty() -> ProteinSummary {
        ProteinSummary {
            sequence: Value::Null,
            domains: vec![],
        }
    }

    pub fn sequence_length(&self) -> Option<u64> {
        self.sequence.get("length").and_then(Value::as_u64)
    }

    pub fn set_sequence_length(&mut self, length: u64) {
        if let Some(sequence) = self.sequence.as_object_mut() {
            sequence.insert("length".to_owned(), Value::from(length));
        }
    }
}

// the cohort table stores upper case gene names
pub fn upper_case_gene_map(gene_uniprot_map: GeneUniProtMap) -> GeneUniProtMap {
    let mut upper_map: GeneUniProtMap = HashMap::new();

    for (gene, uniprot_ids) in gene_uniprot_map {
        upper_map.entry(gene.to_uppercase().to_shared_str())
            .or_insert_with(Vec::new)
            .extend(uniprot_ids);
    }

    upper_map
}

pub struct GeneDb {
    conn: Connection,
}

impl GeneDb {
    pub fn new(conn: Connection) -> GeneDb {
        GeneDb {
            conn,
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<GeneDb> {
        Ok(GeneDb::new(open_read_only(path)?))
    }

    // genes with at least one UniProt ID
    pub fn gene_uniprot_map(&self) -> rusqlite::Result<GeneUniProtMap> {
        let mut stmt =
            self.conn.prepare("SELECT hgnc, uniprot_id FROM gene WHERE uniprot_id IS NOT NULL")?;

        let mut rows = stmt.query([])?;
        let mut gene_uniprot_map: GeneUniProtMap = HashMap::new();

        while let Some(row) = rows.next()? {
            let hgnc: Option<String> = row.get(0)?;
            let uniprot_id_field: String = row.get(1)?;

            let Some(hgnc) = hgnc
            else {
                continue;
            };

            let uniprot_ids = split_uniprot_ids(&uniprot_id_field);

            if uniprot_ids.is_empty() {
                continue;
            }

            gene_uniprot_map.entry(hgnc.to_shared_str())
                .or_insert_with(Vec::new)
                .extend(uniprot_ids);
        }

        Ok(gene_uniprot_map)
    }

    pub fn hgnc_of_ensembl_id(&self, ensembl_id: &str) -> rusqlite::Result<Option<GeneSymbol>> {
        let hgnc: Option<Option<String>> =
            self.conn.query_row("SELECT hgnc FROM gene WHERE ensembl_id = ?1",
                                [ensembl_id], |row| row.get(0))
            .optional()?;

        Ok(hgnc.flatten().map(|hgnc| hgnc.to_uppercase().to_shared_str()))
    }

    pub fn gene_metrics(&self, gene: &str) -> rusqlite::Result<Option<GeneMetrics>> {
        let mut stmt = self.conn.prepare(
            "SELECT pli, mis_z, oe_lof, mim_id, ensembl_id, uniprot_id, uniprot_json,
                    s_het_zeng, gene_full_name, MisFit_sgene_mis
               FROM gene
              WHERE UPPER(hgnc) = UPPER(?1)")?;

        stmt.query_row([gene], |row| {
            let uniprot_id: Option<String> = row.get("uniprot_id")?;
            let uniprot_json: Option<String> = row.get("uniprot_json")?;
            let mut summary = row_to_json_map(row)?;
            summary.remove("uniprot_json");

            Ok(GeneMetrics {
                uniprot_id,
                uniprot_json,
                summary,
            })
        }).optional()
    }

    pub fn protein_summary(&self, gene: &str) -> rusqlite::Result<Option<ProteinSummary>> {
        let uniprot_json: Option<Option<String>> =
            self.conn.query_row("SELECT uniprot_json FROM gene WHERE UPPER(hgnc) = UPPER(?1)",
                                [gene], |row| row.get(0))
            .optional()?;

        let Some(uniprot_json) = uniprot_json.flatten()
        else {
            return Ok(None);
        };

        match ProteinSummary::from_uniprot_json(&uniprot_json) {
            Ok(summary) => Ok(Some(summary)),
            Err(err) => {
                tracing::warn!("can't parse UniProt JSON of {}: {}", gene, err);
                Ok(None)
            }
        }
    }
}
