use std::path::Path;

use flexstr::{SharedStr as FlexStr, ToSharedStr};
use rusqlite::Connection;

use crate::db::{open_read_only, value_to_residue_number};
use crate::types::ResidueNumber;

// observed/expected missense ratio over a stretch of the protein
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RegionalConstraint {
    pub gene_name: FlexStr,
    pub start_aa: ResidueNumber,
    pub stop_aa: ResidueNumber,
    pub oe: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlddtScore {
    #[serde(rename = "UniProtID")]
    pub uniprot_id: FlexStr,
    pub location: i64,
    #[serde(rename = "pLDDT")]
    pub plddt: f64,
}

pub struct ConstraintDb {
    conn: Connection,
}

impl ConstraintDb {
    pub fn new(conn: Connection) -> ConstraintDb {
        ConstraintDb {
            conn,
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<ConstraintDb> {
        Ok(ConstraintDb::new(open_read_only(path)?))
    }

    // start_aa and stop_aa are stored as text like "p.1" or "Met1"
    pub fn regional_constraints(&self, gene: &str) -> rusqlite::Result<Vec<RegionalConstraint>> {
        let mut stmt = self.conn.prepare(
            "SELECT gene_name, start_aa, stop_aa, oe
               FROM regional
              WHERE UPPER(gene_name) = UPPER(?1)")?;

        let mut rows = stmt.query([gene])?;
        let mut constraints = vec![];

        while let Some(row) = rows.next()? {
            let gene_name: String = row.get(0)?;

            let (Some(start_aa), Some(stop_aa)) =
                (value_to_residue_number(row.get_ref(1)?), value_to_residue_number(row.get_ref(2)?))
            else {
                tracing::debug!("skipping regional constraint of {} without positions", gene_name);
                continue;
            };

            constraints.push(RegionalConstraint {
                gene_name: gene_name.to_shared_str(),
                start_aa,
                stop_aa,
                oe: row.get(3)?,
            });
        }

        Ok(constraints)
    }
}

pub struct PlddtDb {
    conn: Connection,
}

impl PlddtDb {
    pub fn new(conn: Connection) -> PlddtDb {
        PlddtDb {
            conn,
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<PlddtDb> {
        Ok(PlddtDb::new(open_read_only(path)?))
    }

    pub fn plddt_scores(&self, uniprot_id: &str) -> rusqlite::Result<Vec<PlddtScore>> {
        let mut stmt = self.conn.prepare(
            "SELECT UniProtID, location, pLDDT
               FROM plddt
              WHERE UniProtID = ?1
              ORDER BY location")?;

        let scores: rusqlite::Result<Vec<PlddtScore>> =
            stmt.query_map([uniprot_id], |row| {
                Ok(PlddtScore {
                    uniprot_id: row.get::<_, String>(0)?.to_shared_str(),
                    location: row.get(1)?,
                    plddt: row.get(2)?,
                })
            })?
            .collect();

        scores
    }
}
