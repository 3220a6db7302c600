use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use flexstr::ToSharedStr;
use rusqlite::Connection;
use uuid::Uuid;

use crate::bio::lollipop::{CohortDetails, VariantRow};
use crate::bio::proximity::DistanceEdge;
use crate::bio::variant_upload::Variant;
use crate::db::distance::{distance_edges_of_gene, make_distance_table, store_distance_edges};
use crate::types::GeneSymbol;

// Removes the file when dropped
struct ScratchFile {
    path: PathBuf,
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("removed {}", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => (),
            Err(err) => tracing::warn!("failed to remove {}: {}", self.path.display(), err),
        }
    }
}

// Per-request storage for an upload and its distances.  Every instance
// gets its own UUID named file which is deleted when the instance is dropped.
pub struct ScratchDb {
    // declared before file so that the connection is closed first
    conn: Connection,
    file: ScratchFile,
    request_id: Uuid,
}

impl ScratchDb {
    pub fn create(scratch_dir: &Path) -> rusqlite::Result<ScratchDb> {
        let request_id = Uuid::new_v4();
        let path = scratch_dir.join(format!("{}-upload.sqlite", request_id));

        let file = ScratchFile {
            path: path.clone(),
        };

        let conn = Connection::open(&path)?;

        conn.execute(
            "CREATE TABLE dnvs (
                        gene              TEXT NOT NULL,
                        consequence       TEXT NOT NULL,
                        aa_change         TEXT,
                        residue_position  INTEGER
                     )",
            (),
        )?;

        make_distance_table(&conn)?;

        Ok(ScratchDb {
            conn,
            file,
            request_id,
        })
    }

    pub fn request_id(&self) -> &Uuid {
        &self.request_id
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    pub fn store_variants(&mut self, variants: &[Variant]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO dnvs (gene, consequence, aa_change, residue_position)
                 VALUES (?1, ?2, ?3, ?4)")?;

            for variant in variants {
                stmt.execute((&*variant.gene,
                              &*variant.consequence,
                              variant.aa_change.as_deref(),
                              variant.residue_position))?;
            }
        }

        tx.commit()
    }

    // in upload order
    pub fn variant_rows(&self) -> rusqlite::Result<Vec<(GeneSymbol, VariantRow)>> {
        let mut stmt = self.conn.prepare(
            "SELECT gene, consequence, CAST(aa_change AS TEXT)
               FROM dnvs
              ORDER BY rowid")?;

        let rows: rusqlite::Result<Vec<(GeneSymbol, VariantRow)>> =
            stmt.query_map([], |row| {
                let gene: String = row.get(0)?;
                let consequence: String = row.get(1)?;
                let aa_change: Option<String> = row.get(2)?;

                Ok((gene.to_shared_str(),
                    VariantRow {
                        consequence: consequence.to_shared_str(),
                        aa_change: aa_change.map(|aa_change| aa_change.to_shared_str()),
                        details: CohortDetails::default(),
                    }))
            })?
            .collect();

        rows
    }

    pub fn store_distances(&mut self, edges: &[DistanceEdge]) -> rusqlite::Result<()> {
        store_distance_edges(&mut self.conn, edges)
    }

    pub fn distances_of_gene(&self, gene: &str) -> rusqlite::Result<Vec<DistanceEdge>> {
        distance_edges_of_gene(&self.conn, gene)
    }
}
