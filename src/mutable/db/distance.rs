use std::path::Path;

use flexstr::ToSharedStr;
use rusqlite::Connection;

use crate::bio::proximity::DistanceEdge;
use crate::db::open_read_only;

pub fn make_distance_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS distance (
                    gene                TEXT NOT NULL,
                    resno_of_variant_1  INTEGER NOT NULL,
                    resno_of_variant_2  INTEGER NOT NULL,
                    distance_3d         REAL NOT NULL,
                    distance_1d         INTEGER NOT NULL
                 )",
        (),
    )?;

    conn.execute("CREATE INDEX IF NOT EXISTS distance_gene_idx ON distance (gene)", ())?;

    Ok(())
}

pub fn store_distance_edges(conn: &mut Connection, edges: &[DistanceEdge]) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO distance (gene, resno_of_variant_1, resno_of_variant_2,
                                   distance_3d, distance_1d)
             VALUES (?1, ?2, ?3, ?4, ?5)")?;

        for edge in edges {
            stmt.execute((&*edge.gene, edge.residue_1, edge.residue_2,
                          edge.distance_3d, edge.distance_1d))?;
        }
    }

    tx.commit()?;

    Ok(())
}

pub fn distance_edges_of_gene(conn: &Connection, gene: &str) -> rusqlite::Result<Vec<DistanceEdge>> {
    let mut stmt = conn.prepare(
        "SELECT gene, resno_of_variant_1, resno_of_variant_2, distance_3d, distance_1d
           FROM distance
          WHERE UPPER(gene) = UPPER(?1)")?;

    let edges: rusqlite::Result<Vec<DistanceEdge>> =
        stmt.query_map([gene], |row| {
            Ok(DistanceEdge {
                gene: row.get::<_, String>(0)?.to_shared_str(),
                residue_1: row.get(1)?,
                residue_2: row.get(2)?,
                distance_3d: row.get(3)?,
                distance_1d: row.get(4)?,
            })
        })?
        .collect();

    edges
}

// Precomputed proximities of the cohort variants
pub struct DistanceDb {
    conn: Connection,
}

impl DistanceDb {
    pub fn new(conn: Connection) -> DistanceDb {
        DistanceDb {
            conn,
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<DistanceDb> {
        Ok(DistanceDb::new(open_read_only(path)?))
    }

    // an existing distance table in the file is replaced
    pub fn create(path: &Path) -> rusqlite::Result<DistanceDb> {
        let conn = Connection::open(path)?;
        conn.execute("DROP TABLE IF EXISTS distance", ())?;
        make_distance_table(&conn)?;
        Ok(DistanceDb::new(conn))
    }

    pub fn store_edges(&mut self, edges: &[DistanceEdge]) -> rusqlite::Result<()> {
        store_distance_edges(&mut self.conn, edges)
    }

    pub fn edges_of_gene(&self, gene: &str) -> rusqlite::Result<Vec<DistanceEdge>> {
        distance_edges_of_gene(&self.conn, gene)
    }
}
