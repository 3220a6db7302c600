use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use flexstr::{SharedStr as FlexStr, shared_fmt as flex_fmt, ToSharedStr};
use rusqlite::{params_from_iter, Connection};

use crate::db::{open_read_only, placeholders, value_to_residue_number, value_to_string};
use crate::types::{AaChange, CompositeKey, GeneSymbol, ResidueNumber};

// keeps each IN list well below the SQLite variable limit
const KEY_CHUNK_SIZE: usize = 500;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MissenseAnnotation {
    pub symbol: GeneSymbol,
    pub protein_position: ResidueNumber,
    pub aa_ref: FlexStr,
    pub aa_alt: FlexStr,
}

impl MissenseAnnotation {
    // eg. "273R>273H"
    pub fn aa_change(&self) -> AaChange {
        flex_fmt!("{}{}>{}{}", self.protein_position, self.aa_ref,
                  self.protein_position, self.aa_alt)
    }
}

pub type MissenseAnnotationMap = HashMap<CompositeKey, MissenseAnnotation>;

// Precomputed missense annotation keyed by "{chrom}-{pos}-{ref}-{alt}"
pub trait AnnotationLookup {
    fn missense_annotations(&self, keys: &BTreeSet<CompositeKey>)
        -> anyhow::Result<MissenseAnnotationMap>;
}

impl AnnotationLookup for MissenseAnnotationMap {
    fn missense_annotations(&self, keys: &BTreeSet<CompositeKey>)
        -> anyhow::Result<MissenseAnnotationMap>
    {
        Ok(keys.iter()
           .filter_map(|key| self.get(key).map(|annotation| (key.clone(), annotation.clone())))
           .collect())
    }
}

pub struct AnnotationDb {
    conn: Connection,
}

impl AnnotationDb {
    pub fn new(conn: Connection) -> AnnotationDb {
        AnnotationDb {
            conn,
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<AnnotationDb> {
        Ok(AnnotationDb::new(open_read_only(path)?))
    }

    fn lookup_chunk(&self, keys: &[&CompositeKey], results: &mut MissenseAnnotationMap)
        -> anyhow::Result<()>
    {
        let query = format!("SELECT Chrom||'-'||Pos||'-'||Ref||'-'||Alt AS variant_key,
                                    Symbol,
                                    Ensembl_protein_position,
                                    AA_ref,
                                    AA_alt
                               FROM misfit
                              WHERE (Chrom||'-'||Pos||'-'||Ref||'-'||Alt) IN ({})",
                            placeholders(keys.len()));

        let mut stmt = self.conn.prepare(&query)?;
        let mut rows = stmt.query(params_from_iter(keys.iter()))?;

        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;

            let (Some(symbol), Some(protein_position), Some(aa_ref), Some(aa_alt)) =
                (value_to_string(row.get_ref(1)?), value_to_residue_number(row.get_ref(2)?),
                 value_to_string(row.get_ref(3)?), value_to_string(row.get_ref(4)?))
            else {
                tracing::debug!("incomplete annotation for {}", key);
                continue;
            };

            results.entry(key).or_insert_with(|| MissenseAnnotation {
                symbol: symbol.to_shared_str(),
                protein_position,
                aa_ref: aa_ref.to_shared_str(),
                aa_alt: aa_alt.to_shared_str(),
            });
        }

        Ok(())
    }
}

impl AnnotationLookup for AnnotationDb {
    fn missense_annotations(&self, keys: &BTreeSet<CompositeKey>)
        -> anyhow::Result<MissenseAnnotationMap>
    {
        let mut results = HashMap::new();
        let keys: Vec<&CompositeKey> = keys.iter().collect();

        for chunk in keys.chunks(KEY_CHUNK_SIZE) {
            self.lookup_chunk(chunk, &mut results)?;
        }

        Ok(results)
    }
}
