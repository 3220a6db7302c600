use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::read::GzDecoder;

use crate::types::{ResidueCoordinateMap, ResidueNumber};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ResidueCoordinate {
    pub residue_number: ResidueNumber,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ResidueCoordinate {
    pub fn distance_to(&self, other: &ResidueCoordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

// AlphaFold predicted structure for the human proteome, one model per UniProt entry
pub fn structure_file_path(structure_dir: &Path, uniprot_id: &str) -> PathBuf {
    structure_dir.join(format!("AF-{}-F1-model_v4.pdb.gz", uniprot_id))
}

fn field(line: &str, start: usize, end: usize) -> Option<&str> {
    let end = end.min(line.len());
    line.get(start..end).map(str::trim)
}

// only the first alternate location of an atom is used
fn is_first_alt_location(line: &str) -> bool {
    matches!(line.as_bytes().get(16), None | Some(b' ') | Some(b'A'))
}

// ATOM/HETATM records use fixed columns:
//   17 alternate location, 23-26 residue sequence number, 31-38 x, 39-46 y, 47-54 z
fn parse_atom_record(line: &str) -> Option<ResidueCoordinate> {
    let residue_number = field(line, 22, 26)?.parse().ok()?;
    let x = field(line, 30, 38)?.parse().ok()?;
    let y = field(line, 38, 46)?.parse().ok()?;
    let z = field(line, 46, 54)?.parse().ok()?;

    Some(ResidueCoordinate {
        residue_number,
        x,
        y,
        z,
    })
}

fn is_atom_record(line: &str) -> bool {
    line.starts_with("ATOM  ") || line.starts_with("HETATM")
}

pub fn read_atom_coordinates<R: Read>(source: R) -> anyhow::Result<Vec<ResidueCoordinate>> {
    let reader = BufReader::new(source);
    let mut atoms = vec![];
    let mut skipped_count = 0usize;

    for line in reader.lines() {
        let line = line.context("failed to read structure record")?;

        if !is_atom_record(&line) || !is_first_alt_location(&line) {
            continue;
        }

        match parse_atom_record(&line) {
            Some(atom) => atoms.push(atom),
            None => skipped_count += 1,
        }
    }

    if skipped_count > 0 {
        tracing::debug!("skipped {} unreadable atom records", skipped_count);
    }

    Ok(atoms)
}

pub fn average_by_residue(atoms: &[ResidueCoordinate]) -> ResidueCoordinateMap {
    let mut sums: BTreeMap<ResidueNumber, (f64, f64, f64, usize)> = BTreeMap::new();

    for atom in atoms {
        let sum = sums.entry(atom.residue_number).or_insert((0.0, 0.0, 0.0, 0));
        sum.0 += atom.x;
        sum.1 += atom.y;
        sum.2 += atom.z;
        sum.3 += 1;
    }

    sums.into_iter()
        .map(|(residue_number, (x, y, z, count))| {
            let count = count as f64;
            (residue_number,
             ResidueCoordinate {
                 residue_number,
                 x: x / count,
                 y: y / count,
                 z: z / count,
             })
        })
        .collect()
}

pub fn residue_coordinates_from_reader<R: Read>(source: R)
    -> anyhow::Result<ResidueCoordinateMap>
{
    let atoms = read_atom_coordinates(source)?;

    // a single atom can't give any pairs
    if atoms.len() < 2 {
        return Ok(ResidueCoordinateMap::new());
    }

    Ok(average_by_residue(&atoms))
}

// A missing file isn't an error: most genes have no predicted structure
// in the configured directory
pub fn read_residue_coordinates(path: &Path) -> anyhow::Result<ResidueCoordinateMap> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("no structure file at {}", path.display());
            return Ok(ResidueCoordinateMap::new());
        },
        Err(err) => {
            return Err(err).with_context(|| format!("failed to open {}", path.display()));
        }
    };

    let is_gzipped = path.extension().is_some_and(|ext| ext == "gz");

    let coords =
        if is_gzipped {
            residue_coordinates_from_reader(GzDecoder::new(file))
        } else {
            residue_coordinates_from_reader(file)
        };

    coords.with_context(|| format!("failed to read structure {}", path.display()))
}
