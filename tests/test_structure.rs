use std::path::Path;

use mutable::bio::structure_reader::{read_atom_coordinates, read_residue_coordinates,
                                     residue_coordinates_from_reader, structure_file_path};

mod util;

#[test]
fn test_structure_file_path() {
    let path = structure_file_path(Path::new("/data/af"), "P04637");
    assert_eq!(path, Path::new("/data/af/AF-P04637-F1-model_v4.pdb.gz"));
}

#[test]
fn test_missing_structure_is_empty() {
    let coords =
        read_residue_coordinates(Path::new("/nonexistent/AF-P04637-F1-model_v4.pdb.gz"))
        .unwrap();
    assert!(coords.is_empty());
}

#[test]
fn test_residue_averaging() {
    let text = util::pdb_text(&[(1, 0.0, 0.0, 0.0), (1, 2.0, 4.0, -2.0), (2, 10.0, 10.0, 10.0)]);

    let coords = residue_coordinates_from_reader(text.as_bytes()).unwrap();

    assert_eq!(coords.len(), 2);

    let first = coords.get(&1).unwrap();
    assert_eq!(first.residue_number, 1);
    assert_eq!((first.x, first.y, first.z), (1.0, 2.0, -1.0));

    let second = coords.get(&2).unwrap();
    assert_eq!((second.x, second.y, second.z), (10.0, 10.0, 10.0));
}

#[test]
fn test_single_atom_is_empty() {
    let text = util::pdb_text(&[(42, 1.0, 1.0, 1.0)]);
    let coords = residue_coordinates_from_reader(text.as_bytes()).unwrap();
    assert!(coords.is_empty());
}

#[test]
fn test_malformed_records_skipped() {
    let mut text = util::pdb_text(&[(5, 1.0, 2.0, 3.0), (6, 4.0, 5.0, 6.0)]);
    text.push_str("ATOM      3  CA  ARG A   7    not_a_number\n");
    text.push_str("ATOM  short\n");
    text.push_str("REMARK   1 not an atom\n");

    let atoms = read_atom_coordinates(text.as_bytes()).unwrap();
    assert_eq!(atoms.len(), 2);
    assert_eq!(atoms[1].residue_number, 6);
    assert_eq!(atoms[1].z, 6.0);
}

#[test]
fn test_alternate_locations() {
    let mut text = util::pdb_text(&[(8, 0.0, 0.0, 0.0)]);

    for (serial, alt_location, x) in [(2, "A", 2.0), (3, "B", 50.0), (4, "C", 60.0)] {
        let mut line = util::atom_line(serial, 9, x, 0.0, 0.0);
        line.replace_range(16..17, alt_location);
        text.push_str(&line);
        text.push('\n');
    }

    let atoms = read_atom_coordinates(text.as_bytes()).unwrap();

    let residue_9: Vec<_> = atoms.iter().filter(|atom| atom.residue_number == 9).collect();
    assert_eq!(residue_9.len(), 1);
    assert_eq!(residue_9[0].x, 2.0);
}

#[test]
fn test_negative_residue_numbers() {
    let text = util::pdb_text(&[(-3, 0.0, 0.0, 0.0), (0, 1.0, 0.0, 0.0)]);
    let coords = residue_coordinates_from_reader(text.as_bytes()).unwrap();

    assert_eq!(coords.keys().copied().collect::<Vec<_>>(), vec![-3, 0]);
}

#[test]
fn test_read_gzipped_structure() {
    let dir = tempfile::tempdir().unwrap();
    util::write_gz_structure(dir.path(), util::TP53_UNIPROT_ID, &util::tp53_atoms());

    let path = structure_file_path(dir.path(), util::TP53_UNIPROT_ID);
    let coords = read_residue_coordinates(&path).unwrap();

    assert_eq!(coords.keys().copied().collect::<Vec<_>>(), vec![100, 175, 248, 273]);

    let residue_175 = coords.get(&175).unwrap();
    assert_eq!((residue_175.x, residue_175.y, residue_175.z), (0.0, 0.0, 0.0));
}
