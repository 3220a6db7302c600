use std::fs::File;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use flexstr::ToSharedStr;
use rusqlite::Connection;
use tempfile::TempDir;

use mutable::bio::proximity::DistanceEdge;
use mutable::bio::structure_reader::structure_file_path;
use mutable::bio::variant_upload::Variant;
use mutable::db::distance::DistanceDb;
use mutable::web::config::Config;

pub const TP53_UNIPROT_ID: &str = "P04637";
pub const TP53_ENSEMBL_ID: &str = "ENSG00000141510";

#[allow(dead_code)]
pub struct TestEnv {
    // removed with everything below it when the test ends
    pub dir: TempDir,
    pub config: Config,
}

#[allow(dead_code)]
pub fn missense_variant(gene: &str, position: i32) -> Variant {
    Variant {
        gene: gene.to_shared_str(),
        consequence: "missense".into(),
        aa_change: Some(format!("{}R>{}H", position, position).to_shared_str()),
        residue_position: Some(position),
    }
}

// an ATOM record with the PDB fixed column layout
#[allow(dead_code)]
pub fn atom_line(serial: usize, residue_number: i32, x: f64, y: f64, z: f64) -> String {
    format!("ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00 90.00           C",
            serial, "CA", "ARG", "A", residue_number, x, y, z)
}

// atoms as (residue number, x, y, z)
#[allow(dead_code)]
pub fn pdb_text(atoms: &[(i32, f64, f64, f64)]) -> String {
    let mut text = String::from("HEADER    PREDICTED MODEL\n");

    for (index, (residue_number, x, y, z)) in atoms.iter().enumerate() {
        text.push_str(&atom_line(index + 1, *residue_number, *x, *y, *z));
        text.push('\n');
    }

    text.push_str("END\n");
    text
}

#[allow(dead_code)]
pub fn write_gz_structure(structure_dir: &Path, uniprot_id: &str,
                          atoms: &[(i32, f64, f64, f64)]) {
    let path = structure_file_path(structure_dir, uniprot_id);
    let file = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(pdb_text(atoms).as_bytes()).unwrap();
    encoder.finish().unwrap();
}

// residue 175 is averaged from two atoms, 100 is far from the others
#[allow(dead_code)]
pub fn tp53_atoms() -> Vec<(i32, f64, f64, f64)> {
    vec![
        (100, 40.0, 40.0, 40.0),
        (175, -1.0, 0.0, 0.0),
        (175, 1.0, 0.0, 0.0),
        (248, 5.0, 0.0, 0.0),
        (273, 0.0, 5.0, 0.0),
    ]
}

fn tp53_uniprot_json() -> String {
    serde_json::json!({
        "primaryAccession": TP53_UNIPROT_ID,
        "sequence": {
            "length": 393,
            "molWeight": 43653
        },
        "features": [
            {
                "type": "Domain",
                "description": "Transactivation",
                "location": { "start": { "value": 1 }, "end": { "value": 61 } }
            },
            {
                "type": "DNA binding",
                "description": "DNA binding",
                "location": { "start": { "value": 102 }, "end": { "value": 292 } }
            },
            {
                "type": "Modified residue",
                "description": "Phosphoserine",
                "location": { "start": { "value": 15 }, "end": { "value": 15 } }
            }
        ]
    }).to_string()
}

fn make_gene_database(path: &Path) {
    let conn = Connection::open(path).unwrap();

    conn.execute_batch(
        "CREATE TABLE gene (hgnc TEXT, uniprot_id TEXT, ensembl_id TEXT, uniprot_json TEXT,
                            pli REAL, mis_z REAL, oe_lof REAL, mim_id TEXT, s_het_zeng REAL,
                            gene_full_name TEXT, MisFit_sgene_mis REAL);").unwrap();

    conn.execute("INSERT INTO gene VALUES (?1, ?2, ?3, ?4, 0.99, 3.2, 0.25, '191170', 0.3,
                                           'tumor protein p53', 0.71)",
                 ("TP53", "P04637;Q53GA5", TP53_ENSEMBL_ID, tp53_uniprot_json())).unwrap();
    conn.execute("INSERT INTO gene VALUES ('KRAS', 'P01116', 'ENSG00000133703', NULL,
                                           0.7, 3.1, 0.3, '190070', 0.1,
                                           'KRAS proto-oncogene', 0.5)", ()).unwrap();
}

fn make_annotation_database(path: &Path) {
    let conn = Connection::open(path).unwrap();

    conn.execute_batch(
        "CREATE TABLE misfit (Chrom TEXT, Pos INTEGER, Ref TEXT, Alt TEXT, Symbol TEXT,
                              Ensembl_protein_position INTEGER, AA_ref TEXT, AA_alt TEXT);
         INSERT INTO misfit VALUES ('17', 7675088, 'C', 'T', 'TP53', 175, 'R', 'H');
         INSERT INTO misfit VALUES ('17', 7674220, 'C', 'T', 'TP53', 248, 'R', 'Q');
         INSERT INTO misfit VALUES ('17', 7673802, 'C', 'T', 'TP53', 273, 'R', 'H');
         INSERT INTO misfit VALUES ('7', 140453136, 'A', 'T', 'BRAF', 600, 'V', 'E');").unwrap();
}

fn make_dnv_database(path: &Path) {
    let conn = Connection::open(path).unwrap();

    conn.execute_batch(
        "CREATE TABLE dnvs (sample TEXT, gene TEXT, consequence TEXT, aa_change TEXT,
                            status TEXT, cohort_condition TEXT, gmvp REAL, MisFit_D REAL,
                            AlphaMissense REAL);
         INSERT INTO dnvs VALUES ('S1', 'TP53', 'missense_variant',
                                  'ENSP00000269305.4:p.Arg175His', 'affected', 'ASD',
                                  0.9, 0.8, 0.95);
         INSERT INTO dnvs VALUES ('S2', 'TP53', 'missense_variant',
                                  'ENSP00000269305.4:p.Arg273His', 'affected', 'ASD',
                                  0.7, 0.6, 0.9);
         INSERT INTO dnvs VALUES ('S3', 'TP53', 'missense_variant',
                                  'ENSP00000269305.4:p.Arg273His', 'affected', 'DD',
                                  0.7, 0.6, 0.9);
         INSERT INTO dnvs VALUES ('S4', 'TP53', 'stop_gained',
                                  'ENSP00000269305.4:p.Arg196Ter', 'control', NULL,
                                  0.5, NULL, NULL);
         INSERT INTO dnvs VALUES ('S5', 'TP53', 'synonymous_variant', '.', 'control', NULL,
                                  NULL, NULL, NULL);
         INSERT INTO dnvs VALUES ('S6', 'TP53', 'missense_variant',
                                  'ENSP00000269305.4:p.Arg400His', 'affected', 'ASD',
                                  0.4, 0.3, 0.2);
         INSERT INTO dnvs VALUES ('S7', 'KRAS', 'missense_variant',
                                  'ENSP00000256078.5:p.Gly12Asp', 'affected', 'DD',
                                  0.9, 0.9, 0.9);").unwrap();
}

fn make_distance_database(path: &Path) {
    let mut distance_db = DistanceDb::create(path).unwrap();

    distance_db.store_edges(&[DistanceEdge {
        gene: "TP53".into(),
        residue_1: 175,
        residue_2: 273,
        distance_3d: 5.0,
        distance_1d: 98,
    }]).unwrap();
}

fn make_constraint_database(path: &Path) {
    let conn = Connection::open(path).unwrap();

    conn.execute_batch(
        "CREATE TABLE regional (gene_name TEXT, start_aa TEXT, stop_aa TEXT, oe REAL);
         INSERT INTO regional VALUES ('TP53', 'Met1', 'Arg120', 0.35);
         INSERT INTO regional VALUES ('TP53', 'Ser121', 'Asp393', 0.8);
         INSERT INTO regional VALUES ('BRCA2', 'Met1', 'Tyr3418', 0.9);").unwrap();
}

fn make_plddt_database(path: &Path) {
    let conn = Connection::open(path).unwrap();

    conn.execute_batch(
        "CREATE TABLE plddt (id INTEGER, UniProtID TEXT, location INTEGER, pLDDT REAL);
         INSERT INTO plddt VALUES (1, 'P04637', 2, 55.0);
         INSERT INTO plddt VALUES (2, 'P04637', 1, 40.0);
         INSERT INTO plddt VALUES (3, 'P01116', 1, 90.0);").unwrap();
}

// S8 has no de novo variants
fn make_sample_database(path: &Path) {
    let conn = Connection::open(path).unwrap();

    conn.execute_batch(
        "CREATE TABLE samples (sample TEXT, sex TEXT, status TEXT, cohort_condition TEXT);
         INSERT INTO samples VALUES ('S1', 'F', 'affected', 'ASD');
         INSERT INTO samples VALUES ('S4', 'M', 'control', NULL);
         INSERT INTO samples VALUES ('S8', 'M', 'affected', 'DD');").unwrap();
}

// All stores populated for TP53 plus a bit of noise, and the TP53 structure
#[allow(dead_code)]
pub fn make_test_env() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();

    let instance_dir = dir.path().join("instance");
    let structure_dir = dir.path().join("structures");
    std::fs::create_dir(&instance_dir).unwrap();
    std::fs::create_dir(&structure_dir).unwrap();

    let config = Config {
        instance_dir,
        structure_dir,
        gene_database: dir.path().join("gene.sqlite"),
        annotation_database: dir.path().join("annotation.sqlite"),
        dnv_database: dir.path().join("dnvs.sqlite"),
        distance_database: dir.path().join("distance.sqlite"),
        constraint_database: dir.path().join("regional.sqlite"),
        plddt_database: dir.path().join("plddt.sqlite"),
        sample_database: dir.path().join("samples.sqlite"),
        distance_threshold: 15.0,
        display_fields: vec!["sample".into(), "gmvp".into()],
        bind_address: "127.0.0.1:0".to_owned(),
        upload_size_limit: 10 * 1024 * 1024,
    };

    make_gene_database(&config.gene_database);
    make_annotation_database(&config.annotation_database);
    make_dnv_database(&config.dnv_database);
    make_distance_database(&config.distance_database);
    make_constraint_database(&config.constraint_database);
    make_plddt_database(&config.plddt_database);
    make_sample_database(&config.sample_database);

    write_gz_structure(&config.structure_dir, TP53_UNIPROT_ID, &tp53_atoms());

    TestEnv {
        dir,
        config,
    }
}

#[allow(dead_code)]
pub fn scratch_file_count(config: &Config) -> usize {
    std::fs::read_dir(&config.instance_dir).unwrap().count()
}
