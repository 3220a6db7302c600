use std::collections::HashMap;

use flexstr::ToSharedStr;

use mutable::bio::proximity::DistanceEdge;
use mutable::db::distance::DistanceDb;
use mutable::db::dnv::{cohort_missense_by_gene, DnvDb};
use mutable::db::gene::{upper_case_gene_map, GeneDb};

mod util;

fn tp53_edge(residue_2: i32) -> DistanceEdge {
    DistanceEdge {
        gene: "TP53".into(),
        residue_1: 175,
        residue_2,
        distance_3d: 5.0,
        distance_1d: residue_2 - 175,
    }
}

#[test]
fn test_rebuild_replaces_distances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("distance.sqlite");

    let mut distance_db = DistanceDb::create(&path).unwrap();
    distance_db.store_edges(&[tp53_edge(273), tp53_edge(248)]).unwrap();
    drop(distance_db);

    let mut distance_db = DistanceDb::create(&path).unwrap();
    distance_db.store_edges(&[tp53_edge(273)]).unwrap();
    drop(distance_db);

    let distance_db = DistanceDb::open(&path).unwrap();
    assert_eq!(distance_db.edges_of_gene("TP53").unwrap(), vec![tp53_edge(273)]);
}

#[test]
fn test_upper_case_gene_map() {
    let mut gene_uniprot_map = HashMap::new();
    gene_uniprot_map.insert("Tp53".to_shared_str(), vec!["P04637".to_shared_str()]);
    gene_uniprot_map.insert("TP53".to_shared_str(), vec!["Q53GA5".to_shared_str()]);
    gene_uniprot_map.insert("KRAS".to_shared_str(), vec!["P01116".to_shared_str()]);

    let upper_map = upper_case_gene_map(gene_uniprot_map);

    assert_eq!(upper_map.len(), 2);

    let mut tp53_ids = upper_map.get(&"TP53".to_shared_str()).unwrap().clone();
    tp53_ids.sort();
    assert_eq!(tp53_ids, vec!["P04637".to_shared_str(), "Q53GA5".to_shared_str()]);
}

#[test]
fn test_cohort_missense_by_gene() {
    let env = util::make_test_env();
    let genes = GeneDb::open(&env.config.gene_database).unwrap();
    let dnvs = DnvDb::open(&env.config.dnv_database).unwrap();

    let gene_uniprot_map = upper_case_gene_map(genes.gene_uniprot_map().unwrap());
    assert!(gene_uniprot_map.contains_key(&"KRAS".to_shared_str()));

    // KRAS has a single missense variant, so nothing to pair
    let gene_variants = cohort_missense_by_gene(&dnvs, &gene_uniprot_map).unwrap();
    assert_eq!(gene_variants.len(), 1);

    let (gene, variants) = &gene_variants[0];
    assert_eq!(*gene, "TP53");

    let mut positions: Vec<_> = variants.iter()
        .map(|variant| variant.residue_position.unwrap())
        .collect();
    positions.sort();
    // the stop_gained and synonymous rows aren't used
    assert_eq!(positions, vec![175, 273, 273, 400]);
    assert!(variants.iter().all(|variant| variant.gene == "TP53"));
}

#[test]
fn test_cohort_genes_without_uniprot_id() {
    let env = util::make_test_env();
    let dnvs = DnvDb::open(&env.config.dnv_database).unwrap();

    let mut gene_uniprot_map = HashMap::new();
    gene_uniprot_map.insert("KRAS".to_shared_str(), vec!["P01116".to_shared_str()]);

    assert!(cohort_missense_by_gene(&dnvs, &gene_uniprot_map).unwrap().is_empty());
}
