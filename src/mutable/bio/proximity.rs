use std::collections::HashSet;
use std::path::Path;

use crate::bio::structure_reader::{read_residue_coordinates, structure_file_path,
                                   ResidueCoordinate};
use crate::bio::variant_upload::{NormalizedUpload, Variant};
use crate::constants::MISSENSE;
use crate::types::{GeneSymbol, GeneUniProtMap, ResidueCoordinateMap, ResidueNumber,
                   UniProtId};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DistanceEdge {
    pub gene: GeneSymbol,
    #[serde(rename = "resno_of_variant_1")]
    pub residue_1: ResidueNumber,
    #[serde(rename = "resno_of_variant_2")]
    pub residue_2: ResidueNumber,
    pub distance_3d: f64,
    pub distance_1d: ResidueNumber,
}

impl DistanceEdge {
    fn new(gene: &GeneSymbol, first: ResidueNumber, second: ResidueNumber,
           distance: f64) -> DistanceEdge
    {
        let (residue_1, residue_2) =
            if first > second {
                (second, first)
            } else {
                (first, second)
            };

        DistanceEdge {
            gene: gene.clone(),
            residue_1,
            residue_2,
            distance_3d: round_to_3_places(distance),
            distance_1d: residue_2 - residue_1,
        }
    }
}

fn round_to_3_places(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// The missense variants of genes that have a structure mapping
pub fn select_missense_variants(upload: &NormalizedUpload) -> Vec<Variant> {
    upload.variants.iter()
        .filter(|variant| &*variant.consequence == MISSENSE)
        .filter(|variant| upload.gene_uniprot_map.contains_key(&variant.gene))
        .cloned()
        .collect()
}

// the first of the gene's UniProt IDs
pub fn uniprot_id_of_gene(gene_uniprot_map: &GeneUniProtMap, gene: &GeneSymbol)
    -> Option<UniProtId>
{
    gene_uniprot_map.get(gene)?.first().cloned()
}

// One point per residue, in variant order: variants sharing a position
// only contribute the first one
fn joined_points(gene: &GeneSymbol, variants: &[Variant],
                 residue_coordinates: &ResidueCoordinateMap)
    -> Vec<ResidueCoordinate>
{
    let mut seen_positions = HashSet::new();

    variants.iter()
        .filter(|variant| &variant.gene == gene)
        .filter_map(|variant| variant.residue_position)
        .filter(|position| seen_positions.insert(*position))
        .filter_map(|position| residue_coordinates.get(&position).copied())
        .collect()
}

pub fn compute_proximities(gene: &GeneSymbol, variants: &[Variant],
                           residue_coordinates: &ResidueCoordinateMap,
                           threshold: f64)
    -> Vec<DistanceEdge>
{
    let points = joined_points(gene, variants, residue_coordinates);
    let mut edges = vec![];

    for i in 1..points.len() {
        for j in 0..i {
            let distance = points[i].distance_to(&points[j]);

            if distance < threshold {
                edges.push(DistanceEdge::new(gene, points[i].residue_number,
                                             points[j].residue_number, distance));
            }
        }
    }

    edges
}

// Every kind of absence (no UniProt mapping, no structure file, no
// variant residue in the structure) gives an empty list
pub fn gene_distances(gene: &GeneSymbol, missense_variants: &[Variant],
                      gene_uniprot_map: &GeneUniProtMap, structure_dir: &Path,
                      threshold: f64)
    -> anyhow::Result<Vec<DistanceEdge>>
{
    let Some(uniprot_id) = uniprot_id_of_gene(gene_uniprot_map, gene)
    else {
        tracing::info!("no UniProt mapping for {}, skipping distances", gene);
        return Ok(vec![]);
    };

    let structure_path = structure_file_path(structure_dir, &uniprot_id);
    let residue_coordinates = read_residue_coordinates(&structure_path)?;

    if residue_coordinates.is_empty() {
        tracing::info!("no structure coordinates for {} ({})", gene, uniprot_id);
        return Ok(vec![]);
    }

    let edges = compute_proximities(gene, missense_variants, &residue_coordinates,
                                    threshold);

    tracing::debug!("{} residue pairs of {} closer than {}", edges.len(), gene, threshold);

    Ok(edges)
}
