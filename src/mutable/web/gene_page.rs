use std::collections::BTreeSet;

use flexstr::ToSharedStr;

use crate::bio::aa_change::{is_placeholder_aa_change, parse_aa_position, AaChangeNotation};
use crate::bio::lollipop::aggregate;
use crate::db::distance::DistanceDb;
use crate::db::dnv::{CohortVariant, DnvDb};
use crate::db::gene::{GeneDb, ProteinSummary};
use crate::db::scores::{ConstraintDb, PlddtDb};
use crate::error::{MutableError, Result};
use crate::types::GeneSymbol;
use crate::web::config::Config;
use crate::web::data::{GenePagePayload, NamedValues};

pub struct GenePageStores {
    pub genes: GeneDb,
    pub dnvs: DnvDb,
    pub distances: DistanceDb,
    pub constraints: ConstraintDb,
    pub plddt: PlddtDb,
}

impl GenePageStores {
    pub fn open(config: &Config) -> rusqlite::Result<GenePageStores> {
        Ok(GenePageStores {
            genes: GeneDb::open(&config.gene_database)?,
            dnvs: DnvDb::open(&config.dnv_database)?,
            distances: DistanceDb::open(&config.distance_database)?,
            constraints: ConstraintDb::open(&config.constraint_database)?,
            plddt: PlddtDb::open(&config.plddt_database)?,
        })
    }
}

// Gene symbols and Ensembl gene IDs are both accepted
fn resolve_gene(gene_id: &str, genes: &GeneDb) -> Result<GeneSymbol> {
    let gene_id = gene_id.trim().to_uppercase();

    if gene_id.contains("ENSG") {
        genes.hgnc_of_ensembl_id(&gene_id)?
            .ok_or_else(|| MutableError::not_found("gene", &gene_id))
    } else {
        Ok(gene_id.to_shared_str())
    }
}

// the plotted sequence has to be long enough for every variant position
fn plotted_sequence_length(summary: &ProteinSummary, cohort_variants: &[CohortVariant]) -> u64 {
    cohort_variants.iter()
        .filter_map(|cohort_variant| cohort_variant.row.aa_change.as_ref())
        .filter_map(|aa_change| parse_aa_position(aa_change, AaChangeNotation::ProteinNotation))
        .filter_map(|position| u64::try_from(position).ok())
        .map(|position| position + 1)
        .fold(summary.sequence_length().unwrap_or(0), u64::max)
}

pub fn build_gene_page(gene_id: &str, stores: &GenePageStores, config: &Config)
    -> Result<GenePagePayload>
{
    let gene = resolve_gene(gene_id, &stores.genes)?;

    let cohort_variants = stores.dnvs.variants_of_gene(&gene)?;

    if cohort_variants.is_empty() {
        return Err(MutableError::not_found("gene", &gene));
    }

    let Some(metrics) = stores.genes.gene_metrics(&gene)?
    else {
        return Err(MutableError::not_found("gene", &gene));
    };

    let mut summary =
        match metrics.uniprot_json.as_deref().map(ProteinSummary::from_uniprot_json) {
            Some(Ok(summary)) => summary,
            Some(Err(err)) => {
                tracing::warn!("can't parse UniProt JSON of {}: {}", gene, err);
                return Err(MutableError::not_found("protein of gene", &gene));
            },
            None => return Err(MutableError::not_found("protein of gene", &gene)),
        };

    let sequence_length = plotted_sequence_length(&summary, &cohort_variants);
    summary.set_sequence_length(sequence_length);

    let lollipop_variants =
        aggregate(cohort_variants.iter().map(|cohort_variant| &cohort_variant.row),
                  AaChangeNotation::ProteinNotation);

    let conditions: BTreeSet<_> = cohort_variants.iter()
        .filter(|cohort_variant| {
            cohort_variant.row.aa_change.as_deref()
                .is_some_and(|aa_change| !is_placeholder_aa_change(aa_change))
        })
        .filter_map(CohortVariant::condition)
        .collect();

    let distance = stores.distances.edges_of_gene(&gene)?;
    let constraints = stores.constraints.regional_constraints(&gene)?;

    let uniprot_id = metrics.first_uniprot_id();

    let plddt =
        match uniprot_id {
            Some(ref uniprot_id) => stores.plddt.plddt_scores(uniprot_id)?,
            None => vec![],
        };

    tracing::info!("gene page of {}: {} cohort variants, {} close pairs",
                   gene, cohort_variants.len(), distance.len());

    let rows = cohort_variants.into_iter()
        .map(|cohort_variant| cohort_variant.columns)
        .collect();

    Ok(GenePagePayload {
        gene,
        metrics,
        sequence: NamedValues::new("sequence", summary.sequence),
        aa_change: NamedValues::new("aa_change", sequence_length),
        domains: NamedValues::new("domains", summary.domains),
        distance: NamedValues::new("distance", distance),
        variants: NamedValues::new("variants", lollipop_variants.entries),
        consequences: lollipop_variants.consequences,
        conditions: conditions.into_iter().collect(),
        constraints: NamedValues::new("constraints", constraints),
        plddt: NamedValues::new("scores", plddt),
        uniprot_id,
        display_fields: config.display_fields.clone(),
        rows,
    })
}
