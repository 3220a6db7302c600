use crate::bio::aa_change::AaChangeNotation;
use crate::bio::lollipop::aggregate;
use crate::bio::proximity::{gene_distances, select_missense_variants};
use crate::bio::variant_upload::{normalize_upload, UploadFormat};
use crate::db::annotation::AnnotationDb;
use crate::db::gene::{GeneDb, ProteinSummary};
use crate::db::scratch::ScratchDb;
use crate::error::{MutableError, Result};
use crate::web::config::Config;
use crate::web::data::{LollipopPayload, NamedValues};

pub struct UploadStores {
    pub annotations: AnnotationDb,
    pub genes: GeneDb,
}

impl UploadStores {
    pub fn open(config: &Config) -> rusqlite::Result<UploadStores> {
        Ok(UploadStores {
            annotations: AnnotationDb::open(&config.annotation_database)?,
            genes: GeneDb::open(&config.gene_database)?,
        })
    }
}

pub fn build_lollipop_page(file_name: &str, contents: &[u8], stores: &UploadStores,
                           config: &Config)
    -> Result<LollipopPayload>
{
    let format = UploadFormat::from_file_name(file_name)?;
    let upload = normalize_upload(contents, format, &stores.annotations, &stores.genes)?;

    let mut scratch = ScratchDb::create(&config.instance_dir)?;

    tracing::info!("upload {} ({}): {} variants of {}", scratch.request_id(), file_name,
                   upload.variants.len(), upload.gene);

    scratch.store_variants(&upload.variants)?;

    let missense_variants = select_missense_variants(&upload);
    let edges = gene_distances(&upload.gene, &missense_variants, &upload.gene_uniprot_map,
                               &config.structure_dir, config.distance_threshold)?;

    scratch.store_distances(&edges)?;

    let stored_rows = scratch.variant_rows()?;

    let Some(gene) = stored_rows.first().map(|(gene, _)| gene.clone())
    else {
        return Err(MutableError::NoVariants);
    };

    let distance = scratch.distances_of_gene(&gene)?;

    let lollipop_variants =
        aggregate(stored_rows.iter().map(|(_, row)| row), AaChangeNotation::PlainDigits);

    let summary =
        match stores.genes.protein_summary(&gene)? {
            Some(summary) => summary,
            None => {
                tracing::warn!("no UniProt entry for {}, plotting without sequence", gene);
                ProteinSummary::empty()
            }
        };

    Ok(LollipopPayload {
        gene,
        sequence: NamedValues::new("sequence", summary.sequence),
        domains: NamedValues::new("domains", summary.domains),
        distance: NamedValues::new("distance", distance),
        variants: NamedValues::new("variants", lollipop_variants.entries),
        consequences: lollipop_variants.consequences,
    })
}
