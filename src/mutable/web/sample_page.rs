use crate::db::dnv::DnvDb;
use crate::db::sample::SampleDb;
use crate::error::{MutableError, Result};
use crate::web::config::Config;
use crate::web::data::SamplePagePayload;

pub struct SamplePageStores {
    pub samples: SampleDb,
    pub dnvs: DnvDb,
}

impl SamplePageStores {
    pub fn open(config: &Config) -> rusqlite::Result<SamplePageStores> {
        Ok(SamplePageStores {
            samples: SampleDb::open(&config.sample_database)?,
            dnvs: DnvDb::open(&config.dnv_database)?,
        })
    }
}

// Sample IDs are matched exactly, a sample may have no de novo variants
pub fn build_sample_page(sample_id: &str, stores: &SamplePageStores, config: &Config)
    -> Result<SamplePagePayload>
{
    let Some(sample) = stores.samples.sample(sample_id)?
    else {
        return Err(MutableError::not_found("sample", sample_id));
    };

    let rows: Vec<_> = stores.dnvs.variants_of_sample(sample_id)?
        .into_iter()
        .map(|cohort_variant| cohort_variant.columns)
        .collect();

    tracing::info!("sample page of {}: {} variants", sample_id, rows.len());

    Ok(SamplePagePayload {
        sample,
        display_fields: config.display_fields.clone(),
        rows,
    })
}
