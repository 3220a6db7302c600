use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use flexstr::SharedStr as FlexStr;

use crate::constants::{DEFAULT_BIND_ADDRESS, DEFAULT_DISTANCE_THRESHOLD,
                       DEFAULT_UPLOAD_SIZE_LIMIT};

fn default_distance_threshold() -> f64 {
    DEFAULT_DISTANCE_THRESHOLD
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_owned()
}

fn default_upload_size_limit() -> usize {
    DEFAULT_UPLOAD_SIZE_LIMIT
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    // scratch databases of requests are created here
    pub instance_dir: PathBuf,
    // AlphaFold models: AF-{uniprot_id}-F1-model_v4.pdb.gz
    pub structure_dir: PathBuf,
    pub gene_database: PathBuf,
    pub annotation_database: PathBuf,
    pub dnv_database: PathBuf,
    pub distance_database: PathBuf,
    pub constraint_database: PathBuf,
    pub plddt_database: PathBuf,
    pub sample_database: PathBuf,
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,
    // cohort columns shown in the variant table of the gene page
    #[serde(default)]
    pub display_fields: Vec<FlexStr>,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    // in bytes, for the whole multipart request body
    #[serde(default = "default_upload_size_limit")]
    pub upload_size_limit: usize,
}

impl Config {
    pub fn read(config_file_name: &str) -> anyhow::Result<Config> {
        let file = File::open(config_file_name)
            .with_context(|| format!("failed to read {}", config_file_name))?;
        let reader = BufReader::new(file);

        serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse {}", config_file_name))
    }
}
