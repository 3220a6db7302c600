pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 15.0;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8500";

pub const DEFAULT_UPLOAD_SIZE_LIMIT: usize = 100 * 1024 * 1024;

pub const CHROMOSOME_COLUMN_NAMES: &[&str; 3] = &["chr", "chrom", "chromosome"];
pub const POSITION_COLUMN_NAMES: &[&str; 2] = &["pos", "position"];

pub const MISSENSE: &str = "missense";

// cohort score of a variant that isn't missense or wasn't scored
pub const NO_SCORE: &str = "none";

// consequence type of the placeholder lollipop entry
pub const INVISIBLE: &str = "invisible";

pub const PLOTTED_FEATURE_TYPES: &[&str; 3] = &["Domain", "Region", "DNA binding"];

pub const INVALID_FILE_MESSAGE: &str = "File invalid. Please check and submit again";
