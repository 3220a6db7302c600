pub mod aa_change;
pub mod variant_upload;
pub mod structure_reader;
pub mod proximity;
pub mod lollipop;
