pub mod config;
pub mod data;
pub mod gene_page;
pub mod lollipop_page;
pub mod sample_page;
pub mod server;
