#[macro_use] extern crate serde_derive;
#[macro_use] extern crate lazy_static;

pub mod types;
pub mod constants;
pub mod error;
pub mod bio;
pub mod db;
pub mod web;

pub use crate::error::{MutableError, ValidationError, RequiredColumn};
