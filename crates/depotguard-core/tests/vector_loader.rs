//! JSON test vector loader shared by the access-policy tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use depotguard_core::SecurityLevel;

#[derive(Debug, Deserialize)]
pub struct VectorFile<T> {
    pub description: String,
    pub cases: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct BlpCase {
    pub subject: SecurityLevel,
    pub object: SecurityLevel,
    pub read: bool,
    pub write: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClassificationCase {
    pub data_type: String,
    pub level: SecurityLevel,
}

pub fn load<T: DeserializeOwned>(name: &str) -> VectorFile<T> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}
