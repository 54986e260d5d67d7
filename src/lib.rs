//! chocan - typed flat-file record store and reporting backend for the
//! ChocAn data center
//!
//! Layers, leaves first:
//! - `schema`: table schemas and typed values
//! - `storage`: self-describing table files with checksums
//! - `store`: validated load/add/update/remove/overwrite and id generation
//! - `report`: CSV report files
//! - `services`: members, providers, provider directory, billing, reports
//! - `cli`: command dispatch

pub mod cli;
pub mod errors;
pub mod observability;
pub mod report;
pub mod schema;
pub mod services;
pub mod storage;
pub mod store;
