//! # medrec Common Library
//!
//! Shared code for the medrec services including:
//! - Patient record and partial-update schemas with full violation reporting
//! - Derived fields (BMI, verdict, premium model features)
//! - Patient stores (JSON file, SQLite table) and the CRUD service over them
//! - Insurance premium classifier
//! - Configuration loading

pub mod config;
pub mod derived;
pub mod error;
pub mod fs_util;
pub mod models;
pub mod prediction;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{DomainError, Error, ErrorKind, Result};
pub use service::PatientService;
pub use validation::ValidationError;
