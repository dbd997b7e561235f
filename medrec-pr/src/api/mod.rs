//! HTTP API handlers for medrec-pr

pub mod health;
pub mod patients;

pub use health::health_routes;
pub use patients::{
    create_patient, delete_patient, get_patient, list_patients, sort_patients, update_patient,
};
