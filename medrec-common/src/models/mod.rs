//! Record, patch and model-input schemas

pub mod features;
pub mod patch;
pub mod patient;

pub use features::{ModelInput, UserInput};
pub use patch::PatientPatch;
pub use patient::{Gender, Patient, PatientFields, PatientView};
