//! Patient CRUD service
//!
//! Every operation is one load -> check -> mutate -> save cycle against the
//! store. Cycles are serialized by a per-service mutex, so two requests in the
//! same process never interleave. Separate processes sharing one backing file
//! are not coordinated: the last save wins.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::{Patient, PatientPatch, PatientView};
use crate::store::{PatientMap, PatientStore};
use crate::{Error, Result};

pub const DEFAULT_SKIP: usize = 0;
pub const DEFAULT_LIMIT: usize = 5;

/// Offset/limit window for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: usize,
    pub limit: usize,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Height,
    Weight,
    Bmi,
}

impl SortKey {
    pub const ALLOWED: [&'static str; 3] = ["height", "weight", "bmi"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "height" => Some(SortKey::Height),
            "weight" => Some(SortKey::Weight),
            "bmi" => Some(SortKey::Bmi),
            _ => None,
        }
    }

    fn value(self, view: &PatientView) -> f64 {
        match self {
            SortKey::Height => view.height,
            SortKey::Weight => view.weight,
            SortKey::Bmi => view.bmi,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const ALLOWED: [&'static str; 2] = ["asc", "desc"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// CRUD over one patient store
pub struct PatientService {
    store: Arc<dyn PatientStore>,
    cycle: Mutex<()>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self {
            store,
            cycle: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn PatientStore> {
        &self.store
    }

    /// Insert a new record; `Conflict` if the id is taken
    pub async fn create(&self, patient: Patient) -> Result<PatientView> {
        let _guard = self.cycle.lock().await;
        let mut patients = self.store.load().await?;

        if patients.contains(patient.id()) {
            return Err(Error::Conflict(format!(
                "Patient with ID {} already exists",
                patient.id()
            )));
        }

        let view = patient.view()?;
        let (id, fields) = patient.into_parts();
        patients.insert(id, fields);
        self.store.save(&patients).await?;

        info!("Created patient {}", view.id);
        Ok(view)
    }

    pub async fn get(&self, id: &str) -> Result<PatientView> {
        let _guard = self.cycle.lock().await;
        let patients = self.store.load().await?;
        let fields = patients
            .get(id)
            .ok_or_else(|| Error::patient_not_found(id))?;
        Ok(PatientView::from_stored(id, fields)?)
    }

    /// Records in insertion order, windowed by `skip`/`limit`
    pub async fn list(&self, window: Window) -> Result<Vec<PatientView>> {
        let _guard = self.cycle.lock().await;
        let patients = self.store.load().await?;
        let views = patients
            .iter()
            .skip(window.skip)
            .take(window.limit)
            .map(|(id, fields)| PatientView::from_stored(id, fields))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(
            "Listed {} of {} patients (skip {}, limit {})",
            views.len(),
            patients.len(),
            window.skip,
            window.limit
        );
        Ok(views)
    }

    /// All records ordered by a numeric field; ties keep insertion order
    pub async fn sorted(&self, key: SortKey, order: SortOrder) -> Result<Vec<PatientView>> {
        let _guard = self.cycle.lock().await;
        let patients = self.store.load().await?;
        let mut views = all_views(&patients)?;
        views.sort_by(|a, b| {
            let ord = key.value(a).total_cmp(&key.value(b));
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        Ok(views)
    }

    /// Merge `patch` over the stored record and re-validate the result
    pub async fn update(&self, id: &str, patch: &PatientPatch) -> Result<PatientView> {
        let _guard = self.cycle.lock().await;
        let mut patients = self.store.load().await?;

        let current = patients
            .get(id)
            .ok_or_else(|| Error::patient_not_found(id))?;
        let merged = Patient::new(id, patch.apply(current))?;
        let view = merged.view()?;

        let (_, fields) = merged.into_parts();
        patients.replace(id, fields);
        self.store.save(&patients).await?;

        info!("Updated patient {}", id);
        Ok(view)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.cycle.lock().await;
        let mut patients = self.store.load().await?;

        if patients.remove(id).is_none() {
            return Err(Error::patient_not_found(id));
        }
        self.store.save(&patients).await?;

        info!("Deleted patient {}", id);
        Ok(())
    }
}

fn all_views(patients: &PatientMap) -> Result<Vec<PatientView>> {
    patients
        .iter()
        .map(|(id, fields)| PatientView::from_stored(id, fields).map_err(Error::from))
        .collect()
}
