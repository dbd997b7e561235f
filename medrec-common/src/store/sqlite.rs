//! SQLite table backend
//!
//! One `patients` table with a surrogate integer key (preserving insertion
//! order) and a unique `patient_id`. `save` swaps the whole table content
//! inside one transaction, so a reader never sees a half-written store.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{PatientMap, PatientStore};
use crate::config::StorageBackend;
use crate::models::{Gender, PatientFields};
use crate::{Error, Result};

const CREATE_PATIENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS patients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        city TEXT NOT NULL,
        age INTEGER NOT NULL,
        gender TEXT NOT NULL,
        height REAL NOT NULL,
        weight REAL NOT NULL
    )
"#;

type PatientRow = (String, String, String, i64, String, f64, f64);

pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and ensure the schema
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&pool)
            .await?;
        sqlx::query(CREATE_PATIENTS_TABLE).execute(&pool).await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        Ok(Self {
            pool,
            path: db_path.to_path_buf(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_entry(row: PatientRow) -> Result<(String, PatientFields)> {
    let (patient_id, name, city, age, gender, height, weight) = row;
    let age = u32::try_from(age).map_err(|_| {
        Error::Corruption(format!("patient {} has invalid age {}", patient_id, age))
    })?;
    let gender = Gender::parse(&gender).ok_or_else(|| {
        Error::Corruption(format!("patient {} has invalid gender '{}'", patient_id, gender))
    })?;
    Ok((
        patient_id,
        PatientFields {
            name,
            city,
            age,
            gender,
            height,
            weight,
        },
    ))
}

#[async_trait]
impl PatientStore for SqliteStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<PatientMap> {
        let rows: Vec<PatientRow> = sqlx::query_as(
            "SELECT patient_id, name, city, age, gender, height, weight FROM patients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut patients = PatientMap::new();
        for row in rows {
            let (id, fields) = row_to_entry(row)?;
            patients.insert(id, fields);
        }
        debug!("Loaded {} patients from {}", patients.len(), self.path.display());
        Ok(patients)
    }

    async fn save(&self, patients: &PatientMap) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM patients").execute(&mut *tx).await?;
        for (id, fields) in patients.iter() {
            sqlx::query(
                "INSERT INTO patients (patient_id, name, city, age, gender, height, weight)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.city)
            .bind(i64::from(fields.age))
            .bind(fields.gender.as_str())
            .bind(fields.height)
            .bind(fields.weight)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Saved {} patients to {}", patients.len(), self.path.display());
        Ok(())
    }
}
