//! Persistence for the application aggregate and its timeline log.

use chrono::{Datelike, Duration, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::intake;
use crate::models::{ApplicationRow, TimelineRow};

/// Data access for applications. Wraps the pool handed in by the service
/// boundary; nothing here reads process-wide state.
pub struct ApplicationStore {
    pool: PgPool,
}

/// Maps an updatable request key (snake_case or camelCase) to its column.
/// Keys outside the allow-list map to None and are silently ignored.
pub fn updatable_column(key: &str) -> Option<&'static str> {
    match key {
        "stage" => Some("stage"),
        "risk" => Some("risk"),
        "progress" => Some("progress"),
        "checks" => Some("checks"),
        "connected_persons" | "connectedPersons" => Some("connected_persons"),
        "ofsted_check" | "ofstedCheck" => Some("ofsted_check"),
        "registration_date" | "registrationDate" => Some("registration_date"),
        "registration_number" | "registrationNumber" => Some("registration_number"),
        _ => None,
    }
}

/// Columns whose update values arrive as JSON structures and are stored
/// encoded.
fn is_json_column(col: &str) -> bool {
    matches!(col, "checks" | "connected_persons" | "ofsted_check")
}

fn opt_str(obj: Option<&Value>, key: &str) -> Option<String> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Encodes an opaque sub-structure for storage. Absent or null stays NULL.
fn json_or_none(v: Option<&Value>) -> Option<String> {
    v.filter(|v| !v.is_null()).map(Value::to_string)
}

impl ApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Next value of the application id sequence. Atomic and monotonic even
    /// under concurrent creations; never repeats.
    pub async fn next_sequence_value(&self) -> Result<i64, AppError> {
        let val: i64 = sqlx::query_scalar("SELECT nextval('application_id_seq')")
            .fetch_one(&self.pool)
            .await?;
        Ok(val)
    }

    /// Creates the aggregate from a raw form payload in one transaction:
    /// sequence fetch, derived sub-structures, the row insert, and the two
    /// bootstrap timeline entries (one second apart so a timestamp-ordered
    /// read keeps them in order at second granularity).
    pub async fn create(&self, form: &Value) -> Result<String, AppError> {
        let mut tx = self.pool.begin().await?;

        let seq_val: i64 = sqlx::query_scalar("SELECT nextval('application_id_seq')")
            .fetch_one(&mut *tx)
            .await?;

        let now = Utc::now();
        let app_id = intake::generate_id(seq_val, now.year());

        let checks = intake::build_checks(form, now.date_naive());
        let connected_persons = intake::build_connected_persons(form);
        let progress = intake::calculate_progress(Some(&checks));
        let premises_address = intake::build_premises_address(form);
        let registers = intake::build_registers(form);
        let premises_details = intake::build_premises_details(form);

        let personal = form.get("personal");
        let premises = form.get("premises");

        let first_name = opt_str(personal, "firstName");
        let last_name = opt_str(personal, "lastName");
        let name = match (&first_name, &last_name) {
            (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
            _ => None,
        };

        let premises_type = opt_str(premises, "type")
            .unwrap_or_else(|| "domestic".to_string())
            .to_lowercase();

        let created_at = now.naive_utc();

        sqlx::query(
            r#"INSERT INTO applications (
                id, title, first_name, middle_names, last_name, name,
                email, phone, dob, gender, right_to_work, ni_number,
                home_address, premises_type, premises_address,
                premises_details, local_authority,
                registers, service, stage, risk, progress,
                checks, connected_persons,
                previous_names, address_history, qualifications,
                employment_history, references_data,
                household, suitability, declaration,
                start_date, last_updated, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10, $11, $12,
                $13, $14, $15,
                $16, $17,
                $18, $19, 'new', 'low', $20,
                $21, $22,
                $23, $24, $25,
                $26, $27,
                $28, $29, $30,
                $31, $31, $31
            )"#,
        )
        .bind(&app_id)
        .bind(opt_str(personal, "title"))
        .bind(&first_name)
        .bind(opt_str(personal, "middleNames"))
        .bind(&last_name)
        .bind(&name)
        .bind(opt_str(personal, "email"))
        .bind(opt_str(personal, "phone"))
        .bind(opt_str(personal, "dob"))
        .bind(opt_str(personal, "gender"))
        .bind(opt_str(personal, "rightToWork"))
        .bind(opt_str(personal, "niNumber"))
        .bind(form.get("homeAddress").unwrap_or(&json!({})).to_string())
        .bind(&premises_type)
        .bind(&premises_address)
        .bind(premises_details.to_string())
        .bind(opt_str(premises, "localAuthority"))
        .bind(registers.to_string())
        .bind(json_or_none(form.get("service")))
        .bind(progress)
        .bind(checks.to_string())
        .bind(connected_persons.to_string())
        .bind(json_or_none(form.get("previousNames")))
        .bind(json_or_none(form.get("addressHistory")))
        .bind(json_or_none(form.get("qualifications")))
        .bind(json_or_none(form.get("employment")))
        .bind(json_or_none(form.get("references")))
        .bind(json_or_none(form.get("household")))
        .bind(json_or_none(form.get("suitability")))
        .bind(json_or_none(form.get("declaration")))
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO timeline_events (application_id, event, type, created_at)
             VALUES ($1, 'Application started', 'action', $2)",
        )
        .bind(&app_id)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO timeline_events (application_id, event, type, created_at)
             VALUES ($1, 'Application form submitted', 'complete', $2)",
        )
        .bind(&app_id)
        .bind(created_at + Duration::seconds(1))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Created application {}", app_id);
        Ok(app_id)
    }

    /// All applications, newest-created-first.
    pub async fn fetch_all(&self) -> Result<Vec<ApplicationRow>, AppError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn fetch(&self, app_id: &str) -> Result<Option<ApplicationRow>, AppError> {
        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(app_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Timeline entries for one application, oldest first.
    pub async fn fetch_timeline(&self, app_id: &str) -> Result<Vec<TimelineRow>, AppError> {
        let rows = sqlx::query_as::<_, TimelineRow>(
            "SELECT id, application_id, event, type, created_at
             FROM timeline_events
             WHERE application_id = $1
             ORDER BY created_at ASC",
        )
        .bind(app_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Narrow field-level update. Only allow-listed keys are written; unknown
    /// keys are ignored. Always bumps `last_updated`. Returns the affected
    /// row count (0 when the id does not exist, or when no valid field was
    /// supplied - the latter short-circuits without touching the store).
    pub async fn update_fields(
        &self,
        app_id: &str,
        updates: &serde_json::Map<String, Value>,
    ) -> Result<u64, AppError> {
        let fields: Vec<(&'static str, &Value)> = updates
            .iter()
            .filter_map(|(key, value)| updatable_column(key).map(|col| (col, value)))
            .collect();

        if fields.is_empty() {
            tracing::debug!("Update for {} carried no updatable fields", app_id);
            return Ok(0);
        }

        let mut sets: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{} = ${}", col, i + 1))
            .collect();
        let mut idx = fields.len() + 1;
        sets.push(format!("last_updated = ${}", idx));
        idx += 1;

        let sql = format!(
            "UPDATE applications SET {} WHERE id = ${}",
            sets.join(", "),
            idx
        );

        let mut query = sqlx::query(&sql);
        for (col, value) in &fields {
            query = if is_json_column(col) {
                query.bind(value.to_string())
            } else if *col == "progress" {
                query.bind(value.as_i64().map(|n| n as i32))
            } else {
                query.bind(value.as_str().map(str::to_string))
            };
        }
        query = query.bind(Utc::now().naive_utc()).bind(app_id);

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Deletes the aggregate; timeline entries go with it via the cascade.
    pub async fn delete(&self, app_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(app_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Appends one timeline entry and returns it. A missing application
    /// surfaces as NotFound via the foreign-key violation.
    pub async fn add_timeline_event(
        &self,
        app_id: &str,
        event: &str,
        event_type: &str,
    ) -> Result<TimelineRow, AppError> {
        let row = sqlx::query_as::<_, TimelineRow>(
            "INSERT INTO timeline_events (application_id, event, type)
             VALUES ($1, $2, $3)
             RETURNING id, application_id, event, type, created_at",
        )
        .bind(app_id)
        .bind(event)
        .bind(event_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                AppError::NotFound("Application not found".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;
        Ok(row)
    }
}
