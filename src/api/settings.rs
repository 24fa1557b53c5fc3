use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::settings::{ContributionOverrides, Settings};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct UpdateSettings {
    pub sss_rate: Option<f64>,
    #[schema(example = 2.5)]
    pub philhealth_rate: Option<f64>,
    pub pagibig_rate: Option<f64>,
    pub tax_rate: Option<f64>,
    #[schema(example = 1.25)]
    pub overtime_multiplier: Option<f64>,
    pub night_diff_rate: Option<f64>,
    pub holiday_rate: Option<f64>,
    #[schema(example = 160.0)]
    pub standard_hours: Option<f64>,
    pub working_days: Option<f64>,
}

/// Get Settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Current settings row", body = Settings)
    ),
    tag = "Settings"
)]
pub async fn get_settings(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let settings = sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE id = 1")
        .fetch_optional(pool.get_ref())
        .await?
        .unwrap_or(Settings {
            id: 1,
            ..Settings::default()
        });

    Ok(HttpResponse::Ok().json(settings))
}

/// Update Settings (upsert of the single row)
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Settings saved"),
        (status = 400, description = "Validation error")
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateSettings>,
) -> Result<HttpResponse, ApiError> {
    for (name, value) in [
        ("sss_rate", payload.sss_rate),
        ("philhealth_rate", payload.philhealth_rate),
        ("pagibig_rate", payload.pagibig_rate),
        ("tax_rate", payload.tax_rate),
        ("overtime_multiplier", payload.overtime_multiplier),
        ("night_diff_rate", payload.night_diff_rate),
        ("holiday_rate", payload.holiday_rate),
        ("standard_hours", payload.standard_hours),
        ("working_days", payload.working_days),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(ApiError::validation(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
    }

    sqlx::query(
        r#"
        INSERT INTO settings
        (id, sss_rate, philhealth_rate, pagibig_rate, tax_rate, overtime_multiplier,
         night_diff_rate, holiday_rate, standard_hours, working_days)
        VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            sss_rate = VALUES(sss_rate),
            philhealth_rate = VALUES(philhealth_rate),
            pagibig_rate = VALUES(pagibig_rate),
            tax_rate = VALUES(tax_rate),
            overtime_multiplier = VALUES(overtime_multiplier),
            night_diff_rate = VALUES(night_diff_rate),
            holiday_rate = VALUES(holiday_rate),
            standard_hours = VALUES(standard_hours),
            working_days = VALUES(working_days)
        "#,
    )
    .bind(payload.sss_rate)
    .bind(payload.philhealth_rate)
    .bind(payload.pagibig_rate)
    .bind(payload.tax_rate)
    .bind(payload.overtime_multiplier)
    .bind(payload.night_diff_rate)
    .bind(payload.holiday_rate)
    .bind(payload.standard_hours)
    .bind(payload.working_days)
    .execute(pool.get_ref())
    .await?;

    info!("Settings saved");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Settings saved successfully"
    })))
}

/// Load the override rates used by payroll computation. `None` when the
/// settings row does not exist yet.
pub async fn load_overrides(
    pool: &MySqlPool,
) -> Result<Option<ContributionOverrides>, ApiError> {
    let settings = sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(settings.as_ref().map(ContributionOverrides::from))
}
