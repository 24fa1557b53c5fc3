use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::api::settings::load_overrides;
use crate::error::ApiError;
use crate::model::employee::Employee;
use crate::model::payroll::{PayrollRecord, PayrollStatus};
use crate::payroll::builder::{
    self, BulkError, BulkPayrollRequest, PayrollRequest,
};
use crate::utils::db_utils::page_offset;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    pub status: Option<PayrollStatus>,
    /// Keep records whose cutoff overlaps [cutoff_start, cutoff_end].
    pub cutoff_start: Option<NaiveDate>,
    pub cutoff_end: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollListResponse {
    pub data: Vec<PayrollRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct BulkOutcome {
    #[schema(example = 12)]
    pub created: usize,
    pub errors: Vec<BulkError>,
}

enum FilterValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

const INSERT_SQL: &str = r#"
    INSERT INTO payroll
    (employee_id, employee_name, cutoff_start, cutoff_end, basic_salary,
     worked_hours, overtime_hours, rest_day_ot_hours, regular_ot_hours,
     holiday_pay, night_differential, salary_adjustment, absences,
     late_deductions, sss, philhealth, pagibig, withholding_tax,
     gross_pay, total_deductions, net_pay, status, offset_hours,
     holiday_offset_hours, other_leave_hours, daily_hours,
     special_holiday_hours, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

async fn insert_record(pool: &MySqlPool, record: &PayrollRecord) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(INSERT_SQL)
        .bind(record.employee_id)
        .bind(&record.employee_name)
        .bind(record.cutoff_start)
        .bind(record.cutoff_end)
        .bind(record.basic_salary)
        .bind(record.worked_hours)
        .bind(record.overtime_hours)
        .bind(record.rest_day_ot_hours)
        .bind(record.regular_ot_hours)
        .bind(record.holiday_pay)
        .bind(record.night_differential)
        .bind(record.salary_adjustment)
        .bind(record.absences)
        .bind(record.late_deductions)
        .bind(record.sss)
        .bind(record.philhealth)
        .bind(record.pagibig)
        .bind(record.withholding_tax)
        .bind(record.gross_pay)
        .bind(record.total_deductions)
        .bind(record.net_pay)
        .bind(record.status)
        .bind(record.offset_hours)
        .bind(record.holiday_offset_hours)
        .bind(record.other_leave_hours)
        .bind(record.daily_hours.clone())
        .bind(record.special_holiday_hours.clone())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(pool)
        .await?;
    Ok(result.last_insert_id())
}

async fn fetch_record(pool: &MySqlPool, payroll_id: u64) -> Result<PayrollRecord, ApiError> {
    sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll WHERE id = ?")
        .bind(payroll_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll record not found"))
}

/// Create Payroll Record
#[utoipa::path(
    post,
    path = "/api/v1/payroll",
    request_body = PayrollRequest,
    responses(
        (status = 201, description = "Payroll record created"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll"
)]
pub async fn create_payroll(
    pool: web::Data<MySqlPool>,
    payload: web::Json<PayrollRequest>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = builder::require_employee_id(&payload)?;

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    let overrides = load_overrides(pool.get_ref()).await?;
    let now = Utc::now().naive_utc();
    let record = builder::build_record(&payload, &employee, overrides.as_ref(), now)?;

    let id = insert_record(pool.get_ref(), &record).await?;

    info!(id, employee_id, "Payroll record created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Payroll record created successfully",
        "id": id,
        "net_pay": record.net_pay
    })))
}

/// Create Payroll Records for All Active Employees
#[utoipa::path(
    post,
    path = "/api/v1/payroll/bulk",
    request_body = BulkPayrollRequest,
    responses(
        (status = 201, description = "Batch outcome with per-employee failures", body = BulkOutcome),
        (status = 400, description = "Validation error")
    ),
    tag = "Payroll"
)]
pub async fn create_payroll_bulk(
    pool: web::Data<MySqlPool>,
    payload: web::Json<BulkPayrollRequest>,
) -> Result<HttpResponse, ApiError> {
    let employees =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE status = 'active'")
            .fetch_all(pool.get_ref())
            .await?;

    let overrides = load_overrides(pool.get_ref()).await?;
    let now = Utc::now().naive_utc();
    let (records, mut errors) = builder::build_bulk(&employees, &payload, overrides.as_ref(), now);

    let inserts = records
        .iter()
        .map(|record| insert_record(pool.get_ref(), record));
    let results = join_all(inserts).await;

    let mut created = 0usize;
    for (record, result) in records.iter().zip(results) {
        match result {
            Ok(_) => created += 1,
            Err(e) => {
                error!(error = %e, employee_id = record.employee_id, "Bulk payroll insert failed");
                errors.push(BulkError {
                    employee_id: record.employee_id,
                    employee_name: record.employee_name.clone(),
                    reason: "Database insert failed".to_string(),
                });
            }
        }
    }

    info!(created, failed = errors.len(), "Bulk payroll run finished");

    Ok(HttpResponse::Created().json(BulkOutcome { created, errors }))
}

/// List Payroll Records
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated payroll list", body = PayrollListResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_payroll(
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }
    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }
    // Interval overlap test, not containment.
    if let Some(start) = query.cutoff_start {
        where_sql.push_str(" AND cutoff_end >= ?");
        args.push(FilterValue::Date(start));
    }
    if let Some(end) = query.cutoff_end {
        where_sql.push_str(" AND cutoff_start <= ?");
        args.push(FilterValue::Date(end));
    }

    let count_sql = format!("SELECT COUNT(*) FROM payroll{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM payroll{} ORDER BY cutoff_start DESC, employee_name ASC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, PayrollRecord>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }
    let records = data_q
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(PayrollListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Get Payroll Record by ID
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record found", body = PayrollRecord),
        (status = 404, description = "Payroll record not found")
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let record = fetch_record(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Update Payroll Record (totals always recomputed server-side)
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", Path, description = "Payroll record ID")),
    request_body = PayrollRequest,
    responses(
        (status = 200, description = "Payroll record updated", body = PayrollRecord),
        (status = 404, description = "Payroll record not found"),
        (status = 409, description = "Record is completed and immutable")
    ),
    tag = "Payroll"
)]
pub async fn update_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<PayrollRequest>,
) -> Result<HttpResponse, ApiError> {
    let payroll_id = path.into_inner();

    let existing = fetch_record(pool.get_ref(), payroll_id).await?;
    let overrides = load_overrides(pool.get_ref()).await?;
    let now = Utc::now().naive_utc();
    let merged = builder::merge_update(&existing, &payload, overrides.as_ref(), now)?;

    sqlx::query(
        r#"
        UPDATE payroll SET
            cutoff_start = ?, cutoff_end = ?, basic_salary = ?, worked_hours = ?,
            overtime_hours = ?, rest_day_ot_hours = ?, regular_ot_hours = ?,
            holiday_pay = ?, night_differential = ?, salary_adjustment = ?,
            absences = ?, late_deductions = ?, sss = ?, philhealth = ?,
            pagibig = ?, withholding_tax = ?, gross_pay = ?, total_deductions = ?,
            net_pay = ?, offset_hours = ?, holiday_offset_hours = ?,
            other_leave_hours = ?, daily_hours = ?, special_holiday_hours = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(merged.cutoff_start)
    .bind(merged.cutoff_end)
    .bind(merged.basic_salary)
    .bind(merged.worked_hours)
    .bind(merged.overtime_hours)
    .bind(merged.rest_day_ot_hours)
    .bind(merged.regular_ot_hours)
    .bind(merged.holiday_pay)
    .bind(merged.night_differential)
    .bind(merged.salary_adjustment)
    .bind(merged.absences)
    .bind(merged.late_deductions)
    .bind(merged.sss)
    .bind(merged.philhealth)
    .bind(merged.pagibig)
    .bind(merged.withholding_tax)
    .bind(merged.gross_pay)
    .bind(merged.total_deductions)
    .bind(merged.net_pay)
    .bind(merged.offset_hours)
    .bind(merged.holiday_offset_hours)
    .bind(merged.other_leave_hours)
    .bind(merged.daily_hours.clone())
    .bind(merged.special_holiday_hours.clone())
    .bind(merged.updated_at)
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(merged))
}

/// Process Payroll Record (pending -> processed)
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}/process",
    params(("payroll_id", Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record processed"),
        (status = 404, description = "Payroll record not found"),
        (status = 409, description = "Record is not pending")
    ),
    tag = "Payroll"
)]
pub async fn process_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let payroll_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE payroll SET status = 'processed', updated_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(Utc::now().naive_utc())
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish missing from wrong-state for the caller.
        let existing = fetch_record(pool.get_ref(), payroll_id).await?;
        return Err(ApiError::conflict(format!(
            "Payroll record is {}, only pending records can be processed",
            existing.status
        )));
    }

    info!(payroll_id, "Payroll record processed");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll record processed successfully"
    })))
}

/// Delete Payroll Record
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record deleted"),
        (status = 404, description = "Payroll record not found"),
        (status = 409, description = "Completed records cannot be deleted")
    ),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let payroll_id = path.into_inner();

    let existing = fetch_record(pool.get_ref(), payroll_id).await?;
    if existing.status == PayrollStatus::Completed {
        return Err(ApiError::conflict(
            "Completed payroll records cannot be deleted",
        ));
    }

    sqlx::query("DELETE FROM payroll WHERE id = ?")
        .bind(payroll_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll record deleted successfully"
    })))
}
