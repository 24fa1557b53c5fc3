use actix_web::{HttpResponse, web};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::payroll::PayrollRecord;
use crate::model::payslip::Payslip;
use crate::report::payslip_pdf::{payslip_filename, render_payslip};
use crate::utils::db_utils::page_offset;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreatePayslip {
    #[schema(example = 42)]
    pub payroll_id: u64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayslipQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub payroll_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PayslipListResponse {
    pub data: Vec<Payslip>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

async fn fetch_payslip(pool: &MySqlPool, payslip_id: u64) -> Result<Payslip, ApiError> {
    sqlx::query_as::<_, Payslip>("SELECT * FROM payslips WHERE id = ?")
        .bind(payslip_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Payslip not found"))
}

/// Generate Payslip from a payroll record
#[utoipa::path(
    post,
    path = "/api/v1/payslips",
    request_body = CreatePayslip,
    responses(
        (status = 201, description = "Payslip generated"),
        (status = 404, description = "Payroll record not found"),
        (status = 409, description = "Payslip already exists for this payroll record")
    ),
    tag = "Payslip"
)]
pub async fn create_payslip(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePayslip>,
) -> Result<HttpResponse, ApiError> {
    let payroll = sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll WHERE id = ?")
        .bind(payload.payroll_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll record not found"))?;

    let duplicate = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM payslips WHERE payroll_id = ?",
    )
    .bind(payload.payroll_id)
    .fetch_one(pool.get_ref())
    .await?;
    if duplicate > 0 {
        return Err(ApiError::conflict(
            "Payslip already exists for this payroll record",
        ));
    }

    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"
        INSERT INTO payslips
        (payroll_id, employee_name, cutoff_start, cutoff_end, net_pay, generated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payroll.id)
    .bind(&payroll.employee_name)
    .bind(payroll.cutoff_start)
    .bind(payroll.cutoff_end)
    .bind(payroll.net_pay)
    .bind(now)
    .execute(pool.get_ref())
    .await?;

    info!(id = result.last_insert_id(), payroll_id = payroll.id, "Payslip generated");

    Ok(HttpResponse::Created().json(json!({
        "message": "Payslip generated successfully",
        "id": result.last_insert_id()
    })))
}

/// List Payslips
#[utoipa::path(
    get,
    path = "/api/v1/payslips",
    params(PayslipQuery),
    responses(
        (status = 200, description = "Paginated payslip list", body = PayslipListResponse)
    ),
    tag = "Payslip"
)]
pub async fn list_payslips(
    pool: web::Data<MySqlPool>,
    query: web::Query<PayslipQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<u64> = Vec::new();

    if let Some(payroll_id) = query.payroll_id {
        where_sql.push_str(" AND payroll_id = ?");
        args.push(payroll_id);
    }

    let count_sql = format!("SELECT COUNT(*) FROM payslips{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = count_q.bind(*arg);
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM payslips{} ORDER BY generated_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, Payslip>(&data_sql);
    for arg in args {
        data_q = data_q.bind(arg);
    }
    let payslips = data_q
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(PayslipListResponse {
        data: payslips,
        page,
        per_page,
        total,
    }))
}

/// Get Payslip by ID
#[utoipa::path(
    get,
    path = "/api/v1/payslips/{payslip_id}",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, description = "Payslip found", body = Payslip),
        (status = 404, description = "Payslip not found")
    ),
    tag = "Payslip"
)]
pub async fn get_payslip(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let payslip = fetch_payslip(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payslip))
}

/// Download Payslip PDF
#[utoipa::path(
    get,
    path = "/api/v1/payslips/{payslip_id}/pdf",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 404, description = "Payslip or payroll record not found")
    ),
    tag = "Payslip"
)]
pub async fn download_payslip_pdf(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let payslip = fetch_payslip(pool.get_ref(), path.into_inner()).await?;

    let payroll = sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll WHERE id = ?")
        .bind(payslip.payroll_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Payroll record not found"))?;

    let bytes = render_payslip(&payroll, &payslip)?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(payslip_filename(&payslip))],
        })
        .body(bytes))
}
