use actix_web::{HttpResponse, web};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::api::department::department_map;
use crate::api::employee::employee_map;
use crate::error::ApiError;
use crate::model::payroll::PayrollRecord;
use crate::payroll::tables::DEFAULT_TABLES;
use crate::report::aggregator::{DateRange, build_report};
use crate::report::workbook::{workbook_filename, write_workbook};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    /// Both bounds together narrow the report to overlapping cutoffs.
    #[param(example = "2024-01-01")]
    pub cutoff_start: Option<NaiveDate>,
    #[param(example = "2024-01-31")]
    pub cutoff_end: Option<NaiveDate>,
}

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Download Timekeeping Workbook
#[utoipa::path(
    get,
    path = "/api/v1/reports/timekeeping",
    params(ReportQuery),
    responses(
        (status = 200, description = "Multi-sheet XLSX workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Invalid date range"),
        (status = 500, description = "Workbook generation failed")
    ),
    tag = "Report"
)]
pub async fn timekeeping_report(
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = match (query.cutoff_start, query.cutoff_end) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(ApiError::validation(
                    "cutoff_start cannot be after cutoff_end",
                ));
            }
            Some(DateRange { start, end })
        }
        (None, None) => None,
        _ => {
            return Err(ApiError::validation(
                "cutoff_start and cutoff_end must be supplied together",
            ));
        }
    };

    let records = sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll")
        .fetch_all(pool.get_ref())
        .await?;
    let employees = employee_map(pool.get_ref()).await?;
    let departments = department_map(pool.get_ref()).await?;

    let report = build_report(&records, &employees, &departments, filter)?;

    let bytes = write_workbook(&report, &DEFAULT_TABLES).map_err(|e| {
        error!(error = %e, "Workbook generation failed");
        ApiError::internal("Workbook generation failed")
    })?;

    let filename = workbook_filename(&report.range);
    info!(%filename, records = records.len(), "Timekeeping workbook generated");

    Ok(HttpResponse::Ok()
        .content_type(XLSX_MIME)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes))
}
