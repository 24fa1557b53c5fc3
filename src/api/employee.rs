use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::employee::Employee;
use crate::utils::db_utils::{build_update_sql, execute_update, page_offset};

/// Columns the dynamic update endpoint may touch.
const UPDATABLE_COLUMNS: &[&str] = &[
    "employee_code",
    "name",
    "position",
    "monthly_salary",
    "sss_no",
    "philhealth_no",
    "pagibig_no",
    "department_id",
    "hire_date",
    "status",
];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP001")]
    pub employee_code: Option<String>,
    #[schema(example = "Juan Dela Cruz")]
    pub name: String,
    #[schema(example = "Customer Service Representative")]
    pub position: String,
    #[schema(example = 25000.0)]
    pub monthly_salary: f64,
    #[schema(example = "34-1234567-8")]
    pub sss_no: Option<String>,
    #[schema(example = "12-345678901-2")]
    pub philhealth_no: Option<String>,
    #[schema(example = "1234-5678-9012")]
    pub pagibig_no: Option<String>,
    #[schema(example = 10)]
    pub department_id: u64,
    #[schema(example = "2022-06-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub status: Option<String>,
    /// Search by name or position.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "message": "Employee created successfully", "id": 7
        })),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    if !payload.monthly_salary.is_finite() || payload.monthly_salary <= 0.0 {
        return Err(ApiError::validation("monthly_salary must be positive"));
    }

    let department_exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM departments WHERE id = ?",
    )
    .bind(payload.department_id)
    .fetch_one(pool.get_ref())
    .await?;
    if department_exists == 0 {
        return Err(ApiError::not_found("Department not found"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_code, name, position, monthly_salary, sss_no, philhealth_no, pagibig_no, department_id, hire_date, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'active')
        "#,
    )
    .bind(&payload.employee_code)
    .bind(&payload.name)
    .bind(&payload.position)
    .bind(payload.monthly_salary)
    .bind(&payload.sss_no)
    .bind(&payload.philhealth_no)
    .bind(&payload.pagibig_no)
    .bind(payload.department_id)
    .bind(payload.hire_date)
    .execute(pool.get_ref())
    .await?;

    info!(id = result.last_insert_id(), "Employee created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Employee created successfully",
        "id": result.last_insert_id()
    })))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    // ---------- build WHERE clause dynamically ----------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(department_id) = query.department_id {
        where_sql.push_str(" AND department_id = ?");
        args.push(FilterValue::U64(department_id));
    }
    if let Some(status) = &query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.clone()));
    }
    if let Some(search) = &query.search {
        where_sql.push_str(" AND (name LIKE ? OR position LIKE ?)");
        let like = format!("%{}%", search);
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like));
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM employees{} ORDER BY name ASC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }
    let employees = data_q
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Err(ApiError::not_found("Employee not found")),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated successfully"),
        (status = 400, description = "Unknown or empty update fields"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, UPDATABLE_COLUMNS, "id", employee_id)?;
    let affected = execute_update(pool.get_ref(), update).await?;

    if affected == 0 {
        return Err(ApiError::not_found("Employee not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Delete Employee (cascades to payroll records)
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and payroll records deleted"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    // The cascade is atomic: either the employee and all of its payroll
    // records go, or nothing does.
    let mut tx = pool.begin().await?;

    let payroll_deleted = sqlx::query("DELETE FROM payroll WHERE employee_id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(ApiError::not_found("Employee not found"));
    }

    tx.commit().await?;

    info!(employee_id, payroll_deleted, "Employee deleted with payroll cascade");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
        "payroll_records_deleted": payroll_deleted
    })))
}

/// Fetch every employee as an id -> employee map (report reference data).
pub async fn employee_map(
    pool: &MySqlPool,
) -> Result<std::collections::HashMap<u64, Employee>, ApiError> {
    let employees = sqlx::query_as::<_, Employee>("SELECT * FROM employees")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ApiError::from(e)
        })?;
    Ok(employees.into_iter().map(|e| (e.id, e)).collect())
}
