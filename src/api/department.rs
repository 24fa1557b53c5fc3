use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::department::Department;
use crate::utils::db_utils::{build_update_sql, execute_update, page_offset};

const UPDATABLE_COLUMNS: &[&str] = &["name", "code", "site", "manager", "status"];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Customer Care")]
    pub name: String,
    #[schema(example = "CC")]
    pub code: String,
    #[schema(example = "Manila Site 1")]
    pub site: String,
    #[schema(example = "Maria Santos")]
    pub manager: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DepartmentQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    pub site: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DepartmentListResponse {
    pub data: Vec<Department>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Create Department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate department code")
    ),
    tag = "Department"
)]
pub async fn create_department(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> Result<HttpResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    if payload.code.trim().is_empty() {
        return Err(ApiError::validation("code is required"));
    }

    // Codes are stored uppercase and must be unique among active departments.
    let code = payload.code.trim().to_uppercase();

    let duplicate = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM departments WHERE code = ? AND status = 'active'",
    )
    .bind(&code)
    .fetch_one(pool.get_ref())
    .await?;
    if duplicate > 0 {
        return Err(ApiError::conflict(format!(
            "Department code {} already exists",
            code
        )));
    }

    let result = sqlx::query(
        "INSERT INTO departments (name, code, site, manager, status) VALUES (?, ?, ?, ?, 'active')",
    )
    .bind(&payload.name)
    .bind(&code)
    .bind(&payload.site)
    .bind(&payload.manager)
    .execute(pool.get_ref())
    .await?;

    info!(id = result.last_insert_id(), code = %code, "Department created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Department created successfully",
        "id": result.last_insert_id()
    })))
}

/// List Departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    params(DepartmentQuery),
    responses(
        (status = 200, description = "Paginated department list", body = DepartmentListResponse)
    ),
    tag = "Department"
)]
pub async fn list_departments(
    pool: web::Data<MySqlPool>,
    query: web::Query<DepartmentQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<String> = Vec::new();

    if let Some(status) = &query.status {
        where_sql.push_str(" AND status = ?");
        args.push(status.clone());
    }
    if let Some(site) = &query.site {
        where_sql.push_str(" AND site = ?");
        args.push(site.clone());
    }

    let count_sql = format!("SELECT COUNT(*) FROM departments{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = count_q.bind(arg.clone());
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM departments{} ORDER BY name ASC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, Department>(&data_sql);
    for arg in args {
        data_q = data_q.bind(arg);
    }
    let departments = data_q
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(DepartmentListResponse {
        data: departments,
        page,
        per_page,
        total,
    }))
}

/// Get Department by ID
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn get_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let department_id = path.into_inner();

    let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?")
        .bind(department_id)
        .fetch_optional(pool.get_ref())
        .await?;

    match department {
        Some(dept) => Ok(HttpResponse::Ok().json(dept)),
        None => Err(ApiError::not_found("Department not found")),
    }
}

/// Update Department
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Department updated successfully"),
        (status = 400, description = "Unknown or empty update fields"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Duplicate department code")
    ),
    tag = "Department"
)]
pub async fn update_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    let department_id = path.into_inner();
    let mut payload = body.into_inner();

    // Uppercase the code and re-check uniqueness when it changes.
    if let Some(code_value) = payload.get_mut("code") {
        let code = code_value
            .as_str()
            .ok_or_else(|| ApiError::validation("code must be a string"))?
            .trim()
            .to_uppercase();

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM departments WHERE code = ? AND status = 'active' AND id != ?",
        )
        .bind(&code)
        .bind(department_id)
        .fetch_one(pool.get_ref())
        .await?;
        if duplicate > 0 {
            return Err(ApiError::conflict(format!(
                "Department code {} already exists",
                code
            )));
        }

        *code_value = serde_json::Value::String(code);
    }

    let update = build_update_sql(
        "departments",
        &payload,
        UPDATABLE_COLUMNS,
        "id",
        department_id,
    )?;
    let affected = execute_update(pool.get_ref(), update).await?;

    if affected == 0 {
        return Err(ApiError::not_found("Department not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department updated successfully"
    })))
}

/// Delete Department (marks inactive; employees keep their history)
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deactivated"),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn delete_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let department_id = path.into_inner();

    let result = sqlx::query("UPDATE departments SET status = 'inactive' WHERE id = ?")
        .bind(department_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Department not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deactivated successfully"
    })))
}

/// Fetch every department as an id -> department map (report reference data).
pub async fn department_map(
    pool: &MySqlPool,
) -> Result<std::collections::HashMap<u64, Department>, ApiError> {
    let departments = sqlx::query_as::<_, Department>("SELECT * FROM departments")
        .fetch_all(pool)
        .await?;
    Ok(departments.into_iter().map(|d| (d.id, d)).collect())
}
