use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 10,
        "name": "Operations",
        "code": "OPS",
        "site": "Clark",
        "manager": "Maria Santos",
        "status": "active"
    })
)]
pub struct Department {
    #[schema(example = 10)]
    pub id: u64,

    #[schema(example = "Operations")]
    pub name: String,

    /// Uppercase, unique among active departments.
    #[schema(example = "OPS")]
    pub code: String,

    /// Site location printed on the special-holiday export sheet.
    #[schema(example = "Clark")]
    pub site: String,

    #[schema(example = "Maria Santos", nullable = true)]
    pub manager: Option<String>,

    #[schema(example = "active")]
    pub status: String,
}
