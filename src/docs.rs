use crate::api::department::{CreateDepartment, DepartmentListResponse};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::payroll::{BulkOutcome, PayrollListResponse};
use crate::api::payslip::{CreatePayslip, PayslipListResponse};
use crate::api::settings::UpdateSettings;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::payroll::{PayrollRecord, PayrollStatus};
use crate::model::payslip::Payslip;
use crate::model::settings::Settings;
use crate::payroll::builder::{BulkError, BulkPayrollRequest, PayrollRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BPO Payroll API",
        version = "1.0.0",
        description = r#"
## BPO Payroll Back Office

This API powers the payroll back office of a **BPO (Business Process Outsourcing)** operation.

### 🔹 Key Features
- **Employee & Department Management**
  - Maintain the roster and the site/department structure
- **Payroll Computation**
  - Philippine statutory contributions (SSS, PhilHealth, Pag-IBIG) and withholding tax
  - Single-record and bulk (all active employees) payroll runs
- **Payslips**
  - Generate payslips and download them as PDF
- **Timekeeping Reports**
  - Multi-sheet XLSX workbook aggregating payroll per cutoff

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::payroll::create_payroll,
        crate::api::payroll::create_payroll_bulk,
        crate::api::payroll::list_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::process_payroll,
        crate::api::payroll::delete_payroll,

        crate::api::payslip::create_payslip,
        crate::api::payslip::list_payslips,
        crate::api::payslip::get_payslip,
        crate::api::payslip::download_payslip_pdf,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,

        crate::api::report::timekeeping_report
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            EmployeeListResponse,
            Department,
            CreateDepartment,
            DepartmentListResponse,
            PayrollRecord,
            PayrollStatus,
            PayrollRequest,
            BulkPayrollRequest,
            BulkError,
            BulkOutcome,
            PayrollListResponse,
            Payslip,
            CreatePayslip,
            PayslipListResponse,
            Settings,
            UpdateSettings
        )
    ),
    tags(
        (name = "Employee", description = "Employee roster APIs"),
        (name = "Department", description = "Department and site APIs"),
        (name = "Payroll", description = "Payroll computation APIs"),
        (name = "Payslip", description = "Payslip generation APIs"),
        (name = "Settings", description = "Contribution override settings APIs"),
        (name = "Report", description = "Timekeeping report APIs"),
    )
)]
pub struct ApiDoc;
