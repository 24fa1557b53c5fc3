pub mod department;
pub mod employee;
pub mod payroll;
pub mod payslip;
pub mod settings;
