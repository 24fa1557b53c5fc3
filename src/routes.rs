use crate::{
    api::{department, employee, payroll, payslip, report, settings},
    config::Config,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/departments")
                    .service(
                        web::resource("")
                            .route(web::post().to(department::create_department))
                            .route(web::get().to(department::list_departments)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(department::get_department))
                            .route(web::put().to(department::update_department))
                            .route(web::delete().to(department::delete_department)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll::create_payroll))
                            .route(web::get().to(payroll::list_payroll)),
                    )
                    // /payroll/bulk
                    .service(
                        web::resource("/bulk")
                            .route(web::post().to(payroll::create_payroll_bulk)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::put().to(payroll::update_payroll))
                            .route(web::delete().to(payroll::delete_payroll)),
                    )
                    // /payroll/{id}/process
                    .service(
                        web::resource("/{id}/process")
                            .route(web::put().to(payroll::process_payroll)),
                    ),
            )
            .service(
                web::scope("/payslips")
                    .service(
                        web::resource("")
                            .route(web::post().to(payslip::create_payslip))
                            .route(web::get().to(payslip::list_payslips)),
                    )
                    .service(
                        web::resource("/{id}").route(web::get().to(payslip::get_payslip)),
                    )
                    // /payslips/{id}/pdf
                    .service(
                        web::resource("/{id}/pdf")
                            .route(web::get().to(payslip::download_payslip_pdf)),
                    ),
            )
            .service(
                web::scope("/settings").service(
                    web::resource("")
                        .route(web::get().to(settings::get_settings))
                        .route(web::put().to(settings::update_settings)),
                ),
            )
            .service(
                web::scope("/reports").service(
                    web::resource("/timekeeping")
                        .route(web::get().to(report::timekeeping_report)),
                ),
            ),
    );
}
