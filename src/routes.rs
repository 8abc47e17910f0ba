use crate::{
    api::{
        account, attendance, branch, cash_advance, leave_request, pay_rate, payroll_item,
        payroll_period, schedule, user,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/branches")
                    .service(
                        web::resource("")
                            .route(web::post().to(branch::create_branch))
                            .route(web::get().to(branch::list_branches)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(branch::get_branch))
                            .route(web::put().to(branch::update_branch))
                            .route(web::delete().to(branch::delete_branch)),
                    ),
            )
            .service(
                web::scope("/accounts")
                    .service(
                        web::resource("")
                            .route(web::post().to(account::create_account))
                            .route(web::get().to(account::list_accounts)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(account::get_account))
                            .route(web::put().to(account::update_account))
                            .route(web::delete().to(account::delete_account)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::get().to(user::list_users)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/schedules")
                    .service(
                        web::resource("")
                            .route(web::post().to(schedule::create_schedule))
                            .route(web::get().to(schedule::list_schedules)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(schedule::get_schedule))
                            .route(web::put().to(schedule::update_schedule))
                            .route(web::delete().to(schedule::delete_schedule)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::create_attendance))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::get_attendance))
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    ),
            )
            .service(
                web::scope("/pay-rates")
                    .service(
                        web::resource("")
                            .route(web::post().to(pay_rate::create_pay_rate))
                            .route(web::get().to(pay_rate::list_pay_rates)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(pay_rate::get_pay_rate))
                            .route(web::put().to(pay_rate::update_pay_rate))
                            .route(web::delete().to(pay_rate::delete_pay_rate)),
                    ),
            )
            .service(
                web::scope("/cash-advances")
                    .service(
                        web::resource("")
                            .route(web::post().to(cash_advance::create_cash_advance))
                            .route(web::get().to(cash_advance::list_cash_advances)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(cash_advance::get_cash_advance))
                            .route(web::put().to(cash_advance::update_cash_advance))
                            .route(web::delete().to(cash_advance::delete_cash_advance)),
                    ),
            )
            .service(
                web::scope("/payroll-periods")
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll_period::create_period))
                            .route(web::get().to(payroll_period::list_periods)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll_period::get_period))
                            .route(web::put().to(payroll_period::update_period))
                            .route(web::delete().to(payroll_period::delete_period)),
                    ),
            )
            .service(
                web::scope("/payroll-items")
                    // /payroll-items/generate must come before /{id}
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payroll_item::generate_payroll)),
                    )
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll_item::create_item))
                            .route(web::get().to(payroll_item::list_items)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll_item::get_item))
                            .route(web::put().to(payroll_item::update_item))
                            .route(web::delete().to(payroll_item::delete_item)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
