use crate::{
    api::{attendance, schedule, summary},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;

type Quota = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route rate limit quotas, validated once at startup.
#[derive(Clone)]
pub struct RateLimits {
    login: Quota,
    register: Quota,
    refresh: Quota,
    protected: Quota,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            login: quota(config.rate_login_per_min)?,
            register: quota(config.rate_register_per_min)?,
            refresh: quota(config.rate_refresh_per_min)?,
            protected: quota(config.rate_protected_per_min)?,
        })
    }
}

fn quota(requests_per_min: u32) -> anyhow::Result<Quota> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(burst)).max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {requests_per_min} requests per minute"))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&limits.login))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&limits.register))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&limits.refresh))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&limits.login))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&limits.protected))
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::get_attendances))
                            .route(web::post().to(attendance::upsert_attendance)),
                    )
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::put().to(attendance::clock_out)),
                    )
                    .service(
                        web::resource("/holiday").route(web::post().to(attendance::apply_holiday)),
                    )
                    .service(
                        web::resource("/monthly")
                            .route(web::get().to(summary::get_monthly_attendance)),
                    )
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(summary::get_payroll_period_summary)),
                    )
                    .service(
                        web::resource("/summary/me")
                            .route(web::get().to(summary::get_my_payroll_period_summary)),
                    )
                    .service(
                        web::resource("/report")
                            .route(web::get().to(summary::get_admin_monthly_report)),
                    )
                    // /attendance/{id}, after the named paths
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/schedules")
                    .service(
                        web::resource("/work")
                            .route(web::get().to(schedule::list_work_schedules))
                            .route(web::put().to(schedule::update_work_schedule)),
                    )
                    .service(
                        web::resource("/custom")
                            .route(web::get().to(schedule::list_custom_schedules))
                            .route(web::post().to(schedule::create_custom_schedule)),
                    )
                    .service(
                        web::resource("/custom/{id}")
                            .route(web::delete().to(schedule::delete_custom_schedule)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token
//  └─ refresh_token

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new token pair

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_accepts_zero_as_one_per_minute() {
        assert!(quota(0).is_ok());
        assert!(quota(10).is_ok());
        assert!(quota(120_000).is_ok());
    }
}
