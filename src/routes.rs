use crate::{
    api::{attendance, user},
    auth::handlers,
    config::Config,
    error::method_not_allowed,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Per-peer-IP limiter allowing `requests_per_min`, with the whole minute as burst.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg: GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(
        web::scope("/auth")
            .wrap(build_limiter(config.rate_login_per_min))
            .configure(auth_routes),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_api_per_min))
            .configure(api_routes),
    );
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/login")
            .route(web::post().to(handlers::login))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/session")
            .route(web::get().to(handlers::session))
            .default_service(web::to(method_not_allowed)),
    );
}

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::get().to(attendance::list_attendance))
                    .route(web::put().to(attendance::clock_out))
                    .default_service(web::to(method_not_allowed)),
            )
            // /attendance/clock-in
            .service(
                web::resource("/clock-in")
                    .route(web::post().to(attendance::clock_in))
                    .default_service(web::to(method_not_allowed)),
            )
            // /attendance/clock-out
            .service(
                web::resource("/clock-out")
                    .route(web::put().to(attendance::clock_out))
                    .default_service(web::to(method_not_allowed)),
            ),
    )
    .service(
        web::scope("/users").service(
            web::resource("")
                .route(web::get().to(user::list_users))
                .route(web::post().to(user::create_user))
                .default_service(web::to(method_not_allowed)),
        ),
    );
}
