use actix_web::web;

mod auth;
mod health;
mod streams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth.AuthService")
            .route("/Login", web::post().to(auth::login))
            .route("/GetProfile", web::post().to(auth::get_profile))
            .route(
                "/StreamNotifications",
                web::get().to(streams::notifications),
            )
            .route("/SendMessages", web::post().to(streams::send_messages))
            .route("/ChatStream", web::post().to(streams::chat_stream)),
    )
    .route("/health", web::get().to(health::health));
}
