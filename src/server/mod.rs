//! HTTP surface: one page plus a small JSON API.

pub mod assets;
pub mod handlers;
pub mod params;

use actix_web::middleware::{Compress, DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};

use crate::config::Args;
use crate::state::AppState;

/// Register every route.  Shared by the server and the integration tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(assets::index))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store")))
                .route("/options", web::get().to(handlers::options))
                .route("/bar", web::get().to(handlers::bar))
                .route("/timeseries", web::get().to(handlers::timeseries))
                .route("/map", web::get().to(handlers::map)),
        );
}

/// Bind and serve until the process is stopped.
///
/// The dataset must already be loaded: a missing input file never gets this
/// far.
pub async fn run(args: &Args, state: AppState) -> std::io::Result<()> {
    let bind_address = args.bind_address();
    log::info!(
        "Serving {} records from {} at http://{bind_address}",
        state.dataset.len(),
        state.source.display()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Compress::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes)
    })
    .workers(args.workers)
    .bind(bind_address)?
    .run()
    .await
}
