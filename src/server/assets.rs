use actix_web::HttpResponse;
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "assets/"]
struct DashboardAssets;

/// Serve the single dashboard page.
pub async fn index() -> HttpResponse {
    match DashboardAssets::get("index.html") {
        Some(content) => {
            let html = String::from_utf8_lossy(&content.data)
                .replace("%DASHBOARD_VERSION%", env!("CARGO_PKG_VERSION"));
            HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(html)
        }
        None => {
            log::error!("index.html missing from embedded assets");
            HttpResponse::NotFound().body("dashboard page not found")
        }
    }
}
