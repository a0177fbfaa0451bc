//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_cors::Cors;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderName};
use actix_web::{App, HttpServer, web};

use nl2sql::Trace;
#[cfg(debug_assertions)]
use nl2sql::doc::ApiDoc;
use nl2sql::inbound::http::health::{HealthState, live, ready, status, welcome};
use nl2sql::inbound::http::json_error_handler;
use nl2sql::inbound::http::metrics::{clear_metrics, get_metrics};
use nl2sql::inbound::http::query::generate_sql;
use nl2sql::inbound::http::schema::{
    delete_schema, get_schema, get_schema_stats, list_tables, set_schema, update_schema,
};
use nl2sql::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// CORS policy for browser clients: any origin, with credentials.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .supports_credentials()
        .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(Trace)
        .service(welcome)
        .service(status)
        .service(ready)
        .service(live)
        .service(set_schema)
        .service(update_schema)
        .service(get_schema)
        .service(delete_schema)
        .service(list_tables)
        .service(get_schema_stats)
        .service(generate_sql)
        .service(get_metrics)
        .service(clear_metrics);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The stored schema is loaded before the listener starts, so the first
/// request already sees it.
///
/// # Errors
/// Propagates [`std::io::Error`] when building adapters, binding the socket
/// or starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config).await?;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
        .wrap(cors())
    })
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok(server)
}
