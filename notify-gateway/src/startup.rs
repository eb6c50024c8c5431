use std::io;
use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{App, HttpServer, web};
use notify_core::types::ErrorResponse;
use tracing_actix_web::TracingLogger;

use crate::client::NotificationStreamClient;
use crate::config::GatewayConfig;
use crate::routes::{health_check, stream_notifications};

/// Gateway application server wrapper.
///
/// Manages the HTTP server lifecycle from listener binding to shutdown.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Binds the listener and configures the server from the loaded configuration.
    pub async fn build(config: GatewayConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.application.address())?;
        let port = listener.local_addr()?.port();

        let client =
            NotificationStreamClient::new(config.upstream.base_url, config.http_client)?;
        let server = run(listener, client)?;

        Ok(Self { port, server })
    }

    /// Port the server is bound to. Useful with port 0 in tests.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Runs the server until it is stopped.
    pub async fn run_until_stopped(self) -> Result<(), io::Error> {
        self.server.await
    }
}

/// Creates and configures the HTTP server with all routes and middleware.
pub fn run(listener: TcpListener, client: NotificationStreamClient) -> Result<Server, anyhow::Error> {
    let client = web::Data::new(client);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(client.clone())
            .app_data(query_error_config())
            .service(
                web::scope("/api/client")
                    .service(stream_notifications)
                    .service(health_check),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Rewrites query deserialization failures (e.g. a missing `userId`) into the
/// structured error body instead of actix's plain-text default.
fn query_error_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        let body = ErrorResponse::new(
            StatusCode::BAD_REQUEST.as_u16(),
            "Validation Error",
            err.to_string(),
            req.path(),
        );
        let response = actix_web::HttpResponse::BadRequest().json(body);

        actix_web::error::InternalError::from_response(err, response).into()
    })
}
