use std::io;
use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{App, HttpServer, web};
use notify_core::stream::NotificationStreamBuilder;
use notify_core::types::ErrorResponse;
use tracing_actix_web::TracingLogger;

use crate::config::ProducerConfig;
use crate::routes::{health_check, stream_notifications};

/// Producer application server wrapper.
///
/// Manages the HTTP server lifecycle from listener binding to shutdown.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Binds the listener and configures the server from the loaded configuration.
    pub async fn build(config: ProducerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.application.address())?;
        let port = listener.local_addr()?.port();

        let stream_builder = NotificationStreamBuilder::with_synthetic_sources(config.stream);
        let server = run(listener, stream_builder)?;

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
pub fn run(
    listener: TcpListener,
    stream_builder: NotificationStreamBuilder,
) -> Result<Server, anyhow::Error> {
    let stream_builder = web::Data::new(stream_builder);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(stream_builder.clone())
            .app_data(query_error_config())
            .service(
                web::scope("/api/notifications")
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
