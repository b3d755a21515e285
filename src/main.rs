#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use crate::{
    config::RuntimeConfiguration,
    routes::{
        api, index::get_index_route, student_form, student_in_detail, students,
    },
    state::RegistrarState,
};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use std::env;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod bootstrap;
mod config;
mod data;
mod error;
mod maud_conveniences;
mod query;
mod routes;
mod state;
mod validation;

async fn shutdown_signal(state: RegistrarState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    state.sensible_shutdown().await;
    warn!("signal received, starting graceful shutdown");
}

fn router(state: RegistrarState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route(
            "/new",
            get(student_form::get_new_student_form).post(student_form::post_new_student),
        )
        .route("/student/{id}", get(student_in_detail::get_student))
        .route(
            "/student/{id}/edit",
            get(student_form::get_edit_student_form).post(student_form::post_edit_student_form),
        )
        .route(
            "/internal/students",
            get(students::internal_get_students).delete(students::internal_delete_student),
        )
        .route("/health", get(api::get_health))
        .route(
            "/students",
            get(api::get_students).post(api::post_student),
        )
        .route(
            "/students/{id}",
            get(api::get_student)
                .put(api::put_student)
                .delete(api::delete_student),
        )
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().expect("unable to load env vars");

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let options = PgPoolOptions::new().max_connections(15);
    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = RegistrarState::new(options, &config)
        .await
        .expect("unable to create state");

    let app = router(state.clone());

    let server_ip =
        env::var("REGISTRAR_SERVER_IP").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
