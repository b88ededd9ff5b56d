mod auth;
mod context;
mod docs;
mod errors;
mod logging;
mod playlists;
mod schemas;
mod search;
mod serialized;
mod uploads;

use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};

use axum::routing::get;
use log::info;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use medley_library::{Config, Library};

use context::ServerContext;
pub use logging::init_logger;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 3000;

pub type Router = axum::Router<ServerContext>;

/// Starts the medley server
pub async fn run_server(config: Config) {
    let port = env::var("MEDLEY_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let uploads_dir = config.uploads_dir.clone();
    let library = Library::new(config).await.expect("library is initialized");

    let context = ServerContext {
        library: Arc::new(library),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/playlists", playlists::router())
        .nest("/search", search::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    info!("Listening on port {port}");

    axum::serve(listener, root_router.into_make_service())
        .await
        .unwrap();
}
