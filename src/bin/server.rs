use std::{env, net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bankdesk::{
    ApiClient, AppState, DEMO_ADMIN_EMAIL, DEMO_PASSWORD, DEMO_USER_EMAIL, FakeBackend, Gateways,
    PaginationConfig, build_router, graceful_shutdown, logging_middleware,
};

/// The web app for managing bank accounts and reviewing fund and transfer requests.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the banking REST API, e.g. "https://bank.example.com/api".
    #[arg(long, env = "BANKDESK_API_URL", required_unless_present = "demo")]
    api_url: Option<String>,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical timezone name used to display dates, e.g. "Asia/Kolkata".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How many rows a table shows when the page does not ask for a size.
    #[arg(long, default_value_t = 20)]
    page_size: u64,

    /// Give up on backend requests that take longer than this many seconds.
    #[arg(long, default_value_t = 10)]
    request_timeout_secs: u64,

    /// Serve from an in-memory backend seeded with demo data instead of the REST API.
    #[arg(long)]
    demo: bool,

    /// Log every request and response body, with passwords redacted.
    #[arg(long)]
    log_bodies: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        return ExitCode::FAILURE;
    };

    let gateways = match build_gateways(&args) {
        Ok(gateways) => gateways,
        Err(error) => {
            tracing::error!("Could not set up the backend client: {error}");
            return ExitCode::FAILURE;
        }
    };

    let pagination_config = PaginationConfig {
        default_page_size: args.page_size,
        ..Default::default()
    };
    let state = AppState::new(&secret, &args.timezone, pagination_config, gateways);

    let mut router = add_tracing_layer(build_router(state));

    if args.log_bodies {
        router = router.layer(middleware::from_fn(logging_middleware));
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("The server stopped unexpectedly: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn build_gateways(args: &Args) -> Result<Gateways, bankdesk::Error> {
    if args.demo {
        tracing::info!(
            "Serving demo data, log in as {DEMO_USER_EMAIL} or {DEMO_ADMIN_EMAIL} \
            with the password {DEMO_PASSWORD}"
        );

        return Ok(Gateways::fake(Arc::new(FakeBackend::with_demo_data())));
    }

    let api_url = args.api_url.as_deref().unwrap_or_default();
    let client = ApiClient::new(api_url, Duration::from_secs(args.request_timeout_secs))?;

    Ok(Gateways::http(client))
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
