use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationRepository, InMemoryMemberRepository, InMemoryPositionCatalog,
};
use crate::routes::with_recruitment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use utn_recruitment::config::AppConfig;
use utn_recruitment::error::AppError;
use utn_recruitment::recruitment::{ApplicationService, MembershipService};
use utn_recruitment::telemetry;
use utn_recruitment::unicore::UnicoreClient;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = match args.catalog.take() {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let catalog = InMemoryPositionCatalog::from_json(&raw)?;
            info!(path = %path.display(), positions = catalog.len(), "position catalog loaded");
            catalog
        }
        None => {
            warn!("no position catalog given, applications will be refused");
            InMemoryPositionCatalog::default()
        }
    };

    let gateway = Arc::new(UnicoreClient::new(&config.unicore)?);
    let members = Arc::new(InMemoryMemberRepository::default());
    let membership_service = Arc::new(MembershipService::new(
        members.clone(),
        gateway.clone(),
        config.unicore.bulk_parallelism,
    ));
    let application_service = Arc::new(ApplicationService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        members,
        Arc::new(catalog),
        gateway,
    ));

    let app = with_recruitment_routes(membership_service, application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        unicore = %config.unicore.base_url,
        timeout_secs = config.unicore.timeout.as_secs(),
        "recruitment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
