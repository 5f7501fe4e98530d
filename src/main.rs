use std::{net::SocketAddr, sync::Arc};

use log::*;

use nalabox_api::{
    config::Config,
    routes::{router, AppState},
    services::{
        database::{StoreService, SupabaseService},
        geocoding::{GeocodingService, GoogleMapsService},
    },
    GenericError,
};

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("nalabox_api", log::LevelFilter::Trace)
        .init();
    trace!("Logger init with level TRACE.");

    let config = Config::load()?;

    let store: SupabaseService = StoreService::new(&config)?;
    let mut state = AppState::new(Arc::new(store));
    if config.google_maps_token.is_some() {
        let geocoder: GoogleMapsService = GeocodingService::new(&config)?;
        state = state.with_geocoder(Arc::new(geocoder));
        info!("Address geocoding enabled.");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    info!("Supabase endpoint: {}", config.rest_endpoint());

    axum::serve(listener, router(state)).await?;
    Ok(())
}
