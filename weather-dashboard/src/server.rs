//! HTTP routing and the application context shared by handlers.

use anyhow::{Context, Result};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use warp::{Filter, Rejection, Reply, reply::Response};
use weather_core::{Config, FavoritesStore, OpenWeatherProvider, WeatherProvider};

use crate::error::{ApiError, ErrorKind};
use crate::handlers::{self, AddFavoriteForm, WeatherQuery};

/// Everything a handler needs, built once at startup and cloned into each route.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub default_city: String,
    pub provider: Arc<dyn WeatherProvider>,
    pub favorites: Arc<FavoritesStore>,
}

impl AppContext {
    pub fn new(
        default_city: impl Into<String>,
        provider: Arc<dyn WeatherProvider>,
        favorites: FavoritesStore,
    ) -> Self {
        Self {
            default_city: default_city.into(),
            provider,
            favorites: Arc::new(favorites),
        }
    }

    /// Open the favorites database and build the OpenWeather client from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let favorites = FavoritesStore::open(&config.database_path).with_context(|| {
            format!("Failed to open favorites database: {}", config.database_path.display())
        })?;
        tracing::info!(path = %config.database_path.display(), "favorites database ready");

        let api_key = match config.api_key() {
            Some(key) => key.to_string(),
            None => {
                tracing::warn!(
                    "No OpenWeather API key configured; every weather lookup will be rejected. \
                     Set {} or run `weather-dashboard configure`.",
                    weather_core::config::API_KEY_ENV
                );
                String::new()
            }
        };
        let provider = OpenWeatherProvider::with_base_url(api_key, config.openweather_base_url.clone());

        Ok(Self::new(config.default_city.clone(), Arc::new(provider), favorites))
    }
}

fn with_ctx(ctx: AppContext) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

/// All dashboard routes, with rejections turned into plain responses.
pub fn routes(ctx: AppContext) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::index);

    let weather = warp::path!("weather")
        .and(warp::get())
        .and(warp::query::<WeatherQuery>())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::weather);

    let add_favorite = warp::path!("favorites" / "add")
        .and(warp::post())
        .and(warp::body::form::<AddFavoriteForm>())
        .and(with_ctx(ctx.clone()))
        .and_then(handlers::add_favorite);

    let remove_favorite = warp::path!("favorites" / "remove" / i64)
        .and(warp::post())
        .and(with_ctx(ctx))
        .and_then(handlers::remove_favorite);

    index
        .or(weather)
        .or(add_favorite)
        .or(remove_favorite)
        .recover(handle_rejection)
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let error = if err.is_not_found() {
        ApiError::empty(ErrorKind::NotFound)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::empty(ErrorKind::MethodNotAllowed)
    } else if err.find::<warp::reject::InvalidQuery>().is_some()
        || err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        ApiError::text(ErrorKind::BadRequest, "Invalid request.")
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        ApiError::text(ErrorKind::Internal, "An internal server error occurred.")
    };

    Ok(error.into_response())
}

/// Serve the dashboard on `addr` until the process is stopped.
pub async fn serve(ctx: AppContext, addr: SocketAddr) {
    let routes = routes(ctx).with(warp::trace::request());

    tracing::info!(%addr, "weather dashboard listening");
    warp::serve(routes).run(addr).await;
}
