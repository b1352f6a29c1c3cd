//! Request handlers.
//!
//! Each handler returns `Result<Response, Infallible>`: failures are turned
//! into an [`ApiError`] response here and never reach warp as rejections.

use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use weather_core::{CurrentWeather, FavoritesError, FavoritesStore, ForecastDay, favorites::FavoritesResult};

use crate::error::{ApiError, ErrorBody, ErrorKind, respond};
use crate::page;
use crate::server::AppContext;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteForm {
    pub city_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Forecast part of a weather report: the daily summaries, or the error that
/// prevented fetching them.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ForecastPayload {
    Days(Vec<ForecastDay>),
    Error(ErrorBody),
}

#[derive(Debug, Serialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: ForecastPayload,
}

/// Run `op` against the favorites store on the blocking pool.
///
/// SQLite calls can wait on a locked database file, so they stay off the
/// async workers. A task that panics or is cancelled answers 500 with
/// `failure` as the body.
async fn with_store<T, F>(ctx: &AppContext, failure: &'static str, op: F) -> Result<FavoritesResult<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FavoritesStore) -> FavoritesResult<T> + Send + 'static,
{
    let store = Arc::clone(&ctx.favorites);
    tokio::task::spawn_blocking(move || op(&store)).await.map_err(|e| {
        tracing::error!(error = %e, "favorites task failed");
        ApiError::text(ErrorKind::Internal, failure)
    })
}

/// `GET /`
pub async fn index(ctx: AppContext) -> Result<Response, Infallible> {
    Ok(respond(render_index(&ctx).await))
}

async fn render_index(ctx: &AppContext) -> Result<Response, ApiError> {
    const FAILURE: &str = "An internal server error occurred.";

    let favorites = with_store(ctx, FAILURE, |store| store.list_all()).await?.map_err(|e| {
        tracing::error!(error = %e, "failed to list favorites");
        ApiError::text(ErrorKind::Internal, FAILURE)
    })?;

    Ok(warp::reply::html(page::render_index(&ctx.default_city, &favorites)).into_response())
}

/// `GET /weather?city=<name>`
pub async fn weather(query: WeatherQuery, ctx: AppContext) -> Result<Response, Infallible> {
    Ok(respond(weather_report(query, &ctx).await))
}

async fn weather_report(query: WeatherQuery, ctx: &AppContext) -> Result<Response, ApiError> {
    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::json(ErrorKind::BadRequest, "Please provide a city name."))?;

    // Any current-weather failure, unreachable upstream included, is a 404
    // carrying the failure's message.
    let current = ctx
        .provider
        .fetch_current(city)
        .await
        .map_err(|e| ApiError::json(ErrorKind::NotFound, e.to_string()))?;

    // A failed forecast does not fail the report; the error is embedded
    // in its place and the status stays 200.
    let forecast = match ctx.provider.fetch_forecast(city).await {
        Ok(days) => ForecastPayload::Days(days),
        Err(e) => {
            tracing::warn!(city, error = %e, "forecast unavailable, returning current weather only");
            ForecastPayload::Error(ErrorBody::new(e.to_string()))
        }
    };

    Ok(warp::reply::json(&WeatherReport { current, forecast }).into_response())
}

/// `POST /favorites/add`
pub async fn add_favorite(form: AddFavoriteForm, ctx: AppContext) -> Result<Response, Infallible> {
    Ok(respond(save_favorite(form, &ctx).await))
}

async fn save_favorite(form: AddFavoriteForm, ctx: &AppContext) -> Result<Response, ApiError> {
    const FAILURE: &str = "Error adding favorite.";
    let raw = form.city_name.unwrap_or_default();

    let favorite = with_store(ctx, FAILURE, move |store| store.add(&raw))
        .await?
        .map_err(|e| match e {
            FavoritesError::Empty => ApiError::text(ErrorKind::BadRequest, "City name is required."),
            FavoritesError::Conflict(_) => ApiError::text(ErrorKind::Conflict, "City already saved!"),
            e => {
                tracing::error!(error = %e, "failed to save favorite");
                ApiError::text(ErrorKind::Internal, FAILURE)
            }
        })?;

    let body = MessageBody {
        message: format!("{} added to favorites!", favorite.city_name),
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), StatusCode::CREATED).into_response())
}

/// `POST /favorites/remove/<id>`
pub async fn remove_favorite(id: i64, ctx: AppContext) -> Result<Response, Infallible> {
    Ok(respond(delete_favorite(id, &ctx).await))
}

async fn delete_favorite(id: i64, ctx: &AppContext) -> Result<Response, ApiError> {
    const FAILURE: &str = "Error removing favorite.";

    let removed = with_store(ctx, FAILURE, move |store| store.remove(id))
        .await?
        .map_err(|e| match e {
            FavoritesError::NotFound(_) => ApiError::empty(ErrorKind::NotFound),
            e => {
                tracing::error!(id, error = %e, "failed to remove favorite");
                ApiError::text(ErrorKind::Internal, FAILURE)
            }
        })?;

    let body = MessageBody {
        message: format!("{} removed.", removed.city_name),
    };
    Ok(warp::reply::json(&body).into_response())
}
