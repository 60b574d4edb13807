use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    state::State,
    store::{JokeRecord, SearchHit},
};

/// Fields are optional so a missing one becomes a 400 from our validation
/// instead of a 422 from the extractor.
#[derive(Deserialize)]
pub struct NewJoke {
    joke: Option<String>,
    response: Option<String>,
}

#[derive(Serialize)]
pub struct AddedJoke {
    success: bool,
    joke: JokeRecord,
}

#[derive(Deserialize)]
pub struct SearchParams {
    word: Option<String>,
}

pub async fn categories_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.categories()?))
}

pub async fn random_joke_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(category): Path<String>,
) -> Result<Json<JokeRecord>, AppError> {
    Ok(Json(state.store.random_joke(&category)?))
}

pub async fn add_joke_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(category): Path<String>,
    Json(payload): Json<NewJoke>,
) -> Result<Json<AddedJoke>, AppError> {
    let joke = payload.joke.unwrap_or_default();
    let response = payload.response.unwrap_or_default();

    let stored = state.store.add_joke(&category, &joke, &response)?;

    Ok(Json(AddedJoke {
        success: true,
        joke: stored,
    }))
}

pub async fn stats_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Json<BTreeMap<String, u64>>, AppError> {
    Ok(Json(state.store.counts()?))
}

pub async fn search_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let term = params.word.as_deref().unwrap_or("");

    Ok(Json(state.store.search(term)?))
}
