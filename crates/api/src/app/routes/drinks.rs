use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};

use coffeeshop_core::{Drink, DrinkId, LongDrink, ShortDrink};

use crate::app::dto::{CreateDrinkRequest, DeleteResponse, DrinksResponse, UpdateDrinkRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn list_drinks(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<DrinksResponse<ShortDrink>>, ApiError> {
    let drinks = services.drinks().list().await.map_err(ApiError::retrieval)?;
    Ok(Json(DrinksResponse::ok(drinks.iter().map(Drink::short).collect())))
}

pub async fn list_drinks_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<DrinksResponse<LongDrink>>, ApiError> {
    tracing::debug!(sub = %principal.subject(), "listing drink details");
    let drinks = services.drinks().list().await.map_err(ApiError::retrieval)?;
    Ok(Json(DrinksResponse::ok(drinks.iter().map(Drink::long).collect())))
}

pub async fn create_drink(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<LongDrink>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    let new = body.into_new_drink()?;

    let drink = services.drinks().insert(new).await?;
    tracing::info!(sub = %principal.subject(), id = %drink.id, title = %drink.title, "drink created");

    Ok(Json(DrinksResponse::ok(vec![drink.long()])))
}

pub async fn update_drink(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<LongDrink>>, ApiError> {
    let id = parse_id(&id)?;
    if services.drinks().get(id).await?.is_none() {
        return Err(ApiError::DrinkNotFound);
    }

    let Json(body) = body.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    let patch = body.into_patch()?;

    let drink = services.drinks().update(id, &patch).await?;
    tracing::info!(sub = %principal.subject(), id = %drink.id, "drink updated");

    Ok(Json(DrinksResponse::ok(vec![drink.long()])))
}

pub async fn delete_drink(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id)?;

    services.drinks().delete(id).await?;
    tracing::info!(sub = %principal.subject(), id = %id, "drink deleted");

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}

/// A path segment that is not an integer cannot name a drink.
fn parse_id(raw: &str) -> Result<DrinkId, ApiError> {
    raw.parse().map_err(|_| ApiError::DrinkNotFound)
}
