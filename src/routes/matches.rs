use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{BreedQuery, BreedsResponse, ErrorResponse, HealthResponse, SearchRequest, SearchResponse, WeightVector};
use crate::routes::AppState;

/// Configure search and breed routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/search", web::post().to(search_matches))
        .route("/breeds", web::get().to(list_breeds))
        .route("/breeds/reload", web::post().to(reload_breeds));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let breeds = state.catalog.snapshot();
    let status = if breeds.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        registered_animals: state.store.len(),
        known_breeds: breeds.len(),
    })
}

/// Search endpoint
///
/// POST /api/v1/matches/search
///
/// Request body:
/// ```json
/// {
///   "age": 3,
///   "gender": 0,
///   "size": 1,
///   "breed": "Beagle",
///   "weights": { "age": 5, "gender": 5, "size": 5, "breed": 8 }
/// }
/// ```
async fn search_matches(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let preferences = req.preferences();
    let weights = WeightVector::from(req.weights);

    // Copy-on-read: registrations during the pass do not affect it
    let candidates = state.store.snapshot();
    let result = state.matcher().find_matches(&preferences, &weights, &candidates);

    tracing::info!(
        "Returning {} matches for breed '{}' (from {} candidates, {} skipped)",
        result.matches.len(),
        preferences.breed,
        result.total_candidates,
        result.skipped
    );

    HttpResponse::Ok().json(SearchResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        skipped_records: result.skipped,
    })
}

/// List known breed names
///
/// GET /api/v1/breeds?q={substring}
async fn list_breeds(
    state: web::Data<AppState>,
    query: web::Query<BreedQuery>,
) -> impl Responder {
    let table = state.catalog.snapshot();
    let breeds = match query.q.as_deref() {
        Some(q) => table.search(q),
        None => table.breed_names().to_vec(),
    };

    HttpResponse::Ok().json(BreedsResponse {
        breeds,
        features: table.feature_names().to_vec(),
    })
}

/// Reload the breed feature table from its source file
///
/// POST /api/v1/breeds/reload
async fn reload_breeds(state: web::Data<AppState>) -> impl Responder {
    let catalog = state.catalog.clone();

    match tokio::task::spawn_blocking(move || catalog.reload()).await {
        Ok(table) => {
            tracing::info!("Breed table reloaded with {} breeds", table.len());
            HttpResponse::Ok().json(BreedsResponse {
                breeds: table.breed_names().to_vec(),
                features: table.feature_names().to_vec(),
            })
        }
        Err(e) => {
            tracing::error!("Breed table reload task failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to reload breeds".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
