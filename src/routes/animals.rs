use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{ErrorResponse, RegisterAnimalRequest};
use crate::routes::AppState;

/// Configure animal registration routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/animals", web::post().to(register_animal))
        .route("/animals", web::get().to(list_animals));
}

/// Register an animal
///
/// POST /api/v1/animals
///
/// Request body:
/// ```json
/// {
///   "name": "Bella",
///   "breed": "Beagle",
///   "age": 3,
///   "gender": 1,
///   "size": 0,
///   "image": "optional reference"
/// }
/// ```
async fn register_animal(
    state: web::Data<AppState>,
    req: web::Json<RegisterAnimalRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for register request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let record = req.into_inner().into_record();
    let store = state.store.clone();

    // Registration writes the record file, keep it off the async workers
    let result = tokio::task::spawn_blocking(move || store.register(record)).await;

    match result {
        Ok(Ok(record)) => {
            tracing::info!("Registered {} ({})", record.name, record.id);
            HttpResponse::Created().json(record)
        }
        Ok(Err(e)) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to register animal".to_string(),
            message: e.to_string(),
            status_code: 500,
        }),
        Err(e) => {
            tracing::error!("Registration task failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to register animal".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// List every registered animal in registration order
///
/// GET /api/v1/animals
async fn list_animals(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.store.snapshot())
}
