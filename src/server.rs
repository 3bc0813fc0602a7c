use actix_web::{
    dev::ServiceResponse,
    http::StatusCode,
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    web, App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};

use crate::{
    config::Config,
    error::{GenerationError, Result},
    handler::ImageGenerationHandler,
};

pub const IMAGE_GENERATION_PATH: &str = "/api/imageGeneration";

/// Largest request body accepted; a prompt plus an API key fits well inside.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared by all workers; built once at startup.
pub struct AppState {
    pub handler: ImageGenerationHandler,
}

/// POST /api/imageGeneration
pub async fn image_generation(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let image = state.handler.handle(req.headers(), &body).await?;
    Ok(HttpResponse::Ok().json(image))
}

/// Rewrites the extractor's plain-text 413 into the usual `{ "error" }` body.
fn payload_too_large<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let (req, _) = res.into_parts();
    let err = GenerationError::PayloadTooLarge(MAX_BODY_BYTES);
    log::warn!("Rejected {} body over {} bytes", req.path(), MAX_BODY_BYTES);

    let res = ServiceResponse::new(req, err.error_response()).map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(IMAGE_GENERATION_PATH)
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .wrap(ErrorHandlers::new().handler(StatusCode::PAYLOAD_TOO_LARGE, payload_too_large))
            .route(web::post().to(image_generation)),
    );
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let handler = ImageGenerationHandler::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let state = web::Data::new(AppState { handler });

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(config.bind_address())?
        .run()
        .await
}
