use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use hostelrank_similarity::{RecommendRequest, Recommender, RequestError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    candidates: usize,
    features: usize,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(recommender: Arc<Recommender>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(recommender.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register routes; the app must carry `web::Data<Arc<Recommender>>`
    pub fn configure(cfg: &mut web::ServiceConfig) {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let message = err.to_string();
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
            )
            .into()
        });

        cfg.app_data(json_config)
            .route("/health", web::get().to(health))
            .route("/features", web::get().to(list_features))
            .route("/recommend", web::post().to(recommend));
    }
}

async fn health(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    let context = recommender.snapshot();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        candidates: context.len(),
        features: context.catalog().len(),
    }))
}

async fn list_features(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    let context = recommender.snapshot();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "features": context.feature_summaries()
    })))
}

async fn recommend(
    recommender: web::Data<Arc<Recommender>>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let request = req.into_inner();
    debug!("Recommend request: {:?}", request);

    match recommender.recommend(&request) {
        Ok(recommendation) => Ok(HttpResponse::Ok().json(recommendation)),
        Err(e @ (RequestError::InvalidCategory(_) | RequestError::InvalidWeights(_))) => {
            warn!("Rejected recommend request: {}", e);
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
        Err(e) => {
            error!("Recommendation failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use hostelrank_core::CandidateRecord;
    use hostelrank_similarity::{EngineConfig, WeightTable};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn recommender() -> Arc<Recommender> {
        let rows = [
            ("R1", 1.0, 3000.0, "Gents"),
            ("R2", 5.0, 8000.0, "Ladies"),
            ("R3", 2.0, 4000.0, "Gents"),
        ];
        let records = rows
            .into_iter()
            .map(|(name, distance, rent, hostel_type)| {
                let mut r = CandidateRecord::new(name);
                r.distance_km = Some(distance);
                r.monthly_rent = Some(rent);
                r.hostel_type = Some(hostel_type.to_string());
                r
            })
            .collect();
        let weights = WeightTable::new(BTreeMap::from([
            ("distance_km".to_string(), 10.0),
            ("monthly_rent".to_string(), 10.0),
        ]));
        Arc::new(Recommender::from_records(records, weights, EngineConfig::default()).unwrap())
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(recommender()))
                    .configure(RestApi::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["candidates"], 3);
        // distance, rent, 8 amenity flags, type_ladies
        assert_eq!(body["features"], 11);
    }

    #[actix_web::test]
    async fn test_features() {
        let app = app!();
        let req = test::TestRequest::get().uri("/features").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let features = body["features"].as_array().unwrap();
        assert_eq!(features.len(), 11);
        assert_eq!(features[0]["name"], "distance_km");
        assert_eq!(features[0]["direction"], "lower_is_better");
        assert_eq!(features[0]["min"], 1.0);
        assert_eq!(features[0]["max"], 5.0);
    }

    #[actix_web::test]
    async fn test_recommend() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({
                "preferences": {"distance_km": 1.0, "monthly_rent": 3000},
                "hostel_type": "Gents",
                "k": 2
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ranked");
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["name"], "R1");
        assert_eq!(results[1]["name"], "R3");
        assert_eq!(results[0]["match_score"], 1.0);
        assert!(results[0]["explanation"]["top_matches"].is_array());
        assert_eq!(body["stats"]["pool_size"], 2);
    }

    #[actix_web::test]
    async fn test_ladies_filter() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"preferences": {}, "hostel_type": "Ladies"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // R2 is Ladies, so the pool is not empty
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ranked");
        assert_eq!(body["results"][0]["name"], "R2");
    }

    #[actix_web::test]
    async fn test_invalid_category_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"hostel_type": "family"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("family"));
    }

    #[actix_web::test]
    async fn test_invalid_weights_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/recommend")
            .set_json(json!({"weights": {"rating": 1.0}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/recommend")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
