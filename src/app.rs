use std::net::SocketAddr;
use axum::{Json, Router, routing::get};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{activities, diet, planner, recipes, recommend};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .merge(recommend::router())
        .merge(recipes::router())
        .merge(planner::router())
        .merge(activities::router())
        .merge(diet::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

async fn home() -> Json<Value> {
    Json(json!({ "health_check": "OK" }))
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn app() -> Router {
        build_app(AppState::fake())
    }

    #[tokio::test]
    async fn health_check() {
        let (status, body) = call(&app(), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "health_check": "OK" }));
    }

    #[tokio::test]
    async fn predict_returns_three_nearest() {
        let req = json!({
            "nutrition_input": [300, 10, 2, 30, 400, 40, 5, 10, 20],
            "ingredients": [],
            "params": { "n_neighbors": 3, "return_distance": false }
        });
        let (status, body) = call(&app(), Method::POST, "/predict/", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        let out = body["output"].as_array().unwrap();
        let names: Vec<&str> = out.iter().map(|o| o["Name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Garlic Bread", "Tofu Stir Fry", "Chicken Fried Rice"]);
        assert!(out.iter().all(|o| o.get("distance").is_none()));
        assert_eq!(out[0]["RecipeInstructions"], json!(["Prepare.", "Serve."]));
    }

    #[tokio::test]
    async fn predict_with_ingredient_and_distances() {
        let req = json!({
            "nutrition_input": [300, 10, 2, 30, 400, 40, 5, 10, 20],
            "ingredients": ["chicken"],
            "params": { "n_neighbors": 50, "return_distance": true }
        });
        let (status, body) = call(&app(), Method::POST, "/predict", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        let out = body["output"].as_array().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["Name"], "Chicken Fried Rice");
        assert_eq!(out[0]["distance"], 30.0);
        assert_eq!(out[1]["Name"], "Roast Chicken");
    }

    #[tokio::test]
    async fn predict_without_matches_is_null() {
        let req = json!({
            "nutrition_input": [300, 10, 2, 30, 400, 40, 5, 10, 20],
            "ingredients": ["saffron"]
        });
        let (status, body) = call(&app(), Method::POST, "/predict/", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "output": null }));
    }

    #[tokio::test]
    async fn predict_rejects_wrong_dimension() {
        let req = json!({ "nutrition_input": [300, 10, 2] });
        let (status, _) = call(&app(), Method::POST, "/predict/", Some(req)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn recipes_list_and_get() {
        let app = app();
        let (status, body) =
            call(&app, Method::GET, "/recipes?ingredient=CHICKEN&limit=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["Name"], "Chicken Fried Rice");

        let (_, body) = call(&app, Method::GET, "/recipes?max_calories=200", None).await;
        assert_eq!(body["items"][0]["Name"], "Green Salad");

        let (_, body) = call(&app, Method::GET, "/recipes/5", None).await;
        assert_eq!(body["item"]["Name"], "Ribeye");
        assert_eq!(body["item"]["id"], 5);

        let (_, body) = call(&app, Method::GET, "/recipes/9999", None).await;
        assert_eq!(body, json!({ "item": null }));
    }

    #[tokio::test]
    async fn planner_flow_logs_activities() {
        let app = app();
        for (date, meal, id) in [("2024-06-01", "lunch", 1), ("2024-06-03", "dinner", 2)] {
            let (status, body) = call(
                &app,
                Method::POST,
                "/planner",
                Some(json!({ "date": date, "meal": meal, "recipe_id": id })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "ok": true }));
        }

        let (_, body) = call(&app, Method::GET, "/planner?start=2024-06-02&end=2024-06-30", None).await;
        assert_eq!(
            body,
            json!({ "items": [{ "date": "2024-06-03", "meal": "dinner", "recipe_id": 2 }] })
        );

        let (status, _) = call(
            &app,
            Method::DELETE,
            "/planner?date_=2024-06-01&meal=lunch&recipe_id=1",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, Method::GET, "/planner", None).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        let (_, body) = call(&app, Method::GET, "/activities?limit=2", None).await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["type"], "planner_remove");
        assert_eq!(items[0]["meta"]["recipe_id"], 1);
        assert_eq!(items[1]["type"], "planner_add");
    }

    #[tokio::test]
    async fn planner_rejects_bad_dates() {
        let (status, _) = call(&app(), Method::GET, "/planner?start=June", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn activities_accept_client_events() {
        let app = app();
        let event = json!({
            "timestamp": "2024-06-01T08:00:00Z",
            "type": "recipe_view",
            "meta": { "recipe_id": 3 }
        });
        let (status, _) = call(&app, Method::POST, "/activities", Some(event)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, Method::GET, "/activities", None).await;
        assert_eq!(body["items"][0]["type"], "recipe_view");
        assert_eq!(body["items"][0]["timestamp"], "2024-06-01T08:00:00Z");
    }

    #[tokio::test]
    async fn activities_accept_timestamps_without_offset() {
        let app = app();
        let event = json!({ "timestamp": "2024-06-02T09:15:00.123456", "type": "search" });
        let (status, _) = call(&app, Method::POST, "/activities", Some(event)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, Method::GET, "/activities", None).await;
        assert_eq!(body["items"][0]["timestamp"], "2024-06-02T09:15:00.123456Z");
    }

    #[tokio::test]
    async fn diet_recommendations() {
        let req = json!({
            "age": 30,
            "height_cm": 180,
            "weight_kg": 80,
            "gender": "female",
            "activity": "light",
            "plan": "mild_loss",
            "meals_per_day": 4
        });
        let (status, body) = call(&app(), Method::POST, "/diet/recommendations", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bmi_category"], "Normal");
        let meals = body["meals"].as_array().unwrap();
        assert_eq!(meals.len(), 4);
        assert_eq!(meals[1]["meal"], "morning snack");
        assert_eq!(meals[0]["recipes"].as_array().unwrap().len(), 5);

        let req = json!({
            "age": 30, "height_cm": 180, "weight_kg": 80,
            "gender": "male", "activity": "light", "plan": "loss", "meals_per_day": 7
        });
        let (status, _) = call(&app(), Method::POST, "/diet/recommendations", Some(req)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
