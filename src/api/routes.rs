use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    AppState,
    admin::{
        add_result, club_dependents, create_club, create_event, create_player, create_point_rule,
        create_snapshot, delete_club, delete_event, delete_player, delete_point_rule, delete_result,
        delete_snapshot, event_dependents, list_clubs, list_events, list_players, list_point_rules,
        list_snapshots, player_dependents, recalculate_event, snapshot_csv, snapshot_entries,
        update_club, update_event, update_player, update_snapshot,
    },
    clubs::get_club_roster,
    players::get_player_detail,
    rankings::{get_ranking_dates, get_rankings},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/rankings", get(get_rankings))
        .route("/api/rankings/dates", get(get_ranking_dates))
        .route("/api/player/:id", get(get_player_detail))
        .route("/api/club/:id", get(get_club_roster))
        .merge(admin_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/snapshots", get(list_snapshots).post(create_snapshot))
        .route("/api/admin/snapshots/:id", patch(update_snapshot).delete(delete_snapshot))
        .route("/api/admin/snapshots/:id/entries", get(snapshot_entries))
        .route("/api/admin/snapshots/:id/csv", get(snapshot_csv))
        .route("/api/admin/events", get(list_events).post(create_event))
        .route("/api/admin/events/:id", put(update_event).delete(delete_event))
        .route("/api/admin/events/:id/dependents", get(event_dependents))
        .route("/api/admin/events/:id/results", post(add_result))
        .route("/api/admin/events/:id/recalculate", post(recalculate_event))
        .route("/api/admin/results/:id", delete(delete_result))
        .route("/api/admin/clubs", get(list_clubs).post(create_club))
        .route("/api/admin/clubs/:id", put(update_club).delete(delete_club))
        .route("/api/admin/clubs/:id/dependents", get(club_dependents))
        .route("/api/admin/players", get(list_players).post(create_player))
        .route("/api/admin/players/:id", put(update_player).delete(delete_player))
        .route("/api/admin/players/:id/dependents", get(player_dependents))
        .route("/api/admin/point-rules", get(list_point_rules).post(create_point_rule))
        .route("/api/admin/point-rules/:id", delete(delete_point_rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::{AppConfig, AuthSettings};
    use crate::database::{create_memory_pool, get_connection, setup::ensure_schema};

    fn test_state() -> Arc<AppState> {
        let pool = create_memory_pool().unwrap();
        ensure_schema(&mut get_connection(&pool).unwrap()).unwrap();

        let config = AppConfig::with_parts(
            ":memory:",
            AuthSettings {
                admin_token: Some("admin".to_string()),
                superadmin_token: Some("root".to_string()),
            },
        );
        Arc::new(AppState { pool, config })
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_public_rankings_are_empty_without_snapshots() {
        let state = test_state();
        let (status, body) = send(&state, request("GET", "/api/rankings?gender=Female&category=U15", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"], json!([]));
        assert_eq!(body["snapshot"], Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_category_is_bad_request() {
        let state = test_state();
        let (status, _) = send(&state, request("GET", "/api/rankings?category=U99", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_require_a_token() {
        let state = test_state();
        let (status, _) = send(&state, request("GET", "/api/admin/snapshots", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_event_management_is_superadmin_only() {
        let state = test_state();
        let event = json!({
            "name": "Kiemelt verseny",
            "eventType": "Kiemelt",
            "date": "2026-09-01",
            "validityDate": "2027-08-31",
            "ageCategory": "Senior",
            "hasSingles": true
        });

        let (status, _) = send(&state, request("POST", "/api/admin/events", Some("admin"), Some(event.clone()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&state, request("POST", "/api/admin/events", Some("root"), Some(event))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["eventType"], "Kiemelt");
        assert_eq!(body["gender"], "Both");
    }

    #[tokio::test]
    async fn test_admin_errors_use_taxonomy_statuses() {
        let state = test_state();

        let (status, body) = send(&state, request("POST", "/api/admin/clubs", Some("admin"), Some(json!({ "name": "X" })))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "name");

        let club = json!({ "name": "Budapesti VSC" });
        let (status, created) = send(&state, request("POST", "/api/admin/clubs", Some("admin"), Some(club.clone()))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&state, request("POST", "/api/admin/clubs", Some("admin"), Some(club))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let player = json!({ "name": "Kiss Anna", "gender": "Female", "clubId": created["id"] });
        let (status, _) = send(&state, request("POST", "/api/admin/players", Some("admin"), Some(player))).await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/admin/clubs/{}", created["id"]);
        let (status, body) = send(&state, request("DELETE", &uri, Some("admin"), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["dependents"], 1);

        let (status, _) = send(&state, request("GET", "/api/player/4242", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_publish_and_read_rankings() {
        let state = test_state();
        let root = Some("root");

        send(&state, request("POST", "/api/admin/point-rules", root, Some(json!({
            "eventType": "Kiemelt", "category": "Egyes", "position": "1", "points": 2000
        })))).await;
        let (_, event) = send(&state, request("POST", "/api/admin/events", root, Some(json!({
            "name": "Kiemelt verseny", "eventType": "Kiemelt", "date": "2026-01-10",
            "validityDate": "2099-01-10", "ageCategory": "Senior", "hasSingles": true
        })))).await;
        let (_, player) = send(&state, request("POST", "/api/admin/players", root, Some(json!({
            "name": "Nagy Bence", "gender": "Male"
        })))).await;

        let uri = format!("/api/admin/events/{}/results", event["id"]);
        let (status, result) = send(&state, request("POST", &uri, root, Some(json!({
            "playerId": player["id"], "category": "Egyes", "position": "1"
        })))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(result["points"], 2000);

        let (status, outcome) = send(&state, request("POST", "/api/admin/snapshots", root, Some(json!({
            "gender": "Male", "category": "Senior", "name": "Első"
        })))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["success"], true);
        assert_eq!(outcome["count"], 1);

        let (_, list) = send(&state, request("GET", "/api/admin/snapshots", root, None)).await;
        let id = list[0]["id"].clone();
        assert_eq!(list[0]["playerCount"], 1);

        let (_, hidden) = send(&state, request("GET", "/api/rankings?gender=Male&category=Senior", None, None)).await;
        assert_eq!(hidden["entries"], json!([]));

        let uri = format!("/api/admin/snapshots/{id}");
        let (status, _) = send(&state, request("PATCH", &uri, root, Some(json!({ "isPublic": true })))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, rankings) = send(&state, request("GET", "/api/rankings?gender=Male&category=Senior", None, None)).await;
        assert_eq!(rankings["entries"][0]["playerName"], "Nagy Bence");
        assert_eq!(rankings["entries"][0]["totalPoints"], 2000);
        assert_eq!(rankings["entries"][0]["change"], "new");

        let (_, profile) = send(&state, request("GET", &format!("/api/player/{}", player["id"]), None, None)).await;
        assert_eq!(profile["chart"][0]["label"], "Első");
        assert_eq!(profile["currentRank"], 1);

        let response = create_router(state.clone())
            .oneshot(request("GET", &format!("/api/admin/snapshots/{id}/csv"), root, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("\"Nagy Bence\""));
    }
}
