//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget_item::{
        create_budget_item_api, create_budget_item_endpoint, delete_budget_item_api,
        delete_budget_item_endpoint, get_budget_item_api, get_budget_item_page,
        get_budget_items_page, get_edit_budget_item_page, get_new_budget_item_page,
        list_budget_items_api, patch_budget_item_api, update_budget_item_endpoint,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::BUDGET_ITEMS_VIEW, get(get_budget_items_page))
        .route(
            endpoints::NEW_BUDGET_ITEM_VIEW,
            get(get_new_budget_item_page),
        )
        .route(endpoints::BUDGET_ITEM_VIEW, get(get_budget_item_page))
        .route(
            endpoints::EDIT_BUDGET_ITEM_VIEW,
            get(get_edit_budget_item_page),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // Endpoints for the HTMX forms and buttons, these respond with HTML fragments.
    let fragment_routes = Router::new()
        .route(
            endpoints::POST_BUDGET_ITEM,
            post(create_budget_item_endpoint),
        )
        .route(
            endpoints::PUT_BUDGET_ITEM,
            put(update_budget_item_endpoint),
        )
        .route(
            endpoints::DELETE_BUDGET_ITEM,
            delete(delete_budget_item_endpoint),
        );

    let json_routes = Router::new()
        .route(
            endpoints::API_BUDGET_ITEMS,
            get(list_budget_items_api).post(create_budget_item_api),
        )
        .route(
            endpoints::API_BUDGET_ITEM,
            get(get_budget_item_api)
                .patch(patch_budget_item_api)
                .delete(delete_budget_item_api),
        );

    page_routes
        .merge(fragment_routes)
        .merge(json_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the budget items page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::BUDGET_ITEMS_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{AppState, build_router, endpoints, test_utils::get_test_db_connection};

    fn get_test_server() -> TestServer {
        let state = AppState::new(get_test_db_connection()).expect("Could not create app state");
        let app = build_router(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn police_patrol_salaries_json() -> Value {
        json!({
            "id": 1,
            "cabinet": "Public Safety",
            "department": "Police",
            "program": "Patrol",
            "expenseCategory": "Salaries",
            "fy22ActualExpense": 1000.00,
            "fy23ActualExpense": "1050.50",
            "fy24Appropriation": "1100.00",
            "fy25Budget": "1150.75"
        })
    }

    #[tokio::test]
    async fn pages_are_served() {
        let server = get_test_server();

        server
            .get(endpoints::BUDGET_ITEMS_VIEW)
            .await
            .assert_status_ok();
        server
            .get(endpoints::NEW_BUDGET_ITEM_VIEW)
            .await
            .assert_status_ok();
        server
            .get(endpoints::INTERNAL_ERROR_VIEW)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let server = get_test_server();

        server
            .get("/this/route/does/not/exist")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn missing_budget_item_page_returns_404() {
        let server = get_test_server();

        server
            .get(&endpoints::format_endpoint(endpoints::BUDGET_ITEM_VIEW, 999))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn json_api_lifecycle() {
        let server = get_test_server();
        let item_endpoint = endpoints::format_endpoint(endpoints::API_BUDGET_ITEM, 1);

        let response = server
            .post(endpoints::API_BUDGET_ITEMS)
            .json(&police_patrol_salaries_json())
            .await;
        response.assert_status(StatusCode::CREATED);
        let created = response.json::<Value>();
        assert_eq!(created["fy22ActualExpense"], "1000.00");

        let got = server.get(&item_endpoint).await.json::<Value>();
        assert_eq!(got, created);

        let filtered = server
            .get(endpoints::API_BUDGET_ITEMS)
            .add_query_param("cabinet", "Public Safety")
            .await
            .json::<Value>();
        assert_eq!(filtered, json!([created]));

        let updated = server
            .patch(&item_endpoint)
            .json(&json!({ "fy25Budget": "1200.00" }))
            .await
            .json::<Value>();
        assert_eq!(updated["fy25Budget"], "1200.00");
        assert_eq!(updated["fy24Appropriation"], "1100.00");

        server
            .delete(&item_endpoint)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server.get(&item_endpoint).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn json_api_rejects_duplicate_id() {
        let server = get_test_server();
        server
            .post(endpoints::API_BUDGET_ITEMS)
            .json(&police_patrol_salaries_json())
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::API_BUDGET_ITEMS)
            .json(&police_patrol_salaries_json())
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(
            response.json::<Value>()["error"],
            "a budget item with the ID 1 already exists"
        );
    }

    #[tokio::test]
    async fn json_api_rejects_negative_amount() {
        let server = get_test_server();
        let mut item = police_patrol_salaries_json();
        item["fy25Budget"] = json!("-1.00");

        let response = server.post(endpoints::API_BUDGET_ITEMS).json(&item).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn json_api_rejects_negative_amount_update() {
        let server = get_test_server();
        let item_endpoint = endpoints::format_endpoint(endpoints::API_BUDGET_ITEM, 1);
        let created = server
            .post(endpoints::API_BUDGET_ITEMS)
            .json(&police_patrol_salaries_json())
            .await
            .json::<Value>();

        let response = server
            .patch(&item_endpoint)
            .json(&json!({ "fy25Budget": "-1.00" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
        let stored = server.get(&item_endpoint).await.json::<Value>();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn json_api_keeps_large_numbers_exact() {
        let server = get_test_server();
        let mut item = police_patrol_salaries_json();
        item["fy25Budget"] = serde_json::from_str("123456789012345.67").unwrap();

        let response = server.post(endpoints::API_BUDGET_ITEMS).json(&item).await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["fy25Budget"], "123456789012345.67");
    }

    #[tokio::test]
    async fn json_api_rejects_non_numeric_id_with_json_error() {
        let server = get_test_server();

        let response = server.get("/api/v1/budget_items/not-a-number").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn json_api_rejects_changing_id() {
        let server = get_test_server();
        server
            .post(endpoints::API_BUDGET_ITEMS)
            .json(&police_patrol_salaries_json())
            .await
            .assert_status(StatusCode::CREATED);

        server
            .patch(&endpoints::format_endpoint(endpoints::API_BUDGET_ITEM, 1))
            .json(&json!({ "id": 2 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn html_form_creates_budget_item() {
        let server = get_test_server();

        let response = server
            .post(endpoints::POST_BUDGET_ITEM)
            .form(&[
                ("id", "1"),
                ("cabinet", "Public Safety"),
                ("department", "Police"),
                ("program", "Patrol"),
                ("expense_category", "Salaries"),
                ("fy22_actual_expense", "1000"),
                ("fy23_actual_expense", ""),
                ("fy24_appropriation", ""),
                ("fy25_budget", "1150.75"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("hx-redirect"),
            endpoints::BUDGET_ITEMS_VIEW
        );
        let page = server
            .get(&endpoints::format_endpoint(endpoints::BUDGET_ITEM_VIEW, 1))
            .await;
        page.assert_status_ok();
        assert!(page.text().contains("$1,150.75"));
    }
}
