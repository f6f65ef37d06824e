//! Application router configuration with public, authenticated and admin route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_accounts_page, get_accounts_table, get_edit_account_page, get_new_account_page,
        set_default_account_endpoint,
    },
    auth::{
        AuthState, admin_guard, auth_guard, auth_guard_hx, get_forgot_password_page,
        get_log_in_page, get_log_out, get_register_page, post_forgot_password, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    modal::close_modal,
    not_found::get_404_not_found,
    request::{
        create_fund_request_endpoint, create_transfer_request_endpoint, get_fund_requests_page,
        get_fund_requests_table, get_new_fund_request_page, get_new_transfer_page,
        get_transfers_page, get_transfers_table,
    },
    review::{
        approve_request, get_process_modal, get_reject_modal, get_review_page, get_review_table,
        process_request, reject_request, validate_process_modal, validate_reject_modal,
    },
    transaction::{get_transactions_page, get_transactions_table},
    user::{
        change_password, get_pending_users_page, get_pending_users_table, get_profile_page,
        get_user_modal, submit_portal_access, update_profile, validate_user_modal,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState::from_ref(&state);

    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::REGISTER_API, post(register_user))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::FORGOT_PASSWORD_API, post(post_forgot_password))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_new_account_page))
        .route(endpoints::EDIT_ACCOUNT_VIEW, get(get_edit_account_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::FUND_REQUESTS_VIEW, get(get_fund_requests_page))
        .route(
            endpoints::NEW_FUND_REQUEST_VIEW,
            get(get_new_fund_request_page),
        )
        .route(endpoints::TRANSFERS_VIEW, get(get_transfers_page))
        .route(endpoints::NEW_TRANSFER_VIEW, get(get_new_transfer_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_guard,
        ));

    // Fragments and mutations are requested by htmx, so auth redirects need the HX-Redirect header.
    let hx_routes = Router::new()
        .route(endpoints::ACCOUNTS_TABLE, get(get_accounts_table))
        .route(endpoints::TRANSACTIONS_TABLE, get(get_transactions_table))
        .route(endpoints::FUND_REQUESTS_TABLE, get(get_fund_requests_table))
        .route(endpoints::TRANSFERS_TABLE, get(get_transfers_table))
        .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
        .route(
            endpoints::ACCOUNT,
            put(edit_account_endpoint).delete(delete_account_endpoint),
        )
        .route(
            endpoints::DEFAULT_ACCOUNT,
            put(set_default_account_endpoint),
        )
        .route(
            endpoints::FUND_REQUESTS_API,
            post(create_fund_request_endpoint),
        )
        .route(
            endpoints::TRANSFERS_API,
            post(create_transfer_request_endpoint),
        )
        .route(endpoints::PROFILE_API, put(update_profile))
        .route(endpoints::CHANGE_PASSWORD_API, post(change_password))
        .route(endpoints::CLOSE_MODAL, get(close_modal))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_guard_hx,
        ));

    let admin_page_routes = Router::new()
        .route(endpoints::REVIEW_VIEW, get(get_review_page))
        .route(endpoints::PENDING_USERS_VIEW, get(get_pending_users_page))
        .route_layer(middleware::from_fn(admin_guard))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_guard,
        ));

    let admin_hx_routes = Router::new()
        .route(endpoints::REVIEW_TABLE, get(get_review_table))
        .route(endpoints::PENDING_USERS_TABLE, get(get_pending_users_table))
        .route(endpoints::PROCESS_MODAL, get(get_process_modal))
        .route(
            endpoints::PROCESS_MODAL_VALIDATE,
            post(validate_process_modal),
        )
        .route(endpoints::PROCESS_REQUEST, post(process_request))
        .route(endpoints::REJECT_MODAL, get(get_reject_modal))
        .route(
            endpoints::REJECT_MODAL_VALIDATE,
            post(validate_reject_modal),
        )
        .route(endpoints::REJECT_REQUEST, post(reject_request))
        .route(endpoints::APPROVE_REQUEST, post(approve_request))
        .route(endpoints::USER_MODAL, get(get_user_modal))
        .route(endpoints::USER_MODAL_VALIDATE, post(validate_user_modal))
        .route(endpoints::PORTAL_ACCESS, post(submit_portal_access))
        .route_layer(middleware::from_fn(admin_guard))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_guard_hx));

    page_routes
        .merge(hx_routes)
        .merge(admin_page_routes)
        .merge(admin_hx_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        DEMO_ADMIN_EMAIL, DEMO_PASSWORD, DEMO_USER_EMAIL, endpoints,
        test_utils::{demo_backend, test_state},
    };

    use super::build_router;

    fn test_server() -> TestServer {
        let app = build_router(test_state(demo_backend()));

        TestServer::builder()
            .save_cookies()
            .mock_transport()
            .try_build(app)
            .expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer, email: &str) {
        server
            .post(endpoints::LOG_IN_API)
            .form(&json!({
                "email": email,
                "password": DEMO_PASSWORD,
            }))
            .await;
    }

    #[tokio::test]
    async fn page_without_cookie_redirects_to_log_in() {
        let server = test_server();

        let response = server.get(endpoints::ACCOUNTS_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.header("location");
        assert!(
            location.to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW),
            "got redirect to {location:?}"
        );
    }

    #[tokio::test]
    async fn fragment_without_cookie_uses_hx_redirect() {
        let server = test_server();

        let response = server.get(endpoints::ACCOUNTS_TABLE).await;

        response.assert_status_ok();
        assert!(
            response
                .header("hx-redirect")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn user_can_open_own_pages() {
        let server = test_server();
        log_in(&server, DEMO_USER_EMAIL).await;

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::ACCOUNTS_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::FUND_REQUESTS_VIEW,
            endpoints::TRANSFERS_VIEW,
            endpoints::PROFILE_VIEW,
        ] {
            server.get(page).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn user_cannot_open_admin_pages() {
        let server = test_server();
        log_in(&server, DEMO_USER_EMAIL).await;

        server
            .get(endpoints::REVIEW_VIEW)
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .post("/api/review/fund/fr-003/approve")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_open_admin_pages() {
        let server = test_server();
        log_in(&server, DEMO_ADMIN_EMAIL).await;

        server.get(endpoints::REVIEW_VIEW).await.assert_status_ok();
        server
            .get(endpoints::PENDING_USERS_VIEW)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = test_server();

        server
            .get("/no/such/page")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
