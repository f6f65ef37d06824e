//! Defines the page for adding a bank account.

use axum::{
    Extension,
    response::{IntoResponse, Response},
};

use crate::{
    account::form::{FormTarget, account_form, account_form_view},
    auth::Session,
    endpoints,
};

/// Render the page for adding a bank account.
pub async fn get_new_account_page(Extension(session): Extension<Session>) -> Response {
    let form = account_form(FormTarget::Create(endpoints::ACCOUNTS_API), None, "Add account");

    account_form_view("New account", endpoints::ACCOUNTS_VIEW, &session, &form).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Extension, http::StatusCode};

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_valid_html, demo_backend, must_get_form,
            parse_html_document, user_session,
        },
    };

    use super::get_new_account_page;

    #[tokio::test]
    async fn render_page() {
        let backend = demo_backend();

        let response = get_new_account_page(Extension(user_session(&backend))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::ACCOUNTS_API, "hx-post");
        assert_form_input(&form, "holder_name", "text");
        assert_form_input(&form, "account_number", "text");
        assert_form_input(&form, "ifsc_code", "text");
        assert_form_submit_button_with_text(&form, "Add account");
    }
}
