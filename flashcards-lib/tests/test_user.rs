use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::TestRequest;
use actix_web::App;
use flashcards_repo::user_repo::UserRepoError;
use flashcards_repo::Repos;
use rstest::rstest;
use serde_json::{json, Value};
use tracing::instrument;

use utils::{card_payload, label_payload, repos, resource_id, tracing_setup};
use utils::{TestUser, TEST_PASSWORD};

#[macro_use]
mod utils;

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn test_get_user(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let service = build_app!(repos);

    let label = resource_id(&create_resource!(
        &service,
        test_user,
        "/labels",
        label_payload("travel")
    ));

    let request = TestRequest::get()
        .uri("/user")
        .insert_header(test_user.auth())
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(StatusCode::OK, response.status());

    let document: Value = test::read_body_json(response).await;
    assert_eq!(test_user.id().to_string(), document["data"]["id"]);
    assert_eq!(test_user.user.email, document["data"]["attributes"]["email"]);
    assert_eq!(
        json!([{ "type": "labels", "id": label }]),
        document["data"]["relationships"]["labels"]["data"]
    );
    assert_eq!("travel", document["included"][0]["attributes"]["name"]);
    assert!(document["data"]["attributes"]["auth_token_for_web"].is_null());

    test_user.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn test_delete_user(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let survivor = TestUser::new(&repos.user_repo).await;
    let service = build_app!(repos);

    for owner in [&test_user, &survivor] {
        let label = resource_id(&create_resource!(
            &service,
            owner,
            "/labels",
            label_payload("shared name")
        ));
        create_resource!(
            &service,
            owner,
            "/cards",
            card_payload("front", "back", 0, &[&label])
        );
    }

    let request = TestRequest::delete()
        .uri("/user")
        .insert_header(test_user.auth())
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(StatusCode::NO_CONTENT, response.status());

    assert!(matches!(
        repos.user_repo.get_user(test_user.id()).await,
        Err(UserRepoError::UserNotFound(_))
    ));
    assert!(repos
        .label_repo
        .get_labels(test_user.id())
        .await
        .unwrap()
        .is_empty());
    assert!(repos
        .card_repo
        .get_cards(test_user.id(), None)
        .await
        .unwrap()
        .is_empty());

    let request = TestRequest::get()
        .uri("/user")
        .insert_header(test_user.auth())
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(StatusCode::UNAUTHORIZED, response.status());

    let survivor_cards = repos
        .card_repo
        .get_cards(survivor.id(), None)
        .await
        .unwrap();
    assert_eq!(1, survivor_cards.len());
    assert_eq!(1, survivor_cards[0].label_ids.len());

    survivor.delete().await
}

#[instrument(skip(repos))]
#[rstest]
#[actix_rt::test]
async fn test_update_password(_tracing_setup: &(), repos: Repos) {
    let test_user = TestUser::new(&repos.user_repo).await;
    let service = build_app!(repos);

    let request = TestRequest::put()
        .uri("/user/password")
        .insert_header(test_user.auth())
        .set_json(json!({ "password": "a whole new password" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(StatusCode::NO_CONTENT, response.status());

    for (password, status) in [
        (TEST_PASSWORD, StatusCode::UNAUTHORIZED),
        ("a whole new password", StatusCode::OK),
    ] {
        let request = TestRequest::post()
            .uri("/auth/get_token")
            .set_json(json!({ "email": test_user.user.email, "password": password }))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(status, response.status());
    }

    let request = TestRequest::put()
        .uri("/user/password")
        .insert_header(test_user.auth())
        .set_json(json!({ "password": "tiny" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, response.status());

    test_user.delete().await
}
