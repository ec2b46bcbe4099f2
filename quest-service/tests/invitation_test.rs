mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use quest_service::models::{GroupKind, QuestAccessToken, Role};
use uuid::Uuid;

#[tokio::test]
async fn issue_and_redeem_grants_access_immediately() {
    let app = TestApp::spawn().await;
    let professor = app.register_professor().await;
    let student = app.register_principal(Role::Student, Uuid::new_v4()).await;
    let quest_id = app.create_quest(&professor, "Surgery clerkship").await;
    let case_id = app.create_case(&student, "Appendicitis", "appendectomy").await;

    let response = app
        .post_as(&professor, "/api/quest-access-tokens")
        .json(&serde_json::json!({
            "quest_id": quest_id,
            "role": "student",
            "group": "author",
            "max_uses": 3,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    assert!(body["invite_url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/invite/{}", token)));

    let response = app
        .post_as(&student, &format!("/api/invitations/{}/redeem", token))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["quest_id"], quest_id.to_string());
    assert_eq!(body["group"], "author");

    // The grant is usable in the very next request.
    app.add_case_to_quest(&student, quest_id, case_id).await;
}

#[tokio::test]
async fn redemption_elevates_role_but_never_downgrades() {
    let app = TestApp::spawn().await;
    let professor = app.register_professor().await;
    let guest = app.register_principal(Role::Guest, Uuid::new_v4()).await;
    let quest_id = app.create_quest(&professor, "Open house").await;

    let body: serde_json::Value = app
        .post_as(&professor, "/api/quest-access-tokens")
        .json(&serde_json::json!({
            "quest_id": quest_id,
            "role": "student",
            "group": "view",
            "max_uses": 10,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    for principal in [&guest, &professor] {
        let response = app
            .post_as(principal, &format!("/api/invitations/{}/redeem", token))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let me: serde_json::Value = app
        .get_as(&guest, "/api/principals/me")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["role"], "student");

    let me: serde_json::Value = app
        .get_as(&professor, "/api/principals/me")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["role"], "professor");
}

#[tokio::test]
async fn issuance_requires_invite_capability_and_leaves_no_trace_when_denied() {
    let app = TestApp::spawn().await;
    let professor = app.register_professor().await;
    let viewer = app.register_principal(Role::Student, Uuid::new_v4()).await;
    let quest_id = app.create_quest(&professor, "Locked quest").await;
    app.state
        .store
        .grant_group(viewer.principal_id, quest_id, GroupKind::View);

    let response = app
        .post_as(&viewer, "/api/quest-access-tokens")
        .json(&serde_json::json!({
            "quest_id": quest_id,
            "role": "student",
            "group": "view",
            "max_uses": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let body: serde_json::Value = app
        .get_as(&professor, &format!("/api/quests/{}/access-tokens", quest_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn token_listing_requires_invite_capability() {
    let app = TestApp::spawn().await;
    let professor = app.register_professor().await;
    let viewer = app.register_principal(Role::Student, Uuid::new_v4()).await;
    let quest_id = app.create_quest(&professor, "Audit quest").await;
    app.state
        .store
        .grant_group(viewer.principal_id, quest_id, GroupKind::View);

    let response = app
        .get_as(&viewer, &format!("/api/quests/{}/access-tokens", quest_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn issuance_validates_max_uses_and_expiry() {
    let app = TestApp::spawn().await;
    let professor = app.register_professor().await;
    let quest_id = app.create_quest(&professor, "Short-lived").await;

    let response = app
        .post_as(&professor, "/api/quest-access-tokens")
        .json(&serde_json::json!({
            "quest_id": quest_id,
            "role": "student",
            "group": "view",
            "max_uses": 0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    let response = app
        .post_as(&professor, "/api/quest-access-tokens")
        .json(&serde_json::json!({
            "quest_id": quest_id,
            "role": "student",
            "group": "view",
            "max_uses": 1,
            "expires_at": Utc::now() - Duration::hours(1),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn redeeming_an_unknown_token_is_not_found() {
    let app = TestApp::spawn().await;
    let student = app.register_principal(Role::Student, Uuid::new_v4()).await;

    let response = app
        .post_as(
            &student,
            &format!("/api/invitations/{}/redeem", Uuid::new_v4()),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn expired_token_reports_expired_even_with_uses_left() {
    let app = TestApp::spawn().await;
    let professor = app.register_professor().await;
    let student = app.register_principal(Role::Student, Uuid::new_v4()).await;
    let quest_id = app.create_quest(&professor, "Last semester").await;

    let token = QuestAccessToken::new(
        quest_id,
        Role::Student,
        GroupKind::View,
        5,
        Utc::now() - Duration::hours(1),
        professor.principal_id,
    );
    let token_id = token.token;
    app.state.store.insert_token(token);

    let response = app
        .post_as(&student, &format!("/api/invitations/{}/redeem", token_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 410);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "token_expired");

    // The inert token still shows up in the audit listing.
    let body: serde_json::Value = app
        .get_as(&professor, &format!("/api/quests/{}/access-tokens", quest_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body[0]["status"], "expired");
    assert_eq!(body[0]["used_by_count"], 0);
}

#[tokio::test]
async fn concurrent_redemptions_honor_max_uses() {
    let app = TestApp::spawn().await;
    let professor = app.register_professor().await;
    let quest_id = app.create_quest(&professor, "Single seat").await;

    let body: serde_json::Value = app
        .post_as(&professor, "/api/quest-access-tokens")
        .json(&serde_json::json!({
            "quest_id": quest_id,
            "role": "student",
            "group": "view",
            "max_uses": 1,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    let mut redeems = Vec::new();
    for _ in 0..4 {
        let student = app.register_principal(Role::Student, Uuid::new_v4()).await;
        redeems.push(
            app.post_as(&student, &format!("/api/invitations/{}/redeem", token))
                .send(),
        );
    }
    let responses = futures::future::join_all(redeems).await;

    let mut succeeded = 0;
    let mut exhausted = 0;
    for response in responses {
        let response = response.unwrap();
        match response.status().as_u16() {
            200 => succeeded += 1,
            410 => {
                let body: serde_json::Value = response.json().await.unwrap();
                assert_eq!(body["code"], "token_exhausted");
                exhausted += 1;
            }
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(succeeded, 1);
    assert_eq!(exhausted, 3);

    let body: serde_json::Value = app
        .get_as(&professor, &format!("/api/quests/{}/access-tokens", quest_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body[0]["used_by_count"], 1);
    assert_eq!(body[0]["status"], "exhausted");
}
