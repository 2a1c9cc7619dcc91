mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn contact_lifecycle() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    // Create
    let res = server
        .client
        .post(server.url("/api/contacts"))
        .bearer_auth(&token)
        .json(&json!({
            "firstname": "Test",
            "lastname": "Contact",
            "email": "test.contact@example.com"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?;
    let id = created["_id"].as_str().context("created contact has no _id")?.to_string();
    assert_eq!(created["firstname"], "Test");
    assert!(created["created"].is_string());
    assert!(created["updated"].is_string());

    // Read back through list and by id
    let list = server.client.get(server.url("/api/contacts")).send().await?;
    assert_eq!(list.status(), StatusCode::OK);
    let list = list.json::<Value>().await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["_id"], id.as_str());

    let res = server
        .client
        .get(server.url(&format!("/api/contacts/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    // Partial update keeps unspecified fields
    let res = server
        .client
        .put(server.url(&format!("/api/contacts/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "lastname": "Updated" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["_id"], id.as_str());
    assert_eq!(updated["lastname"], "Updated");
    assert_eq!(updated["firstname"], "Test");
    assert_eq!(updated["email"], "test.contact@example.com");
    assert_eq!(updated["created"], created["created"]);

    // Delete, then it is gone
    let res = server
        .client
        .delete(server.url(&format!("/api/contacts/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["message"], "Contact deleted");

    let res = server
        .client
        .get(server.url(&format!("/api/contacts/{}", id)))
        .send()
        .await?;
    assert_eq!(common::error_message(res, StatusCode::NOT_FOUND).await?, "Contact not found");
    Ok(())
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    let res = server
        .client
        .get(server.url("/api/contacts/not-a-valid-id-format"))
        .send()
        .await?;
    assert_eq!(common::error_message(res, StatusCode::BAD_REQUEST).await?, "Invalid Contact ID");

    let res = server
        .client
        .put(server.url("/api/contacts/not-a-valid-id-format"))
        .bearer_auth(&token)
        .json(&json!({ "lastname": "Nobody" }))
        .send()
        .await?;
    common::error_message(res, StatusCode::BAD_REQUEST).await?;

    let res = server
        .client
        .delete(server.url("/api/contacts/not-a-valid-id-format"))
        .bearer_auth(&token)
        .send()
        .await?;
    common::error_message(res, StatusCode::BAD_REQUEST).await?;
    Ok(())
}

#[tokio::test]
async fn undecodable_id_uses_error_envelope() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    let res = server.client.get(server.url("/api/contacts/%FF")).send().await?;
    assert_eq!(common::error_message(res, StatusCode::BAD_REQUEST).await?, "Invalid Contact ID");

    let res = server
        .client
        .put(server.url("/api/contacts/%FF"))
        .bearer_auth(&token)
        .json(&json!({ "lastname": "Nobody" }))
        .send()
        .await?;
    assert_eq!(common::error_message(res, StatusCode::BAD_REQUEST).await?, "Invalid Contact ID");

    let res = server
        .client
        .delete(server.url("/api/contacts/%FF"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(common::error_message(res, StatusCode::BAD_REQUEST).await?, "Invalid Contact ID");
    Ok(())
}

#[tokio::test]
async fn unknown_id_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;
    let missing = uuid::Uuid::new_v4();

    let res = server
        .client
        .put(server.url(&format!("/api/contacts/{}", missing)))
        .bearer_auth(&token)
        .json(&json!({ "lastname": "Ghost" }))
        .send()
        .await?;
    assert_eq!(common::error_message(res, StatusCode::NOT_FOUND).await?, "Contact not found");

    let res = server
        .client
        .delete(server.url(&format!("/api/contacts/{}", missing)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(common::error_message(res, StatusCode::NOT_FOUND).await?, "Contact not found");
    Ok(())
}

#[tokio::test]
async fn invalid_contact_reports_field_errors() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    let res = server
        .client
        .post(server.url("/api/contacts"))
        .bearer_auth(&token)
        .json(&json!({ "firstname": "Test", "email": "not-an-email" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"]["lastname"], "lastname is required");
    assert_eq!(body["errors"]["email"], "Please enter a valid email address");
    assert!(body["errors"].get("firstname").is_none());

    // Nothing was stored
    let list = server.client.get(server.url("/api/contacts")).send().await?;
    assert_eq!(list.json::<Value>().await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn update_that_breaks_validation_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    let created = server
        .client
        .post(server.url("/api/contacts"))
        .bearer_auth(&token)
        .json(&json!({ "firstname": "Test", "lastname": "Contact", "email": "t@example.com" }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = created["_id"].as_str().context("missing _id")?;

    let res = server
        .client
        .put(server.url(&format!("/api/contacts/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "email": "broken" }))
        .send()
        .await?;
    assert_eq!(common::error_message(res, StatusCode::BAD_REQUEST).await?, "Validation failed");

    let stored = server
        .client
        .get(server.url(&format!("/api/contacts/{}", id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(stored["email"], "t@example.com");
    Ok(())
}

#[tokio::test]
async fn reserved_fields_are_ignored() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;
    let forged = uuid::Uuid::new_v4().to_string();

    let res = server
        .client
        .post(server.url("/api/contacts"))
        .bearer_auth(&token)
        .json(&json!({
            "_id": forged,
            "created": "1999-01-01T00:00:00Z",
            "firstname": "Test",
            "lastname": "Contact",
            "email": "t@example.com"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_ne!(body["_id"], forged.as_str());
    assert_ne!(body["created"], "1999-01-01T00:00:00Z");
    Ok(())
}

#[tokio::test]
async fn non_object_body_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    let res = server
        .client
        .post(server.url("/api/contacts"))
        .bearer_auth(&token)
        .json(&json!(["firstname", "Test"]))
        .send()
        .await?;
    assert_eq!(
        common::error_message(res, StatusCode::BAD_REQUEST).await?,
        "Request body must be a JSON object"
    );
    Ok(())
}

#[tokio::test]
async fn remove_all_empties_the_collection() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    for n in 0..3 {
        let res = server
            .client
            .post(server.url("/api/contacts"))
            .bearer_auth(&token)
            .json(&json!({
                "firstname": format!("Contact{}", n),
                "lastname": "Bulk",
                "email": format!("bulk{}@example.com", n)
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = server
        .client
        .delete(server.url("/api/contacts"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["deleted_count"], 3);
    assert_eq!(body["message"], "All Contacts deleted");

    let list = server.client.get(server.url("/api/contacts")).send().await?;
    assert_eq!(list.json::<Value>().await?, json!([]));

    // Deleting an empty collection still succeeds
    let res = server
        .client
        .delete(server.url("/api/contacts"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["deleted_count"], 0);
    Ok(())
}
