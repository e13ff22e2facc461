mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{empty_request, json_request, multipart_request, TestApp};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a picture";

fn id_of(value: &Value) -> &str {
    value["_id"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn create_cat_with_image_sets_owner_and_filename() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, token) = app.register("alice").await?;
    let (bob, _) = app.register("bob").await?;

    let request = multipart_request(
        "/cats",
        &token,
        &[
            ("cat_name", "Mittens"),
            ("weight", "4.2"),
            ("birthdate", "2020-05-17"),
            ("lat", "61.2"),
            ("lng", "23.5"),
            ("owner", id_of(&bob)),
        ],
        Some(("image/png", PNG_BYTES)),
    );
    let (status, body) = app.send(request).await?;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Cat created");
    let cat = &body["data"];
    assert_eq!(cat["owner"], json!({ "_id": alice["_id"], "user_name": "alice" }));
    assert_eq!(
        cat["location"],
        json!({ "type": "Point", "coordinates": [23.5, 61.2] })
    );

    let filename = cat["filename"].as_str().unwrap_or_default();
    assert_eq!(filename.len(), 32 + ".png".len(), "{}", filename);
    assert!(filename.ends_with(".png"));
    assert!(app.upload_dir.join(filename).exists());
    Ok(())
}

#[tokio::test]
async fn create_without_image_or_location_uses_defaults() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("alice").await?;

    let request = multipart_request(
        "/cats",
        &token,
        &[("cat_name", "Tom"), ("weight", "5"), ("birthdate", "2019-01-01")],
        Some(("text/plain", &b"not an image"[..])),
    );
    let (status, body) = app.send(request).await?;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["filename"], "");
    assert_eq!(body["data"]["location"]["coordinates"], json!([24.94, 60.17]));
    Ok(())
}

#[tokio::test]
async fn create_validates_fields() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("alice").await?;

    let request = multipart_request(
        "/cats",
        &token,
        &[("weight", "heavy"), ("birthdate", "17.5.2020"), ("lat", "61.2")],
        None,
    );
    let (status, body) = app.send(request).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    for field in ["cat_name", "weight", "birthdate", "location"] {
        assert!(body["field_errors"][field].is_string(), "{} missing: {}", field, body);
    }

    let (_, cats) = app.send(empty_request("GET", "/cats", None)).await?;
    assert_eq!(cats, json!([]));
    Ok(())
}

#[tokio::test]
async fn create_requires_login() -> Result<()> {
    let app = TestApp::new()?;
    let request = multipart_request("/cats", "garbage", &[("cat_name", "Tom")], None);
    let (status, _) = app.send(request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn created_cat_round_trips() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, token) = app.register("alice").await?;
    let cat = app.create_cat(&token, "Mittens", 61.2, 23.5).await?;

    let (status, fetched) = app
        .send(empty_request("GET", &format!("/cats/{}", id_of(&cat)), None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["cat_name"], "Mittens");
    assert_eq!(fetched["weight"], 4.5);
    assert_eq!(fetched["birthdate"], "2020-05-17");
    assert_eq!(fetched["owner"]["_id"], alice["_id"]);
    assert_eq!(fetched["owner"]["user_name"], "alice");

    let (status, body) = app
        .send(empty_request("GET", &format!("/cats/{}", Uuid::new_v4()), None))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cat not found");
    Ok(())
}

#[tokio::test]
async fn bounding_box_selects_cats_inside() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("alice").await?;
    app.create_cat(&token, "Inside", 61.2, 23.5).await?;
    app.create_cat(&token, "Edge", 61.0, 23.0).await?;
    app.create_cat(&token, "Outside", 62.0, 24.0).await?;

    for path in ["/cats", "/cats/area"] {
        let uri = format!("{}?topRight=61.5,23.8&bottomLeft=61.0,23.0", path);
        let (status, body) = app.send(empty_request("GET", &uri, None)).await?;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let mut names: Vec<&str> = body
            .as_array()
            .map(|cats| cats.iter().filter_map(|c| c["cat_name"].as_str()).collect())
            .unwrap_or_default();
        names.sort_unstable();
        assert_eq!(names, ["Edge", "Inside"], "{}", uri);
    }

    let (_, all) = app.send(empty_request("GET", "/cats", None)).await?;
    assert_eq!(all.as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn bounding_box_needs_both_corners() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .send(empty_request("GET", "/cats?topRight=61.5,23.8", None))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["bottomLeft"].is_string());

    let (status, _) = app.send(empty_request("GET", "/cats/area", None)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(empty_request(
            "GET",
            "/cats/area?topRight=north&bottomLeft=61.0,23.0",
            None,
        ))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn my_cats_lists_only_callers_cats() -> Result<()> {
    let app = TestApp::new()?;
    let (_, alice) = app.register("alice").await?;
    let (_, bob) = app.register("bob").await?;
    app.create_cat(&alice, "Mittens", 61.2, 23.5).await?;
    app.create_cat(&bob, "Tom", 61.2, 23.5).await?;

    let (status, body) = app
        .send(empty_request("GET", "/cats/user", Some(&alice)))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["cat_name"], "Mittens");
    Ok(())
}

#[tokio::test]
async fn owner_updates_and_deletes_own_cat() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("alice").await?;
    let cat = app.create_cat(&token, "Mittens", 61.2, 23.5).await?;
    let uri = format!("/cats/{}", id_of(&cat));

    let (status, body) = app
        .send(json_request(
            "PUT",
            &uri,
            Some(&token),
            json!({ "weight": 5.1, "owner": Uuid::new_v4() }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Cat updated");
    assert_eq!(body["data"]["weight"], 5.1);
    assert_eq!(body["data"]["cat_name"], "Mittens");
    assert_eq!(body["data"]["owner"], cat["owner"]);

    let (status, body) = app
        .send(json_request("PUT", &uri, Some(&token), json!({ "owner": "x" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = app.send(empty_request("DELETE", &uri, Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cat deleted");

    let (status, _) = app.send(empty_request("DELETE", &uri, Some(&token))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn other_users_cat_reads_as_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let (_, alice) = app.register("alice").await?;
    let (_, bob) = app.register("bob").await?;
    let cat = app.create_cat(&alice, "Mittens", 61.2, 23.5).await?;
    let uri = format!("/cats/{}", id_of(&cat));

    let (status, body) = app
        .send(json_request("PUT", &uri, Some(&bob), json!({ "cat_name": "Stolen" })))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cat not found");

    let (status, _) = app.send(empty_request("DELETE", &uri, Some(&bob))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, fetched) = app.send(empty_request("GET", &uri, None)).await?;
    assert_eq!(fetched["cat_name"], "Mittens");
    Ok(())
}

#[tokio::test]
async fn admin_manages_any_cat() -> Result<()> {
    let app = TestApp::new()?;
    let (_, alice) = app.register("alice").await?;
    let (_, admin) = app.admin().await?;
    let first = app.create_cat(&alice, "Mittens", 61.2, 23.5).await?;
    let second = app.create_cat(&alice, "Tom", 61.2, 23.5).await?;

    // Through the regular path, an admin is not scoped to their own cats
    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/cats/{}", id_of(&first)),
            Some(&admin),
            json!({ "cat_name": "Renamed" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["cat_name"], "Renamed");
    assert_eq!(body["data"]["owner"]["user_name"], "alice");

    let admin_uri = format!("/cats/admin/{}", id_of(&second));
    let (status, body) = app
        .send(json_request(
            "PUT",
            &admin_uri,
            Some(&alice),
            json!({ "cat_name": "Mine anyway" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin only");

    let (status, body) = app
        .send(json_request(
            "PUT",
            &admin_uri,
            Some(&admin),
            json!({ "birthdate": "2018-03-04" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["birthdate"], "2018-03-04");

    let (status, _) = app
        .send(empty_request("DELETE", &admin_uri, Some(&admin)))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(empty_request("DELETE", &admin_uri, Some(&admin)))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_account_removes_its_cats() -> Result<()> {
    let app = TestApp::new()?;
    let (_, alice) = app.register("alice").await?;
    app.create_cat(&alice, "Mittens", 61.2, 23.5).await?;

    let (status, _) = app.send(empty_request("DELETE", "/users", Some(&alice))).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, cats) = app.send(empty_request("GET", "/cats", None)).await?;
    assert_eq!(cats, json!([]));
    Ok(())
}
