//! End-to-end recommendation through configured stores, the ranking
//! pipeline, the history database and the HTTP router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use gift_search::ProviderConfig;
use gift_search::config::{
    FixtureConfig, MercadoLivreConfig, StorefrontConfig, StorefrontSelectors,
};
use giftgenius::profile::AgeField;
use giftgenius::{AppConfig, GiftService, ProfileRequest};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn music_lover() -> ProfileRequest {
    ProfileRequest {
        age: Some(AgeField::Number(30)),
        interests: Some("música".into()),
        personality: Some("social".into()),
        budget: Some("50-100".into()),
        occasion: Some("natal".into()),
        plan: Some("essential".into()),
        ..Default::default()
    }
}

/// Mercado Livre and a broken storefront on one mock server, plus the
/// fixture store.
async fn config_with_mock_stores(server: &MockServer, db_dir: &tempfile::TempDir) -> AppConfig {
    Mock::given(method("GET"))
        .and(path("/sites/MLB/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "title": "Fone de ouvido música",
                "price": 89.9,
                "thumbnail": "https://img.example/fone-I.jpg",
                "permalink": "https://produto.example/fone",
                "sold_quantity": 2500
            }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/loja/busca"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;

    let mut config = AppConfig::default();
    config.history.db_path = db_dir.path().join("history.db");
    config.search.timeout_seconds = 2;
    config.search.providers = vec![
        ProviderConfig::MercadoLivre(MercadoLivreConfig {
            base_url: server.uri(),
            site_id: "MLB".into(),
        }),
        ProviderConfig::Storefront(StorefrontConfig {
            name: "Loja Fora do Ar".into(),
            base_url: server.uri(),
            search_url: format!("{}/loja/busca?q={{query}}", server.uri()),
            selectors: StorefrontSelectors {
                item: ".card".into(),
                name: ".title".into(),
                price: ".price".into(),
                image: "img".into(),
                link: "a".into(),
            },
            default_rating: 4.5,
        }),
        ProviderConfig::Fixture(FixtureConfig {
            store_name: "Demo".into(),
        }),
    ];
    config
}

#[tokio::test]
async fn recommendation_merges_stores_and_records_history() {
    let server = MockServer::start().await;
    let db_dir = tempfile::tempdir().unwrap();
    let config = config_with_mock_stores(&server, &db_dir).await;

    let service = GiftService::from_config(&config).unwrap();
    let rec = service.find_gifts(&music_lover(), Some(11)).await.unwrap();

    // Three keywords: one Mercado Livre item and five fixture items each;
    // the broken storefront contributes nothing.
    assert_eq!(rec.analysis.total_found, 18);
    assert_eq!(rec.analysis.selected, 15);
    assert_eq!(rec.gifts.len(), 15);
    assert_eq!(rec.max_results, 15);

    // 30 in range + 43 estimated rating + 20 capped reviews + 15 for "música".
    let top = &rec.gifts[0];
    assert_eq!(top.item.name, "Fone de ouvido música");
    assert_eq!(top.item.store_name, "Mercado Livre");
    assert!((top.score - 108.0).abs() < 1e-9);
    for pair in rec.gifts.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let stats = service.statistics().await.unwrap();
    assert_eq!(stats.total_searches, 1);
    assert_eq!(stats.total_gifts_found, 15);

    let history = service.history().unwrap();
    let recent = history.recent_searches(5).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, rec.search_id.unwrap());
    assert_eq!(recent[0].user_id, Some(11));
    assert_eq!(recent[0].total_found, 18);
}

#[tokio::test]
async fn http_round_trip_with_feedback() {
    let server = MockServer::start().await;
    let db_dir = tempfile::tempdir().unwrap();
    let config = config_with_mock_stores(&server, &db_dir).await;
    let app = giftgenius::server::router(GiftService::from_config(&config).unwrap());

    let body = serde_json::to_string(&music_lover()).unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/gifts/find-gifts")
                .header("content-type", "application/json")
                .header(giftgenius::server::USER_ID_HEADER, "5")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let search_id = json["searchId"].as_i64().unwrap();
    assert_eq!(json["gifts"][0]["store_name"], "Mercado Livre");

    let feedback = json!({
        "userId": 5,
        "searchId": search_id,
        "rating": 5,
        "satisfied": true
    });
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/gifts/feedback")
                .header("content-type", "application/json")
                .body(Body::from(feedback.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(stats["total_searches"], 1);
    assert_eq!(stats["satisfied_users"], 1);
    assert_eq!(stats["satisfaction_rate"], 100.0);
}

#[tokio::test]
async fn invalid_profile_records_nothing() {
    let db_dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.history.db_path = db_dir.path().join("history.db");
    config.search.providers = vec![ProviderConfig::Fixture(FixtureConfig {
        store_name: "Demo".into(),
    })];

    let service = GiftService::from_config(&config).unwrap();
    let request = ProfileRequest {
        age: None,
        ..music_lover()
    };
    let err = service.find_gifts(&request, None).await.unwrap_err();
    assert!(matches!(err, giftgenius::GiftError::InvalidProfile(_)));
    assert_eq!(service.statistics().await.unwrap().total_searches, 0);
}
