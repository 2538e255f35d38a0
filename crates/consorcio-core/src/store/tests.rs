//! Store integration tests against the mock data-store server

use serde_json::json;

use crate::error::Error;
use crate::models::{NewExpense, NewProject, ProjectPatch};
use crate::test_utils::MockStoreServer;

use super::ExpenseFilter;

fn new_expense(building: &str, month: &str, amount: f64) -> NewExpense {
    NewExpense {
        amount,
        description: Some("Mantenimiento".to_string()),
        building_id: building.to_string(),
        provider_id: None,
        provider_name: None,
        provider_category: None,
        expense_reporting_month: month.to_string(),
    }
}

#[tokio::test]
async fn bulk_insert_returns_every_submitted_expense() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    let rows = vec![
        new_expense("b1", "2024-11", 100.50),
        new_expense("b1", "2024-11", 50.0),
    ];
    let created = client.insert_expenses(&rows).await.unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].amount, 100.50);
    assert_eq!(created[1].amount, 50.0);
    assert_eq!(server.count("expenses"), 2);
}

#[tokio::test]
async fn month_filtered_fetch_returns_exactly_the_submitted_records() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    client
        .insert_expenses(&[
            new_expense("b1", "2024-11", 100.50),
            new_expense("b1", "2024-11", 50.0),
        ])
        .await
        .unwrap();
    client
        .insert_expenses(&[new_expense("b1", "2024-10", 7.0)])
        .await
        .unwrap();

    let filter = ExpenseFilter::building("b1").with_month("2024-11");
    let fetched = client.list_expenses(&filter).await.unwrap();
    assert_eq!(fetched.len(), 2);
    let total: f64 = fetched.iter().map(|e| e.amount).sum();
    assert_eq!(total, 150.50);
}

#[tokio::test]
async fn expense_listing_is_scoped_to_the_building() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    client
        .insert_expenses(&[
            new_expense("b1", "2024-11", 10.0),
            new_expense("b2", "2024-11", 99.0),
        ])
        .await
        .unwrap();

    let fetched = client
        .list_expenses(&ExpenseFilter::building("b1"))
        .await
        .unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].building_id, "b1");

    // A blank building id is refused outright.
    let err = client
        .list_expenses(&ExpenseFilter::building(""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[tokio::test]
async fn reporting_months_are_distinct_and_descending() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    client
        .insert_expenses(&[
            new_expense("b1", "2024-09", 1.0),
            new_expense("b1", "2024-11", 2.0),
            new_expense("b1", "2024-10", 3.0),
            new_expense("b1", "2024-11", 4.0),
        ])
        .await
        .unwrap();

    let months = client.reporting_months("b1").await.unwrap();
    assert_eq!(months, vec!["2024-11", "2024-10", "2024-09"]);
}

#[tokio::test]
async fn invalid_bulk_submission_persists_nothing() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    let rows = vec![
        new_expense("b1", "2024-11", 10.0),
        new_expense("b1", "noviembre", 20.0),
    ];
    let err = client.insert_expenses(&rows).await.unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
    assert_eq!(server.count("expenses"), 0);

    let err = client.insert_expenses(&[]).await.unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[tokio::test]
async fn project_lifecycle() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    let created = client
        .insert_project(&NewProject {
            cost: 500.0,
            description: Some("Pintura frente".to_string()),
            status: true,
            provider_id: None,
            building_id: Some("b1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(created.cost, 500.0);

    let fetched = client.get_project(&created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);

    let patch = ProjectPatch {
        cost: Some(650.0),
        status: Some(false),
        ..Default::default()
    };
    let updated = client.update_project(&created.id, &patch).await.unwrap();
    assert_eq!(updated.cost, 650.0);
    assert!(!updated.status);

    client.delete_project(&created.id).await.unwrap();
    assert_eq!(server.count("projects"), 0);
}

#[tokio::test]
async fn deleting_a_missing_project_succeeds() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    client
        .insert_project(&NewProject {
            cost: 10.0,
            description: None,
            status: true,
            provider_id: None,
            building_id: None,
        })
        .await
        .unwrap();

    client.delete_project("does-not-exist").await.unwrap();
    // Existing rows are untouched.
    assert_eq!(server.count("projects"), 1);
}

#[tokio::test]
async fn updating_a_missing_project_fails_with_not_found() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    let patch = ProjectPatch {
        cost: Some(1.0),
        ..Default::default()
    };
    let err = client.update_project("does-not-exist", &patch).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn update_rejects_empty_and_non_finite_patches() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    let err = client
        .update_project("p1", &ProjectPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));

    let patch = ProjectPatch {
        cost: Some(f64::INFINITY),
        ..Default::default()
    };
    let err = client.update_project("p1", &patch).await.unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[tokio::test]
async fn project_listing_resolves_provider_and_building() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    server.seed(
        "provider_categories",
        vec![json!({"id": "c1", "name": "Limpieza"})],
    );
    server.seed(
        "providers",
        vec![json!({"id": "prov1", "name": "Limpieza Total", "category_id": "c1"})],
    );
    server.seed(
        "buildings",
        vec![json!({"id": "b1", "address": "Av. Rivadavia 1234", "total_units": 12})],
    );
    server.seed(
        "projects",
        vec![json!({
            "id": "p1",
            "cost": 800.0,
            "description": "Limpieza de tanques",
            "status": true,
            "provider_id": "prov1",
            "building_id": "b1",
            "created_at": "2024-11-05T12:00:00Z"
        })],
    );

    let projects = client.list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].provider_name.as_deref(), Some("Limpieza Total"));
    assert_eq!(projects[0].provider_category.as_deref(), Some("Limpieza"));
    assert_eq!(
        projects[0].building_address.as_deref(),
        Some("Av. Rivadavia 1234")
    );
}

#[tokio::test]
async fn provider_listing_resolves_category_names() {
    let server = MockStoreServer::start().await;
    let client = server.client();

    server.seed(
        "provider_categories",
        vec![
            json!({"id": "c1", "name": "Seguridad"}),
            json!({"id": "c2", "name": "Comisión Bancaria"}),
        ],
    );
    server.seed(
        "providers",
        vec![
            json!({"id": "prov1", "name": "Alarmas SA", "category_id": "c1"}),
            json!({"id": "prov2", "name": "Banco Provincia", "category_id": "c2"}),
            json!({"id": "prov3", "name": "Sin Rubro", "category_id": null}),
        ],
    );

    let providers = client.list_providers().await.unwrap();
    assert_eq!(providers.len(), 3);
    let by_name = |name: &str| {
        providers
            .iter()
            .find(|p| p.name == name)
            .unwrap()
            .category_name
            .clone()
    };
    assert_eq!(by_name("Alarmas SA").as_deref(), Some("Seguridad"));
    assert_eq!(
        by_name("Banco Provincia").as_deref(),
        Some("Comisión Bancaria")
    );
    assert_eq!(by_name("Sin Rubro"), None);
}

#[tokio::test]
async fn health_check_reflects_store_reachability() {
    let mut server = MockStoreServer::start().await;
    let client = server.client();
    assert!(client.health_check().await);

    server.stop();
    // Give the listener a moment to shut down.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!client.health_check().await);
}
