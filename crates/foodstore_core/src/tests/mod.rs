

use std::{collections::HashSet, time::Duration};

use serde_json::{Number, json};
use tower::Service;

use crate::catalog::{
    api::{FoodRequest, FoodResponse, foods::FoodApiService},
    error::CatalogError,
    init_catalog, init_catalog_with_snapshot,
    naming::{FoodId, FoodKey},
};
use fixtures::{StalledStore, almond_milk_payload, food, patch, payload_named};

#[tokio::test]
async fn integration_create_then_get_by_id() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    let input = food(almond_milk_payload());
    let created = create!(foods, input.clone());
    assert_eq!(created.food, input);

    let FoodResponse::Record(fetched) = get!(foods, FoodKey::Id(created.id)).unwrap() else {
        panic!("Expected FoodResponse::Record");
    };
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn integration_get_by_name_first_match() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    create!(foods, food(payload_named("Oat Milk")));
    let first = create!(foods, food(payload_named("Soy Milk")));
    create!(foods, food(payload_named("Soy Milk")));

    assert_eq!(
        get!(foods, FoodKey::resolve("Soy Milk")).unwrap(),
        FoodResponse::Record(first)
    );
    assert_not_found!(foods, FoodKey::resolve("Rice Milk"));
}

#[tokio::test]
async fn integration_delete_is_terminal() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    let created = create!(foods, food(almond_milk_payload()));
    assert_eq!(delete!(foods, FoodKey::Id(created.id)).unwrap(), FoodResponse::Deleted(created.id));
    assert_not_found!(foods, FoodKey::Id(created.id));
    assert_eq!(delete!(foods, FoodKey::Id(created.id)).unwrap_err(), CatalogError::NotFound);
    assert_eq!(
        update!(foods, FoodKey::Id(created.id), patch(json!({ "serving_size": "1l" })))
            .unwrap_err(),
        CatalogError::NotFound
    );

    // Same name again: a new, distinct record
    let recreated = create!(foods, food(almond_milk_payload()));
    assert_ne!(recreated.id, created.id);
    assert_not_found!(foods, FoodKey::Id(created.id));
}

#[tokio::test]
async fn integration_delete_by_name() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    let first = create!(foods, food(payload_named("Kefir")));
    let second = create!(foods, food(payload_named("Kefir")));

    assert_eq!(
        delete!(foods, FoodKey::resolve("Kefir")).unwrap(),
        FoodResponse::Deleted(first.id)
    );
    assert_eq!(get!(foods, FoodKey::resolve("Kefir")).unwrap(), FoodResponse::Record(second));
    delete!(foods, FoodKey::resolve("Kefir")).unwrap();
    assert_eq!(delete!(foods, FoodKey::resolve("Kefir")).unwrap_err(), CatalogError::NotFound);
}

#[tokio::test]
async fn integration_update_is_a_merge() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    let created = create!(foods, food(almond_milk_payload()));
    let FoodResponse::Record(updated) = update!(
        foods,
        FoodKey::Id(created.id),
        patch(json!({ "id": FoodId::generate().to_string(), "country_of_origin": "Canada" }))
    )
    .unwrap() else {
        panic!("Expected FoodResponse::Record");
    };

    let mut expected = created.clone();
    expected.food.country_of_origin = "Canada".to_string();
    assert_eq!(updated, expected);
    assert_eq!(get!(foods, FoodKey::Id(created.id)).unwrap(), FoodResponse::Record(expected));
}

#[tokio::test]
async fn integration_update_nested_nutrition() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    let created = create!(foods, food(almond_milk_payload()));
    let FoodResponse::Record(updated) = update!(
        foods,
        FoodKey::resolve("Almond Milk"),
        patch(json!({ "nutritional_information": { "calories": 35, "fat": 2 } }))
    )
    .unwrap() else {
        panic!("Expected FoodResponse::Record");
    };

    let nutrition = &updated.food.nutritional_information;
    assert_eq!(nutrition.calories, Number::from(35));
    assert_eq!(nutrition.fat, Number::from(2));
    assert_eq!(nutrition.fiber, created.food.nutritional_information.fiber);
    assert_eq!(nutrition.carbohydrates, created.food.nutritional_information.carbohydrates);
}

#[tokio::test]
async fn integration_update_idempotent() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    let created = create!(foods, food(almond_milk_payload()));
    let changes = patch(json!({
        "description": "Unsweetened",
        "health_benefits": ["low calorie", "calcium"]
    }));
    let once = update!(foods, FoodKey::Id(created.id), changes.clone()).unwrap();
    let twice = update!(foods, FoodKey::Id(created.id), changes).unwrap();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn integration_rename_then_lookup_by_new_name() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);

    let created = create!(foods, food(almond_milk_payload()));
    update!(foods, FoodKey::resolve("Almond Milk"), patch(json!({ "food_item_name": "Nut Milk" })))
        .unwrap();

    assert_not_found!(foods, FoodKey::resolve("Almond Milk"));
    let FoodResponse::Record(renamed) = get!(foods, FoodKey::resolve("Nut Milk")).unwrap() else {
        panic!("Expected FoodResponse::Record");
    };
    assert_eq!(renamed.id, created.id);
}

#[tokio::test]
async fn integration_list_after_creates_and_deletes() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, _) = init_catalog(None);
    assert!(list!(foods).is_empty());

    let mut created = Vec::new();
    for i in 0..10 {
        created.push(create!(foods, food(payload_named(&format!("Food {i}")))));
    }
    for record in created.iter().step_by(3) {
        delete!(foods, FoodKey::Id(record.id)).unwrap();
    }

    let listed = list!(foods);
    assert_eq!(listed.len(), 10 - 4);
    let ids: HashSet<_> = listed.iter().map(|record| record.id).collect();
    assert_eq!(ids.len(), listed.len());
    let expected: Vec<_> =
        created.into_iter().enumerate().filter(|(i, _)| i % 3 != 0).map(|(_, r)| r).collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn integration_concurrent_updates_stay_consistent() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let (mut foods, store) = init_catalog(None);

    let created = create!(foods, food(almond_milk_payload()));
    let handles: Vec<_> = (0..32)
        .map(|i| {
            let mut foods = foods.clone();
            tokio::spawn(async move {
                foods
                    .call(FoodRequest::UpdateById {
                        id: created.id,
                        patch: patch(json!({ "serving_size": format!("{i}ml") })),
                    })
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.len(), 1);
    let FoodResponse::Record(record) = get!(foods, FoodKey::Id(created.id)).unwrap() else {
        panic!("Expected FoodResponse::Record");
    };
    assert!(record.food.serving_size.ends_with("ml"));
}

#[tokio::test]
async fn integration_storage_timeout() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let mut foods =
        FoodApiService::new(StalledStore).with_storage_timeout(Some(Duration::from_millis(5)));

    assert!(matches!(
        foods.call(FoodRequest::ListAll).await.unwrap_err(),
        CatalogError::StorageUnavailable(_)
    ));
    assert!(matches!(
        foods.call(FoodRequest::Create(food(almond_milk_payload()))).await.unwrap_err(),
        CatalogError::StorageUnavailable(_)
    ));
}

#[tokio::test]
async fn integration_snapshot_survives_restart() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("food-nutrition-db.json");

    let (mut foods, store) = init_catalog_with_snapshot(&path, None).await.unwrap();
    let kept = create!(foods, food(payload_named("Miso")));
    let dropped = create!(foods, food(payload_named("Natto")));
    delete!(foods, FoodKey::resolve("Natto")).unwrap();
    store.flush().await.unwrap();
    drop(foods);

    let (mut foods, _) = init_catalog_with_snapshot(&path, None).await.unwrap();
    assert_eq!(list!(foods), vec![kept.clone()]);
    assert_eq!(get!(foods, FoodKey::Id(kept.id)).unwrap(), FoodResponse::Record(kept));
    assert_not_found!(foods, FoodKey::Id(dropped.id));
}

#[tokio::test]
async fn integration_failed_create_leaves_no_record() {
    #[cfg(feature = "foodstore_tracing")]
    crate::foodstore_tracing::init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("food-nutrition-db.json");

    let (mut foods, store) = init_catalog_with_snapshot(&path, None).await.unwrap();
    assert!(matches!(
        foods.call(FoodRequest::Create(food(almond_milk_payload()))).await.unwrap_err(),
        CatalogError::StorageUnavailable(_)
    ));
    assert!(list!(foods).is_empty());
    assert!(store.is_empty());
    assert_not_found!(foods, FoodKey::resolve("Almond Milk"));

    // Once storage is back, a retry creates exactly one record
    std::fs::create_dir(dir.path().join("missing")).unwrap();
    let created = create!(foods, food(almond_milk_payload()));
    assert_eq!(list!(foods), vec![created]);
}
