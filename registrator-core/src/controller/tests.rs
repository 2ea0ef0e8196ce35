use super::*;
use crate::store::{MemoryStore, StoreCall};
use std::time::Duration;

const ROOT: &str = "/svc";

fn instance(name: &str, id: &str) -> ServiceInstance {
    ServiceInstance::new(name, id, "10.0.0.5", 8080, Duration::from_secs(30), "8080")
}

async fn create_test_controller(store: &Arc<MemoryStore>) -> RegistrationController {
    let controller = RegistrationController::load(store.clone(), PathNamer::new(ROOT))
        .await
        .unwrap();
    store.clear_calls();
    controller
}

fn declared_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert("/svc/web/_details", r#"{"image":"myorg/web"}"#);
    store
}

#[tokio::test]
async fn test_register_writes_record_with_ttl() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;

    controller
        .register(&instance("myorg/web-8080", "abc123"))
        .await
        .unwrap();

    assert_eq!(
        store.writes(),
        vec![StoreCall::Set {
            path: "/svc/web/abc123".into(),
            value: r#"{"address":"10.0.0.5","port":8080}"#.into(),
            ttl: Duration::from_secs(30),
        }]
    );
}

#[tokio::test]
async fn test_register_undeclared_service_writes_nothing() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;

    let err = controller
        .register(&instance("billing-8080", "abc123"))
        .await
        .unwrap_err();

    match err {
        RegistryError::ServiceNotRegistered(name) => assert_eq!(name, "billing"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.writes().is_empty());
    assert_eq!(
        store.calls(),
        vec![StoreCall::Exists("/svc/billing/_details".into())]
    );
}

#[tokio::test]
async fn test_gate_asks_the_store_not_the_catalog() {
    let store = Arc::new(MemoryStore::new());
    let controller = create_test_controller(&store).await;
    assert!(controller.catalog().is_empty());

    // Declared after the catalog snapshot was taken.
    store.insert("/svc/billing/_details", "{}");

    controller
        .register(&instance("billing-8080", "abc123"))
        .await
        .unwrap();
    assert!(store.value("/svc/billing/abc123").is_some());
}

#[tokio::test]
async fn test_refresh_matches_register() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;
    let web = instance("myorg/web-8080", "abc123");

    controller.register(&web).await.unwrap();
    let registered = store.calls();
    store.clear_calls();

    controller.refresh(&web).await.unwrap();
    assert_eq!(store.calls(), registered);
}

#[tokio::test]
async fn test_refresh_shares_the_register_gate() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;

    let err = controller
        .refresh(&instance("billing-8080", "abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ServiceNotRegistered(_)));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_deregister_twice_succeeds() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;
    let web = instance("myorg/web-8080", "abc123");

    controller.register(&web).await.unwrap();
    controller.deregister(&web).await.unwrap();
    controller.deregister(&web).await.unwrap();

    assert_eq!(store.value("/svc/web/abc123"), None);
}

#[tokio::test]
async fn test_deregister_undeclared_service_is_noop() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;

    controller
        .deregister(&instance("billing-8080", "abc123"))
        .await
        .unwrap();
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_store_failure_is_returned() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;
    store.set_unreachable(true);

    let web = instance("myorg/web-8080", "abc123");
    assert!(matches!(
        controller.register(&web).await,
        Err(RegistryError::StoreUnreachable { .. })
    ));
    assert!(matches!(
        controller.deregister(&web).await,
        Err(RegistryError::StoreUnreachable { .. })
    ));
    assert!(controller.ping().await.is_err());

    store.set_unreachable(false);
    controller.register(&web).await.unwrap();
    controller.ping().await.unwrap();
}

#[tokio::test]
async fn test_resolve_does_not_touch_store() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;

    let resolved = controller.resolve(&instance("myorg/web-8080", "abc123"));
    assert_eq!(
        resolved,
        ResolvedInstance {
            service: "web".into(),
            service_path: "/svc/web/".into(),
            instance_path: "/svc/web/abc123".into(),
        }
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_resolved_service_is_looked_up_in_catalog() {
    let store = declared_store();
    let controller = create_test_controller(&store).await;

    let resolved = controller.resolve(&instance("myorg/web-8080", "abc123"));
    let declared = controller.catalog().get(&resolved.service).unwrap();
    assert_eq!(declared.get_image(), "myorg/web");
    assert_eq!(
        controller.namer().details_path(&resolved.service),
        "/svc/web/_details"
    );
    assert!(controller.catalog().get("billing").is_none());
}

#[tokio::test]
async fn test_corrupt_catalog_aborts_construction() {
    let store = declared_store();
    store.insert("/svc/db/_details", "{{");

    let result = RegistrationController::load(store.clone(), PathNamer::new(ROOT)).await;
    assert!(matches!(result, Err(RegistryError::CatalogCorrupt { .. })));
}
