mod common;

use assert_matches::assert_matches;
use common::TestWorkflow;
use rust_decimal_macros::dec;
use school_assets::{
    commands::inventory_items::AddStockItemCommand,
    errors::ServiceError,
    models::{NotificationCategory, RequestStatus},
    services::dashboard::DashboardStats,
    StockTier,
};

#[tokio::test]
async fn restock_and_consume_recompute_the_tier() {
    let app = TestWorkflow::new();
    let markers = app.seed_item("Whiteboard Markers", 45, 50).await;

    let restocked = app.services.inventory.restock(&markers.id, 5).await.unwrap();
    assert_eq!(restocked.previous, 45);
    assert_eq!(restocked.previous_tier, StockTier::Low);
    assert_eq!(restocked.item.current, 50);
    assert_eq!(restocked.tier, StockTier::Good);

    let consumed = app.services.inventory.consume(&markers.id, 20).await.unwrap();
    assert_eq!(consumed.item.current, 30);
    assert_eq!(consumed.tier, StockTier::Low);

    let level = app.services.inventory.get_item(&markers.id).await.unwrap();
    assert_eq!(level.item.current, 30);
    assert_eq!(level.tier, StockTier::Low);
}

#[tokio::test]
async fn consuming_more_than_on_hand_is_refused() {
    let app = TestWorkflow::new();
    let beakers = app.seed_item("Chemistry Beakers", 3, 25).await;

    assert_matches!(
        app.services.inventory.consume(&beakers.id, 4).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_eq!(app.item(&beakers.id).await.current, 3);

    let emptied = app.services.inventory.consume(&beakers.id, 3).await.unwrap();
    assert_eq!(emptied.item.current, 0);
    assert_eq!(emptied.tier, StockTier::Critical);
}

#[tokio::test]
async fn restocking_past_the_stock_limit_is_refused() {
    let app = TestWorkflow::new();
    let paper = app.seed_item("A4 Paper Reams", u32::MAX - 5, 50).await;

    assert_matches!(
        app.services.inventory.restock(&paper.id, 10).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_eq!(app.item(&paper.id).await.current, u32::MAX - 5);

    let topped_up = app.services.inventory.restock(&paper.id, 5).await.unwrap();
    assert_eq!(topped_up.item.current, u32::MAX);
}

#[tokio::test]
async fn dropping_into_critical_raises_a_notification() {
    let app = TestWorkflow::new();
    let paper = app.seed_item("A4 Paper Reams", 120, 50).await;

    app.services.inventory.consume(&paper.id, 95).await.unwrap();
    let events = app.ctx.notifications.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Critical Stock Level");
    assert_eq!(events[0].category, NotificationCategory::Error);

    // already critical: no second alert
    app.services.inventory.consume(&paper.id, 5).await.unwrap();
    assert_eq!(app.ctx.notifications.events().len(), 1);
}

#[tokio::test]
async fn listing_filters_by_tier_and_alerts_put_critical_first() {
    let app = TestWorkflow::new();
    app.seed_item("Whiteboard Markers", 45, 50).await;
    app.seed_item("A4 Paper Reams", 120, 50).await;
    app.seed_item("Printer Ink Cartridges", 7, 15).await;
    app.seed_item("Cleaning Supplies", 25, 20).await;

    let good = app
        .services
        .inventory
        .list_items(Some(StockTier::Good))
        .await
        .unwrap();
    assert_eq!(good.len(), 2);
    assert!(good.iter().all(|level| level.tier == StockTier::Good));

    let alerts = app.services.inventory.low_stock_alerts().await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].item.name, "Printer Ink Cartridges");
    assert_eq!(alerts[0].tier, StockTier::Critical);
    assert_eq!(alerts[0].shortage, 8);
    assert_eq!(alerts[1].item.name, "Whiteboard Markers");
    assert_eq!(alerts[1].shortage, 5);
}

#[tokio::test]
async fn reorder_requests_the_shortage() {
    let app = TestWorkflow::new();
    let ink = app.seed_item("Printer Ink Cartridges", 8, 15).await;

    let request = app.services.inventory.reorder(&ink.id).await.unwrap();
    assert_eq!(request.item_name, "Printer Ink Cartridges");
    assert_eq!(request.quantity, 7);
    assert_eq!(request.estimated_cost, dec!(70));
    assert_eq!(
        request.justification,
        "Low stock alert - Current: 8, Required: 15"
    );
    assert_eq!(request.status, RequestStatus::Pending);

    let approved = app.services.procurement.approve(&request.id).await.unwrap();
    assert_eq!(approved.item.id, ink.id);
    assert_eq!(approved.item.current, 15);
    assert_eq!(approved.tier, StockTier::Good);

    assert_matches!(
        app.services.inventory.reorder(&ink.id).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn deleted_items_are_gone() {
    let app = TestWorkflow::new();
    let item = app.seed_item("Globes", 2, 1).await;

    let deleted = app.services.inventory.delete_item(&item.id).await.unwrap();
    assert_eq!(deleted.id, item.id);

    assert_matches!(
        app.services.inventory.get_item(&item.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        app.services.inventory.delete_item(&item.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn duplicate_names_are_refused() {
    let app = TestWorkflow::new();
    app.seed_item("Globes", 2, 1).await;

    let result = app
        .services
        .inventory
        .add_item(AddStockItemCommand {
            name: " GLOBES".into(),
            category: "Geography".into(),
            current: 1,
            minimum: 1,
            unit: "pcs".into(),
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn dashboard_counts_reflect_the_store() {
    let app = TestWorkflow::new();
    app.seed_item("Whiteboard Markers", 45, 50).await;
    app.seed_item("A4 Paper Reams", 120, 50).await;
    let purchase = app.submit_purchase("Chairs", 25).await;
    app.submit_purchase("Desks", 4).await;
    app.submit_access("Jordan Lee", "jordan.lee@school.com").await;
    app.services.procurement.reject(&purchase.id).await.unwrap();

    assert_eq!(
        app.services.dashboard.stats().await.unwrap(),
        DashboardStats {
            stock_items: 2,
            low_stock_alerts: 1,
            pending_purchases: 1,
            pending_access_requests: 1,
            unread_notifications: 2,
        }
    );
}
