//! Catalog, bundle and order flows against the in-memory store.

mod common;

use common::{usd, TestContext};
use storefront_commerce::prelude::*;

#[tokio::test]
async fn category_names_are_unique_case_insensitively() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    ctx.seed_category("Laptops").await?;

    let duplicate = ctx
        .categories
        .create(CategoryAddRequest { name: "laptops".into() })
        .await;
    assert!(matches!(duplicate, Err(CommerceError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn category_name_length_is_validated() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let short = ctx
        .categories
        .create(CategoryAddRequest { name: "ab".into() })
        .await;
    assert!(matches!(short, Err(CommerceError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn product_create_validates_name_category_and_price() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    ctx.seed_product("SSD", 9999, &category.id).await?;

    // Duplicate name, case-insensitive.
    let duplicate = ctx.seed_product("ssd", 9999, &category.id).await;
    assert!(duplicate.is_err());

    // Dangling category reference.
    let dangling = ctx
        .seed_product("HDD", 4999, &CategoryId::new("ghost"))
        .await;
    assert!(dangling.is_err());
    Ok(())
}

#[tokio::test]
async fn product_update_reconciles_special_properties_by_id() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let product = ctx
        .products
        .create(ProductAddRequest {
            name: "RAM kit".into(),
            description: "DDR5".into(),
            brand: "Acme".into(),
            price: usd(12999),
            stock_quantity: 10,
            image_url: "ram.png".into(),
            category_id: category.id.clone(),
            special_properties: vec![
                SpecialPropertyAddRequest {
                    key: "Capacity".into(),
                    value: "32".into(),
                    size: Some(32),
                    unit: Some("GB".into()),
                    display_order: 0,
                },
                SpecialPropertyAddRequest {
                    key: "Speed".into(),
                    value: "6000".into(),
                    size: Some(6000),
                    unit: Some("MT/s".into()),
                    display_order: 1,
                },
            ],
        })
        .await?;
    let capacity_id = product.special_properties[0].id.clone();

    let updated = ctx
        .products
        .update(ProductUpdateRequest {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            brand: product.brand.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            image_url: product.image_url.clone(),
            category_id: category.id.clone(),
            special_properties: vec![
                // Update the matched property in place.
                SpecialPropertyUpdateRequest {
                    id: Some(capacity_id.clone()),
                    key: "Capacity".into(),
                    value: "64".into(),
                    size: Some(64),
                    unit: Some("GB".into()),
                    display_order: 0,
                },
                // No id: inserted as a new property.
                SpecialPropertyUpdateRequest {
                    id: None,
                    key: "Voltage".into(),
                    value: "1.35".into(),
                    size: None,
                    unit: Some("V".into()),
                    display_order: 2,
                },
            ],
        })
        .await?;

    // Updated match, inserted newcomer, and the omitted "Speed"
    // property kept: merge semantics, never delete.
    assert_eq!(updated.special_properties.len(), 3);
    let capacity = updated
        .special_properties
        .iter()
        .find(|p| p.id == capacity_id)
        .expect("capacity property kept its id");
    assert_eq!(capacity.value, "64");
    assert!(updated.special_properties.iter().any(|p| p.key == "Speed"));
    assert!(updated.special_properties.iter().any(|p| p.key == "Voltage"));
    Ok(())
}

#[tokio::test]
async fn product_search_and_stock() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let ssd = ctx.seed_product("NVMe SSD", 9999, &category.id).await?;
    ctx.seed_product("SATA cable", 499, &category.id).await?;

    let hits = ctx.products.search("nvme").await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, ssd.id);

    assert!(ctx.products.update_stock(&ssd.id, 3).await?);
    let reloaded = ctx.products.get(&ssd.id).await?;
    assert_eq!(reloaded.stock_quantity, 3);

    let negative = ctx.products.update_stock(&ssd.id, -1).await;
    assert!(matches!(negative, Err(CommerceError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn bundle_create_requires_items_and_unique_name() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let ssd = ctx.seed_product("SSD", 9999, &category.id).await?;

    // Zero items: rejected before anything is written.
    let empty = ctx
        .bundles
        .create(BundleAddRequest {
            name: "Empty kit".into(),
            description: String::new(),
            price: usd(100),
            image_url: String::new(),
            items: Vec::new(),
        })
        .await;
    assert!(matches!(empty, Err(CommerceError::Validation(_))));
    assert!(ctx.bundles.get_all(1, 10).await?.is_empty());

    let request = BundleAddRequest {
        name: "Upgrade kit".into(),
        description: "SSD bundle".into(),
        price: usd(8999),
        image_url: "kit.png".into(),
        items: vec![BundleItemRequest {
            product_id: ssd.id.clone(),
            quantity: 1,
            unit_price: usd(8999),
        }],
    };
    ctx.bundles.create(request.clone()).await?;

    let mut duplicate = request;
    duplicate.name = "UPGRADE KIT".into();
    let result = ctx.bundles.create(duplicate).await;
    assert!(matches!(result, Err(CommerceError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn bundle_create_validates_product_refs_eagerly() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let result = ctx
        .bundles
        .create(BundleAddRequest {
            name: "Ghost kit".into(),
            description: String::new(),
            price: usd(100),
            image_url: String::new(),
            items: vec![BundleItemRequest {
                product_id: ProductId::new("ghost"),
                quantity: 1,
                unit_price: usd(100),
            }],
        })
        .await;
    assert!(matches!(result, Err(CommerceError::NotFound { .. })));
    assert!(ctx.bundles.get_all(1, 10).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn bundle_update_merges_items_by_product() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let ssd = ctx.seed_product("SSD", 9999, &category.id).await?;
    let ram = ctx.seed_product("RAM", 2500, &category.id).await?;

    let bundle = ctx
        .bundles
        .create(BundleAddRequest {
            name: "Upgrade kit".into(),
            description: String::new(),
            price: usd(11999),
            image_url: String::new(),
            items: vec![
                BundleItemRequest {
                    product_id: ssd.id.clone(),
                    quantity: 1,
                    unit_price: usd(9500),
                },
                BundleItemRequest {
                    product_id: ram.id.clone(),
                    quantity: 2,
                    unit_price: usd(2400),
                },
            ],
        })
        .await?;

    // The update mentions only the SSD line.
    let updated = ctx
        .bundles
        .update(BundleUpdateRequest {
            id: bundle.id.clone(),
            name: bundle.name.clone(),
            description: bundle.description.clone(),
            price: bundle.price,
            image_url: bundle.image_url.clone(),
            items: vec![BundleItemRequest {
                product_id: ssd.id.clone(),
                quantity: 2,
                unit_price: usd(9000),
            }],
        })
        .await?;

    // Matched line updated in place (same item id); the omitted RAM
    // line survives: merge semantics, never delete.
    assert_eq!(updated.items.len(), 2);
    let ssd_line = updated
        .items
        .iter()
        .find(|i| i.product_id == ssd.id)
        .expect("ssd line present");
    assert_eq!(ssd_line.quantity, 2);
    assert_eq!(ssd_line.unit_price, usd(9000));
    assert!(updated.items.iter().any(|i| i.product_id == ram.id));
    Ok(())
}

#[tokio::test]
async fn bundle_delete_returns_false_when_missing() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    assert!(!ctx.bundles.delete(&BundleId::new("ghost")).await?);
    Ok(())
}

#[tokio::test]
async fn order_total_is_recomputed_from_items() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let user = UserId::new("user-1");
    let order = ctx
        .orders
        .create(OrderAddRequest {
            user_id: user.clone(),
            city: "Cairo".into(),
            country: "Egypt".into(),
            phone: "+20100000000".into(),
            items: vec![
                OrderItemAddRequest {
                    product_id: ProductId::new("p1"),
                    quantity: 3,
                    unit_price: usd(2500),
                },
                OrderItemAddRequest {
                    product_id: ProductId::new("p2"),
                    quantity: 1,
                    unit_price: usd(999),
                },
            ],
        })
        .await?;

    assert_eq!(order.items[0].subtotal, usd(7500));
    assert_eq!(order.total, usd(8499));
    assert!(order.order_date > 0);

    let listed = ctx.orders.get_by_user(&user).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, order.id);
    Ok(())
}

#[tokio::test]
async fn order_update_reconciles_items_by_item_id() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let order = ctx
        .orders
        .create(OrderAddRequest {
            user_id: UserId::new("user-1"),
            city: "Cairo".into(),
            country: "Egypt".into(),
            phone: "+20100000000".into(),
            items: vec![
                OrderItemAddRequest {
                    product_id: ProductId::new("p1"),
                    quantity: 1,
                    unit_price: usd(1000),
                },
                OrderItemAddRequest {
                    product_id: ProductId::new("p2"),
                    quantity: 1,
                    unit_price: usd(2000),
                },
            ],
        })
        .await?;
    let first_item = order.items[0].clone();

    let updated = ctx
        .orders
        .update(OrderUpdateRequest {
            id: order.id.clone(),
            city: "Giza".into(),
            country: "Egypt".into(),
            phone: "+20100000000".into(),
            items: vec![
                // Matched by item id: corrected in place.
                OrderItemUpdateRequest {
                    id: Some(first_item.id.clone()),
                    product_id: first_item.product_id.clone(),
                    quantity: 5,
                    unit_price: usd(1000),
                },
                // No id: appended as a new line.
                OrderItemUpdateRequest {
                    id: None,
                    product_id: ProductId::new("p3"),
                    quantity: 1,
                    unit_price: usd(500),
                },
            ],
        })
        .await?;

    assert_eq!(updated.city, "Giza");
    // Corrected line, appended line, and the omitted p2 line kept.
    assert_eq!(updated.items.len(), 3);
    // Total tracks the item changes: 5*1000 + 2000 + 500.
    assert_eq!(updated.total, usd(7500));
    Ok(())
}

#[tokio::test]
async fn order_delete_requires_existing_order() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let missing = ctx.orders.delete(&OrderId::new("ghost")).await;
    assert!(matches!(missing, Err(CommerceError::NotFound { .. })));

    let order = ctx
        .orders
        .create(OrderAddRequest {
            user_id: UserId::new("user-1"),
            city: "Cairo".into(),
            country: "Egypt".into(),
            phone: "+20100000000".into(),
            items: vec![OrderItemAddRequest {
                product_id: ProductId::new("p1"),
                quantity: 1,
                unit_price: usd(1000),
            }],
        })
        .await?;

    assert!(ctx.orders.delete(&order.id).await?);
    assert!(ctx.orders.get_by_id(&order.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn order_confirmation_mail_is_fire_and_forget() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let user = UserId::new("user-1");
    ctx.identity.register(UserRef {
        id: user.clone(),
        email: "user@example.com".into(),
        display_name: "Test User".into(),
    });

    let request = OrderAddRequest {
        user_id: user.clone(),
        city: "Cairo".into(),
        country: "Egypt".into(),
        phone: "+20100000000".into(),
        items: vec![OrderItemAddRequest {
            product_id: ProductId::new("p1"),
            quantity: 1,
            unit_price: usd(1000),
        }],
    };
    ctx.orders.create(request.clone()).await?;

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "user@example.com");

    // A rejecting transport must not fail order creation.
    let failing = TestContext::new();
    let rejecting = std::sync::Arc::new(MemoryMailer::rejecting());
    let orders = OrderService::new(
        failing.store.clone(),
        rejecting,
        failing.identity.clone(),
    );
    failing.identity.register(UserRef {
        id: user.clone(),
        email: "user@example.com".into(),
        display_name: "Test User".into(),
    });
    let order = orders.create(request).await?;
    assert!(orders.get_by_id(&order.id).await?.is_some());
    Ok(())
}
