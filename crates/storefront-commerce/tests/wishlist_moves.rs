//! Wishlist flows, including the cross-aggregate moves into the cart
//! and their partial-failure batch semantics.

mod common;

use common::TestContext;
use storefront_commerce::prelude::*;

#[tokio::test]
async fn adding_the_same_product_twice_conflicts() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let product = ctx.seed_product("GPU", 79999, &category.id).await?;
    let user = UserId::new("user-1");

    ctx.wishlists.add_item(&user, &product.id).await?;
    let second = ctx.wishlists.add_item(&user, &product.id).await;
    assert!(matches!(second, Err(CommerceError::Conflict(_))));

    // Exactly one entry for the product.
    let wishlist = ctx.wishlists.get_by_user(&user).await?;
    assert_eq!(wishlist.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn get_or_create_is_idempotent() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let user = UserId::new("user-1");

    let first = ctx.wishlists.get_or_create(&user).await?;
    let second = ctx.wishlists.get_or_create(&user).await?;
    assert_eq!(first.id, second.id);
    Ok(())
}

#[tokio::test]
async fn moving_one_item_updates_both_aggregates() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let product = ctx.seed_product("GPU", 79999, &category.id).await?;
    let user = UserId::new("user-1");

    // Seed the cart with one unit so the move accumulates onto it.
    ctx.carts.add_or_update_item(&user, &product.id, 1).await?;
    let wishlist = ctx.wishlists.add_item(&user, &product.id).await?;
    let item_id = wishlist.items[0].id.clone();

    assert!(ctx.wishlists.move_item_to_cart(&user, &item_id, 2).await?);

    let cart = ctx.carts.get_cart(&user).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    let wishlist = ctx.wishlists.get_by_user(&user).await?;
    assert!(wishlist.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_move_leaves_both_aggregates_untouched() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let product = ctx.seed_product("GPU", 79999, &category.id).await?;
    let user = UserId::new("user-1");

    let wishlist = ctx.wishlists.add_item(&user, &product.id).await?;
    let item_id = wishlist.items[0].id.clone();

    // The product disappears before the move.
    assert!(ctx.products.delete(&product.id).await?);

    let result = ctx.wishlists.move_item_to_cart(&user, &item_id, 1).await;
    assert!(matches!(result, Err(CommerceError::NotFound { .. })));

    // Neither side effect is observable: the entry is still on the
    // wishlist and no cart item appeared.
    let wishlist = ctx.wishlists.get_by_user(&user).await?;
    assert_eq!(wishlist.items.len(), 1);
    assert!(!ctx.carts.is_product_in_cart(&user, &product.id).await?);
    Ok(())
}

#[tokio::test]
async fn batch_move_partially_succeeds_and_reports() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let gpu = ctx.seed_product("GPU", 79999, &category.id).await?;
    let ssd = ctx.seed_product("SSD", 9999, &category.id).await?;
    let ram = ctx.seed_product("RAM", 2500, &category.id).await?;
    let user = UserId::new("user-1");

    ctx.wishlists.add_item(&user, &gpu.id).await?;
    ctx.wishlists.add_item(&user, &ssd.id).await?;
    ctx.wishlists.add_item(&user, &ram.id).await?;

    // One of the three products vanishes.
    assert!(ctx.products.delete(&ssd.id).await?);

    let report = ctx.wishlists.move_all_to_cart(&user).await?;
    assert_eq!(report.moved_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].product_id, ssd.id);

    // The two movable products are in the cart, their wishlist entries
    // gone; the failed entry stays in place.
    assert!(ctx.carts.is_product_in_cart(&user, &gpu.id).await?);
    assert!(ctx.carts.is_product_in_cart(&user, &ram.id).await?);
    let wishlist = ctx.wishlists.get_by_user(&user).await?;
    assert_eq!(wishlist.items.len(), 1);
    assert_eq!(wishlist.items[0].product_id, ssd.id);
    Ok(())
}

#[tokio::test]
async fn batch_move_errors_only_when_nothing_moved() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let gpu = ctx.seed_product("GPU", 79999, &category.id).await?;
    let user = UserId::new("user-1");

    ctx.wishlists.add_item(&user, &gpu.id).await?;
    assert!(ctx.products.delete(&gpu.id).await?);

    let result = ctx.wishlists.move_all_to_cart(&user).await;
    assert!(matches!(
        result,
        Err(CommerceError::PartialFailure { failed: 1 })
    ));

    // Nothing committed: the entry is still on the wishlist.
    let wishlist = ctx.wishlists.get_by_user(&user).await?;
    assert_eq!(wishlist.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn batch_move_of_empty_wishlist_reports_nothing() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let user = UserId::new("user-1");
    ctx.wishlists.get_or_create(&user).await?;

    let report = ctx.wishlists.move_all_to_cart(&user).await?;
    assert_eq!(report.moved_count(), 0);
    assert_eq!(report.failed_count(), 0);
    Ok(())
}

#[tokio::test]
async fn remove_and_clear() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let category = ctx.seed_category("Components").await?;
    let gpu = ctx.seed_product("GPU", 79999, &category.id).await?;
    let ssd = ctx.seed_product("SSD", 9999, &category.id).await?;
    let user = UserId::new("user-1");

    ctx.wishlists.add_item(&user, &gpu.id).await?;
    ctx.wishlists.add_item(&user, &ssd.id).await?;

    assert!(ctx.wishlists.remove_item(&user, &gpu.id).await?);
    assert!(!ctx.wishlists.remove_item(&user, &gpu.id).await?);
    assert!(ctx.wishlists.is_in_wishlist(&user, &ssd.id).await?);

    assert!(ctx.wishlists.clear(&user).await?);
    let wishlist = ctx.wishlists.get_by_user(&user).await?;
    assert!(wishlist.items.is_empty());
    Ok(())
}
