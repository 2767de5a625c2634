use super::selectors::*;
use super::{expect_products, login};
use crate::case::TestCase;
use crate::context::TestContext;
use async_trait::async_trait;
use shopcheck_browser::verification::{
    expect_contains_text, expect_count, expect_hidden, expect_text, expect_url, expect_url_contains,
    expect_visible,
};
use shopcheck_core::{ensure_that, Result};
use std::time::Duration;
use tracing::{debug, info};

const THANK_YOU: &str = "Thank you for your order!";
const DISPATCHED: &str =
    "Your order has been dispatched, and will arrive just as fast as the pony can get there!";

/// Browse every product, fill the cart, check it and empty it again
pub struct FullCartFlow;

#[async_trait]
impl TestCase for FullCartFlow {
    fn id(&self) -> &str {
        "checkout::full_cart_flow"
    }

    fn order(&self) -> Option<u32> {
        Some(8)
    }

    async fn call(&self, ctx: &TestContext) -> Result<()> {
        let page = ctx.page()?;
        let timeout = ctx.timeout();

        // Login
        login(ctx, ctx.fixtures().user("correctUser1")?).await?;
        expect_products(ctx).await?;
        expect_url_contains(page, "/inventory.html", timeout).await?;

        // Every product opens its detail page
        let product_names = page.texts(ITEM_NAME).await?;
        let total = product_names.len();
        ensure_that!(total > 0, "no products listed on the inventory page");

        for (i, name) in product_names.iter().enumerate() {
            debug!("Opening product {}: {}", i, name);
            page.click_nth(ITEM_NAME, i).await?;
            expect_visible(page, DETAILS_NAME, timeout).await?;
            expect_text(page, DETAILS_NAME, name, timeout).await?;
            page.go_back().await?;
            expect_products(ctx).await?;
        }

        // Add everything to the cart
        let add_count = page.count(INVENTORY_BUTTON).await?;
        ensure_that!(
            add_count == total,
            "expected {} add-to-cart buttons, found {}",
            total,
            add_count
        );
        for i in 0..add_count {
            page.click_nth(INVENTORY_BUTTON, i).await?;
        }
        expect_count(page, REMOVE_BUTTON, total, timeout).await?;

        // Badge shows the item count
        expect_visible(page, CART_BADGE, timeout).await?;
        expect_text(page, CART_BADGE, &total.to_string(), timeout).await?;

        // Cart holds the same products
        page.click(CART_LINK).await?;
        expect_url_contains(page, "cart.html", timeout).await?;
        expect_count(page, CART_ITEM, total, timeout).await?;

        let mut cart_names = page.texts(ITEM_NAME).await?;
        ensure_that!(
            cart_names.len() == total,
            "expected {} product names in the cart, found {}",
            total,
            cart_names.len()
        );
        let mut listed = product_names.clone();
        listed.sort();
        cart_names.sort();
        ensure_that!(
            listed == cart_names,
            "cart contents differ from the listing: listed {:?}, cart {:?}",
            listed,
            cart_names
        );

        // Back to the listing and empty the cart
        page.click(CONTINUE_SHOPPING).await?;
        expect_products(ctx).await?;
        expect_url_contains(page, "/inventory.html", timeout).await?;

        expect_count(page, INVENTORY_BUTTON, total, timeout).await?;
        for i in 0..total {
            page.click_nth(INVENTORY_BUTTON, i).await?;
        }
        expect_count(page, ADD_TO_CART_BUTTON, total, timeout).await?;
        expect_hidden(page, CART_BADGE, Duration::from_secs(3).min(timeout)).await?;

        info!("Cart flow covered {} products", total);
        Ok(())
    }
}

/// Buy the first product and return home
pub struct CheckoutHappyPath;

#[async_trait]
impl TestCase for CheckoutHappyPath {
    fn id(&self) -> &str {
        "checkout::happy_path"
    }

    fn order(&self) -> Option<u32> {
        Some(9)
    }

    async fn call(&self, ctx: &TestContext) -> Result<()> {
        let page = ctx.page()?;
        let timeout = ctx.timeout();

        login(ctx, ctx.fixtures().user("correctUser1")?).await?;
        expect_products(ctx).await?;

        page.click(FIRST_PRODUCT_LINK).await?;
        page.click(ADD_TO_CART_BUTTON).await?;
        page.click(CART_LINK).await?;
        page.click(CHECKOUT).await?;

        page.fill(FIRST_NAME, "John").await?;
        page.fill(LAST_NAME, "Doe").await?;
        page.fill(POSTAL_CODE, "12345").await?;
        page.click(CONTINUE).await?;

        for label in ["Payment Information", "Shipping Information", "Price Total"] {
            expect_contains_text(page, SUMMARY_LABEL, label, timeout).await?;
        }
        expect_url_contains(page, "/checkout-step-two.html", timeout).await?;

        page.click(FINISH).await?;
        expect_visible(page, PONY_EXPRESS, timeout).await?;
        expect_text(page, COMPLETE_HEADER, THANK_YOU, timeout).await?;
        expect_text(page, COMPLETE_TEXT, DISPATCHED, timeout).await?;
        expect_visible(page, BACK_HOME, timeout).await?;
        ctx.screenshot("order-complete").await?;

        page.click(BACK_HOME).await?;
        expect_url(page, &ctx.fixtures().url("inventory.html"), timeout).await
    }
}
