//! Login and checkout scenarios against the saucedemo storefront

mod checkout;
mod login;

pub use checkout::{CheckoutHappyPath, FullCartFlow};
pub use login::{LoginFailure, LoginSuccess};

use crate::case::Suite;
use crate::context::TestContext;
use shopcheck_browser::verification::expect_text;
use shopcheck_core::{Credentials, Result};
use tracing::debug;

/// CSS selectors for the storefront pages
pub mod selectors {
    // Login
    pub const USERNAME: &str = "input[placeholder='Username']";
    pub const PASSWORD: &str = "input[placeholder='Password']";
    pub const LOGIN_BUTTON: &str = "#login-button";
    pub const ERROR_BANNER: &str = "[data-test='error']";

    // Inventory and cart
    pub const TITLE: &str = ".title";
    pub const ITEM_NAME: &str = ".inventory_item_name";
    pub const DETAILS_NAME: &str = ".inventory_details_name";
    pub const FIRST_PRODUCT_LINK: &str = ".inventory_item a[id$='_title_link']";
    pub const INVENTORY_BUTTON: &str = "button.btn_inventory";
    pub const REMOVE_BUTTON: &str = "button[id^='remove']";
    pub const ADD_TO_CART_BUTTON: &str = "button[id^='add-to-cart']";
    pub const CART_BADGE: &str = ".shopping_cart_badge";
    pub const CART_LINK: &str = ".shopping_cart_link";
    pub const CART_ITEM: &str = ".cart_item";
    pub const CONTINUE_SHOPPING: &str = "#continue-shopping";

    // Checkout
    pub const CHECKOUT: &str = "#checkout";
    pub const FIRST_NAME: &str = "input[placeholder='First Name']";
    pub const LAST_NAME: &str = "input[placeholder='Last Name']";
    pub const POSTAL_CODE: &str = "input[placeholder='Zip/Postal Code']";
    pub const CONTINUE: &str = "#continue";
    pub const SUMMARY_LABEL: &str = ".summary_info_label";
    pub const FINISH: &str = "#finish";

    // Order complete
    pub const PONY_EXPRESS: &str = ".pony_express";
    pub const COMPLETE_HEADER: &str = ".complete-header";
    pub const COMPLETE_TEXT: &str = ".complete-text";
    pub const BACK_HOME: &str = "#back-to-products";
}

/// Title shown on the inventory page
pub const PRODUCTS_TITLE: &str = "Products";

/// Open the storefront and submit the login form
pub async fn login(ctx: &TestContext, creds: &Credentials) -> Result<()> {
    let page = ctx.page()?;
    debug!("Logging in as '{}'", creds.username);

    page.goto(&ctx.fixtures().base_url).await?;
    page.fill(selectors::USERNAME, &creds.username).await?;
    page.fill(selectors::PASSWORD, &creds.password).await?;
    page.click(selectors::LOGIN_BUTTON).await
}

/// Wait for the inventory page title
pub async fn expect_products(ctx: &TestContext) -> Result<()> {
    expect_text(ctx.page()?, selectors::TITLE, PRODUCTS_TITLE, ctx.timeout()).await
}

/// Every scenario, with its ordering directive
pub fn default_suite() -> Suite {
    Suite::new()
        .with(LoginSuccess)
        .with(LoginFailure)
        .with(FullCartFlow)
        .with(CheckoutHappyPath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suite_order() {
        let suite = default_suite();
        let ids: Vec<&str> = suite.ordered(None).iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec![
                "login::login_success",
                "login::login_failure",
                "checkout::full_cart_flow",
                "checkout::happy_path",
            ]
        );
    }
}
