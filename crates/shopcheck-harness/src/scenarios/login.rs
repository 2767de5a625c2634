use super::selectors::ERROR_BANNER;
use super::{expect_products, login};
use crate::case::TestCase;
use crate::context::TestContext;
use async_trait::async_trait;
use shopcheck_browser::verification::{expect_contains_text, expect_url_contains, expect_visible};
use shopcheck_core::{ensure_that, Result};
use tracing::info;

const LOGIN_ERROR: &str = "Epic sadface";

/// A valid user lands on the inventory page
pub struct LoginSuccess;

#[async_trait]
impl TestCase for LoginSuccess {
    fn id(&self) -> &str {
        "login::login_success"
    }

    fn order(&self) -> Option<u32> {
        Some(1)
    }

    async fn call(&self, ctx: &TestContext) -> Result<()> {
        let user = ctx.fixtures().user("correctUser1")?;
        login(ctx, user).await?;

        expect_products(ctx).await?;
        expect_url_contains(ctx.page()?, "/inventory.html", ctx.timeout()).await
    }
}

/// Every configured failure user is rejected with an error banner
pub struct LoginFailure;

#[async_trait]
impl TestCase for LoginFailure {
    fn id(&self) -> &str {
        "login::login_failure"
    }

    fn order(&self) -> Option<u32> {
        Some(2)
    }

    async fn call(&self, ctx: &TestContext) -> Result<()> {
        let page = ctx.page()?;

        for key in &ctx.fixtures().login_failure_users {
            let user = ctx.fixtures().user(key)?;
            login(ctx, user).await?;

            expect_visible(page, ERROR_BANNER, ctx.timeout()).await?;
            expect_contains_text(page, ERROR_BANNER, LOGIN_ERROR, ctx.timeout()).await?;

            let url = page.current_url().await?;
            ensure_that!(
                !url.contains("/inventory.html"),
                "user '{}' reached the inventory page: {}",
                key,
                url
            );
            info!("Login rejected for {}", key);
        }

        Ok(())
    }
}
