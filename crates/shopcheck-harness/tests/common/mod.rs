//! A scripted saucedemo storefront for driving the runner without Chrome.

#![allow(dead_code)]

use async_trait::async_trait;
use shopcheck_browser::testing::{ScriptedDom, ScriptedElement, ScriptedPage};
use shopcheck_browser::Page;
use shopcheck_core::{Fixtures, Result, ShopError, SuiteConfig};
use shopcheck_harness::scenarios::selectors::*;
use shopcheck_harness::{Runner, SessionFactory};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "https://shop.test/";

pub const PRODUCTS: &[&str] = &[
    "Sauce Labs Backpack",
    "Sauce Labs Bike Light",
    "Sauce Labs Bolt T-Shirt",
    "Sauce Labs Onesie",
];

/// Bugs the storefront can be started with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    None,
    /// The cart badge shows one item less than the cart holds
    BadgeCountsOneLess,
    /// `locked_out_user` is let in
    LockedUserLogsIn,
}

struct Shop {
    cart: BTreeSet<usize>,
    error: Option<String>,
    defect: Defect,
}

fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

fn element(texts: Vec<String>) -> ScriptedElement {
    ScriptedElement {
        texts,
        visible: true,
        enabled: true,
    }
}

fn repeated(text: &str, n: usize) -> ScriptedElement {
    element(vec![text.to_string(); n])
}

fn detail_id(path: &str) -> Option<usize> {
    path.strip_prefix("inventory-item.html?id=")?.parse().ok()
}

fn render(dom: &mut ScriptedDom, shop: &Shop) {
    dom.elements.clear();
    let path = dom.url.strip_prefix(BASE_URL).unwrap_or("").to_string();

    if path.is_empty() {
        dom.set(USERNAME, ScriptedElement::text(""));
        dom.set(PASSWORD, ScriptedElement::text(""));
        dom.set(LOGIN_BUTTON, ScriptedElement::text("Login"));
        if let Some(error) = &shop.error {
            dom.set(ERROR_BANNER, ScriptedElement::text(error));
        }
        return;
    }

    dom.set(CART_LINK, ScriptedElement::text(""));
    if !shop.cart.is_empty() {
        let shown = match shop.defect {
            Defect::BadgeCountsOneLess => shop.cart.len() - 1,
            _ => shop.cart.len(),
        };
        dom.set(CART_BADGE, ScriptedElement::text(&shown.to_string()));
    }

    let in_cart = shop.cart.len();
    match path.as_str() {
        "inventory.html" => {
            let names: Vec<String> = PRODUCTS.iter().map(|p| p.to_string()).collect();
            let buttons = (0..PRODUCTS.len())
                .map(|i| {
                    if shop.cart.contains(&i) {
                        "Remove".to_string()
                    } else {
                        "Add to cart".to_string()
                    }
                })
                .collect();
            dom.set(TITLE, ScriptedElement::text("Products"));
            dom.set(ITEM_NAME, element(names.clone()));
            dom.set(FIRST_PRODUCT_LINK, element(names));
            dom.set(INVENTORY_BUTTON, element(buttons));
            dom.set(REMOVE_BUTTON, repeated("Remove", in_cart));
            dom.set(ADD_TO_CART_BUTTON, repeated("Add to cart", PRODUCTS.len() - in_cart));
        }
        "cart.html" => {
            let names: Vec<String> = shop.cart.iter().map(|&i| PRODUCTS[i].to_string()).collect();
            dom.set(TITLE, ScriptedElement::text("Your Cart"));
            dom.set(CART_ITEM, element(names.clone()));
            dom.set(ITEM_NAME, element(names));
            dom.set(CONTINUE_SHOPPING, ScriptedElement::text("Continue Shopping"));
            dom.set(CHECKOUT, ScriptedElement::text("Checkout"));
        }
        "checkout-step-one.html" => {
            dom.set(FIRST_NAME, ScriptedElement::text(""));
            dom.set(LAST_NAME, ScriptedElement::text(""));
            dom.set(POSTAL_CODE, ScriptedElement::text(""));
            dom.set(CONTINUE, ScriptedElement::text("Continue"));
        }
        "checkout-step-two.html" => {
            dom.set(
                SUMMARY_LABEL,
                ScriptedElement::many(&["Payment Information:", "Shipping Information:", "Price Total"]),
            );
            dom.set(FINISH, ScriptedElement::text("Finish"));
        }
        "checkout-complete.html" => {
            dom.set(PONY_EXPRESS, ScriptedElement::text("Pony Express"));
            dom.set(COMPLETE_HEADER, ScriptedElement::text("Thank you for your order!"));
            dom.set(
                COMPLETE_TEXT,
                ScriptedElement::text(
                    "Your order has been dispatched, and will arrive just as fast as the pony can get there!",
                ),
            );
            dom.set(BACK_HOME, ScriptedElement::text("Back Home"));
        }
        other => {
            if let Some(id) = detail_id(other) {
                dom.set(DETAILS_NAME, ScriptedElement::text(PRODUCTS[id]));
                if shop.cart.contains(&id) {
                    dom.set(REMOVE_BUTTON, ScriptedElement::text("Remove"));
                } else {
                    dom.set(ADD_TO_CART_BUTTON, ScriptedElement::text("Add to cart"));
                }
            }
        }
    }
}

fn login_error(shop: &Shop, username: &str, password: &str) -> Option<String> {
    let known = [
        "standard_user",
        "locked_out_user",
        "problem_user",
        "performance_glitch_user",
        "error_user",
        "visual_user",
    ];

    let message = if username.is_empty() {
        "Username is required"
    } else if password.is_empty() {
        "Password is required"
    } else if password != "secret_sauce" || !known.contains(&username) {
        "Username and password do not match any user in this service"
    } else if username == "locked_out_user" && shop.defect != Defect::LockedUserLogsIn {
        "Sorry, this user has been locked out."
    } else {
        return None;
    };
    Some(format!("Epic sadface: {}", message))
}

fn on_click(
    page: &ScriptedPage,
    shop: &Arc<Mutex<Shop>>,
    selector: &str,
    action: impl Fn(&mut ScriptedDom, &mut Shop, usize) + Send + Sync + 'static,
) {
    let shop = shop.clone();
    page.on_click(selector, move |dom, index| {
        let mut shop = shop.lock().unwrap();
        action(dom, &mut shop, index);
        render(dom, &shop);
    });
}

fn current_path(dom: &ScriptedDom) -> String {
    dom.url.strip_prefix(BASE_URL).unwrap_or("").to_string()
}

/// A fresh storefront page positioned on `about:blank`
pub fn storefront(defect: Defect) -> ScriptedPage {
    let page = ScriptedPage::new("about:blank");
    let shop = Arc::new(Mutex::new(Shop {
        cart: BTreeSet::new(),
        error: None,
        defect,
    }));

    let navigated = shop.clone();
    page.on_navigate(move |dom| {
        let mut shop = navigated.lock().unwrap();
        if current_path(dom).is_empty() {
            shop.error = None;
        }
        dom.values.clear();
        render(dom, &shop);
    });

    on_click(&page, &shop, LOGIN_BUTTON, |dom, shop, _| {
        match login_error(shop, dom.value(USERNAME), dom.value(PASSWORD)) {
            Some(error) => shop.error = Some(error),
            None => {
                shop.error = None;
                dom.navigate(&url("inventory.html"));
            }
        }
    });
    on_click(&page, &shop, ITEM_NAME, |dom, _, index| {
        if current_path(dom) == "inventory.html" {
            dom.navigate(&url(&format!("inventory-item.html?id={}", index)));
        }
    });
    on_click(&page, &shop, FIRST_PRODUCT_LINK, |dom, _, index| {
        dom.navigate(&url(&format!("inventory-item.html?id={}", index)));
    });
    on_click(&page, &shop, INVENTORY_BUTTON, |_, shop, index| {
        if !shop.cart.remove(&index) {
            shop.cart.insert(index);
        }
    });
    on_click(&page, &shop, ADD_TO_CART_BUTTON, |dom, shop, index| {
        let path = current_path(dom);
        let id = detail_id(&path).or_else(|| {
            (0..PRODUCTS.len())
                .filter(|i| !shop.cart.contains(i))
                .nth(index)
        });
        if let Some(id) = id {
            shop.cart.insert(id);
        }
    });
    on_click(&page, &shop, CART_LINK, |dom, _, _| dom.navigate(&url("cart.html")));
    on_click(&page, &shop, CONTINUE_SHOPPING, |dom, _, _| {
        dom.navigate(&url("inventory.html"))
    });
    on_click(&page, &shop, CHECKOUT, |dom, _, _| {
        dom.navigate(&url("checkout-step-one.html"))
    });
    on_click(&page, &shop, CONTINUE, |dom, _, _| {
        dom.navigate(&url("checkout-step-two.html"))
    });
    on_click(&page, &shop, FINISH, |dom, shop, _| {
        shop.cart.clear();
        dom.navigate(&url("checkout-complete.html"));
    });
    on_click(&page, &shop, BACK_HOME, |dom, _, _| dom.navigate(&url("inventory.html")));

    page
}

/// Opens one storefront page per test and keeps every page it handed out
pub struct StorefrontSessions {
    defect: Defect,
    unavailable: bool,
    pages: Mutex<Vec<Arc<ScriptedPage>>>,
}

impl StorefrontSessions {
    pub fn new(defect: Defect) -> Self {
        Self {
            defect,
            unavailable: false,
            pages: Mutex::new(Vec::new()),
        }
    }

    /// Every `open` fails as if Chrome could not be launched
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(Defect::None)
        }
    }

    pub fn pages(&self) -> Vec<Arc<ScriptedPage>> {
        self.pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for StorefrontSessions {
    async fn open(&self) -> Result<Arc<dyn Page>> {
        if self.unavailable {
            return Err(ShopError::Browser("failed to launch Chrome".to_string()));
        }
        let page = Arc::new(storefront(self.defect));
        self.pages.lock().unwrap().push(page.clone());
        Ok(page)
    }
}

pub fn fixtures(screenshot_dir: &Path) -> Arc<Fixtures> {
    let config = SuiteConfig {
        base_url: BASE_URL.to_string(),
        screenshot_dir: screenshot_dir.to_path_buf(),
        ..SuiteConfig::default()
    };
    Arc::new(Fixtures::from_config(&config).unwrap())
}

pub fn runner(sessions: Arc<StorefrontSessions>, screenshot_dir: &Path) -> Runner {
    Runner::new(sessions, fixtures(screenshot_dir)).with_timeout(Duration::from_millis(300))
}

/// PNG file names in `dir`, sorted
pub fn png_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
                .filter_map(|p: PathBuf| p.file_name().and_then(|n| n.to_str()).map(String::from))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
