use crate::domain::order::Order;
use crate::domain::ports::Storefront;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Storefront that derives landing pages from a fixed base URL.
///
/// Cart clears are only counted; clones share the counter.
#[derive(Debug, Clone)]
pub struct StaticStorefront {
    base_url: String,
    cart_clears: Arc<AtomicUsize>,
}

impl StaticStorefront {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            cart_clears: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times a cart has been cleared through this storefront.
    pub fn cart_clears(&self) -> usize {
        self.cart_clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storefront for StaticStorefront {
    async fn return_url(&self, order: &Order) -> Result<String> {
        Ok(format!(
            "{}/checkout/order-received/{}/?key={}",
            self.base_url, order.id, order.order_key
        ))
    }

    async fn fallback_url(&self) -> Result<String> {
        Ok(format!("{}/checkout/", self.base_url))
    }

    async fn clear_cart(&self, order: &Order) -> Result<()> {
        self.cart_clears.fetch_add(1, Ordering::SeqCst);
        info!(order_id = order.id, "cart cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_urls_ignore_trailing_slash() {
        let storefront = StaticStorefront::new("https://shop.example/");
        let order = Order::new(12, "wc_order_xyz", dec!(5.00));

        assert_eq!(
            storefront.return_url(&order).await.unwrap(),
            "https://shop.example/checkout/order-received/12/?key=wc_order_xyz"
        );
        assert_eq!(
            storefront.fallback_url().await.unwrap(),
            "https://shop.example/checkout/"
        );
    }

    #[tokio::test]
    async fn test_clones_share_cart_counter() {
        let storefront = StaticStorefront::new("https://shop.example");
        let handle = storefront.clone();
        let order = Order::new(1, "key", dec!(1.00));

        storefront.clear_cart(&order).await.unwrap();
        assert_eq!(handle.cart_clears(), 1);
    }
}
