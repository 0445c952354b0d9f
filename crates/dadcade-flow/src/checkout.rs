use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("not signed in")]
    NoUser,
    #[error("checkout failed: {0}")]
    Provider(String),
}

/// Payment provider. Returns the URL to redirect the browser to.
pub trait CheckoutProvider {
    fn create_checkout(&mut self, user_id: &str, price_cents: u32) -> Result<String, CheckoutError>;
}

/// Provider with a fixed checkout page, used natively and in tests.
#[derive(Debug, Clone)]
pub struct StaticCheckout {
    base_url: String,
}

impl StaticCheckout {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl CheckoutProvider for StaticCheckout {
    fn create_checkout(&mut self, user_id: &str, price_cents: u32) -> Result<String, CheckoutError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(CheckoutError::NoUser);
        }
        if !user_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(CheckoutError::Provider(format!("bad user id {:?}", user_id)));
        }
        Ok(format!(
            "{}?user={}&amount={}",
            self.base_url.trim_end_matches('/'),
            user_id,
            price_cents
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_redirect_url() {
        let mut checkout = StaticCheckout::new("https://pay.example/checkout/");
        assert_eq!(
            checkout.create_checkout("user_42", 999).unwrap(),
            "https://pay.example/checkout?user=user_42&amount=999"
        );
    }

    #[test]
    fn needs_a_user() {
        let mut checkout = StaticCheckout::new("https://pay.example");
        assert_eq!(checkout.create_checkout(" ", 999), Err(CheckoutError::NoUser));
        assert!(matches!(
            checkout.create_checkout("a&b", 999),
            Err(CheckoutError::Provider(_))
        ));
    }
}
