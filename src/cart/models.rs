use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::product::models::Product;

/// One line of the shopper's cart. The browser keeps the cart in
/// localStorage and submits it verbatim at checkout, so the field names
/// (including `imageUrl`) match the client-side JSON.
///
/// Price and name are denormalized on purpose: the cart is never the
/// server's source of truth, and a stale product reference simply renders
/// as missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CartItem {
    pub id: i32,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// In-browser cart, quantity-keyed by product id but addressed by index
/// within a session (index is the only identifier the UI holds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Adds a product: bump the quantity when it is already in the cart,
    /// otherwise append a new line with quantity 1.
    pub fn add(&mut self, product: &Product, image_url: Option<String>) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.product_id) {
            item.quantity += 1;
            return;
        }
        self.items.push(CartItem {
            id: product.product_id,
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            image_url,
            quantity: 1,
        });
    }

    pub fn increase_quantity(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.quantity += 1;
        }
    }

    /// Decrements the quantity at `index`. Reaching zero removes the line
    /// and compacts the vec so the remaining indices stay gapless.
    pub fn decrease_quantity(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.quantity -= 1;
            if item.quantity <= 0 {
                self.items.remove(index);
            }
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }

    /// No shipping fee is added; the total equals the subtotal.
    pub fn total(&self) -> f64 {
        self.subtotal()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Validate for Cart {
    fn validate(&self) -> Result<(), ValidationErrors> {
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, price: f64) -> Product {
        Product {
            product_id: id,
            name: format!("Batu Andesit {}", id),
            description: "Batu alam untuk dinding".to_owned(),
            price,
            stock_quantity: 100,
            category_id: 1,
        }
    }

    #[test]
    fn add_appends_then_increments() {
        let mut cart = Cart::default();
        cart.add(&product(1, 50_000.0), None);
        cart.add(&product(2, 75_000.0), None);
        cart.add(&product(1, 50_000.0), None);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].quantity, 1);
    }

    #[test]
    fn subtotal_is_sum_of_price_times_quantity() {
        let mut cart = Cart::default();
        cart.add(&product(1, 50_000.0), None);
        cart.add(&product(1, 50_000.0), None);
        cart.add(&product(2, 30_000.0), None);

        assert_eq!(cart.subtotal(), 130_000.0);
        assert_eq!(cart.total(), cart.subtotal());
    }

    #[test]
    fn decrease_to_zero_removes_and_compacts() {
        let mut cart = Cart::default();
        cart.add(&product(1, 10_000.0), None);
        cart.add(&product(2, 20_000.0), None);
        cart.add(&product(3, 30_000.0), None);

        cart.decrease_quantity(1);

        assert_eq!(cart.len(), 2);
        // no gap: index 1 now addresses the former third line
        assert_eq!(cart.items()[1].id, 3);
        assert!(cart.items().iter().all(|item| item.quantity >= 1));
    }

    #[test]
    fn quantity_never_drops_below_one_while_present() {
        let mut cart = Cart::default();
        cart.add(&product(1, 10_000.0), None);
        cart.increase_quantity(0);
        cart.increase_quantity(0);
        cart.decrease_quantity(0);
        cart.decrease_quantity(0);
        cart.decrease_quantity(0);

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), 0.0);
    }

    #[test]
    fn mutating_out_of_range_index_is_a_no_op() {
        let mut cart = Cart::default();
        cart.add(&product(1, 10_000.0), None);
        cart.increase_quantity(5);
        cart.decrease_quantity(5);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn deserializes_browser_local_storage_shape() {
        let json = r#"[{"id":7,"name":"Batu Candi","price":50000,"imageUrl":"/storage/product-images/x.jpg","quantity":2}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].image_url.as_deref(), Some("/storage/product-images/x.jpg"));
        assert_eq!(cart.subtotal(), 100_000.0);
    }
}
