//! In-process implementation of every store.
//!
//! All state sits behind one async mutex, so each operation (checkout
//! included) is atomic with respect to every other.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use dreamy_layers_core::{
    CartLines, CheckoutRequest, Email, NewOrder, Order, OrderId, OrderStatus, ProductId,
    ProductSnapshot, UserId, WishlistItems,
};

use super::{
    CartStore, OrderStore, PlaceOrderError, ProductStore, RepositoryError, UserStore,
    WishlistStore,
};
use crate::models::{
    CustomerSummary, NewProduct, NewUser, OrderWithCustomer, Product, ProductPatch, User,
    UserCredentials,
};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserCredentials>,
    products: BTreeMap<ProductId, Product>,
    carts: HashMap<UserId, CartLines>,
    wishlists: HashMap<UserId, WishlistItems>,
    orders: BTreeMap<OrderId, Order>,
    next_user: i32,
    next_product: i32,
    next_order: i32,
}

impl MemoryState {
    fn user_exists(&self, user_id: UserId) -> Result<(), RepositoryError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Newest first, matching the `PostgreSQL` ordering.
fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Stores backed by process memory. Used by tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|c| c.user.email == new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(next_id(&mut state.next_user)),
            name: new.name,
            email: new.email,
            role: new.role,
            blocked: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).map(|c| c.user.clone()))
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|c| &c.user.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.values().map(|c| c.user.clone()).collect())
    }

    async fn set_blocked(
        &self,
        id: UserId,
        blocked: bool,
    ) -> Result<Option<User>, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(&id).map(|c| {
            c.user.blocked = blocked;
            c.user.updated_at = Utc::now();
            c.user.clone()
        }))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.products.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(next_id(&mut state.next_product)),
            name: new.name.trim().to_string(),
            price: new.price,
            description: new.description,
            image: new.image,
            category: new.category,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state.products.get_mut(&id).map(|product| {
            patch.apply(product);
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state.products.remove(&id).is_some())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get(&self, user_id: UserId) -> Result<Option<CartLines>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.carts.get(&user_id).cloned())
    }

    async fn add(
        &self,
        user_id: UserId,
        snapshot: ProductSnapshot,
    ) -> Result<CartLines, RepositoryError> {
        let mut state = self.state.lock().await;
        state.user_exists(user_id)?;
        let cart = state.carts.entry(user_id).or_default();
        cart.add(snapshot);
        Ok(cart.clone())
    }

    async fn increase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state
            .carts
            .get_mut(&user_id)
            .map(|cart| {
                cart.increase(product_id);
                cart.clone()
            })
            .unwrap_or_default())
    }

    async fn decrease(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state
            .carts
            .get_mut(&user_id)
            .map(|cart| {
                cart.decrease(product_id);
                cart.clone()
            })
            .unwrap_or_default())
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state
            .carts
            .get_mut(&user_id)
            .map(|cart| {
                cart.remove(product_id);
                cart.clone()
            })
            .unwrap_or_default())
    }

    async fn clear(&self, user_id: UserId) -> Result<CartLines, RepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(cart) = state.carts.get_mut(&user_id) {
            cart.clear();
        }
        Ok(CartLines::new())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.carts.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn get(&self, user_id: UserId) -> Result<Option<WishlistItems>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.wishlists.get(&user_id).cloned())
    }

    async fn add(
        &self,
        user_id: UserId,
        snapshot: ProductSnapshot,
    ) -> Result<WishlistItems, RepositoryError> {
        let mut state = self.state.lock().await;
        state.user_exists(user_id)?;
        let wishlist = state.wishlists.entry(user_id).or_default();
        wishlist.add(snapshot);
        Ok(wishlist.clone())
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItems, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state
            .wishlists
            .get_mut(&user_id)
            .map(|wishlist| {
                wishlist.remove(product_id);
                wishlist.clone()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
    ) -> Result<Order, PlaceOrderError> {
        let mut state = self.state.lock().await;
        let lines = state.carts.get(&user_id).cloned().unwrap_or_default();

        let new = NewOrder::from_cart(user_id, &lines, request)?;
        let id = OrderId::new(next_id(&mut state.next_order));
        let order = Order::placed(id, new, Utc::now());

        state.orders.insert(id, order.clone());
        if let Some(cart) = state.carts.get_mut(&user_id) {
            cart.clear();
        }
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.orders.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        newest_first(&mut orders);

        Ok(orders
            .into_iter()
            .map(|order| {
                let customer = state.users.get(&order.user_id).map(|c| CustomerSummary {
                    id: c.user.id,
                    name: c.user.name.clone(),
                    email: c.user.email.clone(),
                });
                OrderWithCustomer { order, customer }
            })
            .collect())
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state
            .orders
            .get_mut(&id)
            .filter(|order| order.status == expected)
            .map(|order| {
                order.status = next;
                order.updated_at = Utc::now();
                order.clone()
            }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dreamy_layers_core::{CheckoutError, PaymentMethod, ShippingDetails, UserRole};
    use rust_decimal::Decimal;

    use super::*;

    async fn user(store: &MemoryStore, email: &str) -> User {
        UserStore::create(
            store,
            NewUser {
                name: "Meera".to_string(),
                email: Email::parse(email).unwrap(),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap()
    }

    fn snapshot(id: i32, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: ProductId::new(id),
            name: format!("Tart {id}"),
            price: Decimal::from(price),
            image: None,
        }
    }

    fn checkout() -> CheckoutRequest {
        CheckoutRequest {
            details: ShippingDetails {
                name: "Meera".to_string(),
                phone: "555".to_string(),
                shipping_address: "1 Lane".to_string(),
                payment_method: Some(PaymentMethod::Cod),
            },
            expected_total: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::default();
        user(&store, "a@b.co").await;
        let err = UserStore::create(
            &store,
            NewUser {
                name: "Other".to_string(),
                email: Email::parse("A@B.co").unwrap(),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_add_requires_existing_user() {
        let store = MemoryStore::default();
        let err = CartStore::add(&store, UserId::new(99), snapshot(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_place_clears_cart_and_keeps_record() {
        let store = MemoryStore::default();
        let u = user(&store, "a@b.co").await;
        CartStore::add(&store, u.id, snapshot(1, 10)).await.unwrap();

        let order = store.place(u.id, &checkout()).await.unwrap();
        assert_eq!(order.total, Decimal::from(10));

        let cart = CartStore::get(&store, u.id).await.unwrap();
        assert_eq!(cart, Some(CartLines::new()));
    }

    #[tokio::test]
    async fn test_place_on_missing_cart_is_rejected() {
        let store = MemoryStore::default();
        let u = user(&store, "a@b.co").await;

        let err = store.place(u.id, &checkout()).await.unwrap_err();
        assert!(matches!(
            err,
            PlaceOrderError::Rejected(CheckoutError::EmptyCart)
        ));
        assert!(store.list_for_user(u.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_is_compare_and_set() {
        let store = MemoryStore::default();
        let u = user(&store, "a@b.co").await;
        CartStore::add(&store, u.id, snapshot(1, 10)).await.unwrap();
        let order = store.place(u.id, &checkout()).await.unwrap();

        let stale = store
            .update_status(order.id, OrderStatus::Processing, OrderStatus::Shipped)
            .await
            .unwrap();
        assert!(stale.is_none());

        let updated = store
            .update_status(order.id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);
    }
}
