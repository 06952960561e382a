//! In-process implementations of every repository port.
//!
//! [`InMemoryStore`] keeps all aggregates behind one mutex, which gives the
//! same guarantees the PostgreSQL adapters get from transactions: order
//! placement checks and reserves stock for every line before anything is
//! written, updates touch only the fields each operation owns, and timeline
//! appends are compare-and-set on the entry count. The server falls back
//! to this store when no database URL is configured, and the end-to-end
//! tests drive the HTTP surface through it.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    ChatRepository, ChatRepositoryError, CustomizationQuery, CustomizationRepository,
    CustomizationRepositoryError, FavoriteChange, InventoryChange, OrderQuery, OrderRepository,
    OrderRepositoryError, ProductQuery, ProductRepository, ProductRepositoryError,
    ProductSortField, SortDirection, StoredCredentials, UserQuery, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    AccountStatus, ChatMessage, ChatRoom, Customization, CustomizationId, EmailAddress, Order,
    OrderId, OrderStatus, PasswordHash, Product, ProductId, ProfileUpdate, Role, RoomId, User,
    UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Default)]
struct State {
    users: HashMap<UserId, StoredCredentials>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    customizations: HashMap<CustomizationId, Customization>,
    rooms: HashMap<RoomId, ChatRoom>,
}

/// Shared in-memory backing store; clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, State>, E> {
        self.state.lock().map_err(|_| poisoned(POISONED))
    }
}

/// Slice `items` (already filtered and ordered) into the requested page.
fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page::new(items, page, total)
}

fn compare_products(query: &ProductQuery, a: &Product, b: &Product) -> Ordering {
    let primary = match query.sort_by {
        ProductSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        ProductSortField::Price => a.price.cmp(&b.price),
        ProductSortField::Title => a.title.cmp(&b.title),
    };
    let primary = match query.direction {
        SortDirection::Ascending => primary,
        SortDirection::Descending => primary.reverse(),
    };
    primary.then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        if state.users.values().any(|stored| stored.user.email == user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email.as_str()));
        }
        state.users.insert(
            user.id,
            StoredCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.email == *email)
            .cloned())
    }

    async fn find_password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.get(id).map(|stored| stored.password_hash.clone()))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.get_mut(id).map(|stored| {
            stored.user.apply_profile(update, updated_at);
            stored.user.clone()
        }))
    }

    async fn set_standing(
        &self,
        id: &UserId,
        role: Role,
        status: AccountStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.get_mut(id).map(|stored| {
            stored.user.role = role;
            stored.user.status = status;
            stored.user.updated_at = updated_at;
            stored.user.clone()
        }))
    }

    async fn add_favorite(
        &self,
        id: &UserId,
        product: &ProductId,
        updated_at: DateTime<Utc>,
    ) -> Result<FavoriteChange, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        let Some(stored) = state.users.get_mut(id) else {
            return Ok(FavoriteChange::AccountMissing);
        };
        Ok(if stored.user.add_favorite(*product, updated_at) {
            FavoriteChange::Changed
        } else {
            FavoriteChange::Unchanged
        })
    }

    async fn remove_favorite(
        &self,
        id: &UserId,
        product: &ProductId,
        updated_at: DateTime<Utc>,
    ) -> Result<FavoriteChange, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        let Some(stored) = state.users.get_mut(id) else {
            return Ok(FavoriteChange::AccountMissing);
        };
        Ok(if stored.user.remove_favorite(*product, updated_at) {
            FavoriteChange::Changed
        } else {
            FavoriteChange::Unchanged
        })
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        match state.users.get_mut(id) {
            Some(stored) => {
                stored.password_hash = password_hash.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.remove(id).is_some())
    }

    async fn list(
        &self,
        query: &UserQuery,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        let needle = query.search.as_deref().map(|search| search.trim().to_lowercase());
        let mut users: Vec<User> = state
            .users
            .values()
            .map(|stored| &stored.user)
            .filter(|user| query.role.is_none_or(|role| user.role == role))
            .filter(|user| query.status.is_none_or(|status| user.status == status))
            .filter(|user| {
                needle.as_deref().is_none_or(|needle| {
                    user.name.as_str().to_lowercase().contains(needle)
                        || user.email.as_str().contains(needle)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(users, page))
    }

    async fn exists_with_role(&self, role: Role) -> Result<bool, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.values().any(|stored| stored.user.role == role))
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.get(id).cloned())
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn record_view(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.get_mut(id).map(|product| {
            product.stats.views += 1;
            product.clone()
        }))
    }

    async fn update(
        &self,
        product: &Product,
        inventory: &InventoryChange,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.get_mut(&product.id).map(|stored| {
            let stock = inventory.stock.unwrap_or(stored.stock);
            let images = inventory
                .images
                .clone()
                .unwrap_or_else(|| std::mem::take(&mut stored.images));
            let stats = std::mem::take(&mut stored.stats);
            *stored = Product {
                stock,
                images,
                stats,
                ..product.clone()
            };
            stored.clone()
        }))
    }

    async fn append_images(
        &self,
        id: &ProductId,
        uris: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.get_mut(id).map(|stored| {
            stored.images.extend_from_slice(uris);
            stored.updated_at = updated_at;
            stored.clone()
        }))
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.remove(id).is_some())
    }

    async fn list(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| query.matches(product))
            .cloned()
            .collect();
        products.sort_by(|a, b| compare_products(query, a, b));
        Ok(paginate(products, page))
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn place(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut state = self.lock(OrderRepositoryError::query)?;
        if state
            .orders
            .values()
            .any(|existing| existing.order_number == order.order_number)
        {
            return Err(OrderRepositoryError::duplicate_order_number(
                order.order_number.as_str(),
            ));
        }

        let mut wanted: BTreeMap<ProductId, u32> = BTreeMap::new();
        for item in &order.items {
            let entry = wanted.entry(item.product).or_default();
            *entry = entry.saturating_add(item.quantity);
        }
        for (id, quantity) in &wanted {
            let product = state
                .products
                .get(id)
                .ok_or_else(|| OrderRepositoryError::product_missing(id.to_string()))?;
            if product.stock < *quantity {
                return Err(OrderRepositoryError::insufficient_stock(id.to_string()));
            }
        }
        for (id, quantity) in wanted {
            if let Some(product) = state.products.get_mut(&id) {
                product.stock -= quantity;
                product.stats.sales += u64::from(quantity);
            }
        }
        state.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let state = self.lock(OrderRepositoryError::query)?;
        Ok(state.orders.get(id).cloned())
    }

    async fn update_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<(), OrderRepositoryError> {
        let mut state = self.lock(OrderRepositoryError::query)?;
        let newest = order
            .timeline
            .last()
            .ok_or_else(|| OrderRepositoryError::query("order timeline is empty"))?;
        match state.orders.get_mut(&order.id) {
            Some(stored)
                if stored.status == expected
                    && stored.timeline.len() + 1 == order.timeline.len() =>
            {
                stored.status = order.status;
                stored.tracking = order.tracking.clone();
                stored.timeline.push_entry(newest.clone());
                stored.updated_at = order.updated_at;
                Ok(())
            }
            _ => Err(OrderRepositoryError::status_conflict(order.id.to_string())),
        }
    }

    async fn list(
        &self,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError> {
        let state = self.lock(OrderRepositoryError::query)?;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| query.matches(order))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(orders, page))
    }
}

#[async_trait]
impl CustomizationRepository for InMemoryStore {
    async fn insert(&self, request: &Customization) -> Result<(), CustomizationRepositoryError> {
        let mut state = self.lock(CustomizationRepositoryError::query)?;
        state.customizations.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &CustomizationId,
    ) -> Result<Option<Customization>, CustomizationRepositoryError> {
        let state = self.lock(CustomizationRepositoryError::query)?;
        Ok(state.customizations.get(id).cloned())
    }

    async fn update(&self, request: &Customization) -> Result<bool, CustomizationRepositoryError> {
        let mut state = self.lock(CustomizationRepositoryError::query)?;
        let newest = request
            .timeline
            .last()
            .ok_or_else(|| CustomizationRepositoryError::query("timeline is empty"))?;
        let Some(stored) = state.customizations.get_mut(&request.id) else {
            return Ok(false);
        };
        if stored.timeline.len() + 1 != request.timeline.len() {
            return Err(CustomizationRepositoryError::conflict(request.id.to_string()));
        }
        stored.status = request.status;
        stored.artisan_response = request.artisan_response.clone();
        stored.quote = request.quote.clone();
        stored.related_order = request.related_order;
        stored.timeline.push_entry(newest.clone());
        stored.updated_at = request.updated_at;
        Ok(true)
    }

    async fn list(
        &self,
        query: &CustomizationQuery,
        page: PageRequest,
    ) -> Result<Page<Customization>, CustomizationRepositoryError> {
        let state = self.lock(CustomizationRepositoryError::query)?;
        let mut requests: Vec<Customization> = state
            .customizations
            .values()
            .filter(|request| query.matches(request))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(requests, page))
    }
}

#[async_trait]
impl ChatRepository for InMemoryStore {
    async fn insert(&self, room: &ChatRoom) -> Result<(), ChatRepositoryError> {
        let mut state = self.lock(ChatRepositoryError::query)?;
        if state.rooms.contains_key(&room.room_id) {
            return Err(ChatRepositoryError::duplicate_room(room.room_id.as_str()));
        }
        state.rooms.insert(room.room_id.clone(), room.clone());
        Ok(())
    }

    async fn find(&self, room_id: &RoomId) -> Result<Option<ChatRoom>, ChatRepositoryError> {
        let state = self.lock(ChatRepositoryError::query)?;
        Ok(state.rooms.get(room_id).cloned())
    }

    async fn append_message(
        &self,
        room: &ChatRoom,
        message: &ChatMessage,
    ) -> Result<bool, ChatRepositoryError> {
        let mut state = self.lock(ChatRepositoryError::query)?;
        match state.rooms.get_mut(&room.room_id) {
            Some(stored) => {
                stored.messages.push(message.clone());
                stored.participants = room.participants.clone();
                stored.last_activity = room.last_activity;
                stored.updated_at = room.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_participant(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<ChatRoom>, ChatRepositoryError> {
        let state = self.lock(ChatRepositoryError::query)?;
        let mut rooms: Vec<ChatRoom> = state
            .rooms
            .values()
            .filter(|room| room.is_participant(*user))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| {
            b.last_activity
                .cmp(&a.last_activity)
                .then_with(|| a.room_id.as_str().cmp(b.room_id.as_str()))
        });
        Ok(paginate(rooms, page))
    }
}
