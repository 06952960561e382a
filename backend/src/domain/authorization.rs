//! Who may do what.
//!
//! The [`Actor`] is rebuilt from the stored account on every request, so
//! role and moderation status are never stale. Role gates return domain
//! errors; ownership predicates return booleans and let the caller pick
//! between 403 and 404.

use super::{
    AccountStatus, ChatRoom, Customization, Error, Order, PersonName, Product, Role, User, UserId,
};

/// Authenticated account attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub name: PersonName,
    pub role: Role,
    pub status: AccountStatus,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
            status: user.status,
        }
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Artisan whose account an admin has approved.
    pub fn is_approved_artisan(&self) -> bool {
        self.role == Role::Artisan && self.status == AccountStatus::Approved
    }

    /// Refuse suspended accounts.
    pub fn ensure_active(&self) -> Result<(), Error> {
        if self.status == AccountStatus::Suspended {
            return Err(Error::forbidden("Account is suspended"));
        }
        Ok(())
    }

    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("Admin access required"))
        }
    }

    pub fn require_customer(&self) -> Result<(), Error> {
        if self.role == Role::Customer {
            Ok(())
        } else {
            Err(Error::forbidden("Customer access required"))
        }
    }

    /// Any artisan, approved or not.
    pub fn require_artisan(&self) -> Result<(), Error> {
        if self.role.is_artisan() {
            Ok(())
        } else {
            Err(Error::forbidden("Artisan access required"))
        }
    }

    pub fn require_approved_artisan(&self) -> Result<(), Error> {
        self.require_artisan()?;
        if self.is_approved_artisan() {
            Ok(())
        } else {
            Err(Error::forbidden(
                "Your artisan account must be approved before you can do this",
            ))
        }
    }

    /// Admin, the ordering customer, or an artisan selling on the order.
    pub fn can_view_order(&self, order: &Order) -> bool {
        self.is_admin() || order.customer == self.id || order.involves_artisan(self.id)
    }

    /// Admin, the requesting customer or the addressed artisan.
    pub fn can_access_customization(&self, customization: &Customization) -> bool {
        self.is_admin() || customization.is_participant(self.id)
    }

    pub fn can_access_room(&self, room: &ChatRoom) -> bool {
        self.is_admin() || room.is_participant(self.id)
    }

    /// Only the owning artisan edits a listing; admins moderate separately.
    pub fn owns_product(&self, product: &Product) -> bool {
        product.artisan == self.id
    }
}
