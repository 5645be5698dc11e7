//! Item (listing) model and related types.
//!
//! An item's displayed status is never stored: it is derived from the
//! item's borrow requests at read time, in one place ([`ItemStatus::derive`]
//! for rows already in memory, one SQL CASE expression in the repository
//! for queries).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::profile::ProfileSummary;
use super::request::RequestStatus;

/// Derived display status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    Requested,
    CheckedOut,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Requested => "requested",
            ItemStatus::CheckedOut => "checked_out",
        }
    }

    /// Derive the display status from the item's request set.
    ///
    /// A pending request wins over an approved one; with neither the item
    /// is available. Pure function of the statuses passed in.
    pub fn derive(requests: &[RequestStatus]) -> Self {
        if requests.iter().any(|s| *s == RequestStatus::Pending) {
            ItemStatus::Requested
        } else if requests.iter().any(|s| *s == RequestStatus::Approved) {
            ItemStatus::CheckedOut
        } else {
            ItemStatus::Available
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ItemStatus::Available),
            "requested" => Ok(ItemStatus::Requested),
            "checked_out" => Ok(ItemStatus::CheckedOut),
            _ => Err(format!("Invalid item status: {}", s)),
        }
    }
}

// SQLx conversion for ItemStatus (computed as TEXT by the status CASE)
impl sqlx::Type<Postgres> for ItemStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ItemStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

/// Item categories, as listed by the add-item form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Kids,
    Music,
    Electronics,
    Exercise,
    Emergency,
    Household,
    Gardening,
    Tools,
    Kitchen,
    Games,
    Outdoors,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Kids => "Kids",
            Category::Music => "Music",
            Category::Electronics => "Electronics",
            Category::Exercise => "Exercise",
            Category::Emergency => "Emergency",
            Category::Household => "Household",
            Category::Gardening => "Gardening",
            Category::Tools => "Tools",
            Category::Kitchen => "Kitchen",
            Category::Games => "Games",
            Category::Outdoors => "Outdoors",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kids" => Ok(Category::Kids),
            "Music" => Ok(Category::Music),
            "Electronics" => Ok(Category::Electronics),
            "Exercise" => Ok(Category::Exercise),
            "Emergency" => Ok(Category::Emergency),
            "Household" => Ok(Category::Household),
            "Gardening" => Ok(Category::Gardening),
            "Tools" => Ok(Category::Tools),
            "Kitchen" => Ok(Category::Kitchen),
            "Games" => Ok(Category::Games),
            "Outdoors" => Ok(Category::Outdoors),
            "Other" => Ok(Category::Other),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

// SQLx conversion for Category (stored as TEXT)
impl sqlx::Type<Postgres> for Category {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Category {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Category {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Item model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub owner_id: Uuid,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub category: Category,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Item with derived status and owner summary, as returned by every read path
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemDetails {
    #[serde(flatten)]
    pub item: Item,
    pub status: ItemStatus,
    pub owner: Option<ProfileSummary>,
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    #[validate(length(max = 50))]
    pub model: Option<String>,
    #[validate(length(max = 50))]
    pub condition: Option<String>,
    pub category: Category,
}

/// Update item request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    #[validate(length(max = 50))]
    pub model: Option<String>,
    #[validate(length(max = 50))]
    pub condition: Option<String>,
    pub category: Option<Category>,
}

/// Item list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ItemQuery {
    /// Free-text search over name and description
    pub search: Option<String>,
    pub category: Option<Category>,
    pub owner_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_requests_is_available() {
        assert_eq!(ItemStatus::derive(&[]), ItemStatus::Available);
    }

    #[test]
    fn pending_request_shows_requested() {
        assert_eq!(
            ItemStatus::derive(&[RequestStatus::Pending]),
            ItemStatus::Requested
        );
    }

    #[test]
    fn approved_request_shows_checked_out() {
        assert_eq!(
            ItemStatus::derive(&[RequestStatus::Approved]),
            ItemStatus::CheckedOut
        );
    }

    #[test]
    fn pending_wins_over_approved() {
        assert_eq!(
            ItemStatus::derive(&[RequestStatus::Approved, RequestStatus::Pending]),
            ItemStatus::Requested
        );
    }

    #[test]
    fn closed_requests_do_not_affect_status() {
        assert_eq!(
            ItemStatus::derive(&[RequestStatus::Rejected, RequestStatus::Returned]),
            ItemStatus::Available
        );
    }

    #[test]
    fn one_of_several_pending_keeps_requested() {
        // Cancelling one of several pending requests leaves the rest
        assert_eq!(
            ItemStatus::derive(&[RequestStatus::Pending, RequestStatus::Pending]),
            ItemStatus::Requested
        );
    }

    #[test]
    fn derivation_is_order_independent() {
        let a = [
            RequestStatus::Returned,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ];
        let b = [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Returned,
        ];
        assert_eq!(ItemStatus::derive(&a), ItemStatus::derive(&b));
    }

    #[test]
    fn category_round_trips_through_strings() {
        for c in [
            Category::Kids,
            Category::Music,
            Category::Electronics,
            Category::Exercise,
            Category::Emergency,
            Category::Household,
            Category::Gardening,
            Category::Tools,
            Category::Kitchen,
            Category::Games,
            Category::Outdoors,
            Category::Other,
        ] {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }
}
