//! Borrow request model and the lifecycle it moves through

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use super::profile::ProfileSummary;

/// Status of a borrow request.
///
/// `pending → approved → returned` is the happy path; `pending → rejected`
/// is terminal; a `pending` request may also be cancelled, which deletes
/// the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Returned,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Returned => "returned",
        }
    }

    /// A request still occupying the item: not yet rejected or returned.
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }

    /// Valid state-machine transitions. Cancellation is a row deletion,
    /// not a transition, and is allowed only from `Pending`.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Approved, RequestStatus::Returned)
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "returned" => Ok(RequestStatus::Returned),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// SQLx conversion for RequestStatus (stored as TEXT)
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Borrow request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: Uuid,
    pub item_id: Uuid,
    pub requester_id: Uuid,
    pub status: RequestStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Borrow request with requester details, as shown on an item's request list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestDetails {
    #[serde(flatten)]
    pub request: BorrowRequest,
    pub requester: Option<ProfileSummary>,
}

/// Summary of the requested item, embedded in a user's own request list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestedItem {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub owner: Option<ProfileSummary>,
}

/// Borrow request with the item it targets, for the requester's own view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestWithItem {
    #[serde(flatten)]
    pub request: BorrowRequest,
    pub item: Option<RequestedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_and_approved_are_active() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Approved.is_active());
        assert!(!RequestStatus::Rejected.is_active());
        assert!(!RequestStatus::Returned.is_active());
    }

    #[test]
    fn happy_path_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Returned));
    }

    #[test]
    fn rejection_only_from_pending() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Returned.can_transition_to(RequestStatus::Rejected));
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        for next in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Returned,
        ] {
            assert!(!RequestStatus::Rejected.can_transition_to(next));
            assert!(!RequestStatus::Returned.can_transition_to(next));
        }
    }

    #[test]
    fn no_skipping_approval() {
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Returned));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Returned,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
    }
}
