use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Returned when a wire string does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Implements `as_str`, `Display` and `FromStr` for a lowercase wire enum.
macro_rules! wire_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($ty::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

// -- Users --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Volunteer,
    Admin,
}

wire_enum!(Role, "role", {
    Donor => "donor",
    Volunteer => "volunteer",
    Admin => "admin",
});

impl Role {
    /// Roles an admin may grant through the role endpoint.
    /// Demoting back to donor is not possible through that path.
    pub fn is_assignable(self) -> bool {
        matches!(self, Role::Admin | Role::Volunteer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

wire_enum!(UserStatus, "user status", {
    Active => "active",
    Blocked => "blocked",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

// -- Donation requests --

/// Lifecycle of a donation request.
///
/// ```text
/// pending -> inprogress -> done
///                       -> canceled
/// ```
///
/// `done` and `canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    InProgress,
    Done,
    Canceled,
}

wire_enum!(DonationStatus, "donation status", {
    Pending => "pending",
    InProgress => "inprogress",
    Done => "done",
    Canceled => "canceled",
});

impl DonationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DonationStatus::Done | DonationStatus::Canceled)
    }

    /// The single transition table for donation requests.
    pub fn can_transition_to(self, next: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress) | (InProgress, Done) | (InProgress, Canceled)
        )
    }

    /// Lenient parse for list filters: unknown values mean "no filter".
    pub fn parse_filter(raw: Option<&str>) -> Option<DonationStatus> {
        raw.and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub id: String,
    pub requester_name: Option<String>,
    pub requester_email: String,
    pub recipient_name: Option<String>,
    pub recipient_district: Option<String>,
    pub recipient_upazila: Option<String>,
    pub hospital_name: Option<String>,
    pub full_address: Option<String>,
    pub blood_group: Option<String>,
    pub donation_date: Option<String>,
    pub donation_time: Option<String>,
    pub request_message: Option<String>,
    pub donation_status: DonationStatus,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Blogs --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    Published,
}

wire_enum!(BlogStatus, "blog status", {
    Draft => "draft",
    Published => "published",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub status: BlogStatus,
    pub created_at: DateTime<Utc>,
}

// -- Funding and contact --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub name: String,
    pub email: String,
    pub amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
