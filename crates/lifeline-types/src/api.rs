use serde::{Deserialize, Serialize};

use crate::models::{DonationStatus, Role, User};

// -- JWT Claims --

/// Session token claims. Canonical definition lives here so the token
/// issuer and the auth middleware agree on the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Session --

/// Body of `POST /jwt`. Clients post their whole auth-provider profile;
/// only the email is signed into the token.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn new(success: bool) -> Self {
        Self { success }
    }
}

// -- Store results --
//
// Mutating endpoints answer with the same acknowledgement shapes the web
// client already reads.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertResult {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self { acknowledged: true, inserted_id: inserted_id.into() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: usize,
    pub modified_count: usize,
}

impl UpdateResult {
    pub fn new(matched_count: usize, modified_count: usize) -> Self {
        Self { acknowledged: true, matched_count, modified_count }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: usize,
}

impl DeleteResult {
    pub fn new(deleted_count: usize) -> Self {
        Self { acknowledged: true, deleted_count }
    }
}

// -- Users --

/// Body of `POST /user`. Role and status are never taken from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProfile {
    pub email: String,
    pub name: Option<String>,
    #[serde(alias = "image", alias = "photo")]
    pub avatar: Option<String>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.avatar.is_none()
            && self.blood_group.is_none()
            && self.district.is_none()
            && self.upazila.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

// -- Donor search --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSearchQuery {
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
}

/// Public projection of a donor, enriched with the district name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSearchResult {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub avatar: Option<String>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub district_name: Option<String>,
    pub upazila: Option<String>,
}

// -- Donation requests --

/// Body of `POST /create-donation-request`. There is deliberately no status
/// field: new requests always start as pending.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonationRequest {
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_district: Option<String>,
    pub recipient_upazila: Option<String>,
    pub hospital_name: Option<String>,
    pub full_address: Option<String>,
    pub blood_group: Option<String>,
    pub donation_date: Option<String>,
    pub donation_time: Option<String>,
    pub request_message: Option<String>,
}

/// Partial edit of a donation request. Identity, ownership and status are
/// not editable through this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequestPatch {
    pub requester_name: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_district: Option<String>,
    pub recipient_upazila: Option<String>,
    pub hospital_name: Option<String>,
    pub full_address: Option<String>,
    pub blood_group: Option<String>,
    pub donation_date: Option<String>,
    pub donation_time: Option<String>,
    pub request_message: Option<String>,
}

impl DonationRequestPatch {
    /// Column/value pairs for the fields that are present.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("requester_name", &self.requester_name),
            ("recipient_name", &self.recipient_name),
            ("recipient_district", &self.recipient_district),
            ("recipient_upazila", &self.recipient_upazila),
            ("hospital_name", &self.hospital_name),
            ("full_address", &self.full_address),
            ("blood_group", &self.blood_group),
            ("donation_date", &self.donation_date),
            ("donation_time", &self.donation_time),
            ("request_message", &self.request_message),
        ]
        .into_iter()
        .filter_map(|(col, value)| value.as_deref().map(|v| (col, v)))
        .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonateRequest {
    pub donor_name: Option<String>,
}

/// `{status}` body for the requester-facing transition route.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

impl TransitionRequest {
    /// Only closing moves are accepted on this route.
    pub fn closing_status(&self) -> Option<DonationStatus> {
        self.status.parse::<DonationStatus>().ok().filter(|s| s.is_terminal())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_donors: u64,
    pub total_requests: u64,
    pub total_funding: f64,
}

// -- Blogs --

#[derive(Debug, Deserialize)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
}

// -- Funds --

#[derive(Debug, Deserialize)]
pub struct NewFund {
    pub name: String,
    pub email: String,
    pub amount: f64,
}

// -- Contact --

/// All fields optional on the wire so a missing one is reported as a
/// validation error rather than a body parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub message: Option<String>,
}
