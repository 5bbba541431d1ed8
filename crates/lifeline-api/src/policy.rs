//! Access decisions. Pure functions over the acting user and, where it
//! matters, the record being touched. Handlers turn a `false` into
//! `ApiError::Forbidden`.

use lifeline_types::models::{DonationRequest, Role, User, UserStatus};

fn is_active(user: &User) -> bool {
    user.status == UserStatus::Active
}

fn owns(user: &User, request: &DonationRequest) -> bool {
    user.email == request.requester_email
}

pub fn can_create_request(user: &User) -> bool {
    is_active(user)
}

/// Admins and volunteers see and manage every donation request.
pub fn can_administer(user: &User) -> bool {
    matches!(user.role, Role::Admin | Role::Volunteer)
}

pub fn can_moderate_blog(user: &User) -> bool {
    user.role == Role::Admin
}

pub fn can_manage_users(user: &User) -> bool {
    user.role == Role::Admin
}

/// Edit fields or close a request.
pub fn can_modify_request(user: &User, request: &DonationRequest) -> bool {
    owns(user, request) || can_administer(user)
}

pub fn can_delete_request(user: &User, request: &DonationRequest) -> bool {
    owns(user, request) || user.role == Role::Admin
}

/// Volunteer to donate for someone else's request.
pub fn can_donate(user: &User, request: &DonationRequest) -> bool {
    is_active(user) && !owns(user, request)
}
