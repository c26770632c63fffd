pub mod app_users;
pub mod courses;
pub mod enrollments;
pub mod promo_codes;
pub mod transactions;
