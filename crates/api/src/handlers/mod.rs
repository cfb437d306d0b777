pub mod activity;
pub mod admin;
pub mod analytics;
pub mod artisans;
pub mod browse;
pub mod cron;
pub mod favorites;
pub mod inquiry;
pub mod listings;
pub mod saved_searches;
