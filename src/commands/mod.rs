pub mod create;
pub mod delete;
pub mod list;
pub mod purge_expired;
pub mod serve;
pub mod view;
