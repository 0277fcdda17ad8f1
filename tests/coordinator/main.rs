#[path = "../common/support.rs"]
mod support;

mod context;
