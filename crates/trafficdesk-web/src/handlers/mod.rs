//! API 핸들러 모듈.

pub mod beats;
pub mod email;
pub mod management;
pub mod search;
