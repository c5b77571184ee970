//! kbmapper daemon library
//!
//! The event engine behind `kbmapperd`. Device discovery is shared with the
//! `kbmapper` CLI so both agree on which devices are watched.

pub mod combo;
pub mod device;
pub mod dispatcher;
pub mod engine;
pub mod frame;
pub mod keysym;
pub mod lifecycle;
pub mod reader;
pub mod resolver;
pub mod switch;
