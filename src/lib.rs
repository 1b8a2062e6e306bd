//! proxygen - build-time generation of forwarding proxies for Rust traits
//!
//! Mark a dispatch function with `#[proxy_for(Trait)]` or a trait with
//! `#[with_proxy(Handler)]`, run [`Builder`] from `build.rs` and `include!`
//! the generated file. Every call on a generated proxy is described by a
//! [`runtime::MethodCall`] and forwarded with its arguments.

pub use proxygen_core::*;

pub use proxygen_runtime as runtime;
