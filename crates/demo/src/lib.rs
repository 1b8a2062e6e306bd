//! Traits whose proxies are produced by `build.rs`

pub mod shapes;

/// Proxies and registry generated from [`shapes`]
pub mod proxies {
    include!(concat!(env!("OUT_DIR"), "/generated_proxies.rs"));
}
