//! Marker attributes read by the proxygen build step.
//!
//! Both attributes leave the annotated item untouched; the build script finds
//! them in the source text.

use proc_macro::TokenStream;

/// `#[proxy_for(Trait)]` on a
/// `fn(call: &MethodCall, args: Vec<Box<dyn Any>>) -> Box<dyn Any>`
/// generates a proxy for `Trait` that sends every call to the function.
#[proc_macro_attribute]
pub fn proxy_for(_interface: TokenStream, item: TokenStream) -> TokenStream {
    item
}

/// `#[with_proxy(Handler)]` on a trait generates a proxy for it that sends
/// every call to an instance of `Handler`.
#[proc_macro_attribute]
pub fn with_proxy(_handler: TokenStream, item: TokenStream) -> TokenStream {
    item
}
