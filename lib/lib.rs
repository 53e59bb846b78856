use proc_macro::TokenStream;
use quote::quote;

/// Attribute macro that wraps a function with the sole purpose of measuring how long it takes to run,
/// and printing the gathered duration through Rust's logging API.
/// <br/><br/>
/// In **debug** builds the function body gets wrapped with an [`Instant`](std::time::Instant) and the
/// elapsed time is reported through a `trace!()` call upon return. In **release** builds the body is
/// emitted untouched, which makes the macro a zero-cost abstraction.
/// <br/><br/>
/// It is mostly meant for the API calls `ghctl` performs against GitHub, so slow endpoints can be spotted
/// with `--log-level trace`.
///
/// ---
///
/// # Requirements
///
/// - Rust's logging facade crate - https://crates.io/crates/log
///
/// # Usage
/// ## `fn()` example:
/// ```rust
/// use ghctl_lib::*;
///
/// #[ghctl_trace_time]
/// fn repository_route(owner: &str, repo: &str) -> String {
///     format!("/repos/{}/{}", owner, repo)
/// }
/// ```
/// This will output:
/// ```text
///  TRACE ghctl > Time elapsed for `fn repository_route()` was: 1.302µs
/// ```
///
/// ## `async fn()` example
///
/// ```rust
/// use ghctl_lib::*;
///
/// #[ghctl_trace_time]
/// async fn wait_for_github(delay: std::time::Duration) -> u64 {
///     tokio::time::sleep(delay).await;
///     delay.as_millis() as u64
/// }
/// ```
/// This will output:
/// ```text
///  TRACE ghctl > Time elapsed for `fn wait_for_github()` was: 268.012488ms
/// ```
#[proc_macro_attribute]
pub fn ghctl_trace_time(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = syn::parse_macro_input!(item as syn::ItemFn);

    let syn::ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = func;

    let is_async_fn = sig.asyncness.is_some();
    let name = format!("{}", sig.ident);
    let release_build = !cfg!(debug_assertions);
    let result_type = match &sig.output {
        syn::ReturnType::Default => quote! { () },
        syn::ReturnType::Type(_, ty) => quote! { #ty },
    };

    let block = if release_build {
        quote! { #block }
    } else if is_async_fn {
        // the body is awaited in place so borrowed arguments stay valid for its whole duration
        quote! {
            let __ghctl_start = ::std::time::Instant::now();
            let __ghctl_result: #result_type = async move { #block }.await;
            ::log::trace!("Time elapsed for `fn {}()` was: {:?}", #name, __ghctl_start.elapsed());
            __ghctl_result
        }
    } else {
        quote! {
            let __ghctl_start = ::std::time::Instant::now();
            let __ghctl_result = { #block };
            ::log::trace!("Time elapsed for `fn {}()` was: {:?}", #name, __ghctl_start.elapsed());
            __ghctl_result
        }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #block
        }
    };

    TokenStream::from(output)
}
