use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

/// Marks a test function.
///
/// Sync functions become plain `#[test]` functions. Async functions run on a
/// current-thread tokio runtime inside a `LocalSet`, so `LocalScheduler` can
/// spawn `!Send` tasks. `#[rxkoans_macro::test(paused)]` starts the runtime
/// with paused time: timers fire as soon as the runtime is idle.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let paused = if raw_args.is_empty() {
    false
  } else {
    if !is_async {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxkoans_macro::test args are only supported for async tests. Use \
           #[rxkoans_macro::test] for sync tests, or make the function async.",
        )
        .to_compile_error(),
      );
    }

    let arg = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      Some((ident.to_string(), ident.span()))
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      Some((lit.value(), lit.span()))
    } else {
      None
    };

    match arg {
      Some((name, _)) if name == "paused" => true,
      Some((_, span)) => {
        return TokenStream::from(
          syn::Error::new(
            span,
            "rxkoans_macro::test only accepts: #[rxkoans_macro::test] or \
             #[rxkoans_macro::test(paused)]",
          )
          .to_compile_error(),
        );
      }
      None => {
        return TokenStream::from(
          syn::Error::new(
            raw_args.span(),
            "rxkoans_macro::test only accepts: #[rxkoans_macro::test] or \
             #[rxkoans_macro::test(paused)]",
          )
          .to_compile_error(),
        );
      }
    }
  };

  if !is_async {
    return TokenStream::from(quote! {
      #[test]
      #input
    });
  }

  let ItemFn { attrs, vis, mut sig, block } = input;
  sig.asyncness = None;
  let start_paused = if paused { quote!(.start_paused(true)) } else { quote!() };

  let expanded = quote! {
    #[test]
    #(#attrs)*
    #vis #sig {
      let runtime = ::tokio::runtime::Builder::new_current_thread()
        .enable_all()
        #start_paused
        .build()
        .expect("failed to build the test runtime");
      let local = ::tokio::task::LocalSet::new();
      local.block_on(&runtime, async move #block)
    }
  };

  TokenStream::from(expanded)
}
