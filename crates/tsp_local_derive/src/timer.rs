use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, LitStr, parse_macro_input};

pub fn timer_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(item as ItemFn);
    let label = if attr.is_empty() {
        LitStr::new(&item_fn.sig.ident.to_string(), item_fn.sig.ident.span())
    } else {
        parse_macro_input!(attr as LitStr)
    };

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = item_fn;
    let stmts = &block.stmts;

    // The guard logs on drop so early returns and `?` are timed too.
    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            struct __TimerGuard(std::time::Instant);

            impl Drop for __TimerGuard {
                fn drop(&mut self) {
                    log::debug!(
                        "{}: elapsed={:.3}s",
                        #label,
                        self.0.elapsed().as_secs_f64()
                    );
                }
            }

            let __timer_guard = __TimerGuard(std::time::Instant::now());
            #(#stmts)*
        }
    };

    TokenStream::from(expanded)
}
