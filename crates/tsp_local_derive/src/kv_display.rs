use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Field, Fields, LitStr, parse_macro_input, spanned::Spanned};

/// Implements `Display` as one `key = value` line per field, keys taken from
/// the field names and padded to a common width. `#[kv(or_none)]` on a
/// string field prints `none` while the field is blank.
pub fn derive_kv_display_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(DataStruct {
        fields: Fields::Named(fields),
        ..
    }) = &input.data
    else {
        return Err(syn::Error::new(
            input.span(),
            "KvDisplay requires a struct with named fields",
        ));
    };

    let mut keys = Vec::new();
    let mut values = Vec::new();
    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        keys.push(ident.to_string());
        values.push(if blank_is_none(field)? {
            quote! {
                if self.#ident.trim().is_empty() {
                    String::from("none")
                } else {
                    self.#ident.to_string()
                }
            }
        } else {
            quote! { self.#ident.to_string() }
        });
    }

    let struct_ident = &input.ident;
    let template = LitStr::new(&aligned_template(&keys), Span::call_site());
    Ok(quote! {
        impl std::fmt::Display for #struct_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, #template, #(#values),*)
            }
        }
    })
}

fn blank_is_none(field: &Field) -> syn::Result<bool> {
    let mut or_none = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("kv")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("or_none") {
                or_none = true;
                return Ok(());
            }
            Err(meta.error("unsupported kv attribute; expected `or_none`"))
        })?;
    }
    Ok(or_none)
}

/// Format string with a `\n\t<key> = {}` line per key.
fn aligned_template(keys: &[String]) -> String {
    let width = keys.iter().map(String::len).max().unwrap_or(0);
    keys.iter()
        .map(|key| format!("\n\t{key:<width$} = {{}}"))
        .collect()
}
