use std::collections::HashMap;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Variant, parse_macro_input, spanned::Spanned};

use crate::utils;

/// Generates `VALUES`, `ALL`, `parse` and `Display` for a unit-only enum.
///
/// Variants are spelled in kebab case unless renamed with
/// `#[cli(name = "...")]`; `#[cli(alias = "...")]` adds accepted spellings.
/// Input is matched after trimming and lowercasing, so every spelling must be
/// lowercase and unique across the enum.
pub fn derive_cli_value_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct VariantSpec {
    ident: Ident,
    canonical: String,
    aliases: Vec<String>,
}

impl VariantSpec {
    fn from_variant(variant: &Variant) -> syn::Result<Self> {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "CliValue only supports enums with unit variants",
            ));
        }

        let mut spec = Self {
            ident: variant.ident.clone(),
            canonical: utils::to_kebab_case(&variant.ident.to_string()),
            aliases: Vec::new(),
        };
        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("cli")) {
            attr.parse_nested_meta(|meta| {
                let lit: LitStr = meta.value()?.parse()?;
                if meta.path.is_ident("name") {
                    spec.canonical = lit.value();
                } else if meta.path.is_ident("alias") {
                    spec.aliases.push(lit.value());
                } else {
                    return Err(meta.error("unsupported cli attribute; expected name/alias"));
                }
                Ok(())
            })?;
        }
        Ok(spec)
    }

    fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

fn option_name(input: &DeriveInput) -> syn::Result<String> {
    let mut name = utils::to_kebab_case(&input.ident.to_string());
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("cli_value")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("option") {
                let lit: LitStr = meta.value()?.parse()?;
                name = lit.value();
                return Ok(());
            }
            Err(meta.error("unsupported cli_value attribute; expected option = \"...\""))
        })?;
    }
    Ok(name)
}

fn check_spellings(variants: &[VariantSpec]) -> syn::Result<()> {
    let mut owners: HashMap<&str, &Ident> = HashMap::new();
    for variant in variants {
        for spelling in variant.spellings() {
            if spelling != spelling.to_ascii_lowercase() {
                return Err(syn::Error::new(
                    variant.ident.span(),
                    format!("CliValue spelling `{spelling}` must be lowercase"),
                ));
            }
            if let Some(owner) = owners.insert(spelling, &variant.ident) {
                return Err(syn::Error::new(
                    variant.ident.span(),
                    format!("CliValue spelling `{spelling}` is already used by `{owner}`"),
                ));
            }
        }
    }
    Ok(())
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "CliValue can only be derived for enums",
        ));
    };

    let option_lit = LitStr::new(&option_name(input)?, Span::call_site());
    let variants = data_enum
        .variants
        .iter()
        .map(VariantSpec::from_variant)
        .collect::<syn::Result<Vec<_>>>()?;
    check_spellings(&variants)?;

    let enum_ident = &input.ident;
    let idents: Vec<&Ident> = variants.iter().map(|v| &v.ident).collect();
    let canonical: Vec<LitStr> = variants
        .iter()
        .map(|v| LitStr::new(&v.canonical, Span::call_site()))
        .collect();
    let parse_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let spellings = v.spellings().map(|s| LitStr::new(s, Span::call_site()));
        quote! { #(#spellings)|* => Ok(Self::#ident), }
    });
    let values_lit = LitStr::new(
        &variants
            .iter()
            .map(|v| v.canonical.as_str())
            .collect::<Vec<_>>()
            .join("|"),
        Span::call_site(),
    );

    Ok(quote! {
        impl #enum_ident {
            /// Canonical spellings joined with `|`, for usage text.
            pub const VALUES: &'static str = #values_lit;

            pub const ALL: &'static [Self] = &[#(Self::#idents),*];

            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid value for --{}: {} (expected {})",
                        #option_lit,
                        raw,
                        Self::VALUES
                    ))),
                }
            }
        }

        impl std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    #(Self::#idents => #canonical,)*
                })
            }
        }
    })
}
