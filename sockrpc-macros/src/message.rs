//! `#[derive(Message)]` implementation
//!
//! Parses the optional `#[message(...)]` attribute with `syn`, works out the
//! schema name and emits the trait impl with `quote`:
//!
//! ```ignore
//! impl ::sockrpc_core::Message for Greeting {
//!     const NAME: &'static str = "greeter.Greeting";
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, LitStr};

pub fn derive_message_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match schema_name(&input) {
        Ok(name) => {
            let ident = &input.ident;
            let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

            let expanded = quote! {
                impl #impl_generics ::sockrpc_core::Message for #ident #ty_generics #where_clause {
                    const NAME: &'static str = #name;
                }
            };
            TokenStream::from(expanded)
        }
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn schema_name(input: &DeriveInput) -> syn::Result<String> {
    let mut name: Option<LitStr> = None;
    let mut package: Option<LitStr> = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("message")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("package") {
                package = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `name` or `package`"))
            }
        })?;
    }

    match (name, package) {
        (Some(name), None) => Ok(name.value()),
        (None, Some(package)) => Ok(format!("{}.{}", package.value(), input.ident)),
        (None, None) => Ok(input.ident.to_string()),
        (Some(name), Some(_)) => Err(syn::Error::new(
            name.span(),
            "`name` and `package` cannot be combined",
        )),
    }
}
