//! Derive macros for Shopfront state slices
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates wire action types and lifecycle helpers
//!   for action enums
//!
//! # Example
//!
//! ```ignore
//! use shopfront_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(namespace = "customer")]
//! enum CustomerAction {
//!     #[request]
//!     LoadCustomersRequest,
//!
//!     #[success]
//!     LoadCustomersSuccess { response: ApiResponse },
//!
//!     #[failure]
//!     LoadCustomersFailure { error: serde_json::Value },
//! }
//!
//! // Generated items:
//! assert_eq!(CustomerAction::LOAD_CUSTOMERS_REQUEST, "customer/LOAD_CUSTOMERS_REQUEST");
//! assert!(CustomerAction::LoadCustomersRequest.is_request());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates, on the enum itself:
/// - one `&'static str` constant per variant, named after the variant in
///   SCREAMING_SNAKE case, holding `"<namespace>/<CONSTANT_NAME>"`
/// - `ACTION_TYPES` - all of those constants in declaration order
/// - `action_type()` - the constant of the current variant
/// - `is_request()`, `is_success()`, `is_failure()` - lifecycle phase checks
///
/// # Attributes
///
/// - `#[action(namespace = "...")]` on the enum - prefix of every action type
///   (omit for bare names)
/// - `#[request]` / `#[success]` / `#[failure]` on variants - lifecycle phase
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type or an enum without variants
/// - A variant carries more than one lifecycle attribute
/// - The `action` attribute has an unknown key
#[proc_macro_derive(Action, attributes(action, request, success, failure))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_action(&input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Request,
    Success,
    Failure,
}

const PHASE_ATTRIBUTES: [(&str, Phase); 3] = [
    ("request", Phase::Request),
    ("success", Phase::Success),
    ("failure", Phase::Failure),
];

fn expand_action(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    if data_enum.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "#[derive(Action)] needs at least one variant",
        ));
    }

    let namespace = parse_namespace(&input.attrs)?;

    let mut constants = Vec::new();
    let mut type_arms = Vec::new();
    let mut phase_arms: Vec<(Phase, TokenStream2)> = Vec::new();
    let mut const_idents = Vec::new();

    for variant in &data_enum.variants {
        let const_name = screaming_snake(&variant.ident.to_string());
        let const_ident = format_ident!("{}", const_name);
        let action_type = match &namespace {
            Some(ns) => format!("{ns}/{const_name}"),
            None => const_name.clone(),
        };
        let doc = format!("Action type of [`Self::{}`]", variant.ident);

        constants.push(quote! {
            #[doc = #doc]
            pub const #const_ident: &'static str = #action_type;
        });

        let pattern = variant_pattern(variant);
        type_arms.push(quote! { #pattern => Self::#const_ident, });

        if let Some(phase) = lifecycle_phase(variant)? {
            phase_arms.push((phase, pattern));
        }

        const_idents.push(const_ident);
    }

    let is_request = phase_method(&phase_arms, Phase::Request);
    let is_success = phase_method(&phase_arms, Phase::Success);
    let is_failure = phase_method(&phase_arms, Phase::Failure);

    Ok(quote! {
        impl #name {
            #(#constants)*

            /// Every action type of this enum, in declaration order
            pub const ACTION_TYPES: &'static [&'static str] = &[#(Self::#const_idents),*];

            /// Returns the wire action type of this action
            #[must_use]
            pub const fn action_type(&self) -> &'static str {
                match self {
                    #(#type_arms)*
                }
            }

            /// Returns true if this action starts a request lifecycle
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_request(&self) -> bool {
                match self {
                    #(#is_request => true,)*
                    _ => false,
                }
            }

            /// Returns true if this action completes a request successfully
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_success(&self) -> bool {
                match self {
                    #(#is_success => true,)*
                    _ => false,
                }
            }

            /// Returns true if this action reports a failed request
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_failure(&self) -> bool {
                match self {
                    #(#is_failure => true,)*
                    _ => false,
                }
            }
        }
    })
}

fn phase_method(arms: &[(Phase, TokenStream2)], phase: Phase) -> Vec<TokenStream2> {
    arms.iter()
        .filter(|(p, _)| *p == phase)
        .map(|(_, pattern)| pattern.clone())
        .collect()
}

fn variant_pattern(variant: &Variant) -> TokenStream2 {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Reads `#[action(namespace = "...")]`
fn parse_namespace(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut namespace = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("namespace") {
                let value: LitStr = meta.value()?.parse()?;
                namespace = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported action attribute, expected `namespace`"))
            }
        })?;
    }

    Ok(namespace)
}

fn lifecycle_phase(variant: &Variant) -> syn::Result<Option<Phase>> {
    let phases: Vec<Phase> = PHASE_ATTRIBUTES
        .iter()
        .filter(|(name, _)| has_attribute(&variant.attrs, name))
        .map(|(_, phase)| *phase)
        .collect();

    match phases.as_slice() {
        [] => Ok(None),
        [phase] => Ok(Some(*phase)),
        _ => Err(syn::Error::new_spanned(
            &variant.ident,
            "Variant can carry only one of #[request], #[success] and #[failure]",
        )),
    }
}

/// `LoadCustomersRequest` -> `LOAD_CUSTOMERS_REQUEST`
fn screaming_snake(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(ch.to_uppercase());
    }
    out
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
