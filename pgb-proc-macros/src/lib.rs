extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::Data::Enum;
use syn::{DeriveInput, Variant};

fn fieldless_variants<'a>(
    ast: &'a DeriveInput,
    macro_name: &str,
) -> &'a Punctuated<Variant, Comma> {
    let name = &ast.ident;

    let Enum(data) = &ast.data else {
        panic!("{macro_name} derive macro can only be applied to enums; {name} is not an enum");
    };

    for variant in &data.variants {
        if !variant.fields.is_empty() {
            let variant_name = &variant.ident;
            panic!("{macro_name} macro only supports enums with only fieldless variants; {name}::{variant_name} has fields");
        }
    }

    &data.variants
}

// Lowercase with '-' and '_' removed, so that "GreenTint", "green-tint", and "green_tint" all
// normalize to the same key
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|&c| c != '-' && c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Implement the `std::fmt::Display` trait for the given enum, displaying each variant as its
/// name. Only supports enums which have only fieldless variants.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");

    let name = &ast.ident;
    let variants = fieldless_variants(&ast, "EnumDisplay");

    let match_arms = variants.iter().map(|variant| {
        let variant_name = &variant.ident;
        let variant_name_str = variant_name.to_string();
        quote! {
            Self::#variant_name => write!(f, #variant_name_str)
        }
    });

    let gen = quote! {
        impl std::fmt::Display for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    #(#match_arms,)*
                }
            }
        }
    };

    gen.into()
}

/// Implement the `std::str::FromStr` trait for the given enum, with `FromStr::Err` set to `String`.
/// Only supports enums which have only fieldless variants.
///
/// Parsing is case-insensitive and ignores '-' and '_', so a variant named `GreenTint` can be
/// parsed from "greentint", "green-tint", or "GREEN_TINT".
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");

    let name = &ast.ident;
    let variants = fieldless_variants(&ast, "EnumFromStr");

    let match_arms = variants.iter().map(|variant| {
        let variant_name = &variant.ident;
        let key = normalize_key(&variant_name.to_string());
        quote! {
            #key => Ok(Self::#variant_name)
        }
    });

    let err_fmt_string = format!("invalid {name} string: '{{}}'");
    let gen = quote! {
        impl std::str::FromStr for #name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key: String = s
                    .chars()
                    .filter(|&c| c != '-' && c != '_')
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                match key.as_str() {
                    #(#match_arms,)*
                    _ => Err(format!(#err_fmt_string, s))
                }
            }
        }
    };

    gen.into()
}

/// Generate an associated constant `ALL` containing every variant of the given enum in
/// declaration order. Only supports enums which have only fieldless variants.
#[proc_macro_derive(EnumAll)]
pub fn enum_all(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");

    let name = &ast.ident;
    let variants = fieldless_variants(&ast, "EnumAll");

    let len = variants.len();
    let variant_names = variants.iter().map(|variant| &variant.ident);

    let gen = quote! {
        impl #name {
            pub const ALL: [Self; #len] = [#(Self::#variant_names,)*];
        }
    };

    gen.into()
}

/// Implement `serde::Serialize` and `serde::Deserialize` for the given type, (de)serializing
/// values as strings. This requires that the type implements both `std::fmt::Display` and
/// `std::str::FromStr`.
#[proc_macro_derive(StrSerde)]
pub fn str_serde(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");

    let ident = &ast.ident;

    let visitor_struct_name = format_ident!("__{}StrVisitorGenerated", ident);
    let expecting_fmt_string = format!("a string representing a {ident}");
    let gen = quote! {
        impl serde::Serialize for #ident {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        struct #visitor_struct_name;

        impl<'de> serde::de::Visitor<'de> for #visitor_struct_name {
            type Value = #ident;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, #expecting_fmt_string)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        impl<'de> serde::Deserialize<'de> for #ident {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                deserializer.deserialize_str(#visitor_struct_name)
            }
        }
    };

    gen.into()
}
