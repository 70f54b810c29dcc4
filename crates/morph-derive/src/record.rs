//! Implementation of #[derive(Record)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Token, Visibility};

const DEFAULT_KEY: &str = "morph";

pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// One entry of `#[morph(...)]`: either `"chain"` or `key = "chain"`
enum MorphArg {
    Default(LitStr),
    Keyed(Ident, LitStr),
}

impl Parse for MorphArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Default(input.parse()?));
        }
        let key = input.call(Ident::parse_any)?;
        input.parse::<Token![=]>()?;
        Ok(Self::Keyed(key, input.parse()?))
    }
}

/// Collect `(key, annotation)` pairs in declaration order
fn parse_tags(attrs: &[Attribute]) -> syn::Result<Vec<(String, String)>> {
    let mut tags = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("morph")) {
        let args = attr.parse_args_with(Punctuated::<MorphArg, Token![,]>::parse_terminated)?;
        for arg in args {
            match arg {
                MorphArg::Default(chain) => tags.push((DEFAULT_KEY.to_string(), chain.value())),
                MorphArg::Keyed(key, chain) => tags.push((key.unraw().to_string(), chain.value())),
            }
        }
    }
    Ok(tags)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    format!("Record requires named fields, `{}` has none", name),
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                format!("Record can only be derived for structs, `{}` is not one", name),
            ))
        }
    };

    let mut infos = Vec::with_capacity(fields.len());
    let mut arms = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_name = ident.unraw().to_string();
        let exported = matches!(field.vis, Visibility::Public(_));
        let (keys, chains): (Vec<_>, Vec<_>) = parse_tags(&field.attrs)?.into_iter().unzip();

        infos.push(quote! {
            ::morph_core::FieldInfo::new(#field_name, #index, #exported, &[#((#keys, #chains)),*])
        });
        if exported {
            arms.push(quote! {
                #index => ::std::option::Option::Some(&mut self.#ident),
            });
        }
    }

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::morph_core::Reflect));
    }
    generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: 'static));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let shape_name = name.to_string();

    Ok(quote! {
        impl #impl_generics ::morph_core::Record for #name #ty_generics #where_clause {
            fn shape(&self) -> ::morph_core::Shape {
                const FIELDS: &[::morph_core::FieldInfo] = &[#(#infos),*];
                ::morph_core::Shape::of::<Self>(#shape_name, FIELDS)
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<&mut dyn ::morph_core::Reflect> {
                match index {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl #impl_generics ::morph_core::Reflect for #name #ty_generics #where_clause {
            fn reflect_mut(&mut self) -> ::morph_core::ValueMut<'_> {
                ::morph_core::ValueMut::Record(self)
            }
        }
    })
}
