use proc_macro::TokenStream;
use proc_macro2::TokenTree;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Field, Fields, Ident, LitStr, Type};

/// Derive macro for `ssmfill::Populate`.
///
/// Generates `visit_fields`, which reports each field to the visitor in
/// declaration order:
///
/// - `#[ssm("Key")]` / `#[ssm(key = "Key")]` - leaf fetched from `prefix + "Key"`.
/// - no attribute - nested record if the type implements `Populate`, else skipped.
/// - `#[ssm(nested)]` - nested record, required to implement `Populate`.
/// - `#[ssm(skip)]` - ignored.
///
/// Fields typed by a generic parameter get trait bounds instead of per-type
/// dispatch: a keyed `T` requires `T: Scalar`, a bare unannotated `T`
/// requires `T: Populate`. Any other unannotated type built from a generic
/// parameter must be marked `nested` or `skip`.
///
/// # Example
///
/// ```ignore
/// #[derive(Populate, Default)]
/// pub struct Contact {
///     #[ssm("Contact/Email")]
///     pub email: String,
///
///     #[ssm(key = "Contact/Retries")]
///     pub retries: i32,
/// }
/// ```
#[proc_macro_derive(Populate, attributes(ssm))]
pub fn derive_populate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// How a single field takes part in the traversal.
enum Role {
    Leaf(String),
    Nested,
    Auto,
    Skip,
}

fn derive_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Populate only supports records: structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Populate only supports records: structs with named fields",
            ))
        }
    };

    let mut visit_tokens = Vec::new();
    let mut generics = input.generics.clone();
    let params: Vec<Ident> = input.generics.type_params().map(|p| p.ident.clone()).collect();

    for field in fields {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_ident.to_string();
        let field_name_str = field_name_str.trim_start_matches("r#");

        let field_ty = &field.ty;
        let generic = mentions_param(field_ty.to_token_stream(), &params);

        // A generic field's capabilities are unknown here; rely on bounds instead.
        let role = match field_role(field)? {
            Role::Auto if generic && !is_bare_param(field_ty, &params) => {
                return Err(syn::Error::new_spanned(
                    field_ty,
                    "field type depends on a generic parameter; mark it #[ssm(nested)] or #[ssm(skip)]",
                ));
            }
            Role::Auto if generic => Role::Nested,
            role => role,
        };

        let tokens = match role {
            Role::Leaf(key) if generic => {
                generics
                    .make_where_clause()
                    .predicates
                    .push(parse_quote! { #field_ty: ::ssmfill::Scalar });
                quote! {
                    __visitor.scalar(
                        #field_name_str,
                        #key,
                        ::ssmfill::Scalar::slot(&mut self.#field_ident),
                    )?;
                }
            }
            Role::Leaf(key) => quote! {
                let _: ::ssmfill::__private::Leaf =
                    ::ssmfill::__private::Probe(&mut self.#field_ident).__ssmfill_leaf_check();
                __visitor.scalar(
                    #field_name_str,
                    #key,
                    ::ssmfill::__private::Probe(&mut self.#field_ident).__ssmfill_slot(),
                )?;
            },
            Role::Nested => {
                generics
                    .make_where_clause()
                    .predicates
                    .push(parse_quote! { #field_ty: ::ssmfill::Populate });
                quote! {
                    __visitor.record(#field_name_str, &mut self.#field_ident)?;
                }
            }
            Role::Auto => quote! {
                ::ssmfill::__private::Probe(&mut self.#field_ident)
                    .__ssmfill_descend(#field_name_str, __visitor)?;
            },
            Role::Skip => continue,
        };
        visit_tokens.push(tokens);
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::ssmfill::Populate for #name #ty_generics #where_clause {
            fn visit_fields(
                &mut self,
                __visitor: &mut dyn ::ssmfill::FieldVisitor,
            ) -> ::core::result::Result<(), ::ssmfill::PopulateError> {
                #[allow(unused_imports)]
                use ::ssmfill::__private::{
                    LeafKeyCheck as _, PlainProbe as _, RecordKeyCheck as _, RecordProbe as _,
                    ScalarProbe as _, UnsupportedProbe as _,
                };
                #(#visit_tokens)*
                ::core::result::Result::Ok(())
            }
        }
    };

    Ok(expanded)
}

/// Whether `tokens` name any of the struct's type parameters.
fn mentions_param(tokens: proc_macro2::TokenStream, params: &[Ident]) -> bool {
    tokens.into_iter().any(|tt| match tt {
        TokenTree::Ident(ident) => params.contains(&ident),
        TokenTree::Group(group) => mentions_param(group.stream(), params),
        _ => false,
    })
}

fn is_bare_param(ty: &Type, params: &[Ident]) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .get_ident()
            .is_some_and(|ident| params.contains(ident)),
        _ => false,
    }
}

/// Parse the `#[ssm(...)]` attributes of one field.
fn field_role(field: &Field) -> Result<Role, syn::Error> {
    let mut key: Option<LitStr> = None;
    let mut nested = false;
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("ssm") {
            continue;
        }

        // #[ssm("Key")]
        if let Ok(lit) = attr.parse_args::<LitStr>() {
            set_key(&mut key, lit)?;
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                let value: LitStr = meta.value()?.parse()?;
                set_key(&mut key, value)?;
            } else if meta.path.is_ident("nested") {
                nested = true;
            } else if meta.path.is_ident("skip") {
                skip = true;
            } else {
                return Err(meta.error("unknown ssm attribute (expected key, nested or skip)"));
            }
            Ok(())
        })?;
    }

    match (key, nested, skip) {
        (Some(key), false, false) => Ok(Role::Leaf(key.value())),
        (None, true, false) => Ok(Role::Nested),
        (None, false, true) => Ok(Role::Skip),
        (None, false, false) => Ok(Role::Auto),
        (Some(key), true, _) => Err(syn::Error::new_spanned(
            key,
            "a nested record cannot also carry a parameter key; annotate its fields instead",
        )),
        _ => Err(syn::Error::new_spanned(
            field,
            "conflicting ssm attributes (skip cannot be combined with key or nested)",
        )),
    }
}

fn set_key(slot: &mut Option<LitStr>, lit: LitStr) -> Result<(), syn::Error> {
    if slot.is_some() {
        return Err(syn::Error::new_spanned(lit, "duplicate ssm key"));
    }
    *slot = Some(lit);
    Ok(())
}
