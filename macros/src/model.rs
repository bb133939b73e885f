use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::{TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::Meta;

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
struct ModelInputReceiver {
	ident: syn::Ident,

	vis: syn::Visibility,

	data: ast::Data<(), ModelFieldReceiver>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs(doc, serde, validate))]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

impl ModelFieldReceiver {
	/// Fields marked with `#[serde(skip_deserializing)]` or `#[serde(skip)]`
	/// are assigned by the server and never accepted as input.
	fn is_server_assigned(&self) -> bool {
		self.attrs.iter().any(|attr| {
			let Meta::List(ref list) = attr.meta else {
				return false;
			};

			list.path.is_ident("serde")
				&& list.tokens.to_token_stream().into_iter().any(|token| {
					matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
				})
		})
	}
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);

	match expand(&input) {
		Ok(inputs) => {
			let model = without_validation(input);

			quote! {
				#model

				#inputs
			}
			.into()
		}
		Err(e) => e.write_errors().into(),
	}
}

/// Validation only applies to the generated inputs, so `#[validate]` is
/// removed from the model itself.
fn without_validation(mut input: syn::DeriveInput) -> syn::DeriveInput {
	if let syn::Data::Struct(ref mut data) = input.data {
		for field in &mut data.fields {
			field.attrs.retain(|attr| !attr.path().is_ident("validate"));
		}
	}

	input
}

fn expand(input: &syn::DeriveInput) -> darling::Result<TokenStream> {
	let receiver = ModelInputReceiver::from_derive_input(input)?;

	let ident = &receiver.ident;
	let vis = &receiver.vis;
	let create_ident = format_ident!("Create{}", ident);
	let update_ident = format_ident!("Update{}", ident);
	let create_doc = format!("Input for creating a [`{ident}`].");
	let update_doc = format!(
		"Input for updating a [`{ident}`]. Omitted fields keep their current value."
	);

	let fields = receiver
		.data
		.take_struct()
		.ok_or_else(|| darling::Error::unsupported_shape("enum"))?;

	let fields = fields
		.iter()
		.filter(|field| !field.is_server_assigned())
		.filter_map(|field| {
			Some((&field.attrs, field.ident.as_ref()?, &field.ty, &field.vis))
		})
		.collect::<Vec<_>>();

	let create_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#vis #ident: #ty,
		}
	});

	let update_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#[serde(default)]
			#vis #ident: Option<#ty>,
		}
	});

	Ok(quote! {
		#[doc = #create_doc]
		#[derive(Debug, ::serde::Deserialize, ::validator::Validate, ::schemars::JsonSchema)]
		#vis struct #create_ident {
			#(
				#create_fields
			)*
		}

		#[doc = #update_doc]
		#[derive(Debug, ::serde::Deserialize, ::validator::Validate, ::schemars::JsonSchema)]
		#vis struct #update_ident {
			#(
				#update_fields
			)*
		}
	})
}
