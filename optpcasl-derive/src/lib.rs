use quote::quote;
use syn::{Data, DeriveInput, parse_macro_input};

#[proc_macro_derive(KineticModel)]
pub fn derive_kinetic_model(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_kinetic_model_impl(input) {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_kinetic_model_impl(input: DeriveInput) -> syn::Result<proc_macro::TokenStream> {
    let name = input.ident;

    if let Data::Union(_) = input.data {
        return Err(syn::Error::new_spanned(
            name,
            "KineticModel can only be derived for structs and enums implementing SignalFunction",
        ));
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics KineticModel for #name #ty_generics #where_clause {
            fn val(&self, pld: f64, theta: &nalgebra::SVector<f64, 2>) -> f64 {
                self.f(pld, theta)
            }

            fn val_grad(&self, pld: f64, theta: &nalgebra::SVector<f64, 2>) -> (f64, nalgebra::SVector<f64, 2>) {
                num_dual::gradient(|v| self.f(pld, &v), *theta)
            }
        }
    };
    Ok(proc_macro::TokenStream::from(expanded))
}
