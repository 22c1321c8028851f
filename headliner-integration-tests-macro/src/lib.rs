use proc_macro::TokenStream;
use quote::quote;
use syn::{
    punctuated::Punctuated, token::Comma, ExprClosure, FnArg, Pat, PatType, Path, PathArguments,
    PathSegment, TypePath,
};

/// Wrap a test case in the setup and tear down of `headliner_test`, including
/// manipulating settings if needed.
///
/// If other test macros are used, such as the [`parameterized`
/// crate](https://crates.io/crates/parameterized), their attributes should be
/// placed below this one. The settings closure can declare extra arguments,
/// which become arguments of the resulting function for `parameterized` to
/// fill in.
///
/// # Example:
///
/// Basic usage:
///
/// ```ignore
/// use headliner_integration_tests::{headliner_test_macro, TestingTools};
///
/// #[headliner_test_macro]
/// async fn test_function(TestingTools { test_client, .. }: TestingTools) {
///     // test using test_client
/// }
/// ```
///
/// Settings can be customized:
///
/// ```ignore
/// use headliner_integration_tests::{headliner_test_macro, TestingTools};
///
/// #[headliner_test_macro(|settings| settings.public_documentation = None)]
/// async fn test_function(TestingTools { test_client, .. }: TestingTools) {
///     // test using test_client without public documentation.
/// }
/// ```
///
/// Other test macros, like `parameterized`, can be used:
///
/// ```ignore
/// use headliner_integration_tests::{headliner_test_macro, TestingTools};
/// use parameterized::parameterized;
///
/// #[headliner_test_macro(|settings, path: &str| settings.proxy.path = path.to_string())]
/// #[parameterized(path = { "/api/news", "/news" })]
/// async fn test(TestingTools { .. }: TestingTools) {
///     // test will run twice, once with each proxy path.
/// }
/// ```
#[proc_macro_attribute]
pub fn headliner_test(attributes: TokenStream, item: TokenStream) -> TokenStream {
    // Parse the function that this macro is attached to.
    let mut input = syn::parse_macro_input!(item as syn::ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &mut input.sig;
    let body = &input.block;

    let has_test_attr = attrs.iter().any(|attr| attr.path.is_ident("test"));

    // `parameterized` unconditionally adds `#[test]` to the cases it generates.
    let is_parameterized = attrs.iter().any(|attr| {
        let segment_names: Vec<_> = attr
            .path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        (segment_names == vec!["parameterized"])
            || (segment_names == vec!["parameterized", "parameterized"])
    });

    let missing_test_attr = if has_test_attr || is_parameterized {
        quote!()
    } else {
        quote!(#[test])
    };

    // The outer function blocks on the test, so it must not be async itself.
    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "the async keyword is missing from the function declaration",
        )
        .to_compile_error()
        .into();
    }
    sig.asyncness = None;

    // Take the `TestingTools` argument, whose pattern holds the bindings the
    // test body uses. Every other argument stays on the outer function.
    let original_args = sig.inputs.clone();
    let mut toplevel_args = Punctuated::<FnArg, Comma>::new();
    let mut testing_tools_arg = None;

    for arg in &original_args {
        match arg {
            FnArg::Typed(PatType { ref ty, .. }) => match &**ty {
                syn::Type::Path(TypePath {
                    qself: None,
                    path:
                        Path {
                            leading_colon: None,
                            segments,
                        },
                }) => match segments.last() {
                    Some(PathSegment {
                        arguments: PathArguments::None,
                        ident,
                    }) if *ident == "TestingTools" => {
                        testing_tools_arg = Some(arg.clone());
                    }
                    _ => toplevel_args.push(arg.clone()),
                },
                _ => toplevel_args.push(arg.clone()),
            },
            FnArg::Receiver(_) => toplevel_args.push(arg.clone()),
        }
    }

    if testing_tools_arg.is_none() {
        return syn::Error::new_spanned(original_args, "expected an argument of type TestingTools")
            .into_compile_error()
            .into();
    }

    let settings_body = if attributes.is_empty() {
        quote!({})
    } else {
        let mut settings_closure = syn::parse_macro_input!(attributes as ExprClosure);
        for arg in settings_closure.inputs {
            match arg {
                Pat::Ident(pat) if pat.ident == "settings" => (),
                Pat::Type(pat) => toplevel_args.push(FnArg::Typed(pat)),
                _ => {
                    return syn::Error::new_spanned(
                        arg,
                        "only `settings` and `val: Type` parameters can be used for headliner_test settings inputs",
                    )
                    .into_compile_error()
                    .into()
                }
            }
        }
        settings_closure.inputs = Punctuated::<Pat, Comma>::new();
        let closure_body = settings_closure.body;
        quote!({ #closure_body })
    };

    sig.inputs = toplevel_args;

    (quote! {
        #(#attrs)*
        #missing_test_attr
        #vis #sig {
            actix_rt::System::new()
                .block_on(async {
                    // `crate` is `headliner-integration-tests` here.
                    crate::headliner_test(
                        |settings| { #settings_body },
                        | #testing_tools_arg | async move { #body }
                    ).await
                })
        }
    })
    .into()
}
