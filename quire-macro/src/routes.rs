use crate::route_validation::validate_route_path;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
    FnArg, GenericArgument, Ident, ItemFn, LitStr, Pat, PatType, PathArguments, Type,
    parse_macro_input, spanned::Spanned,
};

/// How a handler parameter is fed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    /// Plain parameter: bound from the matched path
    Positional,
    /// `#[named]`: bound from the query string or body
    Named,
    /// `#[rest]`: receives every leftover argument
    Rest,
    /// `HttpRequest`: receives the raw request
    Request,
}

struct HandlerParam {
    ident: Ident,
    ty: Type,
    kind: ParamKind,
    optional: bool,
}

impl HandlerParam {
    fn name(&self) -> String {
        let name = self.ident.to_string();
        name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
    }

    /// Descriptor pushed into `Handler::params`
    fn descriptor(&self) -> proc_macro2::TokenStream {
        let name = self.name();
        match (self.kind, self.optional) {
            (ParamKind::Positional, _) => quote! { ::quire_core::Param::positional(#name) },
            (ParamKind::Named, false) => quote! { ::quire_core::Param::named(#name) },
            (ParamKind::Named, true) => quote! { ::quire_core::Param::optional(#name) },
            (ParamKind::Rest, _) => quote! { ::quire_core::Param::var_named(#name) },
            (ParamKind::Request, _) => quote! { ::quire_core::Param::request(#name) },
        }
    }

    /// `let <name>: <ty> = ...;` inside the generated wrapper
    fn binding(&self) -> proc_macro2::TokenStream {
        let name = self.name();
        let ident = &self.ident;
        let ty = &self.ty;
        let value = match (self.kind, self.optional) {
            (ParamKind::Request, _) => quote! { __args.take_request()? },
            (ParamKind::Rest, _) => quote! { __args.rest_as(#name)? },
            (_, true) => quote! { __args.optional(#name)? },
            (_, false) => quote! { __args.required(#name)? },
        };
        quote! { let #ident: #ty = #value; }
    }
}

fn has_marker(param: &PatType, marker: &str) -> bool {
    param.attrs.iter().any(|attr| attr.path().is_ident(marker))
}

/// Last path segment of `ty`, e.g. `Option` for `std::option::Option<T>`
fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path.path.segments.last(),
        _ => None,
    }
}

fn is_request_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == "HttpRequest")
}

fn is_option_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| {
        segment.ident == "Option"
            && matches!(
                &segment.arguments,
                PathArguments::AngleBracketed(args)
                    if matches!(args.args.first(), Some(GenericArgument::Type(_)))
            )
    })
}

fn parse_param(arg: &FnArg) -> syn::Result<HandlerParam> {
    let param = match arg {
        FnArg::Typed(param) => param,
        FnArg::Receiver(receiver) => {
            return Err(syn::Error::new(
                receiver.span(),
                "route handlers must be free functions; `self` is not supported",
            ));
        }
    };

    let ident = match param.pat.as_ref() {
        Pat::Ident(pat_ident) if pat_ident.subpat.is_none() => pat_ident.ident.clone(),
        other => {
            return Err(syn::Error::new(
                other.span(),
                "route handler parameters must be simple identifiers",
            ));
        }
    };

    let named = has_marker(param, "named");
    let rest = has_marker(param, "rest");
    let request = is_request_type(&param.ty);

    let kind = match (named, rest, request) {
        (false, false, false) => ParamKind::Positional,
        (true, false, false) => ParamKind::Named,
        (false, true, false) => ParamKind::Rest,
        (false, false, true) => ParamKind::Request,
        _ => {
            return Err(syn::Error::new(
                param.span(),
                "a parameter can be #[named], #[rest] or the HttpRequest, not several of these",
            ));
        }
    };

    Ok(HandlerParam {
        ident,
        ty: (*param.ty).clone(),
        optional: is_option_type(&param.ty),
        kind,
    })
}

/// Remove `#[named]` / `#[rest]` so the re-emitted function compiles
fn strip_marker_attrs(func: &mut ItemFn) {
    for arg in func.sig.inputs.iter_mut() {
        if let FnArg::Typed(param) = arg {
            param
                .attrs
                .retain(|attr| !attr.path().is_ident("named") && !attr.path().is_ident("rest"));
        }
    }
}

/// Signature rules the macro can check before the route table does
fn check_params(
    params: &[HandlerParam],
    path_params: &[String],
    path: &str,
    span: Span,
) -> syn::Result<()> {
    if let Some(position) = params.iter().position(|p| p.kind == ParamKind::Request)
        && position + 1 != params.len()
    {
        return Err(syn::Error::new(
            params[position + 1].ident.span(),
            "the HttpRequest parameter must be the last parameter",
        ));
    }

    if params.iter().filter(|p| p.kind == ParamKind::Rest).count() > 1 {
        return Err(syn::Error::new(span, "at most one #[rest] parameter is allowed"));
    }

    for param in params {
        if param.kind == ParamKind::Positional
            && !param.optional
            && !path_params.iter().any(|p| *p == param.name())
        {
            return Err(syn::Error::new(
                param.ident.span(),
                format!(
                    "parameter `{}` is not a path parameter of \"{}\"\n\
                     hint: add {{{}}} to the path or mark it #[named]",
                    param.name(),
                    path,
                    param.name()
                ),
            ));
        }
    }

    Ok(())
}

pub fn route_impl(attr: TokenStream, item: TokenStream, method: &str) -> TokenStream {
    let path = parse_macro_input!(attr as LitStr);
    let mut func = parse_macro_input!(item as ItemFn);

    match expand(&path, &mut func, method) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(path: &LitStr, func: &mut ItemFn, method: &str) -> syn::Result<proc_macro2::TokenStream> {
    let path_value = path.value();
    let path_params = validate_route_path(&path_value, path.span())?;

    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            func.sig.generics.span(),
            "route handlers cannot be generic",
        ));
    }

    let params = func
        .sig
        .inputs
        .iter()
        .map(parse_param)
        .collect::<syn::Result<Vec<_>>>()?;
    check_params(&params, &path_params, &path_value, func.sig.ident.span())?;
    strip_marker_attrs(func);

    let func_name = &func.sig.ident;
    let func_vis = &func.vis;
    let handler_name = func_name.to_string();
    let route_fn = format_ident!("{}_route", func_name);
    let method_ident = format_ident!("{}", method);

    let descriptors = params.iter().map(HandlerParam::descriptor);
    // the catch-all drains what is left, so it binds after everything else
    let bindings = params
        .iter()
        .filter(|p| p.kind != ParamKind::Rest)
        .chain(params.iter().filter(|p| p.kind == ParamKind::Rest))
        .map(HandlerParam::binding);
    let call_args = params.iter().map(|p| &p.ident);

    let call = if func.sig.asyncness.is_some() {
        quote! { #func_name(#(#call_args),*).await }
    } else {
        quote! { #func_name(#(#call_args),*) }
    };

    let route_doc = format!(
        "Route handler for `{} {}`, built from [`{}`].",
        method, path_value, handler_name
    );

    Ok(quote! {
        #func

        #[doc = #route_doc]
        #func_vis fn #route_fn() -> ::quire_core::Handler {
            ::quire_core::Handler::new(#handler_name, |__args: ::quire_core::Arguments| async move {
                #[allow(unused_mut, unused_variables)]
                let mut __args = __args;
                #(#bindings)*
                let __reply = #call;
                ::quire_core::IntoReply::into_reply(__reply)
            })
            .params([#(#descriptors),*])
            .route(::quire_core::HttpMethod::#method_ident, #path_value)
        }

        ::quire_core::inventory::submit! {
            ::quire_core::RouteDeclaration::new(::core::module_path!(), #handler_name, #route_fn)
        }
    })
}
