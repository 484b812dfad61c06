use std::result::Result;

use proc_macro2::{Delimiter, Literal, Spacing, Span, TokenStream, TokenTree};
use quote::quote_spanned;
// The glob also brings unsynn's one-parameter `Result` alias; the explicit
// import above keeps the std two-parameter form in this module.
use unsynn::*;

keyword! {
    KStruct = "struct";
    KEnum = "enum";
    KUnion = "union";
    KPub = "pub";
}

unsynn! {
    /// Visibility: `pub`, `pub(...)` or nothing
    enum Vis {
        PubIn(Cons<KPub, ParenthesisGroup>),
        Pub(KPub),
    }

    /// An outer attribute: `#[...]`
    struct Attribute {
        _pound: Pound,
        content: BracketGroup,
    }

    /// The derive input, split just far enough to tell structs apart from
    /// everything we refuse
    enum Item {
        Struct(StructItem),
        Enum(EnumItem),
        Union(UnionItem),
    }

    struct StructItem {
        _attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        _kw_struct: KStruct,
        name: Ident,
        rest: Vec<TokenTree>,
    }

    struct EnumItem {
        _attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        _kw_enum: KEnum,
        name: Ident,
    }

    struct UnionItem {
        _attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        _kw_union: KUnion,
        name: Ident,
    }
}

/// A message to surface as `compile_error!` at a span.
pub(crate) struct DeriveError {
    message: String,
    span: Span,
}

impl DeriveError {
    fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub(crate) fn into_compile_error(self) -> TokenStream {
        let message = self.message;
        quote_spanned! { self.span =>
            ::core::compile_error!(#message);
        }
    }
}

/// A struct that `#[derive(Shaped)]` accepts.
pub(crate) struct ParsedStruct {
    pub(crate) name: Ident,
    pub(crate) fields: Vec<ParsedField>,
}

/// One named field, with its `#[gale(...)]` options applied.
pub(crate) struct ParsedField {
    pub(crate) ident: Ident,
    pub(crate) ty: TokenStream,
    pub(crate) tag: Option<String>,
    pub(crate) ignore: bool,
}

impl ParsedField {
    /// The field name without any `r#` prefix.
    pub(crate) fn name(&self) -> String {
        let name = self.ident.to_string();
        match name.strip_prefix("r#") {
            Some(stripped) => stripped.to_owned(),
            None => name,
        }
    }

    /// Whether the field takes part in encoding and decoding.
    pub(crate) fn is_serialized(&self) -> bool {
        !self.ignore && self.tag.as_deref() != Some("-")
    }
}

pub(crate) fn parse_struct(input: TokenStream) -> Result<ParsedStruct, DeriveError> {
    let mut iter = input.to_token_iter();
    let item: Item = iter
        .parse()
        .map_err(|err| DeriveError::new(Span::call_site(), err.to_string()))?;

    let item = match item {
        Item::Struct(item) => item,
        Item::Enum(item) => {
            return Err(DeriveError::new(
                item.name.span(),
                "#[derive(Shaped)] only supports structs with named fields, not enums",
            ));
        }
        Item::Union(item) => {
            return Err(DeriveError::new(
                item.name.span(),
                "#[derive(Shaped)] only supports structs with named fields, not unions",
            ));
        }
    };

    let name = item.name;
    let body = match item.rest.as_slice() {
        [TokenTree::Group(group)] if group.delimiter() == Delimiter::Brace => group.stream(),
        [TokenTree::Punct(p), ..] if p.as_char() == '<' => {
            return Err(DeriveError::new(
                p.span(),
                "#[derive(Shaped)] does not support generic structs",
            ));
        }
        [TokenTree::Group(group), ..] if group.delimiter() == Delimiter::Parenthesis => {
            return Err(DeriveError::new(
                group.span(),
                "#[derive(Shaped)] does not support tuple structs",
            ));
        }
        [TokenTree::Punct(p)] if p.as_char() == ';' => {
            return Err(DeriveError::new(
                name.span(),
                "#[derive(Shaped)] does not support unit structs",
            ));
        }
        _ => {
            return Err(DeriveError::new(
                name.span(),
                "#[derive(Shaped)] expects a plain struct with named fields",
            ));
        }
    };

    let fields = split_top_level_commas(body)
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .map(parse_field)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedStruct { name, fields })
}

/// Splits on commas that are not nested inside `<...>`.
///
/// Brackets, braces and parentheses already arrive as groups; angle brackets
/// do not, so their depth is tracked here. The `>` of `->` is not a closer.
fn split_top_level_commas(stream: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut chunks = vec![Vec::new()];
    let mut depth = 0_usize;
    let mut after_joint_dash = false;

    for tt in stream {
        let mut joint_dash = false;
        if let TokenTree::Punct(p) = &tt {
            match p.as_char() {
                '<' => depth += 1,
                '>' if !after_joint_dash => depth = depth.saturating_sub(1),
                '-' => joint_dash = p.spacing() == Spacing::Joint,
                ',' if depth == 0 => {
                    chunks.push(Vec::new());
                    after_joint_dash = false;
                    continue;
                }
                _ => {}
            }
        }
        after_joint_dash = joint_dash;
        if let Some(chunk) = chunks.last_mut() {
            chunk.push(tt);
        }
    }

    chunks
}

fn parse_field(tokens: Vec<TokenTree>) -> Result<ParsedField, DeriveError> {
    let mut tokens = tokens.into_iter().peekable();
    let mut tag = None;
    let mut ignore = false;

    // Attributes
    while let Some(TokenTree::Punct(p)) = tokens.peek() {
        if p.as_char() != '#' {
            break;
        }
        let pound_span = p.span();
        tokens.next();
        match tokens.next() {
            Some(TokenTree::Group(group)) if group.delimiter() == Delimiter::Bracket => {
                apply_attribute(group.stream(), &mut tag, &mut ignore)?;
            }
            _ => return Err(DeriveError::new(pound_span, "expected `[` after `#`")),
        }
    }

    // Visibility
    if let Some(TokenTree::Ident(ident)) = tokens.peek()
        && ident == "pub"
    {
        tokens.next();
        if let Some(TokenTree::Group(group)) = tokens.peek()
            && group.delimiter() == Delimiter::Parenthesis
        {
            tokens.next();
        }
    }

    let ident = match tokens.next() {
        Some(TokenTree::Ident(ident)) => ident,
        Some(other) => return Err(DeriveError::new(other.span(), "expected a field name")),
        None => return Err(DeriveError::new(Span::call_site(), "expected a field name")),
    };

    match tokens.next() {
        Some(TokenTree::Punct(p)) if p.as_char() == ':' => {}
        _ => {
            return Err(DeriveError::new(
                ident.span(),
                "expected `:` after the field name",
            ));
        }
    }

    let ty: TokenStream = tokens.collect();
    if ty.is_empty() {
        return Err(DeriveError::new(ident.span(), "expected a field type"));
    }

    Ok(ParsedField {
        ident,
        ty,
        tag,
        ignore,
    })
}

/// Applies `gale(...)` options from one attribute; other attributes are left alone.
fn apply_attribute(
    content: TokenStream,
    tag: &mut Option<String>,
    ignore: &mut bool,
) -> Result<(), DeriveError> {
    let mut tokens = content.into_iter();
    let gale_span = match tokens.next() {
        Some(TokenTree::Ident(ident)) if ident == "gale" => ident.span(),
        _ => return Ok(()),
    };
    let args = match tokens.next() {
        Some(TokenTree::Group(group)) if group.delimiter() == Delimiter::Parenthesis => {
            group.stream()
        }
        _ => return Err(DeriveError::new(gale_span, "expected `gale(...)`")),
    };

    for option in split_top_level_commas(args) {
        match option.as_slice() {
            [] => {}
            [TokenTree::Ident(key)] if key == "ignore" => *ignore = true,
            [TokenTree::Ident(key), TokenTree::Punct(eq), TokenTree::Literal(lit)]
                if key == "tag" && eq.as_char() == '=' =>
            {
                if tag.is_some() {
                    return Err(DeriveError::new(key.span(), "duplicate `tag` option"));
                }
                *tag = Some(string_literal(lit)?);
            }
            [first, ..] => {
                return Err(DeriveError::new(
                    first.span(),
                    "unknown gale option; expected `tag = \"...\"` or `ignore`",
                ));
            }
        }
    }

    Ok(())
}

fn string_literal(lit: &Literal) -> Result<String, DeriveError> {
    let repr = lit.to_string();
    match repr.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) if !inner.contains('\\') => Ok(inner.to_owned()),
        Some(_) => Err(DeriveError::new(
            lit.span(),
            "escape sequences are not supported in tags",
        )),
        None => Err(DeriveError::new(lit.span(), "expected a string literal")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse(input: TokenStream) -> ParsedStruct {
        match parse_struct(input) {
            Ok(parsed) => parsed,
            Err(err) => panic!("parse failed: {}", err.message),
        }
    }

    fn parse_err(input: TokenStream) -> String {
        match parse_struct(input) {
            Ok(_) => panic!("expected an error"),
            Err(err) => err.message,
        }
    }

    #[test]
    fn named_fields_with_generic_types() {
        let parsed = parse(quote! {
            #[derive(Shaped)]
            pub struct Record {
                /// The id
                pub id: i64,
                pub(crate) scores: HashMap<String, Vec<u32>>,
                r#type: String,
            }
        });

        assert_eq!(parsed.name.to_string(), "Record");
        let names: Vec<String> = parsed.fields.iter().map(ParsedField::name).collect();
        assert_eq!(names, ["id", "scores", "type"]);
        assert_eq!(
            parsed.fields[1].ty.to_string(),
            quote!(HashMap<String, Vec<u32>>).to_string()
        );
    }

    #[test]
    fn gale_options() {
        let parsed = parse(quote! {
            struct Tagged {
                #[gale(tag = "Balance,omitempty")]
                balance: f64,
                #[gale(ignore)]
                cache: Vec<u8>,
                #[gale(tag = "-")]
                hidden: bool,
            }
        });

        assert_eq!(parsed.fields[0].tag.as_deref(), Some("Balance,omitempty"));
        assert!(parsed.fields[0].is_serialized());
        assert!(parsed.fields[1].ignore);
        assert!(!parsed.fields[1].is_serialized());
        assert!(!parsed.fields[2].is_serialized());
    }

    #[test]
    fn fn_pointer_arrow_does_not_close_angles() {
        let parsed = parse(quote! {
            struct Callbacks {
                f: Option<Box<fn(u8) -> u8>>,
                g: bool,
            }
        });
        assert_eq!(parsed.fields.len(), 2);
    }

    #[test]
    fn errors_carry_the_derive_message() {
        let err = match parse_struct(quote! { union V { a: u8 } }) {
            Ok(_) => panic!("expected an error"),
            Err(err) => err,
        };
        let tokens = err.into_compile_error().to_string();
        assert!(tokens.contains("compile_error"));
        assert!(tokens.contains("not unions"));
    }

    #[test]
    fn rejects_unsupported_items() {
        assert!(parse_err(quote! { enum E { A } }).contains("not enums"));
        assert!(parse_err(quote! { struct T(u8); }).contains("tuple structs"));
        assert!(parse_err(quote! { struct U; }).contains("unit structs"));
        assert!(parse_err(quote! { struct G<T> { t: T } }).contains("generic"));
        assert!(
            parse_err(quote! { struct S { #[gale(rename = "x")] a: u8 } })
                .contains("unknown gale option")
        );
    }
}
