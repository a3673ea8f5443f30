use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Error, Fields, Generics, Ident, LitStr, Result, Token, Type};

const NAMED_ONLY: &str = "`Record` can only be derived for structs with named fields";

pub struct Model {
    pub ident: Ident,
    pub generics: Generics,
    pub naming: Naming,
    pub columns: Vec<Column>,
}

pub enum Naming {
    Default,
    Table(LitStr),
    Capability,
}

pub struct Column {
    pub field: Ident,
    pub ty: Type,
    pub name: String,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub json: bool,
    pub nullable: bool,
    pub flatten: bool,
}

impl TryFrom<&DeriveInput> for Model {
    type Error = Error;

    fn try_from(input: &DeriveInput) -> Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(Error::new(input.ident.span(), NAMED_ONLY));
        };
        let Fields::Named(fields) = &data.fields else {
            return Err(Error::new(data.fields.span(), NAMED_ONLY));
        };

        let mut naming = Naming::Default;
        for opt in options(&input.attrs)? {
            let span = opt.span();
            if !matches!(naming, Naming::Default) {
                return Err(Error::new(span, "cannot specify second table name"));
            }
            naming = match opt {
                Opt::Table(name) => Naming::Table(name),
                Opt::Naming(_) => Naming::Capability,
                _ => return Err(Error::new(span, "unsupported struct option")),
            };
        }

        let mut columns = Vec::with_capacity(fields.named.len());
        for field in &fields.named {
            if let Some(column) = Column::from_field(field)? {
                columns.push(column);
            }
        }

        Ok(Self {
            ident: input.ident.clone(),
            generics: input.generics.clone(),
            naming,
            columns,
        })
    }
}

impl Column {
    fn from_field(field: &syn::Field) -> Result<Option<Self>> {
        let Some(ident) = &field.ident else {
            return Err(Error::new(field.span(), NAMED_ONLY));
        };

        let mut column = Self {
            field: ident.clone(),
            ty: field.ty.clone(),
            name: ident.unraw().to_string(),
            primary_key: false,
            auto_increment: false,
            json: false,
            nullable: false,
            flatten: false,
        };
        let mut renamed = false;
        let mut skip = false;

        for opt in options(&field.attrs)? {
            match opt {
                Opt::Name(name) => {
                    if renamed {
                        return Err(Error::new(name.span(), "cannot specify second column name"));
                    }
                    column.name = name.value();
                    renamed = true;
                }
                Opt::PrimaryKey(_) => column.primary_key = true,
                Opt::AutoIncrement(_) => column.auto_increment = true,
                Opt::Json(_) => column.json = true,
                Opt::Nullable(_) => column.nullable = true,
                Opt::Flatten(_) => column.flatten = true,
                Opt::Skip(_) => skip = true,
                Opt::Table(_) | Opt::Naming(_) => {
                    return Err(Error::new(opt.span(), "unsupported field option"));
                }
            }
        }

        if skip {
            return Ok(None);
        }
        if column.flatten
            && (renamed
                || column.primary_key
                || column.auto_increment
                || column.json
                || column.nullable)
        {
            return Err(Error::new(ident.span(), "`flatten` cannot be combined with column options"));
        }

        Ok(Some(column))
    }

    fn expand_spec(&self) -> TokenStream {
        let ty = &self.ty;
        let field = self.field.unraw().to_string();

        if self.flatten {
            return quote! {
                schema.extend(
                    <#ty as ::tabula_orm::Record>::schema()
                        .into_iter()
                        .map(|spec| spec.nested(#field)),
                );
            };
        }

        let column = &self.name;
        let kind = if self.json {
            quote! { ::tabula_orm::Kind::Json }
        } else {
            quote! { <#ty as ::tabula_orm::Scalar>::kind() }
        };

        let mut flags = Vec::new();
        if self.primary_key {
            flags.push(quote! { .primary_key() });
        }
        if self.auto_increment {
            flags.push(quote! { .auto_increment() });
        }
        if self.json {
            flags.push(quote! { .json() });
        }
        if self.nullable {
            flags.push(quote! { .nullable() });
        }

        quote! {
            schema.push(::tabula_orm::FieldSpec::new(#column, #field, #kind) #(#flags)*);
        }
    }

    fn expand_access(&self, mutable: bool) -> TokenStream {
        let column = &self.name;
        let field = &self.field;

        let (view, reference) = if mutable {
            (quote! { FieldMut }, quote! { &mut self.#field })
        } else {
            (quote! { FieldRef }, quote! { &self.#field })
        };
        let variant = if self.json { quote! { Json } } else { quote! { Scalar } };

        quote! {
            #column => ::std::option::Option::Some(::tabula_orm::#view::#variant(#reference)),
        }
    }
}

impl Model {
    pub fn expand(&self) -> TokenStream {
        let ident = &self.ident;
        let name = ident.unraw().to_string();
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let specs = self.columns.iter().map(Column::expand_spec);
        let direct = || self.columns.iter().filter(|c| !c.flatten);
        let fields = direct().map(|c| c.expand_access(false));
        let fields_mut = direct().map(|c| c.expand_access(true));
        let nested: Vec<_> = self.columns.iter().filter(|c| c.flatten).map(|c| &c.field).collect();

        let table_name = match &self.naming {
            Naming::Default => quote! {},
            Naming::Table(table) => quote! {
                fn table_name() -> ::std::option::Option<::std::string::String> {
                    ::std::option::Option::Some(::std::string::String::from(#table))
                }
            },
            Naming::Capability => quote! {
                fn table_name() -> ::std::option::Option<::std::string::String> {
                    let record = <Self as ::std::default::Default>::default();
                    ::std::option::Option::Some(::tabula_orm::TableNaming::table_name(&record))
                }
            },
        };

        quote! {
            #[automatically_derived]
            impl #impl_generics ::tabula_orm::Record for #ident #ty_generics #where_clause {
                const NAME: &'static str = #name;

                fn schema() -> ::std::vec::Vec<::tabula_orm::FieldSpec> {
                    let mut schema = ::std::vec::Vec::new();
                    #(#specs)*
                    schema
                }

                fn field(&self, column: &str) -> ::std::option::Option<::tabula_orm::FieldRef<'_>> {
                    match column {
                        #(#fields)*
                        _ => {
                            #(
                                if let ::std::option::Option::Some(field) =
                                    ::tabula_orm::Record::field(&self.#nested, column)
                                {
                                    return ::std::option::Option::Some(field);
                                }
                            )*
                            ::std::option::Option::None
                        }
                    }
                }

                fn field_mut(&mut self, column: &str) -> ::std::option::Option<::tabula_orm::FieldMut<'_>> {
                    match column {
                        #(#fields_mut)*
                        _ => {
                            #(
                                if let ::std::option::Option::Some(field) =
                                    ::tabula_orm::Record::field_mut(&mut self.#nested, column)
                                {
                                    return ::std::option::Option::Some(field);
                                }
                            )*
                            ::std::option::Option::None
                        }
                    }
                }

                #table_name
            }
        }
    }
}

fn options(attrs: &[Attribute]) -> Result<Vec<Opt>> {
    let mut opts = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("record")) {
        opts.extend(attr.parse_args_with(Punctuated::<Opt, Token![,]>::parse_terminated)?);
    }
    Ok(opts)
}

mod kw {
    syn::custom_keyword!(table);
    syn::custom_keyword!(naming);
    syn::custom_keyword!(name);
    syn::custom_keyword!(primary_key);
    syn::custom_keyword!(auto_increment);
    syn::custom_keyword!(json);
    syn::custom_keyword!(nullable);
    syn::custom_keyword!(skip);
    syn::custom_keyword!(flatten);
}

enum Opt {
    Table(LitStr),
    Naming(Span),
    Name(LitStr),
    PrimaryKey(Span),
    AutoIncrement(Span),
    Json(Span),
    Nullable(Span),
    Skip(Span),
    Flatten(Span),
}

impl Opt {
    fn span(&self) -> Span {
        match self {
            Self::Table(lit) | Self::Name(lit) => lit.span(),
            Self::Naming(span)
            | Self::PrimaryKey(span)
            | Self::AutoIncrement(span)
            | Self::Json(span)
            | Self::Nullable(span)
            | Self::Skip(span)
            | Self::Flatten(span) => *span,
        }
    }
}

impl Parse for Opt {
    fn parse(input: ParseStream) -> Result<Self> {
        let l = input.lookahead1();
        if l.peek(kw::table) {
            input.parse::<kw::table>()?;
            input.parse::<Token![=]>()?;
            Ok(Self::Table(input.parse::<LitStr>()?))
        } else if l.peek(kw::name) {
            input.parse::<kw::name>()?;
            input.parse::<Token![=]>()?;
            Ok(Self::Name(input.parse::<LitStr>()?))
        } else if l.peek(kw::naming) {
            Ok(Self::Naming(input.parse::<kw::naming>()?.span))
        } else if l.peek(kw::primary_key) {
            Ok(Self::PrimaryKey(input.parse::<kw::primary_key>()?.span))
        } else if l.peek(kw::auto_increment) {
            Ok(Self::AutoIncrement(input.parse::<kw::auto_increment>()?.span))
        } else if l.peek(kw::json) {
            Ok(Self::Json(input.parse::<kw::json>()?.span))
        } else if l.peek(kw::nullable) {
            Ok(Self::Nullable(input.parse::<kw::nullable>()?.span))
        } else if l.peek(kw::skip) {
            Ok(Self::Skip(input.parse::<kw::skip>()?.span))
        } else if l.peek(kw::flatten) {
            Ok(Self::Flatten(input.parse::<kw::flatten>()?.span))
        } else {
            Err(l.error())
        }
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn model(input: TokenStream) -> Result<Model> {
        let input: DeriveInput = syn::parse2(input).expect("should parse");
        Model::try_from(&input)
    }

    #[test]
    fn parse_columns() {
        let parsed = model(quote! {
            #[derive(Default)]
            pub struct Post {
                #[record(primary_key, auto_increment)]
                pub id: i64,
                #[record(name = "headline")]
                pub title: String,
                #[record(json, nullable)]
                pub tags: Vec<String>,
                #[record(skip)]
                pub cached: bool,
                pub r#type: String,
            }
        })
        .expect("should build model");

        assert!(matches!(parsed.naming, Naming::Default));
        let names: Vec<_> = parsed.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "headline", "tags", "type"]);

        let id = &parsed.columns[0];
        assert!(id.primary_key && id.auto_increment);
        assert!(!id.json && !id.nullable);

        let tags = &parsed.columns[2];
        assert!(tags.json && tags.nullable);
        assert_eq!(parsed.columns[1].field, "title");
    }

    #[test]
    fn parse_table_naming() {
        let parsed = model(quote! {
            #[record(table = "audit_log")]
            struct Entry {
                id: i64,
            }
        })
        .expect("should build model");
        let Naming::Table(table) = &parsed.naming else {
            panic!("expected explicit table name");
        };
        assert_eq!(table.value(), "audit_log");

        let parsed = model(quote! {
            #[record(naming)]
            struct Entry {
                id: i64,
            }
        })
        .expect("should build model");
        assert!(matches!(parsed.naming, Naming::Capability));
    }

    #[test]
    fn reject_unsupported_shapes() {
        let err = model(quote! { struct Pair(i64, String); }).err().expect("tuple struct");
        assert_eq!(err.to_string(), NAMED_ONLY);

        let err = model(quote! { enum Status { On, Off } }).err().expect("enum");
        assert_eq!(err.to_string(), NAMED_ONLY);
    }

    #[test]
    fn reject_misplaced_options() {
        let err = model(quote! {
            #[record(table = "a", naming)]
            struct Entry { id: i64 }
        })
        .err()
        .expect("two names");
        assert_eq!(err.to_string(), "cannot specify second table name");

        let err = model(quote! {
            struct Entry {
                #[record(flatten, nullable)]
                audit: Audit,
            }
        })
        .err()
        .expect("flatten with options");
        assert!(err.to_string().contains("flatten"));

        let err = model(quote! {
            struct Entry {
                #[record(primary)]
                id: i64,
            }
        })
        .err()
        .expect("unknown option");
        assert!(err.to_string().starts_with("expected one of"));
    }

    #[test]
    fn expand_impl() {
        let parsed = model(quote! {
            struct Order {
                #[record(primary_key)]
                id: i64,
                #[record(json)]
                lines: Vec<Line>,
                #[record(flatten)]
                audit: Audit,
            }
        })
        .expect("should build model");

        let expanded = parsed.expand().to_string();
        assert!(expanded.contains(":: tabula_orm :: Record for Order"));
        assert!(expanded.contains("const NAME : & 'static str = \"Order\""));
        assert!(expanded.contains(":: tabula_orm :: FieldRef :: Json (& self . lines)"));
        assert!(expanded.contains(":: tabula_orm :: FieldMut :: Scalar (& mut self . id)"));
        assert!(expanded.contains("spec . nested (\"audit\")"));
        assert!(!expanded.contains("fn table_name"));
    }
}
