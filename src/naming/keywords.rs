//! Reserved words the allocator must never hand out.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// C++ keywords, alternative operator spellings, contextual identifiers and
/// the preprocessor directive names that double as identifiers.
static CPP_RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alignas",
        "alignof",
        "and",
        "and_eq",
        "asm",
        "auto",
        "bitand",
        "bitor",
        "bool",
        "break",
        "case",
        "catch",
        "char",
        "char8_t",
        "char16_t",
        "char32_t",
        "class",
        "compl",
        "concept",
        "const",
        "consteval",
        "constexpr",
        "constinit",
        "const_cast",
        "continue",
        "co_await",
        "co_return",
        "co_yield",
        "decltype",
        "default",
        "delete",
        "do",
        "double",
        "dynamic_cast",
        "else",
        "enum",
        "explicit",
        "export",
        "extern",
        "false",
        "float",
        "for",
        "friend",
        "goto",
        "if",
        "inline",
        "int",
        "long",
        "mutable",
        "namespace",
        "new",
        "noexcept",
        "not",
        "not_eq",
        "nullptr",
        "operator",
        "or",
        "or_eq",
        "private",
        "protected",
        "public",
        "register",
        "reinterpret_cast",
        "requires",
        "restrict",
        "return",
        "short",
        "signed",
        "sizeof",
        "static",
        "static_assert",
        "static_cast",
        "struct",
        "switch",
        "template",
        "this",
        "thread_local",
        "throw",
        "true",
        "try",
        "typedef",
        "typeid",
        "typename",
        "union",
        "unsigned",
        "using",
        "virtual",
        "void",
        "volatile",
        "wchar_t",
        "while",
        "xor",
        "xor_eq",
        // contextual
        "final",
        "override",
        "import",
        "module",
        // preprocessor
        "define",
        "defined",
        "elif",
        "endif",
        "error",
        "ifdef",
        "ifndef",
        "include",
        "line",
        "pragma",
        "undef",
    ]
    .into_iter()
    .collect()
});

/// Immutable reserved-word set consulted before a short name is handed out.
#[derive(Debug, Clone, Default)]
pub struct KeywordGuard {
    extra: HashSet<String>,
}

impl KeywordGuard {
    /// Guard over the built-in C++ reserved words only
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard that additionally rejects the given words
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: extra.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` may not be used as an identifier.
    pub fn is_reserved(&self, name: &str) -> bool {
        CPP_RESERVED.contains(name) || self.extra.contains(name)
    }
}
