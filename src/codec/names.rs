//! codec::names
//!
//! Parser for the type names carried by legacy (v9-v13) metadata.
//!
//! Legacy layouts describe storage, call and constant types as source-level
//! strings such as `Vec<T::AccountId>` or `(u32, BalanceOf<T>)`. This module
//! turns them into a [`TypeExpr`] tree with a canonical spelling, which the
//! converter interns into the portable lookup.
//!
//! # Grammar
//!
//! ```text
//! expr  := tuple | array | qself | path
//! tuple := '(' [expr (',' expr)* [',']] ')'
//! array := '[' expr ';' int ']'
//! qself := '<' expr 'as' path '>' '::' ident
//! path  := ident ('::' ident)* ['<' expr (',' expr)* '>']
//! ```
//!
//! A leading `T::` segment (the runtime's generic parameter) is dropped, so
//! `T::AccountId` and `AccountId` canonicalize to the same expression.
//!
//! # Example
//!
//! ```
//! use metaconform::codec::names::TypeExpr;
//!
//! let expr = TypeExpr::parse("Vec<(T::AccountId,  u32)>").unwrap();
//! assert_eq!(expr.to_string(), "Vec<(AccountId, u32)>");
//! ```

use std::fmt;

use super::CodecError;

/// Nesting limit for generic arguments, tuples and arrays in one type name.
pub const TYPE_NAME_DEPTH_LIMIT: usize = 64;

/// Parsed legacy type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A path with optional generic arguments, e.g. `Vec<u8>` or `system::Phase`.
    Path { segments: Vec<String>, args: Vec<TypeExpr> },
    /// A tuple; the empty tuple is the unit type.
    Tuple(Vec<TypeExpr>),
    /// A fixed-length array.
    Array(Box<TypeExpr>, u32),
}

impl TypeExpr {
    /// Parse a legacy type name.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::TypeName` if the name does not match the grammar.
    pub fn parse(input: &str) -> Result<Self, CodecError> {
        let mut parser = Parser::new(input);
        let expr = parser.expr()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Last path segment, if this is a path.
    pub fn ident(&self) -> Option<&str> {
        match self {
            TypeExpr::Path { segments, .. } => segments.last().map(String::as_str),
            _ => None,
        }
    }

    /// Generic arguments, if this is a path.
    pub fn args(&self) -> &[TypeExpr] {
        match self {
            TypeExpr::Path { args, .. } => args,
            _ => &[],
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Path { segments, args } => {
                write!(f, "{}", segments.join("::"))?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeExpr::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            TypeExpr::Array(inner, len) => write!(f, "[{inner}; {len}]"),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: &str) -> CodecError {
        CodecError::TypeName {
            name: truncated(self.input),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), CodecError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn ident(&mut self) -> Result<String, CodecError> {
        self.skip_ws();
        let len = self
            .rest()
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error("expected identifier"));
        }
        let ident = self.rest()[..len].to_string();
        self.pos += len;
        Ok(ident)
    }

    fn expr(&mut self) -> Result<TypeExpr, CodecError> {
        if self.depth >= TYPE_NAME_DEPTH_LIMIT {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let expr = match self.peek() {
            Some('(') => self.tuple(),
            Some('[') => self.array(),
            Some('<') => self.qualified_self(),
            Some(_) => self.path(),
            None => Err(self.error("unexpected end of type name")),
        };
        self.depth -= 1;
        expr
    }

    fn tuple(&mut self) -> Result<TypeExpr, CodecError> {
        self.expect("(")?;
        let mut items = Vec::new();
        loop {
            if self.eat(")") {
                break;
            }
            items.push(self.expr()?);
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }
        Ok(TypeExpr::Tuple(items))
    }

    fn array(&mut self) -> Result<TypeExpr, CodecError> {
        self.expect("[")?;
        let inner = self.expr()?;
        self.expect(";")?;
        let digits = self.ident()?;
        let len = digits
            .parse::<u32>()
            .map_err(|_| self.error("array length must be an integer"))?;
        self.expect("]")?;
        Ok(TypeExpr::Array(Box::new(inner), len))
    }

    /// `<T as Trait>::Name` resolves to `Name`.
    fn qualified_self(&mut self) -> Result<TypeExpr, CodecError> {
        self.expect("<")?;
        self.expr()?;
        if !self.eat("as") {
            return Err(self.error("expected 'as' in qualified path"));
        }
        self.path()?;
        self.expect(">")?;
        self.expect("::")?;
        let name = self.ident()?;
        Ok(TypeExpr::Path {
            segments: vec![name],
            args: Vec::new(),
        })
    }

    fn path(&mut self) -> Result<TypeExpr, CodecError> {
        let mut segments = vec![self.ident()?];
        while self.eat("::") {
            segments.push(self.ident()?);
        }
        if segments.len() > 1 && segments[0] == "T" {
            segments.remove(0);
        }

        let mut args = Vec::new();
        // `as` belongs to an enclosing qualified path, `>` closes it.
        if self.peek() == Some('<') {
            self.expect("<")?;
            loop {
                args.push(self.expr()?);
                if !self.eat(",") {
                    self.expect(">")?;
                    break;
                }
                if self.eat(">") {
                    break;
                }
            }
        }
        Ok(TypeExpr::Path { segments, args })
    }
}

/// Type names quoted in errors are cut to a readable length.
fn truncated(name: &str) -> String {
    const MAX: usize = 80;
    match name.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &name[..end]),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(input: &str) -> String {
        TypeExpr::parse(input).unwrap().to_string()
    }

    #[test]
    fn primitives_and_paths() {
        assert_eq!(canonical("u32"), "u32");
        assert_eq!(canonical("system::Phase"), "system::Phase");
        assert_eq!(canonical("T::AccountId"), "AccountId");
    }

    #[test]
    fn generics_and_whitespace() {
        assert_eq!(canonical("Vec< T::Balance >"), "Vec<Balance>");
        assert_eq!(canonical("BTreeMap<u32,Vec<u8>>"), "BTreeMap<u32, Vec<u8>>");
        assert_eq!(canonical("Vec<u8,>"), "Vec<u8>");
    }

    #[test]
    fn tuples_and_unit() {
        assert_eq!(canonical("()"), "()");
        assert_eq!(canonical("(u32, T::Hash,)"), "(u32, Hash)");
    }

    #[test]
    fn arrays() {
        assert_eq!(canonical("[u8; 32]"), "[u8; 32]");
        assert_eq!(canonical("[ (u8, u16) ;4 ]"), "[(u8, u16); 4]");
    }

    #[test]
    fn qualified_self_resolves_to_item() {
        assert_eq!(canonical("<T as Trait>::Moment"), "Moment");
        assert_eq!(canonical("Vec<<T as Trait<I>>::Balance>"), "Vec<Balance>");
    }

    #[test]
    fn malformed_names_rejected() {
        for bad in ["", "Vec<u8", "(u8", "[u8; x]", "u8 u16", "<T>::X", "::"] {
            assert!(
                matches!(TypeExpr::parse(bad), Err(CodecError::TypeName { .. })),
                "expected parse failure for {bad:?}"
            );
        }
    }

    #[test]
    fn ident_and_args_accessors() {
        let expr = TypeExpr::parse("Option<u64>").unwrap();
        assert_eq!(expr.ident(), Some("Option"));
        assert_eq!(expr.args().len(), 1);
        assert_eq!(TypeExpr::parse("()").unwrap().ident(), None);
    }

    #[test]
    fn deep_nesting_rejected() {
        let deep = format!("{}u8{}", "Vec<".repeat(50_000), ">".repeat(50_000));
        match TypeExpr::parse(&deep) {
            Err(CodecError::TypeName { name, reason }) => {
                assert!(reason.starts_with("nesting too deep"), "{reason}");
                assert!(name.len() < 100);
            }
            other => panic!("expected nesting error, got {other:?}"),
        }

        let tuples = format!("{}u8{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(TypeExpr::parse(&tuples).is_err());
    }

    #[test]
    fn nesting_within_limit_parses() {
        let depth = TYPE_NAME_DEPTH_LIMIT - 1;
        let name = format!("{}u8{}", "Vec<".repeat(depth), ">".repeat(depth));
        assert_eq!(canonical(&name), name);
    }
}
