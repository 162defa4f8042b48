//! Declaration parser
//!
//! Recursive descent over the token stream produced by [`Lexer`].

use crate::decl::lexer::{Lexer, Token};
use crate::error::{RegistrationError, Result};

/// Reference modifier of a parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    In,
    Out,
    InOut,
}

/// Unresolved type expression, e.g. `const array<Player@>@`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub is_const: bool,
    /// Type name with any namespace qualifier stripped
    pub name: String,
    pub subtypes: Vec<TypeExpr>,
    pub is_handle: bool,
    pub reference: Option<RefKind>,
}

/// Function or method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub ty: TypeExpr,
    pub name: Option<String>,
    pub has_default: bool,
}

/// Parsed function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub return_type: TypeExpr,
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub is_const: bool,
}

/// Parsed property declaration
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub ty: TypeExpr,
    pub name: String,
}

/// Parse `ret name(params) [const]`
pub fn parse_function(decl: &str) -> Result<FunctionDecl> {
    let mut parser = Parser::new(decl)?;
    let return_type = parser.parse_type()?;
    let name = parser.expect_identifier("function name")?;
    parser.expect(Token::LParen, "'('")?;
    let params = parser.parse_param_list(Token::RParen)?;
    parser.expect(Token::RParen, "')'")?;
    let is_const = parser.match_keyword("const");
    parser.expect(Token::EOF, "end of declaration")?;

    Ok(FunctionDecl {
        return_type,
        name,
        params,
        is_const,
    })
}

/// Parse a bare parameter list such as `float x, float y`
pub fn parse_params(decl: &str) -> Result<Vec<ParamDecl>> {
    let mut parser = Parser::new(decl)?;
    let params = parser.parse_param_list(Token::EOF)?;
    parser.expect(Token::EOF, "end of declaration")?;
    Ok(params)
}

/// Parse `type name`
pub fn parse_property(decl: &str) -> Result<PropertyDecl> {
    let mut parser = Parser::new(decl)?;
    let ty = parser.parse_type()?;
    let name = parser.expect_identifier("property name")?;
    parser.expect(Token::EOF, "end of declaration")?;
    Ok(PropertyDecl { ty, name })
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self> {
        Ok(Self {
            source,
            tokens: Lexer::new(source).tokenize()?,
            position: 0,
        })
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::EOF)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.current(), Token::Identifier(ident) if ident == keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.match_token(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {:?}", what, self.current())))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        match self.advance() {
            Token::Identifier(ident) => Ok(ident),
            other => Err(self.error(format!("expected {}, found {:?}", what, other))),
        }
    }

    fn error(&self, message: String) -> RegistrationError {
        RegistrationError::malformed(self.source, message)
    }

    fn parse_type(&mut self) -> Result<TypeExpr> {
        let is_const = self.match_keyword("const");

        let mut name = if self.match_token(Token::Question) {
            "?".to_string()
        } else {
            self.expect_identifier("type name")?
        };
        while self.match_token(Token::DoubleColon) {
            name = self.expect_identifier("type name after '::'")?;
        }

        let mut subtypes = Vec::new();
        if self.match_token(Token::Less) {
            loop {
                subtypes.push(self.parse_type()?);
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::Greater, "'>'")?;
        }

        let is_handle = self.match_token(Token::At);

        let reference = if self.match_token(Token::Amp) {
            if self.match_keyword("in") {
                Some(RefKind::In)
            } else if self.match_keyword("out") {
                Some(RefKind::Out)
            } else {
                self.match_keyword("inout");
                Some(RefKind::InOut)
            }
        } else {
            None
        };

        Ok(TypeExpr {
            is_const,
            name,
            subtypes,
            is_handle,
            reference,
        })
    }

    fn parse_param_list(&mut self, terminator: Token) -> Result<Vec<ParamDecl>> {
        let mut params = Vec::new();
        if self.check(&terminator) {
            return Ok(params);
        }

        loop {
            let ty = self.parse_type()?;
            let name = match self.current() {
                Token::Identifier(ident) => {
                    let ident = ident.clone();
                    self.advance();
                    Some(ident)
                }
                _ => None,
            };
            let has_default = self.match_token(Token::Assign);
            if has_default {
                self.skip_default_value()?;
            }
            params.push(ParamDecl {
                ty,
                name,
                has_default,
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Skip a default value expression up to the next top level `,` or `)`
    fn skip_default_value(&mut self) -> Result<()> {
        let mut depth = 0usize;
        let mut consumed = 0usize;
        loop {
            match self.current() {
                Token::EOF => break,
                Token::Comma if depth == 0 => break,
                Token::RParen if depth == 0 => break,
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
            consumed += 1;
        }

        if consumed == 0 {
            return Err(self.error("missing default value".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_function() {
        let decl = parse_function("uint Hash(const string &in value)").unwrap();
        assert_eq!(decl.name, "Hash");
        assert_eq!(decl.return_type.name, "uint");
        assert_eq!(decl.params.len(), 1);

        let param = &decl.params[0];
        assert!(param.ty.is_const);
        assert_eq!(param.ty.name, "string");
        assert_eq!(param.ty.reference, Some(RefKind::In));
        assert_eq!(param.name.as_deref(), Some("value"));
    }

    #[test]
    fn test_parse_template_and_namespace() {
        let decl = parse_function("array<alt::Player@>@ GetAllPlayers()").unwrap();
        assert!(decl.params.is_empty());
        assert_eq!(decl.return_type.name, "array");
        assert!(decl.return_type.is_handle);

        let element = &decl.return_type.subtypes[0];
        assert_eq!(element.name, "Player");
        assert!(element.is_handle);
    }

    #[test]
    fn test_parse_defaults_and_unnamed() {
        let decl =
            parse_function("void Emit(const string&in, ?&in arg = \"x\", int n = max(1, 2)) const")
                .unwrap();
        assert!(decl.is_const);
        assert_eq!(decl.params.len(), 3);
        assert_eq!(decl.params[0].name, None);
        assert_eq!(decl.params[1].ty.name, "?");
        assert!(decl.params[1].has_default);
        assert!(decl.params[2].has_default);
    }

    #[test]
    fn test_parse_params_and_property() {
        let params = parse_params("float x, float y, float z").unwrap();
        assert_eq!(params.len(), 3);
        assert!(parse_params("").unwrap().is_empty());

        let prop = parse_property("Vector3f pos").unwrap();
        assert_eq!(prop.ty.name, "Vector3f");
        assert_eq!(prop.name, "pos");
    }

    #[test]
    fn test_malformed_declarations() {
        assert!(parse_function("void ()").is_err());
        assert!(parse_function("void Foo(int").is_err());
        assert!(parse_function("void Foo(int x) extra").is_err());
        assert!(parse_function("array<int Foo()").is_err());
        assert!(parse_function("void Foo(int x = )").is_err());
        assert!(parse_property("int").is_err());
    }
}
