use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use super::language::{is_type_variable, GlobalName, LocalName};
use super::program::Module;
use super::types::core::{Param, Suffix, Type, Variant};
use super::types::definitions::TypeDef;
use super::types::error::labels_from_span;
use crate::location::{FileName, Point, Span, Spanning};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKind {
    Name,
    Number,
    Colon,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    HashBracket,
    LBrace,
    RBrace,
    Arrow,
    FatArrow,
    Bar,
    Plus,
    Backslash,
    Delegate,
    Question,
    Ellipsis,
    Caret,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
    text: ArcStr,
    value: f64,
    newline_before: bool,
}

#[derive(Clone, Debug)]
pub enum SyntaxError {
    UnexpectedCharacter(Span, char),
    UnexpectedToken(Span, &'static str, ArcStr),
    UnexpectedEnd(Span, &'static str),
    MalformedNumber(Span, ArcStr),
    UnbalancedBracket(Span, &'static str),
    DuplicateRecordField(Span, Span, LocalName),
    VariadicNotInFinalPosition(Span),
    SuffixOnOutput(Span),
    ReservedWord(Span, ArcStr),
}

impl SyntaxError {
    pub fn to_report(&self, source_code: Arc<str>) -> miette::Report {
        match self {
            Self::UnexpectedCharacter(span, c) => {
                let labels = labels_from_span(span);
                miette::miette!(labels = labels, "Unexpected character `{}`.", c)
            }
            Self::UnexpectedToken(span, expected, found) => {
                let labels = labels_from_span(span);
                miette::miette!(labels = labels, "Expected {}, found `{}`.", expected, found)
            }
            Self::UnexpectedEnd(span, expected) => {
                let labels = labels_from_span(span);
                miette::miette!(labels = labels, "Expected {}, but the source ended.", expected)
            }
            Self::MalformedNumber(span, text) => {
                let labels = labels_from_span(span);
                miette::miette!(labels = labels, "`{}` is not a valid number.", text)
            }
            Self::UnbalancedBracket(span, closer) => {
                let labels = labels_from_span(span);
                miette::miette!(labels = labels, "Expected `{}` to close the bracket.", closer)
            }
            Self::DuplicateRecordField(span1, span2, name) => {
                let mut labels = labels_from_span(span1);
                let mut labels2 = labels_from_span(span2);
                labels2
                    .iter_mut()
                    .for_each(|x| x.set_label(Some("first declared here".to_owned())));
                labels.extend(labels2);
                miette::miette!(
                    labels = labels,
                    "Field `{}` appears twice in one record.",
                    name
                )
            }
            Self::VariadicNotInFinalPosition(span) => {
                let labels = labels_from_span(span);
                miette::miette!(
                    labels = labels,
                    "A variadic parameter must be the last input."
                )
            }
            Self::SuffixOnOutput(span) => {
                let labels = labels_from_span(span);
                miette::miette!(
                    labels = labels,
                    "`?` and `...` suffixes are only allowed on function inputs."
                )
            }
            Self::ReservedWord(span, word) => {
                let labels = labels_from_span(span);
                miette::miette!(
                    labels = labels,
                    "`{}` is reserved and cannot name a type.",
                    word
                )
            }
        }
        .with_source_code(source_code)
    }

    pub fn spans(&self) -> (Span, Option<Span>) {
        match self {
            Self::DuplicateRecordField(span1, span2, _) => (span1.clone(), Some(span2.clone())),

            Self::UnexpectedCharacter(span, _)
            | Self::UnexpectedToken(span, _, _)
            | Self::UnexpectedEnd(span, _)
            | Self::MalformedNumber(span, _)
            | Self::UnbalancedBracket(span, _)
            | Self::VariadicNotInFinalPosition(span)
            | Self::SuffixOnOutput(span)
            | Self::ReservedWord(span, _) => (span.clone(), None),
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.spans().0.start()
    }
}

struct Lexer<'a> {
    source: &'a str,
    file: FileName,
    offset: usize,
    row: u32,
    column: u32,
    newline_pending: bool,
    tokens: Vec<Token>,
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c == '-'
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, file: FileName) -> Self {
        Self {
            source,
            file,
            offset: 0,
            row: 0,
            column: 0,
            newline_pending: false,
            tokens: Vec::new(),
        }
    }

    fn point(&self) -> Point {
        Point {
            offset: self.offset as u32,
            row: self.row,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.source[self.offset..].chars().next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.row += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn span_from(&self, start: Point) -> Span {
        Span::At {
            start,
            end: self.point(),
            file: self.file.clone(),
        }
    }

    fn push(&mut self, kind: TokenKind, start: Point, value: f64) {
        let text = ArcStr::from(&self.source[start.offset as usize..self.offset]);
        let span = self.span_from(start);
        let newline_before = std::mem::take(&mut self.newline_pending);
        self.tokens.push(Token {
            kind,
            span,
            text,
            value,
            newline_before,
        });
    }

    /// `-`/`+` directly before `infinity`, with no further name character.
    fn infinity_follows(&self) -> bool {
        let rest = &self.source[self.offset..];
        let mut chars = rest.chars();
        chars.next();
        let rest = chars.as_str();
        rest.starts_with("infinity")
            && !rest["infinity".len()..]
                .chars()
                .next()
                .is_some_and(is_name_char)
    }

    fn lex_name(&mut self) {
        let start = self.point();
        while let Some(c) = self.peek() {
            if is_name_start(c) {
                self.bump();
            } else if c == '-' && self.peek_second().is_some_and(is_name_start) {
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Name, start, 0.0);
    }

    fn lex_number(&mut self, start: Point) -> Result<(), SyntaxError> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            match self.peek_second() {
                Some(c) if c.is_ascii_digit() => {
                    self.bump();
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                }
                // the `...` of an interval or a variadic suffix
                Some('.') => {}
                _ => {
                    self.bump();
                    let text = ArcStr::from(&self.source[start.offset as usize..self.offset]);
                    return Err(SyntaxError::MalformedNumber(self.span_from(start), text));
                }
            }
        }
        let text = &self.source[start.offset as usize..self.offset];
        let value = text
            .parse::<f64>()
            .map_err(|_| SyntaxError::MalformedNumber(self.span_from(start), ArcStr::from(text)))?;
        self.push(TokenKind::Number, start, value);
        Ok(())
    }

    fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        while let Some(c) = self.peek() {
            let start = self.point();
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.newline_pending = true;
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                c if is_name_start(c) => self.lex_name(),
                c if c.is_ascii_digit() => {
                    self.lex_number(start)?;
                }
                '+' => {
                    if self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                        self.lex_number(start)?;
                    } else if self.infinity_follows() {
                        for _ in 0.."+infinity".len() {
                            self.bump();
                        }
                        self.push(TokenKind::Number, start, f64::INFINITY);
                    } else {
                        self.bump();
                        self.push(TokenKind::Plus, start, 0.0);
                    }
                }
                '-' => {
                    if self.peek_second() == Some('>') {
                        self.bump();
                        self.bump();
                        self.push(TokenKind::Arrow, start, 0.0);
                    } else if self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                        self.lex_number(start)?;
                    } else if self.infinity_follows() {
                        for _ in 0.."-infinity".len() {
                            self.bump();
                        }
                        self.push(TokenKind::Number, start, f64::NEG_INFINITY);
                    } else {
                        self.bump();
                        return Err(SyntaxError::UnexpectedCharacter(self.span_from(start), '-'));
                    }
                }
                '=' => {
                    if self.peek_second() == Some('>') {
                        self.bump();
                        self.bump();
                        self.push(TokenKind::FatArrow, start, 0.0);
                    } else {
                        self.bump();
                        return Err(SyntaxError::UnexpectedCharacter(self.span_from(start), '='));
                    }
                }
                '.' => {
                    if self.peek_second() == Some('.') {
                        self.bump();
                        self.bump();
                        if self.peek() == Some('.') {
                            self.bump();
                            self.push(TokenKind::Ellipsis, start, 0.0);
                        } else {
                            return Err(SyntaxError::UnexpectedCharacter(
                                self.span_from(start),
                                '.',
                            ));
                        }
                    } else {
                        self.bump();
                        return Err(SyntaxError::UnexpectedCharacter(self.span_from(start), '.'));
                    }
                }
                '#' => {
                    if self.peek_second() == Some('[') {
                        self.bump();
                        self.bump();
                        self.push(TokenKind::HashBracket, start, 0.0);
                    } else {
                        self.bump();
                        return Err(SyntaxError::UnexpectedCharacter(self.span_from(start), '#'));
                    }
                }
                '<' => {
                    if self.peek_second() == Some('|') {
                        self.bump();
                        self.bump();
                        self.push(TokenKind::Delegate, start, 0.0);
                    } else {
                        self.bump();
                        return Err(SyntaxError::UnexpectedCharacter(self.span_from(start), '<'));
                    }
                }
                '(' | ')' | '[' | ']' | '{' | '}' | ':' | ',' | '?' | '^' | '|' | '\\' => {
                    let kind = match c {
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        '[' => TokenKind::LBracket,
                        ']' => TokenKind::RBracket,
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        ':' => TokenKind::Colon,
                        ',' => TokenKind::Comma,
                        '?' => TokenKind::Question,
                        '^' => TokenKind::Caret,
                        '|' => TokenKind::Bar,
                        _ => TokenKind::Backslash,
                    };
                    self.bump();
                    self.push(kind, start, 0.0);
                }
                c => {
                    self.bump();
                    return Err(SyntaxError::UnexpectedCharacter(self.span_from(start), c));
                }
            }
        }
        Ok(self.tokens)
    }
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    end_span: Span,
}

/// Parses Oblige source text into an ordered sequence of declarations.
pub fn parse_module(source: &str, file: FileName) -> Result<Module, SyntaxError> {
    let tokens = Lexer::new(source, file.clone()).tokenize()?;
    let end_span = match tokens.last() {
        Some(token) => token.span.only_end(),
        None => Point::default().point_span(file),
    };
    let mut parser = Parser {
        tokens,
        index: 0,
        end_span,
    };
    let mut type_defs = Vec::new();
    loop {
        while parser.eat(TokenKind::Comma).is_some() {}
        if parser.peek().is_none() {
            break;
        }
        type_defs.push(parser.parse_declaration()?);
    }
    Ok(Module { type_defs })
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    fn newline_next(&self) -> bool {
        self.peek().is_some_and(|token| token.newline_before)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        self.index += 1;
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, SyntaxError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        match self.peek() {
            Some(token) => {
                SyntaxError::UnexpectedToken(token.span.clone(), expected, token.text.clone())
            }
            None => SyntaxError::UnexpectedEnd(self.end_span.clone(), expected),
        }
    }

    fn expect_closer(
        &mut self,
        kind: TokenKind,
        closer: &'static str,
    ) -> Result<Token, SyntaxError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            let span = match self.peek() {
                Some(token) => token.span.clone(),
                None => self.end_span.clone(),
            };
            Err(SyntaxError::UnbalancedBracket(span, closer))
        }
    }

    /// Does a declaration head (`name name* :`) start at `from`? Used to
    /// tell a declaration separator comma from an argument separator.
    fn decl_starts_at(&self, from: usize) -> bool {
        let mut i = from;
        if !self
            .tokens
            .get(i)
            .is_some_and(|token| token.kind == TokenKind::Name)
        {
            return false;
        }
        while self
            .tokens
            .get(i)
            .is_some_and(|token| token.kind == TokenKind::Name)
        {
            i += 1;
        }
        self.tokens
            .get(i)
            .is_some_and(|token| token.kind == TokenKind::Colon)
    }

    fn decl_follows_comma(&self) -> bool {
        self.decl_starts_at(self.index + 1)
    }

    fn parse_declaration(&mut self) -> Result<TypeDef, SyntaxError> {
        let head = self.expect(TokenKind::Name, "a type declaration")?;
        if head.text == "void" {
            return Err(SyntaxError::ReservedWord(head.span, head.text));
        }
        let name = GlobalName {
            span: head.span.clone(),
            string: head.text,
        };
        let mut params = Vec::new();
        while self.at(TokenKind::Name) {
            let param = self.advance();
            if param.text == "void" {
                return Err(SyntaxError::ReservedWord(param.span, param.text));
            }
            params.push(LocalName {
                span: param.span,
                string: param.text,
            });
        }
        self.expect(TokenKind::Colon, "`:` after the type name")?;
        let typ = self.parse_body(true)?;
        let span = head.span.join(typ.span());
        Ok(TypeDef {
            span,
            name,
            params,
            typ,
        })
    }

    /// `comma_args` is on outside brackets: commas continue argument and
    /// delegation-target lists there, while inside `[..]`/`#[..]` they
    /// separate elements.
    fn parse_body(&mut self, comma_args: bool) -> Result<Type, SyntaxError> {
        self.parse_predicate(comma_args)
    }

    fn parse_predicate(&mut self, comma_args: bool) -> Result<Type, SyntaxError> {
        let constraint = self.parse_function(comma_args)?;
        if self.eat(TokenKind::FatArrow).is_some() {
            let body = self.parse_predicate(comma_args)?;
            let span = constraint.span().join(body.span());
            Ok(Type::Predicate(span, Box::new(constraint), Box::new(body)))
        } else {
            Ok(constraint)
        }
    }

    fn parse_params_chain(&mut self, comma_args: bool) -> Result<Vec<Param>, SyntaxError> {
        let mut params = vec![self.parse_param(comma_args)?];
        if comma_args {
            while self.at(TokenKind::Comma) && !self.decl_follows_comma() {
                if params
                    .last()
                    .is_some_and(|param| param.suffix == Suffix::Variadic)
                {
                    let span = params.last().unwrap().typ.span();
                    return Err(SyntaxError::VariadicNotInFinalPosition(span));
                }
                self.advance();
                params.push(self.parse_param(comma_args)?);
            }
        }
        Ok(params)
    }

    fn parse_function(&mut self, comma_args: bool) -> Result<Type, SyntaxError> {
        let params = self.parse_params_chain(comma_args)?;
        if self.eat(TokenKind::Arrow).is_some() {
            let outputs = self.parse_outputs(comma_args)?;
            let span = params[0]
                .typ
                .span()
                .join(outputs.last().map(Spanning::span).unwrap_or(Span::None));
            return Ok(Type::Function(span, params, outputs));
        }
        let mut params = params;
        if params.len() == 1 && params[0].suffix == Suffix::None {
            Ok(params.remove(0).typ)
        } else {
            Err(self.unexpected("`->` after the argument list"))
        }
    }

    fn parse_outputs(&mut self, comma_args: bool) -> Result<Vec<Type>, SyntaxError> {
        let params = self.parse_params_chain(comma_args)?;
        if self.eat(TokenKind::Arrow).is_some() {
            // a right-nested arrow: the whole chain is the sole output
            let outputs = self.parse_outputs(comma_args)?;
            let span = params[0]
                .typ
                .span()
                .join(outputs.last().map(Spanning::span).unwrap_or(Span::None));
            return Ok(vec![Type::Function(span, params, outputs)]);
        }
        for param in &params {
            if param.suffix != Suffix::None {
                return Err(SyntaxError::SuffixOnOutput(param.typ.span()));
            }
        }
        Ok(params.into_iter().map(|param| param.typ).collect())
    }

    fn parse_param(&mut self, comma_args: bool) -> Result<Param, SyntaxError> {
        let typ = self.parse_alternation(comma_args)?;
        let suffix = if self.eat(TokenKind::Question).is_some() {
            Suffix::Optional
        } else if self.eat(TokenKind::Ellipsis).is_some() {
            Suffix::Variadic
        } else {
            Suffix::None
        };
        Ok(Param { typ, suffix })
    }

    fn parse_alternation(&mut self, comma_args: bool) -> Result<Type, SyntaxError> {
        let first = self.parse_set_union(comma_args)?;
        if !self.at(TokenKind::Bar) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(TokenKind::Bar).is_some() {
            items.push(self.parse_set_union(comma_args)?);
        }
        // `tag field*` alternatives make a tagged union; anything else
        // falls back to `|` as set union
        if items
            .iter()
            .all(|item| matches!(item, Type::Name(_, _, _)))
        {
            let span = items[0].span().join(items.last().unwrap().span());
            let variants = items
                .into_iter()
                .map(|item| {
                    let Type::Name(_, name, args) = item else {
                        unreachable!()
                    };
                    Variant {
                        tag: LocalName {
                            span: name.span,
                            string: name.string,
                        },
                        fields: args,
                    }
                })
                .collect();
            Ok(Type::Tagged(span, variants))
        } else {
            let mut items = items.into_iter();
            let mut typ = items.next().unwrap();
            for item in items {
                let span = typ.span().join(item.span());
                typ = Type::Union(span, Box::new(typ), Box::new(item));
            }
            Ok(typ)
        }
    }

    fn parse_set_union(&mut self, comma_args: bool) -> Result<Type, SyntaxError> {
        let mut typ = self.parse_complement(comma_args)?;
        while self.eat(TokenKind::Plus).is_some() {
            let right = self.parse_complement(comma_args)?;
            let span = typ.span().join(right.span());
            typ = Type::Union(span, Box::new(typ), Box::new(right));
        }
        Ok(typ)
    }

    fn parse_complement(&mut self, comma_args: bool) -> Result<Type, SyntaxError> {
        let mut typ = self.parse_delegation(comma_args)?;
        while self.eat(TokenKind::Backslash).is_some() {
            let right = self.parse_delegation(comma_args)?;
            let span = typ.span().join(right.span());
            typ = Type::Complement(span, Box::new(typ), Box::new(right));
        }
        Ok(typ)
    }

    fn parse_delegation(&mut self, comma_args: bool) -> Result<Type, SyntaxError> {
        let base = self.parse_juxtaposition()?;
        if self.eat(TokenKind::Delegate).is_none() {
            return Ok(base);
        }
        let mut targets = vec![self.parse_juxtaposition()?];
        if comma_args {
            while self.at(TokenKind::Comma) && !self.decl_follows_comma() {
                self.advance();
                targets.push(self.parse_juxtaposition()?);
            }
        }
        let span = base.span().join(targets.last().unwrap().span());
        Ok(Type::Delegation(span, Box::new(base), targets))
    }

    fn starts_atom(&self) -> bool {
        self.peek().is_some_and(|token| {
            matches!(
                token.kind,
                TokenKind::Name
                    | TokenKind::Number
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::HashBracket
                    | TokenKind::LBrace
            )
        })
    }

    fn parse_juxtaposition(&mut self) -> Result<Type, SyntaxError> {
        let head = self.parse_atom()?;
        if !matches!(head, Type::Name(_, _, _)) {
            return Ok(head);
        }
        let mut args = Vec::new();
        while self.starts_atom() && !self.newline_next() {
            args.push(self.parse_atom()?);
        }
        if args.is_empty() {
            return Ok(head);
        }
        let Type::Name(span, name, _) = head else {
            unreachable!()
        };
        let span = span.join(args.last().unwrap().span());
        Ok(Type::Name(span, name, args))
    }

    fn numeric_starts_at(&self, index: usize) -> bool {
        self.tokens.get(index).is_some_and(|token| {
            token.kind == TokenKind::Number
                || (token.kind == TokenKind::Name && token.text == "nan")
        })
    }

    fn parse_numeric_atom(&mut self) -> Result<Type, SyntaxError> {
        let base = match self.peek() {
            Some(token) if token.kind == TokenKind::Number => {
                let token = self.advance();
                Type::Number(token.span, token.value)
            }
            Some(token) if token.kind == TokenKind::Name && token.text == "nan" => {
                let token = self.advance();
                Type::Number(token.span, f64::NAN)
            }
            _ => return Err(self.unexpected("a number")),
        };
        self.parse_exponent_chain(base)
    }

    fn parse_exponent_chain(&mut self, base: Type) -> Result<Type, SyntaxError> {
        if self.eat(TokenKind::Caret).is_none() {
            return Ok(base);
        }
        let exponent = self.parse_numeric_atom()?;
        let span = base.span().join(exponent.span());
        Ok(Type::Exponential(span, Box::new(base), Box::new(exponent)))
    }

    fn parse_atom(&mut self) -> Result<Type, SyntaxError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("a type expression"));
        };
        match token.kind {
            TokenKind::Number => self.parse_numeric(),
            TokenKind::Name if token.text == "nan" => self.parse_numeric(),
            TokenKind::Name if token.text == "void" => {
                let token = self.advance();
                Ok(Type::Unit(token.span))
            }
            TokenKind::Name if is_type_variable(&token.text) => {
                let token = self.advance();
                Ok(Type::Var(
                    token.span.clone(),
                    LocalName {
                        span: token.span,
                        string: token.text,
                    },
                ))
            }
            TokenKind::Name => {
                let token = self.advance();
                Ok(Type::Name(
                    token.span.clone(),
                    GlobalName {
                        span: token.span,
                        string: token.text,
                    },
                    Vec::new(),
                ))
            }
            TokenKind::LParen => {
                self.advance();
                // grouping is transparent
                let typ = self.parse_body(true)?;
                self.expect_closer(TokenKind::RParen, ")")?;
                Ok(typ)
            }
            TokenKind::LBracket => {
                let open = self.advance();
                let members = self.parse_elements(TokenKind::RBracket)?;
                let close = self.expect_closer(TokenKind::RBracket, "]")?;
                Ok(Type::List(open.span.join(close.span), members))
            }
            TokenKind::HashBracket => {
                let open = self.advance();
                let items = self.parse_elements(TokenKind::RBracket)?;
                let close = self.expect_closer(TokenKind::RBracket, "]")?;
                Ok(Type::Tuple(open.span.join(close.span), items))
            }
            TokenKind::LBrace => self.parse_record(),
            _ => Err(self.unexpected("a type expression")),
        }
    }

    fn parse_numeric(&mut self) -> Result<Type, SyntaxError> {
        let low = self.parse_numeric_atom()?;
        if self.at(TokenKind::Ellipsis) && self.numeric_starts_at(self.index + 1) {
            self.advance();
            let high = self.parse_numeric_atom()?;
            let span = low.span().join(high.span());
            return Ok(Type::Interval(span, Box::new(low), Box::new(high)));
        }
        Ok(low)
    }

    fn parse_elements(&mut self, closer: TokenKind) -> Result<Vec<Type>, SyntaxError> {
        let mut elements = Vec::new();
        if self.at(closer) {
            return Ok(elements);
        }
        loop {
            elements.push(self.parse_body(false)?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(elements)
    }

    fn parse_record(&mut self) -> Result<Type, SyntaxError> {
        let open = self.advance();
        let mut fields: IndexMap<LocalName, Type> = IndexMap::new();
        while !self.at(TokenKind::RBrace) {
            let field_token = self.expect(TokenKind::Name, "a record field")?;
            let field = LocalName {
                span: field_token.span.clone(),
                string: field_token.text,
            };
            self.expect(TokenKind::Colon, "`:` after the field name")?;
            let typ = self.parse_body(true)?;
            if let Some((existing, _)) = fields.get_key_value(&field) {
                return Err(SyntaxError::DuplicateRecordField(
                    field.span.clone(),
                    existing.span.clone(),
                    field,
                ));
            }
            fields.insert(field, typ);
            if self.eat(TokenKind::Comma).is_none() && !self.at(TokenKind::RBrace) {
                // fields may also be separated by line breaks
                if !(self.at(TokenKind::Name) && self.newline_next()) {
                    return Err(self.unexpected("`,` or `}` after the field"));
                }
            }
        }
        let close = self.expect_closer(TokenKind::RBrace, "}")?;
        Ok(Type::Record(open.span.join(close.span), fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> TypeDef {
        let module = parse_module(source, FileName::from("test.obl")).expect("parse failed");
        assert_eq!(module.type_defs.len(), 1, "expected a single declaration");
        module.type_defs.into_iter().next().unwrap()
    }

    #[test]
    fn parses_interval_with_exponential_endpoint() {
        let def = parse_one("int: 0 ... 2^32");
        assert!(def.typ.syntactically_equal(&Type::interval(
            Type::number(0.0),
            Type::exponential(2.0, 32.0),
        )));
    }

    #[test]
    fn parses_symbolic_constants() {
        let def = parse_one("anyNumber: -infinity ... +infinity + nan");
        assert!(def.typ.syntactically_equal(&Type::union(
            Type::interval(Type::number(f64::NEG_INFINITY), Type::number(f64::INFINITY)),
            Type::number(f64::NAN),
        )));
    }

    #[test]
    fn parses_tagged_union_with_fields() {
        let def = parse_one("tree A: leaf | node (tree A) (tree A)");
        assert_eq!(def.params.len(), 1);
        assert!(def.typ.syntactically_equal(&Type::tagged(vec![
            ("leaf", vec![]),
            (
                "node",
                vec![
                    Type::name("tree", vec![Type::var("A")]),
                    Type::name("tree", vec![Type::var("A")]),
                ],
            ),
        ])));
    }

    #[test]
    fn parses_function_with_optional_and_variadic() {
        let def = parse_one("slice: [A], number, number? -> [A]");
        let Type::Function(_, inputs, outputs) = &def.typ else {
            panic!("expected a function type");
        };
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[1].suffix, Suffix::None);
        assert_eq!(inputs[2].suffix, Suffix::Optional);
        assert_eq!(outputs.len(), 1);

        let def = parse_one("max: number... -> number");
        let Type::Function(_, inputs, _) = &def.typ else {
            panic!("expected a function type");
        };
        assert_eq!(inputs[0].suffix, Suffix::Variadic);
    }

    #[test]
    fn curried_arrows_nest_to_the_right() {
        let def = parse_one("compose: A -> B -> C");
        let Type::Function(_, inputs, outputs) = &def.typ else {
            panic!("expected a function type");
        };
        assert_eq!(inputs.len(), 1);
        assert_eq!(outputs.len(), 1);
        assert!(matches!(&outputs[0], Type::Function(_, _, _)));
    }

    #[test]
    fn comma_separates_declarations_by_lookahead() {
        let module =
            parse_module("a: 1, b: 2", FileName::from("test.obl")).expect("parse failed");
        assert_eq!(module.type_defs.len(), 2);
    }

    #[test]
    fn newline_separates_declarations() {
        let module = parse_module("a: 1\nb: [a]\nc: a <| b", FileName::from("test.obl"))
            .expect("parse failed");
        assert_eq!(module.type_defs.len(), 3);
    }

    #[test]
    fn parses_delegation_targets() {
        let def = parse_one("proto: list <| collection, sequence");
        let Type::Delegation(_, base, targets) = &def.typ else {
            panic!("expected a delegation");
        };
        assert!(matches!(base.as_ref(), Type::Name(_, _, _)));
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn parses_predicate() {
        let def = parse_one("sortable A: { compare: A, A -> number } => [A]");
        let Type::Predicate(_, constraint, body) = &def.typ else {
            panic!("expected a predicate");
        };
        assert!(matches!(constraint.as_ref(), Type::Record(_, _)));
        assert!(matches!(body.as_ref(), Type::List(_, _)));
    }

    #[test]
    fn rejects_duplicate_record_field() {
        let result = parse_module("point: { x: int, x: int }", FileName::from("test.obl"));
        assert!(matches!(
            result,
            Err(SyntaxError::DuplicateRecordField(_, _, _))
        ));
    }

    #[test]
    fn rejects_variadic_before_other_arguments() {
        let result = parse_module("f: [A]..., number -> [A]", FileName::from("test.obl"));
        assert!(matches!(
            result,
            Err(SyntaxError::VariadicNotInFinalPosition(_))
        ));
    }

    #[test]
    fn rejects_void_as_a_name() {
        let result = parse_module("void: 1", FileName::from("test.obl"));
        assert!(matches!(result, Err(SyntaxError::ReservedWord(_, _))));
    }

    #[test]
    fn rejects_malformed_number() {
        let result = parse_module("x: 12.", FileName::from("test.obl"));
        assert!(matches!(result, Err(SyntaxError::MalformedNumber(_, _))));
    }

    #[test]
    fn rejects_unbalanced_bracket() {
        let result = parse_module("x: [int", FileName::from("test.obl"));
        assert!(matches!(result, Err(SyntaxError::UnbalancedBracket(_, _))));
    }

    #[test]
    fn reports_position_of_errors() {
        let error = parse_module("x: {", FileName::from("test.obl")).unwrap_err();
        let position = error.position().expect("expected a position");
        assert_eq!(position.row, 0);
    }

    #[test]
    fn grouping_is_transparent() {
        let grouped = parse_one("x: ((1 ... 10))");
        let plain = parse_one("x: 1 ... 10");
        assert!(grouped.typ.syntactically_equal(&plain.typ));
    }

    #[test]
    fn tuple_and_list_brackets_are_distinct() {
        let tuple = parse_one("pair: #[number, number]");
        assert!(matches!(tuple.typ, Type::Tuple(_, _)));
        let list = parse_one("numbers: [number]");
        assert!(matches!(list.typ, Type::List(_, _)));
    }
}
