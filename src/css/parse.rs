use crate::error::Error;
use crate::select::{Combinator, Selector, SelectorList};

use super::matcher::{AttrMatcher, AttrOp, Compound, Nth, Pseudo, Simple};
use super::token::{tokenize, Tok, Token};

pub(crate) fn parse(input: &str) -> Result<SelectorList, Error> {
    let mut p = Parser::new(input)?;
    let list = p.parse_group()?;
    Ok(list)
}

#[derive(Copy, Clone, Debug)]
enum CombKind {
    Descendant,
    Child,
    NextSibling,
    NextSiblings,
}

struct Parser {
    tokens: Vec<Token>,
    i: usize,
    end: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Parser, Error> {
        Ok(Parser {
            tokens: tokenize(input)?,
            i: 0,
            end: input.len(),
        })
    }

    fn peek(&self) -> Option<Tok> {
        self.tokens.get(self.i).map(|t| t.tok.clone())
    }

    fn next_tok(&mut self) -> Option<Tok> {
        let t = self.peek();
        if t.is_some() {
            self.i += 1;
        }
        t
    }

    fn pos(&self) -> usize {
        self.tokens.get(self.i).map(|t| t.pos).unwrap_or(self.end)
    }

    fn skip_ws(&mut self) {
        while let Some(Tok::Ws) = self.peek() {
            self.i += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.i >= self.tokens.len()
    }

    fn parse_group(&mut self) -> Result<SelectorList, Error> {
        let mut list: SelectorList = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.parse_complex()?);
            self.skip_ws();
            match self.next_tok() {
                Some(Tok::Comma) => {}
                None => break,
                Some(_) => {
                    return Err(Error::css(self.pos(), "expected ',' or end of selector"));
                }
            }
        }
        Ok(list)
    }

    /// Parse one complex selector: compounds chained by combinators,
    /// assembled right-to-left so each compound owns the combinator to
    /// its right-hand neighbor.
    fn parse_complex(&mut self) -> Result<Box<dyn Selector>, Error> {
        let mut parts: Vec<(Compound, CombKind)> = Vec::new();
        let mut compound = self.parse_compound()?;
        loop {
            let had_ws = matches!(self.peek(), Some(Tok::Ws));
            self.skip_ws();
            let kind = match self.peek() {
                Some(Tok::Gt) => {
                    self.i += 1;
                    Some(CombKind::Child)
                }
                Some(Tok::Plus) => {
                    self.i += 1;
                    Some(CombKind::NextSibling)
                }
                Some(Tok::Tilde) => {
                    self.i += 1;
                    Some(CombKind::NextSiblings)
                }
                Some(ref t) if had_ws && starts_compound(t) => Some(CombKind::Descendant),
                _ => None,
            };
            match kind {
                None => break,
                Some(k) => {
                    self.skip_ws();
                    let next = self.parse_compound()?;
                    parts.push((compound, k));
                    compound = next;
                }
            }
        }

        let mut right: Box<dyn Selector> = Box::new(compound);
        while let Some((mut comp, kind)) = parts.pop() {
            comp.combinator = Some(match kind {
                CombKind::Descendant => Combinator::Descendants(right),
                CombKind::Child => Combinator::Children(right),
                CombKind::NextSibling => Combinator::NextSibling(right),
                CombKind::NextSiblings => Combinator::NextSiblings(right),
            });
            right = Box::new(comp);
        }
        Ok(right)
    }

    fn parse_compound(&mut self) -> Result<Compound, Error> {
        let mut head = None;
        let mut filters: Vec<Box<dyn Selector>> = Vec::new();
        match self.peek() {
            Some(Tok::Ident(name)) => {
                self.i += 1;
                head = Some(Simple::Tag(name));
            }
            Some(Tok::Star) => {
                self.i += 1;
                head = Some(Simple::Universal);
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some(Tok::Hash(id)) => {
                    self.i += 1;
                    filters.push(Box::new(Simple::Attr(AttrMatcher {
                        name: "id".into(),
                        op: AttrOp::Eq,
                        value: Some(id),
                        ci: false,
                    })));
                }
                Some(Tok::Class(class)) => {
                    self.i += 1;
                    filters.push(Box::new(Simple::Attr(AttrMatcher {
                        name: "class".into(),
                        op: AttrOp::Includes,
                        value: Some(class),
                        ci: false,
                    })));
                }
                Some(Tok::LBracket) => filters.push(self.parse_attr()?),
                Some(Tok::Colon) => filters.push(self.parse_pseudo()?),
                _ => break,
            }
        }
        match (head, filters.is_empty()) {
            (Some(head), _) => Ok(Compound {
                head,
                filters,
                combinator: None,
            }),
            (None, false) => Ok(Compound {
                head: Simple::Universal,
                filters,
                combinator: None,
            }),
            (None, true) => Err(Error::css(self.pos(), "expected a selector")),
        }
    }

    fn parse_attr(&mut self) -> Result<Box<dyn Selector>, Error> {
        self.i += 1; // '['
        self.skip_ws();
        let name = match self.next_tok() {
            Some(Tok::Ident(n)) => n,
            _ => return Err(Error::css(self.pos(), "expected attribute name")),
        };
        self.skip_ws();
        let op = match self.peek() {
            Some(Tok::RBracket) => {
                self.i += 1;
                return Ok(Box::new(Simple::Attr(AttrMatcher {
                    name,
                    op: AttrOp::Present,
                    value: None,
                    ci: false,
                })));
            }
            Some(Tok::Eq) => AttrOp::Eq,
            Some(Tok::Includes) => AttrOp::Includes,
            Some(Tok::DashMatch) => AttrOp::DashMatch,
            Some(Tok::PrefixMatch) => AttrOp::Prefix,
            Some(Tok::SuffixMatch) => AttrOp::Suffix,
            Some(Tok::SubstringMatch) => AttrOp::Substring,
            _ => return Err(Error::css(self.pos(), "expected attribute operator or ']'")),
        };
        self.i += 1;
        self.skip_ws();
        let value = match self.next_tok() {
            Some(Tok::Ident(v)) | Some(Tok::Str(v)) => v,
            _ => return Err(Error::css(self.pos(), "expected attribute value")),
        };
        self.skip_ws();
        let mut ci = false;
        if let Some(Tok::Ident(flag)) = self.peek() {
            if flag.eq_ignore_ascii_case("i") {
                ci = true;
                self.i += 1;
                self.skip_ws();
            } else {
                return Err(Error::css(
                    self.pos(),
                    format!("unknown attribute flag '{}'", flag),
                ));
            }
        }
        match self.next_tok() {
            Some(Tok::RBracket) => Ok(Box::new(Simple::Attr(AttrMatcher {
                name,
                op,
                value: Some(value),
                ci,
            }))),
            _ => Err(Error::css(self.pos(), "expected ']'")),
        }
    }

    fn parse_pseudo(&mut self) -> Result<Box<dyn Selector>, Error> {
        self.i += 1; // ':'
        match self.next_tok() {
            Some(Tok::Ident(name)) => pseudo_no_args(&name),
            Some(Tok::Func { name, args }) => pseudo_with_args(&name, &args),
            _ => Err(Error::css(self.pos(), "expected pseudo-class name")),
        }
    }
}

fn starts_compound(t: &Tok) -> bool {
    matches!(
        t,
        Tok::Ident(_) | Tok::Star | Tok::Hash(_) | Tok::Class(_) | Tok::LBracket | Tok::Colon
    )
}

fn pseudo_no_args(name: &str) -> Result<Box<dyn Selector>, Error> {
    let pseudo = match name {
        "root" => Pseudo::Root,
        "first-child" => Pseudo::FirstChild,
        "last-child" => Pseudo::LastChild,
        "only-child" => Pseudo::OnlyChild,
        "first-of-type" => Pseudo::FirstOfType,
        "last-of-type" => Pseudo::LastOfType,
        "only-of-type" => Pseudo::OnlyOfType,
        "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" | "not" | "has" => {
            return Err(Error::SelectorValidation(format!(
                "pseudo-class ':{}' requires an argument",
                name
            )));
        }
        _ => {
            return Err(Error::SelectorValidation(format!(
                "unknown pseudo-class ':{}'",
                name
            )));
        }
    };
    Ok(Box::new(Simple::Pseudo(pseudo)))
}

fn pseudo_with_args(name: &str, args: &str) -> Result<Box<dyn Selector>, Error> {
    let pseudo = match name {
        "root" | "first-child" | "last-child" | "only-child" | "first-of-type"
        | "last-of-type" | "only-of-type" => {
            return Err(Error::SelectorValidation(format!(
                "pseudo-class ':{}' takes no arguments",
                name
            )));
        }
        "nth-child" => Pseudo::NthChild(parse_nth(name, args)?),
        "nth-last-child" => Pseudo::NthLastChild(parse_nth(name, args)?),
        "nth-of-type" => Pseudo::NthOfType(parse_nth(name, args)?),
        "nth-last-of-type" => Pseudo::NthLastOfType(parse_nth(name, args)?),
        "not" => Pseudo::Not(parse_not_args(args)?),
        "has" => {
            let (inner, direct) = parse_has_args(args)?;
            Pseudo::Has { inner, direct }
        }
        _ => {
            return Err(Error::SelectorValidation(format!(
                "unknown pseudo-class ':{}'",
                name
            )));
        }
    };
    Ok(Box::new(Simple::Pseudo(pseudo)))
}

/// Parse `odd`, `even` or an `an+b` formula.
fn parse_nth(name: &str, args: &str) -> Result<Nth, Error> {
    nth_formula(args).ok_or_else(|| {
        Error::SelectorValidation(format!(
            "invalid formula '{}' for pseudo-class ':{}'",
            args.trim(),
            name
        ))
    })
}

fn nth_formula(args: &str) -> Option<Nth> {
    let t: String = args
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match t.as_str() {
        "odd" => return Some(Nth { a: 2, b: 1 }),
        "even" => return Some(Nth { a: 2, b: 0 }),
        "" => return None,
        _ => {}
    }
    if let Some(npos) = t.find('n') {
        let apart = &t[..npos];
        let bpart = &t[npos + 1..];
        let a = match apart {
            "" | "+" => 1,
            "-" => -1,
            _ => apart.parse().ok()?,
        };
        let b = if bpart.is_empty() {
            0
        } else {
            if !bpart.starts_with('+') && !bpart.starts_with('-') {
                return None;
            }
            bpart.parse().ok()?
        };
        Some(Nth { a, b })
    } else {
        t.parse().ok().map(|b| Nth { a: 0, b })
    }
}

/// `:not` takes a single compound of simple selectors.
fn parse_not_args(args: &str) -> Result<Box<dyn Selector>, Error> {
    let mut p = Parser::new(args)?;
    p.skip_ws();
    let compound = p
        .parse_compound()
        .map_err(|_| not_args_error(args))?;
    p.skip_ws();
    if !p.at_end() {
        return Err(not_args_error(args));
    }
    Ok(Box::new(compound))
}

fn not_args_error(args: &str) -> Error {
    Error::SelectorValidation(format!(
        "':not({})' must contain a compound of simple selectors",
        args.trim()
    ))
}

/// `:has` takes a selector applied to descendants, or to direct children
/// after an explicit leading '>' combinator.
fn parse_has_args(args: &str) -> Result<(Box<dyn Selector>, bool), Error> {
    let mut p = Parser::new(args)?;
    p.skip_ws();
    let direct = if let Some(Tok::Gt) = p.peek() {
        p.i += 1;
        p.skip_ws();
        true
    } else {
        false
    };
    let inner = p.parse_complex().map_err(|e| match e {
        Error::SelectorValidation(_) => e,
        _ => Error::SelectorValidation(format!("invalid ':has({})' argument", args.trim())),
    })?;
    p.skip_ws();
    if !p.at_end() {
        return Err(Error::SelectorValidation(format!(
            "invalid ':has({})' argument",
            args.trim()
        )));
    }
    Ok((inner, direct))
}
