#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub slice: &'a str,
    pub offset: usize,
    pub kind: TokenKind,
}

impl<'a> std::fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Op(Op),
    Func(Func),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Op::Plus => "+",
                Op::Minus => "-",
                Op::Star => "*",
                Op::Slash => "/",
            }
        )
    }
}

/// The closed set of function words the tokenizer recognizes. Words outside
/// this set never become tokens.
///
/// `deg` and `rad` are part of the set but have no defined transformation in
/// the evaluator (see `apply_function`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Log,
    Sin,
    Abs,
    Acos,
    Asin,
    Ceil,
    Cos,
    Deg,
    Exp,
    Floor,
    Modf,
    Rad,
    Sqrt,
    Tan,
}

impl Func {
    pub fn from_word(word: &str) -> Option<Func> {
        Some(match word {
            "log" => Func::Log,
            "sin" => Func::Sin,
            "abs" => Func::Abs,
            "acos" => Func::Acos,
            "asin" => Func::Asin,
            "ceil" => Func::Ceil,
            "cos" => Func::Cos,
            "deg" => Func::Deg,
            "exp" => Func::Exp,
            "floor" => Func::Floor,
            "modf" => Func::Modf,
            "rad" => Func::Rad,
            "sqrt" => Func::Sqrt,
            "tan" => Func::Tan,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Func {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Func::Log => "log",
                Func::Sin => "sin",
                Func::Abs => "abs",
                Func::Acos => "acos",
                Func::Asin => "asin",
                Func::Ceil => "ceil",
                Func::Cos => "cos",
                Func::Deg => "deg",
                Func::Exp => "exp",
                Func::Floor => "floor",
                Func::Modf => "modf",
                Func::Rad => "rad",
                Func::Sqrt => "sqrt",
                Func::Tan => "tan",
            }
        )
    }
}

/// Scans an expression left to right, yielding number, operator and function
/// tokens. Tokenization never fails: unknown words, stray symbols and
/// whitespace produce no token at all.
#[derive(Debug)]
pub struct Lexer<'a> {
    rest: &'a str,
    byte: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            byte: 0,
        }
    }
}

pub fn tokenize(expression: &str) -> Vec<Token<'_>> {
    Lexer::new(expression).collect()
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let offset = self.byte;
            let slice = &self.rest[..c.len_utf8()];
            let c_onwards = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let kind = match c {
                '+' => TokenKind::Op(Op::Plus),
                '-' => TokenKind::Op(Op::Minus),
                '*' => TokenKind::Op(Op::Star),
                '/' => TokenKind::Op(Op::Slash),
                '0'..='9' | '.' => {
                    let Some(literal) = number_literal(c_onwards) else {
                        // a '.' with no digit on either side
                        continue;
                    };
                    let extra_byte = literal.len() - c.len_utf8();
                    self.byte += extra_byte;
                    self.rest = &self.rest[extra_byte..];

                    let Ok(value) = literal.parse::<f64>() else {
                        continue;
                    };

                    return Some(Token {
                        slice: literal,
                        offset,
                        kind: TokenKind::Number(value),
                    });
                }
                c if c.is_alphabetic() => {
                    let first_non_alpha = c_onwards
                        .find(|c: char| !c.is_alphabetic())
                        .unwrap_or(c_onwards.len());

                    let literal = &c_onwards[..first_non_alpha];

                    let extra_byte = literal.len() - c.len_utf8();
                    self.byte += extra_byte;
                    self.rest = &self.rest[extra_byte..];

                    match Func::from_word(literal) {
                        Some(func) => {
                            return Some(Token {
                                slice: literal,
                                offset,
                                kind: TokenKind::Func(func),
                            })
                        }
                        // words outside the whitelist are dropped
                        None => continue,
                    }
                }
                // whitespace and unrecognized symbols
                _ => continue,
            };

            return Some(Token {
                slice,
                offset,
                kind,
            });
        }
    }
}

/// Returns the longest prefix of `s` that is a valid decimal literal:
/// digits, an optional fraction, and an optional e/E exponent. `None` if no
/// digit is found before the scan ends.
fn number_literal(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();

    let mut end = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end;

    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut i = end + 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - end - 1;
        if int_digits > 0 || frac_digits > 0 {
            end = i;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // the exponent only counts if at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut i = end + 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i > exp_digits_start {
            end = i;
        }
    }

    Some(&s[..end])
}
