use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::map,
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare term, may carry '*' wildcard characters
    Term(String),
    /// Quoted value: "some phrase"
    Quoted(String),
    /// Field name that was followed by ':'
    Field(String),
    /// Inclusive range body: [lower TO upper]
    Range { lower: String, upper: String },
    And,
    Or,
    Not,
    Minus,
    LParen,
    RParen,
}

/// Field names: alphanumeric plus _ - . (no wildcards)
fn identifier(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')),
        |s: &str| s.to_string(),
    )(input)
}

/// Term values additionally allow '*' and a few characters common in log
/// payloads (paths, emails, version strings).
fn term(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '*' | '@' | '/' | '+')
        }),
        |s: &str| s.to_string(),
    )(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(take_until("\""), |s: &str| s.to_string()),
        char('"'),
    )(input)
}

/// Range endpoints stop at whitespace and brackets; '*' marks an
/// unbounded side and is resolved by the parser.
fn range_endpoint(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && c != '[' && c != ']'),
        |s: &str| s.to_string(),
    )(input)
}

fn range(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('['),
            tuple((
                multispace0,
                range_endpoint,
                multispace1,
                tag("TO"),
                multispace1,
                range_endpoint,
                multispace0,
            )),
            char(']'),
        ),
        |(_, lower, _, _, _, upper, _)| Token::Range { lower, upper },
    )(input)
}

/// Boolean keywords must be uppercase, as in Lucene; lowercase "and" is an
/// ordinary free-text term.
fn word(input: &str) -> IResult<&str, Token> {
    map(term, |s| match s.as_str() {
        "AND" => Token::And,
        "OR" => Token::Or,
        "NOT" => Token::Not,
        _ => Token::Term(s),
    })(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        map(char('('), |_| Token::LParen),
        map(char(')'), |_| Token::RParen),
        map(char('-'), |_| Token::Minus),
        range,
        map(quoted, Token::Quoted),
        map(terminated(identifier, char(':')), Token::Field),
        word,
    ))(input)
}

pub fn tokenize(input: &str) -> IResult<&str, Vec<Token>> {
    terminated(many0(preceded(multispace0, token)), multispace0)(input)
}
