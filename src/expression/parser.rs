use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{all_consuming, map, map_res, not, opt, recognize, value},
    error::{convert_error, VerboseError},
    multi::{fold_many0, many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};

use super::ast::{null, BinaryOp, Node, UnaryOp};
use crate::{Error, Value};

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Parses a single expression, i.e.: the text between template delimiters.
pub(crate) fn parse_expression(input: &str) -> Result<Node, Error> {
    all_consuming(terminated(expression, multispace0))(input)
        .finish()
        .map(|(_, node)| node)
        .map_err(|err| {
            Error::Parse(format!(
                "invalid expression '{}':\n{}",
                input,
                convert_error(input, err)
            ))
        })
}

fn boxed(lhs: Node, rhs: Node) -> (Box<Node>, Box<Node>) {
    (Box::new(lhs), Box::new(rhs))
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn symbol<'a>(text: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, &'a str> {
    preceded(multispace0, tag(text))
}

// `and`, `or` and `not` in any case, not followed by more of an identifier
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, &'a str> {
    preceded(
        multispace0,
        terminated(tag_no_case(word), not(satisfy(is_identifier_char))),
    )
}

/// condition ? then : otherwise | value ?: fallback
fn expression(input: &str) -> ParseResult<'_, Node> {
    let (input, condition) = or(input)?;
    let (input, branches) = opt(alt((
        map(preceded(symbol("?:"), expression), |fallback| {
            (None, fallback)
        }),
        map(
            tuple((
                preceded(symbol("?"), expression),
                preceded(symbol(":"), expression),
            )),
            |(then, otherwise)| (Some(then), otherwise),
        ),
    )))(input)?;

    let node = match branches {
        None => condition,
        Some((None, fallback)) => Node::Elvis(Box::new(condition), Box::new(fallback)),
        Some((Some(then), otherwise)) => {
            Node::Ternary(Box::new(condition), Box::new(then), Box::new(otherwise))
        }
    };
    Ok((input, node))
}

fn or(input: &str) -> ParseResult<'_, Node> {
    let (input, first) = and(input)?;
    let (input, rest) = many0(preceded(alt((symbol("||"), keyword("or"))), and))(input)?;
    let node = rest.into_iter().fold(first, |lhs, rhs| {
        let (lhs, rhs) = boxed(lhs, rhs);
        Node::Binary(BinaryOp::Or, lhs, rhs)
    });
    Ok((input, node))
}

fn and(input: &str) -> ParseResult<'_, Node> {
    let (input, first) = comparison(input)?;
    let (input, rest) =
        many0(preceded(alt((symbol("&&"), keyword("and"))), comparison))(input)?;
    let node = rest.into_iter().fold(first, |lhs, rhs| {
        let (lhs, rhs) = boxed(lhs, rhs);
        Node::Binary(BinaryOp::And, lhs, rhs)
    });
    Ok((input, node))
}

fn comparison_operator(input: &str) -> ParseResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Eq, symbol("==")),
        value(BinaryOp::NotEq, symbol("!=")),
        value(BinaryOp::Le, symbol("<=")),
        value(BinaryOp::Ge, symbol(">=")),
        value(BinaryOp::Lt, symbol("<")),
        value(BinaryOp::Gt, symbol(">")),
    ))(input)
}

// Comparisons do not chain: `a < b < c` is rejected.
fn comparison(input: &str) -> ParseResult<'_, Node> {
    let (input, lhs) = additive(input)?;
    let (input, rhs) = opt(pair(comparison_operator, additive))(input)?;
    let node = match rhs {
        Some((op, rhs)) => {
            let (lhs, rhs) = boxed(lhs, rhs);
            Node::Binary(op, lhs, rhs)
        }
        None => lhs,
    };
    Ok((input, node))
}

fn additive(input: &str) -> ParseResult<'_, Node> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(
        alt((
            value(BinaryOp::Add, symbol("+")),
            value(BinaryOp::Sub, symbol("-")),
        )),
        unary,
    ))(input)?;
    let node = rest.into_iter().fold(first, |lhs, (op, rhs)| {
        let (lhs, rhs) = boxed(lhs, rhs);
        Node::Binary(op, lhs, rhs)
    });
    Ok((input, node))
}

fn unary(input: &str) -> ParseResult<'_, Node> {
    alt((
        map(preceded(alt((symbol("!"), keyword("not"))), unary), |operand| {
            Node::Unary(UnaryOp::Not, Box::new(operand))
        }),
        map(preceded(symbol("-"), unary), |operand| {
            Node::Unary(UnaryOp::Neg, Box::new(operand))
        }),
        postfix,
    ))(input)
}

/// target[index][index]...
fn postfix(input: &str) -> ParseResult<'_, Node> {
    let (input, target) = primary(input)?;
    let (input, indexes) = many0(delimited(symbol("["), expression, symbol("]")))(input)?;
    let node = indexes.into_iter().fold(target, |target, index| {
        Node::Index(Box::new(target), Box::new(index))
    });
    Ok((input, node))
}

fn primary(input: &str) -> ParseResult<'_, Node> {
    preceded(
        multispace0,
        alt((
            map(string_literal, |s| Node::Literal(Value::String(s))),
            map(number_literal, Node::Literal),
            delimited(char('('), expression, symbol(")")),
            variable_or_function,
            identifier_or_constant,
        )),
    )(input)
}

// A quote inside a literal is written twice: 'it''s'
fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> ParseResult<'a, String> {
    delimited(
        char(quote),
        fold_many0(
            alt((
                value(quote, pair(char(quote), char(quote))),
                satisfy(move |c| c != quote),
            )),
            String::new,
            |mut literal, c| {
                literal.push(c);
                literal
            },
        ),
        char(quote),
    )
}

fn string_literal(input: &str) -> ParseResult<'_, String> {
    alt((quoted('\''), quoted('"')))(input)
}

fn number_literal(input: &str) -> ParseResult<'_, Value> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |text: &str| {
            if text.contains('.') {
                text.parse::<f64>()
                    .map(Value::Float64)
                    .map_err(|err| err.to_string())
            } else {
                text.parse::<i64>()
                    .map(Value::Int64)
                    .map_err(|err| err.to_string())
            }
        },
    )(input)
}

fn identifier(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_' || c == '$'),
        take_while(is_identifier_char),
    ))(input)
}

/// `#name` or `#name(args...)`
fn variable_or_function(input: &str) -> ParseResult<'_, Node> {
    let (input, (name, args)) = preceded(
        char('#'),
        pair(
            identifier,
            opt(delimited(
                symbol("("),
                separated_list0(symbol(","), expression),
                symbol(")"),
            )),
        ),
    )(input)?;
    let node = match args {
        Some(args) => Node::Function(name.to_string(), args),
        None => Node::Variable(name.to_string()),
    };
    Ok((input, node))
}

fn identifier_or_constant(input: &str) -> ParseResult<'_, Node> {
    map(identifier, |ident: &str| {
        match ident.to_ascii_lowercase().as_str() {
            "true" => Node::Literal(Value::Bool(true)),
            "false" => Node::Literal(Value::Bool(false)),
            "null" => Node::Literal(null()),
            _ => Node::Property(ident.to_string()),
        }
    })(input)
}

#[cfg(test)]
mod test {
    use super::*;

    fn boxed(node: Node) -> Box<Node> {
        Box::new(node)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_expression("#a + 1 == 2 && !b").unwrap(),
            Node::Binary(
                BinaryOp::And,
                boxed(Node::Binary(
                    BinaryOp::Eq,
                    boxed(Node::Binary(
                        BinaryOp::Add,
                        boxed(Node::Variable("a".to_string())),
                        boxed(Node::Literal(Value::Int64(1))),
                    )),
                    boxed(Node::Literal(Value::Int64(2))),
                )),
                boxed(Node::Unary(
                    UnaryOp::Not,
                    boxed(Node::Property("b".to_string()))
                )),
            )
        );
        assert_eq!(
            parse_expression("1 - 2 - 3").unwrap(),
            Node::Binary(
                BinaryOp::Sub,
                boxed(Node::Binary(
                    BinaryOp::Sub,
                    boxed(Node::Literal(Value::Int64(1))),
                    boxed(Node::Literal(Value::Int64(2))),
                )),
                boxed(Node::Literal(Value::Int64(3))),
            )
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse_expression("'it''s'").unwrap(),
            Node::Literal(Value::from("it's"))
        );
        assert_eq!(
            parse_expression("\"@x\"").unwrap(),
            Node::Literal(Value::from("@x"))
        );
        assert_eq!(
            parse_expression(" 1.5 ").unwrap(),
            Node::Literal(Value::Float64(1.5))
        );
        assert_eq!(
            parse_expression("NULL").unwrap(),
            Node::Literal(null())
        );
        // keywords only match whole words
        assert_eq!(
            parse_expression("notes").unwrap(),
            Node::Property("notes".to_string())
        );
    }

    #[test]
    fn test_function_and_index() {
        assert_eq!(
            parse_expression("#suffix('x', 2)[0]").unwrap(),
            Node::Index(
                boxed(Node::Function(
                    "suffix".to_string(),
                    vec![
                        Node::Literal(Value::from("x")),
                        Node::Literal(Value::Int64(2))
                    ]
                )),
                boxed(Node::Literal(Value::Int64(0))),
            )
        );
        assert_eq!(
            parse_expression("#now()").unwrap(),
            Node::Function("now".to_string(), vec![])
        );
    }

    #[test]
    fn test_ternary_and_elvis() {
        assert!(matches!(
            parse_expression("#archived ? 'old_trades' : 'trades'").unwrap(),
            Node::Ternary(..)
        ));
        assert!(matches!(
            parse_expression("#table ?: 'trades'").unwrap(),
            Node::Elvis(..)
        ));
        assert!(matches!(
            parse_expression("TRUE or false").unwrap(),
            Node::Binary(BinaryOp::Or, ..)
        ));
    }

    #[test]
    fn test_syntax_errors() {
        for input in [
            "",
            "#",
            "1 +",
            "(1",
            "#f(1,",
            "a ? b",
            "1 2",
            "a[0",
            "'open",
            "a ; b",
            "1 < 2 < 3",
            "99999999999999999999",
        ] {
            assert!(
                matches!(parse_expression(input), Err(Error::Parse(_))),
                "expected '{}' to fail",
                input
            );
        }
    }
}
