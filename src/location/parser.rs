//! Location expression parser using nom
//!
//! Parsing happens in two steps: the nom grammar builds a small expression
//! tree without judging it, then [`lower`] turns the tree into a
//! [`FeatureLocation`], deciding strand and rejecting the shapes we do not
//! model (compounds nested inside compounds).

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, satisfy},
    combinator::{opt, recognize},
    multi::separated_list1,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult, Parser,
};

use crate::error::MirrorError;
use crate::location::transform::try_rebase;
use crate::location::types::{CompoundKind, FPosition, FRange, FeatureLocation, Strand};

/// Expression tree produced by the grammar
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Range(FRange),
    Complement(Box<Node>),
    Operator { name: String, args: Vec<Node> },
}

/// Parse a location expression into a [`FeatureLocation`]
///
/// Whitespace is removed first, a leading `bond` operator is read as
/// `order`, and every position is shifted by `offset` once parsed.
/// `seq_id` names the owning entry in error messages.
///
/// # Example
///
/// ```
/// use ferro_mirror::location::{parse_location, Strand};
///
/// let loc = parse_location("complement(join(1..10,20..30))", "X56734", 0).unwrap();
/// assert_eq!(loc.strand, Strand::Minus);
/// assert_eq!(loc.ranges()[0].begin(), 20);
/// ```
pub fn parse_location(input: &str, seq_id: &str, offset: i64) -> Result<FeatureLocation, MirrorError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(MirrorError::unsupported(seq_id, input, "empty location"));
    }

    // Some providers write bond(...) for disulfide bonds; it behaves as order(...).
    let cleaned = match cleaned.strip_prefix("bond") {
        Some(rest) => format!("order{}", rest),
        None => cleaned,
    };

    let (remaining, node) = parse_node(&cleaned).map_err(|e| {
        let pos = match &e {
            nom::Err::Error(err) | nom::Err::Failure(err) => cleaned.len() - err.input.len(),
            nom::Err::Incomplete(_) => cleaned.len(),
        };
        MirrorError::parse(pos, format!("malformed location '{}' in {}", cleaned, seq_id))
    })?;

    if !remaining.is_empty() {
        return Err(MirrorError::parse(
            cleaned.len() - remaining.len(),
            format!(
                "unexpected trailing input '{}' in location of {}",
                remaining, seq_id
            ),
        ));
    }

    let mut location = lower(node, seq_id, &cleaned)?;
    if offset != 0 {
        try_rebase(&mut location, offset)?;
    }
    Ok(location)
}

impl std::str::FromStr for FeatureLocation {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_location(s, "?", 0)
    }
}

fn lower(node: Node, seq_id: &str, source: &str) -> Result<FeatureLocation, MirrorError> {
    match node {
        Node::Range(range) => Ok(FeatureLocation::single(Strand::Plus, range)),
        Node::Complement(inner) => match *inner {
            Node::Range(range) => Ok(FeatureLocation::single(Strand::Minus, range)),
            Node::Operator { name, args } => {
                let (mut ranges, inner_minus) = lower_members(args, seq_id, source)?;
                if inner_minus.iter().any(|&m| m) {
                    return Err(MirrorError::unsupported(
                        seq_id,
                        source,
                        "complement inside complemented compound",
                    ));
                }
                // Store 5'->3' on the minus strand.
                ranges.reverse();
                Ok(FeatureLocation::compound(
                    Strand::Minus,
                    CompoundKind::from_operator(&name),
                    ranges,
                ))
            }
            Node::Complement(_) => Err(MirrorError::unsupported(
                seq_id,
                source,
                "nested complement",
            )),
        },
        Node::Operator { name, args } => {
            let (ranges, inner_minus) = lower_members(args, seq_id, source)?;
            let minus_count = inner_minus.iter().filter(|&&m| m).count();
            let strand = if minus_count == 0 {
                Strand::Plus
            } else if minus_count == inner_minus.len() {
                // join(complement(b),complement(a)) already lists b before a.
                Strand::Minus
            } else {
                return Err(MirrorError::unsupported(
                    seq_id,
                    source,
                    "mixed strands within compound",
                ));
            };
            Ok(FeatureLocation::compound(
                strand,
                CompoundKind::from_operator(&name),
                ranges,
            ))
        }
    }
}

/// Flatten operator arguments into ranges plus their complement flags
fn lower_members(
    args: Vec<Node>,
    seq_id: &str,
    source: &str,
) -> Result<(Vec<FRange>, Vec<bool>), MirrorError> {
    let mut ranges = Vec::with_capacity(args.len());
    let mut minus = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Node::Range(range) => {
                ranges.push(range);
                minus.push(false);
            }
            Node::Complement(inner) => match *inner {
                Node::Range(range) => {
                    ranges.push(range);
                    minus.push(true);
                }
                _ => {
                    return Err(MirrorError::unsupported(
                        seq_id,
                        source,
                        "nested compound location",
                    ))
                }
            },
            Node::Operator { .. } => {
                return Err(MirrorError::unsupported(
                    seq_id,
                    source,
                    "nested compound location",
                ))
            }
        }
    }
    Ok((ranges, minus))
}

fn parse_node(input: &str) -> IResult<&str, Node> {
    alt((parse_complement, parse_operator, parse_range_node)).parse(input)
}

fn parse_complement(input: &str) -> IResult<&str, Node> {
    let (input, inner) = preceded(
        tag("complement"),
        delimited(char('('), parse_node, char(')')),
    )
    .parse(input)?;
    Ok((input, Node::Complement(Box::new(inner))))
}

fn parse_operator(input: &str) -> IResult<&str, Node> {
    let (input, name) = operator_name(input)?;
    let (input, args) =
        delimited(char('('), separated_list1(char(','), parse_node), char(')')).parse(input)?;
    Ok((
        input,
        Node::Operator {
            name: name.to_string(),
            args,
        },
    ))
}

fn operator_name(input: &str) -> IResult<&str, &str> {
    recognize((
        satisfy(|c| c.is_ascii_alphabetic()),
        opt(take_while1(|c: char| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_'
        })),
    ))
    .parse(input)
}

fn parse_range_node(input: &str) -> IResult<&str, Node> {
    let (input, range) = parse_range(input)?;
    Ok((input, Node::Range(range)))
}

/// `[accession:]position[..position]`
fn parse_range(input: &str) -> IResult<&str, FRange> {
    let (input, accession) = opt(terminated(accession, char(':'))).parse(input)?;
    let (input, min) = parse_position(input)?;
    let (input, max) = opt(preceded(tag(".."), parse_position)).parse(input)?;

    let mut range = match max {
        Some(max) => FRange::new(min, max),
        None => FRange::point(min),
    };
    range.accession = accession.map(str::to_string);
    Ok((input, range))
}

fn accession(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.').parse(input)
}

fn parse_position(input: &str) -> IResult<&str, FPosition> {
    alt((
        parse_parenthesized_position,
        parse_open_start,
        parse_open_end,
        parse_bare_position,
    ))
    .parse(input)
}

/// `(102.110)` or `(123^124)`
fn parse_parenthesized_position(input: &str) -> IResult<&str, FPosition> {
    delimited(
        char('('),
        alt((
            separated_pair(number, char('.'), number)
                .map(|(start, end)| FPosition::in_range(start, end)),
            separated_pair(number, char('^'), number)
                .map(|(start, end)| FPosition::between(start, end)),
        )),
        char(')'),
    )
    .parse(input)
}

fn parse_open_start(input: &str) -> IResult<&str, FPosition> {
    preceded(char('<'), number)
        .map(|pos| FPosition::exact(pos).with_fuzzy_start())
        .parse(input)
}

fn parse_open_end(input: &str) -> IResult<&str, FPosition> {
    preceded(char('>'), number)
        .map(|pos| FPosition::exact(pos).with_fuzzy_end())
        .parse(input)
}

/// `467`, `123^124`, or the legacy unparenthesized `102.110`
fn parse_bare_position(input: &str) -> IResult<&str, FPosition> {
    let (rest, start) = number(input)?;
    if let Ok((rest, end)) = preceded(char::<_, nom::error::Error<&str>>('^'), number).parse(rest) {
        return Ok((rest, FPosition::between(start, end)));
    }
    if let Ok((rest, end)) = preceded(char::<_, nom::error::Error<&str>>('.'), number).parse(rest) {
        return Ok((rest, FPosition::in_range(start, end)));
    }
    Ok((rest, FPosition::exact(start)))
}

fn number(input: &str) -> IResult<&str, i64> {
    let (remaining, digits) = digit1.parse(input)?;
    // Use checked parsing to detect overflow (returns error instead of silent 0)
    let value: i64 = digits.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((remaining, value))
}
