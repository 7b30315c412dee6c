//! Schemas of alignment hit tables.
//!
//! A [`Schema`] is an ordered list of named, typed columns. An input table is
//! matched structurally: its column count must equal the schema's, and the
//! kind inferred for each column must be accepted by the schema's kind for
//! that position. Header text plays no part in the match.

use tracing::debug;

/// The kind of values in a column.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Integers.
    Int,
    /// Floating point numbers.
    Float,
    /// Arbitrary text.
    String,
}

impl Kind {
    /// Returns whether a column of the inferred kind fits this kind.
    ///
    /// Text accepts anything, floating point numbers accept integers, and
    /// columns without values fit every kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::table::schema::Inferred;
    /// use annohit::table::schema::Kind;
    ///
    /// assert!(Kind::Float.accepts(Inferred::Int));
    /// assert!(Kind::String.accepts(Inferred::Float));
    /// assert!(!Kind::Int.accepts(Inferred::Float));
    /// ```
    pub fn accepts(&self, inferred: Inferred) -> bool {
        match self {
            Kind::String => true,
            Kind::Float => inferred <= Inferred::Float,
            Kind::Int => inferred <= Inferred::Int,
        }
    }
}

/// The kind inferred from the values of a column.
///
/// The variants are ordered from the most to the least specific.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Inferred {
    /// The column has no values.
    Empty,
    /// Every value is an integer.
    Int,
    /// Every value is a number.
    Float,
    /// At least one value is not a number.
    String,
}

impl Inferred {
    /// Infers the kind of a single value.
    pub fn of(value: &str) -> Self {
        if value.parse::<i64>().is_ok() {
            Inferred::Int
        } else if value.parse::<f64>().is_ok() {
            Inferred::Float
        } else {
            Inferred::String
        }
    }

    /// Infers the kind of a column from its values.
    pub fn of_column<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        values
            .into_iter()
            .map(Inferred::of)
            .fold(Inferred::Empty, Inferred::max)
    }
}

impl std::fmt::Display for Inferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inferred::Empty => write!(f, "empty"),
            Inferred::Int => write!(f, "int"),
            Inferred::Float => write!(f, "float"),
            Inferred::String => write!(f, "string"),
        }
    }
}

/// A named, typed column.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Column {
    /// The canonical name.
    pub name: &'static str,
    /// The kind of values.
    pub kind: Kind,
}

/// Shorthand for building the column lists below.
const fn column(name: &'static str, kind: Kind) -> Column {
    Column { name, kind }
}

/// An ordered list of columns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Schema {
    /// The name of the schema.
    pub name: &'static str,
    /// The columns.
    pub columns: &'static [Column],
}

impl Schema {
    /// Returns whether columns of the inferred kinds fit the schema.
    pub fn matches(&self, kinds: &[Inferred]) -> bool {
        self.columns.len() == kinds.len()
            && self
                .columns
                .iter()
                .zip(kinds)
                .all(|(column, kind)| column.kind.accepts(*kind))
    }

    /// Gets the canonical column names.
    pub fn names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.name.to_string())
            .collect()
    }
}

/// The default twelve column tabular output (`-outfmt 6`).
pub const BLAST_12: Schema = Schema {
    name: "12-column",
    columns: &[
        column("qaccver", Kind::String),
        column("saccver", Kind::String),
        column("pident", Kind::Float),
        column("length", Kind::Int),
        column("mismatch", Kind::Int),
        column("gapopen", Kind::Int),
        column("qstart", Kind::Int),
        column("qend", Kind::Int),
        column("sstart", Kind::Int),
        column("send", Kind::Int),
        column("evalue", Kind::Float),
        column("bitscore", Kind::Float),
    ],
};

/// The extended twenty-five column tabular output.
pub const BLAST_25: Schema = Schema {
    name: "25-column",
    columns: &[
        column("qaccver", Kind::String),
        column("saccver", Kind::String),
        column("pident", Kind::Float),
        column("length", Kind::Int),
        column("mismatch", Kind::Int),
        column("gapopen", Kind::Int),
        column("qstart", Kind::Int),
        column("qend", Kind::Int),
        column("sstart", Kind::Int),
        column("send", Kind::Int),
        column("evalue", Kind::Float),
        column("bitscore", Kind::Float),
        column("sallseqid", Kind::String),
        column("score", Kind::Int),
        column("nident", Kind::Int),
        column("positive", Kind::Int),
        column("gaps", Kind::Int),
        column("ppos", Kind::Float),
        column("qframe", Kind::String),
        column("sframe", Kind::String),
        column("qseq", Kind::String),
        column("sseq", Kind::String),
        column("qlen", Kind::Int),
        column("slen", Kind::Int),
        column("salltitles", Kind::String),
    ],
};

/// The known schemas, in the order they are tried.
pub const KNOWN: &[Schema] = &[BLAST_12, BLAST_25];

/// Identity and score statistics that are dropped during normalization.
pub const DROPPED: &[&str] = &[
    "pident", "length", "mismatch", "gapopen", "evalue", "bitscore", "score", "nident",
    "positive", "gaps", "ppos",
];

/// An error related to determining the columns of a table.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The table matches no known schema and no column names were supplied.
    UnknownSchema(Vec<Inferred>),
    /// The number of supplied column names differs from the table's.
    ColumnCountMismatch {
        /// The number of columns in the table.
        expected: usize,
        /// The number of supplied names.
        found: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownSchema(kinds) => write!(
                f,
                "table with column kinds [{}] matches no known schema and no column names \
                 were supplied",
                kinds
                    .iter()
                    .map(|kind| kind.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Error::ColumnCountMismatch { expected, found } => write!(
                f,
                "expected {} column names, found {} column names",
                expected, found
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Determines the column names of a table with the given column kinds.
///
/// Known schemas win over `explicit` names, which are only consulted when no
/// known schema matches.
///
/// # Examples
///
/// ```
/// use annohit::table::schema;
/// use annohit::table::schema::Inferred;
///
/// let kinds = [Inferred::String, Inferred::Int];
/// let explicit = [String::from("saccver"), String::from("send")];
///
/// assert_eq!(schema::resolve(&kinds, Some(&explicit[..]))?, explicit.to_vec());
/// assert!(schema::resolve(&kinds, None).is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve(kinds: &[Inferred], explicit: Option<&[String]>) -> Result<Vec<String>, Error> {
    if let Some(schema) = KNOWN.iter().find(|schema| schema.matches(kinds)) {
        debug!("table matches the {} schema", schema.name);
        return Ok(schema.names());
    }

    match explicit {
        Some(names) if names.len() == kinds.len() => {
            debug!("table matches no known schema, using the supplied column names");
            Ok(names.to_vec())
        }
        Some(names) => Err(Error::ColumnCountMismatch {
            expected: kinds.len(),
            found: names.len(),
        }),
        None => Err(Error::UnknownSchema(kinds.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of(row: &[&str]) -> Vec<Inferred> {
        row.iter().map(|value| Inferred::of(value)).collect()
    }

    #[test]
    fn test_inference() {
        assert_eq!(Inferred::of("42"), Inferred::Int);
        assert_eq!(Inferred::of("-1"), Inferred::Int);
        assert_eq!(Inferred::of("98.5"), Inferred::Float);
        assert_eq!(Inferred::of("1e-50"), Inferred::Float);
        assert_eq!(Inferred::of("NC_000913.3"), Inferred::String);

        assert_eq!(Inferred::of_column(["1", "2.5", "3"]), Inferred::Float);
        assert_eq!(Inferred::of_column(["1", "x"]), Inferred::String);
        assert_eq!(Inferred::of_column(Vec::<&str>::new()), Inferred::Empty);
    }

    #[test]
    fn test_schema_sizes() {
        assert_eq!(BLAST_12.columns.len(), 12);
        assert_eq!(BLAST_25.columns.len(), 25);
        assert_eq!(BLAST_25.columns[..12], BLAST_12.columns[..]);
    }

    #[test]
    fn test_twelve_columns() -> Result<(), Box<dyn std::error::Error>> {
        let kinds = kinds_of(&[
            "q1:1-100", "NC_000913.3", "100.000", "100", "0", "0", "1", "100", "337", "436",
            "1e-50", "185",
        ]);

        assert!(BLAST_12.matches(&kinds));
        assert!(!BLAST_25.matches(&kinds));
        assert_eq!(resolve(&kinds, None)?, BLAST_12.names());

        Ok(())
    }

    #[test]
    fn test_known_schema_wins_over_explicit_names() -> Result<(), Box<dyn std::error::Error>> {
        let kinds = kinds_of(&[
            "q1:1-100", "NC_000913.3", "100.000", "100", "0", "0", "1", "100", "337", "436",
            "1e-50", "185",
        ]);
        let explicit = (0..12).map(|i| format!("c{i}")).collect::<Vec<_>>();

        assert_eq!(resolve(&kinds, Some(&explicit[..]))?, BLAST_12.names());

        Ok(())
    }

    #[test]
    fn test_mismatching_kinds() {
        // The `length` column holds text.
        let kinds = kinds_of(&[
            "q1:1-100", "NC_000913.3", "100.000", "long", "0", "0", "1", "100", "337", "436",
            "1e-50", "185",
        ]);

        assert!(!BLAST_12.matches(&kinds));

        let err = resolve(&kinds, None).unwrap_err();
        assert!(matches!(err, Error::UnknownSchema(_)));
        assert!(err.to_string().starts_with(
            "table with column kinds [string, string, float, string, int"
        ));
    }

    #[test]
    fn test_explicit_names() -> Result<(), Box<dyn std::error::Error>> {
        let kinds = kinds_of(&["NC_000913.3", "10", "20"]);
        let names = vec![
            String::from("saccver"),
            String::from("sstart"),
            String::from("send"),
        ];

        assert_eq!(resolve(&kinds, Some(&names[..]))?, names);

        let err = resolve(&kinds, Some(&names[..2])).unwrap_err();
        assert_eq!(
            err,
            Error::ColumnCountMismatch {
                expected: 3,
                found: 2
            }
        );

        Ok(())
    }
}
