//! Citations and bibliography.
//!
//! Trees cite their publications by a free-text key. `etc/sources.csv`
//! maps each key to zero or more source references (`bibkey[pages]`), and
//! `etc/sources.bib` holds the BibTeX records those references point to.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, separated_pair},
    IResult,
};
use regex::Regex;
use serde::Deserialize;

use crate::error::{ConvertError, ConvertResult};

#[allow(clippy::expect_used)]
static SOURCE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[^\[\]]+?)\s*(?:\[(?P<pages>[^\]]*)\])?$")
        .expect("source reference pattern compiles")
});

/// A reference to a bibliography entry, optionally with page numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub key: String,
    pub pages: Option<String>,
}

impl SourceRef {
    /// Parse `key` or `key[pages]`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = SOURCE_REF.captures(raw.trim())?;
        Some(Self {
            key: caps["key"].to_string(),
            pages: caps
                .name("pages")
                .map(|m| m.as_str().trim().to_string())
                .filter(|p| !p.is_empty()),
        })
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pages {
            Some(pages) => write!(f, "{}[{pages}]", self.key),
            None => f.write_str(&self.key),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CitationRow {
    #[serde(rename = "Citations")]
    citations: String,
    #[serde(rename = "Source", default)]
    source: String,
}

/// Publication key → source references, from `sources.csv`.
#[derive(Debug, Clone, Default)]
pub struct CitationTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl CitationTable {
    pub fn from_path(path: &Path) -> ConvertResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| ConvertError::io(path, e))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> ConvertResult<Self> {
        let mut entries = BTreeMap::new();
        for row in csv::Reader::from_reader(reader).deserialize() {
            let row: CitationRow = row?;
            let sources = row
                .source
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            entries.insert(row.citations.trim().to_string(), sources);
        }
        Ok(Self { entries })
    }

    /// Source references for a publication key. The empty key has none.
    #[must_use]
    pub fn lookup(&self, publications: &str) -> Option<&[String]> {
        let key = publications.trim();
        if key.is_empty() {
            return Some(&[]);
        }
        self.entries.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One BibTeX record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub entry_type: String,
    pub key: String,
    /// Field names are lower-cased.
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Short in-text reference, e.g. `Smith and Jones 1999`.
    #[must_use]
    pub fn refkey(&self) -> String {
        let people = self.get("author").or_else(|| self.get("editor"));
        let names: Vec<&str> = people
            .map(|p| p.split(" and ").map(surname).collect())
            .unwrap_or_default();
        let who = match names.as_slice() {
            [] => self.key.clone(),
            [one] => (*one).to_string(),
            [one, two] => format!("{one} and {two}"),
            [first, ..] => format!("{first} et al."),
        };
        match self.get("year") {
            Some(year) => format!("{who} {year}"),
            None => who,
        }
    }
}

fn surname(person: &str) -> &str {
    let person = person.trim();
    match person.split_once(',') {
        Some((last, _)) => last.trim(),
        None => person.rsplit(' ').next().unwrap_or(person),
    }
}

/// Full reference in author-year style.
impl fmt::Display for BibEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(author) = self.get("author").or_else(|| self.get("editor")) {
            parts.push(author.to_string());
        }
        if let Some(year) = self.get("year") {
            parts.push(year.to_string());
        }
        if let Some(title) = self.get("title") {
            parts.push(title.to_string());
        }
        let venue = ["journal", "booktitle", "publisher", "school"]
            .iter()
            .find_map(|field| self.get(field));
        if let Some(venue) = venue {
            let mut venue = venue.to_string();
            if let Some(volume) = self.get("volume") {
                venue = format!("{venue} {volume}");
            }
            if let Some(pages) = self.get("pages") {
                venue = format!("{venue}: {pages}");
            }
            if let Some(address) = self.get("address") {
                venue = format!("{address}: {venue}");
            }
            parts.push(venue);
        }
        if parts.is_empty() {
            return f.write_str(&self.key);
        }
        let text = parts.join(". ");
        if text.ends_with('.') {
            f.write_str(&text)
        } else {
            write!(f, "{text}.")
        }
    }
}

/// The entries of a BibTeX file, keyed by citation key.
#[derive(Debug, Clone, Default)]
pub struct Bibliography {
    entries: BTreeMap<String, BibEntry>,
}

impl Bibliography {
    pub fn from_path(path: &Path) -> ConvertResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        Self::parse(&content).map_err(|message| ConvertError::Bibliography {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse BibTeX text. `@comment`, `@string` and `@preamble` blocks and
    /// text outside of entries are skipped.
    pub fn parse(content: &str) -> Result<Self, String> {
        let (rest, items) = many0(preceded(junk, entry))(content)
            .map_err(|e| format!("invalid BibTeX: {e}"))?;
        let rest = rest.trim();
        if rest.contains('@') {
            let snippet: String = rest.chars().take(40).collect();
            return Err(format!("unparsed BibTeX near {snippet:?}"));
        }

        let entries = items
            .into_iter()
            .flatten()
            .map(|e| (e.key.clone(), e))
            .collect();
        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Anything before the next `@`.
fn junk(input: &str) -> IResult<&str, Option<&str>> {
    opt(is_not("@"))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !",{}()=\"#@".contains(c))(input)
}

/// `@type{key, field = value, ...}`; ignored block types yield `None`.
fn entry(input: &str) -> IResult<&str, Option<BibEntry>> {
    let (input, entry_type) = preceded(char('@'), ws(identifier))(input)?;
    let entry_type = entry_type.to_ascii_lowercase();
    if matches!(entry_type.as_str(), "comment" | "string" | "preamble") {
        let (input, _) = braced(input)?;
        return Ok((input, None));
    }

    let (input, (key, fields)) = delimited(
        char('{'),
        pair(
            ws(identifier),
            many0(preceded(ws(char(',')), opt(field))),
        ),
        ws(char('}')),
    )(input)?;

    Ok((
        input,
        Some(BibEntry {
            entry_type,
            key: key.to_string(),
            fields: fields.into_iter().flatten().collect(),
        }),
    ))
}

fn field(input: &str) -> IResult<&str, (String, String)> {
    map(
        separated_pair(ws(identifier), char('='), ws(value)),
        |(name, value)| (name.to_ascii_lowercase(), normalize_space(&value)),
    )(input)
}

/// Concatenation of braced, quoted or bare parts joined by `#`.
fn value(input: &str) -> IResult<&str, String> {
    map(
        separated_list0(ws(char('#')), alt((braced_content, quoted, bare))),
        |parts| parts.concat(),
    )(input)
}

fn bare(input: &str) -> IResult<&str, String> {
    map(identifier, str::to_string)(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), opt(is_not("\"")), char('"')),
        |s: Option<&str>| strip_braces(s.unwrap_or_default()),
    )(input)
}

fn braced_content(input: &str) -> IResult<&str, String> {
    map(braced, |raw| strip_braces(&raw[1..raw.len() - 1]))(input)
}

/// A balanced `{...}` group, returned including its outer braces.
fn braced(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('{'),
        many0(alt((is_not("{}"), braced))),
        char('}'),
    ))(input)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn strip_braces(s: &str) -> String {
    s.chars().filter(|c| *c != '{' && *c != '}').collect()
}

fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIB: &str = r#"
This text is ignored.

@comment{ generated by hand }

@book{smith1999,
    author = {Smith, John and Jones, Mary},
    title = {The {Chadic} Languages},
    publisher = "Academic Press",
    address = {London},
    year = 1999,
}

@Article{doe2001,
  Author = {Jane Doe and Bob Roe and Al Poe},
  Title = {On {H}ausa tone},
  Journal = {Journal of African Languages},
  Volume = {12},
  Pages = {1--20},
  Year = {2001}
}
"#;

    #[test]
    fn test_source_ref_parse() {
        assert_eq!(
            SourceRef::parse("smith1999[12-15]").unwrap(),
            SourceRef {
                key: "smith1999".to_string(),
                pages: Some("12-15".to_string())
            }
        );
        assert_eq!(SourceRef::parse(" doe2001 ").unwrap().pages, None);
        assert_eq!(SourceRef::parse("x[]").unwrap().pages, None);
        assert!(SourceRef::parse("").is_none());
        assert_eq!(
            SourceRef::parse("smith1999[12-15]").unwrap().to_string(),
            "smith1999[12-15]"
        );
    }

    #[test]
    fn test_citation_table() {
        let csv = "Citations,Source\n\
                   Smith 1999,smith1999[12]\n\
                   Both,smith1999;doe2001\n\
                   Nothing,\n";
        let table = CitationTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("Smith 1999").unwrap(), ["smith1999[12]"]);
        assert_eq!(table.lookup(" Both ").unwrap().len(), 2);
        assert!(table.lookup("Nothing").unwrap().is_empty());
        assert!(table.lookup("").unwrap().is_empty());
        assert!(table.lookup("Unknown").is_none());
    }

    #[test]
    fn test_parse_bibliography() {
        let bib = Bibliography::parse(BIB).unwrap();
        assert_eq!(bib.len(), 2);

        let smith = bib.get("smith1999").unwrap();
        assert_eq!(smith.entry_type, "book");
        assert_eq!(smith.get("title"), Some("The Chadic Languages"));
        assert_eq!(smith.get("publisher"), Some("Academic Press"));
        assert_eq!(smith.get("year"), Some("1999"));

        let doe = bib.get("doe2001").unwrap();
        assert_eq!(doe.entry_type, "article");
        assert_eq!(doe.get("pages"), Some("1--20"));
    }

    #[test]
    fn test_refkey() {
        let bib = Bibliography::parse(BIB).unwrap();
        assert_eq!(bib.get("smith1999").unwrap().refkey(), "Smith and Jones 1999");
        assert_eq!(bib.get("doe2001").unwrap().refkey(), "Doe et al. 2001");
    }

    #[test]
    fn test_display_reference() {
        let bib = Bibliography::parse(BIB).unwrap();
        assert_eq!(
            bib.get("smith1999").unwrap().to_string(),
            "Smith, John and Jones, Mary. 1999. The Chadic Languages. London: Academic Press."
        );
        assert_eq!(
            bib.get("doe2001").unwrap().to_string(),
            "Jane Doe and Bob Roe and Al Poe. 2001. On Hausa tone. \
             Journal of African Languages 12: 1--20."
        );
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert!(Bibliography::parse("").unwrap().is_empty());
        assert!(Bibliography::parse("@book{broken, title = {unclosed}").is_err());
    }
}
