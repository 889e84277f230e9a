//! Top-level element classification, field extraction, and batching.
//!
//! Pipeline:
//!   byte stream
//!     └─ quick_xml::Reader        → events
//!          └─ read_element()      → one parsed top-level element
//!               └─ classify()     → PublicationRecord | PersonRecord
//!                    └─ ElementBatches → bounded batches

use std::io::BufRead;

use quick_xml::{
  Decoder, Reader,
  events::{BytesStart, BytesText, Event},
};

use bibnet_core::record::{
  PersonRecord, PublicationKind, PublicationRecord, is_meaningful_citation,
};

use crate::{Error, Result, source::open_dump};

/// Person records live in `www` elements carrying this title, a
/// backwards-compatibility quirk of the dataset.
const HOME_PAGE_TITLE: &str = "Home Page";

// ─── Batches ─────────────────────────────────────────────────────────────────

/// One bounded batch of parsed records, committed as a unit downstream.
#[derive(Debug, Default)]
pub struct Batch {
  pub publications: Vec<PublicationRecord>,
  pub persons:      Vec<PersonRecord>,
  /// Elements dropped for missing required fields.
  pub skipped:      u64,
}

impl Batch {
  pub fn len(&self) -> usize {
    self.publications.len() + self.persons.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0 && self.skipped == 0
  }
}

// ─── Element stream ──────────────────────────────────────────────────────────

/// Forward-only iterator over the dump, yielding batches of at most
/// `batch_size` parsed elements. Never holds more than one batch plus the
/// current element in memory.
pub struct ElementBatches {
  reader:     Reader<Box<dyn BufRead + Send>>,
  buf:        Vec<u8>,
  batch_size: usize,
  done:       bool,
}

impl ElementBatches {
  /// Open the dump at `path` (plain or gzipped) and stream it in batches.
  pub fn open(path: impl AsRef<std::path::Path>, batch_size: usize) -> Result<Self> {
    Ok(Self::from_reader(open_dump(path)?, batch_size))
  }

  /// Stream from an arbitrary source — used by tests with in-memory XML.
  pub fn from_reader<R: BufRead + Send + 'static>(source: R, batch_size: usize) -> Self {
    let mut reader = Reader::from_reader(Box::new(source) as Box<dyn BufRead + Send>);
    reader.config_mut().trim_text(true);
    Self {
      reader,
      buf: Vec::new(),
      batch_size: batch_size.max(1),
      done: false,
    }
  }

  fn next_batch(&mut self) -> Result<Option<Batch>> {
    if self.done {
      return Ok(None);
    }

    let mut batch = Batch::default();
    while batch.len() < self.batch_size {
      self.buf.clear();
      let step = match self.reader.read_event_into(&mut self.buf) {
        Ok(Event::Start(ref e)) => {
          let head = Head::of(e, self.reader.decoder());
          if head.tag == "dblp" { Step::Nothing } else { Step::Element(head) }
        }
        // A childless top-level element has no usable fields.
        Ok(Event::Empty(_)) => Step::Skip,
        Ok(Event::Eof) => Step::Eof,
        Ok(_) => Step::Nothing,
        Err(e) => return Err(Error::Xml(e)),
      };

      match step {
        Step::Element(head) => match self.read_element(&head)? {
          Parsed::Publication(record) => batch.publications.push(record),
          Parsed::Person(record) => batch.persons.push(record),
          Parsed::Malformed => {
            tracing::debug!(tag = %head.tag, "skipping malformed element");
            batch.skipped += 1;
          }
          Parsed::Ignored => {}
        },
        Step::Skip => batch.skipped += 1,
        Step::Eof => {
          self.done = true;
          break;
        }
        Step::Nothing => {}
      }
    }

    if batch.is_empty() { Ok(None) } else { Ok(Some(batch)) }
  }

  /// Consume events until the current top-level element closes, collecting
  /// recognized child fields and flattening any markup nested inside them.
  fn read_element(&mut self, head: &Head) -> Result<Parsed> {
    let mut depth = 0usize;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut fields = Fields::default();
    let mut buf = Vec::new();

    loop {
      buf.clear();
      match self.reader.read_event_into(&mut buf) {
        Ok(Event::Start(ref e)) => {
          depth += 1;
          if depth == 1 {
            field = Field::from_tag(e.name().as_ref());
            text.clear();
          }
        }
        Ok(Event::Text(ref t)) => {
          if field.is_some() {
            text.push_str(&text_of(t));
          }
        }
        Ok(Event::GeneralRef(ref r)) => {
          // Character references in names are a documented limitation: only
          // plain-ASCII resolutions are applied, anything else is kept as
          // literal reference syntax in the stored value.
          if field.is_some() {
            let name = String::from_utf8_lossy(r.as_ref()).into_owned();
            match resolve_ascii_reference(&name) {
              Some(c) => text.push(c),
              None => {
                text.push('&');
                text.push_str(&name);
                text.push(';');
              }
            }
          }
        }
        Ok(Event::CData(ref t)) => {
          if field.is_some() {
            text.push_str(&String::from_utf8_lossy(t.as_ref()));
          }
        }
        Ok(Event::End(_)) => {
          if depth == 0 {
            break;
          }
          if depth == 1
            && let Some(f) = field.take()
          {
            fields.push(f, std::mem::take(&mut text));
          }
          depth -= 1;
        }
        Ok(Event::Empty(_)) => {}
        Ok(Event::Eof) => return Err(Error::TruncatedElement(head.tag.clone())),
        Ok(_) => {}
        Err(e) => return Err(Error::Xml(e)),
      }
    }

    Ok(classify(head, fields))
  }
}

impl Iterator for ElementBatches {
  type Item = Result<Batch>;

  fn next(&mut self) -> Option<Self::Item> {
    match self.next_batch() {
      Ok(Some(batch)) => Some(Ok(batch)),
      Ok(None) => None,
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}

// ─── Element internals ───────────────────────────────────────────────────────

enum Step {
  Element(Head),
  Skip,
  Eof,
  Nothing,
}

/// Tag name and the attributes we keep, captured before the event buffer is
/// reused for child events.
struct Head {
  tag:      String,
  key:      Option<String>,
  mdate:    Option<String>,
  publtype: Option<String>,
}

impl Head {
  fn of(e: &BytesStart, decoder: Decoder) -> Self {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut head = Self { tag, key: None, mdate: None, publtype: None };

    for attr in e.attributes() {
      let Ok(attr) = attr else { continue };
      // Attribute values carry their references inline (no GeneralRef
      // events); an unresolvable reference keeps the raw syntax.
      let value = match attr.decode_and_unescape_value(decoder) {
        Ok(v) => v.into_owned(),
        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
      };
      match attr.key.as_ref() {
        b"key" => head.key = Some(value),
        b"mdate" => head.mdate = Some(value),
        b"publtype" => head.publtype = Some(value),
        _ => {}
      }
    }
    head
  }
}

/// Child elements the pipeline stages in memory. Everything else (notes,
/// editors, pages, volume metadata, related-work links) is dropped unseen.
#[derive(Clone, Copy)]
enum Field {
  Year,
  Author,
  Cite,
  Publisher,
  School,
  Title,
}

impl Field {
  fn from_tag(tag: &[u8]) -> Option<Self> {
    match tag {
      b"year" => Some(Self::Year),
      b"author" => Some(Self::Author),
      b"cite" => Some(Self::Cite),
      b"publisher" => Some(Self::Publisher),
      b"school" => Some(Self::School),
      b"title" => Some(Self::Title),
      _ => None,
    }
  }
}

#[derive(Default)]
struct Fields {
  years:      Vec<String>,
  authors:    Vec<String>,
  cites:      Vec<String>,
  publishers: Vec<String>,
  schools:    Vec<String>,
  titles:     Vec<String>,
}

impl Fields {
  fn push(&mut self, field: Field, value: String) {
    let value = value.trim().to_owned();
    if value.is_empty() && !matches!(field, Field::Cite) {
      return;
    }
    match field {
      Field::Year => self.years.push(value),
      Field::Author => self.authors.push(value),
      Field::Cite => self.cites.push(value),
      Field::Publisher => self.publishers.push(value),
      Field::School => self.schools.push(value),
      Field::Title => self.titles.push(value),
    }
  }
}

enum Parsed {
  Publication(PublicationRecord),
  Person(PersonRecord),
  /// Well-formed but not a record we persist (e.g. a `www` page that is not
  /// a person home page).
  Ignored,
  /// Missing a required field; skipped and counted.
  Malformed,
}

fn classify(head: &Head, fields: Fields) -> Parsed {
  if head.tag == "www" {
    if !fields.titles.iter().any(|t| t == HOME_PAGE_TITLE) {
      return Parsed::Ignored;
    }
    let Some(profile) = head.key.clone() else {
      return Parsed::Malformed;
    };
    let mut names = fields.authors.into_iter();
    let Some(name) = names.next() else {
      return Parsed::Malformed;
    };
    return Parsed::Person(PersonRecord {
      name,
      profile: Some(profile),
      aliases: names.collect(),
    });
  }

  let Some(kind) = PublicationKind::from_tag(&head.tag) else {
    return Parsed::Ignored;
  };
  let Some(key) = head.key.clone() else {
    return Parsed::Malformed;
  };

  let year = fields
    .years
    .first()
    .and_then(|y| y.parse::<u32>().ok())
    .filter(|y| (1000..=9999).contains(y));

  let citations = fields
    .cites
    .into_iter()
    .filter(|c| is_meaningful_citation(c))
    .collect();

  Parsed::Publication(PublicationRecord {
    key,
    kind,
    mdate: head.mdate.clone(),
    publtype: head.publtype.clone(),
    year,
    authors: fields.authors,
    citations,
    publisher: fields.publishers.into_iter().next(),
    school: fields.schools.into_iter().next(),
  })
}

// ─── Text handling ───────────────────────────────────────────────────────────

fn text_of(t: &BytesText) -> String {
  // References arrive as separate GeneralRef events, so a text span only
  // needs decoding, never unescaping.
  match t.decode() {
    Ok(s) => s.into_owned(),
    Err(_) => String::from_utf8_lossy(t.as_ref()).into_owned(),
  }
}

/// Resolve a character reference only when it yields plain ASCII.
fn resolve_ascii_reference(name: &str) -> Option<char> {
  match name {
    "amp" => Some('&'),
    "lt" => Some('<'),
    "gt" => Some('>'),
    "apos" => Some('\''),
    "quot" => Some('"'),
    _ => {
      let code = name
        .strip_prefix("#x")
        .or_else(|| name.strip_prefix("#X"))
        .and_then(|h| u32::from_str_radix(h, 16).ok())
        .or_else(|| name.strip_prefix('#').and_then(|d| d.parse().ok()))?;
      let c = char::from_u32(code)?;
      c.is_ascii().then_some(c)
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  fn batches(xml: &'static str, batch_size: usize) -> Vec<Batch> {
    ElementBatches::from_reader(Cursor::new(xml.as_bytes()), batch_size)
      .collect::<Result<Vec<_>>>()
      .unwrap()
  }

  const SAMPLE: &str = r#"<?xml version="1.0"?>
<dblp>
  <article mdate="2017-07-12" key="journals/x/Doe00" publtype="informal">
    <author>John Middle Doe</author>
    <author>Alice Smith</author>
    <title>On Things.</title>
    <pages>1-10</pages>
    <year>2000</year>
    <cite>conf/crypto/BarkanBK03</cite>
    <cite>...</cite>
  </article>
  <inproceedings key="conf/y/Doe01">
    <author>John Middle Doe</author>
    <author>Bob Jones</author>
    <year>2001</year>
  </inproceedings>
  <www key="homepages/d/JohnDoe">
    <title>Home Page</title>
    <author>John Middle Doe</author>
    <author>Johnny Doe</author>
    <url>http://example.org/~doe</url>
  </www>
</dblp>"#;

  #[test]
  fn parses_publications_and_persons() {
    let all = batches(SAMPLE, 1000);
    assert_eq!(all.len(), 1);
    let batch = &all[0];

    assert_eq!(batch.publications.len(), 2);
    assert_eq!(batch.persons.len(), 1);
    assert_eq!(batch.skipped, 0);

    let article = &batch.publications[0];
    assert_eq!(article.key, "journals/x/Doe00");
    assert_eq!(article.kind, PublicationKind::Article);
    assert_eq!(article.mdate.as_deref(), Some("2017-07-12"));
    assert_eq!(article.publtype.as_deref(), Some("informal"));
    assert_eq!(article.year, Some(2000));
    assert_eq!(article.authors, vec!["John Middle Doe", "Alice Smith"]);
    // Placeholder citation dropped, real one kept.
    assert_eq!(article.citations, vec!["conf/crypto/BarkanBK03"]);

    let person = &batch.persons[0];
    assert_eq!(person.name, "John Middle Doe");
    assert_eq!(person.profile.as_deref(), Some("homepages/d/JohnDoe"));
    assert_eq!(person.aliases, vec!["Johnny Doe"]);
  }

  #[test]
  fn batch_size_bounds_each_batch() {
    let all = batches(SAMPLE, 1);
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|b| b.len() == 1));
  }

  #[test]
  fn missing_key_is_skipped_and_counted() {
    let xml = r#"<dblp>
      <article><author>A B</author><year>1999</year></article>
      <article key="journals/x/Ok99"><author>A B</author><year>1999</year></article>
    </dblp>"#;
    let all = ElementBatches::from_reader(Cursor::new(xml.as_bytes()), 1000)
      .collect::<Result<Vec<_>>>()
      .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].publications.len(), 1);
    assert_eq!(all[0].skipped, 1);
  }

  #[test]
  fn www_without_home_page_title_is_ignored() {
    let xml = r#"<dblp>
      <www key="conf/x/index"><title>Conference Index</title></www>
    </dblp>"#;
    let all = ElementBatches::from_reader(Cursor::new(xml.as_bytes()), 1000)
      .collect::<Result<Vec<_>>>()
      .unwrap();
    assert!(all.is_empty());
  }

  #[test]
  fn unresolved_references_stay_literal() {
    let xml = r#"<dblp>
      <article key="journals/x/U99">
        <author>G&uuml;nter M&amp;M Gr&#252;n</author>
        <year>1999</year>
      </article>
    </dblp>"#;
    let all = ElementBatches::from_reader(Cursor::new(xml.as_bytes()), 1000)
      .collect::<Result<Vec<_>>>()
      .unwrap();
    let authors = &all[0].publications[0].authors;
    // Accented references kept as-is, the ASCII ampersand resolved.
    assert_eq!(authors, &["G&uuml;nter M&M Gr&#252;n"]);
  }

  #[test]
  fn nested_markup_is_flattened_not_staged() {
    let xml = r#"<dblp>
      <incollection key="reference/crypt/C11">
        <author>Anne Canteaut</author>
        <title>A5/<i>1</i>.</title>
        <year>2011</year>
        <ee>https://doi.org/x</ee>
      </incollection>
    </dblp>"#;
    let all = ElementBatches::from_reader(Cursor::new(xml.as_bytes()), 1000)
      .collect::<Result<Vec<_>>>()
      .unwrap();
    let record = &all[0].publications[0];
    assert_eq!(record.kind, PublicationKind::InCollection);
    assert_eq!(record.year, Some(2011));
  }

  #[test]
  fn attribute_entities_are_unescaped() {
    let xml = r#"<dblp>
      <article key="journals/x/A&amp;B99"><author>A B</author><year>1999</year></article>
    </dblp>"#;
    let all = ElementBatches::from_reader(Cursor::new(xml.as_bytes()), 1000)
      .collect::<Result<Vec<_>>>()
      .unwrap();
    assert_eq!(all[0].publications[0].key, "journals/x/A&B99");
  }

  #[test]
  fn implausible_year_becomes_none() {
    let xml = r#"<dblp>
      <article key="journals/x/Y1"><year>99</year><author>A B</author></article>
    </dblp>"#;
    let all = ElementBatches::from_reader(Cursor::new(xml.as_bytes()), 1000)
      .collect::<Result<Vec<_>>>()
      .unwrap();
    assert_eq!(all[0].publications[0].year, None);
  }
}
