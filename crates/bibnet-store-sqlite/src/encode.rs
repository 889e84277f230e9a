//! Row types and codecs between domain records and their TEXT columns.

use bibnet_core::{
  record::{PersonRecord, PublicationKind, PublicationRecord},
  squash::unsquash,
};

use crate::Result;

/// Raw strings read directly from a `publications` row.
pub struct RawPublication {
  pub key:       String,
  pub kind:      String,
  pub mdate:     Option<String>,
  pub publtype:  Option<String>,
  pub year:      Option<i64>,
  pub authors:   String,
  pub citations: String,
  pub publisher: Option<String>,
  pub school:    Option<String>,
}

impl RawPublication {
  pub fn into_record(self) -> Result<PublicationRecord> {
    let kind = PublicationKind::from_str_stored(&self.kind)?;
    Ok(PublicationRecord {
      key: self.key,
      kind,
      mdate: self.mdate,
      publtype: self.publtype,
      year: self.year.map(|y| y as u32),
      authors: unsquash(&self.authors),
      citations: unsquash(&self.citations),
      publisher: self.publisher,
      school: self.school,
    })
  }
}

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub name:    String,
  pub profile: Option<String>,
  pub aliases: String,
}

impl RawPerson {
  pub fn into_record(self) -> PersonRecord {
    PersonRecord {
      name:    self.name,
      profile: self.profile,
      aliases: unsquash(&self.aliases),
    }
  }
}
