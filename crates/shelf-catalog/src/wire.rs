//! Response shapes of the Google Books `volumes` endpoint, and their
//! normalization into [`NewBook`].

use chrono::NaiveDate;
use serde::Deserialize;
use shelf_core::book::NewBook;

/// Field selector sent with every request; keeps responses small.
pub const FIELDS: &str = "totalItems,items(id,volumeInfo(title,authors,description,\
  publishedDate,pageCount,categories,imageLinks,language,publisher,industryIdentifiers))";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeList {
  pub total_items: Option<u64>,
  pub items:       Vec<Volume>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Volume {
  pub id:          String,
  pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
  pub title:                Option<String>,
  pub authors:              Vec<String>,
  pub description:          Option<String>,
  pub published_date:       Option<String>,
  pub page_count:           Option<u32>,
  pub categories:           Vec<String>,
  pub image_links:          Option<ImageLinks>,
  pub language:             Option<String>,
  pub publisher:            Option<String>,
  pub industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageLinks {
  pub thumbnail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IndustryIdentifier {
  #[serde(rename = "type")]
  pub kind:       String,
  pub identifier: String,
}

/// Parse the catalog's partial dates: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
/// Missing components default to the first month / day.
pub fn parse_published(raw: &str) -> Option<NaiveDate> {
  let mut parts = raw.trim().splitn(3, '-');
  let year = parts.next()?.parse().ok()?;
  let month = parts.next().map(str::parse).transpose().ok()?.unwrap_or(1);
  let day = parts.next().map(str::parse).transpose().ok()?.unwrap_or(1);
  NaiveDate::from_ymd_opt(year, month, day)
}

impl Volume {
  pub fn into_new_book(self) -> NewBook {
    let info = self.volume_info;

    let isbn = ["ISBN_13", "ISBN_10"].iter().find_map(|kind| {
      info
        .industry_identifiers
        .iter()
        .find(|id| id.kind == *kind)
        .map(|id| id.identifier.clone())
    });

    let author = if info.authors.is_empty() {
      "Unknown Author".to_owned()
    } else {
      info.authors.join(", ")
    };

    NewBook {
      external_id: Some(self.id),
      title: info
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Unknown Title".to_owned()),
      author,
      isbn,
      description: info.description.unwrap_or_default(),
      published_date: info.published_date.as_deref().and_then(parse_published),
      page_count: info.page_count.unwrap_or(0),
      genres: info.categories,
      cover_image: info.image_links.and_then(|l| l.thumbnail).unwrap_or_default(),
      language: Some(info.language.unwrap_or_else(|| "en".to_owned())),
      publisher: info.publisher.unwrap_or_default(),
    }
    .normalized()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_dates() {
    assert_eq!(parse_published("1965"), NaiveDate::from_ymd_opt(1965, 1, 1));
    assert_eq!(parse_published("1965-08"), NaiveDate::from_ymd_opt(1965, 8, 1));
    assert_eq!(parse_published("1965-08-17"), NaiveDate::from_ymd_opt(1965, 8, 17));
    assert_eq!(parse_published("sometime"), None);
    assert_eq!(parse_published("1965-13"), None);
  }

  #[test]
  fn sparse_volume_gets_defaults() {
    let volume: Volume = serde_json::from_str(r#"{"id":"abc","volumeInfo":{}}"#).unwrap();
    let book = volume.into_new_book();

    assert_eq!(book.external_id.as_deref(), Some("abc"));
    assert_eq!(book.title, "Unknown Title");
    assert_eq!(book.author, "Unknown Author");
    assert_eq!(book.language.as_deref(), Some("en"));
    assert_eq!(book.isbn, None);
    assert_eq!(book.page_count, 0);
    assert!(book.cover_image.is_empty());
  }

  #[test]
  fn full_volume_is_normalized() {
    let volume: Volume = serde_json::from_str(
      r#"{
        "id": "B1hSG45JCX4C",
        "volumeInfo": {
          "title": "Dune",
          "authors": ["Frank Herbert", "Brian Herbert"],
          "publishedDate": "1990-09",
          "pageCount": 535,
          "categories": ["Fiction"],
          "imageLinks": {"thumbnail": "http://books.example/dune.jpg"},
          "language": "de",
          "publisher": "Ace",
          "industryIdentifiers": [
            {"type": "ISBN_10", "identifier": "0441172717"},
            {"type": "ISBN_13", "identifier": "9780441172719"}
          ]
        }
      }"#,
    )
    .unwrap();
    let book = volume.into_new_book();

    assert_eq!(book.author, "Frank Herbert, Brian Herbert");
    assert_eq!(book.isbn.as_deref(), Some("9780441172719"));
    assert_eq!(book.published_date, NaiveDate::from_ymd_opt(1990, 9, 1));
    assert_eq!(book.page_count, 535);
    assert_eq!(book.genres, vec!["Fiction".to_string()]);
    assert_eq!(book.cover_image, "http://books.example/dune.jpg");
    assert_eq!(book.language.as_deref(), Some("de"));
    assert_eq!(book.publisher, "Ace");
  }

  #[test]
  fn isbn_10_used_when_no_isbn_13() {
    let volume: Volume = serde_json::from_str(
      r#"{"id":"x","volumeInfo":{"industryIdentifiers":[
        {"type":"OTHER","identifier":"OCLC:1"},
        {"type":"ISBN_10","identifier":"0441172717"}
      ]}}"#,
    )
    .unwrap();
    assert_eq!(volume.into_new_book().isbn.as_deref(), Some("0441172717"));
  }
}
