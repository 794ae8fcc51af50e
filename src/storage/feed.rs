// src/storage/feed.rs

//! RSS 2.0 feed file.
//!
//! Existing entries are read back verbatim and written out in their original
//! order; new entries only ever go after them.

use std::error::Error;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{AppError, Result};
use crate::models::{ChannelInfo, FeedDocument, FeedEntry};
use crate::storage::{read_optional, write_atomic};

type XmlResult<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// The feed document on disk.
#[derive(Debug, Clone)]
pub struct FeedFile {
    path: PathBuf,
}

impl FeedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the existing feed, or `None` if there is no file yet.
    pub async fn load(&self) -> Result<Option<FeedDocument>> {
        let bytes = read_optional(&self.path)
            .await
            .map_err(|e| AppError::feed_io(&self.path, e))?;

        let Some(bytes) = bytes else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes).map_err(|e| AppError::feed_io(&self.path, e))?;
        parse_feed(&text)
            .map(Some)
            .map_err(|e| AppError::feed_io(&self.path, e))
    }

    /// Serialize and atomically replace the feed file.
    pub async fn save(&self, doc: &FeedDocument) -> Result<()> {
        let bytes = render_feed(doc).map_err(|e| AppError::feed_io(&self.path, e))?;
        write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| AppError::feed_io(&self.path, e))
    }
}

/// Parse an RSS 2.0 document.
///
/// Only the channel fields and item fields this crate writes are kept.
pub fn parse_feed(text: &str) -> XmlResult<FeedDocument> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut channel = ChannelInfo::default();
    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut saw_channel = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "channel" => saw_channel = true,
                    "item" => current = Some(empty_entry()),
                    _ => {}
                }
                stack.push(name);
            }
            Event::End(_) => {
                if stack.pop().as_deref() == Some("item") {
                    if let Some(mut entry) = current.take() {
                        if entry.guid.is_empty() {
                            entry.guid = entry.link.clone();
                        }
                        entries.push(entry);
                    }
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                assign_text(&stack, &mut channel, current.as_mut(), &text);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = String::from_utf8_lossy(&raw);
                assign_text(&stack, &mut channel, current.as_mut(), &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_channel {
        return Err("document has no <channel>".into());
    }
    Ok(FeedDocument::from_parts(channel, entries))
}

fn empty_entry() -> FeedEntry {
    FeedEntry {
        title: String::new(),
        link: String::new(),
        guid: String::new(),
        pub_date: String::new(),
    }
}

fn assign_text(
    stack: &[String],
    channel: &mut ChannelInfo,
    item: Option<&mut FeedEntry>,
    text: &str,
) {
    let Some((field, parents)) = stack.split_last() else {
        return;
    };
    let parent = parents.last().map(String::as_str);

    match (parent, item) {
        (Some("item"), Some(entry)) => {
            let slot = match field.as_str() {
                "title" => &mut entry.title,
                "link" => &mut entry.link,
                "guid" => &mut entry.guid,
                "pubDate" => &mut entry.pub_date,
                _ => return,
            };
            slot.push_str(text);
        }
        (Some("channel"), _) => match field.as_str() {
            "title" => channel.title.push_str(text),
            "link" => channel.link.push_str(text),
            "description" => channel.description.push_str(text),
            "lastBuildDate" => channel
                .last_build_date
                .get_or_insert_with(String::new)
                .push_str(text),
            _ => {}
        },
        _ => {}
    }
}

/// Render a document as indented RSS 2.0 with an XML declaration.
pub fn render_feed(doc: &FeedDocument) -> XmlResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss_start = BytesStart::new("rss");
    rss_start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss_start))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &doc.channel.title)?;
    write_text_element(&mut writer, "link", &doc.channel.link)?;
    write_text_element(&mut writer, "description", &doc.channel.description)?;
    if let Some(date) = &doc.channel.last_build_date {
        write_text_element(&mut writer, "lastBuildDate", date)?;
    }

    for entry in doc.entries() {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut writer, "title", &entry.title)?;
        write_text_element(&mut writer, "link", &entry.link)?;
        write_text_element(&mut writer, "guid", &entry.guid)?;
        if !entry.pub_date.is_empty() {
            write_text_element(&mut writer, "pubDate", &entry.pub_date)?;
        }
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn write_text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> XmlResult<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;

    const MAGNET: &str = "magnet:?xt=urn:btih:abc&dn=Movie+Name&tr=udp://tracker";

    fn sample_doc() -> FeedDocument {
        let mut doc = FeedDocument::new(ChannelInfo {
            title: "Torrent RSS".into(),
            link: "https://forum.example/".into(),
            description: "Auto feed".into(),
            last_build_date: None,
        });
        doc.append(FeedEntry::for_magnet("Movie <Name> [2.5GB]", MAGNET, Utc::now()));
        doc.touch(Utc::now());
        doc
    }

    #[test]
    fn test_render_escapes_and_parses_back() {
        let doc = sample_doc();
        let bytes = render_feed(&doc).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("<rss version=\"2.0\">"));
        assert!(text.contains("&amp;dn=Movie+Name"));
        assert!(text.contains("Movie &lt;Name&gt; [2.5GB]"));

        assert_eq!(parse_feed(&text).unwrap(), doc);
    }

    #[test]
    fn test_parse_foreign_feed() {
        let text = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
              <title>Old Feed</title>
              <link>https://forum.example/</link>
              <description><![CDATA[Handmade & kept]]></description>
              <image><title>ignored</title></image>
              <item>
                <title>First</title>
                <link>magnet:?xt=urn:btih:1</link>
                <pubDate>Tue, 01 Oct 2024 09:05:03 GMT</pubDate>
              </item>
            </channel></rss>"#;

        let doc = parse_feed(text).unwrap();
        assert_eq!(doc.channel.title, "Old Feed");
        assert_eq!(doc.channel.description, "Handmade & kept");
        assert_eq!(doc.channel.last_build_date, None);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.entries()[0].guid, "magnet:?xt=urn:btih:1");
        assert_eq!(doc.entries()[0].pub_date, "Tue, 01 Oct 2024 09:05:03 GMT");
    }

    #[test]
    fn test_parse_rejects_non_feed() {
        assert!(parse_feed("<html><body>nope</body></html>").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let tmp = TempDir::new().unwrap();
        let file = FeedFile::new(tmp.path().join("feed.xml"));
        assert!(file.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let file = FeedFile::new(tmp.path().join("feed.xml"));
        let doc = sample_doc();

        file.save(&doc).await.unwrap();
        assert_eq!(file.load().await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn test_garbage_file_is_feed_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("feed.xml");
        std::fs::write(&path, "not xml at all").unwrap();

        let err = FeedFile::new(&path).load().await.unwrap_err();
        assert_eq!(err.kind(), "feed-io");
    }
}
